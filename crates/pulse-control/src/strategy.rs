// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Execution strategies for the frame loop.
//!
//! The same iteration contract ([`FrameLoop`]) is driven three ways:
//!
//! - [`MultiThreadStrategy`]: the calling thread presents frames while a
//!   dedicated secondary thread polls and runs the draw passes. `run` blocks
//!   until both loops have observed `stopping`.
//! - [`CooperativeSingleThreadStrategy`]: no second thread. `run` returns at
//!   once and an external driver calls [`ExecutionStrategy::step`].
//! - [`CooperativeYieldStrategy`]: the host owns the scheduling loop. `run`
//!   registers a callback with the [`HostDriver`] and returns.

use crate::coordinator::FrameOutcome;
use pulse_core::utils::panic::panic_message;
use pulse_core::HostDriver;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Sleep between iterations while the window is hidden.
pub const DEFAULT_THROTTLE_INTERVAL: Duration = Duration::from_millis(10);

const HEARTBEAT_PERIOD: u64 = 60;

/// One iteration's worth of work, as seen by a strategy.
///
/// Implemented by the application. Every method is called from whichever
/// thread the strategy assigns to it; only `present` touches the graphics
/// context.
pub trait FrameLoop: Send + Sync {
    /// Whether a stop was requested. Checked at the top of every iteration.
    fn is_stopping(&self) -> bool;

    /// Whether the window is visible.
    fn is_visible(&self) -> bool;

    /// Owning-thread poll: clock, Main Dispatcher, window, textures.
    fn main_poll(&self);

    /// Event-side poll: background subsystems.
    fn poll(&self);

    /// Runs one draw-pass coordinator step.
    fn draw_passes(&self) -> FrameOutcome;

    /// Composites and swaps the frame, then records it for FPS measurement.
    fn present(&self);

    /// Called once after the loop observed `stopping`.
    fn finish(&self);

    /// Sleep between iterations while the window is hidden.
    fn throttle_interval(&self) -> Duration {
        DEFAULT_THROTTLE_INTERVAL
    }
}

/// Result of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A frame was drawn.
    Continue,
    /// The window was hidden; the iteration only polled and slept.
    Throttled,
    /// `stopping` was observed; nothing ran.
    Stopped,
}

/// How `run` handed back control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The loop ran to completion on the calling thread.
    Finished,
    /// The loop is driven externally from now on.
    HandedToHost,
}

/// The three execution strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Browser-style host that re-invokes a registered callback.
    CooperativeYield,
    /// Externally driven single thread, e.g. a mobile activity loop.
    CooperativeSingleThread,
    /// Desktop: owning thread plus one secondary loop thread.
    MultiThread,
}

impl StrategyKind {
    /// The strategy for the compilation target.
    pub const fn for_target() -> Self {
        if cfg!(target_family = "wasm") {
            Self::CooperativeYield
        } else if cfg!(target_os = "android") {
            Self::CooperativeSingleThread
        } else {
            Self::MultiThread
        }
    }

    /// Whether draw sub-passes may run on pool workers.
    pub const fn parallel_passes(self) -> bool {
        matches!(self, Self::MultiThread)
    }

    /// Stable name used in logs and configuration.
    pub const fn name(self) -> &'static str {
        match self {
            Self::CooperativeYield => "cooperative_yield",
            Self::CooperativeSingleThread => "cooperative_single_thread",
            Self::MultiThread => "multi_thread",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while starting or joining a strategy.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The secondary loop thread could not be spawned.
    #[error("failed to spawn the secondary loop thread: {0}")]
    Spawn(#[source] std::io::Error),
    /// The cooperative-yield strategy needs a host driver.
    #[error("the cooperative-yield strategy requires a host driver")]
    MissingHost,
    /// The secondary loop thread panicked.
    #[error("the secondary loop thread panicked: {0}")]
    SecondaryPanicked(String),
}

/// A way of driving a [`FrameLoop`].
pub trait ExecutionStrategy: Send + Sync {
    /// Which variant this is.
    fn kind(&self) -> StrategyKind;

    /// Runs one iteration on the calling thread.
    fn step(&self, frame_loop: &dyn FrameLoop) -> StepOutcome;

    /// Starts the loop.
    fn run(&self, frame_loop: Arc<dyn FrameLoop>) -> Result<RunOutcome, StrategyError>;
}

/// Builds the strategy for `kind`.
pub fn build_strategy(
    kind: StrategyKind,
    host: Option<Arc<dyn HostDriver>>,
) -> Result<Box<dyn ExecutionStrategy>, StrategyError> {
    Ok(match kind {
        StrategyKind::MultiThread => Box::new(MultiThreadStrategy::new()),
        StrategyKind::CooperativeSingleThread => Box::new(CooperativeSingleThreadStrategy::new()),
        StrategyKind::CooperativeYield => {
            Box::new(CooperativeYieldStrategy::new(host.ok_or(StrategyError::MissingHost)?))
        }
    })
}

/// Counts iterations and logs a periodic heartbeat.
#[derive(Debug)]
struct Heartbeat {
    label: &'static str,
    count: AtomicU64,
}

impl Heartbeat {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            count: AtomicU64::new(0),
        }
    }

    fn tick(&self, outcome: StepOutcome) {
        let n = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        if n <= 5 || n % HEARTBEAT_PERIOD == 0 {
            log::trace!("{} iteration #{}: {:?}", self.label, n, outcome);
        }
    }
}

fn throttle(frame_loop: &dyn FrameLoop) -> StepOutcome {
    thread::sleep(frame_loop.throttle_interval());
    StepOutcome::Throttled
}

/// One full iteration on a single thread: poll, draw every pass, present.
fn serial_step(frame_loop: &dyn FrameLoop) -> StepOutcome {
    if frame_loop.is_stopping() {
        return StepOutcome::Stopped;
    }

    frame_loop.main_poll();
    frame_loop.poll();

    if !frame_loop.is_visible() {
        return throttle(frame_loop);
    }

    frame_loop.draw_passes();
    frame_loop.present();
    StepOutcome::Continue
}

/// Owning thread presents; a secondary thread polls and draws.
#[derive(Debug)]
pub struct MultiThreadStrategy {
    main: Arc<Heartbeat>,
    secondary: Arc<Heartbeat>,
}

impl MultiThreadStrategy {
    /// Creates the strategy.
    pub fn new() -> Self {
        Self {
            main: Arc::new(Heartbeat::new("Main loop")),
            secondary: Arc::new(Heartbeat::new("Map loop")),
        }
    }

    fn secondary_step(frame_loop: &dyn FrameLoop) -> StepOutcome {
        if frame_loop.is_stopping() {
            return StepOutcome::Stopped;
        }

        frame_loop.poll();

        if !frame_loop.is_visible() {
            return throttle(frame_loop);
        }

        frame_loop.draw_passes();
        StepOutcome::Continue
    }
}

impl Default for MultiThreadStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionStrategy for MultiThreadStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MultiThread
    }

    fn step(&self, frame_loop: &dyn FrameLoop) -> StepOutcome {
        if frame_loop.is_stopping() {
            return StepOutcome::Stopped;
        }

        frame_loop.main_poll();

        if !frame_loop.is_visible() {
            return throttle(frame_loop);
        }

        frame_loop.present();
        StepOutcome::Continue
    }

    fn run(&self, frame_loop: Arc<dyn FrameLoop>) -> Result<RunOutcome, StrategyError> {
        let secondary = {
            let frame_loop = Arc::clone(&frame_loop);
            let heartbeat = Arc::clone(&self.secondary);
            thread::Builder::new()
                .name("pulse-map".to_string())
                .spawn(move || {
                    log::info!("Secondary loop thread started.");
                    loop {
                        let outcome = Self::secondary_step(frame_loop.as_ref());
                        heartbeat.tick(outcome);
                        if outcome == StepOutcome::Stopped {
                            break;
                        }
                    }
                    log::info!("Secondary loop thread stopped.");
                })
                .map_err(StrategyError::Spawn)?
        };

        loop {
            let outcome = self.step(frame_loop.as_ref());
            self.main.tick(outcome);
            if outcome == StepOutcome::Stopped {
                break;
            }
        }

        let joined = secondary.join();
        frame_loop.finish();
        joined.map_err(|payload| StrategyError::SecondaryPanicked(panic_message(payload.as_ref())))?;
        Ok(RunOutcome::Finished)
    }
}

/// Poll and draw inline in a callback driven by the host.
///
/// No secondary thread exists, so the host thread never contends with a
/// worker over state it shares with the runtime.
#[derive(Debug)]
pub struct CooperativeSingleThreadStrategy {
    heartbeat: Heartbeat,
}

impl CooperativeSingleThreadStrategy {
    /// Creates the strategy.
    pub fn new() -> Self {
        Self {
            heartbeat: Heartbeat::new("Host loop"),
        }
    }
}

impl Default for CooperativeSingleThreadStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionStrategy for CooperativeSingleThreadStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::CooperativeSingleThread
    }

    fn step(&self, frame_loop: &dyn FrameLoop) -> StepOutcome {
        let outcome = serial_step(frame_loop);
        self.heartbeat.tick(outcome);
        outcome
    }

    fn run(&self, _frame_loop: Arc<dyn FrameLoop>) -> Result<RunOutcome, StrategyError> {
        log::info!("Frame loop handed to the external driver.");
        Ok(RunOutcome::HandedToHost)
    }
}

/// Registers one iteration per host scheduling slot.
///
/// On stop the callback is unregistered, the loop is finalised and the host
/// is asked to reload.
pub struct CooperativeYieldStrategy {
    host: Arc<dyn HostDriver>,
    heartbeat: Arc<Heartbeat>,
}

impl CooperativeYieldStrategy {
    /// Creates the strategy over `host`.
    pub fn new(host: Arc<dyn HostDriver>) -> Self {
        Self {
            host,
            heartbeat: Arc::new(Heartbeat::new("Host slot")),
        }
    }
}

impl fmt::Debug for CooperativeYieldStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CooperativeYieldStrategy")
            .field("heartbeat", &self.heartbeat)
            .finish_non_exhaustive()
    }
}

impl ExecutionStrategy for CooperativeYieldStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::CooperativeYield
    }

    fn step(&self, frame_loop: &dyn FrameLoop) -> StepOutcome {
        let outcome = serial_step(frame_loop);
        self.heartbeat.tick(outcome);
        outcome
    }

    fn run(&self, frame_loop: Arc<dyn FrameLoop>) -> Result<RunOutcome, StrategyError> {
        let host = Arc::clone(&self.host);
        let heartbeat = Arc::clone(&self.heartbeat);
        self.host.set_main_loop(Box::new(move || {
            let outcome = serial_step(frame_loop.as_ref());
            heartbeat.tick(outcome);
            if outcome == StepOutcome::Stopped {
                log::info!("Stop observed; releasing the host loop.");
                host.cancel_main_loop();
                frame_loop.finish();
                host.reload();
            }
        }));
        log::info!("Frame loop registered with the host scheduler.");
        Ok(RunOutcome::HandedToHost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::MainLoopCallback;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::Mutex;
    use std::thread::ThreadId;
    use std::time::Instant;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        MainPoll,
        Poll,
        Draw,
        Present,
        Finish,
    }

    /// Requests a stop after `stop_after` presented frames.
    struct FakeLoop {
        stopping: AtomicBool,
        visible: AtomicBool,
        stop_after: usize,
        presented: AtomicUsize,
        calls: Mutex<Vec<(Call, ThreadId, Instant)>>,
    }

    impl FakeLoop {
        fn new(stop_after: usize) -> Self {
            Self {
                stopping: AtomicBool::new(false),
                visible: AtomicBool::new(true),
                stop_after,
                presented: AtomicUsize::new(0),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, call: Call) {
            self.calls
                .lock()
                .unwrap()
                .push((call, thread::current().id(), Instant::now()));
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().iter().map(|(c, ..)| *c).collect()
        }

        fn count(&self, call: Call) -> usize {
            self.calls().iter().filter(|c| **c == call).count()
        }

        fn threads_of(&self, call: Call) -> Vec<ThreadId> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(c, ..)| *c == call)
                .map(|(_, id, _)| *id)
                .collect()
        }
    }

    impl FrameLoop for FakeLoop {
        fn is_stopping(&self) -> bool {
            self.stopping.load(Ordering::SeqCst)
        }
        fn is_visible(&self) -> bool {
            self.visible.load(Ordering::SeqCst)
        }
        fn main_poll(&self) {
            self.record(Call::MainPoll);
        }
        fn poll(&self) {
            self.record(Call::Poll);
        }
        fn draw_passes(&self) -> FrameOutcome {
            self.record(Call::Draw);
            thread::sleep(Duration::from_millis(1));
            FrameOutcome::Idle
        }
        fn present(&self) {
            self.record(Call::Present);
            if self.presented.fetch_add(1, Ordering::SeqCst) + 1 >= self.stop_after {
                self.stopping.store(true, Ordering::SeqCst);
            }
        }
        fn finish(&self) {
            self.record(Call::Finish);
        }
    }

    /// Invokes the registered callback on demand, like a browser frame tick.
    #[derive(Default)]
    struct TickingHost {
        callback: Mutex<Option<MainLoopCallback>>,
        cancelled: AtomicBool,
        reloads: AtomicUsize,
    }

    impl TickingHost {
        fn tick(&self) -> bool {
            let Some(mut callback) = self.callback.lock().unwrap().take() else {
                return false;
            };
            callback();
            if !self.cancelled.load(Ordering::SeqCst) {
                *self.callback.lock().unwrap() = Some(callback);
            }
            true
        }
    }

    impl HostDriver for TickingHost {
        fn set_main_loop(&self, callback: MainLoopCallback) {
            *self.callback.lock().unwrap() = Some(callback);
        }
        fn cancel_main_loop(&self) {
            self.cancelled.store(true, Ordering::SeqCst);
        }
        fn reload(&self) {
            self.reloads.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn target_selection_is_multi_thread_on_desktop() {
        if cfg!(any(target_family = "wasm", target_os = "android")) {
            return;
        }
        assert_eq!(StrategyKind::for_target(), StrategyKind::MultiThread);
        assert!(StrategyKind::MultiThread.parallel_passes());
        assert!(!StrategyKind::CooperativeSingleThread.parallel_passes());
        assert!(!StrategyKind::CooperativeYield.parallel_passes());
    }

    #[test]
    fn cooperative_yield_requires_a_host() {
        assert!(matches!(
            build_strategy(StrategyKind::CooperativeYield, None),
            Err(StrategyError::MissingHost)
        ));
        let strategy = build_strategy(StrategyKind::CooperativeSingleThread, None).unwrap();
        assert_eq!(strategy.kind(), StrategyKind::CooperativeSingleThread);
    }

    #[test]
    fn serial_step_orders_poll_before_draw_before_present() {
        let frame_loop = FakeLoop::new(usize::MAX);
        let strategy = CooperativeSingleThreadStrategy::new();

        assert_eq!(strategy.step(&frame_loop), StepOutcome::Continue);
        assert_eq!(
            frame_loop.calls(),
            vec![Call::MainPoll, Call::Poll, Call::Draw, Call::Present]
        );
    }

    #[test]
    fn hidden_window_polls_at_a_bounded_cadence_without_drawing() {
        let frame_loop = FakeLoop::new(usize::MAX);
        frame_loop.visible.store(false, Ordering::SeqCst);
        let strategy = CooperativeSingleThreadStrategy::new();

        for _ in 0..5 {
            assert_eq!(strategy.step(&frame_loop), StepOutcome::Throttled);
        }

        assert_eq!(frame_loop.count(Call::Draw), 0);
        assert_eq!(frame_loop.count(Call::Present), 0);
        assert_eq!(frame_loop.count(Call::Poll), 5);

        let calls = frame_loop.calls.lock().unwrap();
        let polls: Vec<Instant> = calls
            .iter()
            .filter(|(c, ..)| *c == Call::Poll)
            .map(|(.., at)| *at)
            .collect();
        for pair in polls.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= DEFAULT_THROTTLE_INTERVAL);
            assert!(gap <= Duration::from_millis(50), "gap {gap:?} too long");
        }
    }

    #[test]
    fn stopping_is_observed_before_any_work() {
        let frame_loop = FakeLoop::new(1);
        let strategy = CooperativeSingleThreadStrategy::new();

        assert_eq!(strategy.step(&frame_loop), StepOutcome::Continue);
        assert_eq!(strategy.step(&frame_loop), StepOutcome::Stopped);
        assert_eq!(strategy.step(&frame_loop), StepOutcome::Stopped);
        assert_eq!(frame_loop.count(Call::MainPoll), 1);
        assert_eq!(frame_loop.count(Call::Draw), 1);
    }

    #[test]
    fn cooperative_single_thread_hands_control_back() {
        let frame_loop = Arc::new(FakeLoop::new(3));
        let strategy = CooperativeSingleThreadStrategy::new();

        let outcome = strategy.run(frame_loop.clone()).unwrap();
        assert_eq!(outcome, RunOutcome::HandedToHost);
        assert!(frame_loop.calls().is_empty(), "no iteration runs inside run()");
    }

    #[test]
    fn multi_thread_splits_work_and_joins_before_returning() {
        let frame_loop = Arc::new(FakeLoop::new(20));
        let strategy = MultiThreadStrategy::new();

        let outcome = strategy.run(frame_loop.clone()).unwrap();
        assert_eq!(outcome, RunOutcome::Finished);

        let caller = thread::current().id();
        assert!(frame_loop.threads_of(Call::Present).iter().all(|id| *id == caller));
        assert!(frame_loop.threads_of(Call::MainPoll).iter().all(|id| *id == caller));
        assert!(frame_loop.threads_of(Call::Draw).iter().all(|id| *id != caller));
        assert!(frame_loop.threads_of(Call::Poll).iter().all(|id| *id != caller));

        assert_eq!(frame_loop.count(Call::Present), 20);
        assert_eq!(frame_loop.calls().last(), Some(&Call::Finish));
        assert_eq!(frame_loop.count(Call::Finish), 1);
    }

    #[test]
    fn multi_thread_hidden_window_never_presents() {
        let frame_loop = Arc::new(FakeLoop::new(usize::MAX));
        frame_loop.visible.store(false, Ordering::SeqCst);
        let strategy = MultiThreadStrategy::new();

        let stopper = {
            let frame_loop = Arc::clone(&frame_loop);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(60));
                frame_loop.stopping.store(true, Ordering::SeqCst);
            })
        };
        strategy.run(frame_loop.clone()).unwrap();
        stopper.join().unwrap();

        assert_eq!(frame_loop.count(Call::Present), 0);
        assert_eq!(frame_loop.count(Call::Draw), 0);
        assert!(frame_loop.count(Call::Poll) >= 2);
        assert!(frame_loop.count(Call::MainPoll) >= 2);
    }

    #[test]
    fn cooperative_yield_runs_per_tick_and_releases_the_host_on_stop() {
        let frame_loop = Arc::new(FakeLoop::new(3));
        let host = Arc::new(TickingHost::default());
        let strategy = CooperativeYieldStrategy::new(host.clone());

        assert_eq!(
            strategy.run(frame_loop.clone()).unwrap(),
            RunOutcome::HandedToHost
        );
        assert!(frame_loop.calls().is_empty());

        let mut ticks = 0;
        while host.tick() {
            ticks += 1;
            assert!(ticks < 100, "host loop never released");
        }

        assert_eq!(ticks, 4, "three frames and one stopping slot");
        assert_eq!(frame_loop.count(Call::Present), 3);
        assert_eq!(frame_loop.count(Call::Finish), 1);
        assert!(host.cancelled.load(Ordering::SeqCst));
        assert_eq!(host.reloads.load(Ordering::SeqCst), 1);
    }
}
