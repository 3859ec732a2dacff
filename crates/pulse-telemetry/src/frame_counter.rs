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

//! Per-subsystem frame counting and slot throttling.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

/// The nominal measurement window.
pub const DEFAULT_MEASUREMENT_WINDOW: Duration = Duration::from_secs(1);

const MIN_MEASUREMENT_WINDOW: Duration = Duration::from_millis(1);

/// Tracks the target and measured frame rate of one loop.
///
/// `update` is fed the clock's current time, which makes measurement
/// deterministic under a manual time source. `throttle` works in real time
/// since it has to put the calling thread to sleep.
#[derive(Debug, Clone)]
pub struct FrameCounter {
    target_fps: u32,
    measured_fps: f32,
    last_sample_time: Duration,
    frame_count: u32,
    window: Duration,
    slot_start: Instant,
}

impl FrameCounter {
    /// Creates an uncapped counter with a one second window.
    pub fn new() -> Self {
        Self::with_window(DEFAULT_MEASUREMENT_WINDOW)
    }

    /// Creates an uncapped counter with a custom measurement window.
    pub fn with_window(window: Duration) -> Self {
        Self {
            target_fps: 0,
            measured_fps: 0.0,
            last_sample_time: Duration::ZERO,
            frame_count: 0,
            window: window.max(MIN_MEASUREMENT_WINDOW),
            slot_start: Instant::now(),
        }
    }

    /// Starts a fresh measurement window at `now`.
    pub fn init(&mut self, now: Duration) {
        self.last_sample_time = now;
        self.frame_count = 0;
        self.measured_fps = 0.0;
        self.slot_start = Instant::now();
    }

    /// Sets the frame-rate cap. `0` means uncapped.
    pub fn set_target_fps(&mut self, fps: u32) {
        self.target_fps = fps;
    }

    /// The frame-rate cap, `0` when uncapped.
    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// The frame rate measured over the last completed window.
    pub fn measured_fps(&self) -> f32 {
        self.measured_fps
    }

    /// The measured frame rate rounded to the nearest integer.
    pub fn fps(&self) -> u32 {
        self.measured_fps.round() as u32
    }

    /// Frames counted in the current, incomplete window.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// The measurement window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Counts one frame.
    ///
    /// Returns `true` exactly when this frame completes a measurement window;
    /// `measured_fps` is recomputed and the window restarts at `now`.
    pub fn update(&mut self, now: Duration) -> bool {
        self.frame_count = self.frame_count.saturating_add(1);

        let elapsed = now.saturating_sub(self.last_sample_time);
        if elapsed < self.window {
            return false;
        }

        self.measured_fps = self.frame_count as f32 / elapsed.as_secs_f32();
        self.frame_count = 0;
        self.last_sample_time = now;
        true
    }

    /// The length of one frame slot, or `None` when uncapped.
    pub fn slot_duration(&self) -> Option<Duration> {
        (self.target_fps > 0).then(|| Duration::from_secs(1) / self.target_fps)
    }

    /// Returns how long the caller should sleep to finish the current slot,
    /// and starts the next slot where this one ends.
    pub fn throttle_delay(&mut self) -> Duration {
        let now = Instant::now();
        let delay = match self.slot_duration() {
            Some(slot) => slot.saturating_sub(now.duration_since(self.slot_start)),
            None => Duration::ZERO,
        };
        self.slot_start = now + delay;
        delay
    }

    /// Sleeps until the current slot has elapsed. Returns immediately when
    /// uncapped.
    pub fn throttle(&mut self) -> Duration {
        let delay = self.throttle_delay();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        delay
    }
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// A frame counter shared between the thread that drives it and the thread
/// that configures or reads it.
#[derive(Debug, Clone, Default)]
pub struct SharedFrameCounter(Arc<Mutex<FrameCounter>>);

impl SharedFrameCounter {
    /// Wraps a counter for sharing.
    pub fn new(counter: FrameCounter) -> Self {
        Self(Arc::new(Mutex::new(counter)))
    }

    /// Locks the counter. A poisoned lock is recovered, since a counter has no
    /// invariant a panic could break.
    pub fn lock(&self) -> MutexGuard<'_, FrameCounter> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`FrameCounter::update`].
    pub fn update(&self, now: Duration) -> bool {
        self.lock().update(now)
    }

    /// See [`FrameCounter::fps`].
    pub fn fps(&self) -> u32 {
        self.lock().fps()
    }

    /// See [`FrameCounter::set_target_fps`].
    pub fn set_target_fps(&self, fps: u32) {
        self.lock().set_target_fps(fps);
    }

    /// See [`FrameCounter::throttle`]. The lock is released before sleeping.
    pub fn throttle(&self) -> Duration {
        let delay = self.lock().throttle_delay();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        delay
    }
}
