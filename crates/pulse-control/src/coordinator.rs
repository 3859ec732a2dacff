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

//! Partitions one render frame into draw sub-passes.

use crate::executor::PassExecutor;
use crate::pool::JoinAll;
use pulse_core::utils::panic::panic_message;
use pulse_core::{Clock, DrawEvents, DrawPoolType, Stopwatch};
use pulse_telemetry::SharedFrameCounter;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// What one coordinator step drew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The MAP composite ran, alongside `submitted` concurrent sub-passes.
    Composite {
        /// Number of sub-passes handed to the executor.
        submitted: usize,
    },
    /// Only the UI foreground was drawn.
    ForegroundOnly,
    /// Nothing was eligible.
    Idle,
}

/// Decides each iteration which draw passes run and where.
///
/// When MAP is eligible, `pre_load` snapshots the scene, every eligible pass of
/// [`DrawPoolType::CONCURRENT`] goes to the executor, MAP is drawn inline on
/// the calling thread, and the step joins the whole batch before returning.
/// The map-processing frame counter is updated every step.
pub struct DrawPassCoordinator {
    events: Arc<dyn DrawEvents>,
    executor: Arc<dyn PassExecutor>,
    map_counter: SharedFrameCounter,
    clock: Arc<Clock>,
}

impl DrawPassCoordinator {
    /// Creates a coordinator.
    pub fn new(
        events: Arc<dyn DrawEvents>,
        executor: Arc<dyn PassExecutor>,
        map_counter: SharedFrameCounter,
        clock: Arc<Clock>,
    ) -> Self {
        Self {
            events,
            executor,
            map_counter,
            clock,
        }
    }

    /// Whether sub-passes run concurrently with the MAP pass.
    pub fn is_parallel(&self) -> bool {
        self.executor.is_parallel()
    }

    /// Runs one iteration and paces it against the map counter's target.
    pub fn step(&self) -> FrameOutcome {
        let outcome = self.draw_frame();
        self.map_counter.update(self.clock.elapsed());
        self.map_counter.throttle();
        outcome
    }

    fn draw_frame(&self) -> FrameOutcome {
        if self.events.can_draw(DrawPoolType::Map) {
            return self.draw_composite();
        }

        if self.events.can_draw(DrawPoolType::Foreground) {
            self.draw_inline(DrawPoolType::Foreground);
            return FrameOutcome::ForegroundOnly;
        }

        FrameOutcome::Idle
    }

    fn draw_composite(&self) -> FrameOutcome {
        let timer = Stopwatch::new();
        self.events.pre_load();

        let mut batch = JoinAll::new();
        for pass in DrawPoolType::CONCURRENT {
            if !self.events.can_draw(pass) {
                continue;
            }
            let events = Arc::clone(&self.events);
            batch.push(self.executor.spawn(Box::new(move || events.draw(pass))));
        }
        let submitted = batch.len();

        self.draw_inline(DrawPoolType::Map);

        // No frame is presented while a sub-pass is still in flight.
        for (index, result) in batch.wait().into_iter().enumerate() {
            if let Err(err) = result {
                log::error!("Draw sub-pass #{} failed: {}", index, err);
            }
        }

        log::trace!(
            "Composite frame: {} sub-pass(es) in {} us.",
            submitted,
            timer.elapsed_us()
        );
        FrameOutcome::Composite { submitted }
    }

    fn draw_inline(&self, pass: DrawPoolType) {
        let events = &self.events;
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| events.draw(pass))) {
            log::error!("{} pass panicked: {}", pass, panic_message(payload.as_ref()));
        }
    }
}

impl std::fmt::Debug for DrawPassCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawPassCoordinator")
            .field("parallel", &self.executor.is_parallel())
            .finish_non_exhaustive()
    }
}
