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

//! Service owning the runtime's frame counters.

use crate::frame_counter::{FrameCounter, SharedFrameCounter};
use crate::pacing::FpsPolicy;
use std::time::Duration;

/// Owns the graphics frame counter and the map-processing frame counter.
///
/// The graphics counter is driven by the thread that presents frames. The map
/// counter is handed out as a [`SharedFrameCounter`] to whichever thread runs
/// the draw passes.
#[derive(Debug)]
pub struct FrameTelemetry {
    graphics: FrameCounter,
    map: SharedFrameCounter,
}

impl FrameTelemetry {
    /// Creates the counters with the given measurement window.
    pub fn new(window: Duration) -> Self {
        Self {
            graphics: FrameCounter::with_window(window),
            map: SharedFrameCounter::new(FrameCounter::with_window(window)),
        }
    }

    /// Starts fresh measurement windows on both counters.
    pub fn init(&mut self, now: Duration) {
        self.graphics.init(now);
        self.map.lock().init(now);
    }

    /// A handle to the map-processing counter.
    pub fn map_counter(&self) -> SharedFrameCounter {
        self.map.clone()
    }

    /// The graphics counter.
    pub fn graphics(&self) -> &FrameCounter {
        &self.graphics
    }

    /// Measured map-processing FPS.
    pub fn map_fps(&self) -> u32 {
        self.map.fps()
    }

    /// Records one presented frame.
    ///
    /// Re-applies the ceiling policy to the map counter, then returns the
    /// graphics FPS when this frame completed a measurement window.
    pub fn graphics_frame(&mut self, now: Duration, policy: &FpsPolicy) -> Option<u32> {
        self.map.set_target_fps(policy.effective_target());

        if !self.graphics.update(now) {
            return None;
        }

        let fps = self.graphics.fps();
        log::debug!(
            "Frame rate: graphics {} fps, map {} fps (map target {}).",
            fps,
            self.map.fps(),
            self.map.lock().target_fps()
        );
        Some(fps)
    }
}

impl Default for FrameTelemetry {
    fn default() -> Self {
        Self::new(crate::DEFAULT_MEASUREMENT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graphics_frame_reports_once_per_window() {
        let mut telemetry = FrameTelemetry::default();
        telemetry.init(Duration::ZERO);
        let policy = FpsPolicy::default();

        let reports: Vec<u32> = (1..=120u32)
            .filter_map(|i| telemetry.graphics_frame(Duration::from_millis(1000) * i / 60, &policy))
            .collect();

        assert_eq!(reports, vec![60, 60]);
    }

    #[test]
    fn policy_is_applied_to_the_map_counter_every_frame() {
        let mut telemetry = FrameTelemetry::default();
        telemetry.init(Duration::ZERO);

        let capped = FpsPolicy {
            vsync: true,
            ..FpsPolicy::default()
        };
        telemetry.graphics_frame(Duration::from_millis(1), &capped);
        assert_eq!(telemetry.map_counter().lock().target_fps(), 500);

        telemetry.graphics_frame(Duration::from_millis(2), &FpsPolicy::default());
        assert_eq!(telemetry.map_counter().lock().target_fps(), 0);
    }

    #[test]
    fn map_counter_handle_shares_state() {
        let mut telemetry = FrameTelemetry::default();
        telemetry.init(Duration::ZERO);
        let map = telemetry.map_counter();

        for i in 1..=30u32 {
            map.update(Duration::from_millis(1000) * i / 30);
        }
        assert_eq!(telemetry.map_fps(), 30);
    }
}
