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

//! The frame-rate ceiling policy.

/// Ceiling applied to the map-processing loop whenever anything constrains
/// the frame rate.
pub const DEFAULT_FPS_CEILING: u32 = 500;

/// Returns the target FPS for the map-processing loop.
///
/// When vsync is on or the user set a max/target FPS, the loop is capped at
/// `ceiling`. When nothing constrains the frame rate it stays uncapped (`0`)
/// rather than silently defaulting to the ceiling, so the FPS read-out is not
/// misleading.
pub fn effective_target_fps(vsync: bool, max_fps: u32, target_fps: u32, ceiling: u32) -> u32 {
    if vsync || max_fps > 0 || target_fps > 0 {
        ceiling
    } else {
        0
    }
}

/// The inputs to [`effective_target_fps`], as observed for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FpsPolicy {
    /// Whether presentation is vsync-limited.
    pub vsync: bool,
    /// The user's max-FPS setting, `0` when unset.
    pub max_fps: u32,
    /// The user's target-FPS setting, `0` when unset.
    pub target_fps: u32,
    /// The cap used when any constraint is set.
    pub ceiling: u32,
}

impl FpsPolicy {
    /// Evaluates the policy.
    pub fn effective_target(&self) -> u32 {
        effective_target_fps(self.vsync, self.max_fps, self.target_fps, self.ceiling)
    }
}

impl Default for FpsPolicy {
    fn default() -> Self {
        Self {
            vsync: false,
            max_fps: 0,
            target_fps: 0,
            ceiling: DEFAULT_FPS_CEILING,
        }
    }
}
