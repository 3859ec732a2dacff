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

//! Frame measurement and pacing.
//!
//! Two counters exist at runtime: one for presented (graphics) frames and one
//! for map-processing iterations. Both are fed timestamps taken from the
//! runtime clock and are owned by [`FrameTelemetry`].

#![warn(missing_docs)]

pub mod frame_counter;
pub mod pacing;
pub mod service;

pub use frame_counter::{FrameCounter, SharedFrameCounter, DEFAULT_MEASUREMENT_WINDOW};
pub use pacing::{effective_target_fps, FpsPolicy, DEFAULT_FPS_CEILING};
pub use service::FrameTelemetry;
