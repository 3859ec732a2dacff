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

//! The public-facing API of the Pulse runtime.
//!
//! Build a [`Services`] composition root, hand it to a [`GraphicalApplication`]
//! with an [`AppConfig`], then drive the lifecycle:
//! `init` → `run` → (`main_loop` when externally driven) → `terminate`.

#![warn(missing_docs)]

pub mod application;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod screenshot;
pub mod services;

pub use application::GraphicalApplication;
pub use config::{AppConfig, ConfigError};
pub use error::LifecycleError;
pub use lifecycle::{ApplicationState, LifecycleFlags};
pub use screenshot::{save_screenshot, ScreenshotError, DEFAULT_SCREENSHOT_FILE};
pub use services::{Services, ServicesBuilder};

pub use pulse_control::{RunOutcome, StepOutcome, StrategyKind};
