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

//! Concrete implementations of the collaborator contracts in `pulse-core`.
//!
//! Everything here runs without a display server or GPU: the window is driven
//! by injected platform events, the graphics backend renders into a CPU
//! framebuffer. The runtime binary and the integration tests build on them.

#![warn(missing_docs)]

pub mod graphics;
pub mod platform;
pub mod script;
pub mod subsystem;
pub mod ui;

pub use graphics::{HeadlessDrawPool, HeadlessGraphics};
pub use platform::{HeadlessWindow, HeadlessWindowBuilder, ManualHostDriver};
pub use script::{LoggingScriptHost, ScriptCall};
pub use subsystem::NullSubsystem;
pub use ui::HeadlessUi;
