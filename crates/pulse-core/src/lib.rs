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

//! Foundational contracts shared by every Pulse crate.
//!
//! `pulse-core` owns no threads and no scheduling policy. It defines the
//! capabilities the runtime consumes from its collaborators (window, render
//! consumer, UI, graphics backend, scripting host) and the small set of
//! primitives every layer reads from: the [`Clock`] and the [`MainDispatcher`].

#![warn(missing_docs)]

pub mod clock;
pub mod error;
pub mod event;
pub mod platform;
pub mod renderer;
pub mod script;
pub mod subsystem;
pub mod ui;
pub mod utils;

pub use clock::{Clock, ManualTime, MonotonicTime, TimeSource};
pub use error::SubsystemError;
pub use event::dispatcher::{AppCommand, Dispatch, DispatcherHandle, MainDispatcher, Task};
pub use platform::host::{HostDriver, MainLoopCallback};
pub use platform::input::{InputEvent, MouseButton};
pub use platform::window::{Size, Window};
pub use renderer::draw::{DrawEvents, DrawPool, DrawPoolType};
pub use renderer::graphics::GraphicsBackend;
pub use script::{ScriptHost, ScriptValue};
pub use subsystem::Subsystem;
pub use ui::UiHost;
pub use utils::timer::Stopwatch;
