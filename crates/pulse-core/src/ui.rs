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

//! The UI consumer of resize and input events.

use crate::platform::input::InputEvent;
use crate::platform::window::Size;
use crate::subsystem::Subsystem;

/// The UI layout/widget tree, seen from the scheduler.
///
/// Widget semantics are not the runtime's business; it only needs to deliver
/// resizes and input on the right thread.
pub trait UiHost: Subsystem {
    /// The logical (density-scaled) size of the root widget changed.
    fn resize(&self, size: Size);

    /// Delivers one input event to the widget tree.
    fn input_event(&self, event: &InputEvent);
}
