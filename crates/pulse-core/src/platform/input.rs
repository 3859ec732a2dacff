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

//! The engine-internal input event representation.
//!
//! Platform glue translates its native events into [`InputEvent`] before
//! handing them to the runtime, which decouples the scheduler from any
//! particular windowing backend.

/// A backend-agnostic user input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A keyboard key was pressed.
    KeyPressed {
        /// A string representation of the physical key code.
        key_code: String,
    },
    /// A keyboard key was released.
    KeyReleased {
        /// A string representation of the physical key code.
        key_code: String,
    },
    /// Text was committed (typing or IME).
    TextInput {
        /// The committed text.
        text: String,
    },
    /// A mouse button or touch was pressed.
    MouseButtonPressed {
        /// The button that was pressed.
        button: MouseButton,
    },
    /// A mouse button or touch was released.
    MouseButtonReleased {
        /// The button that was released.
        button: MouseButton,
    },
    /// The cursor moved.
    MouseMoved {
        /// The new x-coordinate of the cursor.
        x: f32,
        /// The new y-coordinate of the cursor.
        y: f32,
    },
    /// The mouse wheel was scrolled.
    MouseWheelScrolled {
        /// The horizontal scroll delta.
        delta_x: f32,
        /// The vertical scroll delta.
        delta_y: f32,
    },
}

/// A mouse button, or the touch pointer on touch devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// The left mouse button (or primary touch).
    Left,
    /// The right mouse button.
    Right,
    /// The middle mouse button.
    Middle,
    /// Another mouse button, identified by a numeric code.
    Other(u16),
}
