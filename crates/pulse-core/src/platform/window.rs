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

//! Defines the abstract window capability and its value types.

use crate::error::SubsystemError;
use crate::platform::input::InputEvent;
use std::fmt;

/// Pixel dimensions of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Creates a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Divides both dimensions by `scale`, rounding to the nearest pixel.
    ///
    /// A non-positive or non-finite scale leaves the size untouched.
    pub fn scaled_down(self, scale: f32) -> Self {
        if !(scale.is_finite() && scale > 0.0) {
            return self;
        }
        Self {
            width: (self.width as f32 / scale).round() as u32,
            height: (self.height as f32 / scale).round() as u32,
        }
    }

    /// Number of pixels covered by this size.
    pub fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns `true` if either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Called by the platform when the window surface changes size.
pub type ResizeCallback = Box<dyn Fn(Size) + Send + Sync>;
/// Called by the platform for every translated input event.
pub type InputCallback = Box<dyn Fn(InputEvent) + Send + Sync>;
/// Called by the platform when the user asks to close the window.
pub type CloseCallback = Box<dyn Fn() + Send + Sync>;

/// The platform window, as seen by the scheduler.
///
/// Implementations use interior mutability: the window is shared between the
/// owning thread (poll, swap) and any thread that queries visibility.
/// `swap_buffers` must only ever be called from the owning thread.
pub trait Window: Send + Sync {
    /// Creates the native surface. Called first during bring-up.
    fn init(&self) -> Result<(), SubsystemError>;

    /// Destroys the native surface. Called last during teardown.
    fn terminate(&self);

    /// Makes the window visible.
    fn show(&self);

    /// Hides the window.
    fn hide(&self);

    /// Pumps pending platform events, firing the registered callbacks.
    fn poll(&self);

    /// Returns `false` while the window is minimised or backgrounded.
    fn is_visible(&self) -> bool;

    /// Presents the back buffer.
    fn swap_buffers(&self);

    /// Returns the physical size of the drawable area.
    fn size(&self) -> Size;

    /// Returns `true` if presentation is synchronised to the display refresh.
    fn vsync_enabled(&self) -> bool;

    /// Returns the display density (HiDPI scale factor).
    fn display_density(&self) -> f32;

    /// Overrides the display density.
    fn set_display_density(&self, density: f32);

    /// Registers the resize callback, replacing any previous one.
    fn set_on_resize(&self, callback: ResizeCallback);

    /// Registers the input callback, replacing any previous one.
    fn set_on_input_event(&self, callback: InputCallback);

    /// Registers the close callback, replacing any previous one.
    fn set_on_close(&self, callback: CloseCallback);
}
