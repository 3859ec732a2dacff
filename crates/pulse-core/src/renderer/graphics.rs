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

//! The graphics backend capability.

use crate::platform::window::Size;
use crate::subsystem::Subsystem;

/// The graphics context owner.
///
/// Every method is context-bound and must only be called from the owning thread
/// designated at application `init`.
pub trait GraphicsBackend: Subsystem {
    /// Resizes the default framebuffer and viewport.
    fn resize(&self, size: Size);

    /// Returns the current viewport size.
    fn viewport_size(&self) -> Size;

    /// Reads back the viewport as tightly packed RGBA8 rows, bottom row first.
    fn read_pixels(&self) -> Vec<u8>;
}
