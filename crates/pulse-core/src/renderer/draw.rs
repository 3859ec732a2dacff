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

//! Draw passes and the render-consumer ("draw events") capability.

use crate::error::SubsystemError;
use crate::platform::window::Size;
use std::fmt;

/// An independently schedulable render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawPoolType {
    /// The composite map pass. Dominant cost, order significant.
    Map,
    /// The lighting pass.
    Light,
    /// The foreground (UI) pass.
    Foreground,
    /// Foreground content anchored to the map (names, health bars).
    ForegroundMap,
}

impl DrawPoolType {
    /// Passes that may run concurrently with [`DrawPoolType::Map`], in
    /// submission order.
    pub const CONCURRENT: [DrawPoolType; 3] = [
        DrawPoolType::Light,
        DrawPoolType::Foreground,
        DrawPoolType::ForegroundMap,
    ];

    /// Every pass type.
    pub const ALL: [DrawPoolType; 4] = [
        DrawPoolType::Map,
        DrawPoolType::Light,
        DrawPoolType::Foreground,
        DrawPoolType::ForegroundMap,
    ];

    /// A stable upper-case name for logs.
    pub const fn name(self) -> &'static str {
        match self {
            DrawPoolType::Map => "MAP",
            DrawPoolType::Light => "LIGHT",
            DrawPoolType::Foreground => "FOREGROUND",
            DrawPoolType::ForegroundMap => "FOREGROUND_MAP",
        }
    }
}

impl fmt::Display for DrawPoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The render consumer: decides what is drawable and draws it.
///
/// Eligibility depends on scene and visibility state the scheduler never sees.
/// `draw` may be called concurrently for different pass types; between
/// [`pre_load`](Self::pre_load) and the end of the frame, scene state must be
/// treated as read-only by every pass.
pub trait DrawEvents: Send + Sync {
    /// Returns `true` if `pass` has something to draw this frame.
    fn can_draw(&self, pass: DrawPoolType) -> bool;

    /// Snapshots frame-consistent state before any pass reads it.
    fn pre_load(&self);

    /// Records the given pass.
    fn draw(&self, pass: DrawPoolType);

    /// Returns `true` while textures are being decoded in the background.
    fn is_loading_async_texture(&self) -> bool {
        false
    }

    /// Returns `true` if assets are loaded from protobuf sources.
    fn is_using_protobuf(&self) -> bool {
        false
    }

    /// Notified when the application toggles asynchronous texture loading.
    fn on_loading_async_texture_changed(&self, _enabled: bool) {}

    /// Renders the whole map to an image file.
    fn do_map_screenshot(&self, _file: &str) {}
}

/// The pool that composes recorded passes into the back buffer.
///
/// Every method must be called on the owning thread.
pub trait DrawPool: Send + Sync {
    /// One-time bring-up with the atlas sprite size.
    fn init(&self, sprite_size: u32) -> Result<(), SubsystemError>;

    /// Releases all GPU resources held by the pool.
    fn terminate(&self);

    /// Composes the recorded passes into the back buffer.
    fn draw(&self);

    /// Resizes the framebuffer backing the foreground pass.
    fn set_foreground_framebuffer(&self, size: Size);
}
