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

//! A draw pool that counts composites.

use pulse_core::{DrawPool, Size, SubsystemError};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// A [`DrawPool`] that records what the scheduler asked of it.
#[derive(Debug, Default)]
pub struct HeadlessDrawPool {
    sprite_size: AtomicU32,
    composites: AtomicU64,
    foreground: Mutex<Option<Size>>,
}

impl HeadlessDrawPool {
    /// Creates an uninitialised draw pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// The sprite size passed to `init`, `0` before bring-up.
    pub fn sprite_size(&self) -> u32 {
        self.sprite_size.load(Ordering::SeqCst)
    }

    /// Number of composited frames.
    pub fn composite_count(&self) -> u64 {
        self.composites.load(Ordering::SeqCst)
    }

    /// The last foreground framebuffer size set.
    pub fn foreground_size(&self) -> Option<Size> {
        *self.foreground.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DrawPool for HeadlessDrawPool {
    fn init(&self, sprite_size: u32) -> Result<(), SubsystemError> {
        if sprite_size == 0 {
            return Err(SubsystemError::init_failed(
                "draw pool",
                "sprite size must be positive",
            ));
        }
        self.sprite_size.store(sprite_size, Ordering::SeqCst);
        log::debug!("Draw pool ready with {}px sprites.", sprite_size);
        Ok(())
    }

    fn terminate(&self) {
        self.sprite_size.store(0, Ordering::SeqCst);
    }

    fn draw(&self) {
        self.composites.fetch_add(1, Ordering::SeqCst);
    }

    fn set_foreground_framebuffer(&self, size: Size) {
        *self.foreground.lock().unwrap_or_else(PoisonError::into_inner) = Some(size);
    }
}
