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

//! A graphics backend that renders into a CPU framebuffer.

use pulse_core::{GraphicsBackend, Size, Subsystem, SubsystemError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug)]
struct Framebuffer {
    size: Size,
    pixels: Vec<u8>,
}

impl Framebuffer {
    fn new(size: Size) -> Self {
        Self {
            size,
            pixels: vec![0; size.area() * BYTES_PER_PIXEL],
        }
    }
}

/// A [`GraphicsBackend`] backed by an RGBA8 buffer in memory.
///
/// Rows are stored bottom row first, matching what a GL read-back returns.
#[derive(Debug)]
pub struct HeadlessGraphics {
    framebuffer: Mutex<Framebuffer>,
    initialized: AtomicBool,
    fail_init: bool,
}

impl HeadlessGraphics {
    /// Creates a backend with a black, fully transparent viewport.
    pub fn new(size: Size) -> Self {
        Self {
            framebuffer: Mutex::new(Framebuffer::new(size)),
            initialized: AtomicBool::new(false),
            fail_init: false,
        }
    }

    /// Makes `init` fail, as a missing graphics context would.
    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Whether the context is up.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn framebuffer(&self) -> MutexGuard<'_, Framebuffer> {
        self.framebuffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fills the whole viewport with one colour.
    pub fn clear(&self, rgba: [u8; 4]) {
        for pixel in self.framebuffer().pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            pixel.copy_from_slice(&rgba);
        }
    }

    /// Writes one pixel. `y = 0` is the bottom row. Out of range writes are ignored.
    pub fn put_pixel(&self, x: u32, y: u32, rgba: [u8; 4]) {
        let mut framebuffer = self.framebuffer();
        let Size { width, height } = framebuffer.size;
        if x >= width || y >= height {
            return;
        }
        let offset = (y as usize * width as usize + x as usize) * BYTES_PER_PIXEL;
        framebuffer.pixels[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&rgba);
    }
}

impl Subsystem for HeadlessGraphics {
    fn name(&self) -> &str {
        "graphics"
    }

    fn init(&self) -> Result<(), SubsystemError> {
        if self.fail_init {
            return Err(SubsystemError::init_failed(
                "graphics",
                "unable to create a graphics context",
            ));
        }
        self.initialized.store(true, Ordering::SeqCst);
        log::info!("Headless graphics context ready ({}).", self.viewport_size());
        Ok(())
    }

    fn terminate(&self) {
        self.initialized.store(false, Ordering::SeqCst);
    }
}

impl GraphicsBackend for HeadlessGraphics {
    fn resize(&self, size: Size) {
        let mut framebuffer = self.framebuffer();
        if framebuffer.size != size {
            *framebuffer = Framebuffer::new(size);
            log::debug!("Viewport resized to {}.", size);
        }
    }

    fn viewport_size(&self) -> Size {
        self.framebuffer().size
    }

    fn read_pixels(&self) -> Vec<u8> {
        self.framebuffer().pixels.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_reallocates_the_framebuffer() {
        let graphics = HeadlessGraphics::new(Size::new(2, 2));
        assert_eq!(graphics.read_pixels().len(), 16);

        graphics.resize(Size::new(4, 3));
        assert_eq!(graphics.viewport_size(), Size::new(4, 3));
        assert_eq!(graphics.read_pixels().len(), 48);
    }

    #[test]
    fn pixels_are_stored_bottom_row_first() {
        let graphics = HeadlessGraphics::new(Size::new(2, 2));
        graphics.clear([0, 0, 0, 10]);
        graphics.put_pixel(1, 0, [255, 0, 0, 10]);
        graphics.put_pixel(7, 7, [1, 2, 3, 4]);

        let pixels = graphics.read_pixels();
        assert_eq!(&pixels[4..8], &[255, 0, 0, 10]);
        assert_eq!(&pixels[8..12], &[0, 0, 0, 10]);
    }

    #[test]
    fn init_can_be_made_to_fail() {
        let graphics = HeadlessGraphics::new(Size::new(1, 1)).failing_init();
        assert_eq!(graphics.init().unwrap_err().subsystem(), "graphics");
        assert!(!graphics.is_initialized());
    }
}
