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

//! A small animated scene rendered into the headless viewport.

use pulse_core::{DrawEvents, DrawPoolType, GraphicsBackend, Size};
use pulse_infra::{HeadlessGraphics, HeadlessWindow};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Sweeps a column across the viewport and asks the window to close after a
/// fixed number of map frames.
pub struct DemoScene {
    graphics: Arc<HeadlessGraphics>,
    window: Arc<HeadlessWindow>,
    frame_limit: u64,
    frame: AtomicU64,
    map_frames: AtomicU64,
    foreground_frames: AtomicU64,
    close_requested: AtomicBool,
}

impl DemoScene {
    pub fn new(
        graphics: Arc<HeadlessGraphics>,
        window: Arc<HeadlessWindow>,
        frame_limit: u64,
    ) -> Self {
        Self {
            graphics,
            window,
            frame_limit,
            frame: AtomicU64::new(0),
            map_frames: AtomicU64::new(0),
            foreground_frames: AtomicU64::new(0),
            close_requested: AtomicBool::new(false),
        }
    }

    pub fn map_frames(&self) -> u64 {
        self.map_frames.load(Ordering::SeqCst)
    }

    pub fn foreground_frames(&self) -> u64 {
        self.foreground_frames.load(Ordering::SeqCst)
    }

    fn paint_column(&self, frame: u64) {
        let Size { width, height } = self.graphics.viewport_size();
        if width == 0 {
            return;
        }
        let x = (frame % u64::from(width)) as u32;
        let shade = (frame % 256) as u8;
        for y in 0..height {
            self.graphics.put_pixel(x, y, [shade, 96, 255 - shade, 255]);
        }
    }
}

impl DrawEvents for DemoScene {
    fn can_draw(&self, pass: DrawPoolType) -> bool {
        match pass {
            DrawPoolType::Map | DrawPoolType::Foreground => true,
            // Lighting only every other frame.
            DrawPoolType::Light => self.frame.load(Ordering::SeqCst) % 2 == 0,
            DrawPoolType::ForegroundMap => false,
        }
    }

    fn pre_load(&self) {
        self.frame.fetch_add(1, Ordering::SeqCst);
    }

    fn draw(&self, pass: DrawPoolType) {
        match pass {
            DrawPoolType::Map => {
                let frame = self.frame.load(Ordering::SeqCst);
                self.paint_column(frame);
                let drawn = self.map_frames.fetch_add(1, Ordering::SeqCst) + 1;
                if drawn >= self.frame_limit && !self.close_requested.swap(true, Ordering::SeqCst)
                {
                    log::info!("Drew {} map frames; closing the window.", drawn);
                    self.window.request_close();
                }
            }
            DrawPoolType::Foreground => {
                self.foreground_frames.fetch_add(1, Ordering::SeqCst);
            }
            DrawPoolType::Light | DrawPoolType::ForegroundMap => {
                log::trace!("{} pass drawn.", pass);
            }
        }
    }
}
