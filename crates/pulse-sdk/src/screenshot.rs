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

//! Viewport capture to PNG.

use image::{ImageFormat, RgbaImage};
use pulse_core::Size;
use std::path::Path;
use thiserror::Error;

/// File name used when none is given.
pub const DEFAULT_SCREENSHOT_FILE: &str = "screenshot.png";

/// Errors raised while encoding a screenshot.
#[derive(Debug, Error)]
pub enum ScreenshotError {
    /// The pixel buffer does not match the viewport size.
    #[error("pixel buffer holds {actual} bytes, expected {expected} for {size}")]
    BufferSize {
        /// Viewport size.
        size: Size,
        /// Bytes needed for `size`.
        expected: usize,
        /// Bytes received.
        actual: usize,
    },
    /// Encoding or writing failed.
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Writes a read-back viewport to `path` as PNG.
///
/// `pixels` are RGBA8 rows, bottom row first. The image is flipped upright
/// and made fully opaque before encoding.
pub fn save_screenshot(path: &Path, size: Size, pixels: Vec<u8>) -> Result<(), ScreenshotError> {
    let expected = size.area() * 4;
    let actual = pixels.len();
    let mut image = RgbaImage::from_raw(size.width, size.height, pixels).ok_or(
        ScreenshotError::BufferSize {
            size,
            expected,
            actual,
        },
    )?;

    image::imageops::flip_vertical_in_place(&mut image);
    for pixel in image.pixels_mut() {
        pixel.0[3] = u8::MAX;
    }

    image.save_with_format(path, ImageFormat::Png)?;
    log::info!("Screenshot saved to '{}'.", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_an_upright_opaque_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");

        // Bottom row red, top row blue, half transparent.
        let mut pixels = Vec::new();
        pixels.extend_from_slice(&[255, 0, 0, 128, 255, 0, 0, 128]);
        pixels.extend_from_slice(&[0, 0, 255, 128, 0, 0, 255, 128]);

        save_screenshot(&path, Size::new(2, 2), pixels).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(decoded.get_pixel(1, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn mismatched_buffer_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_screenshot(&dir.path().join("bad.png"), Size::new(4, 4), vec![0; 7]).unwrap_err();
        assert!(matches!(
            err,
            ScreenshotError::BufferSize {
                expected: 64,
                actual: 7,
                ..
            }
        ));
    }

    #[test]
    fn unwritable_path_is_an_image_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("shot.png");
        let err = save_screenshot(&path, Size::new(1, 1), vec![0; 4]).unwrap_err();
        assert!(matches!(err, ScreenshotError::Image(_)));
    }
}
