//! Frame helpers.
//!
//! Frames are plain `image` buffers, owned by whichever pipeline step is
//! processing them and replaced every cycle. Nothing here persists pixels.

use image::{GrayImage, RgbImage};

/// One captured frame plus its monotonic capture index.
pub struct Frame {
    pub pixels: RgbImage,
    /// 1-based capture index assigned by the source.
    pub index: u64,
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Horizontally mirror a frame (webcam "selfie" orientation).
pub fn mirror(frame: &RgbImage) -> RgbImage {
    image::imageops::flip_horizontal(frame)
}

/// Grayscale companion of a color frame.
pub fn to_gray(frame: &RgbImage) -> GrayImage {
    image::imageops::grayscale(frame)
}
