//! Decoded image types

use image::RgbImage;

use crate::image_pipeline::common::error::{AnalysisError, Result};

/// A decoded three-channel image, interleaved in R, G, B order.
///
/// Always at least 1x1; the pixels cannot be mutated once wrapped.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pixels: RgbImage,
}

impl RawImage {
    pub const CHANNELS: usize = 3;

    pub fn new(pixels: RgbImage) -> Result<Self> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(AnalysisError::ValidationError(format!(
                "image has zero dimensions: width={width}, height={height}"
            )));
        }
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn channels(&self) -> usize {
        Self::CHANNELS
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.width() as usize * self.pixels.height() as usize
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn into_inner(self) -> RgbImage {
        self.pixels
    }
}
