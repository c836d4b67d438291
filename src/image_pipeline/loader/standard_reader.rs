//! Raster reader backed by the `image` crate.
//!
//! Handles every raster format the crate is built with (PNG, JPEG, BMP, TIFF,
//! WebP, ...). Decoded pixels are converted to 8-bit RGB regardless of the
//! source bit depth or alpha channel.

use image::GenericImageView;
use tracing::debug;

use crate::image_pipeline::common::error::{AnalysisError, Result};
use crate::image_pipeline::loader::reader::RasterReader;
use crate::image_pipeline::loader::types::RawImage;

pub struct StandardRasterReader;

impl RasterReader for StandardRasterReader {
    /// Decodes an encoded image held in memory.
    ///
    /// # Returns
    ///
    /// * `Ok(RawImage)` - Successfully decoded image
    /// * `Err(AnalysisError::ValidationError)` - `data` is empty
    /// * `Err(AnalysisError::DecodeError)` - Not a supported raster, or it decodes to zero pixels
    fn read_image(&self, data: &[u8]) -> Result<RawImage> {
        if data.is_empty() {
            return Err(AnalysisError::ValidationError("image payload is empty".to_string()));
        }
        debug!("Decoding image, {} bytes", data.len());

        let decoded = image::load_from_memory(data)
            .map_err(|e| AnalysisError::DecodeError(e.to_string()))?;

        let (width, height) = decoded.dimensions();
        if width == 0 || height == 0 {
            return Err(AnalysisError::DecodeError(format!(
                "image decodes to zero dimensions: {width}x{height}"
            )));
        }
        debug!("Decoded image: {}x{} ({:?})", width, height, decoded.color());

        RawImage::new(decoded.to_rgb8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    #[test]
    fn decodes_png_bytes() {
        let source = RgbImage::from_pixel(8, 6, Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        source.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();

        let image = StandardRasterReader.read_image(&bytes).unwrap();
        assert_eq!((image.width(), image.height()), (8, 6));
        assert_eq!(image.pixels().get_pixel(3, 3), &Rgb([10, 20, 30]));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let result = StandardRasterReader.read_image(b"definitely not an image");
        assert!(matches!(result, Err(AnalysisError::DecodeError(_))));
    }

    #[test]
    fn empty_payload_is_a_validation_error() {
        let result = StandardRasterReader.read_image(&[]);
        assert!(matches!(result, Err(AnalysisError::ValidationError(_))));
    }
}
