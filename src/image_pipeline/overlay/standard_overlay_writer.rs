use std::io::{Cursor, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use tracing::debug;

use crate::image_pipeline::common::error::{AnalysisError, Result};
use crate::image_pipeline::config::{AnalysisConfig, OverlayFormat};
use crate::image_pipeline::overlay::writer::OverlayWriter;

pub struct StandardOverlayWriter;

impl OverlayWriter for StandardOverlayWriter {
    fn write_overlay(
        &self,
        overlay: &RgbImage,
        output: &mut dyn Write,
        config: &AnalysisConfig,
    ) -> Result<()> {
        debug!(
            "Encoding overlay {}x{} as {:?}",
            overlay.width(),
            overlay.height(),
            config.overlay_format
        );

        let buffer = encode(overlay, config.overlay_format)?;
        output
            .write_all(&buffer)
            .and_then(|_| output.flush())
            .map_err(|e| AnalysisError::render(format!("failed to write overlay: {e}")))?;

        debug!("Overlay encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}

fn encode(overlay: &RgbImage, format: OverlayFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoded = match format {
        OverlayFormat::Png => overlay.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png),
        OverlayFormat::Jpeg { quality } => {
            overlay.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))
        }
    };
    encoded.map_err(|e| AnalysisError::render(format!("failed to encode overlay: {e}")))?;
    Ok(buffer)
}

/// PNG-encodes the overlay and returns it as standard base64 text.
pub fn encode_png_base64(overlay: &RgbImage) -> Result<String> {
    Ok(STANDARD.encode(encode(overlay, OverlayFormat::Png)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::io;

    struct ClosedSink;

    impl Write for ClosedSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn overlay() -> RgbImage {
        RgbImage::from_pixel(16, 12, Rgb([70, 182, 140]))
    }

    #[test]
    fn png_output_decodes_back() {
        let mut output = Vec::new();
        StandardOverlayWriter
            .write_overlay(&overlay(), &mut output, &AnalysisConfig::default())
            .unwrap();

        let decoded = image::load_from_memory(&output).unwrap().to_rgb8();
        assert_eq!(decoded, overlay());
    }

    #[test]
    fn jpeg_output_has_jpeg_signature() {
        let config = AnalysisConfig::builder()
            .overlay_format(OverlayFormat::Jpeg { quality: 90 })
            .build()
            .unwrap();
        let mut output = Vec::new();
        StandardOverlayWriter.write_overlay(&overlay(), &mut output, &config).unwrap();
        assert_eq!(&output[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn failing_sink_is_a_render_error() {
        let config = AnalysisConfig::default();
        let result = StandardOverlayWriter.write_overlay(&overlay(), &mut ClosedSink, &config);
        assert!(matches!(result, Err(AnalysisError::RenderError { .. })));
    }

    #[test]
    fn base64_overlay_is_png() {
        let encoded = encode_png_base64(&overlay()).unwrap();
        let bytes = STANDARD.decode(encoded).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
