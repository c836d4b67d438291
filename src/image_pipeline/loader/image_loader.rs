use std::borrow::Cow;
use std::path::Path;

use image::imageops::{self, FilterType};
use tracing::{debug, instrument};

use crate::image_pipeline::common::error::{AnalysisError, Result};
use crate::image_pipeline::config::AnalysisConfig;
use crate::image_pipeline::loader::{
    HttpFetcher, ImageFetcher, ImageSource, RasterReader, RawImage, StandardRasterReader,
    decode_base64,
};

/// Resolves an [`ImageSource`] to bytes and decodes them with one reader,
/// so every source kind goes through the same decode path.
pub struct ImageLoader<R: RasterReader, F: ImageFetcher> {
    reader: R,
    fetcher: F,
    max_side: Option<u32>,
}

impl ImageLoader<StandardRasterReader, HttpFetcher> {
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        Ok(Self {
            reader: StandardRasterReader,
            fetcher: HttpFetcher::new(config.fetch_timeout)?,
            max_side: config.max_side,
        })
    }
}

impl<R: RasterReader, F: ImageFetcher> ImageLoader<R, F> {
    pub fn with_custom(reader: R, fetcher: F, max_side: Option<u32>) -> Self {
        Self {
            reader,
            fetcher,
            max_side,
        }
    }

    #[instrument(skip_all, fields(source = source.kind()))]
    pub fn load(&self, source: &ImageSource) -> Result<RawImage> {
        let bytes: Cow<'_, [u8]> = match source {
            ImageSource::Bytes(bytes) => Cow::Borrowed(bytes.as_slice()),
            ImageSource::Base64(text) => Cow::Owned(decode_base64(text)?),
            ImageSource::Url(url) => Cow::Owned(self.fetcher.fetch(url)?),
            ImageSource::File(path) => Cow::Owned(read_file(path)?),
        };
        self.decode(&bytes)
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<RawImage> {
        let image = self.reader.read_image(bytes)?;
        match self.max_side {
            Some(max_side) => downscale(image, max_side),
            None => Ok(image),
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| AnalysisError::InputReadError(format!("{}: {}", path.display(), e)))
}

/// Shrinks `image` so its longest side is at most `max_side`, keeping the aspect ratio.
pub fn downscale(image: RawImage, max_side: u32) -> Result<RawImage> {
    let (width, height) = (image.width(), image.height());
    let longest = width.max(height);
    if max_side == 0 {
        return Err(AnalysisError::ValidationError("max_side must be at least 1 pixel".to_string()));
    }
    if longest <= max_side {
        return Ok(image);
    }

    let scale = max_side as f64 / longest as f64;
    let new_width = ((width as f64 * scale) as u32).max(1);
    let new_height = ((height as f64 * scale) as u32).max(1);
    debug!("Downscaling {}x{} to {}x{}", width, height, new_width, new_height);

    RawImage::new(imageops::resize(image.pixels(), new_width, new_height, FilterType::Triangle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::cell::Cell;
    use std::io::Cursor;

    struct CountingReader {
        calls: Cell<usize>,
    }

    impl RasterReader for CountingReader {
        fn read_image(&self, data: &[u8]) -> Result<RawImage> {
            self.calls.set(self.calls.get() + 1);
            StandardRasterReader.read_image(data)
        }
    }

    struct StaticFetcher {
        body: Option<Vec<u8>>,
    }

    impl ImageFetcher for StaticFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.body
                .clone()
                .ok_or_else(|| AnalysisError::FetchError(format!("{url}: unreachable")))
        }
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 90])
        });
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    fn loader(
        body: Option<Vec<u8>>,
        max_side: Option<u32>,
    ) -> ImageLoader<CountingReader, StaticFetcher> {
        let reader = CountingReader { calls: Cell::new(0) };
        ImageLoader::with_custom(reader, StaticFetcher { body }, max_side)
    }

    #[test]
    fn every_source_kind_decodes_to_the_same_pixels() {
        use base64::Engine;

        let bytes = png_bytes(12, 9);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.png");
        std::fs::write(&path, &bytes).unwrap();

        let loader = loader(Some(bytes.clone()), None);
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);

        let from_bytes = loader.load(&ImageSource::Bytes(bytes)).unwrap();
        let from_file = loader.load(&ImageSource::File(path)).unwrap();
        let from_base64 = loader.load(&ImageSource::Base64(encoded)).unwrap();
        let from_url = loader.load(&ImageSource::Url("http://host/panel.png".into())).unwrap();

        assert_eq!(from_bytes, from_file);
        assert_eq!(from_bytes, from_base64);
        assert_eq!(from_bytes, from_url);
        assert_eq!(loader.reader.calls.get(), 4);
    }

    #[test]
    fn fetch_failure_stops_before_decoding() {
        let loader = loader(None, None);
        let result = loader.load(&ImageSource::Url("http://host/missing.png".into()));
        assert!(matches!(result, Err(AnalysisError::FetchError(_))));
        assert_eq!(loader.reader.calls.get(), 0);
    }

    #[test]
    fn missing_file_is_an_input_read_error() {
        let loader = loader(None, None);
        let result = loader.load(&ImageSource::File("/nonexistent/panel.png".into()));
        assert!(matches!(result, Err(AnalysisError::InputReadError(_))));
    }

    #[test]
    fn oversized_images_are_capped_when_configured() {
        let loader = loader(None, Some(40));
        let image = loader.load(&ImageSource::Bytes(png_bytes(100, 50))).unwrap();
        assert_eq!((image.width(), image.height()), (40, 20));
    }

    #[test]
    fn small_images_are_left_alone() {
        let image = RawImage::new(RgbImage::new(30, 10)).unwrap();
        let same = downscale(image.clone(), 30).unwrap();
        assert_eq!(image, same);
    }

    #[test]
    fn extreme_aspect_ratio_keeps_one_pixel() {
        let image = RawImage::new(RgbImage::new(1000, 1)).unwrap();
        let scaled = downscale(image, 10).unwrap();
        assert_eq!((scaled.width(), scaled.height()), (10, 1));
    }
}
