use std::io::Write;

use image::RgbImage;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::config::AnalysisConfig;

pub trait OverlayWriter {
    fn write_overlay(
        &self,
        overlay: &RgbImage,
        output: &mut dyn Write,
        config: &AnalysisConfig,
    ) -> Result<()>;
}
