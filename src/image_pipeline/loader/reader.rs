use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::loader::types::RawImage;

pub trait RasterReader {
    fn read_image(&self, data: &[u8]) -> Result<RawImage>;
}
