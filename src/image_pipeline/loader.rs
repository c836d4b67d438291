//! Image loading module
//!
//! Turns raw bytes, base64 text, a file path or a remote URL into a decoded
//! [`RawImage`].

mod fetcher;
mod image_loader;
mod reader;
mod source;
mod standard_reader;
pub mod types;

pub use fetcher::{HttpFetcher, ImageFetcher};
pub use image_loader::{ImageLoader, downscale};
pub use reader::RasterReader;
pub use source::{ImageSource, decode_base64};
pub use standard_reader::StandardRasterReader;
pub use types::RawImage;
