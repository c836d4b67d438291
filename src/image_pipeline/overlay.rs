//! Diagnostic overlay module
//!
//! Blends the source image with its edge mask, annotates the composite
//! scores, and encodes the result for a caller-supplied sink.

mod font;
mod renderer;
mod standard_overlay_writer;
mod writer;

pub use font::{SYSTEM_FONT_PATHS, load_annotation_font};
pub use renderer::OverlayRenderer;
pub use standard_overlay_writer::{StandardOverlayWriter, encode_png_base64};
pub use writer::OverlayWriter;
