//! Pipeline orchestration module
//!
//! Runs the linear `load -> extract -> compose -> render (optional) -> assemble`
//! pass for one image, and fans many images out over a worker pool.

mod batch;
mod pipeline;


pub use batch::BatchAnalyzer;
pub use pipeline::{Analysis, CoatingAnalyzer, overlay_file_name};
