//! Surface metric extraction module
//!
//! Computes the derived grayscale and HSV views once per image and extracts
//! the independent scalar features the composite indices are built from.

pub mod edges;
mod extractor;
pub mod types;
pub mod views;

pub use edges::detect_edges;
pub use extractor::MetricExtractor;
pub use types::{Extraction, MetricSet};
pub use views::{DerivedViews, HsvImage};
