//! Analysis configuration module
//!
//! Every tunable constant of the pipeline lives in [`AnalysisConfig`].

pub mod types;

pub use types::{AnalysisConfig, AnalysisConfigBuilder, BlendWeights, OverlayFormat};
