//! Composite index module
//!
//! Combines extracted metrics into the Coating Visual Index (CVI) and the
//! Coating Quality Index (CQI).

mod composer;
pub mod weights;

pub use composer::{CompositeScore, IndexComposer};
pub use weights::{QualityIndexWeights, VisualIndexWeights};
