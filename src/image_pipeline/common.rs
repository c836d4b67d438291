//! Common utilities module
//!
//! This module contains the error taxonomy and stage timing helpers shared
//! across the analysis pipeline.

pub mod error;
pub mod timing;

pub use error::{AnalysisError, Result};
pub use timing::{PipelineTimings, StepTiming, Timer};
