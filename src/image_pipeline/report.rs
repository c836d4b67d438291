//! Result assembly module
//!
//! Packages metrics and composite scores into the fixed output record.

mod assembler;
pub mod types;

pub use assembler::ResultAssembler;
pub use types::{AnalysisRecord, HEURISTIC_NOTE, ReportedMetrics};
