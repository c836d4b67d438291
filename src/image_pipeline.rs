//! Coating analysis pipeline module
//!
//! Decoding, surface metric extraction, CVI/CQI composition, overlay
//! rendering and result assembly, each in its own module, with
//! orchestration in `analysis`.

pub mod analysis;
pub mod common;
pub mod config;
pub mod loader;
pub mod metrics;
pub mod overlay;
pub mod report;
pub mod scoring;

pub use common::{
    AnalysisError,
    PipelineTimings,
    Result,
};

pub use config::{
    AnalysisConfig,
    AnalysisConfigBuilder,
    BlendWeights,
    OverlayFormat,
};

pub use loader::{
    HttpFetcher,
    ImageFetcher,
    ImageLoader,
    ImageSource,
    RasterReader,
    RawImage,
    StandardRasterReader,
};

pub use metrics::{
    MetricExtractor,
    MetricSet,
};

pub use scoring::{
    CompositeScore,
    IndexComposer,
};

pub use overlay::{
    OverlayRenderer,
    OverlayWriter,
    StandardOverlayWriter,
};

pub use report::{
    AnalysisRecord,
    HEURISTIC_NOTE,
    ReportedMetrics,
    ResultAssembler,
};

pub use analysis::{
    BatchAnalyzer,
    CoatingAnalyzer,
};
