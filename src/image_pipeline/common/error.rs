use thiserror::Error;

use crate::image_pipeline::report::AnalysisRecord;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to fetch remote image: {0}")]
    FetchError(String),

    /// Overlay construction failed. When raised after extraction, `record`
    /// holds the metrics that were already computed.
    #[error("Failed to render overlay: {reason}")]
    RenderError {
        reason: String,
        record: Option<Box<AnalysisRecord>>,
    },

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AnalysisError {
    pub fn render(reason: impl Into<String>) -> Self {
        Self::RenderError {
            reason: reason.into(),
            record: None,
        }
    }

    /// Attaches the assembled metrics to a render failure. Other kinds pass through.
    pub fn with_record(self, record: AnalysisRecord) -> Self {
        match self {
            Self::RenderError { reason, .. } => Self::RenderError {
                reason,
                record: Some(Box::new(record)),
            },
            other => other,
        }
    }

    pub fn partial_record(&self) -> Option<&AnalysisRecord> {
        match self {
            Self::RenderError { record, .. } => record.as_deref(),
            _ => None,
        }
    }

    /// Only remote fetches are worth retrying; the pipeline itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::FetchError(_))
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
