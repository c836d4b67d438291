//! Output record types

use serde::{Deserialize, Serialize};

/// Disclosure attached to every record.
pub const HEURISTIC_NOTE: &str = concat!(
    "Heuristic image analysis (edge, color and texture statistics)",
    " - not the output of a trained model"
);

/// Reported values: percentages in `[0, 100]` except `laplacian_variance`,
/// all rounded to the configured precision.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportedMetrics {
    pub cvi: f64,
    pub cqi: f64,
    pub coverage: f64,
    pub color_uniformity: f64,
    pub smoothness: f64,
    pub edge_density: f64,
    pub saturation_score: f64,
    pub brightness_score: f64,
    pub laplacian_variance: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisRecord {
    #[serde(flatten)]
    pub metrics: ReportedMetrics,
    pub note: String,
    /// Where the overlay was written, when one was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}
