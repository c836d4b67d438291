use std::path::Path;

use crate::image_pipeline::config::AnalysisConfig;
use crate::image_pipeline::metrics::MetricSet;
use crate::image_pipeline::report::types::{AnalysisRecord, HEURISTIC_NOTE, ReportedMetrics};
use crate::image_pipeline::scoring::CompositeScore;

/// Rounds and clamps pipeline outputs into an [`AnalysisRecord`]. Infallible.
#[derive(Debug, Clone, Copy)]
pub struct ResultAssembler {
    decimals: u32,
}

impl Default for ResultAssembler {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl ResultAssembler {
    pub fn new(decimals: u32) -> Self {
        Self { decimals }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.decimals)
    }

    pub fn report(&self, metrics: &MetricSet, scores: &CompositeScore) -> ReportedMetrics {
        ReportedMetrics {
            cvi: self.round(scores.cvi.clamp(0.0, 100.0)),
            cqi: self.round(scores.cqi.clamp(0.0, 100.0)),
            coverage: self.percent(metrics.coverage),
            color_uniformity: self.percent(metrics.color_uniformity),
            smoothness: self.percent(metrics.smoothness),
            edge_density: self.percent(metrics.edge_density),
            saturation_score: self.percent(metrics.saturation_score),
            brightness_score: self.percent(metrics.brightness_score),
            laplacian_variance: self.round(metrics.laplacian_variance.max(0.0)),
        }
    }

    pub fn assemble(&self, metrics: ReportedMetrics, overlay: Option<&Path>) -> AnalysisRecord {
        AnalysisRecord {
            metrics,
            note: HEURISTIC_NOTE.to_string(),
            output_path: overlay.map(|p| p.display().to_string()),
        }
    }

    fn percent(&self, fraction: f64) -> f64 {
        self.round((fraction * 100.0).clamp(0.0, 100.0))
    }

    fn round(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.decimals as i32);
        (value * factor).round() / factor
    }
}
