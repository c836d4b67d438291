use crate::image_pipeline::config::AnalysisConfig;
use crate::image_pipeline::metrics::MetricSet;
use crate::image_pipeline::scoring::weights::{QualityIndexWeights, VisualIndexWeights};

/// Coating Visual Index and Coating Quality Index, both on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CompositeScore {
    pub cvi: f64,
    pub cqi: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IndexComposer {
    visual: VisualIndexWeights,
    quality: QualityIndexWeights,
}

impl IndexComposer {
    pub fn new(visual: VisualIndexWeights, quality: QualityIndexWeights) -> Self {
        Self { visual, quality }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.visual_weights, config.quality_weights)
    }

    pub fn compose(&self, m: &MetricSet) -> CompositeScore {
        let v = &self.visual;
        let cvi = v.color_uniformity() * m.color_uniformity
            + v.saturation() * m.saturation_score
            + v.smoothness() * m.smoothness
            + v.edge_absence() * (1.0 - m.edge_density);

        let q = &self.quality;
        let cqi = q.coverage() * m.coverage
            + q.color_uniformity() * m.color_uniformity
            + q.smoothness() * m.smoothness
            + q.brightness() * m.brightness_score;

        CompositeScore {
            cvi: to_percent(cvi),
            cqi: to_percent(cqi),
        }
    }
}

fn to_percent(fraction: f64) -> f64 {
    (fraction * 100.0).clamp(0.0, 100.0)
}
