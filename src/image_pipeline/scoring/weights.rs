//! Weight sets for the composite indices.
//!
//! Each set is checked at construction to sum to 1.0, and the fields are only
//! readable afterwards.

use crate::image_pipeline::common::error::{AnalysisError, Result};

/// Allowed drift of a weight sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

fn check_weights(name: &str, weights: &[f64]) -> Result<()> {
    if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(AnalysisError::ValidationError(format!(
            "{name} weight {w} must be a finite non-negative number"
        )));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(AnalysisError::ValidationError(format!(
            "{name} weights sum to {sum}, expected 1.0"
        )));
    }
    Ok(())
}

/// CVI weights: perceptual uniformity and surface smoothness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualIndexWeights {
    color_uniformity: f64,
    saturation: f64,
    smoothness: f64,
    edge_absence: f64,
}

impl VisualIndexWeights {
    pub const REFERENCE: Self = Self {
        color_uniformity: 0.30,
        saturation: 0.25,
        smoothness: 0.25,
        edge_absence: 0.20,
    };

    pub fn new(
        color_uniformity: f64,
        saturation: f64,
        smoothness: f64,
        edge_absence: f64,
    ) -> Result<Self> {
        check_weights("CVI", &[color_uniformity, saturation, smoothness, edge_absence])?;
        Ok(Self {
            color_uniformity,
            saturation,
            smoothness,
            edge_absence,
        })
    }

    pub fn color_uniformity(&self) -> f64 {
        self.color_uniformity
    }

    pub fn saturation(&self) -> f64 {
        self.saturation
    }

    pub fn smoothness(&self) -> f64 {
        self.smoothness
    }

    /// Weight applied to `1 - edge_density`.
    pub fn edge_absence(&self) -> f64 {
        self.edge_absence
    }

    pub fn sum(&self) -> f64 {
        self.color_uniformity + self.saturation + self.smoothness + self.edge_absence
    }
}

impl Default for VisualIndexWeights {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// CQI weights: physical coverage plus the shared smoothness/uniformity signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityIndexWeights {
    coverage: f64,
    color_uniformity: f64,
    smoothness: f64,
    brightness: f64,
}

impl QualityIndexWeights {
    pub const REFERENCE: Self = Self {
        coverage: 0.35,
        color_uniformity: 0.25,
        smoothness: 0.25,
        brightness: 0.15,
    };

    pub fn new(
        coverage: f64,
        color_uniformity: f64,
        smoothness: f64,
        brightness: f64,
    ) -> Result<Self> {
        check_weights("CQI", &[coverage, color_uniformity, smoothness, brightness])?;
        Ok(Self {
            coverage,
            color_uniformity,
            smoothness,
            brightness,
        })
    }

    pub fn coverage(&self) -> f64 {
        self.coverage
    }

    pub fn color_uniformity(&self) -> f64 {
        self.color_uniformity
    }

    pub fn smoothness(&self) -> f64 {
        self.smoothness
    }

    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    pub fn sum(&self) -> f64 {
        self.coverage + self.color_uniformity + self.smoothness + self.brightness
    }
}

impl Default for QualityIndexWeights {
    fn default() -> Self {
        Self::REFERENCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_weights_sum_to_one() {
        assert!((VisualIndexWeights::REFERENCE.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE);
        assert!((QualityIndexWeights::REFERENCE.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE);
    }

    #[test]
    fn reference_weights_pass_their_own_check() {
        let v = VisualIndexWeights::REFERENCE;
        let rebuilt = VisualIndexWeights::new(
            v.color_uniformity(),
            v.saturation(),
            v.smoothness(),
            v.edge_absence(),
        );
        assert_eq!(rebuilt.unwrap(), v);

        let q = QualityIndexWeights::REFERENCE;
        let rebuilt = QualityIndexWeights::new(
            q.coverage(),
            q.color_uniformity(),
            q.smoothness(),
            q.brightness(),
        );
        assert_eq!(rebuilt.unwrap(), q);
    }

    #[test]
    fn unbalanced_weights_are_rejected() {
        let result = VisualIndexWeights::new(0.3, 0.3, 0.3, 0.3);
        assert!(matches!(result, Err(AnalysisError::ValidationError(_))));

        let result = QualityIndexWeights::new(0.35, 0.25, 0.25, 0.10);
        assert!(matches!(result, Err(AnalysisError::ValidationError(_))));
    }

    #[test]
    fn negative_weights_are_rejected() {
        let result = QualityIndexWeights::new(1.2, -0.2, 0.0, 0.0);
        assert!(matches!(result, Err(AnalysisError::ValidationError(_))));
    }
}
