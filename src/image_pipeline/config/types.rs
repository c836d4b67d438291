//! Analysis configuration types

use std::path::PathBuf;
use std::time::Duration;

use crate::image_pipeline::common::error::{AnalysisError, Result};
use crate::image_pipeline::scoring::{QualityIndexWeights, VisualIndexWeights};

/// Encoding used when an overlay is written to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayFormat {
    /// Lossless PNG (default)
    Png,
    /// JPEG with the given quality (1-100)
    Jpeg { quality: u8 },
}

impl OverlayFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OverlayFormat::Png => "png",
            OverlayFormat::Jpeg { .. } => "jpg",
        }
    }
}

/// Alpha-blend weights for the overlay: `out = image * original + mask * edges`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
    pub image: f32,
    pub mask: f32,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self { image: 0.7, mask: 0.3 }
    }
}

/// Configuration for coating analysis
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Canny hysteresis low threshold
    pub edge_low_threshold: f32,
    /// Canny hysteresis high threshold
    pub edge_high_threshold: f32,
    /// Hue standard deviation mapped to zero color uniformity (H_MAX)
    pub hue_max: f64,
    /// Laplacian variance mapped to zero smoothness (L_MAX)
    pub laplacian_max: f64,
    pub visual_weights: VisualIndexWeights,
    pub quality_weights: QualityIndexWeights,
    pub blend: BlendWeights,
    /// RGB color painted on edge pixels in the overlay mask
    pub highlight_color: [u8; 3],
    /// RGB color of the score annotations
    pub text_color: [u8; 3],
    /// Annotation glyph height in pixels
    pub font_scale: f32,
    /// Font used for annotations. When unset, common system fonts are tried.
    pub font_path: Option<PathBuf>,
    /// Decimal places kept in reported values
    pub decimals: u32,
    /// Downscale images whose longest side exceeds this many pixels
    pub max_side: Option<u32>,
    /// Upper bound on a remote image fetch
    pub fetch_timeout: Duration,
    pub overlay_format: OverlayFormat,
    /// Worker threads for batch analysis; None means one per available core
    pub workers: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            edge_low_threshold: 50.0,
            edge_high_threshold: 150.0,
            hue_max: 90.0,
            laplacian_max: 5000.0,
            visual_weights: VisualIndexWeights::default(),
            quality_weights: QualityIndexWeights::default(),
            blend: BlendWeights::default(),
            highlight_color: [0, 255, 0],
            text_color: [255, 255, 255],
            font_scale: 22.0,
            font_path: None,
            decimals: 2,
            max_side: None,
            fetch_timeout: Duration::from_secs(15),
            overlay_format: OverlayFormat::Png,
            workers: None,
        }
    }
}

impl AnalysisConfig {
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(AnalysisError::ValidationError(msg));

        let (low, high) = (self.edge_low_threshold, self.edge_high_threshold);
        if !(low >= 0.0 && low <= high) {
            return invalid(format!(
                "edge thresholds must satisfy 0 <= low <= high, got {}/{}",
                self.edge_low_threshold, self.edge_high_threshold
            ));
        }
        if !(self.hue_max > 0.0 && self.hue_max.is_finite()) {
            return invalid(format!("hue_max must be positive, got {}", self.hue_max));
        }
        if !(self.laplacian_max > 0.0 && self.laplacian_max.is_finite()) {
            return invalid(format!("laplacian_max must be positive, got {}", self.laplacian_max));
        }
        let in_unit = |w: f32| (0.0..=1.0).contains(&w);
        if !in_unit(self.blend.image) || !in_unit(self.blend.mask) {
            return invalid(format!(
                "blend weights must lie in [0, 1], got {}/{}",
                self.blend.image, self.blend.mask
            ));
        }
        if !(self.font_scale > 0.0) {
            return invalid(format!("font_scale must be positive, got {}", self.font_scale));
        }
        if self.decimals > 10 {
            return invalid(format!("decimals must be at most 10, got {}", self.decimals));
        }
        if self.max_side == Some(0) {
            return invalid("max_side must be at least 1 pixel".to_string());
        }
        if self.fetch_timeout.is_zero() {
            return invalid("fetch_timeout must be non-zero".to_string());
        }
        if let OverlayFormat::Jpeg { quality } = self.overlay_format {
            if !(1..=100).contains(&quality) {
                return invalid(format!("JPEG quality must be 1-100, got {quality}"));
            }
        }
        if self.workers == Some(0) {
            return invalid("workers must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Builder for AnalysisConfig
#[derive(Default)]
pub struct AnalysisConfigBuilder {
    edge_thresholds: Option<(f32, f32)>,
    hue_max: Option<f64>,
    laplacian_max: Option<f64>,
    visual_weights: Option<VisualIndexWeights>,
    quality_weights: Option<QualityIndexWeights>,
    blend: Option<BlendWeights>,
    highlight_color: Option<[u8; 3]>,
    text_color: Option<[u8; 3]>,
    font_scale: Option<f32>,
    font_path: Option<Option<PathBuf>>,
    decimals: Option<u32>,
    max_side: Option<Option<u32>>,
    fetch_timeout: Option<Duration>,
    overlay_format: Option<OverlayFormat>,
    workers: Option<Option<usize>>,
}

impl AnalysisConfigBuilder {
    pub fn edge_thresholds(mut self, low: f32, high: f32) -> Self {
        self.edge_thresholds = Some((low, high));
        self
    }

    pub fn hue_max(mut self, hue_max: f64) -> Self {
        self.hue_max = Some(hue_max);
        self
    }

    pub fn laplacian_max(mut self, laplacian_max: f64) -> Self {
        self.laplacian_max = Some(laplacian_max);
        self
    }

    pub fn visual_weights(mut self, weights: VisualIndexWeights) -> Self {
        self.visual_weights = Some(weights);
        self
    }

    pub fn quality_weights(mut self, weights: QualityIndexWeights) -> Self {
        self.quality_weights = Some(weights);
        self
    }

    pub fn blend(mut self, image: f32, mask: f32) -> Self {
        self.blend = Some(BlendWeights { image, mask });
        self
    }

    pub fn highlight_color(mut self, rgb: [u8; 3]) -> Self {
        self.highlight_color = Some(rgb);
        self
    }

    pub fn text_color(mut self, rgb: [u8; 3]) -> Self {
        self.text_color = Some(rgb);
        self
    }

    pub fn font_scale(mut self, scale: f32) -> Self {
        self.font_scale = Some(scale);
        self
    }

    pub fn font_path(mut self, path: Option<PathBuf>) -> Self {
        self.font_path = Some(path);
        self
    }

    pub fn decimals(mut self, decimals: u32) -> Self {
        self.decimals = Some(decimals);
        self
    }

    pub fn max_side(mut self, max_side: Option<u32>) -> Self {
        self.max_side = Some(max_side);
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub fn overlay_format(mut self, format: OverlayFormat) -> Self {
        self.overlay_format = Some(format);
        self
    }

    pub fn workers(mut self, workers: Option<usize>) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig> {
        let default = AnalysisConfig::default();
        let (edge_low_threshold, edge_high_threshold) = self
            .edge_thresholds
            .unwrap_or((default.edge_low_threshold, default.edge_high_threshold));
        let config = AnalysisConfig {
            edge_low_threshold,
            edge_high_threshold,
            hue_max: self.hue_max.unwrap_or(default.hue_max),
            laplacian_max: self.laplacian_max.unwrap_or(default.laplacian_max),
            visual_weights: self.visual_weights.unwrap_or(default.visual_weights),
            quality_weights: self.quality_weights.unwrap_or(default.quality_weights),
            blend: self.blend.unwrap_or(default.blend),
            highlight_color: self.highlight_color.unwrap_or(default.highlight_color),
            text_color: self.text_color.unwrap_or(default.text_color),
            font_scale: self.font_scale.unwrap_or(default.font_scale),
            font_path: self.font_path.unwrap_or(default.font_path),
            decimals: self.decimals.unwrap_or(default.decimals),
            max_side: self.max_side.unwrap_or(default.max_side),
            fetch_timeout: self.fetch_timeout.unwrap_or(default.fetch_timeout),
            overlay_format: self.overlay_format.unwrap_or(default.overlay_format),
            workers: self.workers.unwrap_or(default.workers),
        };
        config.validate()?;
        Ok(config)
    }
}
