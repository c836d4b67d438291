//! Metric extraction results

use image::GrayImage;

/// Independent surface features of one image.
///
/// Fractions are in `[0, 1]`; `hue_std` and `laplacian_variance` are raw magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricSet {
    /// Fraction of pixels on a detected edge
    pub edge_density: f64,
    /// Standard deviation of the hue channel (0..180 scale)
    pub hue_std: f64,
    /// `1 - hue_std / H_MAX`, clamped
    pub color_uniformity: f64,
    /// Mean saturation over its channel maximum
    pub saturation_score: f64,
    /// Mean value (brightness) over its channel maximum
    pub brightness_score: f64,
    /// Fraction of grayscale pixels above the Otsu threshold
    pub coverage: f64,
    /// Variance of the Laplacian response on grayscale
    pub laplacian_variance: f64,
    /// `1 - laplacian_variance / L_MAX`, clamped
    pub smoothness: f64,
}

/// Metrics plus the intermediate results the overlay renderer reuses.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub metrics: MetricSet,
    /// Binary edge mask (255 on edges), same size as the source image
    pub edges: GrayImage,
    /// Intensity threshold chosen for `coverage`
    pub coverage_threshold: u8,
}
