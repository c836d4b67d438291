use image::GrayImage;
use imageproc::contrast::otsu_level;
use imageproc::filter::filter3x3;
use tracing::{debug, instrument};

use crate::image_pipeline::common::error::{AnalysisError, Result};
use crate::image_pipeline::config::AnalysisConfig;
use crate::image_pipeline::loader::RawImage;
use crate::image_pipeline::metrics::edges::detect_edges;
use crate::image_pipeline::metrics::types::{Extraction, MetricSet};
use crate::image_pipeline::metrics::views::DerivedViews;

const LAPLACIAN_KERNEL: [f32; 9] = [0.0, 1.0, 0.0, 1.0, -4.0, 1.0, 0.0, 1.0, 0.0];
const CHANNEL_MAX: f64 = 255.0;

/// Extracts [`MetricSet`] values from decoded images. Pure and deterministic.
#[derive(Debug, Clone)]
pub struct MetricExtractor {
    edge_low_threshold: f32,
    edge_high_threshold: f32,
    hue_max: f64,
    laplacian_max: f64,
}

impl MetricExtractor {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            edge_low_threshold: config.edge_low_threshold,
            edge_high_threshold: config.edge_high_threshold,
            hue_max: config.hue_max,
            laplacian_max: config.laplacian_max,
        }
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn extract(&self, image: &RawImage) -> Result<Extraction> {
        if image.pixel_count() == 0 {
            return Err(AnalysisError::ValidationError("cannot analyze an empty image".to_string()));
        }

        let views = DerivedViews::compute(image);
        let gray = views.gray();
        let pixel_count = image.pixel_count() as f64;

        let edges = detect_edges(gray, self.edge_low_threshold, self.edge_high_threshold);
        let edge_density = count_nonzero(&edges) as f64 / pixel_count;

        let hsv = views.hsv();
        let (_, hue_std) = mean_and_std(channel(hsv.as_raw(), 0));
        let (mean_saturation, _) = mean_and_std(channel(hsv.as_raw(), 1));
        let (mean_value, _) = mean_and_std(channel(hsv.as_raw(), 2));

        let coverage_threshold = otsu_level(gray);
        let covered = gray.pixels().filter(|p| p.0[0] > coverage_threshold).count();
        let coverage = covered as f64 / pixel_count;

        let laplacian_variance = laplacian_variance(gray);

        let metrics = MetricSet {
            edge_density,
            hue_std,
            color_uniformity: unit_clamp(1.0 - hue_std / self.hue_max),
            saturation_score: mean_saturation / CHANNEL_MAX,
            brightness_score: mean_value / CHANNEL_MAX,
            coverage,
            laplacian_variance,
            smoothness: unit_clamp(1.0 - laplacian_variance / self.laplacian_max),
        };
        debug!(?metrics, coverage_threshold, "Extracted surface metrics");

        Ok(Extraction {
            metrics,
            edges,
            coverage_threshold,
        })
    }
}

fn unit_clamp(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

fn channel(interleaved: &[u8], index: usize) -> impl Iterator<Item = u8> + Clone + '_ {
    interleaved.iter().skip(index).step_by(RawImage::CHANNELS).copied()
}

fn count_nonzero(mask: &GrayImage) -> usize {
    mask.as_raw().iter().filter(|&&v| v > 0).count()
}

/// Population mean and standard deviation, two-pass for stability.
fn mean_and_std<I>(values: I) -> (f64, f64)
where
    I: Iterator<Item = u8> + Clone,
{
    let (sum, count) = values.clone().fold((0.0f64, 0usize), |(s, n), v| (s + v as f64, n + 1));
    if count == 0 {
        return (0.0, 0.0);
    }
    let mean = sum / count as f64;
    let variance = values.map(|v| (v as f64 - mean).powi(2)).sum::<f64>() / count as f64;
    (mean, variance.sqrt())
}

fn laplacian_variance(gray: &GrayImage) -> f64 {
    let response: Vec<f32> = filter3x3::<_, f32, f32>(gray, &LAPLACIAN_KERNEL).into_raw();
    let n = response.len() as f64;
    let mean = response.iter().map(|&v| v as f64).sum::<f64>() / n;
    response.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn extractor() -> MetricExtractor {
        MetricExtractor::new(&AnalysisConfig::default())
    }

    fn raw(image: RgbImage) -> RawImage {
        RawImage::new(image).unwrap()
    }

    fn noise(width: u32, height: u32, seed: u64, gray: bool) -> RawImage {
        let mut rng = StdRng::seed_from_u64(seed);
        raw(RgbImage::from_fn(width, height, |_, _| {
            if gray {
                let v: u8 = rng.gen_range(0..=255);
                Rgb([v, v, v])
            } else {
                Rgb([rng.gen_range(0..=255), rng.gen_range(0..=255), rng.gen_range(0..=255)])
            }
        }))
    }

    #[test]
    fn uniform_image_is_smooth_and_edge_free() {
        let extraction = extractor()
            .extract(&raw(RgbImage::from_pixel(100, 100, Rgb([40, 90, 160]))))
            .unwrap();
        let m = extraction.metrics;

        assert_eq!(m.edge_density, 0.0);
        assert_eq!(m.laplacian_variance, 0.0);
        assert_eq!(m.smoothness, 1.0);
        assert_eq!(m.hue_std, 0.0);
        assert_eq!(m.color_uniformity, 1.0);
        assert_eq!(extraction.edges.dimensions(), (100, 100));
    }

    #[test]
    fn reference_coating_color() {
        // BGR (128, 128, 200) stored as RGB.
        let m = extractor()
            .extract(&raw(RgbImage::from_pixel(100, 100, Rgb([200, 128, 128]))))
            .unwrap()
            .metrics;

        assert_eq!(m.coverage, 1.0);
        assert_eq!(m.color_uniformity, 1.0);
        assert_eq!(m.smoothness, 1.0);
        assert_eq!(m.edge_density, 0.0);
        assert!((m.saturation_score - 92.0 / 255.0).abs() < 1e-12);
        assert!((m.brightness_score - 200.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn colour_noise_drives_smoothness_and_uniformity_down() {
        let m = extractor().extract(&noise(128, 128, 7, false)).unwrap().metrics;

        assert!(m.laplacian_variance > 5000.0, "variance {}", m.laplacian_variance);
        assert_eq!(m.smoothness, 0.0);
        assert!(m.color_uniformity < 0.6, "uniformity {}", m.color_uniformity);
        assert!(m.edge_density > 0.2, "edge density {}", m.edge_density);
    }

    #[test]
    fn grey_noise_is_edge_dense() {
        let m = extractor().extract(&noise(128, 128, 11, true)).unwrap().metrics;
        assert!(m.edge_density > 0.2, "edge density {}", m.edge_density);
        assert_eq!(m.smoothness, 0.0);
    }

    #[test]
    fn checkerboard_edges_follow_block_borders() {
        let board = RgbImage::from_fn(96, 96, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        });
        let extraction = extractor().extract(&raw(board)).unwrap();
        let m = extraction.metrics;

        assert!(m.edge_density > 0.1, "edge density {}", m.edge_density);
        assert!(m.edge_density < 0.9);
        assert!((m.coverage - 0.5).abs() < 1e-12);
        assert_eq!(extraction.edges.get_pixel(4, 4).0[0], 0);
    }

    #[test]
    fn split_image_coverage_counts_the_bright_half() {
        let split = RgbImage::from_fn(50, 40, |x, _| {
            if x < 25 { Rgb([10, 10, 10]) } else { Rgb([240, 240, 240]) }
        });
        let extraction = extractor().extract(&raw(split)).unwrap();
        assert!((extraction.metrics.coverage - 0.5).abs() < 1e-12);
        assert!(extraction.coverage_threshold >= 10 && extraction.coverage_threshold < 240);
    }

    #[test]
    fn extraction_is_deterministic() {
        let image = noise(64, 48, 3, false);
        let a = extractor().extract(&image).unwrap();
        let b = extractor().extract(&image).unwrap();
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.edges, b.edges);
    }

    #[test]
    fn normalisation_caps_come_from_config() {
        let config = AnalysisConfig::builder().laplacian_max(1e9).hue_max(1e6).build().unwrap();
        let m = MetricExtractor::new(&config)
            .extract(&noise(32, 32, 5, false))
            .unwrap()
            .metrics;
        assert!(m.smoothness > 0.99);
        assert!(m.color_uniformity > 0.99);
    }

    #[test]
    fn std_helper_matches_population_definition() {
        let (mean, std) = mean_and_std([2u8, 4, 4, 4, 5, 5, 7, 9].into_iter());
        assert_eq!(mean, 5.0);
        assert_eq!(std, 2.0);
    }
}
