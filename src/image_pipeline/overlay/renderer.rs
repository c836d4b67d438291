use ab_glyph::{FontVec, PxScale};
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use tracing::{debug, instrument};

use crate::image_pipeline::common::error::{AnalysisError, Result};
use crate::image_pipeline::config::{AnalysisConfig, BlendWeights};
use crate::image_pipeline::loader::RawImage;
use crate::image_pipeline::overlay::font::load_annotation_font;
use crate::image_pipeline::report::ReportedMetrics;

const TEXT_X: i32 = 10;
const TEXT_TOP: i32 = 10;
const LINE_HEIGHT: i32 = 30;

enum AnnotationFont {
    Loaded(FontVec),
    Unavailable,
    /// A configured font that failed to load
    Broken(String),
}

/// Renders the diagnostic overlay: `blend.image * source + blend.mask * edge_mask`,
/// with CVI, CQI and coverage written top to bottom in the upper-left corner.
pub struct OverlayRenderer {
    blend: BlendWeights,
    highlight_color: Rgb<u8>,
    text_color: Rgb<u8>,
    scale: PxScale,
    decimals: usize,
    font: AnnotationFont,
}

impl OverlayRenderer {
    /// Loads the annotation font from `config`.
    ///
    /// A configured font that cannot be loaded is not an error here; it is
    /// reported by every later [`render`](Self::render) call.
    pub fn new(config: &AnalysisConfig) -> Self {
        let font = match load_annotation_font(config.font_path.as_deref()) {
            Ok(Some(font)) => AnnotationFont::Loaded(font),
            Ok(None) => AnnotationFont::Unavailable,
            Err(AnalysisError::RenderError { reason, .. }) => AnnotationFont::Broken(reason),
            Err(e) => AnnotationFont::Broken(e.to_string()),
        };
        Self::with_state(config, font)
    }

    pub fn with_font(config: &AnalysisConfig, font: Option<FontVec>) -> Self {
        let font = font.map_or(AnnotationFont::Unavailable, AnnotationFont::Loaded);
        Self::with_state(config, font)
    }

    fn with_state(config: &AnalysisConfig, font: AnnotationFont) -> Self {
        Self {
            blend: config.blend,
            highlight_color: Rgb(config.highlight_color),
            text_color: Rgb(config.text_color),
            scale: PxScale::from(config.font_scale),
            decimals: config.decimals as usize,
            font,
        }
    }

    /// Whether score annotations can be drawn (an annotation font is loaded).
    pub fn can_annotate(&self) -> bool {
        matches!(self.font, AnnotationFont::Loaded(_))
    }

    /// Why the configured font could not be loaded, if it could not.
    pub fn font_error(&self) -> Option<&str> {
        match &self.font {
            AnnotationFont::Broken(reason) => Some(reason),
            _ => None,
        }
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn render(
        &self,
        image: &RawImage,
        edges: &GrayImage,
        scores: &ReportedMetrics,
    ) -> Result<RgbImage> {
        if let AnnotationFont::Broken(reason) = &self.font {
            return Err(AnalysisError::render(reason.clone()));
        }

        let source = image.pixels();
        if edges.dimensions() != source.dimensions() {
            return Err(AnalysisError::render(format!(
                "edge mask is {}x{} but image is {}x{}",
                edges.width(),
                edges.height(),
                source.width(),
                source.height()
            )));
        }

        let mut overlay = RgbImage::new(source.width(), source.height());
        for ((out, src), edge) in overlay.pixels_mut().zip(source.pixels()).zip(edges.pixels()) {
            let mask = if edge.0[0] > 0 { self.highlight_color } else { Rgb([0, 0, 0]) };
            for c in 0..RawImage::CHANNELS {
                out.0[c] = self.mix(src.0[c], mask.0[c]);
            }
        }

        match &self.font {
            AnnotationFont::Loaded(font) => {
                for (i, line) in self.annotation_lines(scores).iter().enumerate() {
                    let y = TEXT_TOP + LINE_HEIGHT * i as i32;
                    draw_text_mut(&mut overlay, self.text_color, TEXT_X, y, self.scale, font, line);
                }
            }
            _ => debug!("No annotation font loaded, rendering overlay without text"),
        }

        Ok(overlay)
    }

    pub fn annotation_lines(&self, scores: &ReportedMetrics) -> Vec<String> {
        [("CVI", scores.cvi), ("CQI", scores.cqi), ("COVERAGE", scores.coverage)]
            .iter()
            .map(|(label, value)| format!("{label}: {value:.prec$}%", prec = self.decimals))
            .collect()
    }

    fn mix(&self, source: u8, mask: u8) -> u8 {
        let value = self.blend.image * source as f32 + self.blend.mask * mask as f32;
        value.round_ties_even().clamp(0.0, 255.0) as u8
    }
}
