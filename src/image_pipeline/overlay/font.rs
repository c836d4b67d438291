use std::path::Path;

use ab_glyph::FontVec;
use tracing::debug;

use crate::image_pipeline::common::error::{AnalysisError, Result};

/// Fonts tried, in order, when no annotation font is configured.
pub const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Loads the font used for score annotations.
///
/// An explicitly configured font must load, otherwise this is a `RenderError`.
/// Without one, the first readable system font is used; `Ok(None)` means
/// annotations are unavailable on this host.
pub fn load_annotation_font(configured: Option<&Path>) -> Result<Option<FontVec>> {
    if let Some(path) = configured {
        let data = std::fs::read(path)
            .map_err(|e| {
                AnalysisError::render(format!("cannot read font {}: {}", path.display(), e))
            })?;
        let font = FontVec::try_from_vec(data)
            .map_err(|_| AnalysisError::render(format!("cannot parse font {}", path.display())))?;
        return Ok(Some(font));
    }

    for path in SYSTEM_FONT_PATHS {
        if let Ok(data) = std::fs::read(path)
            && let Ok(font) = FontVec::try_from_vec(data)
        {
            debug!("Loaded system font: {}", path);
            return Ok(Some(font));
        }
    }
    debug!("No system font found, overlays will not be annotated");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_configured_font_is_a_render_error() {
        let result = load_annotation_font(Some(Path::new("/nonexistent/fonts/Missing.ttf")));
        assert!(matches!(result, Err(AnalysisError::RenderError { .. })));
    }

    #[test]
    fn unparsable_configured_font_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();

        let result = load_annotation_font(Some(&path));
        assert!(matches!(result, Err(AnalysisError::RenderError { .. })));
    }
}
