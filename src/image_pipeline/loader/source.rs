use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::image_pipeline::common::error::{AnalysisError, Result};

/// Where the encoded image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Encoded image bytes, e.g. an uploaded file body
    Bytes(Vec<u8>),
    /// Base64 text, optionally with a `data:<mime>;base64,` prefix
    Base64(String),
    /// Remote http(s) location
    Url(String),
    /// Local file
    File(PathBuf),
}

impl ImageSource {
    pub fn kind(&self) -> &'static str {
        match self {
            ImageSource::Bytes(_) => "bytes",
            ImageSource::Base64(_) => "base64",
            ImageSource::Url(_) => "url",
            ImageSource::File(_) => "file",
        }
    }

    /// Parses a JSON request body into a source.
    ///
    /// Accepted shapes:
    /// `{"image": "<base64>"}`, `{"image": {"imageUrl": "<url>"}}` and
    /// `{"frame": {"frameBase64": "<base64>"}}`.
    pub fn from_json_str(payload: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(payload)
            .map_err(|e| AnalysisError::ValidationError(format!("malformed JSON payload: {e}")))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let payload: AnalysisPayload = serde_json::from_value(value.clone())
            .map_err(|e| AnalysisError::ValidationError(format!("unexpected payload shape: {e}")))?;

        match (payload.image, payload.frame) {
            (Some(ImageField::Base64(text)), _) => {
                non_empty(text, "image").map(ImageSource::Base64)
            }
            (Some(ImageField::Remote { image_url }), _) => image_url
                .ok_or_else(|| missing("image.imageUrl"))
                .and_then(|url| non_empty(url, "image.imageUrl"))
                .map(ImageSource::Url),
            (None, Some(frame)) => frame
                .frame_base64
                .ok_or_else(|| missing("frame.frameBase64"))
                .and_then(|text| non_empty(text, "frame.frameBase64"))
                .map(ImageSource::Base64),
            (None, None) => Err(missing("image")),
        }
    }
}

#[derive(Deserialize)]
struct AnalysisPayload {
    #[serde(default)]
    image: Option<ImageField>,
    #[serde(default)]
    frame: Option<FramePayload>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImageField {
    Base64(String),
    Remote {
        #[serde(rename = "imageUrl", default)]
        image_url: Option<String>,
    },
}

#[derive(Deserialize)]
struct FramePayload {
    #[serde(rename = "frameBase64", default)]
    frame_base64: Option<String>,
}

fn missing(field: &str) -> AnalysisError {
    AnalysisError::ValidationError(format!("Missing '{field}' field"))
}

fn non_empty(value: String, field: &str) -> Result<String> {
    if value.trim().is_empty() {
        Err(missing(field))
    } else {
        Ok(value)
    }
}

/// Decodes base64 image text. Whitespace and a leading data-URL header are ignored.
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    let body = match text.trim().strip_prefix("data:") {
        Some(rest) => rest
            .split_once(";base64,")
            .map(|(_, data)| data)
            .ok_or_else(|| {
                AnalysisError::DecodeError("data URL is not base64 encoded".to_string())
            })?,
        None => text,
    };
    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(AnalysisError::ValidationError("base64 image text is empty".to_string()));
    }
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| AnalysisError::DecodeError(format!("invalid base64: {e}")))
}
