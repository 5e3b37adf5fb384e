#![warn(missing_docs)]
//! # posecheck-analysis-contract
//!
//! ## Purpose
//! Defines the analysis response contract and client-side reading helpers.
//!
//! ## Responsibilities
//! - Accept any non-empty response body verbatim as an [`AnalysisResult`].
//! - Expose typed accessors for the documented fields (`has_bad_posture`,
//!   `issues`, `annotated_image`) without rejecting other shapes.
//! - Extract the most useful message from an error response body.
//! - Classify annotated image references (data URI or URL).
//!
//! ## Data flow
//! Raw response bytes -> [`parse_analysis_body`] -> [`AnalysisResult`] ->
//! workflow state -> UI projection.
//!
//! ## Ownership and lifetimes
//! Parsed values own their JSON trees to avoid borrowing from transient
//! network buffers.
//!
//! ## Error model
//! A missing, blank, or `null` body is the only contract failure
//! ([`AnalysisContractError::EmptyBody`]). Schema drift is tolerated.
//!
//! ## Privacy notes
//! This crate reads only model verdicts; it never sees the submitted media.

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Response field flagging a bad posture verdict.
pub const FIELD_HAS_BAD_POSTURE: &str = "has_bad_posture";
/// Response field listing detected issues.
pub const FIELD_ISSUES: &str = "issues";
/// Response field carrying the annotated image reference.
pub const FIELD_ANNOTATED_IMAGE: &str = "annotated_image";

/// Analysis verdict exactly as returned by the service.
///
/// The body is kept verbatim; accessors read the documented fields leniently
/// so a response with extra or missing fields still renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult {
    body: Value,
}

impl AnalysisResult {
    /// Wraps an already decoded body.
    pub fn from_value(body: Value) -> Self {
        Self { body }
    }

    /// Returns the body as received.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Returns `true` when the service flagged the posture.
    pub fn flagged(&self) -> bool {
        self.body
            .get(FIELD_HAS_BAD_POSTURE)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Returns detected issues in server order; non-string entries are skipped.
    pub fn issues(&self) -> Vec<String> {
        self.body
            .get(FIELD_ISSUES)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the annotated image reference when present and non-blank.
    pub fn annotated_image(&self) -> Option<&str> {
        self.body
            .get(FIELD_ANNOTATED_IMAGE)
            .and_then(Value::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

/// Parses a success response body.
///
/// JSON bodies are kept as decoded; a body that is not JSON is preserved as a
/// JSON string so it still reaches the result store verbatim.
///
/// # Errors
/// Returns [`AnalysisContractError::EmptyBody`] for an empty, blank, or
/// `null` body.
pub fn parse_analysis_body(raw: &[u8]) -> Result<AnalysisResult, AnalysisContractError> {
    let text = String::from_utf8_lossy(raw);
    if text.trim().is_empty() {
        return Err(AnalysisContractError::EmptyBody);
    }

    let body = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| Value::String(text.into_owned()));
    if body.is_null() {
        return Err(AnalysisContractError::EmptyBody);
    }

    Ok(AnalysisResult::from_value(body))
}

/// Extracts a human-readable message from an error response body.
///
/// Prefers a `message` field, then `detail`. String values are used as-is;
/// any other non-null `detail` (for example a list of field errors) is
/// rendered as compact JSON. Returns `None` when neither is usable.
pub fn server_error_message(raw: &[u8]) -> Option<String> {
    let body: Value = serde_json::from_slice(raw).ok()?;

    if let Some(message) = body.get("message").and_then(Value::as_str)
        && !message.trim().is_empty()
    {
        return Some(message.to_string());
    }

    match body.get("detail") {
        Some(Value::String(detail)) if !detail.trim().is_empty() => Some(detail.clone()),
        Some(Value::Null) | None | Some(Value::String(_)) => None,
        Some(other) => Some(other.to_string()),
    }
}

/// Classified annotated image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotatedImage {
    /// Inline `data:<mime>;base64,<payload>` image.
    DataUri {
        /// Declared MIME type (may be empty).
        mime_type: String,
        /// Base64 payload, still encoded.
        base64: String,
    },
    /// Remote image location.
    Url(Url),
    /// Reference that is neither a base64 data URI nor an absolute URL.
    Other(String),
}

impl AnnotatedImage {
    /// Classifies a reference string.
    pub fn parse(reference: &str) -> Self {
        let reference = reference.trim();
        if let Some(rest) = reference.strip_prefix("data:")
            && let Some((header, payload)) = rest.split_once(',')
            && let Some(mime_type) = header.strip_suffix(";base64")
        {
            return AnnotatedImage::DataUri {
                mime_type: mime_type.to_string(),
                base64: payload.to_string(),
            };
        }

        match Url::parse(reference) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => AnnotatedImage::Url(url),
            _ => AnnotatedImage::Other(reference.to_string()),
        }
    }

    /// Decodes inline image bytes.
    ///
    /// # Errors
    /// Returns [`AnalysisContractError::NotInline`] for non-data references and
    /// [`AnalysisContractError::ImageDecode`] for malformed base64.
    pub fn decode_inline(&self) -> Result<Vec<u8>, AnalysisContractError> {
        match self {
            AnnotatedImage::DataUri { base64, .. } => base64::engine::general_purpose::STANDARD
                .decode(base64.trim())
                .map_err(AnalysisContractError::ImageDecode),
            _ => Err(AnalysisContractError::NotInline),
        }
    }
}

/// Analysis contract errors.
#[derive(Debug, Error)]
pub enum AnalysisContractError {
    /// Success response carried no usable body.
    #[error("No analysis data received")]
    EmptyBody,
    /// Annotated image reference is not an inline data URI.
    #[error("annotated image is not an inline data uri")]
    NotInline,
    /// Inline annotated image payload is not valid base64.
    #[error("annotated image decode failure: {0}")]
    ImageDecode(#[from] base64::DecodeError),
}
