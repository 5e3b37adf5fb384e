#![warn(missing_docs)]
//! # posecheck-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `posecheck` workspace.
//!
//! ## Responsibilities
//! - Represent the closed set of analysis modes understood by the service.
//! - Represent media payloads produced by the capture sessions.
//! - Validate candidate media against size, type, and emptiness rules.
//!
//! ## Data flow
//! A capture session reads a file or snapshots a camera frame, checks it with
//! [`MediaPolicy::validate`], and hands a [`MediaPayload`] to the analysis
//! client together with the active [`AnalysisMode`].
//!
//! ## Ownership and lifetimes
//! Payloads own their byte buffers (`Vec<u8>`) so a payload can move from a
//! capture session into the client without borrowing the session.
//!
//! ## Error model
//! Validation is reported as a [`ValidationResult`] value rather than an
//! error, since an invalid file is an expected user outcome. Conversion into
//! [`CoreError::Validation`] is available for callers that propagate with `?`.
//!
//! ## Privacy notes
//! Nothing in this crate logs or inspects media bytes beyond their length.
//!
//! ## Example
//! ```rust
//! use posecheck_core::{MediaPolicy, validate_media};
//!
//! assert!(validate_media(1024, "image/png").valid);
//! assert!(!validate_media(0, "image/png").valid);
//! assert!(!MediaPolicy::default().validate(1024, "application/pdf").valid);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bytes in one mebibyte.
pub const MIB: u64 = 1024 * 1024;

/// Default maximum accepted media size (50 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 50 * MIB;

/// Image MIME types accepted by default.
pub const SUPPORTED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Video MIME types accepted by default.
pub const SUPPORTED_VIDEO_TYPES: [&str; 4] = ["video/mp4", "video/webm", "video/ogg", "video/avi"];

/// Server-side scoring context selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Squat form grading.
    #[default]
    Squat,
    /// Seated posture grading.
    Sitting,
}

impl AnalysisMode {
    /// Every mode in display order.
    pub const ALL: [AnalysisMode; 2] = [AnalysisMode::Squat, AnalysisMode::Sitting];

    /// Wire value sent as the `posture_type` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisMode::Squat => "squat",
            AnalysisMode::Sitting => "sitting",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        AnalysisMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| CoreError::UnknownMode(value.to_string()))
    }
}

/// Broad media family of an accepted MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Still image; eligible for a local preview.
    Image,
    /// Video clip; never previewed locally.
    Video,
}

/// Binary media plus the metadata submitted for analysis.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaPayload {
    /// Attachment file name sent with the multipart body.
    pub file_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Encoded media bytes.
    pub bytes: Vec<u8>,
}

impl MediaPayload {
    /// Creates a payload from owned parts.
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Returns payload length in bytes.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Returns `true` when the payload carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Media bytes stay out of debug output so payloads can be logged safely.
impl fmt::Debug for MediaPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaPayload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Outcome of validating one candidate media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the candidate may be submitted.
    pub valid: bool,
    /// Human-readable rejection reason, set only when invalid.
    pub reason: Option<String>,
}

impl ValidationResult {
    fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    fn rejected(reason: String) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }

    /// Converts the result into a `Result` for `?` propagation.
    ///
    /// # Errors
    /// Returns [`CoreError::Validation`] carrying the rejection reason.
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.valid {
            return Ok(());
        }
        Err(CoreError::Validation(
            self.reason.unwrap_or_else(|| "invalid media".to_string()),
        ))
    }
}

/// Size and type limits applied to candidate media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPolicy {
    /// Inclusive upper bound on media size in bytes.
    pub max_size_bytes: u64,
    /// Accepted image MIME types.
    pub image_types: Vec<String>,
    /// Accepted video MIME types.
    pub video_types: Vec<String>,
}

impl Default for MediaPolicy {
    fn default() -> Self {
        Self::with_max_size(DEFAULT_MAX_FILE_BYTES)
    }
}

impl MediaPolicy {
    /// Default accepted types with a custom size limit.
    pub fn with_max_size(max_size_bytes: u64) -> Self {
        Self {
            max_size_bytes,
            image_types: SUPPORTED_IMAGE_TYPES.iter().map(|t| t.to_string()).collect(),
            video_types: SUPPORTED_VIDEO_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Validates `(size, mime_type)` against this policy.
    ///
    /// Rules are checked in order and the first failure wins: empty, too
    /// large, unsupported type.
    pub fn validate(&self, size: u64, mime_type: &str) -> ValidationResult {
        if size == 0 {
            return ValidationResult::rejected("File is empty".to_string());
        }

        if size > self.max_size_bytes {
            return ValidationResult::rejected(format!(
                "File size too large. Maximum size is {}",
                format_limit(self.max_size_bytes)
            ));
        }

        if self.kind_of(mime_type).is_none() {
            return ValidationResult::rejected(format!(
                "Unsupported file type. Accepted formats: {}",
                self.accepted_types().join(", ")
            ));
        }

        ValidationResult::ok()
    }

    /// Classifies an accepted MIME type; `None` when not accepted.
    pub fn kind_of(&self, mime_type: &str) -> Option<MediaKind> {
        if self.image_types.iter().any(|t| t == mime_type) {
            Some(MediaKind::Image)
        } else if self.video_types.iter().any(|t| t == mime_type) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Returns every accepted MIME type, images first.
    pub fn accepted_types(&self) -> Vec<&str> {
        self.image_types
            .iter()
            .chain(self.video_types.iter())
            .map(String::as_str)
            .collect()
    }
}

/// Validates against the default policy.
pub fn validate_media(size: u64, mime_type: &str) -> ValidationResult {
    MediaPolicy::default().validate(size, mime_type)
}

fn format_limit(bytes: u64) -> String {
    if bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{:.2}MB", bytes as f64 / MIB as f64)
    }
}

/// Error type for core model failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Media was rejected by the validation policy.
    #[error("{0}")]
    Validation(String),
    /// Mode string is not part of the closed mode set.
    #[error("unknown analysis mode: {0}")]
    UnknownMode(String),
}
