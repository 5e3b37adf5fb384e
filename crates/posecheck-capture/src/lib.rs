#![warn(missing_docs)]
//! # posecheck-capture
//!
//! ## Purpose
//! Owns the two input modalities that produce media for analysis: a selected
//! file and a live camera.
//!
//! ## Responsibilities
//! - Track one selected file, its validation, and its local preview.
//! - Drive the camera lifecycle (`Idle -> Acquiring -> Live -> CaptureInFlight`).
//! - Snapshot a camera frame and encode it as JPEG.
//! - Expose a deterministic synthetic camera for CI and unit tests.
//!
//! ## Data flow
//! File picker or camera backend -> session -> [`posecheck_core::MediaPayload`]
//! consumed by the analysis client.
//!
//! ## Ownership and lifetimes
//! Every external resource is wrapped in an owning guard: [`PreviewHandle`]
//! releases its preview on drop, and the active camera stream stops its
//! tracks on drop. Sessions stop or clear themselves when dropped, so a torn
//! down session cannot leak a preview or a device lock.
//!
//! ## Error model
//! All failures are [`CaptureError`] values whose `Display` text is the
//! message shown to the user.
//!
//! ## Privacy notes
//! Captured frames live only in memory and are never written to disk.

mod file;
mod preview;
mod synthetic;
mod webcam;

pub use file::{FileCaptureSession, FileSelection, SelectedFile};
pub use preview::{InMemoryPreviewHost, PreviewHandle, PreviewHost};
pub use synthetic::{SyntheticCameraBackend, SyntheticCameraStats};
pub use webcam::{
    AcquireError, CameraBackend, CameraStream, FacingMode, JPEG_QUALITY, PREFERRED_HEIGHT,
    PREFERRED_WIDTH, ReadyState, RgbaFrame, StreamRequest, WEBCAM_FRAME_MIME, WEBCAM_FRAME_NAME,
    WebcamCaptureSession, WebcamState, encode_frame,
};

use thiserror::Error;

/// Broad error family used when surfacing capture failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureErrorKind {
    /// Bad or missing file before send.
    Validation,
    /// Camera unavailable, denied, busy, or unsupported.
    Device,
    /// Frame not ready or encode failure.
    Capture,
}

/// Capture layer error type. `Display` yields the user-facing message.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Submission requested without a selected file.
    #[error("Please select a file first")]
    NoFileSelected,
    /// File failed validation.
    #[error("{0}")]
    Validation(String),
    /// Platform exposes no camera API.
    #[error("Webcam error: Camera access is not supported on this platform")]
    DeviceUnsupported,
    /// User or policy refused camera access.
    #[error("Webcam error: Camera access denied. Please allow camera permissions.")]
    PermissionDenied,
    /// No camera is attached.
    #[error("Webcam error: No camera found. Please connect a camera.")]
    NoDevice,
    /// Camera is locked by another application.
    #[error("Webcam error: Camera is being used by another application.")]
    DeviceBusy,
    /// Any other acquisition failure.
    #[error("Webcam error: {0}")]
    Device(String),
    /// Capture requested while the camera is not live.
    #[error("Webcam not initialized")]
    NotLive,
    /// A captured frame is still being analyzed.
    #[error("A captured frame is already being analyzed")]
    CaptureInFlight,
    /// Preview has no decoded frame yet.
    #[error("Webcam not ready. Please wait for video to load.")]
    NotReady,
    /// Encoder produced no bytes.
    #[error("Failed to capture frame - no image data")]
    EmptyFrame,
    /// Encoder or raster failure.
    #[error("Failed to capture frame: {0}")]
    Encode(String),
}

impl CaptureError {
    /// Returns the error family.
    pub fn kind(&self) -> CaptureErrorKind {
        match self {
            CaptureError::NoFileSelected | CaptureError::Validation(_) => {
                CaptureErrorKind::Validation
            }
            CaptureError::DeviceUnsupported
            | CaptureError::PermissionDenied
            | CaptureError::NoDevice
            | CaptureError::DeviceBusy
            | CaptureError::Device(_) => CaptureErrorKind::Device,
            CaptureError::NotLive
            | CaptureError::CaptureInFlight
            | CaptureError::NotReady
            | CaptureError::EmptyFrame
            | CaptureError::Encode(_) => CaptureErrorKind::Capture,
        }
    }

    /// Returns the message stored in workflow state.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<AcquireError> for CaptureError {
    fn from(error: AcquireError) -> Self {
        match error {
            AcquireError::NotAllowed => CaptureError::PermissionDenied,
            AcquireError::NotFound => CaptureError::NoDevice,
            AcquireError::NotReadable => CaptureError::DeviceBusy,
            AcquireError::Other(detail) if detail.trim().is_empty() => {
                CaptureError::Device("Please check permissions and try again.".to_string())
            }
            AcquireError::Other(detail) => CaptureError::Device(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for acquisition error mapping.

    use super::*;

    #[test]
    fn acquisition_errors_map_to_device_family() {
        let denied = CaptureError::from(AcquireError::NotAllowed);
        assert_eq!(denied.kind(), CaptureErrorKind::Device);
        assert!(denied.user_message().to_lowercase().contains("permission"));

        let blank = CaptureError::from(AcquireError::Other("  ".to_string()));
        assert!(blank.user_message().contains("check permissions"));
    }
}
