//! File selection session.

use std::sync::Arc;

use posecheck_core::{MediaKind, MediaPayload, MediaPolicy};
use tracing::{info, warn};

use crate::CaptureError;
use crate::preview::{PreviewHandle, PreviewHost};

/// File chosen by the user.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Original file name, preserved in the upload.
    pub name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// Creates a selected file from owned parts.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// File size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl std::fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Result of a successful [`FileCaptureSession::select_file`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSelection {
    /// Picker was dismissed; nothing is selected.
    Cleared,
    /// A valid file is now selected.
    Selected {
        /// Media family of the file.
        kind: MediaKind,
        /// Whether a preview was created.
        previewed: bool,
    },
}

/// Lifecycle of one selected file and its preview.
///
/// Invariant: at most one preview is live per session, and a replaced
/// preview is released before its successor is created.
pub struct FileCaptureSession {
    policy: MediaPolicy,
    previews: Arc<dyn PreviewHost>,
    selected: Option<SelectedFile>,
    preview: Option<PreviewHandle>,
}

impl FileCaptureSession {
    /// Creates an empty session.
    pub fn new(policy: MediaPolicy, previews: Arc<dyn PreviewHost>) -> Self {
        Self {
            policy,
            previews,
            selected: None,
            preview: None,
        }
    }

    /// Replaces the current selection.
    ///
    /// `None` models a dismissed picker and clears the selection. Images get
    /// a fresh preview; videos get none.
    ///
    /// # Errors
    /// Returns [`CaptureError::Validation`] when the file is rejected; the
    /// previous selection and preview are cleared in that case too.
    pub fn select_file(&mut self, file: Option<SelectedFile>) -> Result<FileSelection, CaptureError> {
        let Some(file) = file else {
            self.clear_selection();
            return Ok(FileSelection::Cleared);
        };

        let validation = self.policy.validate(file.size(), &file.mime_type);
        if !validation.valid {
            let reason = validation
                .reason
                .unwrap_or_else(|| "Unsupported file".to_string());
            warn!(stage = "file", action = "select_rejected", name = %file.name, reason = %reason);
            self.clear_selection();
            return Err(CaptureError::Validation(reason));
        }

        // Release before create so two previews never coexist.
        if let Some(previous) = self.preview.take() {
            previous.release();
        }

        let kind = self.policy.kind_of(&file.mime_type).unwrap_or(MediaKind::Video);
        if kind == MediaKind::Image {
            match PreviewHandle::acquire(self.previews.clone(), &file.bytes, &file.mime_type) {
                Ok(handle) => self.preview = Some(handle),
                Err(detail) => {
                    warn!(stage = "file", action = "preview_failed", detail = %detail);
                }
            }
        }

        info!(
            stage = "file",
            action = "selected",
            name = %file.name,
            mime_type = %file.mime_type,
            size = file.size(),
        );
        self.selected = Some(file);

        Ok(FileSelection::Selected {
            kind,
            previewed: self.preview.is_some(),
        })
    }

    /// Releases the preview and forgets the selected file.
    pub fn clear_selection(&mut self) {
        if let Some(preview) = self.preview.take() {
            preview.release();
        }
        self.selected = None;
    }

    /// Builds the payload for the selected file.
    ///
    /// The file is validated again because limits may have changed since it
    /// was selected.
    ///
    /// # Errors
    /// Returns [`CaptureError::NoFileSelected`] or [`CaptureError::Validation`].
    pub fn submit(&self) -> Result<MediaPayload, CaptureError> {
        let file = self.selected.as_ref().ok_or(CaptureError::NoFileSelected)?;

        self.policy
            .validate(file.size(), &file.mime_type)
            .into_result()
            .map_err(|error| CaptureError::Validation(error.to_string()))?;

        Ok(MediaPayload::new(
            file.name.clone(),
            file.mime_type.clone(),
            file.bytes.clone(),
        ))
    }

    /// Returns the selected file, if any.
    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    /// Returns the live preview reference, if any.
    pub fn preview_reference(&self) -> Option<&str> {
        self.preview.as_ref().map(PreviewHandle::reference)
    }

    /// Replaces the validation policy used by later selections and submits.
    pub fn set_policy(&mut self, policy: MediaPolicy) {
        self.policy = policy;
    }
}

impl Drop for FileCaptureSession {
    fn drop(&mut self) {
        self.clear_selection();
    }
}
