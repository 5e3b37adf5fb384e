//! Workflow state and its controller.

use std::sync::Arc;
use std::time::Duration;

use posecheck_analysis_contract::AnalysisResult;
use posecheck_capture::{
    CaptureError, FileCaptureSession, FileSelection, SelectedFile, WebcamCaptureSession,
    WebcamState,
};
use posecheck_client::AnalysisClient;
use posecheck_core::{AnalysisMode, MediaPayload};
use tracing::{debug, info, warn};

use crate::AppError;
use crate::clock::Clock;

/// Shared state rendered by the shell.
///
/// Read-only outside this module; every change goes through
/// [`WorkflowController`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowState {
    mode: AnalysisMode,
    pending_mode: Option<AnalysisMode>,
    loading: bool,
    error: Option<String>,
    result: Option<AnalysisResult>,
}

impl WorkflowState {
    /// Active analysis mode.
    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    /// Mode staged while a submission is in flight.
    pub fn pending_mode(&self) -> Option<AnalysisMode> {
        self.pending_mode
    }

    /// Whether a submission is in flight.
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Surfaced error message.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Latest analysis result.
    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }
}

/// Proof that a submission was admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket {
    sequence: u64,
    mode: AnalysisMode,
}

impl SubmissionTicket {
    /// Monotonic submission number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Mode the submission is sent under.
    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }
}

/// How a submission attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Result stored.
    Completed,
    /// Error stored.
    Failed,
    /// Another submission was already in flight; nothing happened.
    Rejected,
    /// Completion arrived for a submission that is no longer current and was
    /// discarded.
    Stale,
}

/// Single owner of [`WorkflowState`] and both capture sessions.
pub struct WorkflowController {
    state: WorkflowState,
    file: FileCaptureSession,
    webcam: WebcamCaptureSession,
    client: AnalysisClient,
    clock: Arc<dyn Clock>,
    error_ttl_ms: u64,
    error_expires_at_ms: Option<u64>,
    sequence: u64,
    in_flight: Option<u64>,
}

impl WorkflowController {
    /// Creates a controller in the default mode with no result.
    pub fn new(
        client: AnalysisClient,
        file: FileCaptureSession,
        webcam: WebcamCaptureSession,
        clock: Arc<dyn Clock>,
        error_ttl: Duration,
    ) -> Self {
        Self {
            state: WorkflowState::default(),
            file,
            webcam,
            client,
            clock,
            error_ttl_ms: error_ttl.as_millis() as u64,
            error_expires_at_ms: None,
            sequence: 0,
            in_flight: None,
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// File session, read-only.
    pub fn file_session(&self) -> &FileCaptureSession {
        &self.file
    }

    /// Camera session, read-only. Frames for a two-phase submission are taken
    /// with [`Self::capture_frame_for`].
    pub fn webcam_session(&self) -> &WebcamCaptureSession {
        &self.webcam
    }

    /// Selects the analysis mode.
    ///
    /// Applied immediately when idle, invalidating any stored result. While a
    /// submission is in flight the mode is staged and applied once it settles.
    pub fn set_mode(&mut self, mode: AnalysisMode) {
        if self.state.loading {
            info!(stage = "mode", action = "deferred", mode = %mode);
            self.state.pending_mode = Some(mode);
            return;
        }

        info!(stage = "mode", action = "applied", mode = %mode);
        self.state.mode = mode;
        self.state.result = None;
    }

    /// Replaces the selected file; `None` clears it.
    ///
    /// Clears any error and result first. Ignored while a submission is in
    /// flight. Returns the selection on success.
    pub fn select_file(&mut self, file: Option<SelectedFile>) -> Option<FileSelection> {
        if self.state.loading {
            debug!(stage = "file", action = "select_ignored", "submission in flight");
            return None;
        }

        self.clear_error();
        self.state.result = None;

        match self.file.select_file(file) {
            Ok(selection) => Some(selection),
            Err(error) => {
                self.set_error(error.user_message());
                None
            }
        }
    }

    /// Drops the selected file and its preview.
    pub fn clear_file_selection(&mut self) {
        self.file.clear_selection();
    }

    /// Submits the selected file.
    pub fn analyze_file(&mut self) -> SubmissionOutcome {
        self.run_submission(|file, _| file.submit())
    }

    /// Acquires the camera. Returns `true` when the camera is live.
    ///
    /// Clears any error and result first; acquisition failures are surfaced
    /// as the workflow error.
    pub fn start_webcam(&mut self) -> bool {
        if self.state.loading {
            debug!(stage = "webcam", action = "start_ignored", "submission in flight");
            return false;
        }

        self.clear_error();
        self.state.result = None;

        match self.webcam.start() {
            Ok(()) => true,
            Err(error) => {
                self.set_error(error.user_message());
                false
            }
        }
    }

    /// Releases the camera and clears error and result. Safe to call when idle.
    pub fn stop_webcam(&mut self) {
        self.webcam.stop();
        self.clear_error();
        self.state.result = None;
    }

    /// Snapshots the live camera frame and submits it.
    pub fn capture_and_analyze(&mut self) -> SubmissionOutcome {
        self.run_submission(|_, webcam| webcam.capture_frame())
    }

    /// Runs one full submission: admit, obtain the payload, send, settle.
    ///
    /// Returns [`SubmissionOutcome::Rejected`] without side effects when a
    /// submission is already in flight.
    pub fn run_submission<F>(&mut self, source: F) -> SubmissionOutcome
    where
        F: FnOnce(
            &mut FileCaptureSession,
            &mut WebcamCaptureSession,
        ) -> Result<MediaPayload, CaptureError>,
    {
        let Some(ticket) = self.begin_submission() else {
            return SubmissionOutcome::Rejected;
        };

        let outcome = source(&mut self.file, &mut self.webcam)
            .map_err(AppError::from)
            .and_then(|payload| {
                self.client
                    .submit(payload, ticket.mode())
                    .map_err(AppError::from)
            });

        self.complete_submission(ticket, outcome)
    }

    /// Admits a new submission, or returns `None` when one is in flight.
    ///
    /// Sets `loading` and clears the error. The ticket captures the mode the
    /// request must be sent under.
    pub fn begin_submission(&mut self) -> Option<SubmissionTicket> {
        if self.state.loading {
            warn!(stage = "submission", action = "rejected", "submission already in flight");
            return None;
        }

        self.sequence += 1;
        self.in_flight = Some(self.sequence);
        self.state.loading = true;
        self.clear_error();

        let ticket = SubmissionTicket {
            sequence: self.sequence,
            mode: self.state.mode,
        };
        debug!(stage = "submission", action = "begin", sequence = ticket.sequence, mode = %ticket.mode);
        Some(ticket)
    }

    /// Snapshots the live camera frame for a submission admitted by
    /// [`Self::begin_submission`].
    ///
    /// Returns `None` when `ticket` is no longer in flight. A captured frame
    /// keeps the camera in [`WebcamState::CaptureInFlight`] until the
    /// submission is completed or abandoned.
    pub fn capture_frame_for(
        &mut self,
        ticket: SubmissionTicket,
    ) -> Option<Result<MediaPayload, CaptureError>> {
        if self.in_flight != Some(ticket.sequence) {
            debug!(stage = "webcam", action = "capture_ignored", sequence = ticket.sequence);
            return None;
        }
        Some(self.webcam.capture_frame())
    }

    /// Settles a submission admitted by [`Self::begin_submission`].
    ///
    /// Completions for a ticket that is no longer in flight are discarded.
    /// Otherwise the result or error is stored (never both), `loading` is
    /// cleared, and a staged mode is promoted, which also discards the result.
    pub fn complete_submission(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<AnalysisResult, AppError>,
    ) -> SubmissionOutcome {
        if self.in_flight != Some(ticket.sequence) {
            info!(
                stage = "submission",
                action = "discard_stale",
                sequence = ticket.sequence,
                current = self.sequence,
            );
            return SubmissionOutcome::Stale;
        }

        let settled = match outcome {
            Ok(result) => {
                self.clear_error();
                self.state.result = Some(result);
                SubmissionOutcome::Completed
            }
            Err(error) => {
                warn!(stage = "submission", action = "failed", sequence = ticket.sequence, error = %error);
                self.state.result = None;
                self.set_error(error.user_message());
                SubmissionOutcome::Failed
            }
        };

        self.settle();
        settled
    }

    /// Gives up on the in-flight submission without waiting for it.
    ///
    /// The request is not aborted, but its completion will be discarded.
    /// Returns `true` when a submission was abandoned.
    pub fn abandon_submission(&mut self) -> bool {
        let Some(sequence) = self.in_flight else {
            return false;
        };
        info!(stage = "submission", action = "abandoned", sequence);
        self.settle();
        true
    }

    /// Clears the surfaced error when its display time has elapsed.
    ///
    /// Returns `true` when an error was cleared.
    pub fn tick(&mut self) -> bool {
        match self.error_expires_at_ms {
            Some(deadline) if self.clock.now_ms() >= deadline => {
                debug!(stage = "error", action = "expired");
                self.clear_error();
                true
            }
            _ => false,
        }
    }

    /// Clears the surfaced error and cancels its expiry.
    pub fn clear_error(&mut self) {
        self.state.error = None;
        self.error_expires_at_ms = None;
    }

    /// Whether the camera may be started.
    pub fn can_start_webcam(&self) -> bool {
        !self.state.loading && self.webcam.state() == WebcamState::Idle
    }

    /// Whether a live frame may be captured.
    pub fn can_capture(&self) -> bool {
        !self.state.loading && self.webcam.state() == WebcamState::Live
    }

    /// Whether the selected file may be submitted.
    pub fn can_analyze_file(&self) -> bool {
        !self.state.loading && self.file.selected().is_some()
    }

    fn set_error(&mut self, message: String) {
        let deadline = self.clock.now_ms().saturating_add(self.error_ttl_ms);
        self.state.error = Some(message);
        self.error_expires_at_ms = Some(deadline);
    }

    fn settle(&mut self) {
        self.in_flight = None;
        self.state.loading = false;
        self.webcam.settle_capture();

        if let Some(mode) = self.state.pending_mode.take() {
            info!(stage = "mode", action = "promoted", mode = %mode);
            self.state.mode = mode;
            self.state.result = None;
        }
    }
}
