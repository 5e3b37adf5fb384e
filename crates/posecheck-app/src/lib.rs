#![warn(missing_docs)]
//! # posecheck-app
//!
//! ## Purpose
//! Coordinates the analysis-mode selector, both capture sessions, and the
//! analysis client for `posecheck`.
//!
//! ## Responsibilities
//! - Own the single [`WorkflowState`] and mutate it only through
//!   [`WorkflowController`] operations.
//! - Allow at most one submission in flight and defer mode changes made
//!   while one is running.
//! - Expire surfaced errors after a fixed delay.
//! - Load runtime configuration and bootstrap logging.
//!
//! ## Data flow
//! Mode selection -> file or camera capture -> [`posecheck_client::AnalysisClient`]
//! -> result or error in [`WorkflowState`] -> [`project_status`] for display.
//!
//! ## Ownership and lifetimes
//! The controller owns both sessions, so dropping it releases any preview and
//! stops any camera stream.
//!
//! ## Error model
//! Every failure is recovered inside the controller and stored as one
//! human-readable message; the controller always returns to a non-loading
//! state. [`AppError`] is also used by the binary for startup failures.
//!
//! ## Privacy notes
//! Logs never contain media bytes.

mod clock;
mod config;
mod workflow;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    AppConfig, DEFAULT_API_BASE_URL, DEFAULT_ERROR_TTL, ENV_API_BASE_URL, ENV_ERROR_TTL_MS,
    ENV_MAX_FILE_MB, ENV_TIMEOUT_MS,
};
pub use workflow::{SubmissionOutcome, SubmissionTicket, WorkflowController, WorkflowState};

use posecheck_analysis_contract::AnalysisContractError;
use posecheck_capture::CaptureError;
use posecheck_client::{AnalysisError, TransportError};
use posecheck_core::AnalysisMode;
use posecheck_ui::{ResultView, mode_label};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("POSECHECK_VERSION");

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Flat status snapshot for simple rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeStatus {
    /// Label of the active mode.
    pub mode: &'static str,
    /// Label of a mode waiting for the running submission to finish.
    pub pending_mode: Option<&'static str>,
    /// Whether a submission is in flight.
    pub busy: bool,
    /// Surfaced error message.
    pub error: Option<String>,
    /// Rendered verdict.
    pub result: Option<ResultView>,
}

/// Projects workflow state into a flat status snapshot.
pub fn project_status(state: &WorkflowState) -> RuntimeStatus {
    RuntimeStatus {
        mode: mode_label(state.mode()),
        pending_mode: state.pending_mode().map(mode_label),
        busy: state.loading(),
        error: state.error().map(str::to_string),
        result: state.result().map(ResultView::from_result),
    }
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbosity` picks `info`, `debug`, or
/// `trace`.
///
/// # Errors
/// Returns [`AppError::Logging`] when a subscriber is already installed.
pub fn init_logging(verbosity: u8) -> Result<(), AppError> {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| AppError::Logging(error.to_string()))
}

/// Parses a mode name (`squat`, `sitting`).
///
/// # Errors
/// Returns [`AppError::Config`] for names outside the closed mode set.
pub fn parse_mode(raw: &str) -> Result<AnalysisMode, AppError> {
    raw.parse()
        .map_err(|error: posecheck_core::CoreError| AppError::Config(error.to_string()))
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Capture session failure.
    #[error(transparent)]
    Capture(#[from] CaptureError),
    /// Analysis submission failure.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    /// HTTP transport could not be initialized.
    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),
    /// Response content could not be used.
    #[error(transparent)]
    Contract(#[from] AnalysisContractError),
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
    /// Logging bootstrap failure.
    #[error("logging setup failed: {0}")]
    Logging(String),
    /// Filesystem failure in the shell.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Returns the message stored in workflow state.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Capture(error) => error.user_message(),
            AppError::Analysis(error) => error.user_message(),
            other => other.to_string(),
        }
    }
}
