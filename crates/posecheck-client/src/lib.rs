#![warn(missing_docs)]
//! # posecheck-client
//!
//! ## Purpose
//! Sends one media payload to the pose analysis service and normalizes the
//! outcome.
//!
//! ## Responsibilities
//! - Derive the `/analyze-frame` endpoint from a configured base URL.
//! - Build the multipart request (`file` attachment + `posture_type` field).
//! - Issue exactly one POST with a fixed timeout; no retries.
//! - Classify failures into server, no-response, request, and empty-body
//!   errors with a user-facing message for each.
//!
//! ## Data flow
//! [`MediaPayload`] + [`AnalysisMode`] -> [`AnalysisClient::submit`] ->
//! [`AnalysisTransport::post`] -> [`AnalysisResult`] or [`AnalysisError`].
//!
//! ## Ownership and lifetimes
//! The payload is moved into the request so each capture is sent exactly once.
//! Transports are shared behind `Arc<dyn AnalysisTransport>`.
//!
//! ## Error model
//! Transport failures arrive as [`TransportError`] and are folded into
//! [`AnalysisError`] together with HTTP status handling.
//!
//! ## Privacy notes
//! Logs carry sizes, MIME types, modes, and status codes only.

use std::sync::Arc;
use std::time::Duration;

use posecheck_analysis_contract::{AnalysisResult, parse_analysis_body, server_error_message};
use posecheck_core::{AnalysisMode, MediaPayload};
use reqwest::blocking::multipart::{Form, Part};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

/// Path appended to the base URL.
pub const ANALYZE_PATH: &str = "analyze-frame";
/// Multipart field carrying the media attachment.
pub const FILE_FIELD: &str = "file";
/// Multipart field carrying the analysis mode.
pub const MODE_FIELD: &str = "posture_type";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Fully built request handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Absolute endpoint URL.
    pub url: Url,
    /// Attachment sent as the `file` field.
    pub payload: MediaPayload,
    /// Mode sent as the `posture_type` field.
    pub mode: AnalysisMode,
    /// Timeout for the whole exchange.
    pub timeout: Duration,
}

/// Raw response returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes (possibly empty).
    pub body: Vec<u8>,
}

/// Transport-level failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Request was sent but no response arrived (network failure or timeout).
    #[error("no response: {0}")]
    NoResponse(String),
    /// Request could not be built or sent.
    #[error("request failure: {0}")]
    Request(String),
}

/// Abstract HTTP transport used by [`AnalysisClient`].
pub trait AnalysisTransport: Send + Sync {
    /// Posts `request` as a multipart body.
    ///
    /// # Errors
    /// Returns [`TransportError`] when no HTTP response was obtained. Error
    /// statuses are not errors at this layer.
    fn post(&self, request: AnalysisRequest) -> Result<TransportResponse, TransportError>;
}

/// Broad error family for analysis failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisErrorKind {
    /// Non-2xx response.
    ServerError,
    /// Request sent, nothing came back.
    NoResponse,
    /// Local failure before or while sending.
    RequestError,
    /// Success status without a usable body.
    EmptyResponse,
}

/// Analysis submission error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// Service answered with an error status.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message from the body, or a generic status message.
        message: String,
    },
    /// No response arrived.
    #[error("no response from server: {0}")]
    NoResponse(String),
    /// Request could not be built or sent.
    #[error("request error: {0}")]
    Request(String),
    /// Success status with an empty body.
    #[error("no analysis data received")]
    EmptyResponse,
}

impl AnalysisError {
    /// Returns the error family.
    pub fn kind(&self) -> AnalysisErrorKind {
        match self {
            AnalysisError::Server { .. } => AnalysisErrorKind::ServerError,
            AnalysisError::NoResponse(_) => AnalysisErrorKind::NoResponse,
            AnalysisError::Request(_) => AnalysisErrorKind::RequestError,
            AnalysisError::EmptyResponse => AnalysisErrorKind::EmptyResponse,
        }
    }

    /// Returns the message stored in workflow state.
    pub fn user_message(&self) -> String {
        let detail = match self {
            AnalysisError::Server { message, .. } => message.clone(),
            AnalysisError::NoResponse(_) => {
                "No response from server. Please check if the API is running.".to_string()
            }
            AnalysisError::Request(message) => message.clone(),
            AnalysisError::EmptyResponse => "No analysis data received".to_string(),
        };
        format!("Analysis failed: {detail}")
    }
}

impl From<TransportError> for AnalysisError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::NoResponse(detail) => AnalysisError::NoResponse(detail),
            TransportError::Request(detail) => AnalysisError::Request(detail),
        }
    }
}

/// Derives the analysis endpoint from a base URL.
///
/// Exactly one trailing `/` is stripped before `/analyze-frame` is appended.
///
/// # Errors
/// Returns [`AnalysisError::Request`] when the result is not an absolute
/// HTTP(S) URL.
pub fn endpoint_url(base_url: &str) -> Result<Url, AnalysisError> {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    let raw = format!("{base}/{ANALYZE_PATH}");

    let url = Url::parse(&raw)
        .map_err(|error| AnalysisError::Request(format!("invalid analysis url '{raw}': {error}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AnalysisError::Request(format!(
            "analysis url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(url)
}

/// Client for the analysis endpoint.
#[derive(Clone)]
pub struct AnalysisClient {
    base_url: String,
    timeout: Duration,
    transport: Arc<dyn AnalysisTransport>,
}

impl AnalysisClient {
    /// Creates a client. The base URL is checked at submit time.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        transport: Arc<dyn AnalysisTransport>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
            transport,
        }
    }

    /// Returns configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Submits one payload under `mode`.
    ///
    /// # Errors
    /// See [`AnalysisError`]; every failure is final (no retries).
    pub fn submit(
        &self,
        payload: MediaPayload,
        mode: AnalysisMode,
    ) -> Result<AnalysisResult, AnalysisError> {
        let url = endpoint_url(&self.base_url)?;

        info!(
            stage = "analysis",
            action = "submit",
            url = %url,
            mode = %mode,
            mime_type = %payload.mime_type,
            size = payload.len(),
        );

        let response = self
            .transport
            .post(AnalysisRequest {
                url,
                payload,
                mode,
                timeout: self.timeout,
            })
            .inspect_err(|error| {
                warn!(stage = "analysis", action = "transport_failed", error = %error);
            })?;

        interpret_response(response)
    }
}

/// Maps a raw HTTP response to a result or error.
///
/// # Errors
/// [`AnalysisError::Server`] for non-2xx statuses and
/// [`AnalysisError::EmptyResponse`] for a 2xx without body.
pub fn interpret_response(response: TransportResponse) -> Result<AnalysisResult, AnalysisError> {
    if !(200..300).contains(&response.status) {
        let message = server_error_message(&response.body)
            .unwrap_or_else(|| format!("Server error ({})", response.status));
        warn!(
            stage = "analysis",
            action = "server_error",
            status = response.status,
            message = %message,
        );
        return Err(AnalysisError::Server {
            status: response.status,
            message,
        });
    }

    let result = parse_analysis_body(&response.body).map_err(|_| AnalysisError::EmptyResponse)?;
    info!(
        stage = "analysis",
        action = "completed",
        status = response.status,
        flagged = result.flagged(),
        issues = result.issues().len(),
    );
    Ok(result)
}

/// Blocking reqwest transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Creates a transport with a fresh connection pool.
    ///
    /// # Errors
    /// Returns [`TransportError::Request`] when the HTTP client cannot be
    /// initialized (for example TLS backend failure).
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("posecheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| TransportError::Request(error.to_string()))?;
        Ok(Self { client })
    }
}

impl AnalysisTransport for HttpTransport {
    fn post(&self, request: AnalysisRequest) -> Result<TransportResponse, TransportError> {
        let AnalysisRequest {
            url,
            payload,
            mode,
            timeout,
        } = request;

        let part = Part::bytes(payload.bytes)
            .file_name(payload.file_name)
            .mime_str(&payload.mime_type)
            .map_err(|error| TransportError::Request(format!("invalid mime type: {error}")))?;
        let form = Form::new()
            .part(FILE_FIELD, part)
            .text(MODE_FIELD, mode.as_str());

        let response = self
            .client
            .post(url)
            .timeout(timeout)
            .multipart(form)
            .send()
            .map_err(|error| classify_send_error(&error))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|error| TransportError::NoResponse(format!("response body lost: {error}")))?;

        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn classify_send_error(error: &reqwest::Error) -> TransportError {
    if error.is_builder() {
        TransportError::Request(error.to_string())
    } else if error.is_timeout() {
        TransportError::NoResponse(format!("request timed out: {error}"))
    } else {
        TransportError::NoResponse(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for endpoint normalization and response interpretation.

    use super::*;

    #[test]
    fn strips_exactly_one_trailing_separator() {
        assert_eq!(
            endpoint_url("http://127.0.0.1:8000").unwrap().as_str(),
            "http://127.0.0.1:8000/analyze-frame"
        );
        assert_eq!(
            endpoint_url("http://127.0.0.1:8000/").unwrap().as_str(),
            "http://127.0.0.1:8000/analyze-frame"
        );
        assert_eq!(
            endpoint_url("http://host/api//").unwrap().as_str(),
            "http://host/api//analyze-frame"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert_eq!(
            endpoint_url("not a url").unwrap_err().kind(),
            AnalysisErrorKind::RequestError
        );
        assert_eq!(
            endpoint_url("ftp://host").unwrap_err().kind(),
            AnalysisErrorKind::RequestError
        );
    }

    #[test]
    fn error_status_without_message_uses_generic_text() {
        let error = interpret_response(TransportResponse {
            status: 502,
            body: b"<html>bad gateway</html>".to_vec(),
        })
        .unwrap_err();
        assert_eq!(error.user_message(), "Analysis failed: Server error (502)");
    }
}
