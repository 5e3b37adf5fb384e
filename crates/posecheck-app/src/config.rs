//! Runtime configuration sourced from environment variables.

use std::time::Duration;

use posecheck_client::DEFAULT_TIMEOUT;
use posecheck_core::{DEFAULT_MAX_FILE_BYTES, MIB, MediaPolicy};
use tracing::warn;

/// Env var overriding the analysis service base URL.
pub const ENV_API_BASE_URL: &str = "POSECHECK_API_BASE_URL";
/// Env var overriding the request timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "POSECHECK_TIMEOUT_MS";
/// Env var overriding the error display lifetime in milliseconds.
pub const ENV_ERROR_TTL_MS: &str = "POSECHECK_ERROR_TTL_MS";
/// Env var overriding the maximum media size in MiB.
pub const ENV_MAX_FILE_MB: &str = "POSECHECK_MAX_FILE_MB";

/// Service base URL used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
/// How long a surfaced error stays visible.
pub const DEFAULT_ERROR_TTL: Duration = Duration::from_millis(5_000);

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Analysis service base URL (without `/analyze-frame`).
    pub api_base_url: String,
    /// Per-submission timeout.
    pub request_timeout: Duration,
    /// Error display lifetime.
    pub error_ttl: Duration,
    /// Maximum accepted media size in bytes.
    pub max_file_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            error_ttl: DEFAULT_ERROR_TTL,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`.
    ///
    /// Blank or unparsable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).filter(|raw| !raw.trim().is_empty());

        Self {
            api_base_url: value(ENV_API_BASE_URL)
                .map(|raw| raw.trim().to_string())
                .unwrap_or(defaults.api_base_url),
            request_timeout: value(ENV_TIMEOUT_MS)
                .and_then(|raw| parse_positive(ENV_TIMEOUT_MS, &raw))
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            error_ttl: value(ENV_ERROR_TTL_MS)
                .and_then(|raw| parse_positive(ENV_ERROR_TTL_MS, &raw))
                .map(Duration::from_millis)
                .unwrap_or(defaults.error_ttl),
            max_file_bytes: value(ENV_MAX_FILE_MB)
                .and_then(|raw| parse_positive(ENV_MAX_FILE_MB, &raw))
                .and_then(|mb| mb.checked_mul(MIB))
                .unwrap_or(defaults.max_file_bytes),
        }
    }

    /// Validation policy derived from the configured size limit.
    pub fn media_policy(&self) -> MediaPolicy {
        MediaPolicy::with_max_size(self.max_file_bytes)
    }
}

fn parse_positive(key: &str, raw: &str) -> Option<u64> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            warn!(stage = "config", action = "ignored", key, value = raw, "expected a positive integer");
            None
        }
    }
}
