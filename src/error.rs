// src/error.rs
// Centralized error taxonomy for the triage engine.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the model service client.
///
/// The gateway consults [`ProviderError::is_retryable`] to decide whether an
/// attempt slot should be spent waiting out the backoff delay or whether the
/// call should drop straight to the keyword fallback.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error calling model service: {0}")]
    Network(String),

    #[error("model service call timed out after {0:?}")]
    Timeout(Duration),

    #[error("model service returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("model service authentication failed: {0}")]
    Auth(String),
}

impl ProviderError {
    /// Transient failures are worth another attempt; auth problems and
    /// client-side rejections are not going to clear up mid-request.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Network(_) | ProviderError::Timeout(_) => true,
            ProviderError::Upstream { status, .. } => *status == 429 || *status >= 500,
            ProviderError::Auth(_) => false,
        }
    }
}

/// Failures while extracting a (department, confidence) pair from a model
/// reply. These are never retried: the model already answered, it just
/// answered in a shape we cannot trust.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("reply contains no department line")]
    MissingDepartment,

    #[error("reply names a department outside the configured set: {0}")]
    UnknownDepartment(String),

    #[error("confidence is not an integer in 0-100: {0}")]
    InvalidConfidence(String),
}

/// Structural problems with the triage configuration. Any of these is fatal
/// at startup; both classification strategies assume the department set is
/// non-empty and authoritative.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid triage configuration: {}", issues.join("; "))]
    Invalid { issues: Vec<String> },
}

/// Errors on the routing seam between a classification result and the
/// storage collaborator.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("invalid department {department:?}: must be one of {valid}")]
    UnknownDepartment { department: String, valid: String },

    #[error("confidence score must be between 0 and 100, got {0}")]
    InvalidConfidence(u8),

    #[error("storage collaborator rejected the assignment: {0}")]
    Sink(String),
}
