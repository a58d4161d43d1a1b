//! Error types for the docgenius-client library.
//!
//! Every submission ends in exactly one of four outcomes besides success,
//! and each has its own variant so hosts can react differently:
//!
//! * [`DocGeniusError::Validation`]: nothing was sent. The user forgot to
//!   pick a file, enabled no batch step, or pressed submit twice.
//! * [`DocGeniusError::Transport`]: the request left but no HTTP response
//!   came back (DNS, refused connection, TLS, timeout).
//! * [`DocGeniusError::Service`]: the service answered with a non-2xx status.
//! * [`DocGeniusError::Parse`]: a JSON body was expected and was malformed.
//!
//! The remaining variants cover local I/O and configuration.
//!
//! On the rendering side, the same taxonomy is carried by
//! [`FailureKind`] inside [`crate::interpret::ResponseEnvelope::Failure`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the docgenius-client library.
#[derive(Debug, Error)]
pub enum DocGeniusError {
    // ── Submission errors ─────────────────────────────────────────────────
    /// Input rejected before any network call.
    #[error("{0}")]
    Validation(ValidationError),

    /// The request could not be completed; no response was obtained.
    #[error("Request to '{url}' failed: {reason}\nCheck that the service is running and reachable.")]
    Transport { url: String, reason: String },

    /// The service answered with a non-2xx status.
    #[error("{message}")]
    Service {
        message: String,
        status: u16,
        request_id: Option<String>,
    },

    /// A body that should have been JSON could not be parsed. The response
    /// did arrive, so `status` is its HTTP status.
    #[error("Failed to parse response body as JSON: {detail}")]
    Parse { detail: String, status: u16 },

    // ── Local file errors ─────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Could not write a downloaded artifact.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The service base URL could not be combined with an endpoint.
    #[error("Invalid service URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocGeniusError {
    /// Failure category used by the renderer.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            DocGeniusError::Validation(_) => FailureKind::Validation,
            DocGeniusError::Transport { .. } | DocGeniusError::InvalidUrl { .. } => {
                FailureKind::Transport
            }
            DocGeniusError::Service { .. } => FailureKind::Service,
            DocGeniusError::Parse { .. } => FailureKind::Parse,
            _ => FailureKind::Internal,
        }
    }

    /// HTTP status when a response was obtained, otherwise 0.
    pub fn http_status(&self) -> u16 {
        match self {
            DocGeniusError::Service { status, .. } | DocGeniusError::Parse { status, .. } => {
                *status
            }
            _ => 0,
        }
    }
}

impl From<ValidationError> for DocGeniusError {
    fn from(e: ValidationError) -> Self {
        DocGeniusError::Validation(e)
    }
}

/// Reasons a submission is rejected before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("Please select a file first")]
    NoFiles,

    #[error("Select at least one batch operation")]
    EmptyBatchSelection,

    #[error("A request is already in progress")]
    Busy,
}

/// Category of a failed submission, as carried by a failure envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Transport,
    Service,
    Parse,
    Internal,
}
