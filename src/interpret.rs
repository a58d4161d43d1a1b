//! Response interpreter: raw HTTP response → [`ResponseEnvelope`].
//!
//! ## Classification order
//!
//! 1. **Status.** Anything outside 2xx is a failure. The body is mined for
//!    `error.message` and `request_id`; otherwise a generic status message.
//! 2. **Content type.** If the request expected an artifact (Convert, or a
//!    zipped Batch) and the body is not JSON, it is kept as opaque bytes and
//!    named from `Content-Disposition`.
//! 3. **JSON.** Everything else is parsed as the `{ data?, request_id? }`
//!    envelope. A malformed body is a failure, never an empty success.
//!
//! A JSON content type wins over the requested flags: a batch that asked for
//! a zip but got JSON back is treated as a JSON report.

use crate::artifact::Artifact;
use crate::error::{DocGeniusError, FailureKind};
use crate::request::ResponseExpectation;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

static RE_DISPOSITION_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)filename="?([^";]+)"?"#).unwrap());

/// Response metadata as handed over by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_content_type(mut self, ct: impl Into<String>) -> Self {
        self.content_type = Some(ct.into());
        self
    }

    pub fn with_content_disposition(mut self, cd: impl Into<String>) -> Self {
        self.content_disposition = Some(cd.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Normalised outcome of one submission. Exactly one variant per response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    Json {
        request_id: Option<String>,
        payload: Value,
    },
    Binary {
        request_id: Option<String>,
        artifact: Artifact,
    },
    Failure {
        message: String,
        request_id: Option<String>,
        /// 0 when no HTTP response was obtained.
        http_status: u16,
        kind: FailureKind,
    },
}

impl ResponseEnvelope {
    pub fn request_id(&self) -> Option<&str> {
        match self {
            ResponseEnvelope::Json { request_id, .. }
            | ResponseEnvelope::Binary { request_id, .. }
            | ResponseEnvelope::Failure { request_id, .. } => request_id.as_deref(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ResponseEnvelope::Failure { .. })
    }

    /// Failure envelope for an error raised before or instead of a response.
    pub fn from_error(err: &DocGeniusError) -> Self {
        let request_id = match err {
            DocGeniusError::Service { request_id, .. } => request_id.clone(),
            _ => None,
        };
        ResponseEnvelope::Failure {
            message: err.to_string(),
            request_id,
            http_status: err.http_status(),
            kind: err.failure_kind(),
        }
    }
}

/// Classify a raw response for a request with the given expectation.
pub fn interpret(expect: &ResponseExpectation, raw: &RawResponse) -> ResponseEnvelope {
    if !raw.is_success() {
        let err = service_error(raw);
        warn!("{} request failed: {}", expect.operation, err);
        return ResponseEnvelope::from_error(&err);
    }

    if expect.expects_binary() && !is_json_content_type(raw.content_type.as_deref()) {
        let file_name = raw
            .content_disposition
            .as_deref()
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| expect.fallback_file_name());
        debug!("Binary result: {} ({} bytes)", file_name, raw.body.len());
        return ResponseEnvelope::Binary {
            request_id: None,
            artifact: Artifact::new(file_name, raw.body.clone()),
        };
    }

    match serde_json::from_slice::<Value>(&raw.body) {
        Ok(mut body) => {
            let request_id = request_id_of(&body);
            let has_data = body.get("data").is_some_and(|d| !d.is_null());
            let payload = if has_data {
                body.get_mut("data").map(Value::take).unwrap_or(Value::Null)
            } else {
                body
            };
            ResponseEnvelope::Json {
                request_id,
                payload,
            }
        }
        Err(e) => {
            warn!("Malformed JSON from {} endpoint: {}", expect.operation, e);
            ResponseEnvelope::from_error(&DocGeniusError::Parse {
                detail: e.to_string(),
                status: raw.status,
            })
        }
    }
}

/// Build the [`DocGeniusError::Service`] for a non-2xx response.
fn service_error(raw: &RawResponse) -> DocGeniusError {
    let body = serde_json::from_slice::<Value>(&raw.body).ok();
    let request_id = body.as_ref().and_then(request_id_of);
    let error_message = body
        .as_ref()
        .and_then(|b| b.get("error"))
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty());

    let message = match error_message {
        Some(m) => format!("{} ({})", m, request_id.as_deref().unwrap_or("no-id")),
        None => format!("HTTP error! status: {}", raw.status),
    };

    DocGeniusError::Service {
        message,
        status: raw.status,
        request_id,
    }
}

fn request_id_of(body: &Value) -> Option<String> {
    body.get("request_id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Extract the file name from a `Content-Disposition` header value.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    RE_DISPOSITION_FILENAME
        .captures(header)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
}

fn is_json_content_type(ct: Option<&str>) -> bool {
    let Some(ct) = ct else { return false };
    let mime = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}
