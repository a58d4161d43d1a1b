//! Transports: turn a [`RequestDescriptor`] into a [`RawResponse`].
//!
//! The controller only sees the [`Transport`] trait. [`HttpTransport`] is the
//! reqwest-backed implementation used by the CLI; tests plug in an
//! in-memory fake.

use crate::config::ClientConfig;
use crate::error::DocGeniusError;
use crate::interpret::RawResponse;
use crate::request::RequestDescriptor;
use async_trait::async_trait;
use reqwest::header::{HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Sends one descriptor and returns whatever the service answered.
///
/// Implementations return `Err` only when no response was obtained
/// ([`DocGeniusError::Transport`]); a non-2xx status is still `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse, DocGeniusError>;
}

/// `GET /health` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Deserialize)]
struct FormatsBody {
    formats: Vec<String>,
}

#[derive(Deserialize)]
struct LanguagesBody {
    languages: Vec<String>,
}

/// reqwest-backed transport posting multipart forms.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, DocGeniusError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| DocGeniusError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<HealthStatus, DocGeniusError> {
        self.get_json("/health").await
    }

    /// `GET /supported-formats`.
    pub async fn supported_formats(&self) -> Result<Vec<String>, DocGeniusError> {
        let body: FormatsBody = self.get_json("/supported-formats").await?;
        Ok(body.formats)
    }

    /// `GET /supported-languages`.
    pub async fn supported_languages(&self) -> Result<Vec<String>, DocGeniusError> {
        let body: LanguagesBody = self.get_json("/supported-languages").await?;
        Ok(body.languages)
    }

    fn endpoint_url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let prefix = self.base_url.path().trim_end_matches('/');
        url.set_path(&format!("{prefix}{path}"));
        url.set_query(None);
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DocGeniusError> {
        let url = self.endpoint_url(path);
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;
        let raw = into_raw(response, &url).await?;
        if !raw.is_success() {
            return Err(DocGeniusError::Service {
                message: format!("HTTP error! status: {}", raw.status),
                status: raw.status,
                request_id: None,
            });
        }
        serde_json::from_slice(&raw.body).map_err(|e| DocGeniusError::Parse {
            detail: e.to_string(),
            status: raw.status,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse, DocGeniusError> {
        let url = request.url(&self.base_url)?;

        let mut form = Form::new();
        for file in &request.files {
            let part = Part::bytes(file.bytes().to_vec())
                .file_name(file.name().to_string())
                .mime_str(file.content_type())
                .map_err(|e| {
                    DocGeniusError::Internal(format!(
                        "invalid content type '{}': {e}",
                        file.content_type()
                    ))
                })?;
            form = form.part(request.file_field.name(), part);
        }

        info!(
            "POST {} ({} file(s))",
            request.path_and_query(),
            request.files.len()
        );
        let response = self
            .client
            .post(url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        into_raw(response, &url).await
    }
}

fn transport_error(url: &Url, e: reqwest::Error) -> DocGeniusError {
    let reason = if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    };
    DocGeniusError::Transport {
        url: url.to_string(),
        reason,
    }
}

async fn into_raw(response: reqwest::Response, url: &Url) -> Result<RawResponse, DocGeniusError> {
    let status = response.status().as_u16();
    let header = |name: HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let content_type = header(CONTENT_TYPE);
    let content_disposition = header(CONTENT_DISPOSITION);

    let body = response
        .bytes()
        .await
        .map_err(|e| transport_error(url, e))?
        .to_vec();

    debug!(
        "{} → {} ({} bytes, {})",
        url,
        status,
        body.len(),
        content_type.as_deref().unwrap_or("no content-type")
    );

    Ok(RawResponse {
        status,
        content_type,
        content_disposition,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_keeps_prefix() {
        let config = ClientConfig::builder()
            .base_url("http://svc.local/api/")
            .build()
            .unwrap();
        let t = HttpTransport::new(&config).unwrap();
        assert_eq!(
            t.endpoint_url("/health").as_str(),
            "http://svc.local/api/health"
        );
    }

    #[test]
    fn health_body_without_version() {
        let h: HealthStatus = serde_json::from_str(r#"{"status":"healthy"}"#).unwrap();
        assert_eq!(h.status, "healthy");
        assert_eq!(h.version, None);
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        // Port 9 (discard) on localhost is closed on test machines.
        let config = ClientConfig::builder()
            .base_url("http://127.0.0.1:9")
            .request_timeout_secs(5)
            .build()
            .unwrap();
        let t = HttpTransport::new(&config).unwrap();
        let err = t.health().await.unwrap_err();
        assert!(matches!(err, DocGeniusError::Transport { .. }), "{err:?}");
    }
}
