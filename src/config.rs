//! Client configuration.
//!
//! [`ClientConfig`] holds where the service lives and the defaults that seed
//! a fresh [`crate::selector::SelectorState`]. Build it through
//! [`ClientConfigBuilder`] so the base URL is validated once, up front.

use crate::error::DocGeniusError;
use crate::selector::SelectorState;
use once_cell::sync::Lazy;
use reqwest::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
/// Language a translation targets until the user picks another.
pub const DEFAULT_TARGET_LANGUAGE: &str = "en";
/// Format a conversion produces until the user picks another.
pub const DEFAULT_OUTPUT_FORMAT: &str = "md";

static DEFAULT_URL: Lazy<Url> = Lazy::new(|| Url::parse(DEFAULT_BASE_URL).unwrap());

/// Configuration for talking to the document-processing service.
///
/// # Example
/// ```rust
/// use docgenius_client::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("http://docs.internal:8000")
///     .request_timeout_secs(120)
///     .default_target_language("fr")
///     .build()
///     .unwrap();
/// assert_eq!(config.base_url.as_str(), "http://docs.internal:8000/");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service root. Endpoints are appended to its path.
    pub base_url: Url,

    /// Whole-request timeout applied by the HTTP transport. Default: none.
    ///
    /// The controller itself never times a request out; a slow batch simply
    /// keeps the trigger in its processing state until the transport gives up.
    pub request_timeout_secs: Option<u64>,

    /// `User-Agent` header sent by the HTTP transport.
    pub user_agent: String,

    /// Initial target language for translate paths. Default: `en`.
    pub default_target_language: String,

    /// Initial output format for convert paths. Default: `md`.
    pub default_output_format: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_URL.clone(),
            request_timeout_secs: None,
            user_agent: concat!("docgenius-client/", env!("CARGO_PKG_VERSION")).to_string(),
            default_target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            default_output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            base_url: None,
            config: Self::default(),
        }
    }

    /// Selector state seeded with this config's defaults.
    pub fn initial_state(&self) -> SelectorState {
        SelectorState::new(
            self.default_target_language.clone(),
            self.default_output_format.clone(),
        )
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn no_timeout(mut self) -> Self {
        self.config.request_timeout_secs = None;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn default_target_language(mut self, lang: impl Into<String>) -> Self {
        self.config.default_target_language = lang.into();
        self
    }

    pub fn default_output_format(mut self, fmt: impl Into<String>) -> Self {
        self.config.default_output_format = fmt.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ClientConfig, DocGeniusError> {
        if let Some(raw) = self.base_url.take() {
            let url = Url::parse(raw.trim()).map_err(|e| {
                DocGeniusError::InvalidConfig(format!("base URL '{raw}' is invalid: {e}"))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(DocGeniusError::InvalidConfig(format!(
                    "base URL must be http or https, got '{}'",
                    url.scheme()
                )));
            }
            self.config.base_url = url;
        }

        let c = &self.config;
        if c.request_timeout_secs == Some(0) {
            return Err(DocGeniusError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        if c.default_target_language.trim().is_empty() {
            return Err(DocGeniusError::InvalidConfig(
                "Default target language must not be empty".into(),
            ));
        }
        if c.default_output_format.trim().is_empty() {
            return Err(DocGeniusError::InvalidConfig(
                "Default output format must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
