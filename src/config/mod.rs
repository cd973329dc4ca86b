//! Configuration for the OpenAI client.
//!
//! Credentials and the base address are checked here, before any endpoint is
//! built, so the transport never sees an empty key or an unusable URL.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

use crate::errors::{WebserviceError, WebserviceResult};
use crate::transport::DEFAULT_MAX_BODY_SIZE;

/// Default base URL for the OpenAI API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";

/// Default request timeout (60 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the OpenAI client.
#[derive(Clone)]
pub struct OpenAIConfig {
    api_key: SecretString,
    /// Base URL; always ends with `/` so relative paths join beneath it.
    pub base_url: Url,
    /// Deadline applied to each call.
    pub timeout: Duration,
    /// Ceiling for buffered response bodies.
    pub max_body_size: usize,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
}

impl OpenAIConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> OpenAIConfigBuilder {
        OpenAIConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENAI_API_KEY` (required): API key for authentication
    /// - `OPENAI_BASE_URL` (optional): Custom base URL
    /// - `OPENAI_TIMEOUT` (optional): Request timeout in seconds
    pub fn from_env() -> WebserviceResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            WebserviceError::validation_param("OPENAI_API_KEY environment variable not set", "api_key")
        })?;

        let mut builder = OpenAIConfigBuilder::new().api_key(api_key);

        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            builder = builder.base_url(base_url);
        }

        if let Ok(timeout_str) = std::env::var("OPENAI_TIMEOUT") {
            let secs = timeout_str.parse::<u64>().map_err(|_| {
                WebserviceError::validation_param(
                    format!("OPENAI_TIMEOUT must be a number of seconds, got '{}'", timeout_str),
                    "timeout",
                )
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build()
    }

    /// Returns the API key (exposing the secret).
    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Returns the API key hint (last 4 characters) for debugging.
    pub fn api_key_hint(&self) -> String {
        let key = self.api_key.expose_secret();
        match key.char_indices().rev().nth(3) {
            Some((start, _)) if start > 0 => format!("...{}", &key[start..]),
            _ => "****".to_string(),
        }
    }

    /// Joins a relative path onto the base URL.
    pub fn endpoint_url(&self, path: &str) -> WebserviceResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

impl std::fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("max_body_size", &self.max_body_size)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Builder for `OpenAIConfig`.
#[derive(Default)]
pub struct OpenAIConfigBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    max_body_size: Option<usize>,
    user_agent: Option<String>,
}

impl OpenAIConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the response body ceiling.
    pub fn max_body_size(mut self, limit: usize) -> Self {
        self.max_body_size = Some(limit);
        self
    }

    /// Sets the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> WebserviceResult<OpenAIConfig> {
        let api_key = self
            .api_key
            .ok_or_else(|| WebserviceError::validation_param("API key is required", "api_key"))?;

        if api_key.trim().is_empty() {
            return Err(WebserviceError::validation_param(
                "API key cannot be empty",
                "api_key",
            ));
        }

        let base_url = parse_base_url(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(WebserviceError::validation_param(
                "Timeout must be greater than 0",
                "timeout",
            ));
        }

        Ok(OpenAIConfig {
            api_key: SecretString::new(api_key),
            base_url,
            timeout,
            max_body_size: self.max_body_size.unwrap_or(DEFAULT_MAX_BODY_SIZE),
            user_agent: self
                .user_agent
                .unwrap_or_else(|| format!("chatgpt-webservice/{}", env!("CARGO_PKG_VERSION"))),
        })
    }
}

fn parse_base_url(raw: &str) -> WebserviceResult<Url> {
    let mut url = Url::parse(raw)?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(WebserviceError::validation_param(
            format!("Base URL must be an http(s) URL, got '{}'", raw),
            "base_url",
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
