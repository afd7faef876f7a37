//! Constructor-time configuration for the SDK.
//!
//! [`SdkConfig`] carries every value the embedding application supplies:
//! credentials, SDK identity for the `User-Agent`, and where the backend
//! lives. It can be built in code or deserialized from JSON; missing fields
//! fall back to the production defaults below.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_HOST: &str = "api.nyris.io";
pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_OUTPUT_FORMAT: &str = "application/offers.complete+json";
pub const DEFAULT_LANGUAGE: &str = "*";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_SDK_ID: &str = "visual-search-sdk";

/// Configuration values supplied by the embedding application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SdkConfig {
    /// API key sent with every request
    pub api_key: String,
    /// Optional application/client identifier
    pub client_id: Option<String>,
    /// SDK name reported in the `User-Agent`
    pub sdk_id: String,
    /// SDK version reported in the `User-Agent`
    pub sdk_version: String,
    /// Commit hash of the SDK build
    pub commit_hash: String,
    /// Platform description (OS name and version)
    pub platform_version: Option<String>,
    /// URL scheme, usually `https`
    pub scheme: String,
    /// Backend host, without scheme or trailing slash
    pub host: String,
    /// API version path segment
    pub api_version: String,
    /// Default `Accept` header for offer responses
    pub output_format: String,
    /// Default `Accept-Language` header
    pub language: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            client_id: None,
            sdk_id: DEFAULT_SDK_ID.to_string(),
            sdk_version: env!("CARGO_PKG_VERSION").to_string(),
            commit_hash: "unknown".to_string(),
            platform_version: Some(std::env::consts::OS.to_string()),
            scheme: DEFAULT_SCHEME.to_string(),
            host: DEFAULT_HOST.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl SdkConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Parses a configuration from JSON; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SearchError> {
        let config: SdkConfig = serde_json::from_str(json)
            .map_err(|e| SearchError::Config(format!("Invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_sdk_version(
        mut self,
        sdk_id: impl Into<String>,
        sdk_version: impl Into<String>,
        commit_hash: impl Into<String>,
    ) -> Self {
        self.sdk_id = sdk_id.into();
        self.sdk_version = sdk_version.into();
        self.commit_hash = commit_hash.into();
        self
    }

    pub fn with_platform_version(mut self, platform_version: impl Into<String>) -> Self {
        self.platform_version = Some(platform_version.into());
        self
    }

    /// Points the SDK at another backend, e.g. a staging host or a test server.
    pub fn with_endpoint(
        mut self,
        scheme: impl Into<String>,
        host: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        self.scheme = scheme.into();
        self.host = host.into();
        self.api_version = api_version.into();
        self
    }

    /// Points the SDK at a base URL such as `http://127.0.0.1:1234`.
    ///
    /// The scheme and host are split out of the URL; the API version is kept.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, SearchError> {
        let (scheme, host) = base_url
            .split_once("://")
            .ok_or_else(|| SearchError::Config(format!("Base URL has no scheme: {base_url}")))?;
        self.scheme = scheme.to_string();
        self.host = host.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_output_format(mut self, output_format: impl Into<String>) -> Self {
        self.output_format = output_format.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Checks that the values needed to build requests are present.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.api_key.trim().is_empty() {
            return Err(SearchError::Config("API key must not be empty".to_string()));
        }
        if self.scheme.is_empty() || self.host.is_empty() {
            return Err(SearchError::Config(
                "Scheme and host must not be empty".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(SearchError::Config(
                "Timeout must be at least one millisecond".to_string(),
            ));
        }
        if self.api_version.is_empty() {
            return Err(SearchError::Config(
                "API version must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
