//! Request metadata attached to every call.

use crate::config::SdkConfig;
use std::collections::BTreeMap;

/// Header names and values, sorted by name.
///
/// Names are compared case-insensitively on the wire, so entries should go in
/// through [`insert_header`].
pub type Metadata = BTreeMap<String, String>;

pub const API_KEY_HEADER: &str = "X-Api-Key";
pub const LEGACY_API_KEY_HEADER: &str = "apikey";
pub const CLIENT_ID_HEADER: &str = "X-Nyris-ClientID";
pub const USER_AGENT_HEADER: &str = "User-Agent";

/// Inserts a header, replacing any entry whose name differs only in case.
pub fn insert_header(headers: &mut Metadata, name: impl Into<String>, value: impl Into<String>) {
    let name = name.into();
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
    headers.insert(name, value.into());
}

/// Produces the default metadata for every request.
///
/// Built once from [`SdkConfig`] and never mutated, so one provider is shared
/// by every in-flight call.
#[derive(Clone, PartialEq)]
pub struct HeaderProvider {
    api_key: String,
    client_id: Option<String>,
    user_agent: String,
}

impl HeaderProvider {
    pub fn new(
        api_key: impl Into<String>,
        sdk_id: &str,
        sdk_version: &str,
        commit_hash: &str,
        platform_version: Option<&str>,
    ) -> Self {
        let platform = platform_version.unwrap_or("unknown");
        Self {
            api_key: api_key.into(),
            client_id: None,
            user_agent: format!("{sdk_id}/{sdk_version} ({commit_hash} {platform})"),
        }
    }

    pub fn from_config(config: &SdkConfig) -> Self {
        let provider = Self::new(
            config.api_key.clone(),
            &config.sdk_id,
            &config.sdk_version,
            &config.commit_hash,
            config.platform_version.as_deref(),
        );
        match &config.client_id {
            Some(client_id) => provider.with_client_id(client_id.clone()),
            None => provider,
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// The default headers for a request.
    ///
    /// An empty client id is left out.
    pub fn metadata(&self) -> Metadata {
        let mut headers = Metadata::new();
        headers.insert(API_KEY_HEADER.to_string(), self.api_key.clone());
        headers.insert(LEGACY_API_KEY_HEADER.to_string(), self.api_key.clone());
        headers.insert(USER_AGENT_HEADER.to_string(), self.user_agent.clone());
        if let Some(client_id) = self.client_id.as_ref().filter(|id| !id.is_empty()) {
            headers.insert(CLIENT_ID_HEADER.to_string(), client_id.clone());
        }
        headers
    }

    /// The default headers with `overrides` applied on top.
    pub fn merged(&self, overrides: &Metadata) -> Metadata {
        let mut headers = self.metadata();
        for (name, value) in overrides {
            insert_header(&mut headers, name.clone(), value.clone());
        }
        headers
    }
}

// Keeps the API key out of logs.
impl std::fmt::Debug for HeaderProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderProvider")
            .field("api_key", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
