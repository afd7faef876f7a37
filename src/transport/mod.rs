//! Transport abstraction for backend calls.
//!
//! A [`Transport`] performs the network call for a [`RequestContext`]. It
//! offers two call shapes:
//!
//! - **body-only** ([`Transport::call`]): status and raw body
//! - **envelope** ([`Transport::call_with_envelope`]): status, headers, the
//!   correlation id and raw body
//!
//! Both return `Err` for non-2xx statuses ([`SearchError::Http`]) and for
//! connection failures ([`SearchError::Connection`]). Neither decodes the
//! body; that is the resolver's job.
//!
//! [`HttpTransport`] is the production implementation on top of `reqwest`.
//! Tests substitute their own implementation.

use crate::error::SearchError;
use crate::headers::Metadata;
use crate::types::CorrelationId;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;

pub mod http;

pub use http::HttpTransport;

/// Response header carrying the server-assigned matching request id.
pub const CORRELATION_ID_HEADER: &str = "x-matching-request";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A request body and its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Payload {
    pub fn new(content_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// A JPEG image payload.
    pub fn jpeg(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new("image/jpeg", bytes)
    }

    pub fn json(json: impl Into<String>) -> Self {
        Self::new("application/json", json.into().into_bytes())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new("text/plain; charset=utf-8", text.into().into_bytes())
    }

    /// Reads an image file, guessing its content type from the extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SearchError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| "image/jpeg".to_string());
        Ok(Self::new(mime_type, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Everything a transport needs for one call.
///
/// Built per call and consumed by it.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub method: Method,
    pub url: String,
    pub headers: Metadata,
    pub payload: Option<Payload>,
}

impl RequestContext {
    pub fn get(url: impl Into<String>, headers: Metadata) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers,
            payload: None,
        }
    }

    pub fn post(url: impl Into<String>, headers: Metadata, payload: Option<Payload>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers,
            payload,
        }
    }
}

/// Result of a body-only call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportBody {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Result of an envelope call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEnvelope {
    pub status: u16,
    /// Response headers, names lowercased
    pub headers: BTreeMap<String, String>,
    pub correlation_id: Option<CorrelationId>,
    pub body: Vec<u8>,
}

impl TransportEnvelope {
    /// Builds an envelope, taking the correlation id from the response headers.
    pub fn from_parts(status: u16, headers: BTreeMap<String, String>, body: Vec<u8>) -> Self {
        let correlation_id = headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|value| CorrelationId::new(value.clone()));
        Self {
            status,
            headers,
            correlation_id,
            body,
        }
    }
}

/// Performs backend calls.
///
/// Implementations must be safe to share across concurrent calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Body-only call.
    async fn call(&self, request: &RequestContext) -> Result<TransportBody, SearchError>;

    /// Envelope call.
    async fn call_with_envelope(
        &self,
        request: &RequestContext,
    ) -> Result<TransportEnvelope, SearchError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_envelope_picks_up_correlation_id() {
        let mut headers = BTreeMap::new();
        headers.insert(CORRELATION_ID_HEADER.to_string(), "req-42".to_string());
        let envelope = TransportEnvelope::from_parts(200, headers, b"{}".to_vec());
        assert_eq!(envelope.correlation_id.unwrap().as_str(), "req-42");

        let envelope = TransportEnvelope::from_parts(200, BTreeMap::new(), Vec::new());
        assert!(envelope.correlation_id.is_none());
    }

    #[test]
    fn test_payload_from_file_guesses_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shoe.png");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[0x89, 0x50, 0x4e, 0x47]).unwrap();

        let payload = Payload::from_file(&path).unwrap();
        assert_eq!(payload.content_type, "image/png");
        assert_eq!(payload.len(), 4);
    }

    #[test]
    fn test_payload_from_missing_file() {
        let result = Payload::from_file("does/not/exist.jpg");
        assert!(matches!(result, Err(SearchError::Io(_))));
    }
}
