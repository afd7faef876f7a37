//! Response resolution: one transport call, one decode strategy per shape.
//!
//! The caller picks an [`OutputShape`]; the [`ResponseResolver`] maps it to
//! exactly one transport method before any I/O happens:
//!
//! | Shape | Transport method | Decoding |
//! |-------|------------------|----------|
//! | [`OutputShape::RawBody`] | `call` | JSON into the target type |
//! | [`OutputShape::JsonEnvelope`] | `call` | none, body text kept verbatim |
//! | [`OutputShape::ResponseEnvelope`] | `call_with_envelope` | JSON into the target type, plus status/headers/correlation id |
//!
//! Transport failures come back unchanged; error bodies are never decoded.

use crate::error::SearchError;
use crate::transport::{RequestContext, Transport};
use crate::types::{Confirmation, JsonResponseBody, ResponseEnvelope};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, error};

/// The result form requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OutputShape {
    /// The decoded domain object.
    #[default]
    RawBody,
    /// The body text, undecoded.
    JsonEnvelope,
    /// The decoded domain object plus transport metadata.
    ResponseEnvelope,
}

/// A resolved value in the shape the caller asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    Body(T),
    Json(JsonResponseBody),
    Envelope(ResponseEnvelope<T>),
}

impl<T> Resolved<T> {
    pub fn shape(&self) -> OutputShape {
        match self {
            Resolved::Body(_) => OutputShape::RawBody,
            Resolved::Json(_) => OutputShape::JsonEnvelope,
            Resolved::Envelope(_) => OutputShape::ResponseEnvelope,
        }
    }

    pub fn into_body(self) -> Option<T> {
        match self {
            Resolved::Body(body) => Some(body),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<JsonResponseBody> {
        match self {
            Resolved::Json(json) => Some(json),
            _ => None,
        }
    }

    pub fn into_envelope(self) -> Option<ResponseEnvelope<T>> {
        match self {
            Resolved::Envelope(envelope) => Some(envelope),
            _ => None,
        }
    }
}

/// Dispatches requests to the transport and decodes the results.
#[derive(Clone)]
pub struct ResponseResolver {
    transport: Arc<dyn Transport>,
}

impl ResponseResolver {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Resolves `request` into the requested shape.
    pub async fn resolve<T>(
        &self,
        shape: OutputShape,
        request: RequestContext,
    ) -> Result<Resolved<T>, SearchError>
    where
        T: DeserializeOwned,
    {
        debug!("Resolving {} as {:?}", request.url, shape);
        match shape {
            OutputShape::RawBody => self.resolve_body(request).await.map(Resolved::Body),
            OutputShape::JsonEnvelope => self.resolve_json(request).await.map(Resolved::Json),
            OutputShape::ResponseEnvelope => self
                .resolve_envelope(request)
                .await
                .map(Resolved::Envelope),
        }
    }

    /// Body-only call decoded into `T`.
    pub async fn resolve_body<T>(&self, request: RequestContext) -> Result<T, SearchError>
    where
        T: DeserializeOwned,
    {
        let response = self.transport.call(&request).await?;
        decode(&response.body)
    }

    /// Body-only call with the body text kept verbatim.
    pub async fn resolve_json(
        &self,
        request: RequestContext,
    ) -> Result<JsonResponseBody, SearchError> {
        let response = self.transport.call(&request).await?;
        let json = String::from_utf8(response.body)?;
        Ok(JsonResponseBody { json })
    }

    /// Envelope call with the body decoded into `T`.
    pub async fn resolve_envelope<T>(
        &self,
        request: RequestContext,
    ) -> Result<ResponseEnvelope<T>, SearchError>
    where
        T: DeserializeOwned,
    {
        let envelope = self.transport.call_with_envelope(&request).await?;
        let body = decode(&envelope.body)?;
        Ok(ResponseEnvelope {
            status: envelope.status,
            headers: envelope.headers,
            correlation_id: envelope.correlation_id,
            body,
        })
    }

    /// Body-only call whose body is only an acknowledgement.
    pub async fn confirm(&self, request: RequestContext) -> Result<Confirmation, SearchError> {
        let response = self.transport.call(&request).await?;
        let body = String::from_utf8(response.body)?;
        Ok(Confirmation {
            status: response.status,
            body,
        })
    }
}

impl std::fmt::Debug for ResponseResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseResolver")
            .field("transport", &"<transport>")
            .finish()
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, SearchError> {
    serde_json::from_slice(body).map_err(|e| {
        error!("Failed to decode response body: {}", e);
        SearchError::Decode(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{TransportBody, TransportEnvelope, CORRELATION_ID_HEADER};
    use async_trait::async_trait;
    use serde::Deserialize;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        name: String,
    }

    struct FixedTransport {
        body: &'static str,
        calls: AtomicUsize,
        envelope_calls: AtomicUsize,
    }

    impl FixedTransport {
        fn new(body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                body,
                calls: AtomicUsize::new(0),
                envelope_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn call(&self, _request: &RequestContext) -> Result<TransportBody, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TransportBody {
                status: 200,
                body: self.body.as_bytes().to_vec(),
            })
        }

        async fn call_with_envelope(
            &self,
            _request: &RequestContext,
        ) -> Result<TransportEnvelope, SearchError> {
            self.envelope_calls.fetch_add(1, Ordering::SeqCst);
            let mut headers = BTreeMap::new();
            headers.insert(CORRELATION_ID_HEADER.to_string(), "req-1".to_string());
            Ok(TransportEnvelope::from_parts(
                200,
                headers,
                self.body.as_bytes().to_vec(),
            ))
        }
    }

    fn request() -> RequestContext {
        RequestContext::get("http://localhost/items", BTreeMap::new())
    }

    #[tokio::test]
    async fn test_each_shape_uses_one_transport_method() {
        for (shape, expected_calls, expected_envelope_calls) in [
            (OutputShape::RawBody, 1, 0),
            (OutputShape::JsonEnvelope, 1, 0),
            (OutputShape::ResponseEnvelope, 0, 1),
        ] {
            let transport = FixedTransport::new(r#"{"name":"shoe"}"#);
            let resolver = ResponseResolver::new(transport.clone());
            let resolved = resolver.resolve::<Item>(shape, request()).await.unwrap();

            assert_eq!(resolved.shape(), shape);
            assert_eq!(transport.calls.load(Ordering::SeqCst), expected_calls);
            assert_eq!(
                transport.envelope_calls.load(Ordering::SeqCst),
                expected_envelope_calls
            );
        }
    }

    #[tokio::test]
    async fn test_json_shape_skips_decoding() {
        // Not valid for `Item`, but the JSON shape never decodes.
        let transport = FixedTransport::new("not json at all");
        let resolver = ResponseResolver::new(transport);
        let resolved = resolver
            .resolve::<Item>(OutputShape::JsonEnvelope, request())
            .await
            .unwrap();
        assert_eq!(resolved.into_json().unwrap().json, "not json at all");
    }

    #[tokio::test]
    async fn test_decode_failure_is_decode_error() {
        for shape in [OutputShape::RawBody, OutputShape::ResponseEnvelope] {
            let resolver = ResponseResolver::new(FixedTransport::new(r#"{"other":1}"#));
            let err = resolver.resolve::<Item>(shape, request()).await.unwrap_err();
            assert!(err.is_decode(), "Expected decode error for {:?}, got {:?}", shape, err);
        }
    }

    #[tokio::test]
    async fn test_envelope_carries_metadata() {
        let resolver = ResponseResolver::new(FixedTransport::new(r#"{"name":"shoe"}"#));
        let envelope = resolver
            .resolve::<Item>(OutputShape::ResponseEnvelope, request())
            .await
            .unwrap()
            .into_envelope()
            .unwrap();
        assert_eq!(envelope.status, 200);
        assert_eq!(envelope.correlation_id.unwrap().as_str(), "req-1");
        assert_eq!(
            envelope.body,
            Item {
                name: "shoe".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_confirm_keeps_empty_body() {
        let resolver = ResponseResolver::new(FixedTransport::new(""));
        let confirmation = resolver.confirm(request()).await.unwrap();
        assert_eq!(confirmation.status, 200);
        assert!(confirmation.body.is_empty());
    }
}
