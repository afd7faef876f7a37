use super::{Method, RequestContext, Transport, TransportBody, TransportEnvelope};
use crate::error::SearchError;
use crate::headers::Metadata;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error};

/// [`Transport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

/// Status, headers and body of a response that passed the status check.
struct RawResponse {
    status: u16,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Uses an existing client, e.g. one shared with the rest of the application.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn header_map(metadata: &Metadata) -> Result<HeaderMap, SearchError> {
        let mut headers = HeaderMap::new();
        for (name, value) in metadata {
            let name = HeaderName::from_bytes(name.as_bytes())?;
            headers.insert(name, HeaderValue::from_str(value)?);
        }
        Ok(headers)
    }

    async fn execute(&self, request: &RequestContext) -> Result<RawResponse, SearchError> {
        let mut headers = Self::header_map(&request.headers)?;

        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        let builder = match &request.payload {
            Some(payload) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_str(&payload.content_type)?);
                builder.body(payload.bytes.clone())
            }
            None => builder,
        };

        debug!("Sending {:?} request to: {}", request.method, request.url);
        let response = builder.headers(headers).send().await?;

        let status = response.status();
        debug!("Response status: {}", status);
        let response_headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            error!("Request failed: {}", body);
            return Err(SearchError::Http {
                status_code: status.as_u16(),
                body,
            });
        }

        Ok(RawResponse {
            status: status.as_u16(),
            headers: response_headers,
            body,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, request: &RequestContext) -> Result<TransportBody, SearchError> {
        let response = self.execute(request).await?;
        Ok(TransportBody {
            status: response.status,
            body: response.body,
        })
    }

    async fn call_with_envelope(
        &self,
        request: &RequestContext,
    ) -> Result<TransportEnvelope, SearchError> {
        let response = self.execute(request).await?;
        let mut headers = BTreeMap::new();
        for (name, value) in response.headers.iter() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_string(), value.to_string());
            }
        }
        Ok(TransportEnvelope::from_parts(
            response.status,
            headers,
            response.body,
        ))
    }
}
