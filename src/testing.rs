//! In-memory transport and context builders for unit tests.

use crate::api::ApiContext;
use crate::endpoints::Endpoints;
use crate::error::SearchError;
use crate::headers::HeaderProvider;
use crate::resolver::ResponseResolver;
use crate::scheduler::Schedulers;
use crate::transport::{
    RequestContext, Transport, TransportBody, TransportEnvelope, CORRELATION_ID_HEADER,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub(crate) const TEST_API_KEY: &str = "test_key";

/// What a [`RecordingTransport`] answers with.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Ok {
        status: u16,
        correlation_id: Option<String>,
        body: String,
    },
    Status {
        status: u16,
        body: String,
    },
    Io(io::ErrorKind),
}

/// A [`Transport`] that answers every call with a fixed [`Reply`] and records
/// what it was asked.
#[derive(Debug)]
pub(crate) struct RecordingTransport {
    reply: Reply,
    calls: AtomicUsize,
    envelope_calls: AtomicUsize,
    requests: Mutex<Vec<RequestContext>>,
}

impl RecordingTransport {
    pub(crate) fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            envelope_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn ok(status: u16, body: &str) -> Arc<Self> {
        Self::new(Reply::Ok {
            status,
            correlation_id: None,
            body: body.to_string(),
        })
    }

    pub(crate) fn ok_with_correlation(body: &str, correlation_id: &str) -> Arc<Self> {
        Self::new(Reply::Ok {
            status: 200,
            correlation_id: Some(correlation_id.to_string()),
            body: body.to_string(),
        })
    }

    pub(crate) fn status(status: u16, body: &str) -> Arc<Self> {
        Self::new(Reply::Status {
            status,
            body: body.to_string(),
        })
    }

    pub(crate) fn io(kind: io::ErrorKind) -> Arc<Self> {
        Self::new(Reply::Io(kind))
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn envelope_calls(&self) -> usize {
        self.envelope_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls() + self.envelope_calls()
    }

    pub(crate) fn requests(&self) -> Vec<RequestContext> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> RequestContext {
        self.requests()
            .pop()
            .expect("transport was never called")
    }

    fn answer(&self, request: &RequestContext) -> Result<TransportEnvelope, SearchError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Ok {
                status,
                correlation_id,
                body,
            } => {
                let mut headers = BTreeMap::new();
                if let Some(id) = correlation_id {
                    headers.insert(CORRELATION_ID_HEADER.to_string(), id.clone());
                }
                Ok(TransportEnvelope::from_parts(
                    *status,
                    headers,
                    body.as_bytes().to_vec(),
                ))
            }
            Reply::Status { status, body } => Err(SearchError::Http {
                status_code: *status,
                body: body.clone(),
            }),
            Reply::Io(kind) => Err(SearchError::connection(io::Error::new(
                *kind,
                "simulated network failure",
            ))),
        }
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn call(&self, request: &RequestContext) -> Result<TransportBody, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let envelope = self.answer(request)?;
        Ok(TransportBody {
            status: envelope.status,
            body: envelope.body,
        })
    }

    async fn call_with_envelope(
        &self,
        request: &RequestContext,
    ) -> Result<TransportEnvelope, SearchError> {
        self.envelope_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(request)
    }
}

/// A context on `https://api.example.com/.../v1` with inline scheduling.
pub(crate) fn context_with(transport: Arc<dyn Transport>) -> Arc<ApiContext> {
    Arc::new(ApiContext::new(
        Endpoints::new("https", "api.example.com", "v1"),
        HeaderProvider::new(TEST_API_KEY, "visual-search-sdk", "0.1.0", "abc123", Some("linux")),
        ResponseResolver::new(transport),
        Schedulers::immediate(),
        "application/offers.complete+json",
        "de",
    ))
}

/// A backend body with `count` offers.
pub(crate) fn offers_json(count: usize) -> String {
    let offers: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{"oid":"offer-{i}","title":"Offer {i}","sku":"SKU-{i}","score":{}}}"#,
                1.0 - i as f32 / 100.0
            )
        })
        .collect();
    format!(
        r#"{{"id":"req-body","session":"sess-1","results":[{}]}}"#,
        offers.join(",")
    )
}
