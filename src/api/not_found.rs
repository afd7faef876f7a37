//! Reports that a prior match found nothing useful.

use super::{ApiBase, ApiContext};
use crate::headers::Metadata;
use crate::scheduler::Call;
use crate::transport::RequestContext;
use crate::types::{Confirmation, CorrelationId};
use std::sync::Arc;
use tracing::debug;

/// Not-found matching façade.
#[derive(Debug, Clone)]
pub struct NotFoundMatching {
    base: ApiBase,
}

impl NotFoundMatching {
    pub fn new(context: Arc<ApiContext>) -> Self {
        Self {
            base: ApiBase::new(context),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.base = self.base.with_header(name, value);
        self
    }

    pub fn mark_as_not_found(&self, request_id: &CorrelationId) -> Call<Confirmation> {
        debug!("Marking request {} as not found", request_id);
        let request = RequestContext::post(
            self.base
                .endpoints()
                .not_found_matching_url(request_id.as_str()),
            self.base.metadata(Metadata::new()),
            None,
        );
        self.base.confirm(Ok(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::testing::{context_with, RecordingTransport};

    #[tokio::test]
    async fn test_mark_as_not_found() {
        let transport = RecordingTransport::ok(200, "");
        let api = NotFoundMatching::new(context_with(transport.clone()));
        let id = CorrelationId::new("req 2").unwrap();

        let confirmation = api.mark_as_not_found(&id).await.unwrap();
        assert!(confirmation.body.is_empty());
        assert_eq!(
            transport.last_request().url,
            "https://api.example.com/find/v1/manual/req%202"
        );
    }

    #[tokio::test]
    async fn test_mark_as_not_found_forbidden() {
        let transport = RecordingTransport::status(403, "");
        let api = NotFoundMatching::new(context_with(transport));
        let id = CorrelationId::new("req-2").unwrap();

        match api.mark_as_not_found(&id).await {
            Err(SearchError::Http { status_code, .. }) => assert_eq!(status_code, 403),
            other => panic!("Expected Http error, got {:?}", other),
        }
    }
}
