//! Object proposal extraction: where the products are in an image.

use super::{ApiBase, ApiContext};
use crate::error::SearchError;
use crate::headers::Metadata;
use crate::scheduler::Call;
use crate::transport::{Payload, RequestContext};
use crate::types::ObjectProposal;
use std::sync::Arc;
use tracing::debug;

/// Object proposal façade.
#[derive(Debug, Clone)]
pub struct ObjectProposals {
    base: ApiBase,
}

impl ObjectProposals {
    pub fn new(context: Arc<ApiContext>) -> Self {
        Self {
            base: ApiBase::new(context),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.base = self.base.with_header(name, value);
        self
    }

    /// Returns the detected objects in backend order.
    pub fn extract_objects(&self, image: impl Into<Vec<u8>>) -> Call<Vec<ObjectProposal>> {
        let request = self.request(Payload::jpeg(image));
        self.base.resolve_body(request)
    }

    fn request(&self, payload: Payload) -> Result<RequestContext, SearchError> {
        if payload.is_empty() {
            return Err(SearchError::InvalidInput("Image must not be empty".to_string()));
        }
        debug!("Extracting objects from image of {} bytes", payload.len());
        Ok(RequestContext::post(
            self.base.endpoints().object_proposal_url(),
            self.base.metadata(Metadata::new()),
            Some(payload),
        ))
    }
}
