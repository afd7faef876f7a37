//! Flags a prior match for manual review.

use super::{ApiBase, ApiContext};
use crate::headers::Metadata;
use crate::scheduler::Call;
use crate::transport::RequestContext;
use crate::types::{Confirmation, CorrelationId};
use std::sync::Arc;
use tracing::debug;

/// Manual matching façade.
#[derive(Debug, Clone)]
pub struct ManualMatching {
    base: ApiBase,
}

impl ManualMatching {
    pub fn new(context: Arc<ApiContext>) -> Self {
        Self {
            base: ApiBase::new(context),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.base = self.base.with_header(name, value);
        self
    }

    /// Asks the backend to have a human look at the match `request_id`.
    pub fn mark_for_manual_match(&self, request_id: &CorrelationId) -> Call<Confirmation> {
        debug!("Marking request {} for manual matching", request_id);
        let request = RequestContext::post(
            self.base.endpoints().manual_matching_url(request_id.as_str()),
            self.base.metadata(Metadata::new()),
            None,
        );
        self.base.confirm(Ok(request))
    }
}
