//! Region detection.

use super::{ApiBase, ApiContext};
use crate::error::SearchError;
use crate::headers::Metadata;
use crate::scheduler::Call;
use crate::transport::{Payload, RequestContext};
use crate::types::ObjectList;
use std::sync::Arc;
use tracing::debug;

/// Region detection façade. Always talks to the v2 regions endpoint.
#[derive(Debug, Clone)]
pub struct Regions {
    base: ApiBase,
}

impl Regions {
    pub fn new(context: Arc<ApiContext>) -> Self {
        Self {
            base: ApiBase::new(context),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.base = self.base.with_header(name, value);
        self
    }

    pub fn detect(&self, image: impl Into<Vec<u8>>) -> Call<ObjectList> {
        let request = self.request(Payload::jpeg(image));
        self.base.resolve_body(request)
    }

    fn request(&self, payload: Payload) -> Result<RequestContext, SearchError> {
        if payload.is_empty() {
            return Err(SearchError::InvalidInput("Image must not be empty".to_string()));
        }
        debug!("Detecting regions in image of {} bytes", payload.len());
        Ok(RequestContext::post(
            self.base.endpoints().regions_url(),
            self.base.metadata(Metadata::new()),
            Some(payload),
        ))
    }
}
