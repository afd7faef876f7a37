//! Similar offers for a known SKU.

use super::{ApiBase, ApiContext, ACCEPT_HEADER, ACCEPT_LANGUAGE_HEADER};
use crate::error::SearchError;
use crate::headers::Metadata;
use crate::resolver::{OutputShape, Resolved};
use crate::scheduler::Call;
use crate::transport::RequestContext;
use crate::types::OfferResponse;
use std::sync::Arc;
use tracing::debug;

/// Similarity façade.
#[derive(Debug, Clone)]
pub struct Similarity {
    base: ApiBase,
}

impl Similarity {
    pub fn new(context: Arc<ApiContext>) -> Self {
        Self {
            base: ApiBase::new(context),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.base = self.base.with_header(name, value);
        self
    }

    pub fn by_sku(&self, sku: &str) -> Call<OfferResponse> {
        let request = self.request(sku);
        self.base.resolve_body(request)
    }

    pub fn by_sku_as(&self, sku: &str, shape: OutputShape) -> Call<Resolved<OfferResponse>> {
        let request = self.request(sku);
        self.base.resolve_offers(shape, request)
    }

    fn request(&self, sku: &str) -> Result<RequestContext, SearchError> {
        if sku.trim().is_empty() {
            return Err(SearchError::InvalidInput("SKU must not be empty".to_string()));
        }
        debug!("Looking up offers similar to SKU: {}", sku);

        let mut headers = Metadata::new();
        headers.insert(
            ACCEPT_HEADER.to_string(),
            format!("{}; charset=UTF-8", self.base.output_format()),
        );
        headers.insert(
            ACCEPT_LANGUAGE_HEADER.to_string(),
            self.base.language().to_string(),
        );
        Ok(RequestContext::get(
            self.base.endpoints().similarity_url(sku),
            self.base.metadata(headers),
        ))
    }
}
