//! Text search: offers for a keyword.

use super::{
    check_limit, check_threshold, format_float, ApiBase, ApiContext, ACCEPT_HEADER,
    ACCEPT_LANGUAGE_HEADER, DEFAULT_LIMIT, X_OPTIONS_HEADER,
};
use crate::error::SearchError;
use crate::headers::Metadata;
use crate::resolver::{OutputShape, Resolved};
use crate::scheduler::Call;
use crate::transport::{Payload, RequestContext};
use crate::types::OfferResponse;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct TextSearchOptions {
    pub regroup: bool,
    pub regroup_threshold: Option<f32>,
    pub limit: u32,
}

impl Default for TextSearchOptions {
    fn default() -> Self {
        Self {
            regroup: false,
            regroup_threshold: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl TextSearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regroup(mut self, enabled: bool) -> Self {
        self.regroup = enabled;
        self
    }

    pub fn regroup_threshold(mut self, threshold: f32) -> Self {
        self.regroup_threshold = Some(threshold);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        check_limit("limit", self.limit)?;
        if let Some(threshold) = self.regroup_threshold {
            check_threshold("regroup threshold", threshold)?;
        }
        Ok(())
    }

    /// The `X-Options` header value; empty when every option is at its default.
    pub fn x_options(&self) -> String {
        let mut options = String::new();
        if self.regroup {
            options.push_str("regroup");
            if let Some(threshold) = self.regroup_threshold {
                options.push_str(&format!(" regroup.threshold={}", format_float(threshold)));
            }
        }
        if self.limit != DEFAULT_LIMIT {
            options.push_str(&format!(" limit={}", self.limit));
        }
        options.trim_start().to_string()
    }
}

/// Text search façade.
#[derive(Debug, Clone)]
pub struct TextSearch {
    base: ApiBase,
}

impl TextSearch {
    pub fn new(context: Arc<ApiContext>) -> Self {
        Self {
            base: ApiBase::new(context),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.base = self.base.with_header(name, value);
        self
    }

    pub fn search_offers(&self, keyword: &str, options: &TextSearchOptions) -> Call<OfferResponse> {
        let request = self.request(keyword, options);
        self.base.resolve_body(request)
    }

    pub fn search_offers_as(
        &self,
        keyword: &str,
        options: &TextSearchOptions,
        shape: OutputShape,
    ) -> Call<Resolved<OfferResponse>> {
        let request = self.request(keyword, options);
        self.base.resolve_offers(shape, request)
    }

    fn request(
        &self,
        keyword: &str,
        options: &TextSearchOptions,
    ) -> Result<RequestContext, SearchError> {
        options.validate()?;
        if keyword.trim().is_empty() {
            return Err(SearchError::InvalidInput(
                "Keyword must not be empty".to_string(),
            ));
        }
        debug!("Searching offers for keyword: {}", keyword);

        let mut headers = Metadata::new();
        headers.insert(ACCEPT_HEADER.to_string(), self.base.output_format().to_string());
        headers.insert(
            ACCEPT_LANGUAGE_HEADER.to_string(),
            self.base.language().to_string(),
        );
        let x_options = options.x_options();
        if !x_options.is_empty() {
            headers.insert(X_OPTIONS_HEADER.to_string(), x_options);
        }

        Ok(RequestContext::post(
            self.base.endpoints().text_search_url(),
            self.base.metadata(headers),
            Some(Payload::text(keyword)),
        ))
    }
}
