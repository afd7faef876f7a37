//! Operation façades.
//!
//! Each façade is a cheap handle onto the shared [`ApiContext`]: cloning one
//! clones an `Arc` and the façade's own header overrides. Every operation
//! builds a [`RequestContext`](crate::transport::RequestContext), hands it to
//! the resolver on the work context and returns a [`Call`].
//!
//! Input validation happens inside the call, so a rejected request fails
//! through the same channel as a failed network call, and before any
//! transport method is invoked.

use crate::endpoints::Endpoints;
use crate::error::SearchError;
use crate::headers::{insert_header, HeaderProvider, Metadata};
use crate::resolver::{OutputShape, Resolved, ResponseResolver};
use crate::scheduler::{Call, Schedulers};
use crate::transport::RequestContext;
use crate::types::{Confirmation, CorrelationId, OfferResponse};
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub mod feedback;
pub mod image_matching;
pub mod manual_matching;
pub mod not_found;
pub mod object_proposal;
pub mod regions;
pub mod similarity;
pub mod text_search;

pub use feedback::{Event, EventKind, Feedback};
pub use image_matching::{ImageMatching, MatchOptions};
pub use manual_matching::ManualMatching;
pub use not_found::NotFoundMatching;
pub use object_proposal::ObjectProposals;
pub use regions::Regions;
pub use similarity::Similarity;
pub use text_search::{TextSearch, TextSearchOptions};

pub const ACCEPT_HEADER: &str = "Accept";
pub const ACCEPT_LANGUAGE_HEADER: &str = "Accept-Language";
pub const X_OPTIONS_HEADER: &str = "X-Options";

/// Result count the backend uses when no limit is sent.
pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// Everything the façades share. Immutable once built.
#[derive(Debug)]
pub struct ApiContext {
    pub(crate) endpoints: Endpoints,
    pub(crate) headers: HeaderProvider,
    pub(crate) resolver: ResponseResolver,
    pub(crate) schedulers: Schedulers,
    pub(crate) output_format: String,
    pub(crate) language: String,
}

impl ApiContext {
    pub fn new(
        endpoints: Endpoints,
        headers: HeaderProvider,
        resolver: ResponseResolver,
        schedulers: Schedulers,
        output_format: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            endpoints,
            headers,
            resolver,
            schedulers,
            output_format: output_format.into(),
            language: language.into(),
        }
    }
}

/// The part every façade has in common: the shared context plus per-façade
/// header overrides.
#[derive(Debug, Clone)]
pub(crate) struct ApiBase {
    context: Arc<ApiContext>,
    overrides: Metadata,
}

impl ApiBase {
    pub(crate) fn new(context: Arc<ApiContext>) -> Self {
        Self {
            context,
            overrides: Metadata::new(),
        }
    }

    pub(crate) fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert_header(&mut self.overrides, name, value);
        self
    }

    pub(crate) fn endpoints(&self) -> &Endpoints {
        &self.context.endpoints
    }

    pub(crate) fn output_format(&self) -> &str {
        &self.context.output_format
    }

    pub(crate) fn language(&self) -> &str {
        &self.context.language
    }

    /// Provider defaults, then `operation` headers, then the overrides.
    pub(crate) fn metadata(&self, operation: Metadata) -> Metadata {
        let mut headers = self.context.headers.merged(&operation);
        for (name, value) in &self.overrides {
            insert_header(&mut headers, name.clone(), value.clone());
        }
        headers
    }

    /// Runs a shape-parameterized offer request.
    ///
    /// Envelopes without a correlation header fall back to the request id in
    /// the body.
    pub(crate) fn resolve_offers(
        &self,
        shape: OutputShape,
        request: Result<RequestContext, SearchError>,
    ) -> Call<Resolved<OfferResponse>> {
        let resolver = self.context.resolver.clone();
        self.context.schedulers.run(async move {
            let resolved = resolver.resolve::<OfferResponse>(shape, request?).await?;
            Ok(with_body_request_id(resolved))
        })
    }

    /// Runs a request whose body decodes into `T`.
    pub(crate) fn resolve_body<T>(&self, request: Result<RequestContext, SearchError>) -> Call<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let resolver = self.context.resolver.clone();
        self.context
            .schedulers
            .run(async move { resolver.resolve_body(request?).await })
    }

    /// Runs a request whose body is only an acknowledgement.
    pub(crate) fn confirm(&self, request: Result<RequestContext, SearchError>) -> Call<Confirmation> {
        let resolver = self.context.resolver.clone();
        self.context
            .schedulers
            .run(async move { resolver.confirm(request?).await })
    }
}

fn with_body_request_id(resolved: Resolved<OfferResponse>) -> Resolved<OfferResponse> {
    match resolved {
        Resolved::Envelope(mut envelope) if envelope.correlation_id.is_none() => {
            envelope.correlation_id = envelope
                .body
                .request_id
                .clone()
                .and_then(CorrelationId::new);
            Resolved::Envelope(envelope)
        }
        other => other,
    }
}

pub(crate) fn check_limit(name: &str, limit: u32) -> Result<(), SearchError> {
    if limit == 0 || limit > MAX_LIMIT {
        return Err(SearchError::InvalidInput(format!(
            "{name} must be between 1 and {MAX_LIMIT}, got {limit}"
        )));
    }
    Ok(())
}

pub(crate) fn check_threshold(name: &str, threshold: f32) -> Result<(), SearchError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(SearchError::InvalidInput(format!(
            "{name} must be between 0.0 and 1.0, got {threshold}"
        )));
    }
    Ok(())
}

/// Renders a float the way the backend expects it in `X-Options` (`0.5`, `1.0`).
pub(crate) fn format_float(value: f32) -> String {
    format!("{value:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context_with, RecordingTransport};
    use crate::types::ResponseEnvelope;
    use std::collections::BTreeMap;

    #[test]
    fn test_limits_and_thresholds() {
        assert!(check_limit("limit", 1).is_ok());
        assert!(check_limit("limit", 100).is_ok());
        assert!(matches!(
            check_limit("limit", 0),
            Err(SearchError::InvalidInput(_))
        ));
        assert!(check_limit("limit", 101).is_err());

        assert!(check_threshold("threshold", 0.0).is_ok());
        assert!(check_threshold("threshold", 1.0).is_ok());
        assert!(check_threshold("threshold", 1.5).is_err());
        assert!(check_threshold("threshold", f32::NAN).is_err());
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(0.5), "0.5");
        assert_eq!(format_float(1.0), "1.0");
    }

    #[test]
    fn test_overrides_win_over_operation_headers() {
        let base = ApiBase::new(context_with(RecordingTransport::ok(200, "{}")))
            .with_header(ACCEPT_HEADER, "application/json");

        let mut operation = Metadata::new();
        operation.insert(ACCEPT_HEADER.to_string(), "application/offers+json".to_string());
        operation.insert(X_OPTIONS_HEADER.to_string(), "exact".to_string());

        let headers = base.metadata(operation);
        assert_eq!(headers.get(ACCEPT_HEADER).unwrap(), "application/json");
        assert_eq!(headers.get(X_OPTIONS_HEADER).unwrap(), "exact");
        assert!(headers.contains_key(crate::headers::API_KEY_HEADER));
    }

    #[test]
    fn test_body_request_id_fills_missing_correlation_id() {
        let envelope = ResponseEnvelope {
            status: 200,
            headers: BTreeMap::new(),
            correlation_id: None,
            body: OfferResponse {
                request_id: Some("body-id".to_string()),
                ..OfferResponse::default()
            },
        };
        let resolved = with_body_request_id(Resolved::Envelope(envelope));
        let envelope = resolved.into_envelope().unwrap();
        assert_eq!(envelope.correlation_id.unwrap().as_str(), "body-id");
    }

    #[test]
    fn test_header_correlation_id_is_kept() {
        let envelope = ResponseEnvelope {
            status: 200,
            headers: BTreeMap::new(),
            correlation_id: CorrelationId::new("header-id"),
            body: OfferResponse {
                request_id: Some("body-id".to_string()),
                ..OfferResponse::default()
            },
        };
        let envelope = with_body_request_id(Resolved::Envelope(envelope))
            .into_envelope()
            .unwrap();
        assert_eq!(envelope.correlation_id.unwrap().as_str(), "header-id");
    }
}
