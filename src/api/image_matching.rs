//! Image matching: find offers that look like a picture or a fingerprint.

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
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Matching stages and result tuning, rendered into the `X-Options` header.
///
/// The defaults enable the exact, similarity and OCR stages and let the
/// backend pick its default result count.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOptions {
    pub exact: bool,
    pub similarity: bool,
    pub similarity_limit: Option<u32>,
    pub similarity_threshold: Option<f32>,
    pub ocr: bool,
    pub limit: u32,
    pub regroup: bool,
    pub regroup_threshold: Option<f32>,
    pub recommendations: bool,
    pub category_prediction: bool,
    pub category_prediction_limit: Option<u32>,
    pub category_prediction_threshold: Option<f32>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            exact: true,
            similarity: true,
            similarity_limit: None,
            similarity_threshold: None,
            ocr: true,
            limit: DEFAULT_LIMIT,
            regroup: false,
            regroup_threshold: None,
            recommendations: false,
            category_prediction: false,
            category_prediction_limit: None,
            category_prediction_threshold: None,
        }
    }
}

impl MatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exact(mut self, enabled: bool) -> Self {
        self.exact = enabled;
        self
    }

    pub fn similarity(mut self, enabled: bool) -> Self {
        self.similarity = enabled;
        self
    }

    pub fn similarity_limit(mut self, limit: u32) -> Self {
        self.similarity_limit = Some(limit);
        self
    }

    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = Some(threshold);
        self
    }

    pub fn ocr(mut self, enabled: bool) -> Self {
        self.ocr = enabled;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn regroup(mut self, enabled: bool) -> Self {
        self.regroup = enabled;
        self
    }

    pub fn regroup_threshold(mut self, threshold: f32) -> Self {
        self.regroup_threshold = Some(threshold);
        self
    }

    pub fn recommendations(mut self, enabled: bool) -> Self {
        self.recommendations = enabled;
        self
    }

    pub fn category_prediction(mut self, enabled: bool) -> Self {
        self.category_prediction = enabled;
        self
    }

    pub fn category_prediction_limit(mut self, limit: u32) -> Self {
        self.category_prediction_limit = Some(limit);
        self
    }

    pub fn category_prediction_threshold(mut self, threshold: f32) -> Self {
        self.category_prediction_threshold = Some(threshold);
        self
    }

    fn any_stage(&self) -> bool {
        self.exact || self.similarity || self.ocr
    }

    /// Rejects option combinations the backend cannot serve.
    pub fn validate(&self) -> Result<(), SearchError> {
        check_limit("limit", self.limit)?;
        if let Some(limit) = self.similarity_limit {
            check_limit("similarity limit", limit)?;
        }
        if let Some(threshold) = self.similarity_threshold {
            check_threshold("similarity threshold", threshold)?;
        }
        if let Some(threshold) = self.regroup_threshold {
            check_threshold("regroup threshold", threshold)?;
        }
        if let Some(limit) = self.category_prediction_limit {
            check_limit("category prediction limit", limit)?;
        }
        if let Some(threshold) = self.category_prediction_threshold {
            check_threshold("category prediction threshold", threshold)?;
        }

        let dependent = [
            (self.recommendations, "recommendation"),
            (self.regroup, "regrouping"),
            (self.category_prediction, "category prediction"),
        ];
        for (enabled, feature) in dependent {
            if enabled && !self.any_stage() {
                return Err(SearchError::InvalidInput(format!(
                    "To use the {feature} feature, enable one of these stages: exact, similarity, ocr"
                )));
            }
        }
        Ok(())
    }

    /// The `X-Options` header value.
    ///
    /// The first enabled stage is written bare, later ones with a `+` prefix.
    /// Stage parameters are only written for enabled stages, and the limit
    /// only when it differs from the backend default.
    pub fn x_options(&self) -> String {
        let mut stages: Vec<&str> = Vec::new();
        if self.exact {
            stages.push("exact");
        }
        if self.similarity {
            stages.push("similarity");
        }
        if self.ocr {
            stages.push("ocr");
        }
        let mut options = stages.join(" +");

        if self.similarity {
            if let Some(limit) = self.similarity_limit {
                options.push_str(&format!(" similarity.limit={limit}"));
            }
            if let Some(threshold) = self.similarity_threshold {
                options.push_str(&format!(" similarity.threshold={}", format_float(threshold)));
            }
        }
        if self.regroup {
            options.push_str(" +regroup");
            if let Some(threshold) = self.regroup_threshold {
                options.push_str(&format!(" regroup.threshold={}", format_float(threshold)));
            }
        }
        if self.limit != DEFAULT_LIMIT {
            options.push_str(&format!(" limit={}", self.limit));
        }
        if self.recommendations {
            options.push_str(" +recommendations");
        }
        if self.category_prediction {
            options.push_str(" +categoryPrediction");
            if let Some(limit) = self.category_prediction_limit {
                options.push_str(&format!(" categoryPrediction.limit={limit}"));
            }
            if let Some(threshold) = self.category_prediction_threshold {
                options.push_str(&format!(
                    " categoryPrediction.threshold={}",
                    format_float(threshold)
                ));
            }
        }
        options
    }
}

#[derive(Serialize)]
struct FingerprintBody {
    b64: String,
}

/// Encodes a fingerprint as base64 over its little-endian `f32` bytes.
pub fn encode_fingerprint(fingerprint: &[f32]) -> String {
    let bytes: Vec<u8> = fingerprint
        .iter()
        .flat_map(|value| value.to_le_bytes())
        .collect();
    STANDARD.encode(bytes)
}

/// Image matching façade.
#[derive(Debug, Clone)]
pub struct ImageMatching {
    base: ApiBase,
}

impl ImageMatching {
    pub fn new(context: Arc<ApiContext>) -> Self {
        Self {
            base: ApiBase::new(context),
        }
    }

    /// Adds a header to every request made through this handle.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.base = self.base.with_header(name, value);
        self
    }

    /// Matches a JPEG image and returns the offers.
    pub fn match_image(
        &self,
        image: impl Into<Vec<u8>>,
        options: &MatchOptions,
    ) -> Call<OfferResponse> {
        let request = self.image_request(Payload::jpeg(image), options);
        self.base.resolve_body(request)
    }

    pub fn match_image_as(
        &self,
        image: impl Into<Vec<u8>>,
        options: &MatchOptions,
        shape: OutputShape,
    ) -> Call<Resolved<OfferResponse>> {
        let request = self.image_request(Payload::jpeg(image), options);
        self.base.resolve_offers(shape, request)
    }

    /// Matches an image file; the content type is guessed from its extension.
    pub fn match_file<P: AsRef<Path>>(
        &self,
        path: P,
        options: &MatchOptions,
        shape: OutputShape,
    ) -> Call<Resolved<OfferResponse>> {
        let request =
            Payload::from_file(path).and_then(|payload| self.image_request(payload, options));
        self.base.resolve_offers(shape, request)
    }

    /// Matches a semantic fingerprint computed on the device.
    pub fn match_fingerprint(
        &self,
        fingerprint: &[f32],
        options: &MatchOptions,
    ) -> Call<OfferResponse> {
        let request = self.fingerprint_request(fingerprint, options);
        self.base.resolve_body(request)
    }

    pub fn match_fingerprint_as(
        &self,
        fingerprint: &[f32],
        options: &MatchOptions,
        shape: OutputShape,
    ) -> Call<Resolved<OfferResponse>> {
        let request = self.fingerprint_request(fingerprint, options);
        self.base.resolve_offers(shape, request)
    }

    fn headers(&self, options: &MatchOptions) -> Metadata {
        let mut headers = Metadata::new();
        headers.insert(ACCEPT_HEADER.to_string(), self.base.output_format().to_string());
        headers.insert(
            ACCEPT_LANGUAGE_HEADER.to_string(),
            self.base.language().to_string(),
        );
        headers.insert(X_OPTIONS_HEADER.to_string(), options.x_options());
        self.base.metadata(headers)
    }

    fn image_request(
        &self,
        payload: Payload,
        options: &MatchOptions,
    ) -> Result<RequestContext, SearchError> {
        options.validate()?;
        if payload.is_empty() {
            return Err(SearchError::InvalidInput("Image must not be empty".to_string()));
        }
        debug!(
            "Matching image of {} bytes ({})",
            payload.len(),
            payload.content_type
        );
        Ok(RequestContext::post(
            self.base.endpoints().image_matching_url(),
            self.headers(options),
            Some(payload),
        ))
    }

    fn fingerprint_request(
        &self,
        fingerprint: &[f32],
        options: &MatchOptions,
    ) -> Result<RequestContext, SearchError> {
        options.validate()?;
        if fingerprint.is_empty() {
            return Err(SearchError::InvalidInput(
                "Fingerprint must not be empty".to_string(),
            ));
        }
        debug!("Matching fingerprint of {} values", fingerprint.len());
        let body = serde_json::to_string(&FingerprintBody {
            b64: encode_fingerprint(fingerprint),
        })?;
        Ok(RequestContext::post(
            self.base.endpoints().fingerprint_matching_url(),
            self.headers(options),
            Some(Payload::json(body)),
        ))
    }
}
