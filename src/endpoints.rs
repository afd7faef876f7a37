//! Endpoint URLs for every operation.
//!
//! URLs are composed from scheme, host and API version. Dynamic segments
//! (SKUs, request ids) are percent-encoded.

use crate::config::SdkConfig;

/// Region detection is only served by this API version.
const REGIONS_API_VERSION: &str = "v2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    scheme: String,
    host: String,
    api_version: String,
}

impl Endpoints {
    pub fn new(
        scheme: impl Into<String>,
        host: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into().trim_end_matches('/').to_string(),
            api_version: api_version.into(),
        }
    }

    pub fn from_config(config: &SdkConfig) -> Self {
        Self::new(&config.scheme, &config.host, &config.api_version)
    }

    /// `scheme://host`
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    fn build(&self, segments: &[&str]) -> String {
        let mut url = self.base_url();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    pub fn image_matching_url(&self) -> String {
        self.build(&["find", &self.api_version])
    }

    pub fn fingerprint_matching_url(&self) -> String {
        self.build(&["find", &self.api_version, "fingerprint", "semantic"])
    }

    pub fn object_proposal_url(&self) -> String {
        self.build(&["find", &self.api_version, "regions"])
    }

    pub fn regions_url(&self) -> String {
        self.build(&["find", REGIONS_API_VERSION, "regions"])
    }

    pub fn text_search_url(&self) -> String {
        self.build(&["find", &self.api_version, "text"])
    }

    pub fn manual_matching_url(&self, request_id: &str) -> String {
        self.build(&["find", &self.api_version, "manual", request_id])
    }

    /// The backend serves not-found flags on the manual matching route.
    pub fn not_found_matching_url(&self, request_id: &str) -> String {
        self.manual_matching_url(request_id)
    }

    pub fn similarity_url(&self, sku: &str) -> String {
        self.build(&["recommend", &self.api_version, sku])
    }

    pub fn feedback_url(&self) -> String {
        self.build(&["feedback", &self.api_version])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Endpoints {
        Endpoints::new("https", "api.example.com", "v1")
    }

    #[test]
    fn test_operation_urls() {
        let e = endpoints();
        assert_eq!(e.image_matching_url(), "https://api.example.com/find/v1");
        assert_eq!(
            e.fingerprint_matching_url(),
            "https://api.example.com/find/v1/fingerprint/semantic"
        );
        assert_eq!(
            e.object_proposal_url(),
            "https://api.example.com/find/v1/regions"
        );
        assert_eq!(e.regions_url(), "https://api.example.com/find/v2/regions");
        assert_eq!(e.text_search_url(), "https://api.example.com/find/v1/text");
        assert_eq!(
            e.manual_matching_url("req-1"),
            "https://api.example.com/find/v1/manual/req-1"
        );
        assert_eq!(
            e.not_found_matching_url("req-1"),
            "https://api.example.com/find/v1/manual/req-1"
        );
        assert_eq!(
            e.similarity_url("SKU-42"),
            "https://api.example.com/recommend/v1/SKU-42"
        );
        assert_eq!(e.feedback_url(), "https://api.example.com/feedback/v1");
    }

    #[test]
    fn test_dynamic_segments_are_encoded() {
        let e = endpoints();
        assert_eq!(
            e.similarity_url("a b/c"),
            "https://api.example.com/recommend/v1/a%20b%2Fc"
        );
    }

    #[test]
    fn test_trailing_slash_in_host_is_dropped() {
        let e = Endpoints::new("http", "127.0.0.1:1234/", "v1");
        assert_eq!(e.base_url(), "http://127.0.0.1:1234");
    }
}
