//! The SDK entry point.
//!
//! [`VisualSearchClient`] wires an [`SdkConfig`] into the header provider,
//! endpoints, transport, resolver and schedulers once, and hands out façades
//! that share them.
//!
//! ```no_run
//! use visual_search_sdk::{MatchOptions, SdkConfig, VisualSearchClient};
//!
//! # async fn run() -> Result<(), visual_search_sdk::SearchError> {
//! let client = VisualSearchClient::new(SdkConfig::new("my-api-key"))?;
//! let image = std::fs::read("shoe.jpg")?;
//! let response = client
//!     .image_matching()
//!     .match_image(image, &MatchOptions::default())
//!     .await?;
//! println!("{} offers", response.offers.len());
//! # Ok(())
//! # }
//! ```

use crate::api::{
    ApiContext, Feedback, ImageMatching, ManualMatching, NotFoundMatching, ObjectProposals,
    Regions, Similarity, TextSearch,
};
use crate::config::SdkConfig;
use crate::endpoints::Endpoints;
use crate::error::SearchError;
use crate::headers::HeaderProvider;
use crate::resolver::ResponseResolver;
use crate::scheduler::Schedulers;
use crate::transport::{HttpTransport, Transport};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct VisualSearchClient {
    context: Arc<ApiContext>,
}

impl VisualSearchClient {
    /// Builds a client talking HTTP to the configured backend.
    ///
    /// Work runs on the current tokio runtime when there is one.
    pub fn new(config: SdkConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let transport = HttpTransport::new(config.timeout())?;
        Self::with_transport(config, Arc::new(transport), Schedulers::current())
    }

    /// Builds a client on a caller-supplied transport and scheduling policy.
    pub fn with_transport(
        config: SdkConfig,
        transport: Arc<dyn Transport>,
        schedulers: Schedulers,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        let endpoints = Endpoints::from_config(&config);
        let headers = HeaderProvider::from_config(&config);
        debug!(
            "Creating visual search client for {} ({})",
            endpoints.base_url(),
            headers.user_agent()
        );

        let context = ApiContext::new(
            endpoints,
            headers,
            ResponseResolver::new(transport),
            schedulers,
            config.output_format,
            config.language,
        );
        Ok(Self {
            context: Arc::new(context),
        })
    }

    pub fn image_matching(&self) -> ImageMatching {
        ImageMatching::new(self.context.clone())
    }

    pub fn text_search(&self) -> TextSearch {
        TextSearch::new(self.context.clone())
    }

    pub fn similarity(&self) -> Similarity {
        Similarity::new(self.context.clone())
    }

    pub fn object_proposals(&self) -> ObjectProposals {
        ObjectProposals::new(self.context.clone())
    }

    pub fn regions(&self) -> Regions {
        Regions::new(self.context.clone())
    }

    pub fn manual_matching(&self) -> ManualMatching {
        ManualMatching::new(self.context.clone())
    }

    pub fn not_found_matching(&self) -> NotFoundMatching {
        NotFoundMatching::new(self.context.clone())
    }

    pub fn feedback(&self) -> Feedback {
        Feedback::new(self.context.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;

    #[test]
    fn test_rejects_invalid_config() {
        let result = VisualSearchClient::with_transport(
            SdkConfig::new(""),
            RecordingTransport::ok(200, "{}"),
            Schedulers::immediate(),
        );
        assert!(matches!(result, Err(SearchError::Config(_))));
    }

    #[tokio::test]
    async fn test_facades_share_config() {
        let transport = RecordingTransport::ok(200, "[]");
        let config = SdkConfig::new("key")
            .with_endpoint("http", "localhost:8080", "v3")
            .with_language("fr");
        let client =
            VisualSearchClient::with_transport(config, transport.clone(), Schedulers::immediate())
                .unwrap();

        client
            .object_proposals()
            .extract_objects(b"jpeg".to_vec())
            .await
            .unwrap();

        let request = transport.last_request();
        assert_eq!(request.url, "http://localhost:8080/find/v3/regions");
        assert_eq!(request.headers.get("X-Api-Key").unwrap(), "key");
    }

    #[test]
    fn test_new_outside_runtime_uses_inline_work() {
        let client = VisualSearchClient::new(SdkConfig::new("key")).unwrap();
        assert!(matches!(
            client.context.schedulers.work,
            crate::scheduler::ExecutionContext::Inline
        ));
    }
}
