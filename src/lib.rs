//! Client SDK for a visual product search backend.
//!
//! Send an image, a fingerprint, a keyword or a SKU and get matching offers
//! back; extract object proposals or detect regions; flag matches and report
//! user feedback. Every operation returns a [`Call`] and can resolve into the
//! decoded body, the raw JSON text or an envelope with HTTP metadata, see
//! [`OutputShape`].

pub mod api;
pub mod client;
pub mod config;
pub mod endpoints;
mod error;
pub mod headers;
pub mod resolver;
pub mod scheduler;
pub mod transport;
pub mod types;

pub use api::{
    Event, EventKind, Feedback, ImageMatching, ManualMatching, MatchOptions, NotFoundMatching,
    ObjectProposals, Regions, Similarity, TextSearch, TextSearchOptions,
};
pub use client::VisualSearchClient;
pub use config::SdkConfig;
pub use error::{BoxError, SearchError};
pub use resolver::{OutputShape, Resolved};
pub use scheduler::{CancelHandle, Call, ExecutionContext, Schedulers};
pub use types::{
    Confirmation, CorrelationId, JsonResponseBody, ObjectList, ObjectProposal, Offer,
    OfferResponse, Region, ResponseEnvelope,
};

#[cfg(test)]
pub(crate) mod testing;
