//! Feedback events about a prior match.
//!
//! Events tell the backend how the user reacted to a result list: which
//! offers were clicked or bought, whether the match was useful, and which part
//! of the image the user cared about. Every event refers to the match through
//! its [`CorrelationId`] and to the user session through a session id.

use super::{check_threshold, ApiBase, ApiContext};
use crate::error::SearchError;
use crate::headers::Metadata;
use crate::scheduler::Call;
use crate::transport::{Payload, RequestContext};
use crate::types::{Confirmation, CorrelationId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// What happened.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// The user opened offers from the result list.
    Click {
        positions: Vec<u32>,
        product_ids: Vec<String>,
    },
    /// The user bought offers from the result list.
    Conversion {
        positions: Vec<u32>,
        product_ids: Vec<String>,
    },
    /// The user rated the match.
    Feedback {
        success: bool,
        comment: Option<String>,
    },
    /// The user selected a region of the image, in relative coordinates.
    Region {
        left: f32,
        top: f32,
        width: f32,
        height: f32,
    },
}

impl EventKind {
    fn name(&self) -> &'static str {
        match self {
            EventKind::Click { .. } => "click",
            EventKind::Conversion { .. } => "conversion",
            EventKind::Feedback { .. } => "feedback",
            EventKind::Region { .. } => "region",
        }
    }
}

/// A feedback event, stamped with the time it was created.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub request_id: CorrelationId,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
}

impl Event {
    pub fn new(request_id: CorrelationId, session_id: impl Into<String>, kind: EventKind) -> Self {
        Self {
            request_id,
            session_id: session_id.into(),
            timestamp: Utc::now(),
            kind,
        }
    }

    pub fn click(
        request_id: CorrelationId,
        session_id: impl Into<String>,
        positions: Vec<u32>,
        product_ids: Vec<String>,
    ) -> Self {
        Self::new(
            request_id,
            session_id,
            EventKind::Click {
                positions,
                product_ids,
            },
        )
    }

    pub fn conversion(
        request_id: CorrelationId,
        session_id: impl Into<String>,
        positions: Vec<u32>,
        product_ids: Vec<String>,
    ) -> Self {
        Self::new(
            request_id,
            session_id,
            EventKind::Conversion {
                positions,
                product_ids,
            },
        )
    }

    pub fn feedback(
        request_id: CorrelationId,
        session_id: impl Into<String>,
        success: bool,
        comment: Option<String>,
    ) -> Self {
        Self::new(request_id, session_id, EventKind::Feedback { success, comment })
    }

    pub fn region(
        request_id: CorrelationId,
        session_id: impl Into<String>,
        left: f32,
        top: f32,
        width: f32,
        height: f32,
    ) -> Self {
        Self::new(
            request_id,
            session_id,
            EventKind::Region {
                left,
                top,
                width,
                height,
            },
        )
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.session_id.trim().is_empty() {
            return Err(SearchError::InvalidInput(
                "Session id must not be empty".to_string(),
            ));
        }
        match &self.kind {
            EventKind::Click {
                positions,
                product_ids,
            }
            | EventKind::Conversion {
                positions,
                product_ids,
            } => {
                if positions.len() != product_ids.len() {
                    return Err(SearchError::InvalidInput(format!(
                        "Got {} positions for {} product ids",
                        positions.len(),
                        product_ids.len()
                    )));
                }
            }
            EventKind::Feedback { .. } => {}
            EventKind::Region {
                left,
                top,
                width,
                height,
            } => {
                check_threshold("region left", *left)?;
                check_threshold("region top", *top)?;
                check_threshold("region width", *width)?;
                check_threshold("region height", *height)?;
            }
        }
        Ok(())
    }

    /// The JSON body sent to the feedback endpoint.
    pub fn to_json(&self) -> Result<String, SearchError> {
        let data = match &self.kind {
            EventKind::Click {
                positions,
                product_ids,
            }
            | EventKind::Conversion {
                positions,
                product_ids,
            } => EventData::Products {
                positions,
                product_ids,
            },
            EventKind::Feedback { success, comment } => EventData::Feedback {
                success: *success,
                comment: comment.as_deref(),
            },
            EventKind::Region {
                left,
                top,
                width,
                height,
            } => EventData::Region {
                rect: Rect {
                    x: *left,
                    y: *top,
                    w: *width,
                    h: *height,
                },
            },
        };
        let request = FeedbackRequest {
            request_id: self.request_id.as_str(),
            session_id: &self.session_id,
            timestamp: self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            event: self.kind.name(),
            data,
        };
        Ok(serde_json::to_string(&request)?)
    }
}

#[derive(Serialize)]
struct FeedbackRequest<'a> {
    request_id: &'a str,
    session_id: &'a str,
    timestamp: String,
    event: &'static str,
    data: EventData<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum EventData<'a> {
    Products {
        positions: &'a [u32],
        product_ids: &'a [String],
    },
    Feedback {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        comment: Option<&'a str>,
    },
    Region {
        rect: Rect,
    },
}

#[derive(Serialize)]
struct Rect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

/// Feedback façade.
#[derive(Debug, Clone)]
pub struct Feedback {
    base: ApiBase,
}

impl Feedback {
    pub fn new(context: Arc<ApiContext>) -> Self {
        Self {
            base: ApiBase::new(context),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.base = self.base.with_header(name, value);
        self
    }

    pub fn send(&self, event: Event) -> Call<Confirmation> {
        let request = self.request(&event);
        self.base.confirm(request)
    }

    fn request(&self, event: &Event) -> Result<RequestContext, SearchError> {
        event.validate()?;
        debug!(
            "Sending {} event for request {}",
            event.kind.name(),
            event.request_id
        );
        Ok(RequestContext::post(
            self.base.endpoints().feedback_url(),
            self.base.metadata(Metadata::new()),
            Some(Payload::json(event.to_json()?)),
        ))
    }
}
