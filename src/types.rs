//! Domain types returned by the visual search backend.
//!
//! This module contains the offer model returned by matching, text search and
//! similarity lookups, the detection results returned by object proposal and
//! region detection, and the result wrappers used by the output shapes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Offers returned by image matching, text search and similarity lookups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferResponse {
    /// Server-assigned id of the matching request
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Session the request belongs to
    #[serde(rename = "session", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Predicted categories with their scores
    #[serde(rename = "predicted_category", default)]
    pub predicted_categories: HashMap<String, f32>,
    /// Matching offers, best match first
    #[serde(rename = "results", default)]
    pub offers: Vec<Offer>,
}

/// A product offer.
///
/// Only the identity fields matter to the SDK itself; the rest is passed
/// through as the backend sends it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(rename = "oid", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "descriptionShort", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_long: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_numbers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_ids: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(rename = "price", default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Match score; higher is better
    #[serde(default)]
    pub score: f32,
}

/// Links to the offer's product pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    /// Desktop product page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    /// Mobile product page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
}

/// A rectangle in relative image coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Left edge (0.0 to 1.0)
    #[serde(default)]
    pub left: f32,
    /// Top edge (0.0 to 1.0)
    #[serde(default)]
    pub top: f32,
    /// Right edge (0.0 to 1.0)
    #[serde(default)]
    pub right: f32,
    /// Bottom edge (0.0 to 1.0)
    #[serde(default)]
    pub bottom: f32,
}

impl Region {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// An object detected in an image.
///
/// Used by object proposal extraction and region detection to describe where
/// an object was found and how confident the backend is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectProposal {
    /// Confidence score for the detection (0.0 to 1.0)
    #[serde(default)]
    pub confidence: f32,
    /// Location of the object, if the backend returned one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
}

/// Region detection result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectList {
    /// Detected regions, in backend order
    #[serde(default)]
    pub regions: Vec<ObjectProposal>,
}

/// The response body as text, for callers who parse it themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonResponseBody {
    pub json: String,
}

impl JsonResponseBody {
    pub fn as_str(&self) -> &str {
        &self.json
    }
}

/// A decoded body plus the transport metadata it arrived with.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope<T> {
    /// HTTP status code
    pub status: u16,
    /// Response headers, names lowercased
    pub headers: BTreeMap<String, String>,
    /// Server-assigned request id, when the backend sent one
    pub correlation_id: Option<CorrelationId>,
    /// Decoded body
    pub body: T,
}

/// Outcome of a call whose only result is the backend's acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// HTTP status code
    pub status: u16,
    /// Response body text, usually empty
    pub body: String,
}

/// Identifies a prior matching request.
///
/// Flagging operations (manual match, not found) and feedback events refer to
/// a match through this id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Creates a new identifier, returning `None` if the value is empty.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.trim().is_empty() {
            None
        } else {
            Some(Self(v))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_response_from_backend_json() {
        let json = r#"{
            "id": "req-1",
            "session": "sess-1",
            "predicted_category": {"shoes": 0.9},
            "results": [
                {"oid": "o1", "title": "Sneaker", "descriptionShort": "white",
                 "catalogNumbers": ["123"], "customIds": {"ean": "400"},
                 "links": {"main": "https://shop/o1"}, "sku": "S1", "score": 0.87},
                {"oid": "o2"}
            ]
        }"#;
        let response: OfferResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.request_id.as_deref(), Some("req-1"));
        assert_eq!(response.session_id.as_deref(), Some("sess-1"));
        assert_eq!(response.predicted_categories.get("shoes"), Some(&0.9));
        assert_eq!(response.offers.len(), 2);

        let first = &response.offers[0];
        assert_eq!(first.id.as_deref(), Some("o1"));
        assert_eq!(first.description.as_deref(), Some("white"));
        assert_eq!(first.catalog_numbers.as_deref(), Some(&["123".to_string()][..]));
        assert_eq!(
            first.links.as_ref().and_then(|l| l.main.as_deref()),
            Some("https://shop/o1")
        );
        assert_eq!(response.offers[1].score, 0.0);
    }

    #[test]
    fn test_empty_object_is_empty_response() {
        let response: OfferResponse = serde_json::from_str("{}").unwrap();
        assert!(response.offers.is_empty());
        assert!(response.request_id.is_none());
    }

    #[test]
    fn test_region_dimensions() {
        let region = Region {
            left: 0.1,
            top: 0.2,
            right: 0.6,
            bottom: 0.9,
        };
        assert!((region.width() - 0.5).abs() < f32::EPSILON);
        assert!((region.height() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_object_list_from_backend_json() {
        let json = r#"{"regions":[{"confidence":0.8,"region":{"left":0.1,"top":0.1,"right":0.5,"bottom":0.5}},{"confidence":0.4}]}"#;
        let list: ObjectList = serde_json::from_str(json).unwrap();
        assert_eq!(list.regions.len(), 2);
        assert!(list.regions[0].region.is_some());
        assert!(list.regions[1].region.is_none());
    }

    #[test]
    fn test_correlation_id_rejects_empty() {
        assert!(CorrelationId::new("").is_none());
        assert!(CorrelationId::new("  ").is_none());
        assert_eq!(CorrelationId::new("abc").unwrap().to_string(), "abc");
    }
}
