//! Error types for the visual search SDK.
//!
//! Every operation, whatever output shape the caller asked for, fails through
//! the single [`SearchError`] type. The variants fall into three families:
//!
//! - transport failures: [`SearchError::Http`] and [`SearchError::Connection`]
//! - decode failures: [`SearchError::Decode`] and [`SearchError::InvalidBody`]
//! - everything raised before or around the network call (validation,
//!   configuration, cancellation)

use std::error::Error as StdError;
use thiserror::Error;

/// Boxed cause of a connection-level failure.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Represents all possible errors that can occur while talking to the
/// visual search backend.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The backend answered with a non-2xx status.
    ///
    /// The body is kept verbatim and is never decoded as a domain object.
    #[error("Server error {status_code}: {body}")]
    Http {
        /// HTTP status code returned by the backend
        status_code: u16,
        /// Raw response body, possibly empty
        body: String,
    },

    /// The request never produced an HTTP response.
    ///
    /// This error occurs when:
    /// - The connection is refused or reset
    /// - DNS resolution or TLS negotiation fails
    /// - The request times out
    #[error("Connection error: {source}")]
    Connection {
        /// The underlying I/O or client failure
        #[source]
        source: BoxError,
    },

    /// The response body could not be decoded into the requested type.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response body is not valid UTF-8 text.
    #[error("Response body is not valid UTF-8: {0}")]
    InvalidBody(#[from] std::string::FromUtf8Error),

    /// The caller cancelled the call before it completed.
    #[error("Call was cancelled")]
    Cancelled,

    /// The request was rejected before any network I/O.
    ///
    /// This error occurs when:
    /// - A limit or threshold is out of range
    /// - A dependent matching feature is enabled without any matching stage
    /// - A keyword, SKU or image payload is empty
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A header name or value could not be encoded.
    #[error("Header error: {0}")]
    Header(String),

    /// The SDK configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A local file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The background task running the call panicked or was aborted.
    #[error("Background task failed: {0}")]
    Task(String),
}

impl SearchError {
    /// Wraps any error as a connection failure, preserving it as the source.
    pub fn connection<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        SearchError::Connection {
            source: err.into(),
        }
    }

    /// Returns the HTTP status code for [`SearchError::Http`] failures.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SearchError::Http { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// True for failures raised by the transport (HTTP status or connection).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SearchError::Http { .. } | SearchError::Connection { .. }
        )
    }

    /// True for failures raised while decoding a successful response.
    pub fn is_decode(&self) -> bool {
        matches!(self, SearchError::Decode(_) | SearchError::InvalidBody(_))
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::connection(err)
    }
}

impl From<reqwest::header::InvalidHeaderValue> for SearchError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        SearchError::Header(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderName> for SearchError {
    fn from(err: reqwest::header::InvalidHeaderName) -> Self {
        SearchError::Header(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_http_error_display_and_status() {
        let err = SearchError::Http {
            status_code: 403,
            body: "Forbidden".to_string(),
        };
        assert_eq!(err.to_string(), "Server error 403: Forbidden");
        assert_eq!(err.status_code(), Some(403));
        assert!(err.is_transport());
        assert!(!err.is_decode());
    }

    #[test]
    fn test_connection_error_preserves_source() {
        let err = SearchError::connection(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert!(err.is_transport());
        assert_eq!(err.status_code(), None);

        let source = err.source().expect("connection error should carry a source");
        let io_err = source
            .downcast_ref::<io::Error>()
            .expect("source should be the original io::Error");
        assert_eq!(io_err.kind(), io::ErrorKind::ConnectionReset);
    }

    #[test]
    fn test_decode_error_classification() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SearchError::from(parse);
        assert!(err.is_decode());
        assert!(!err.is_transport());
    }
}
