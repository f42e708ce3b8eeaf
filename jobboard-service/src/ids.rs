//! Identifiers for stored documents and inbound requests
//!
//! # Document IDs
//!
//! Every stored document is keyed by a [`DocumentId`], a UUIDv7 rendered as the
//! lowercase hyphenated string. Version 7 keeps ids roughly creation-ordered.
//! Foreign keys are persisted as the same string form.
//!
//! ```rust
//! use jobboard_service::ids::DocumentId;
//!
//! let id = DocumentId::new();
//! let parsed = DocumentId::parse(&id.to_string()).unwrap();
//! assert_eq!(id, parsed);
//! assert!(DocumentId::parse("not-an-id").is_err());
//! ```
//!
//! # Request IDs
//!
//! Request IDs use the TypeID format (`req_<base32 uuidv7>`) so they sort by
//! arrival time in logs.

use std::fmt;
use std::str::FromStr;

use http::Request;
use mti::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tower_http::request_id::{MakeRequestId, RequestId as TowerRequestId};
use uuid::Uuid;

/// Store-native document identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a fresh time-ordered identifier
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parse the string form of an identifier
    ///
    /// The nil UUID is rejected: it never names a stored document.
    pub fn parse(s: &str) -> Result<Self, DocumentIdError> {
        let uuid = Uuid::parse_str(s).map_err(|_| DocumentIdError::Malformed(s.to_string()))?;
        if uuid.is_nil() {
            return Err(DocumentIdError::Nil);
        }
        Ok(Self(uuid))
    }

    /// The underlying UUID
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}

impl FromStr for DocumentId {
    type Err = DocumentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Error type for document ID parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentIdError {
    /// The value is not a UUID.
    #[error("invalid document id: {0:?}")]
    Malformed(String),

    /// The value is the nil UUID.
    #[error("document id must not be nil")]
    Nil,
}

/// A type-safe request identifier for distributed tracing.
///
/// Format: `req_<base32-encoded-uuidv7>`, e.g. `req_01h455vb4pex5vsknk084sn02q`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(MagicTypeId);

impl RequestId {
    /// The prefix used for request IDs
    pub const PREFIX: &'static str = "req";

    /// Creates a new request ID with a UUIDv7 (time-sortable).
    #[must_use]
    pub fn new() -> Self {
        Self(Self::PREFIX.create_type_id::<V7>())
    }

    /// Returns the request ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generates a [`RequestId`] for every request that arrives without one.
///
/// Used with `tower_http::request_id::SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeTypedRequestId;

impl MakeRequestId for MakeTypedRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<TowerRequestId> {
        let id = RequestId::new();
        let header_value = http::HeaderValue::from_str(id.as_str()).ok()?;
        Some(TowerRequestId::new(header_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_display_is_hyphenated() {
        let id = DocumentId::new();
        let s = id.to_string();
        assert_eq!(s.len(), 36);
        assert_eq!(s, s.to_lowercase());
        assert_eq!(DocumentId::parse(&s).unwrap(), id);
    }

    #[test]
    fn test_document_id_rejects_garbage() {
        assert!(matches!(
            DocumentId::parse("abc"),
            Err(DocumentIdError::Malformed(_))
        ));
        assert!(DocumentId::parse("").is_err());
    }

    #[test]
    fn test_document_id_rejects_nil() {
        assert_eq!(
            DocumentId::parse("00000000-0000-0000-0000-000000000000"),
            Err(DocumentIdError::Nil)
        );
    }

    #[test]
    fn test_document_id_serde_as_string() {
        let id = DocumentId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_string()));

        let back: DocumentId = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);

        let bad: Result<DocumentId, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_document_ids_are_time_ordered() {
        let first = DocumentId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = DocumentId::new();
        assert!(first < second);
    }

    #[test]
    fn test_request_id_new() {
        let id = RequestId::new();
        assert!(id.as_str().starts_with("req_"));
        // prefix (3) + underscore (1) + suffix (26)
        assert_eq!(id.as_str().len(), 30);
    }

    #[test]
    fn test_make_typed_request_id() {
        let mut maker = MakeTypedRequestId;
        let request = http::Request::builder().body(()).unwrap();

        let id = maker.make_request_id(&request).expect("request id");
        let header_value = id.into_header_value();
        assert!(header_value.to_str().unwrap().starts_with("req_"));
    }
}
