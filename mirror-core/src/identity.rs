//! Identity types for Mirror documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

use crate::error::ObjectIdParseError;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Number of hex characters in a document identifier.
pub const OBJECT_ID_LEN: usize = 24;

static OBJECT_ID_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Document identifier: 12 bytes rendered as 24 hex characters.
///
/// The layout matches the document store's native identifiers: a 4-byte
/// big-endian creation timestamp, 5 random bytes and a 3-byte counter.
/// Parsing accepts either case; the stored form is always lowercase so that
/// two ids naming the same document compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Generate a fresh identifier stamped with the current time.
    pub fn new() -> Self {
        Self::from_parts(Utc::now().timestamp() as u32)
    }

    fn from_parts(seconds: u32) -> Self {
        let random = Uuid::now_v7();
        let counter = OBJECT_ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&random.as_bytes()[11..16]);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);

        Self(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Parse a 24-character hex identifier.
    pub fn parse(raw: &str) -> Result<Self, ObjectIdParseError> {
        if raw.len() != OBJECT_ID_LEN {
            return Err(ObjectIdParseError::InvalidLength {
                value: raw.to_string(),
                length: raw.len(),
            });
        }
        if !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ObjectIdParseError::InvalidCharacters {
                value: raw.to_string(),
            });
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    /// Check whether a string is a well-formed identifier without allocating one.
    pub fn is_valid(raw: &str) -> bool {
        raw.len() == OBJECT_ID_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creation time embedded in the first four bytes.
    pub fn timestamp(&self) -> Option<Timestamp> {
        let seconds = u32::from_str_radix(&self.0[..8], 16).ok()?;
        DateTime::from_timestamp(i64::from(seconds), 0)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = ObjectIdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_id() {
        let id = ObjectId::parse("507f1f77bcf86cd799439011").expect("valid id");
        assert_eq!(id.as_str(), "507f1f77bcf86cd799439011");
    }

    #[test]
    fn test_parse_normalizes_case() {
        let upper = ObjectId::parse("507F1F77BCF86CD799439011").expect("valid id");
        let lower = ObjectId::parse("507f1f77bcf86cd799439011").expect("valid id");
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_parse_rejects_bad_length() {
        assert!(matches!(
            ObjectId::parse("507f1f77"),
            Err(ObjectIdParseError::InvalidLength { length: 8, .. })
        ));
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        assert!(matches!(
            ObjectId::parse("507f1f77bcf86cd79943901z"),
            Err(ObjectIdParseError::InvalidCharacters { .. })
        ));
    }

    #[test]
    fn test_generated_ids_are_valid_and_distinct() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert!(ObjectId::is_valid(a.as_str()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_embedded_timestamp() {
        let id = ObjectId::from_parts(1_700_000_000);
        let ts = id.timestamp().expect("timestamp");
        assert_eq!(ts.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_serde_rejects_malformed() {
        let result: Result<ObjectId, _> = serde_json::from_str("\"not-an-id\"");
        assert!(result.is_err());
    }
}
