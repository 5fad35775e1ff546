//! Client session identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Longest session identifier accepted (matches the history table column).
pub const MAX_SESSION_ID_LEN: usize = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionIdError {
    #[error("Session ID required")]
    Missing,

    #[error("Session ID longer than {} characters", MAX_SESSION_ID_LEN)]
    TooLong,
}

/// Opaque partition key identifying the client session that owns history records.
///
/// The value is never interpreted; it only has to be non-empty once trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, SessionIdError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SessionIdError::Missing);
        }
        if trimmed.chars().count() > MAX_SESSION_ID_LEN {
            return Err(SessionIdError::TooLong);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Mint a fresh random session id for a client that did not present one.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SessionId {
    type Error = SessionIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_whitespace() {
        let id = SessionId::new("  abc-123 ").unwrap();
        assert_eq!(id.as_str(), "abc-123");
    }

    #[test]
    fn test_empty_is_missing() {
        assert_eq!(SessionId::new(""), Err(SessionIdError::Missing));
        assert_eq!(SessionId::new("   "), Err(SessionIdError::Missing));
    }

    #[test]
    fn test_too_long() {
        let raw = "x".repeat(MAX_SESSION_ID_LEN + 1);
        assert_eq!(SessionId::new(raw), Err(SessionIdError::TooLong));
    }

    #[test]
    fn test_generate_is_uuid() {
        let id = SessionId::generate();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
        assert_ne!(id, SessionId::generate());
    }

    #[test]
    fn test_serde_transparent_string() {
        let id = SessionId::new("s1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"s1\"");
        assert!(serde_json::from_str::<SessionId>("\"\"").is_err());
    }
}
