//! Persisted calculation history.

use crate::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest expression text a record may hold.
pub const MAX_EXPRESSION_LEN: usize = 500;

/// One evaluated expression in a session's history.
///
/// Records are immutable once stored; they are only ever removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRecord {
    /// Store-assigned identifier, never reused.
    pub id: i64,
    /// The expression as submitted.
    pub expression: String,
    /// Display text of the result (empty for failed calculations).
    pub result: String,
    /// When the record was stored.
    pub timestamp: DateTime<Utc>,
    /// Owning client session.
    pub session_id: SessionId,
    /// Reason the calculation failed, if this record logs a failure.
    pub error_message: Option<String>,
}

impl CalculationRecord {
    pub fn is_failure(&self) -> bool {
        self.error_message.is_some()
    }
}
