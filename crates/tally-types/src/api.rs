//! Payloads exchanged with the request boundary.

use crate::{CalcValue, SessionId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Client-visible error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidExpression,
    DivisionByZero,
    NotFound,
    MissingSession,
    InternalFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidExpression => "InvalidExpression",
            ErrorKind::DivisionByZero => "DivisionByZero",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::MissingSession => "MissingSession",
            ErrorKind::InternalFailure => "InternalFailure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error payload: `{"error": kind, "message": text}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorKind,
    pub message: String,
}

/// Successful calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    pub expression: String,
    pub result: CalcValue,
    pub session_id: SessionId,
}

/// Outcome of a validate-only request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub expression: String,
    pub is_valid: bool,
}
