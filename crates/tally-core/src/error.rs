//! Error types for Tally.

use tally_types::{ErrorKind, SessionIdError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    #[error("Cannot divide by zero")]
    DivisionByZero,

    #[error("{0}")]
    MissingSession(#[from] SessionIdError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TallyError {
    /// Category reported to clients.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TallyError::InvalidExpression(_) => ErrorKind::InvalidExpression,
            TallyError::DivisionByZero => ErrorKind::DivisionByZero,
            TallyError::MissingSession(_) => ErrorKind::MissingSession,
            TallyError::DatabaseError(_) | TallyError::IoError(_) => ErrorKind::InternalFailure,
        }
    }

    /// Whether this error is caused by the submitted expression.
    pub fn is_expression_error(&self) -> bool {
        matches!(
            self,
            TallyError::InvalidExpression(_) | TallyError::DivisionByZero
        )
    }
}
