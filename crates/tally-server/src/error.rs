//! Mapping of core errors onto HTTP responses.

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tally_core::TallyError;
use tally_types::{ErrorBody, ErrorKind, SessionId, SessionIdError};

/// Header carrying the client's session identifier.
pub const SESSION_HEADER: &str = "x-session-id";

/// Error returned by route handlers, rendered as `{"error": kind, "message": text}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let status = match kind {
            ErrorKind::InvalidExpression
            | ErrorKind::DivisionByZero
            | ErrorKind::MissingSession => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InternalFailure => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            body: ErrorBody {
                error: kind,
                message: message.into(),
            },
        }
    }

    pub fn not_found(id: i64) -> Self {
        Self::new(ErrorKind::NotFound, format!("Calculation {} not found", id))
    }
}

impl From<TallyError> for ApiError {
    fn from(err: TallyError) -> Self {
        let kind = err.kind();
        if kind == ErrorKind::InternalFailure {
            tracing::error!(target: "tally::api", "Internal failure: {}", err);
            return Self::new(kind, "An unexpected error occurred");
        }
        Self::new(kind, err.to_string())
    }
}

impl From<SessionIdError> for ApiError {
    fn from(err: SessionIdError) -> Self {
        Self::new(ErrorKind::MissingSession, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Session id presented by the client, if any. An empty header counts as absent.
pub fn optional_session(headers: &HeaderMap) -> Result<Option<SessionId>, ApiError> {
    let Some(value) = headers.get(SESSION_HEADER) else {
        return Ok(None);
    };
    let raw = value.to_str().map_err(|_| {
        ApiError::new(
            ErrorKind::MissingSession,
            "Session ID must be visible ASCII text",
        )
    })?;

    match SessionId::new(raw) {
        Ok(id) => Ok(Some(id)),
        Err(SessionIdError::Missing) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Session id presented by the client; fails with `MissingSession` if absent.
pub fn require_session(headers: &HeaderMap) -> Result<SessionId, ApiError> {
    optional_session(headers)?.ok_or_else(|| SessionIdError::Missing.into())
}
