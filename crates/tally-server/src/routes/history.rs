//! History routes.

use crate::error::{require_session, ApiError};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tally_types::{CalculationRecord, ErrorKind};

/// Raw query string; `limit` is parsed leniently.
#[derive(Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<String>,
}

impl HistoryQuery {
    /// Requested page size, or `None` when absent or not a non-negative integer.
    pub fn limit(&self) -> Option<u32> {
        self.limit.as_deref().and_then(|raw| raw.trim().parse().ok())
    }
}

/// GET /api/history - Most recent calculations of the session, newest first.
///
/// An unreadable `limit` falls back to the default page size.
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<CalculationRecord>>, ApiError> {
    let session_id = require_session(&headers)?;
    let limit = query.ok().and_then(|Query(q)| q.limit());

    let records = state.calculator.list_history(&session_id, limit)?;
    Ok(Json(records))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
}

/// DELETE /api/history/{id} - Delete one of the session's calculations.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let session_id = require_session(&headers)?;
    // No record can have an id that is not an integer.
    let Path(id) = id.map_err(|rejection| {
        ApiError::new(ErrorKind::NotFound, rejection.body_text())
    })?;

    if !state.calculator.delete_record(id, &session_id)? {
        return Err(ApiError::not_found(id));
    }

    Ok(Json(DeleteResponse {
        message: "Calculation deleted successfully",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: Option<&str>) -> HistoryQuery {
        HistoryQuery {
            limit: limit.map(str::to_string),
        }
    }

    #[test]
    fn test_limit_parsing() {
        assert_eq!(query(Some("10")).limit(), Some(10));
        assert_eq!(query(Some(" 7 ")).limit(), Some(7));
        assert_eq!(query(Some("abc")).limit(), None);
        assert_eq!(query(Some("-1")).limit(), None);
        assert_eq!(query(Some("")).limit(), None);
        assert_eq!(query(None).limit(), None);
    }
}
