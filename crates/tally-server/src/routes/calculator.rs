//! Calculator routes.

use crate::error::{optional_session, require_session, ApiError};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tally_types::{Calculation, ErrorKind, SessionId, Validation};
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct ExpressionRequest {
    #[serde(default)]
    pub expression: String,
}

/// Unwrap a JSON body, reporting a malformed one as an invalid expression.
fn expression_body(
    payload: Result<Json<ExpressionRequest>, JsonRejection>,
) -> Result<ExpressionRequest, ApiError> {
    payload.map(|Json(req)| req).map_err(|rejection| {
        ApiError::new(ErrorKind::InvalidExpression, rejection.body_text())
    })
}

/// POST /api/calculator/calculate - Evaluate an expression and record it.
///
/// A client without a session id gets a fresh one in the response.
pub async fn calculate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ExpressionRequest>, JsonRejection>,
) -> Result<Json<Calculation>, ApiError> {
    let req = expression_body(payload)?;
    let session_id = match optional_session(&headers)? {
        Some(id) => id,
        None => {
            let id = SessionId::generate();
            debug!(target: "tally::api", "Assigned new session {}", id);
            id
        }
    };

    let calculation = state.calculator.calculate(&req.expression, &session_id)?;
    Ok(Json(calculation))
}

/// POST /api/calculator/validate - Check an expression without evaluating it.
pub async fn validate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExpressionRequest>, JsonRejection>,
) -> Result<Json<Validation>, ApiError> {
    let req = expression_body(payload)?;
    Ok(Json(state.calculator.validate(&req.expression)))
}

#[derive(Serialize)]
pub struct ClearResponse {
    pub message: &'static str,
    pub removed: usize,
}

/// POST /api/calculator/clear - Remove the session's whole history.
pub async fn clear(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ClearResponse>, ApiError> {
    let session_id = require_session(&headers)?;
    let removed = state.calculator.clear_history(&session_id)?;

    Ok(Json(ClearResponse {
        message: "History cleared successfully",
        removed,
    }))
}
