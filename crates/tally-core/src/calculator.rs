//! The operations exposed to the request boundary.

use crate::db::HistoryStore;
use crate::evaluator::evaluate;
use crate::validator::check_expression;
use crate::{Result, TallyError};
use std::sync::Arc;
use tally_types::{Calculation, CalculationRecord, SessionId, Validation};
use tracing::{debug, info, warn};

/// Settings for [`Calculator`].
#[derive(Debug, Clone)]
pub struct CalculatorConfig {
    /// Also store failed calculations, with `error_message` set.
    pub record_failures: bool,
    /// History page size when the caller does not ask for one.
    pub default_history_limit: u32,
    /// Upper bound on any requested history page size.
    pub max_history_limit: u32,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            record_failures: false,
            default_history_limit: 50,
            max_history_limit: 500,
        }
    }
}

/// Validates, evaluates and records calculations for client sessions.
pub struct Calculator {
    store: Arc<HistoryStore>,
    config: CalculatorConfig,
}

impl Calculator {
    pub fn new(store: Arc<HistoryStore>, config: CalculatorConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<HistoryStore> {
        &self.store
    }

    /// Validate and evaluate `expression`, then append it to the session's history.
    ///
    /// Nothing is stored for a rejected expression unless `record_failures` is set.
    pub fn calculate(&self, expression: &str, session_id: &SessionId) -> Result<Calculation> {
        let expression = expression.trim();

        let outcome = check_expression(expression)
            .map_err(|rejection| TallyError::InvalidExpression(rejection.to_string()))
            .and_then(|()| evaluate(expression));

        match outcome {
            Ok(result) => {
                let record = self
                    .store
                    .append(expression, &result.to_string(), session_id)?;
                info!(
                    target: "tally::calc",
                    "{} = {} (record {}, session {})",
                    expression, result, record.id, session_id
                );
                Ok(Calculation {
                    expression: expression.to_string(),
                    result,
                    session_id: session_id.clone(),
                })
            }
            Err(err) => {
                debug!(target: "tally::calc", "Rejected {:?}: {}", expression, err);
                if self.config.record_failures && err.is_expression_error() {
                    if let Err(store_err) =
                        self.store
                            .append_failure(expression, &err.to_string(), session_id)
                    {
                        warn!(target: "tally::history", "Failed to record failed calculation: {}", store_err);
                    }
                }
                Err(err)
            }
        }
    }

    /// Check `expression` without evaluating or storing it.
    pub fn validate(&self, expression: &str) -> Validation {
        let expression = expression.trim();
        Validation {
            expression: expression.to_string(),
            is_valid: check_expression(expression).is_ok(),
        }
    }

    /// Most recent records of a session, newest first.
    pub fn list_history(
        &self,
        session_id: &SessionId,
        limit: Option<u32>,
    ) -> Result<Vec<CalculationRecord>> {
        let limit = limit
            .unwrap_or(self.config.default_history_limit)
            .min(self.config.max_history_limit);
        self.store.list(session_id, limit)
    }

    /// Delete one record owned by `session_id`. Returns whether it was found.
    pub fn delete_record(&self, id: i64, session_id: &SessionId) -> Result<bool> {
        let found = self.store.delete_owned(id, session_id)?;
        if found {
            info!(target: "tally::history", "Deleted record {} (session {})", id, session_id);
        } else {
            debug!(target: "tally::history", "No record {} for session {}", id, session_id);
        }
        Ok(found)
    }

    /// Remove every record of a session. Returns how many were removed.
    pub fn clear_history(&self, session_id: &SessionId) -> Result<usize> {
        let removed = self.store.clear(session_id)?;
        info!(target: "tally::history", "Cleared {} records (session {})", removed, session_id);
        Ok(removed)
    }
}
