//! Shared application state.

use crate::config::Config;
use std::sync::Arc;
use tally_core::{Calculator, HistoryStore};

/// Shared application state.
pub struct AppState {
    pub calculator: Calculator,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> tally_core::Result<Self> {
        let store = Arc::new(HistoryStore::open(&config.db_path)?);
        let calculator = Calculator::new(store, config.calculator_config());

        Ok(Self { calculator, config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::SessionId;
    use tempfile::TempDir;

    #[test]
    fn test_new_opens_history_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            db_path: temp_dir.path().join("nested").join("calc.db"),
            default_history_limit: 1,
            ..Config::default()
        };

        let state = AppState::new(config).unwrap();
        let session = SessionId::new("s1").unwrap();
        state.calculator.calculate("1+1", &session).unwrap();
        state.calculator.calculate("2+2", &session).unwrap();

        assert!(temp_dir.path().join("nested").join("calc.db").exists());
        assert_eq!(state.calculator.list_history(&session, None).unwrap().len(), 1);
        assert_eq!(state.calculator.store().count(&session).unwrap(), 2);
    }
}
