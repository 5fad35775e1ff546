//! Expression evaluation and session-scoped calculation history for Tally.

mod calculator;
mod db;
mod error;
mod evaluator;
mod lexer;
mod validator;

pub use calculator::{Calculator, CalculatorConfig};
pub use db::HistoryStore;
pub use error::TallyError;
pub use evaluator::{evaluate, BinaryOp, Expr};
pub use lexer::{is_allowed_char, tokenize, LexError, Token, TokenKind};
pub use validator::{check_expression, is_valid, Rejection};

/// Result type for Tally operations.
pub type Result<T> = std::result::Result<T, TallyError>;
