//! Syntax checks run before an expression is evaluated.

use crate::lexer::{tokenize, LexError, Token, TokenKind};
use tally_types::MAX_EXPRESSION_LEN;
use thiserror::Error;

/// Why an expression was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("expression is empty")]
    Empty,

    #[error("expression is longer than {} characters", MAX_EXPRESSION_LEN)]
    TooLong,

    #[error("{0}")]
    Lex(#[from] LexError),

    #[error("expression cannot start with '{0}'")]
    LeadingOperator(char),

    #[error("expression cannot end with '{0}'")]
    TrailingOperator(char),

    #[error("consecutive operators at position {0}")]
    ConsecutiveOperators(usize),

    #[error("missing operator between numbers at position {0}")]
    AdjacentNumbers(usize),

    #[error("unexpected ')' at position {0}")]
    UnexpectedCloseParen(usize),

    #[error("unbalanced parentheses")]
    UnbalancedParentheses,
}

/// Whether `expression` is syntactically acceptable for evaluation.
pub fn is_valid(expression: &str) -> bool {
    check_expression(expression).is_ok()
}

/// Like [`is_valid`], but reports the first rule the expression breaks.
pub fn check_expression(expression: &str) -> Result<(), Rejection> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err(Rejection::Empty);
    }
    if expression.chars().count() > MAX_EXPRESSION_LEN {
        return Err(Rejection::TooLong);
    }

    let tokens = tokenize(expression)?;

    if let Some(first) = tokens.first() {
        if matches!(
            first.kind,
            TokenKind::Plus | TokenKind::Star | TokenKind::Slash
        ) {
            return Err(Rejection::LeadingOperator(symbol(&first.kind)));
        }
    }
    if let Some(last) = tokens.last() {
        if last.kind.is_operator() {
            return Err(Rejection::TrailingOperator(symbol(&last.kind)));
        }
    }

    let mut depth: i64 = 0;
    let mut prev: Option<&Token> = None;
    // A sign may follow an operator, but a sign may not follow another sign.
    let mut prev_was_sign = false;

    for token in &tokens {
        let prev_kind = prev.map(|t| t.kind);

        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => {
                depth -= 1;
                if depth < 0 {
                    return Err(Rejection::UnexpectedCloseParen(token.offset));
                }
            }
            TokenKind::Number(_) => {
                if prev_kind.is_some_and(|k| k.is_number()) {
                    return Err(Rejection::AdjacentNumbers(token.offset));
                }
            }
            _ => {}
        }

        let is_sign = token.kind == TokenKind::Minus
            && prev_kind.is_none_or(|k| k.is_operator() || k == TokenKind::LParen);

        if token.kind.is_operator() && prev_kind.is_some_and(|k| k.is_operator()) {
            if !is_sign || prev_was_sign {
                return Err(Rejection::ConsecutiveOperators(token.offset));
            }
        }

        prev_was_sign = is_sign;
        prev = Some(token);
    }

    if depth != 0 {
        return Err(Rejection::UnbalancedParentheses);
    }

    Ok(())
}

fn symbol(kind: &TokenKind) -> char {
    match kind {
        TokenKind::Plus => '+',
        TokenKind::Minus => '-',
        TokenKind::Star => '*',
        TokenKind::Slash => '/',
        TokenKind::LParen => '(',
        TokenKind::RParen => ')',
        TokenKind::Number(_) => '#',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_accepts_simple_expressions() {
        for expr in [
            "1+2",
            "2 + 3 * 4",
            "(2+3)*4",
            "10 / 4",
            "3.14 * 2",
            ".5 + 5.",
            "  7  ",
            "-5 + 3",
            "2*-3",
            "2--3",
            "(-2)*(-(3))",
        ] {
            assert!(is_valid(expr), "{expr:?} should be valid");
        }
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(check_expression(""), Err(Rejection::Empty));
        assert_eq!(check_expression(" \t "), Err(Rejection::Empty));
    }

    #[test]
    fn test_rejects_disallowed_characters() {
        assert!(!is_valid("2 ^ 3"));
        assert!(!is_valid("abs(2)"));
        assert!(!is_valid("1e5"));
        assert!(!is_valid("2 % 3"));
    }

    #[test]
    fn test_rejects_leading_operator() {
        assert_eq!(check_expression("+2+3"), Err(Rejection::LeadingOperator('+')));
        assert_eq!(check_expression("*2"), Err(Rejection::LeadingOperator('*')));
        assert_eq!(check_expression("/2"), Err(Rejection::LeadingOperator('/')));
    }

    #[test]
    fn test_rejects_trailing_operator() {
        assert_eq!(check_expression("2+"), Err(Rejection::TrailingOperator('+')));
        assert_eq!(check_expression("2-"), Err(Rejection::TrailingOperator('-')));
        assert_eq!(check_expression("2*"), Err(Rejection::TrailingOperator('*')));
        assert_eq!(check_expression("2 /"), Err(Rejection::TrailingOperator('/')));
    }

    #[test]
    fn test_rejects_consecutive_operators() {
        assert_eq!(check_expression("2++3"), Err(Rejection::ConsecutiveOperators(2)));
        assert!(!is_valid("2*/3"));
        assert!(!is_valid("2-+3"));
        assert!(!is_valid("2---3"));
        assert!(!is_valid("--3"));
    }

    #[test]
    fn test_rejects_multiple_decimal_points() {
        assert!(matches!(
            check_expression("2..3+1"),
            Err(Rejection::Lex(LexError::MalformedNumber { .. }))
        ));
        assert!(!is_valid("1.2.3"));
    }

    #[test]
    fn test_rejects_unbalanced_parentheses() {
        assert_eq!(check_expression("(2+3"), Err(Rejection::UnbalancedParentheses));
        assert_eq!(check_expression("2+3)"), Err(Rejection::UnexpectedCloseParen(3)));
        assert_eq!(check_expression(")2+3("), Err(Rejection::UnexpectedCloseParen(0)));
    }

    #[test]
    fn test_rejects_adjacent_numbers() {
        assert_eq!(check_expression("1 2"), Err(Rejection::AdjacentNumbers(2)));
    }

    #[test]
    fn test_rejects_overlong_expression() {
        let expr = vec!["1"; 251].join("+");
        assert!(expr.len() > MAX_EXPRESSION_LEN);
        assert_eq!(check_expression(&expr), Err(Rejection::TooLong));
    }

    proptest! {
        #[test]
        fn prop_is_valid_is_deterministic(expr in "[0-9+*/().\\- ]{0,40}") {
            prop_assert_eq!(is_valid(&expr), is_valid(&expr));
        }

        #[test]
        fn prop_unsigned_binary_form_is_valid(
            a in 0u32..100_000,
            b in 0u32..100_000,
            op in prop::sample::select(vec!['+', '-', '*', '/']),
        ) {
            let expr = format!("{a} {op} {b}");
            prop_assert!(is_valid(&expr));
        }
    }
}
