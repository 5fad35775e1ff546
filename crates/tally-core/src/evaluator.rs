//! Arithmetic evaluation over `+ - * /` and parentheses.
//!
//! Two tiers:
//! - a fast path for the plain `<number> <op> <number>` form, matched by regex
//! - a recursive-descent parser for everything else, building an [`Expr`] tree
//!
//! Both tiers normalize their output through [`CalcValue::new`].

use crate::lexer::{is_allowed_char, tokenize, Token, TokenKind};
use crate::{Result, TallyError};
use once_cell::sync::Lazy;
use regex::Regex;
use tally_types::CalcValue;

/// Maximum nesting of parentheses and signs accepted by the parser.
const MAX_DEPTH: usize = 256;

static BINARY_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+\.?\d*|\.\d+)\s*([-+*/])\s*(\d+\.?\d*|\.\d+)\s*$").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(BinaryOp::Add),
            "-" => Some(BinaryOp::Sub),
            "*" => Some(BinaryOp::Mul),
            "/" => Some(BinaryOp::Div),
            _ => None,
        }
    }

    fn apply(self, lhs: f64, rhs: f64) -> Result<f64> {
        match self {
            BinaryOp::Add => Ok(lhs + rhs),
            BinaryOp::Sub => Ok(lhs - rhs),
            BinaryOp::Mul => Ok(lhs * rhs),
            BinaryOp::Div => {
                if rhs == 0.0 {
                    return Err(TallyError::DivisionByZero);
                }
                Ok(lhs / rhs)
            }
        }
    }
}

/// Parsed arithmetic expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Parse `source` under the arithmetic grammar.
    pub fn parse(source: &str) -> Result<Self> {
        if let Some((offset, ch)) = source.char_indices().find(|&(_, c)| !is_allowed_char(c)) {
            return Err(TallyError::InvalidExpression(format!(
                "invalid character '{ch}' at position {offset}"
            )));
        }

        let tokens = tokenize(source).map_err(|e| TallyError::InvalidExpression(e.to_string()))?;
        if tokens.is_empty() {
            return Err(TallyError::InvalidExpression("expression is empty".to_string()));
        }

        let mut parser = Parser::new(&tokens);
        let expr = parser.expr()?;
        if let Some(token) = parser.peek() {
            return Err(unexpected(token));
        }
        Ok(expr)
    }

    /// Compute the raw value of this expression.
    pub fn eval(&self) -> Result<f64> {
        match self {
            Expr::Number(n) => Ok(*n),
            Expr::Neg(inner) => Ok(-inner.eval()?),
            Expr::Binary { op, lhs, rhs } => {
                let lhs = lhs.eval()?;
                let rhs = rhs.eval()?;
                op.apply(lhs, rhs)
            }
        }
    }
}

/// Evaluate an expression and normalize its result.
pub fn evaluate(expression: &str) -> Result<CalcValue> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err(TallyError::InvalidExpression("expression is empty".to_string()));
    }

    if let Some(raw) = evaluate_binary_form(expression)? {
        tracing::trace!(target: "tally::calc", "fast path: {}", expression);
        return finish(raw);
    }

    let expr = Expr::parse(expression)?;
    finish(expr.eval()?)
}

/// Evaluate `a op b` directly, or return `None` if the text has another shape.
fn evaluate_binary_form(expression: &str) -> Result<Option<f64>> {
    let Some(caps) = BINARY_FORM.captures(expression) else {
        return Ok(None);
    };

    let operand = |text: &str| {
        text.parse::<f64>()
            .map_err(|_| TallyError::InvalidExpression(format!("malformed number '{text}'")))
    };
    let lhs = operand(&caps[1])?;
    let rhs = operand(&caps[3])?;
    let op = BinaryOp::from_symbol(&caps[2]).ok_or_else(|| {
        TallyError::InvalidExpression(format!("unsupported operator '{}'", &caps[2]))
    })?;

    op.apply(lhs, rhs).map(Some)
}

fn finish(raw: f64) -> Result<CalcValue> {
    if !raw.is_finite() {
        return Err(TallyError::InvalidExpression(
            "result is not a finite number".to_string(),
        ));
    }
    Ok(CalcValue::new(raw))
}

fn unexpected(token: &Token) -> TallyError {
    let what = match token.kind {
        TokenKind::Number(_) => "number",
        TokenKind::Plus => "'+'",
        TokenKind::Minus => "'-'",
        TokenKind::Star => "'*'",
        TokenKind::Slash => "'/'",
        TokenKind::LParen => "'('",
        TokenKind::RParen => "')'",
    };
    TallyError::InvalidExpression(format!("unexpected {what} at position {}", token.offset))
}

/// Recursive-descent parser.
///
/// ```text
/// expr    := term (('+' | '-') term)*
/// term    := unary (('*' | '/') unary)*
/// unary   := '-' unary | primary
/// primary := NUMBER | '(' expr ')'
/// ```
struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(TallyError::InvalidExpression(
                "expression is nested too deeply".to_string(),
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn expr(&mut self) -> Result<Expr> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek().map(|t| t.kind) {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek().map(|t| t.kind) {
                Some(TokenKind::Star) => BinaryOp::Mul,
                Some(TokenKind::Slash) => BinaryOp::Div,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr> {
        if matches!(self.peek().map(|t| t.kind), Some(TokenKind::Minus)) {
            self.pos += 1;
            self.enter()?;
            let inner = self.unary()?;
            self.leave();
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.advance() {
            Some(Token {
                kind: TokenKind::Number(n),
                ..
            }) => Ok(Expr::Number(*n)),
            Some(Token {
                kind: TokenKind::LParen,
                offset,
            }) => {
                let open = *offset;
                self.enter()?;
                let inner = self.expr()?;
                self.leave();
                match self.advance() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => Ok(inner),
                    Some(token) => Err(unexpected(token)),
                    None => Err(TallyError::InvalidExpression(format!(
                        "unclosed '(' at position {open}"
                    ))),
                }
            }
            Some(token) => Err(unexpected(token)),
            None => Err(TallyError::InvalidExpression(
                "unexpected end of expression".to_string(),
            )),
        }
    }
}
