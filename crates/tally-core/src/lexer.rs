//! Tokenizer for arithmetic expressions.

use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

/// Whether `c` may appear in an expression at all.
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_digit()
        || matches!(c, '+' | '-' | '*' | '/' | '.' | '(' | ')')
        || c.is_whitespace()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl TokenKind {
    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus | TokenKind::Minus | TokenKind::Star | TokenKind::Slash
        )
    }

    pub fn is_number(&self) -> bool {
        matches!(self, TokenKind::Number(_))
    }
}

/// A token and the byte offset it starts at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("invalid character '{ch}' at position {offset}")]
    InvalidCharacter { ch: char, offset: usize },

    #[error("malformed number '{text}' at position {offset}")]
    MalformedNumber { text: String, offset: usize },
}

/// Split an expression into tokens. Whitespace separates tokens and is dropped.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while let Some(&(offset, c)) = self.chars.peek() {
            let kind = match c {
                c if c.is_whitespace() => {
                    self.chars.next();
                    continue;
                }
                '0'..='9' | '.' => self.number(offset)?,
                '+' => self.single(TokenKind::Plus),
                '-' => self.single(TokenKind::Minus),
                '*' => self.single(TokenKind::Star),
                '/' => self.single(TokenKind::Slash),
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                ch => return Err(LexError::InvalidCharacter { ch, offset }),
            };
            tokens.push(Token { kind, offset });
        }

        Ok(tokens)
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.chars.next();
        kind
    }

    /// Consume a maximal run of digits and dots starting at `start`.
    fn number(&mut self, start: usize) -> Result<TokenKind, LexError> {
        let mut end = start;
        while let Some(&(offset, c)) = self.chars.peek() {
            if !(c.is_ascii_digit() || c == '.') {
                break;
            }
            end = offset + c.len_utf8();
            self.chars.next();
        }

        let text = &self.source[start..end];
        let malformed = || LexError::MalformedNumber {
            text: text.to_string(),
            offset: start,
        };

        let dots = text.matches('.').count();
        if dots > 1 || !text.bytes().any(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        text.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| malformed())
    }
}
