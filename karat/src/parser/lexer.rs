//! Tokenizer for formula expressions

use crate::ast::Span;
use crate::error::FormulaError;
use rust_decimal::Decimal;
use std::fmt;
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(Decimal),
    /// Letters, digits, `_` and `.`; `Product.Gram` is a single identifier
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    EqualEqual,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    LeftParen,
    RightParen,
    Comma,
    Question,
    Colon,
    End,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::Identifier(name) => write!(f, "identifier '{}'", name),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::EqualEqual => write!(f, "'=='"),
            TokenKind::NotEqual => write!(f, "'!='"),
            TokenKind::Less => write!(f, "'<'"),
            TokenKind::LessEqual => write!(f, "'<='"),
            TokenKind::Greater => write!(f, "'>'"),
            TokenKind::GreaterEqual => write!(f, "'>='"),
            TokenKind::LeftParen => write!(f, "'('"),
            TokenKind::RightParen => write!(f, "')'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Question => write!(f, "'?'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::End => write!(f, "end of expression"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Split `source` into tokens. The returned stream always ends with `TokenKind::End`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, FormulaError> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, FormulaError> {
        while let Some(&(start, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
                continue;
            }

            if c.is_ascii_digit() {
                self.number(start)?;
                continue;
            }

            if c.is_alphabetic() || c == '_' {
                self.identifier(start);
                continue;
            }

            self.chars.next();
            let kind = match c {
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' => TokenKind::Star,
                '/' => TokenKind::Slash,
                '(' => TokenKind::LeftParen,
                ')' => TokenKind::RightParen,
                ',' => TokenKind::Comma,
                '?' => TokenKind::Question,
                ':' => TokenKind::Colon,
                '<' if self.eat('=') => TokenKind::LessEqual,
                '<' => TokenKind::Less,
                '>' if self.eat('=') => TokenKind::GreaterEqual,
                '>' => TokenKind::Greater,
                '=' if self.eat('=') => TokenKind::EqualEqual,
                '!' if self.eat('=') => TokenKind::NotEqual,
                other => {
                    return Err(FormulaError::lex(
                        format!("unexpected character '{}'", other),
                        Span::new(start, start + other.len_utf8()),
                        self.source,
                    ));
                }
            };
            let end = self.offset();
            self.push(kind, start, end);
        }

        let end = self.source.len();
        self.push(TokenKind::End, end, end);
        Ok(self.tokens)
    }

    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map(|&(i, _)| i)
            .unwrap_or(self.source.len())
    }

    fn eat(&mut self, expected: char) -> bool {
        if matches!(self.chars.peek(), Some(&(_, c)) if c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.tokens.push(Token {
            kind,
            span: Span::new(start, end),
        });
    }

    fn number(&mut self, start: usize) -> Result<(), FormulaError> {
        let mut seen_dot = false;
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                self.chars.next();
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                self.chars.next();
            } else {
                break;
            }
        }
        let end = self.offset();
        let text = &self.source[start..end];
        let digits = text.strip_suffix('.').unwrap_or(text);
        let value = Decimal::from_str(digits).map_err(|_| {
            FormulaError::lex(
                format!("invalid number literal '{}'", text),
                Span::new(start, end),
                self.source,
            )
        })?;
        self.push(TokenKind::Number(value), start, end);
        Ok(())
    }

    fn identifier(&mut self, start: usize) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' || c == '.' {
                self.chars.next();
            } else {
                break;
            }
        }
        let end = self.offset();
        let name = self.source[start..end].to_string();
        self.push(TokenKind::Identifier(name), start, end);
    }
}
