//! Expression front end: tokenizer and recursive-descent parser

use crate::ast::Expression;
use crate::error::FormulaError;
use crate::resource_limits::ResourceLimits;

pub mod expressions;
pub mod lexer;

pub use lexer::{tokenize, Token, TokenKind};

/// Tokenize and parse a single `calc` expression
pub fn parse_expression(source: &str, limits: &ResourceLimits) -> Result<Expression, FormulaError> {
    let tokens = tokenize(source)?;
    expressions::ExpressionParser::new(source, tokens, limits.max_expression_depth).parse()
}
