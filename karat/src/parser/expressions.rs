//! Recursive-descent expression parser
//!
//! Precedence, lowest to highest:
//! ternary → comparison → additive → multiplicative → unary → primary

use super::lexer::{Token, TokenKind};
use crate::ast::{
    ArithmeticOperation, ComparisonOperator, Expression, ExpressionKind, Span, UnaryOperator,
};
use crate::error::FormulaError;

pub(crate) struct ExpressionParser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> ExpressionParser<'a> {
    /// `tokens` must end with `TokenKind::End`, as produced by `tokenize`
    pub(crate) fn new(source: &'a str, tokens: Vec<Token>, max_depth: usize) -> Self {
        Self {
            source,
            tokens,
            position: 0,
            depth: 0,
            max_depth,
        }
    }

    pub(crate) fn parse(mut self) -> Result<Expression, FormulaError> {
        let expr = self.ternary()?;
        let token = self.peek();
        if token.kind != TokenKind::End {
            return Err(self.unexpected(token));
        }
        Ok(expr)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.position].clone();
        if token.kind != TokenKind::End {
            self.position += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, FormulaError> {
        if self.check(&kind) {
            return Ok(self.advance());
        }
        let found = self.peek();
        Err(FormulaError::syntax(
            format!("{}, found {}", message, found.kind),
            found.span,
            self.source,
        ))
    }

    fn unexpected(&self, token: &Token) -> FormulaError {
        let message = match token.kind {
            TokenKind::End => "unexpected end of expression".to_string(),
            TokenKind::RightParen => "unmatched ')'".to_string(),
            ref kind => format!("unexpected {}", kind),
        };
        FormulaError::syntax(message, token.span, self.source)
    }

    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, FormulaError>,
    ) -> Result<T, FormulaError> {
        if self.depth >= self.max_depth {
            return Err(FormulaError::syntax(
                format!(
                    "expression is nested too deeply (limit is {})",
                    self.max_depth
                ),
                self.peek().span,
                self.source,
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// `condition ? then : else`, right-associative
    fn ternary(&mut self) -> Result<Expression, FormulaError> {
        self.nested(|p| {
            let condition = p.comparison()?;
            if !p.check(&TokenKind::Question) {
                return Ok(condition);
            }
            p.advance();
            let then = p.ternary()?;
            p.expect(TokenKind::Colon, "expected ':' in conditional expression")?;
            let otherwise = p.ternary()?;
            let span = condition.span.to(otherwise.span);
            Ok(Expression::new(
                ExpressionKind::Conditional(
                    Box::new(condition),
                    Box::new(then),
                    Box::new(otherwise),
                ),
                span,
            ))
        })
    }

    fn comparison(&mut self) -> Result<Expression, FormulaError> {
        let mut left = self.additive()?;
        while let Some(op) = comparison_operator(&self.peek().kind) {
            self.advance();
            let right = self.additive()?;
            let span = left.span.to(right.span);
            left = Expression::new(
                ExpressionKind::Comparison(Box::new(left), op, Box::new(right)),
                span,
            );
        }
        Ok(left)
    }

    fn additive(&mut self) -> Result<Expression, FormulaError> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => ArithmeticOperation::Add,
                TokenKind::Minus => ArithmeticOperation::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.multiplicative()?;
            left = arithmetic(left, op, right);
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Expression, FormulaError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => ArithmeticOperation::Multiply,
                TokenKind::Slash => ArithmeticOperation::Divide,
                _ => break,
            };
            self.advance();
            let right = self.unary()?;
            left = arithmetic(left, op, right);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expression, FormulaError> {
        let op = match self.peek().kind {
            TokenKind::Plus => UnaryOperator::Plus,
            TokenKind::Minus => UnaryOperator::Minus,
            _ => return self.primary(),
        };
        let start = self.advance().span;
        self.nested(|p| {
            let operand = p.unary()?;
            let span = start.to(operand.span);
            Ok(Expression::new(
                ExpressionKind::Unary(op, Box::new(operand)),
                span,
            ))
        })
    }

    fn primary(&mut self) -> Result<Expression, FormulaError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(n) => Ok(Expression::new(ExpressionKind::Number(n), token.span)),
            TokenKind::Identifier(name) => {
                if self.check(&TokenKind::LeftParen) {
                    self.call(name, token.span)
                } else {
                    Ok(Expression::new(ExpressionKind::Variable(name), token.span))
                }
            }
            TokenKind::LeftParen => {
                let inner = self.ternary()?;
                let close = self.expect(TokenKind::RightParen, "unmatched '(': expected ')'")?;
                Ok(Expression::new(inner.kind, token.span.to(close.span)))
            }
            _ => Err(self.unexpected(&token)),
        }
    }

    fn call(&mut self, name: String, name_span: Span) -> Result<Expression, FormulaError> {
        self.advance();
        let mut args = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                args.push(self.ternary()?);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        let message = format!("expected ')' after arguments to '{}'", name);
        let close = self.expect(TokenKind::RightParen, &message)?;
        Ok(Expression::new(
            ExpressionKind::Call(name, args),
            name_span.to(close.span),
        ))
    }
}

fn comparison_operator(kind: &TokenKind) -> Option<ComparisonOperator> {
    match kind {
        TokenKind::EqualEqual => Some(ComparisonOperator::Equal),
        TokenKind::NotEqual => Some(ComparisonOperator::NotEqual),
        TokenKind::Less => Some(ComparisonOperator::LessThan),
        TokenKind::LessEqual => Some(ComparisonOperator::LessThanOrEqual),
        TokenKind::Greater => Some(ComparisonOperator::GreaterThan),
        TokenKind::GreaterEqual => Some(ComparisonOperator::GreaterThanOrEqual),
        _ => None,
    }
}

fn arithmetic(left: Expression, op: ArithmeticOperation, right: Expression) -> Expression {
    let span = left.span.to(right.span);
    Expression::new(
        ExpressionKind::Arithmetic(Box::new(left), op, Box::new(right)),
        span,
    )
}
