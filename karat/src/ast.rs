//! Expression tree types
//!
//! This module contains the tree produced by the parser and walked by the evaluator:
//! - `Span` for tracking byte ranges inside an expression string
//! - `Expression` / `ExpressionKind` for the nodes themselves
//! - the operator enums shared by parser, evaluator and trace rendering

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Byte range inside a single expression string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A parsed expression node with the span it was read from
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
}

impl Expression {
    pub fn new(kind: ExpressionKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of expression node
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Number(Decimal),
    Variable(String),
    Unary(UnaryOperator, Box<Expression>),
    Arithmetic(Box<Expression>, ArithmeticOperation, Box<Expression>),
    Comparison(Box<Expression>, ComparisonOperator, Box<Expression>),
    /// `condition ? then : else`
    Conditional(Box<Expression>, Box<Expression>, Box<Expression>),
    /// Function name as written, plus argument expressions
    Call(String, Vec<Expression>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Plus,
    Minus,
}

/// Arithmetic operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOperation {
    /// Returns a human-readable name for the operation
    pub fn name(&self) -> &'static str {
        match self {
            ArithmeticOperation::Add => "addition",
            ArithmeticOperation::Subtract => "subtraction",
            ArithmeticOperation::Multiply => "multiplication",
            ArithmeticOperation::Divide => "division",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOperation::Add => "+",
            ArithmeticOperation::Subtract => "-",
            ArithmeticOperation::Multiply => "*",
            ArithmeticOperation::Divide => "/",
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl ComparisonOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessThanOrEqual => "<=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterThanOrEqual => ">=",
        }
    }

    /// `==` and `!=` are the only operators defined on booleans
    pub fn is_equality(&self) -> bool {
        matches!(self, ComparisonOperator::Equal | ComparisonOperator::NotEqual)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExpressionKind::Number(n) => write!(f, "{}", n),
            ExpressionKind::Variable(name) => write!(f, "{}", name),
            ExpressionKind::Unary(UnaryOperator::Plus, operand) => write!(f, "+{}", operand),
            ExpressionKind::Unary(UnaryOperator::Minus, operand) => write!(f, "-{}", operand),
            ExpressionKind::Arithmetic(left, op, right) => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            ExpressionKind::Comparison(left, op, right) => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            ExpressionKind::Conditional(condition, then, otherwise) => {
                write!(f, "({} ? {} : {})", condition, then, otherwise)
            }
            ExpressionKind::Call(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
