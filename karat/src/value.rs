use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// A value produced while evaluating an expression
///
/// Numbers and booleans convert into each other on demand, so a stored
/// comparison result can be reused arithmetically and a number can serve
/// as a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum FormulaValue {
    Number(Decimal),
    Boolean(bool),
}

impl FormulaValue {
    /// `true` is 1, `false` is 0
    pub fn as_number(&self) -> Decimal {
        match self {
            FormulaValue::Number(n) => *n,
            FormulaValue::Boolean(true) => Decimal::ONE,
            FormulaValue::Boolean(false) => Decimal::ZERO,
        }
    }

    /// Any nonzero number is `true`
    pub fn as_bool(&self) -> bool {
        match self {
            FormulaValue::Number(n) => !n.is_zero(),
            FormulaValue::Boolean(b) => *b,
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, FormulaValue::Boolean(_))
    }
}

impl From<Decimal> for FormulaValue {
    fn from(value: Decimal) -> Self {
        FormulaValue::Number(value)
    }
}

impl From<bool> for FormulaValue {
    fn from(value: bool) -> Self {
        FormulaValue::Boolean(value)
    }
}

impl fmt::Display for FormulaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaValue::Number(n) => write!(f, "{}", n),
            FormulaValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}
