//! Arithmetic and comparison on formula values

use crate::ast::{ArithmeticOperation, ComparisonOperator, Span};
use crate::error::FormulaError;
use crate::value::FormulaValue;
use rust_decimal::Decimal;

/// Checked decimal arithmetic. Never yields NaN or infinity: division by
/// zero and overflow are errors.
pub fn arithmetic_operation(
    left: Decimal,
    op: ArithmeticOperation,
    right: Decimal,
    span: Span,
) -> Result<Decimal, FormulaError> {
    let result = match op {
        ArithmeticOperation::Add => left.checked_add(right),
        ArithmeticOperation::Subtract => left.checked_sub(right),
        ArithmeticOperation::Multiply => left.checked_mul(right),
        ArithmeticOperation::Divide => {
            if right.is_zero() {
                return Err(FormulaError::runtime_at("division by zero", span));
            }
            left.checked_div(right)
        }
    };
    result.ok_or_else(|| FormulaError::runtime_at(format!("overflow in {}", op.name()), span))
}

/// Compare two values.
///
/// If either side is a boolean both are compared as booleans, and only `==`
/// and `!=` are allowed. Otherwise both are compared as numbers.
pub fn comparison_operation(
    left: FormulaValue,
    op: ComparisonOperator,
    right: FormulaValue,
    span: Span,
) -> Result<bool, FormulaError> {
    if left.is_boolean() || right.is_boolean() {
        if !op.is_equality() {
            return Err(FormulaError::runtime_at(
                format!(
                    "operator '{}' is not defined for booleans, only '==' and '!='",
                    op.symbol()
                ),
                span,
            ));
        }
        let equal = left.as_bool() == right.as_bool();
        return Ok(if op == ComparisonOperator::Equal { equal } else { !equal });
    }

    let (l, r) = (left.as_number(), right.as_number());
    Ok(match op {
        ComparisonOperator::Equal => l == r,
        ComparisonOperator::NotEqual => l != r,
        ComparisonOperator::LessThan => l < r,
        ComparisonOperator::LessThanOrEqual => l <= r,
        ComparisonOperator::GreaterThan => l > r,
        ComparisonOperator::GreaterThanOrEqual => l >= r,
    })
}
