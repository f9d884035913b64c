//! Expression evaluation
//!
//! Recursively evaluates an expression tree against the current environment.

use super::context::EvaluationContext;
use super::functions::call_function;
use super::operations::{arithmetic_operation, comparison_operation};
use crate::ast::{Expression, ExpressionKind, UnaryOperator};
use crate::error::FormulaError;
use crate::value::FormulaValue;

/// Evaluate an expression to a value
///
/// Conditionals evaluate only the branch they select, so
/// `x == 0 ? 0 : 10 / x` never divides by zero.
pub fn evaluate_expression(
    expr: &Expression,
    context: &EvaluationContext,
) -> Result<FormulaValue, FormulaError> {
    match &expr.kind {
        ExpressionKind::Number(n) => Ok(FormulaValue::Number(*n)),

        ExpressionKind::Variable(name) => context.environment.get(name).ok_or_else(|| {
            FormulaError::runtime_at(format!("unknown variable: {}", name), expr.span)
        }),

        ExpressionKind::Unary(op, operand) => {
            let value = evaluate_expression(operand, context)?.as_number();
            Ok(FormulaValue::Number(match op {
                UnaryOperator::Plus => value,
                UnaryOperator::Minus => -value,
            }))
        }

        ExpressionKind::Arithmetic(left, op, right) => {
            let l = evaluate_expression(left, context)?.as_number();
            let r = evaluate_expression(right, context)?.as_number();
            arithmetic_operation(l, *op, r, expr.span).map(FormulaValue::Number)
        }

        ExpressionKind::Comparison(left, op, right) => {
            let l = evaluate_expression(left, context)?;
            let r = evaluate_expression(right, context)?;
            comparison_operation(l, *op, r, expr.span).map(FormulaValue::Boolean)
        }

        ExpressionKind::Conditional(condition, then, otherwise) => {
            if evaluate_expression(condition, context)?.as_bool() {
                evaluate_expression(then, context)
            } else {
                evaluate_expression(otherwise, context)
            }
        }

        ExpressionKind::Call(name, args) => call_function(name, args, expr.span, context),
    }
}
