//! Built-in functions: `round`, `min`, `max`, `abs`
//!
//! The set is closed. Names are matched case-insensitively.

use super::context::EvaluationContext;
use super::expression::evaluate_expression;
use crate::ast::{Expression, Span};
use crate::error::FormulaError;
use crate::value::FormulaValue;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::ops::RangeInclusive;

/// Largest scale a `Decimal` can carry
const MAX_PRECISION: u32 = 28;

pub fn call_function(
    name: &str,
    args: &[Expression],
    span: Span,
    context: &EvaluationContext,
) -> Result<FormulaValue, FormulaError> {
    match name.to_lowercase().as_str() {
        "round" => {
            check_arity(name, args, 1..=2, span)?;
            let x = number_arg(&args[0], context)?;
            let precision = match args.get(1) {
                Some(arg) => precision_arg(arg, context)?,
                None => context.default_precision,
            };
            Ok(FormulaValue::Number(round_half_away(x, precision)))
        }
        "min" => {
            check_arity(name, args, 2..=2, span)?;
            let x = number_arg(&args[0], context)?;
            let y = number_arg(&args[1], context)?;
            Ok(FormulaValue::Number(x.min(y)))
        }
        "max" => {
            check_arity(name, args, 2..=2, span)?;
            let x = number_arg(&args[0], context)?;
            let y = number_arg(&args[1], context)?;
            Ok(FormulaValue::Number(x.max(y)))
        }
        "abs" => {
            check_arity(name, args, 1..=1, span)?;
            Ok(FormulaValue::Number(number_arg(&args[0], context)?.abs()))
        }
        _ => Err(FormulaError::runtime_at(
            format!("unknown function: {}", name),
            span,
        )),
    }
}

/// Round to `precision` digits, midpoints away from zero (2.345 → 2.35)
pub fn round_half_away(value: Decimal, precision: u32) -> Decimal {
    value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
}

fn check_arity(
    name: &str,
    args: &[Expression],
    expected: RangeInclusive<usize>,
    span: Span,
) -> Result<(), FormulaError> {
    if expected.contains(&args.len()) {
        return Ok(());
    }
    let wanted = if expected.start() == expected.end() {
        format!("{}", expected.start())
    } else {
        format!("{} or {}", expected.start(), expected.end())
    };
    let noun = if *expected.end() == 1 { "argument" } else { "arguments" };
    Err(FormulaError::runtime_at(
        format!(
            "function '{}' expects {} {}, got {}",
            name,
            wanted,
            noun,
            args.len()
        ),
        span,
    ))
}

fn number_arg(arg: &Expression, context: &EvaluationContext) -> Result<Decimal, FormulaError> {
    Ok(evaluate_expression(arg, context)?.as_number())
}

fn precision_arg(arg: &Expression, context: &EvaluationContext) -> Result<u32, FormulaError> {
    let value = number_arg(arg, context)?;
    value
        .fract()
        .is_zero()
        .then(|| value.to_u32())
        .flatten()
        .filter(|p| *p <= MAX_PRECISION)
        .ok_or_else(|| {
            FormulaError::runtime_at(
                format!(
                    "round precision must be a whole number from 0 to {}, got {}",
                    MAX_PRECISION, value
                ),
                arg.span,
            )
        })
}
