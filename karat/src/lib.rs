//! # Karat Engine
//!
//! **Pricing formulas as configuration**
//!
//! Karat evaluates operator-defined pricing formulas: a few named inputs
//! (amount, gold price, tax rate, ...) go in, and the weight, gold value,
//! labor fee and tax of a precious-metal transaction come out.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use karat::{Context, EvaluationMode, FormulaResult};
//! use rust_decimal::Decimal;
//!
//! fn main() -> FormulaResult<()> {
//!     let definition = r#"{
//!         "steps": [
//!             { "op": "calc", "var": "gram", "expr": "round(Amount / Price)" },
//!             { "op": "calc", "var": "fee", "expr": "Amount - gram * Price" }
//!         ],
//!         "output": { "gram": "gram", "laborGross": "fee" }
//!     }"#;
//!
//!     let context = Context::new()
//!         .with("Amount", Decimal::from(1000))
//!         .with("Price", Decimal::from(2290));
//!
//!     let evaluation = karat::evaluate(definition, &context, EvaluationMode::Commit)?;
//!     println!("{} g", evaluation.result.gram);
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Definitions
//! A definition declares constants (`vars`), an ordered list of `set`/`calc`
//! steps, and an `output` table naming which variable feeds each result field.
//!
//! ### Expressions
//! `calc` steps hold small expressions: `+ - * /`, comparisons, `?:`
//! conditionals and the functions `round`, `min`, `max`, `abs`. Variable names
//! are case-insensitive.
//!
//! ### Modes
//! `Preview` and `Commit` differ only in the precision `round(x)` uses when no
//! precision is given: 3 and 2 digits.

pub mod ast;
pub mod case_map;
pub mod definition;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod parser;
pub mod resource_limits;
pub mod response;
pub mod stock;
pub mod value;

pub use ast::{Expression, ExpressionKind, Span};
pub use definition::{CalcStep, FormulaDefinition, Step};
pub use engine::Engine;
pub use error::{ErrorDetails, ErrorKind, FormulaError, StepLocation};
pub use evaluator::context::{Context, Direction, EvaluationMode, PricingContext};
pub use parser::parse_expression;
pub use resource_limits::ResourceLimits;
pub use response::{Binding, Evaluation, PricingResult, StepTrace};
pub use value::FormulaValue;

/// Result type for formula operations
pub type FormulaResult<T> = Result<T, FormulaError>;

/// Evaluate definition text against `context` with default limits
pub fn evaluate(
    definition_text: &str,
    context: &Context,
    mode: EvaluationMode,
) -> FormulaResult<Evaluation> {
    Engine::new().evaluate(definition_text, context, mode)
}

/// Reject a malformed definition before it is stored
pub fn validate_definition(definition_text: &str) -> FormulaResult<()> {
    Engine::new().validate_definition(definition_text)
}

#[cfg(test)]
mod tests;
