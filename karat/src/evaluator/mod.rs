//! Step runtime
//!
//! Evaluates a formula definition by:
//! 1. Seeding an environment from the caller's context, then the definition's `vars`
//! 2. Executing steps strictly in order
//! 3. Resolving the output fields from the final environment

pub mod context;
pub mod expression;
pub mod functions;
pub mod operations;
pub mod output;

use crate::definition::{FormulaDefinition, Step};
use crate::error::FormulaError;
use crate::response::{Binding, Evaluation, StepTrace};
use crate::value::FormulaValue;
use context::{Context, Environment, EvaluationContext, EvaluationMode};
use expression::evaluate_expression;
use tracing::{debug, trace};

/// Runs formula definitions against a context
#[derive(Debug, Default, Clone, Copy)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(
        &self,
        definition: &FormulaDefinition,
        context: &Context,
        mode: EvaluationMode,
    ) -> Result<Evaluation, FormulaError> {
        definition.check_outputs()?;

        let mut eval_context = EvaluationContext::new(seed_environment(definition, context), mode);
        let trace = run_steps(definition, &mut eval_context)?;
        let result =
            output::resolve_outputs(definition.output(), &eval_context.environment, context)?;

        let bindings = eval_context
            .environment
            .iter()
            .map(|(name, value)| Binding {
                name: name.to_string(),
                value: value.as_number(),
            })
            .collect();

        Ok(Evaluation {
            mode,
            result,
            bindings,
            trace,
        })
    }
}

/// Context values first, then declared vars for names the context left unbound
pub fn seed_environment(definition: &FormulaDefinition, context: &Context) -> Environment {
    let mut environment = Environment::new();
    for (name, value) in context.values() {
        environment.set(name, FormulaValue::Number(*value));
    }
    for (name, value) in definition.vars().iter() {
        if !environment.set_if_absent(name, FormulaValue::Number(*value)) {
            trace!(var = name, "declared var shadowed by context value");
        }
    }
    trace!(bindings = environment.len(), "seeded environment");
    environment
}

/// Execute every step in order, each seeing the results of the ones before it
pub fn run_steps(
    definition: &FormulaDefinition,
    context: &mut EvaluationContext,
) -> Result<Vec<StepTrace>, FormulaError> {
    let mut trace = Vec::with_capacity(definition.steps().len());

    for (index, step) in definition.steps().iter().enumerate() {
        let (value, expr) = match step {
            Step::Set { value, .. } => (*value, None),
            Step::Calc(calc) => {
                let value = calc
                    .expression()
                    .and_then(|tree| evaluate_expression(tree, &*context))
                    .map_err(|e| e.in_step(index, &calc.var, Some(&calc.expr)))?
                    .as_number();
                (value, Some(calc.expr.to_string()))
            }
        };

        context
            .environment
            .set(step.var(), FormulaValue::Number(value));
        debug!(step = index + 1, var = step.var(), %value, "step assigned");

        trace.push(StepTrace {
            index,
            var: step.var().to_string(),
            expr,
            value,
        });
    }

    Ok(trace)
}
