use crate::evaluator::context::{Context, EvaluationMode};
use crate::evaluator::Evaluator;
use crate::response::Evaluation;
use crate::{FormulaDefinition, FormulaResult, ResourceLimits};
use tracing::instrument;

/// The formula evaluation engine.
///
/// Holds no state besides its limits, so one engine can serve any number
/// of definitions and threads.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    evaluator: Evaluator,
    limits: ResourceLimits,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom resource limits
    pub fn with_limits(limits: ResourceLimits) -> Self {
        Self {
            evaluator: Evaluator,
            limits,
        }
    }

    /// Get the current resource limits
    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Parse and validate definition text into a reusable definition
    pub fn load_definition(&self, text: &str) -> FormulaResult<FormulaDefinition> {
        FormulaDefinition::parse(text, &self.limits)
    }

    /// Check definition text, including the mandatory outputs, without running any step
    pub fn validate_definition(&self, text: &str) -> FormulaResult<()> {
        self.load_definition(text)?.check_outputs()
    }

    /// Like `validate_definition`, but also parses every expression, so
    /// nothing is left to fail but the arithmetic
    pub fn check_definition(&self, text: &str) -> FormulaResult<FormulaDefinition> {
        let definition = self.load_definition(text)?;
        definition.check_outputs()?;
        definition.compile_expressions()?;
        Ok(definition)
    }

    /// Load `text` and evaluate it in one call
    pub fn evaluate(
        &self,
        text: &str,
        context: &Context,
        mode: EvaluationMode,
    ) -> FormulaResult<Evaluation> {
        let definition = self.load_definition(text)?;
        self.evaluate_definition(&definition, context, mode)
    }

    /// Evaluate an already-loaded definition
    #[instrument(level = "debug", skip_all, fields(%mode, steps = definition.steps().len()))]
    pub fn evaluate_definition(
        &self,
        definition: &FormulaDefinition,
        context: &Context,
        mode: EvaluationMode,
    ) -> FormulaResult<Evaluation> {
        self.evaluator.evaluate(definition, context, mode)
    }
}
