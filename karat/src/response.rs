use crate::evaluator::context::EvaluationMode;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// The commercial figures a formula produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    /// Weight in grams
    pub gram: Decimal,
    pub amount: Decimal,
    /// Gold-value component of the amount
    pub gold_service: Decimal,
    /// Labor fee including tax
    pub labor_gross: Decimal,
    /// Labor fee excluding tax
    pub labor_net: Decimal,
    pub vat: Decimal,
    /// Per-gram price the calculation used
    pub unit_has_price_used: Decimal,
}

/// A variable as it stood after the last step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub name: String,
    pub value: Decimal,
}

/// Record of one executed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepTrace {
    /// Zero-based position in the definition
    pub index: usize,
    pub var: String,
    /// Expression text of a `calc` step; `None` for `set`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
    pub value: Decimal,
}

impl fmt::Display for StepTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expr {
            Some(expr) => write!(f, "{} = {} => {}", self.var, expr, self.value),
            None => write!(f, "{} = {}", self.var, self.value),
        }
    }
}

/// Everything one successful evaluation produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub mode: EvaluationMode,
    pub result: PricingResult,
    /// Final environment, in the order names were first bound
    pub bindings: Vec<Binding>,
    pub trace: Vec<StepTrace>,
}

impl Evaluation {
    /// Final value of a variable, matched case-insensitively
    pub fn binding(&self, name: &str) -> Option<Decimal> {
        let wanted = name.to_lowercase();
        self.bindings
            .iter()
            .find(|b| b.name.to_lowercase() == wanted)
            .map(|b| b.value)
    }
}
