//! Evaluation inputs and per-call state
//!
//! `Context` is what a caller supplies; `Environment` and `EvaluationContext`
//! live for exactly one evaluation call and are dropped afterwards.

use crate::case_map::CaseInsensitiveMap;
use crate::value::FormulaValue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Variable names under which `PricingContext` exposes its fields
pub mod names {
    pub const AMOUNT: &str = "Amount";
    pub const GOLD_PRICE: &str = "HasGoldPrice";
    pub const TAX_RATE: &str = "TaxRate";
    pub const SELL_PRICE: &str = "SellPrice";
    pub const PRODUCT_GRAM: &str = "Product.Gram";
    pub const ACCOUNTING_TYPE: &str = "AccountingType";
    pub const IS_SELL: &str = "IsSell";
    pub const OPERATION_TYPE: &str = "OperationType";
}

/// Selects the precision `round(x)` uses when no precision argument is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Live, non-committed calculation: 3 digits
    Preview,
    /// Result will be persisted: 2 digits
    Commit,
}

impl EvaluationMode {
    pub fn default_precision(&self) -> u32 {
        match self {
            EvaluationMode::Preview => 3,
            EvaluationMode::Commit => 2,
        }
    }
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationMode::Preview => write!(f, "preview"),
            EvaluationMode::Commit => write!(f, "commit"),
        }
    }
}

impl FromStr for EvaluationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "preview" => Ok(EvaluationMode::Preview),
            "commit" => Ok(EvaluationMode::Commit),
            other => Err(format!(
                "unknown evaluation mode '{}' (expected 'preview' or 'commit')",
                other
            )),
        }
    }
}

/// Named input values for one evaluation
///
/// The input amount is tracked separately because it is the default for the
/// `amount` output field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, Decimal>")]
pub struct Context {
    amount: Decimal,
    values: Vec<(String, Decimal)>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value. Binding `Amount` (any casing) also sets the input amount.
    pub fn with(mut self, name: impl Into<String>, value: Decimal) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: Decimal) {
        let name = name.into();
        if name.eq_ignore_ascii_case(names::AMOUNT) {
            self.amount = value;
        }
        self.values.push((name, value));
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Values in the order they were bound
    pub fn values(&self) -> &[(String, Decimal)] {
        &self.values
    }
}

impl From<BTreeMap<String, Decimal>> for Context {
    fn from(map: BTreeMap<String, Decimal>) -> Self {
        map.into_iter()
            .fold(Context::new(), |ctx, (name, value)| ctx.with(name, value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Buy,
    Sell,
}

/// Typed form of the inputs the invoicing side supplies
#[derive(Debug, Clone, PartialEq)]
pub struct PricingContext {
    pub amount: Decimal,
    /// Quoted fine-gold price per gram
    pub gold_price: Decimal,
    pub tax_rate: Decimal,
    /// Explicit sell/buy price; `gold_price` is used when absent
    pub price_override: Option<Decimal>,
    /// Fixed weight of the product, if it has one
    pub product_gram: Option<Decimal>,
    pub accounting_type: i64,
    pub direction: Direction,
    pub operation_type: i64,
}

impl PricingContext {
    pub fn new(amount: Decimal, gold_price: Decimal, tax_rate: Decimal) -> Self {
        Self {
            amount,
            gold_price,
            tax_rate,
            price_override: None,
            product_gram: None,
            accounting_type: 0,
            direction: Direction::Sell,
            operation_type: 0,
        }
    }

    pub fn effective_price(&self) -> Decimal {
        self.price_override.unwrap_or(self.gold_price)
    }
}

impl From<&PricingContext> for Context {
    fn from(pricing: &PricingContext) -> Self {
        let is_sell = match pricing.direction {
            Direction::Sell => Decimal::ONE,
            Direction::Buy => Decimal::ZERO,
        };
        let mut ctx = Context::new()
            .with(names::AMOUNT, pricing.amount)
            .with(names::GOLD_PRICE, pricing.gold_price)
            .with(names::TAX_RATE, pricing.tax_rate)
            .with(names::SELL_PRICE, pricing.effective_price())
            .with(names::ACCOUNTING_TYPE, Decimal::from(pricing.accounting_type))
            .with(names::IS_SELL, is_sell)
            .with(names::OPERATION_TYPE, Decimal::from(pricing.operation_type));
        if let Some(gram) = pricing.product_gram {
            ctx.set(names::PRODUCT_GRAM, gram);
        }
        ctx
    }
}

impl From<PricingContext> for Context {
    fn from(pricing: PricingContext) -> Self {
        Context::from(&pricing)
    }
}

/// Case-insensitive variable bindings for one evaluation
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: CaseInsensitiveMap<FormulaValue>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<FormulaValue> {
        self.bindings.get(name).copied()
    }

    pub fn set(&mut self, name: &str, value: FormulaValue) {
        self.bindings.insert(name, value);
    }

    /// Bind only if no binding exists yet; returns whether it was stored
    pub fn set_if_absent(&mut self, name: &str, value: FormulaValue) -> bool {
        self.bindings.insert_if_absent(name, value)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormulaValue)> {
        self.bindings.iter()
    }
}

/// State needed while evaluating expressions
pub struct EvaluationContext {
    pub environment: Environment,

    /// Used by `round(x)` when the precision argument is omitted
    pub default_precision: u32,
}

impl EvaluationContext {
    pub fn new(environment: Environment, mode: EvaluationMode) -> Self {
        Self {
            environment,
            default_precision: mode.default_precision(),
        }
    }
}
