//! Output resolution
//!
//! Maps the final environment onto `PricingResult` through the definition's
//! `output` table.

use super::context::{Context, Environment};
use crate::case_map::CaseInsensitiveMap;
use crate::error::FormulaError;
use crate::response::PricingResult;
use rust_decimal::Decimal;

pub fn resolve_outputs(
    output: &CaseInsensitiveMap<String>,
    environment: &Environment,
    context: &Context,
) -> Result<PricingResult, FormulaError> {
    Ok(PricingResult {
        gram: required(output, environment, "gram")?,
        amount: optional(output, environment, "amount")?.unwrap_or(context.amount()),
        gold_service: optional(output, environment, "goldService")?.unwrap_or_default(),
        labor_gross: required(output, environment, "laborGross")?,
        labor_net: optional(output, environment, "laborNet")?.unwrap_or_default(),
        vat: optional(output, environment, "vat")?.unwrap_or_default(),
        unit_has_price_used: optional(output, environment, "unitHasPriceUsed")?
            .unwrap_or_default(),
    })
}

fn required(
    output: &CaseInsensitiveMap<String>,
    environment: &Environment,
    key: &str,
) -> Result<Decimal, FormulaError> {
    optional(output, environment, key)?.ok_or_else(|| {
        FormulaError::runtime(format!("output does not map the mandatory key '{}'", key))
    })
}

/// `None` when the key is not mapped. A mapped key whose variable was never
/// assigned is an error.
fn optional(
    output: &CaseInsensitiveMap<String>,
    environment: &Environment,
    key: &str,
) -> Result<Option<Decimal>, FormulaError> {
    let Some(var) = output.get(key) else {
        return Ok(None);
    };
    environment
        .get(var)
        .map(|value| Some(value.as_number()))
        .ok_or_else(|| {
            FormulaError::runtime(format!(
                "output '{}' refers to variable '{}', which was never assigned",
                key, var
            ))
        })
}
