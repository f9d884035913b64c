//! Formula definitions: typed structure and loader
//!
//! A definition is JSON of the shape
//!
//! ```text
//! {
//!   "vars":   { "<name>": <number>, ... },
//!   "steps":  [ { "op": "set" | "calc", "var": "<name>", "value"?: <number>, "expr"?: "<string>" }, ... ],
//!   "output": { "<outputKey>": "<variableName>", ... }
//! }
//! ```
//!
//! Field names and `op` values are matched case-insensitively. Everything is
//! checked here, once, so an invalid definition never runs a single step.

use crate::ast::Expression;
use crate::case_map::CaseInsensitiveMap;
use crate::error::FormulaError;
use crate::parser::parse_expression;
use crate::resource_limits::ResourceLimits;
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Output keys a definition must map
pub const MANDATORY_OUTPUTS: [&str; 2] = ["gram", "laborGross"];

/// A validated formula definition
///
/// Immutable once loaded and safe to share between threads; every
/// evaluation builds its own environment.
#[derive(Debug, Clone)]
pub struct FormulaDefinition {
    vars: CaseInsensitiveMap<Decimal>,
    steps: Vec<Step>,
    output: CaseInsensitiveMap<String>,
}

/// One assignment in a definition
#[derive(Debug, Clone)]
pub enum Step {
    /// Store a literal
    Set { var: String, value: Decimal },
    /// Store the numeric result of an expression
    Calc(CalcStep),
}

impl Step {
    /// Target variable name
    pub fn var(&self) -> &str {
        match self {
            Step::Set { var, .. } => var,
            Step::Calc(calc) => &calc.var,
        }
    }

    pub fn op_name(&self) -> &'static str {
        match self {
            Step::Set { .. } => "set",
            Step::Calc(_) => "calc",
        }
    }
}

/// A `calc` step. The expression is parsed on first use and kept for later evaluations.
#[derive(Debug, Clone)]
pub struct CalcStep {
    pub var: String,
    pub expr: Arc<str>,
    max_depth: usize,
    parsed: OnceLock<Expression>,
}

impl CalcStep {
    pub fn new(var: impl Into<String>, expr: &str, limits: &ResourceLimits) -> Self {
        Self {
            var: var.into(),
            expr: Arc::from(expr),
            max_depth: limits.max_expression_depth,
            parsed: OnceLock::new(),
        }
    }

    /// Parsed tree for this step's expression
    pub fn expression(&self) -> Result<&Expression, FormulaError> {
        if let Some(expr) = self.parsed.get() {
            return Ok(expr);
        }
        let limits = ResourceLimits {
            max_expression_depth: self.max_depth,
            ..ResourceLimits::default()
        };
        let parsed = parse_expression(&self.expr, &limits)?;
        // Another thread may have won the race; both trees are identical.
        Ok(self.parsed.get_or_init(|| parsed))
    }
}

impl FormulaDefinition {
    /// Parse and validate definition text
    pub fn parse(text: &str, limits: &ResourceLimits) -> Result<Self, FormulaError> {
        let value: Value = serde_json::from_str(text).map_err(|e| {
            FormulaError::definition(format!("definition is not valid JSON: {}", e))
        })?;
        Self::from_json(&value, limits)
    }

    /// Validate an already-decoded JSON definition
    pub fn from_json(value: &Value, limits: &ResourceLimits) -> Result<Self, FormulaError> {
        let object = value
            .as_object()
            .ok_or_else(|| FormulaError::definition("definition must be a JSON object"))?;
        let fields = fields_of(object);

        let vars = match fields.get("vars").copied() {
            None | Some(Value::Null) => CaseInsensitiveMap::new(),
            Some(Value::Object(map)) => load_vars(map)?,
            Some(_) => {
                return Err(FormulaError::definition(
                    "'vars' must be an object mapping names to numbers",
                ))
            }
        };

        let raw_steps = match fields.get("steps").copied() {
            Some(Value::Array(items)) => items,
            None | Some(Value::Null) => {
                return Err(FormulaError::definition("definition has no 'steps'"))
            }
            Some(_) => return Err(FormulaError::definition("'steps' must be an array")),
        };
        if raw_steps.is_empty() {
            return Err(FormulaError::definition(
                "'steps' must contain at least one step",
            ));
        }
        if raw_steps.len() > limits.max_steps {
            return Err(FormulaError::definition_with_suggestion(
                format!(
                    "definition has {} steps, more than the limit of {}",
                    raw_steps.len(),
                    limits.max_steps
                ),
                "Combine steps or split the calculation into separate formulas",
            ));
        }

        let steps = raw_steps
            .iter()
            .enumerate()
            .map(|(index, raw)| load_step(index, raw, limits))
            .collect::<Result<Vec<_>, _>>()?;

        let output = match fields.get("output").copied() {
            None | Some(Value::Null) => CaseInsensitiveMap::new(),
            Some(Value::Object(map)) => load_output(map)?,
            Some(_) => {
                return Err(FormulaError::definition(
                    "'output' must be an object mapping output keys to variable names",
                ))
            }
        };

        debug!(
            steps = steps.len(),
            vars = vars.len(),
            outputs = output.len(),
            "loaded formula definition"
        );

        Ok(Self {
            vars,
            steps,
            output,
        })
    }

    pub fn vars(&self) -> &CaseInsensitiveMap<Decimal> {
        &self.vars
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn output(&self) -> &CaseInsensitiveMap<String> {
        &self.output
    }

    /// Fail unless every mandatory output key is mapped
    pub fn check_outputs(&self) -> Result<(), FormulaError> {
        for key in MANDATORY_OUTPUTS {
            if !self.output.contains_key(key) {
                return Err(FormulaError::definition_with_suggestion(
                    format!("'output' does not map the mandatory key '{}'", key),
                    format!("Add \"{}\": \"<variable>\" to 'output'", key),
                ));
            }
        }
        Ok(())
    }

    /// Parse every `calc` expression now instead of on first evaluation
    pub fn compile_expressions(&self) -> Result<(), FormulaError> {
        for (index, step) in self.steps.iter().enumerate() {
            if let Step::Calc(calc) = step {
                calc.expression()
                    .map_err(|e| e.in_step(index, &calc.var, Some(&calc.expr)))?;
            }
        }
        Ok(())
    }
}

fn fields_of(object: &Map<String, Value>) -> CaseInsensitiveMap<&Value> {
    object.iter().map(|(k, v)| (k.as_str(), v)).collect()
}

/// Exact value of a JSON number, read from its literal text.
/// `None` when it does not fit a `Decimal`.
pub(crate) fn decimal_from_json(number: &Number) -> Option<Decimal> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn load_vars(map: &Map<String, Value>) -> Result<CaseInsensitiveMap<Decimal>, FormulaError> {
    let mut vars = CaseInsensitiveMap::with_capacity(map.len());
    for (name, value) in map {
        let number = match value {
            Value::Number(n) => decimal_from_json(n).ok_or_else(|| {
                FormulaError::definition(format!("var '{}' is out of range: {}", name, n))
            })?,
            _ => {
                return Err(FormulaError::definition(format!(
                    "var '{}' must be a number",
                    name
                )))
            }
        };
        vars.insert(name.clone(), number);
    }
    Ok(vars)
}

fn load_step(index: usize, raw: &Value, limits: &ResourceLimits) -> Result<Step, FormulaError> {
    let position = index + 1;
    let object = raw
        .as_object()
        .ok_or_else(|| FormulaError::definition(format!("step {} must be an object", position)))?;
    let fields = fields_of(object);

    let op = match fields.get("op").copied() {
        Some(Value::String(op)) => op.to_lowercase(),
        Some(_) => {
            return Err(FormulaError::definition(format!(
                "step {}: 'op' must be a string",
                position
            )))
        }
        None => return Err(FormulaError::definition(format!("step {} has no 'op'", position))),
    };

    let var = match fields.get("var").copied() {
        Some(Value::String(var)) if !var.trim().is_empty() => var.trim().to_string(),
        _ => {
            return Err(FormulaError::definition(format!(
                "step {} ({}) needs a non-empty 'var'",
                position, op
            )))
        }
    };

    match op.as_str() {
        "set" => {
            let value = match fields.get("value").copied() {
                Some(Value::Number(n)) => decimal_from_json(n).ok_or_else(|| {
                    FormulaError::definition(format!(
                        "step {} sets '{}' to {}, which is out of range",
                        position, var, n
                    ))
                })?,
                _ => {
                    return Err(FormulaError::definition(format!(
                        "step {} sets '{}' but has no numeric 'value'",
                        position, var
                    )))
                }
            };
            Ok(Step::Set { var, value })
        }
        "calc" => {
            let expr = match fields.get("expr").copied() {
                Some(Value::String(expr)) if !expr.trim().is_empty() => expr,
                _ => {
                    return Err(FormulaError::definition(format!(
                        "step {} calculates '{}' but has no 'expr'",
                        position, var
                    )))
                }
            };
            let length = expr.chars().count();
            if length > limits.max_expression_length {
                return Err(FormulaError::definition_with_suggestion(
                    format!(
                        "step {} expression is {} characters, more than the limit of {}",
                        position, length, limits.max_expression_length
                    ),
                    "Split the expression over several calc steps",
                ));
            }
            Ok(Step::Calc(CalcStep::new(var, expr, limits)))
        }
        other => Err(FormulaError::definition_with_suggestion(
            format!("step {} has unknown op '{}'", position, other),
            "Use 'set' or 'calc'",
        )),
    }
}

fn load_output(map: &Map<String, Value>) -> Result<CaseInsensitiveMap<String>, FormulaError> {
    let mut output = CaseInsensitiveMap::with_capacity(map.len());
    for (key, target) in map {
        match target {
            Value::String(name) if !name.trim().is_empty() => {
                output.insert(key.clone(), name.trim().to_string());
            }
            _ => {
                return Err(FormulaError::definition(format!(
                    "output '{}' must name a variable",
                    key
                )))
            }
        }
    }
    Ok(output)
}
