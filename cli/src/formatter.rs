use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Row, Table};
use karat::stock::StockFormula;
use karat::{Binding, Evaluation, PricingResult, StepTrace};
use rust_decimal::Decimal;

enum LineType {
    Step,
    Result,
    LastStep,
    LastResult,
}

impl LineType {
    fn format_line(&self, content: &str) -> String {
        let symbol = match self {
            LineType::Step => "├─",
            LineType::Result => "│  └─ =",
            LineType::LastStep => "└─",
            LineType::LastResult => "   └─ =",
        };
        format!("{} {}\n", symbol, content)
    }
}

pub struct Formatter {}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self {}
    }

    pub fn format_evaluation(&self, evaluation: &Evaluation, show_trace: bool) -> String {
        let mut output = String::new();
        output.push_str(&format!("Mode: {}\n", evaluation.mode));
        output.push_str(&self.format_result_table(&evaluation.result));
        output.push('\n');

        if show_trace {
            output.push('\n');
            output.push_str(&self.format_trace(&evaluation.trace));
            output.push('\n');
            output.push_str(&self.format_bindings_table(&evaluation.bindings));
            output.push('\n');
        }

        output
    }

    fn format_result_table(&self, result: &PricingResult) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(vec![
            Cell::new("Output").set_alignment(CellAlignment::Left),
            Cell::new("Value").set_alignment(CellAlignment::Right),
        ]));

        let rows = [
            ("gram", result.gram),
            ("amount", result.amount),
            ("goldService", result.gold_service),
            ("laborGross", result.labor_gross),
            ("laborNet", result.labor_net),
            ("vat", result.vat),
            ("unitHasPriceUsed", result.unit_has_price_used),
        ];
        for (name, value) in rows {
            table.add_row(Row::from(vec![
                Cell::new(name),
                Cell::new(format_number(value)).set_alignment(CellAlignment::Right),
            ]));
        }

        table.to_string()
    }

    fn format_trace(&self, trace: &[StepTrace]) -> String {
        let mut content = String::new();
        for (position, step) in trace.iter().enumerate() {
            let last = position + 1 == trace.len();
            let (step_line, result_line) = if last {
                (LineType::LastStep, LineType::LastResult)
            } else {
                (LineType::Step, LineType::Result)
            };

            let title = match &step.expr {
                Some(expr) => format!("{}. {} = {}", step.index + 1, step.var, expr),
                None => format!("{}. {} (set)", step.index + 1, step.var),
            };
            content.push_str(&step_line.format_line(&title));
            content.push_str(&result_line.format_line(&format_number(step.value)));
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.add_row(Row::from(vec![Cell::new("Steps")]));
        let content = content.trim_end();
        if !content.is_empty() {
            table.add_row(Row::from(vec![Cell::new(content)]));
        }
        table.to_string()
    }

    fn format_bindings_table(&self, bindings: &[Binding]) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(vec![
            Cell::new("Variable").set_alignment(CellAlignment::Left),
            Cell::new("Value").set_alignment(CellAlignment::Right),
        ]));
        for binding in bindings {
            table.add_row(Row::from(vec![
                Cell::new(&binding.name),
                Cell::new(format_number(binding.value)).set_alignment(CellAlignment::Right),
            ]));
        }
        table.to_string()
    }

    pub fn format_stock_list(&self, formulas: &[StockFormula]) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(vec!["Name", "Description"]));
        for formula in formulas {
            table.add_row(Row::from(vec![formula.name, formula.description]));
        }
        format!("{}\n", table)
    }
}

/// Digits grouped in thousands with '_' so large amounts stay readable
fn format_number(value: Decimal) -> String {
    let text = value.to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('_');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use karat::{Context, EvaluationMode};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_evaluation() -> Evaluation {
        let definition = r#"{
            "steps": [
                { "op": "set", "var": "price", "value": 2290 },
                { "op": "calc", "var": "gram", "expr": "round(Amount / price)" },
                { "op": "calc", "var": "fee", "expr": "Amount - gram * price" }
            ],
            "output": { "gram": "gram", "laborGross": "fee", "unitHasPriceUsed": "price" }
        }"#;
        let context = Context::new().with("Amount", dec("1000"));
        karat::evaluate(definition, &context, EvaluationMode::Commit).unwrap()
    }

    #[test]
    fn test_number_thousand_separators() {
        assert_eq!(format_number(dec("1000000")), "1_000_000");
        assert_eq!(format_number(dec("12345.67")), "12_345.67");
        assert_eq!(format_number(dec("-984.70")), "-984.70");
        assert_eq!(format_number(dec("0.43")), "0.43");
    }

    #[test]
    fn test_result_table_lists_every_output() {
        let output = Formatter::new().format_evaluation(&sample_evaluation(), false);
        assert!(output.contains("Mode: commit"));
        for name in ["gram", "goldService", "laborGross", "laborNet", "vat", "unitHasPriceUsed"] {
            assert!(output.contains(name), "missing {}", name);
        }
        assert!(output.contains("0.44"));
        assert!(output.contains("2_290"));
        assert!(!output.contains("Steps"));
    }

    #[test]
    fn test_trace_formatting() {
        let output = Formatter::new().format_evaluation(&sample_evaluation(), true);
        assert!(output.contains("├─ 1. price (set)"));
        assert!(output.contains("├─ 2. gram = round(Amount / price)"));
        assert!(output.contains("└─ 3. fee = Amount - gram * price"));
        assert!(output.contains("Variable"));
        let step_one = output.find("1. price").unwrap();
        let step_three = output.find("3. fee").unwrap();
        assert!(step_one < step_three);
    }

    #[test]
    fn test_stock_list() {
        let output = Formatter::new().format_stock_list(&karat::stock::ALL);
        for formula in karat::stock::ALL {
            assert!(output.contains(formula.name));
        }
    }
}
