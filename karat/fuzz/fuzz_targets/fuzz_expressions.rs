#![no_main]

use karat::{Context, Engine, EvaluationMode};
use libfuzzer_sys::fuzz_target;
use rust_decimal::Decimal;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let engine = Engine::new();
        let definition = embeddable(s).map(|expr| {
            format!(
                r#"{{ "steps": [ {{ "op": "calc", "var": "out", "expr": "{}" }} ],
                     "output": {{ "gram": "out", "laborGross": "out" }} }}"#,
                expr
            )
        });
        let Some(definition) = definition else {
            return;
        };

        let context = Context::new()
            .with("x", Decimal::from(100))
            .with("y", Decimal::from(50));
        let _ = engine.evaluate(&definition, &context, EvaluationMode::Preview);
    }
});

/// Inputs that can sit inside a JSON string literal unchanged
fn embeddable(s: &str) -> Option<String> {
    if s.contains(['"', '\\']) || s.chars().any(char::is_control) {
        return None;
    }
    Some(s.to_string())
}
