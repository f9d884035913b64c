use crate::ast::Span;
use crate::error::{ErrorKind, FormulaError};
use std::sync::Arc;

#[test]
fn test_error_display_prefixes() {
    let err = FormulaError::definition("'steps' must be an array");
    assert_eq!(err.to_string(), "Definition error: 'steps' must be an array");

    let err = FormulaError::runtime("output does not map the mandatory key 'gram'");
    assert!(err.to_string().starts_with("Runtime error: "));

    let err = FormulaError::lex("unexpected character '%'", Span::new(2, 3), "a % b");
    assert_eq!(err.to_string(), "Lex error: unexpected character '%' at column 3");
}

#[test]
fn test_error_with_suggestion() {
    let err = FormulaError::definition_with_suggestion("step 1 has unknown op 'mul'", "Use 'set' or 'calc'");
    assert_eq!(err.message(), "step 1 has unknown op 'mul'");
    assert!(err.to_string().contains("(suggestion: Use 'set' or 'calc')"));
}

#[test]
fn test_in_step_attaches_location() {
    let source: Arc<str> = Arc::from("10 / x");
    let err = FormulaError::runtime_at("division by zero", Span::new(0, 6)).in_step(
        3,
        "laborNet",
        Some(&source),
    );

    assert_eq!(err.kind(), ErrorKind::Runtime);
    let step = err.step().unwrap();
    assert_eq!(step.index, 3);
    assert_eq!(step.var, "laborNet");
    assert_eq!(err.details().source_text.as_deref(), Some("10 / x"));
    assert_eq!(
        err.to_string(),
        "Runtime error: division by zero in step 4 'laborNet' at column 1"
    );
}

#[test]
fn test_in_step_keeps_existing_source() {
    let err = FormulaError::syntax("unmatched ')'", Span::new(1, 2), "a)");
    let other: Arc<str> = Arc::from("something else");
    let err = err.in_step(0, "a", Some(&other));
    assert_eq!(err.details().source_text.as_deref(), Some("a)"));
}

#[test]
fn test_kind_display() {
    assert_eq!(ErrorKind::Definition.to_string(), "definition");
    assert_eq!(ErrorKind::Syntax.to_string(), "syntax");
}
