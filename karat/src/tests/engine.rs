use super::dec;
use crate::stock;
use crate::{Context, Engine, ErrorKind, EvaluationMode, PricingContext, ResourceLimits};

fn sale_context() -> Context {
    PricingContext::new(dec("1000"), dec("2500"), dec("0.20")).into()
}

#[test]
fn test_evaluate_22k_sale_commit() {
    let engine = Engine::new();
    let evaluation = engine
        .evaluate(
            stock::GOLD_22K_SALE.definition,
            &sale_context(),
            EvaluationMode::Commit,
        )
        .unwrap();

    let result = &evaluation.result;
    assert_eq!(result.gram, dec("0.43"));
    assert_eq!(result.labor_gross, dec("15.30"));
    assert_eq!(result.labor_net, dec("12.75"));
    assert_eq!(result.vat, dec("2.55"));
    assert_eq!(result.gold_service, dec("984.70"));
    assert_eq!(result.amount, dec("1000.00"));
    assert_eq!(result.unit_has_price_used, dec("2290.00"));

    assert_eq!(evaluation.binding("netPrice"), Some(dec("990.00")));
    assert_eq!(evaluation.trace.len(), 8);
    assert_eq!(evaluation.mode, EvaluationMode::Commit);
}

#[test]
fn test_evaluate_22k_sale_preview_uses_three_digits() {
    let evaluation = Engine::new()
        .evaluate(
            stock::GOLD_22K_SALE.definition,
            &sale_context(),
            EvaluationMode::Preview,
        )
        .unwrap();

    let result = &evaluation.result;
    // explicit round(..., 2) calls are unaffected by the mode
    assert_eq!(result.unit_has_price_used, dec("2290.00"));
    assert_eq!(result.gram, dec("0.432"));
    assert_eq!(result.gold_service, dec("989.28"));
    assert_eq!(result.labor_gross, dec("10.72"));
    assert_eq!(result.labor_net, dec("8.933"));
    assert_eq!(result.vat, dec("1.79"));
}

#[test]
fn test_validate_definition() {
    let engine = Engine::new();
    assert!(engine.validate_definition(stock::GOLD_22K_SALE.definition).is_ok());

    let err = engine
        .validate_definition(r#"{ "steps": [ { "op": "mul", "var": "a" } ] }"#)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Definition);
}

#[test]
fn test_validate_requires_mandatory_outputs() {
    let engine = Engine::new();
    let steps_only = r#"{ "steps": [ { "op": "set", "var": "a", "value": 1 } ] }"#;
    let err = engine.validate_definition(steps_only).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Definition);
    assert!(err.message().contains("'gram'"), "got: {}", err.message());
    assert_eq!(
        engine.check_definition(steps_only).unwrap_err().kind(),
        ErrorKind::Definition
    );

    let no_labor = r#"{ "steps": [ { "op": "set", "var": "a", "value": 1 } ],
                        "output": { "gram": "a" } }"#;
    let err = crate::validate_definition(no_labor).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Definition);
    assert!(err.message().contains("'laborGross'"), "got: {}", err.message());
}

#[test]
fn test_engine_limits_apply_to_loading() {
    let engine = Engine::with_limits(ResourceLimits {
        max_expression_length: 10,
        ..ResourceLimits::default()
    });
    assert_eq!(engine.limits().max_expression_length, 10);
    let err = engine
        .validate_definition(stock::GOLD_22K_SALE.definition)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Definition);
}

#[test]
fn test_loaded_definition_is_reusable() {
    let engine = Engine::new();
    let definition = engine.load_definition(stock::GOLD_22K_SALE.definition).unwrap();

    let first = engine
        .evaluate_definition(&definition, &sale_context(), EvaluationMode::Commit)
        .unwrap();
    let second = engine
        .evaluate_definition(&definition, &sale_context(), EvaluationMode::Commit)
        .unwrap();
    assert_eq!(first, second);

    let other: Context = PricingContext::new(dec("2000"), dec("2500"), dec("0.20")).into();
    let third = engine
        .evaluate_definition(&definition, &other, EvaluationMode::Commit)
        .unwrap();
    assert_eq!(third.result.amount, dec("2000.00"));
}

#[test]
fn test_crate_level_entry_points() {
    assert!(crate::validate_definition(stock::GOLD_18K_SALE.definition).is_ok());
    let evaluation = crate::evaluate(
        stock::GOLD_18K_SALE.definition,
        &sale_context(),
        EvaluationMode::Commit,
    )
    .unwrap();
    assert_eq!(evaluation.result.gram, dec("0.53"));
}

#[test]
fn test_check_definition_goes_further_than_validate() {
    let engine = Engine::new();
    let unparsable = r#"{ "steps": [
        { "op": "set", "var": "a", "value": 1 },
        { "op": "calc", "var": "b", "expr": "a +" }
    ], "output": { "gram": "a", "laborGross": "b" } }"#;
    assert!(engine.validate_definition(unparsable).is_ok());
    let err = engine.check_definition(unparsable).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.step().map(|s| s.index), Some(1));

    for formula in stock::ALL {
        assert!(engine.check_definition(formula.definition).is_ok());
    }
}

#[test]
fn test_validation_is_idempotent() {
    let engine = Engine::new();
    let bad = r#"{ "steps": [ { "op": "calc", "var": "a" } ] }"#;
    let first = engine.validate_definition(bad).unwrap_err();
    let second = engine.validate_definition(bad).unwrap_err();
    assert_eq!(first.kind(), second.kind());
    assert_eq!(first.message(), second.message());

    assert!(engine.validate_definition(stock::GOLD_24K_PURCHASE.definition).is_ok());
    assert!(engine.validate_definition(stock::GOLD_24K_PURCHASE.definition).is_ok());
}
