use karat::stock;
use karat::*;
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn sale(amount: &str) -> PricingContext {
    PricingContext::new(dec(amount), dec("2500"), dec("0.20"))
}

#[test]
fn test_22k_sale_splits_amount() {
    let engine = Engine::new();
    let evaluation = engine
        .evaluate(
            stock::GOLD_22K_SALE.definition,
            &sale("1000").into(),
            EvaluationMode::Commit,
        )
        .unwrap();

    let result = evaluation.result;
    assert_eq!(result.gram, dec("0.43"));
    assert_eq!(result.gold_service + result.labor_gross, result.amount);
    assert_eq!(result.labor_net + result.vat, result.labor_gross);
}

#[test]
fn test_18k_sale() {
    let evaluation = karat::evaluate(
        stock::GOLD_18K_SALE.definition,
        &sale("1000").into(),
        EvaluationMode::Commit,
    )
    .unwrap();

    let result = evaluation.result;
    assert_eq!(result.unit_has_price_used, dec("1875.00"));
    assert_eq!(result.gram, dec("0.53"));
    assert_eq!(result.gold_service, dec("993.75"));
    assert_eq!(result.labor_gross, dec("6.25"));
    assert_eq!(result.labor_net, dec("5.21"));
    assert_eq!(result.vat, dec("1.04"));
}

#[test]
fn test_18k_sale_with_zero_price_is_guarded() {
    let mut pricing = sale("1000");
    pricing.gold_price = Decimal::ZERO;
    let evaluation = karat::evaluate(
        stock::GOLD_18K_SALE.definition,
        &pricing.into(),
        EvaluationMode::Commit,
    )
    .unwrap();

    assert_eq!(evaluation.result.gram, Decimal::ZERO);
    assert_eq!(evaluation.result.gold_service, Decimal::ZERO);
    assert_eq!(evaluation.result.labor_gross, dec("1000.00"));
}

#[test]
fn test_22k_sale_with_zero_price_divides_by_zero() {
    let mut pricing = sale("1000");
    pricing.gold_price = Decimal::ZERO;
    let err = karat::evaluate(
        stock::GOLD_22K_SALE.definition,
        &pricing.into(),
        EvaluationMode::Commit,
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Runtime);
    assert_eq!(err.message(), "division by zero");
    let step = err.step().unwrap();
    assert_eq!(step.var, "gram");
    assert_eq!(step.index, 3);
}

#[test]
fn test_24k_purchase_has_no_labor() {
    let mut pricing = sale("1000");
    pricing.direction = Direction::Buy;
    let evaluation = karat::evaluate(
        stock::GOLD_24K_PURCHASE.definition,
        &pricing.into(),
        EvaluationMode::Commit,
    )
    .unwrap();

    let result = evaluation.result;
    assert_eq!(result.unit_has_price_used, dec("2487.50"));
    assert_eq!(result.gram, dec("0.40"));
    assert_eq!(result.gold_service, dec("995.00"));
    assert_eq!(result.amount, dec("995.00"));
    assert_eq!(result.labor_gross, Decimal::ZERO);
    assert_eq!(result.labor_net, Decimal::ZERO);
    assert_eq!(result.vat, Decimal::ZERO);
}

#[test]
fn test_fixed_weight_product() {
    let mut pricing = sale("12000");
    pricing.product_gram = Some(dec("5"));
    let evaluation = karat::evaluate(
        stock::FIXED_WEIGHT_PRODUCT.definition,
        &pricing.into(),
        EvaluationMode::Commit,
    )
    .unwrap();

    let result = evaluation.result;
    assert_eq!(result.gram, dec("5"));
    assert_eq!(result.gold_service, dec("11450.00"));
    assert_eq!(result.labor_gross, dec("550.00"));
    assert_eq!(result.labor_net, dec("458.33"));
    assert_eq!(result.vat, dec("91.67"));
    // amount is not mapped, so the context amount is reported
    assert_eq!(result.amount, dec("12000"));
}

#[test]
fn test_fixed_weight_product_needs_a_weight() {
    let err = karat::evaluate(
        stock::FIXED_WEIGHT_PRODUCT.definition,
        &sale("12000").into(),
        EvaluationMode::Commit,
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Runtime);
    assert_eq!(err.message(), "unknown variable: Product.Gram");
    assert_eq!(err.step().map(|s| s.index), Some(0));
}

#[test]
fn test_price_override_replaces_gold_price() {
    let mut pricing = sale("1000");
    pricing.price_override = Some(dec("3000"));
    let evaluation = karat::evaluate(
        stock::GOLD_22K_SALE.definition,
        &pricing.into(),
        EvaluationMode::Commit,
    )
    .unwrap();
    assert_eq!(evaluation.result.unit_has_price_used, dec("2748.00"));
}

#[test]
fn test_stock_formulas_all_validate() {
    for formula in stock::ALL {
        assert!(
            karat::validate_definition(formula.definition).is_ok(),
            "{} should validate",
            formula.name
        );
    }
    assert_eq!(stock::find("GOLD-22K-SALE").map(|f| f.name), Some("gold-22k-sale"));
    assert!(stock::find("silver").is_none());
}

#[test]
fn test_context_from_json() {
    let context: Context =
        serde_json::from_str(r#"{ "Amount": 1000, "SellPrice": "2500", "TaxRate": 0.2 }"#).unwrap();
    assert_eq!(context.amount(), dec("1000"));

    let evaluation = karat::evaluate(
        stock::GOLD_22K_SALE.definition,
        &context,
        EvaluationMode::Commit,
    )
    .unwrap();
    assert_eq!(evaluation.result.labor_gross, dec("15.30"));
}

#[test]
fn test_evaluation_serializes_camel_case() {
    let evaluation = karat::evaluate(
        stock::GOLD_22K_SALE.definition,
        &sale("1000").into(),
        EvaluationMode::Preview,
    )
    .unwrap();
    let json = serde_json::to_value(&evaluation).unwrap();

    assert_eq!(json["mode"], "preview");
    assert!(json["result"].get("laborGross").is_some());
    assert!(json["result"].get("unitHasPriceUsed").is_some());
    assert_eq!(json["trace"].as_array().map(Vec::len), Some(8));
}
