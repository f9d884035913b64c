use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SIMPLE: &str = r#"{
  "vars": { "price": 2290 },
  "steps": [
    { "op": "calc", "var": "gram", "expr": "round(Amount / price)" },
    { "op": "calc", "var": "fee", "expr": "round(Amount - gram * price, 2)" }
  ],
  "output": { "gram": "gram", "laborGross": "fee", "unitHasPriceUsed": "price" }
}"#;

fn karat() -> Command {
    Command::cargo_bin("karat").unwrap()
}

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_cli_eval_with_values() {
    let temp_dir = TempDir::new().unwrap();
    let definition = write(&temp_dir, "simple.json", SIMPLE);

    karat()
        .arg("eval")
        .arg(&definition)
        .arg("Amount=1000")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mode: commit"))
        .stdout(predicate::str::contains("0.44"))
        .stdout(predicate::str::contains("-7.60"));
}

#[test]
fn test_cli_eval_preview_mode() {
    let temp_dir = TempDir::new().unwrap();
    let definition = write(&temp_dir, "simple.json", SIMPLE);

    karat()
        .arg("eval")
        .arg(&definition)
        .arg("Amount=1000")
        .args(["--mode", "preview"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mode: preview"))
        .stdout(predicate::str::contains("0.437"));
}

#[test]
fn test_cli_eval_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let definition = write(&temp_dir, "simple.json", SIMPLE);

    let output = karat()
        .arg("eval")
        .arg(&definition)
        .arg("Amount=1000")
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["mode"], "commit");
    assert_eq!(json["result"]["gram"], "0.44");
    assert_eq!(json["result"]["unitHasPriceUsed"], "2290");
    assert_eq!(json["trace"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_cli_eval_context_file_and_override() {
    let temp_dir = TempDir::new().unwrap();
    let definition = write(&temp_dir, "simple.json", SIMPLE);
    let context = write(&temp_dir, "context.json", r#"{ "Amount": 5000, "TaxRate": 0.2 }"#);

    karat()
        .arg("eval")
        .arg(&definition)
        .arg("--context")
        .arg(&context)
        .arg("amount=1000")
        .arg("--trace")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. gram = round(Amount / price)"))
        .stdout(predicate::str::contains("Variable"))
        .stdout(predicate::str::contains("1_000"));
}

#[test]
fn test_cli_eval_stdin() {
    karat()
        .args(["eval", "-", "Amount=2290"])
        .write_stdin(SIMPLE)
        .assert()
        .success()
        .stdout(predicate::str::contains("gram"));
}

#[test]
fn test_cli_eval_runtime_error() {
    let temp_dir = TempDir::new().unwrap();
    let definition = write(&temp_dir, "simple.json", SIMPLE);

    karat()
        .arg("eval")
        .arg(&definition)
        .arg("Amount=1000")
        .arg("price=0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Runtime error: division by zero"))
        .stderr(predicate::str::contains("in step 1 'gram'"));
}

#[test]
fn test_cli_eval_missing_variable() {
    let temp_dir = TempDir::new().unwrap();
    let definition = write(&temp_dir, "simple.json", SIMPLE);

    karat()
        .arg("eval")
        .arg(&definition)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown variable: Amount"));
}

#[test]
fn test_cli_eval_rejects_bad_pair() {
    let temp_dir = TempDir::new().unwrap();
    let definition = write(&temp_dir, "simple.json", SIMPLE);

    karat()
        .arg("eval")
        .arg(&definition)
        .arg("Amount")
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected Name=value"));
}

const UNPARSED: &str = r#"{
  "steps": [ { "op": "calc", "var": "x", "expr": "1 +" } ],
  "output": { "gram": "x", "laborGross": "x" }
}"#;

#[test]
fn test_cli_validate_directory() {
    let temp_dir = TempDir::new().unwrap();
    write(&temp_dir, "a.json", SIMPLE);
    write(&temp_dir, "b.json", UNPARSED);
    write(&temp_dir, "notes.txt", "not a definition");

    karat()
        .arg("validate")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 definitions are valid"));
}

#[test]
fn test_cli_validate_requires_outputs() {
    let temp_dir = TempDir::new().unwrap();
    write(&temp_dir, "a.json", SIMPLE);
    write(&temp_dir, "b.json", r#"{ "steps": [ { "op": "set", "var": "x", "value": 1 } ] }"#);

    karat()
        .arg("validate")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("✗"))
        .stderr(predicate::str::contains("mandatory key 'gram'"))
        .stderr(predicate::str::contains("1 of 2 definitions are invalid"));
}

#[test]
fn test_cli_validate_strict_parses_expressions() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(&temp_dir, "b.json", UNPARSED);

    karat()
        .arg("validate")
        .arg(&path)
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected end of expression"));
}

#[test]
fn test_cli_validate_single_file_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(
        &temp_dir,
        "bad.json",
        r#"{ "steps": [ { "op": "mul", "var": "x", "value": 1 } ] }"#,
    );

    karat()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Definition error: step 1 has unknown op 'mul'"))
        .stderr(predicate::str::contains("help: Use 'set' or 'calc'"));
}

#[test]
fn test_cli_stock_list_and_print() {
    karat()
        .arg("stock")
        .assert()
        .success()
        .stdout(predicate::str::contains("gold-22k-sale"))
        .stdout(predicate::str::contains("fixed-weight"));

    karat()
        .args(["stock", "gold-24k-purchase"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"purity\": 0.995"));

    karat()
        .args(["stock", "platinum"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown stock formula 'platinum'"));
}

#[test]
fn test_cli_stock_formula_evaluates() {
    let stock = karat().args(["stock", "gold-22k-sale"]).output().unwrap();
    assert!(stock.status.success());

    karat()
        .args(["eval", "-", "Amount=1000", "SellPrice=2500", "TaxRate=0.2"])
        .write_stdin(stock.stdout)
        .assert()
        .success()
        .stdout(predicate::str::contains("15.30"))
        .stdout(predicate::str::contains("984.70"));
}

#[test]
fn test_cli_check_expr() {
    karat()
        .args(["check-expr", "a + b * 2 > 3 ? 1 : 0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(((a + (b * 2)) > 3) ? 1 : 0)"));

    karat()
        .args(["check-expr", "--tokens", "round(x, 2)"])
        .assert()
        .success()
        .stdout(predicate::str::contains("identifier 'round'"))
        .stdout(predicate::str::contains("end of expression"));
}

#[test]
fn test_cli_check_expr_lex_error() {
    karat()
        .args(["check-expr", "a % b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected character '%'"));
}
