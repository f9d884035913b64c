mod error_formatter;
mod formatter;

use anyhow::{anyhow, bail, Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use formatter::Formatter;
use karat::{stock, Context, Engine, EvaluationMode, FormulaError, ResourceLimits};
use rust_decimal::Decimal;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "karat")]
#[command(about = "Pricing formulas as configuration.")]
#[command(
    long_about = "Karat evaluates operator-defined pricing formulas for precious-metal sales and purchases.\nThe CLI lets you run a definition against a context, validate stored definitions and explore the stock formulas."
)]
#[command(version)]
struct Cli {
    /// Log engine activity to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a definition and display the pricing result
    ///
    /// Context values come from --context and from NAME=VALUE pairs; pairs win
    /// when both name the same variable.
    Eval {
        /// Definition file (JSON), or '-' to read it from stdin
        definition: PathBuf,
        /// Context values (format: Name=value)
        ///
        /// Examples: Amount=1000 SellPrice=2500 TaxRate=0.2 Product.Gram=5
        #[arg(value_parser = parse_value_pair)]
        values: Vec<(String, Decimal)>,
        /// JSON file holding an object of context values
        #[arg(short, long)]
        context: Option<PathBuf>,
        /// Evaluation mode; sets the precision of round(x)
        #[arg(short, long, value_enum, default_value_t = Mode::Commit)]
        mode: Mode,
        /// Print the evaluation as JSON
        #[arg(long)]
        json: bool,
        /// Show every executed step and the final bindings
        #[arg(short, long)]
        trace: bool,
    },
    /// Validate a definition file, or every *.json definition under a directory
    Validate {
        path: PathBuf,
        /// Also parse every expression
        #[arg(short, long)]
        strict: bool,
    },
    /// List the stock formulas, or print one of them
    Stock {
        /// Name of the formula to print
        name: Option<String>,
    },
    /// Parse a single expression and print its tree
    CheckExpr {
        expression: String,
        /// Print the token stream as well
        #[arg(long)]
        tokens: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Preview,
    Commit,
}

impl From<Mode> for EvaluationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Preview => EvaluationMode::Preview,
            Mode::Commit => EvaluationMode::Commit,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Eval {
            definition,
            values,
            context,
            mode,
            json,
            trace,
        } => eval_command(
            definition,
            values,
            context.as_deref(),
            (*mode).into(),
            *json,
            *trace,
        ),
        Commands::Validate { path, strict } => validate_command(path, *strict),
        Commands::Stock { name } => stock_command(name.as_deref()),
        Commands::CheckExpr { expression, tokens } => check_expr_command(expression, *tokens),
    };

    if let Err(e) = result {
        if let Some(formula_err) = e.downcast_ref::<FormulaError>() {
            eprintln!("{}", error_formatter::format_error(formula_err));
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("karat=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("karat=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn eval_command(
    definition: &Path,
    values: &[(String, Decimal)],
    context_file: Option<&Path>,
    mode: EvaluationMode,
    json: bool,
    trace: bool,
) -> Result<()> {
    let text = read_definition(definition)?;

    let mut context = match context_file {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("cannot read context file {}", path.display()))?;
            serde_json::from_str::<Context>(&raw)
                .with_context(|| format!("{} is not a JSON object of numbers", path.display()))?
        }
        None => Context::new(),
    };
    for (name, value) in values {
        context.set(name.clone(), *value);
    }

    let evaluation = Engine::new().evaluate(&text, &context, mode)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
    } else {
        print!("{}", Formatter::default().format_evaluation(&evaluation, trace));
    }
    Ok(())
}

fn validate_command(path: &Path, strict: bool) -> Result<()> {
    let engine = Engine::new();
    let check = |text: &str| -> Result<(), FormulaError> {
        if strict {
            engine.check_definition(text).map(|_| ())
        } else {
            engine.validate_definition(text)
        }
    };

    if path.is_file() {
        let text = read_definition(path)?;
        check(&text)?;
        println!("✓ {}", path.display());
        return Ok(());
    }

    let mut checked = 0;
    let mut failed = 0;
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry?;
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        checked += 1;
        let text = fs::read_to_string(entry.path())?;
        match check(&text) {
            Ok(()) => println!("✓ {}", entry.path().display()),
            Err(err) => {
                failed += 1;
                println!("✗ {}", entry.path().display());
                eprintln!("{}", error_formatter::format_error(&err));
            }
        }
    }

    if checked == 0 {
        bail!("no .json definitions found under {}", path.display());
    }
    if failed > 0 {
        bail!("{} of {} definitions are invalid", failed, checked);
    }
    println!();
    println!("{} definitions are valid", checked);
    Ok(())
}

fn stock_command(name: Option<&str>) -> Result<()> {
    match name {
        Some(name) => {
            let formula = stock::find(name).ok_or_else(|| {
                let names: Vec<&str> = stock::ALL.iter().map(|f| f.name).collect();
                anyhow!(
                    "unknown stock formula '{}' (available: {})",
                    name,
                    names.join(", ")
                )
            })?;
            println!("{}", formula.definition);
        }
        None => print!("{}", Formatter::default().format_stock_list(&stock::ALL)),
    }
    Ok(())
}

fn check_expr_command(expression: &str, show_tokens: bool) -> Result<()> {
    let limits = ResourceLimits::default();
    if show_tokens {
        for token in karat::parser::tokenize(expression)? {
            println!("{:>4}..{:<4} {}", token.span.start, token.span.end, token.kind);
        }
    }
    let tree = karat::parse_expression(expression, &limits)?;
    println!("{}", tree);
    Ok(())
}

fn read_definition(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

/// Parse "Name=value" into a context binding
fn parse_value_pair(input: &str) -> Result<(String, Decimal), String> {
    let (name, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected Name=value, got '{}'", input))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in '{}'", input));
    }
    let value = value
        .trim()
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(value.trim()))
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;
    Ok((name.to_string(), value))
}
