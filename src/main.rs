use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use calcpad::calculator::{
    CalcResult, MevalEvaluator, format_result, prepare_expression, to_fraction,
};
use calcpad::input::{format_for_display, rewrite_operators};
use calcpad::solvers::{
    self, Approach, InfinityDirection, LimitOutcome, RegressionModel, TvmInputs, TvmVariable,
};
use calcpad::{AngleMode, Config, History, HistoryEntry, Keypad, evaluate_expression};

#[derive(Parser)]
#[command(name = "calcpad", version, about = "Scientific calculator and numerical solvers")]
struct Cli {
    /// Path to a config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Angle mode for trigonometric functions
    #[arg(long, global = true)]
    angle: Option<AngleMode>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate an expression
    Eval {
        expression: String,
        /// Also print the result as a fraction
        #[arg(long)]
        fraction: bool,
    },
    /// Type keypad tokens one by one, then evaluate
    Keys {
        #[arg(allow_hyphen_values = true)]
        tokens: Vec<String>,
    },
    /// Show how an expression is rewritten before evaluation
    Rewrite { expression: String },
    /// Solve ax² + bx + c = 0
    Quadratic {
        #[arg(allow_negative_numbers = true)]
        a: f64,
        #[arg(allow_negative_numbers = true)]
        b: f64,
        #[arg(allow_negative_numbers = true)]
        c: f64,
    },
    /// Solve ax³ + bx² + cx + d = 0
    Cubic {
        #[arg(allow_negative_numbers = true)]
        a: f64,
        #[arg(allow_negative_numbers = true)]
        b: f64,
        #[arg(allow_negative_numbers = true)]
        c: f64,
        #[arg(allow_negative_numbers = true)]
        d: f64,
    },
    /// Solve a linear system, e.g. `linear "2,1;1,-1" "5,1"`
    Linear {
        #[arg(allow_hyphen_values = true)]
        matrix: String,
        #[arg(allow_hyphen_values = true)]
        constants: String,
    },
    /// Solve the time value of money equation for one unknown
    Tvm(TvmArgs),
    /// Print a monthly amortization schedule
    Amortize {
        principal: f64,
        /// Annual interest rate as a decimal
        annual_rate: f64,
        payments: u32,
    },
    /// Compound interest on a principal
    Interest {
        principal: f64,
        /// Annual interest rate as a decimal
        annual_rate: f64,
        compounds_per_year: f64,
        years: f64,
    },
    /// Definite integral of an expression
    Integrate {
        expression: String,
        #[arg(allow_negative_numbers = true)]
        lower: f64,
        #[arg(allow_negative_numbers = true)]
        upper: f64,
        #[arg(long, default_value = "x")]
        var: String,
        /// Number of intervals (defaults to the configured value)
        #[arg(long)]
        intervals: Option<usize>,
        /// Use the trapezoidal rule instead of Simpson's rule
        #[arg(long)]
        trapezoidal: bool,
    },
    /// Estimate a limit; the point may be `inf` or `-inf`
    Limit {
        expression: String,
        #[arg(allow_hyphen_values = true)]
        point: String,
        #[arg(long, default_value = "x")]
        var: String,
        #[arg(long, default_value = "both")]
        approach: Approach,
    },
    /// Fit a regression model to comma-separated x and y values
    Regress {
        #[arg(allow_hyphen_values = true)]
        xs: String,
        #[arg(allow_hyphen_values = true)]
        ys: String,
        /// Model to fit; all models are fitted when omitted
        #[arg(long)]
        model: Option<RegressionModel>,
    },
    /// Descriptive statistics of comma-separated values
    Stats {
        #[arg(allow_hyphen_values = true)]
        data: String,
    },
    /// Vector quantities of `a`, and of `a` against `b` when given
    Vector {
        /// Components such as "[1, 2, 3]"
        #[arg(allow_hyphen_values = true)]
        a: String,
        #[arg(allow_hyphen_values = true)]
        b: Option<String>,
    },
    /// Show or clear the calculation history
    History {
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Args)]
struct TvmArgs {
    /// Quantity to solve for: n, rate, pv, pmt or fv
    #[arg(long)]
    solve: TvmVariable,
    #[arg(long, allow_negative_numbers = true)]
    n: Option<f64>,
    /// Interest rate per period as a decimal
    #[arg(long, allow_negative_numbers = true)]
    rate: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pv: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pmt: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    fv: Option<f64>,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print `value` as JSON, or the text produced by `text`.
fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

fn parse_list(text: &str) -> anyhow::Result<Vec<f64>> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .with_context(|| format!("Invalid number '{}'", s))
        })
        .collect()
}

fn parse_matrix(text: &str) -> anyhow::Result<Vec<Vec<f64>>> {
    text.split(';').map(parse_list).collect()
}

/// Rewrite a calculus expression into evaluator syntax. Calculus always works in radians.
fn calculus_expression(expression: &str) -> anyhow::Result<String> {
    Ok(prepare_expression(expression, AngleMode::Rad)?)
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    if let Some(angle) = cli.angle {
        config.angle_mode = angle;
    }
    Ok(config)
}

fn open_history(config: &Config) -> Option<(PathBuf, History)> {
    let path = History::default_path()?;
    match History::load(&path, config.history_limit) {
        Ok(history) => Some((path, history)),
        Err(e) => {
            tracing::warn!("{:#}; starting with an empty history", e);
            Some((path, History::new(config.history_limit)))
        }
    }
}

fn record(config: &Config, result: &CalcResult) {
    if !config.record_history || !result.is_success() {
        return;
    }
    let Some((path, mut history)) = open_history(config) else {
        return;
    };
    history.push(HistoryEntry::from_calc_result(result));
    if let Err(e) = history.save(&path) {
        tracing::warn!("{:#}", e);
    }
}

fn print_calc_result(json: bool, result: &CalcResult, fraction: bool) -> anyhow::Result<()> {
    let value = json!({
        "expression": result.expression(),
        "success": result.is_success(),
        "result": result.display(),
        "plain": result.plain(),
        "fraction": result.value().filter(|_| fraction).map(to_fraction),
    });
    emit(json, &value, || match result.value() {
        Some(v) if fraction => format!("{} = {}", result.display(), to_fraction(v)),
        _ => result.display().to_string(),
    })
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    tracing::debug!(?config, "loaded configuration");
    let json = cli.json;
    let evaluator = MevalEvaluator::new();

    match cli.command {
        Command::Eval {
            expression,
            fraction,
        } => {
            let result = evaluate_expression(&expression, config.angle_mode, &evaluator)?;
            record(&config, &result);
            print_calc_result(json, &result, fraction)?;
        }
        Command::Keys { tokens } => {
            let mut keypad = Keypad::new(config.angle_mode, History::new(config.history_limit));
            for token in &tokens {
                if !keypad.input(token) {
                    tracing::info!(token, "keystroke rejected");
                }
            }
            keypad.evaluate();
            let value = json!({
                "expression": keypad.expression(),
                "display": format_for_display(keypad.expression()),
                "result": keypad.result(),
                "error": keypad.error(),
            });
            emit(json, &value, || {
                let outcome = keypad.error().unwrap_or(keypad.result());
                format!("{}\n= {}", format_for_display(keypad.expression()), outcome)
            })?;
        }
        Command::Rewrite { expression } => {
            let rewritten = rewrite_operators(&expression)?;
            let prepared = prepare_expression(&expression, config.angle_mode)?;
            let value = json!({ "rewritten": rewritten, "prepared": prepared });
            emit(json, &value, || format!("{}\n{}", rewritten, prepared))?;
        }
        Command::Quadratic { a, b, c } => {
            let result = solvers::solve_quadratic(a, b, c)?;
            emit(json, &result, || {
                format!(
                    "x₁ = {}\nx₂ = {}\nΔ = {}\nvertex = ({}, {})",
                    result.roots[0],
                    result.roots[1],
                    result.discriminant,
                    result.vertex.x,
                    result.vertex.y
                )
            })?;
        }
        Command::Cubic { a, b, c, d } => {
            let result = solvers::solve_cubic(a, b, c, d)?;
            emit(json, &result, || {
                result
                    .roots
                    .iter()
                    .enumerate()
                    .map(|(i, root)| format!("x{} = {}", i + 1, root))
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        Command::Linear { matrix, constants } => {
            let matrix = parse_matrix(&matrix)?;
            let constants = parse_list(&constants)?;
            let result = solvers::solve_linear_system(&matrix, &constants)?;
            emit(json, &result, || {
                if !result.solvable {
                    return "No unique solution".to_string();
                }
                result
                    .solution
                    .iter()
                    .enumerate()
                    .map(|(i, x)| format!("x{} = {}", i + 1, x))
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        Command::Tvm(args) => {
            let inputs = TvmInputs {
                n: args.n,
                rate: args.rate,
                pv: args.pv,
                pmt: args.pmt,
                fv: args.fv,
            };
            let result = solvers::solve_tvm(&inputs, args.solve)?;
            emit(json, &result, || {
                format!(
                    "N = {}\nI% = {}\nPV = {}\nPMT = {}\nFV = {}\n(solved for {})",
                    result.n, result.rate, result.pv, result.pmt, result.fv, result.solved_for
                )
            })?;
        }
        Command::Amortize {
            principal,
            annual_rate,
            payments,
        } => {
            let rows = solvers::generate_amortization(principal, annual_rate, payments);
            emit(json, &rows, || {
                let mut lines = vec![format!(
                    "{:>6} {:>12} {:>12} {:>12} {:>14}",
                    "period", "payment", "principal", "interest", "balance"
                )];
                lines.extend(rows.iter().map(|row| {
                    format!(
                        "{:>6} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
                        row.period, row.payment, row.principal, row.interest, row.balance
                    )
                }));
                lines.join("\n")
            })?;
        }
        Command::Interest {
            principal,
            annual_rate,
            compounds_per_year,
            years,
        } => {
            if compounds_per_year <= 0.0 {
                bail!("compounds per year must be positive");
            }
            let amount =
                solvers::compound_interest(principal, annual_rate, compounds_per_year, years);
            emit(json, &json!({ "amount": amount }), || format!("{:.2}", amount))?;
        }
        Command::Integrate {
            expression,
            lower,
            upper,
            var,
            intervals,
            trapezoidal,
        } => {
            let prepared = calculus_expression(&expression)?;
            let intervals = intervals.unwrap_or(config.integration_intervals);
            let area = if trapezoidal {
                solvers::compute_integral_trapezoidal(
                    &prepared, &var, lower, upper, intervals, &evaluator,
                )?
            } else {
                solvers::compute_integral(&prepared, &var, lower, upper, intervals, &evaluator)?
            };
            emit(json, &json!({ "integral": area }), || format_result(area))?;
        }
        Command::Limit {
            expression,
            point,
            var,
            approach,
        } => {
            let prepared = calculus_expression(&expression)?;
            let at_infinity = point.parse::<InfinityDirection>().ok();
            match at_infinity {
                Some(direction) => {
                    let outcome: LimitOutcome = solvers::compute_limit_at_infinity(
                        &prepared, &var, direction, &evaluator,
                    )?;
                    emit(json, &outcome, || outcome.to_string())?;
                }
                None => {
                    let point: f64 = point
                        .parse()
                        .with_context(|| format!("Invalid limit point '{}'", point))?;
                    let result =
                        solvers::compute_limit(&prepared, &var, point, approach, &evaluator)?;
                    emit(json, &result, || solvers::format_limit_result(&result))?;
                }
            }
        }
        Command::Regress { xs, ys, model } => {
            let xs = parse_list(&xs)?;
            let ys = parse_list(&ys)?;
            let single = model.is_some();
            let models = match model {
                Some(model) => vec![model],
                None => RegressionModel::ALL.to_vec(),
            };

            let mut results = Vec::new();
            for model in models {
                match solvers::regression(model, &xs, &ys) {
                    Ok(result) => results.push(result),
                    Err(e) if single => return Err(e.into()),
                    Err(e) => tracing::info!(%model, "skipped: {}", e),
                }
            }
            emit(json, &results, || {
                results
                    .iter()
                    .map(|r| format!("{:<12} {}  (R² = {})", r.model, r.equation, r.r_squared))
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        Command::Stats { data } => {
            let data = parse_list(&data)?;
            let stats = solvers::descriptive_stats(&data)?;
            emit(json, &stats, || {
                let mode = if stats.mode.is_empty() {
                    "none".to_string()
                } else {
                    stats
                        .mode
                        .iter()
                        .map(|m| m.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                format!(
                    "count    {}\nsum      {}\nmean     {}\nmedian   {}\nmode     {}\n\
                     variance {}\nstd dev  {}\nmin      {}\nmax      {}\n\
                     q1       {}\nq3       {}\niqr      {}",
                    stats.count,
                    stats.sum,
                    stats.mean,
                    stats.median,
                    mode,
                    stats.variance,
                    stats.std_dev,
                    stats.min,
                    stats.max,
                    stats.q1,
                    stats.q3,
                    stats.iqr
                )
            })?;
        }
        Command::Vector { a, b } => {
            let a = solvers::parse_vector(&a)?;
            let mut report = json!({
                "magnitude": solvers::magnitude(&a),
                "unit": solvers::normalize(&a).ok(),
            });
            if let Some(b) = b {
                let b = solvers::parse_vector(&b)?;
                let tol = solvers::ORTHOGONALITY_TOLERANCE;
                report["dot"] = json!(solvers::dot_product(&a, &b)?);
                report["distance"] = json!(solvers::distance(&a, &b)?);
                let angle = solvers::angle_between(&a, &b).ok();
                report["angle_deg"] = json!(angle.map(f64::to_degrees));
                report["projection"] = json!(solvers::projection(&a, &b).ok());
                report["parallel"] = json!(solvers::are_parallel(&a, &b, tol).ok());
                report["perpendicular"] = json!(solvers::are_perpendicular(&a, &b, tol)?);
                if let (Ok(a3), Ok(b3)) = (
                    <[f64; 3]>::try_from(a.as_slice()),
                    <[f64; 3]>::try_from(b.as_slice()),
                ) {
                    report["cross"] = json!(solvers::cross_product(a3, b3));
                }
            }
            emit(json, &report, || {
                report
                    .as_object()
                    .into_iter()
                    .flatten()
                    .filter(|(_, value)| !value.is_null())
                    .map(|(key, value)| {
                        let text = match value.as_array() {
                            Some(v) => {
                                let v: Vec<f64> = v.iter().filter_map(|c| c.as_f64()).collect();
                                solvers::format_vector(&v, 4)
                            }
                            None => value.to_string(),
                        };
                        format!("{:<14}{}", key, text)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        Command::History { clear } => {
            let Some((path, mut history)) = open_history(&config) else {
                bail!("No data directory available for the history file");
            };
            if clear {
                history.clear();
                history.save(&path)?;
            }
            let entries: Vec<&HistoryEntry> = history.entries().collect();
            emit(json, &entries, || {
                entries
                    .iter()
                    .map(|e| format!("{} = {}", e.expression, e.result))
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}
