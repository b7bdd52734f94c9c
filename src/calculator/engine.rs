//! Numeric evaluation of canonical expressions using meval.
//!
//! The dispatcher and the calculus routines only depend on the [`Evaluator`]
//! trait; [`MevalEvaluator`] is the default implementation and registers the
//! keypad's function vocabulary on top of meval's built-ins.

use meval::{Context, Expr};
use rand::Rng;
use std::f64::consts::PI;

use crate::error::{CalcError, Result};

/// An evaluator for canonical ASCII expressions.
pub trait Evaluator {
    /// Evaluate a closed expression to a number.
    fn evaluate(&self, expression: &str) -> Result<f64>;

    /// Compile an expression in one free variable into a function of that variable.
    fn compile(&self, expression: &str, variable: &str) -> Result<Box<dyn Fn(f64) -> f64>>;
}

/// [`Evaluator`] backed by the meval crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct MevalEvaluator;

impl MevalEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// meval's built-ins plus the functions the keypad can insert.
    fn context() -> Context<'static> {
        let mut ctx = Context::new();
        ctx.func("log", f64::ln)
            .func("log10", f64::log10)
            .func("cbrt", f64::cbrt)
            .func("cot", |x: f64| 1.0 / x.tan())
            .func("acot", |x: f64| (1.0 / x).atan())
            .func("factorial", factorial)
            .func2("nthRoot", nth_root)
            .func2("permutations", permutations)
            .func2("combinations", combinations)
            .func2("gcd", gcd)
            .func2("lcm", lcm)
            .func2("randomInt", random_int);
        ctx
    }

    fn parse(expression: &str) -> Result<Expr> {
        expression
            .parse::<Expr>()
            .map_err(|e| CalcError::MalformedExpression(e.to_string()))
    }
}

impl Evaluator for MevalEvaluator {
    fn evaluate(&self, expression: &str) -> Result<f64> {
        Self::parse(expression)?
            .eval_with_context(Self::context())
            .map_err(|e| CalcError::MalformedExpression(e.to_string()))
    }

    fn compile(&self, expression: &str, variable: &str) -> Result<Box<dyn Fn(f64) -> f64>> {
        let func = Self::parse(expression)?
            .bind_with_context(Self::context(), variable)
            .map_err(|e| CalcError::MalformedExpression(e.to_string()))?;
        Ok(Box::new(func))
    }
}

/// Gamma function (Lanczos approximation, g = 7).
fn gamma(x: f64) -> f64 {
    const G: f64 = 7.0;
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        return PI / ((PI * x).sin() * gamma(1.0 - x));
    }

    let x = x - 1.0;
    let t = x + G + 0.5;
    let series = COEFFS
        .iter()
        .enumerate()
        .skip(1)
        .fold(COEFFS[0], |acc, (i, c)| acc + c / (x + i as f64));

    (2.0 * PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * series
}

fn is_integer(x: f64) -> bool {
    x.is_finite() && x.fract() == 0.0
}

/// n! for non-negative integers, Γ(n + 1) otherwise; NaN at the poles.
fn factorial(n: f64) -> f64 {
    if n.is_nan() || (n < 0.0 && is_integer(n)) {
        return f64::NAN;
    }
    if is_integer(n) {
        if n > 170.0 {
            return f64::INFINITY;
        }
        return (2..=n as u64).map(|k| k as f64).product();
    }
    gamma(n + 1.0)
}

/// Real n-th root; odd roots of negative numbers stay real.
fn nth_root(x: f64, n: f64) -> f64 {
    if n == 0.0 {
        return f64::NAN;
    }
    if x < 0.0 {
        if is_integer(n) && (n as i64) % 2 != 0 {
            return -(-x).powf(1.0 / n);
        }
        return f64::NAN;
    }
    x.powf(1.0 / n)
}

fn permutations(n: f64, k: f64) -> f64 {
    if !is_integer(n) || !is_integer(k) || n < 0.0 || k < 0.0 || k > n {
        return f64::NAN;
    }
    let mut acc = 1.0;
    for i in 0..k as u64 {
        acc *= n - i as f64;
        if acc.is_infinite() {
            break;
        }
    }
    acc
}

fn combinations(n: f64, k: f64) -> f64 {
    if !is_integer(n) || !is_integer(k) || n < 0.0 || k < 0.0 || k > n {
        return f64::NAN;
    }
    // Partial products are C(n-k+i, i), which only grow, so overflow is final.
    let k = k.min(n - k);
    let mut acc = 1.0;
    for i in 1..=k as u64 {
        acc = acc * (n - k + i as f64) / i as f64;
        if acc.is_infinite() {
            break;
        }
    }
    acc
}

fn gcd(a: f64, b: f64) -> f64 {
    if !is_integer(a) || !is_integer(b) {
        return f64::NAN;
    }
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0.0 {
        (a, b) = (b, a % b);
    }
    a
}

fn lcm(a: f64, b: f64) -> f64 {
    if !is_integer(a) || !is_integer(b) {
        return f64::NAN;
    }
    if a == 0.0 || b == 0.0 {
        return 0.0;
    }
    (a * b).abs() / gcd(a, b)
}

/// Uniform random integer in `[a, b]`.
fn random_int(a: f64, b: f64) -> f64 {
    let (lo, hi) = (a.ceil(), b.floor());
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return f64::NAN;
    }
    rand::thread_rng().gen_range(lo as i64..=hi as i64) as f64
}
