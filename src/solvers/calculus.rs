//! Numerical integration and limit estimation.
//!
//! Expressions are canonical (already rewritten) and compiled once through an
//! [`Evaluator`] into a function of a single variable.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::calculator::{Evaluator, to_precision};
use crate::error::{CalcError, Result};

/// Offsets from the approach point, shrinking geometrically.
const LIMIT_DELTAS: [f64; 7] = [1e-1, 1e-2, 1e-3, 1e-4, 1e-5, 1e-6, 1e-7];

/// Sample points when approaching infinity.
const INFINITY_POINTS: [f64; 6] = [1e1, 1e2, 1e3, 1e4, 1e5, 1e6];

/// Sum of the last two sample differences below which samples have converged.
const CONVERGENCE_TOLERANCE: f64 = 1e-5;

/// Magnitude beyond which a sample is treated as diverging.
const DIVERGENCE_THRESHOLD: f64 = 1e10;

/// Maximum disagreement between one-sided limits for a two-sided limit.
const TWO_SIDED_TOLERANCE: f64 = 1e-6;

/// Magnitude below which samples at infinity count as trending to zero.
const ZERO_TREND_THRESHOLD: f64 = 1e-10;

fn compile(
    expression: &str,
    variable: &str,
    evaluator: &dyn Evaluator,
) -> Result<Box<dyn Fn(f64) -> f64>> {
    evaluator
        .compile(expression, variable)
        .map_err(|e| CalcError::Integration(e.to_string()))
}

/// Composite Simpson's rule over `[lower, upper]`.
///
/// An odd number of intervals is rounded up to the next even one.
pub fn compute_integral(
    expression: &str,
    variable: &str,
    lower: f64,
    upper: f64,
    intervals: usize,
    evaluator: &dyn Evaluator,
) -> Result<f64> {
    let f = compile(expression, variable, evaluator)?;

    let n = intervals.max(2);
    let n = if n % 2 == 0 { n } else { n + 1 };
    let h = (upper - lower) / n as f64;

    let inner: f64 = (1..n)
        .map(|i| {
            let weight = if i % 2 == 0 { 2.0 } else { 4.0 };
            weight * f(lower + i as f64 * h)
        })
        .sum();

    Ok(h / 3.0 * (f(lower) + f(upper) + inner))
}

/// Composite trapezoidal rule over `[lower, upper]`.
pub fn compute_integral_trapezoidal(
    expression: &str,
    variable: &str,
    lower: f64,
    upper: f64,
    intervals: usize,
    evaluator: &dyn Evaluator,
) -> Result<f64> {
    let f = compile(expression, variable, evaluator)?;

    let n = intervals.max(1);
    let h = (upper - lower) / n as f64;
    let inner: f64 = (1..n).map(|i| f(lower + i as f64 * h)).sum();

    Ok(h * ((f(lower) + f(upper)) / 2.0 + inner))
}

/// Side from which a limit is approached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Approach {
    Left,
    Right,
    #[default]
    Both,
}

impl FromStr for Approach {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "-" => Ok(Self::Left),
            "right" | "+" => Ok(Self::Right),
            "both" => Ok(Self::Both),
            other => Err(format!("unknown approach '{}'", other)),
        }
    }
}

/// Which infinity [`compute_limit_at_infinity`] approaches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InfinityDirection {
    #[default]
    Positive,
    Negative,
}

impl FromStr for InfinityDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "positive" | "+" | "inf" | "+inf" => Ok(Self::Positive),
            "negative" | "-" | "-inf" => Ok(Self::Negative),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

/// Estimate from one side of the approach point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OneSidedLimit {
    Finite(f64),
    PosInfinity,
    NegInfinity,
}

impl OneSidedLimit {
    fn infinite(sign_of: f64) -> Self {
        if sign_of > 0.0 {
            Self::PosInfinity
        } else {
            Self::NegInfinity
        }
    }

    fn outcome(self) -> LimitOutcome {
        match self {
            Self::Finite(v) => LimitOutcome::Finite(v),
            Self::PosInfinity => LimitOutcome::PosInfinity,
            Self::NegInfinity => LimitOutcome::NegInfinity,
        }
    }
}

/// Final classification of a limit estimate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitOutcome {
    Finite(f64),
    PosInfinity,
    NegInfinity,
    /// Both sides produced estimates that disagree.
    DoesNotExist,
    /// No side produced an estimate.
    Undetermined,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LimitResult {
    pub outcome: LimitOutcome,
    pub left: Option<OneSidedLimit>,
    pub right: Option<OneSidedLimit>,
    pub approach: Approach,
}

impl LimitResult {
    /// The limit value, infinite for divergent limits.
    pub fn value(&self) -> Option<f64> {
        match self.outcome {
            LimitOutcome::Finite(v) => Some(v),
            LimitOutcome::PosInfinity => Some(f64::INFINITY),
            LimitOutcome::NegInfinity => Some(f64::NEG_INFINITY),
            LimitOutcome::DoesNotExist | LimitOutcome::Undetermined => None,
        }
    }

    /// Whether the limit exists as a finite number.
    pub fn exists(&self) -> bool {
        matches!(self.outcome, LimitOutcome::Finite(_))
    }
}

/// Sample `f` at successive points and guess where the values are heading.
///
/// A non-finite sample ends sampling: it counts as divergence when the last
/// finite sample was already huge, and as no estimate otherwise.
fn estimate(
    f: &dyn Fn(f64) -> f64,
    points: impl Iterator<Item = f64>,
    zero_trend: bool,
) -> Option<OneSidedLimit> {
    let mut values: Vec<f64> = Vec::with_capacity(LIMIT_DELTAS.len());
    for x in points {
        let y = f(x);
        if !y.is_finite() {
            return values
                .last()
                .filter(|last| last.abs() > DIVERGENCE_THRESHOLD)
                .map(|&last| OneSidedLimit::infinite(last));
        }
        values.push(y);
    }

    let &[.., a, b, c] = values.as_slice() else {
        return None;
    };
    if (c - b).abs() + (b - a).abs() < CONVERGENCE_TOLERANCE {
        return Some(OneSidedLimit::Finite(c));
    }
    if zero_trend && c.abs() < ZERO_TREND_THRESHOLD {
        return Some(OneSidedLimit::Finite(0.0));
    }
    if c.abs() > DIVERGENCE_THRESHOLD {
        return Some(OneSidedLimit::infinite(c));
    }
    Some(OneSidedLimit::Finite(c))
}

fn combine(left: Option<OneSidedLimit>, right: Option<OneSidedLimit>) -> LimitOutcome {
    match (left, right) {
        (Some(OneSidedLimit::Finite(l)), Some(OneSidedLimit::Finite(r))) => {
            if (l - r).abs() < TWO_SIDED_TOLERANCE {
                LimitOutcome::Finite((l + r) / 2.0)
            } else {
                LimitOutcome::DoesNotExist
            }
        }
        (Some(l), Some(r)) if l == r => l.outcome(),
        (Some(_), Some(_)) => LimitOutcome::DoesNotExist,
        (Some(side), None) | (None, Some(side)) => side.outcome(),
        (None, None) => LimitOutcome::Undetermined,
    }
}

/// Estimate `lim expression` as `variable` approaches `point`.
///
/// This is a sampling heuristic: slowly converging or oscillating functions can
/// be misclassified.
pub fn compute_limit(
    expression: &str,
    variable: &str,
    point: f64,
    approach: Approach,
    evaluator: &dyn Evaluator,
) -> Result<LimitResult> {
    let f = evaluator.compile(expression, variable)?;
    let side = |sign: f64| estimate(&*f, LIMIT_DELTAS.iter().map(|d| point + sign * d), false);

    let left = matches!(approach, Approach::Left | Approach::Both)
        .then(|| side(-1.0))
        .flatten();
    let right = matches!(approach, Approach::Right | Approach::Both)
        .then(|| side(1.0))
        .flatten();

    let outcome = match approach {
        Approach::Left => left.map_or(LimitOutcome::Undetermined, OneSidedLimit::outcome),
        Approach::Right => right.map_or(LimitOutcome::Undetermined, OneSidedLimit::outcome),
        Approach::Both => combine(left, right),
    };
    tracing::debug!(expression, point, ?approach, ?left, ?right, ?outcome, "estimated limit");

    Ok(LimitResult {
        outcome,
        left,
        right,
        approach,
    })
}

/// Estimate `lim expression` as `variable` grows without bound.
pub fn compute_limit_at_infinity(
    expression: &str,
    variable: &str,
    direction: InfinityDirection,
    evaluator: &dyn Evaluator,
) -> Result<LimitOutcome> {
    let f = evaluator.compile(expression, variable)?;
    let sign = match direction {
        InfinityDirection::Positive => 1.0,
        InfinityDirection::Negative => -1.0,
    };

    let guess = estimate(&*f, INFINITY_POINTS.iter().map(|x| sign * x), true);
    Ok(guess.map_or(LimitOutcome::Undetermined, OneSidedLimit::outcome))
}

impl fmt::Display for LimitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(v) => f.write_str(&to_precision(*v, 10)),
            Self::PosInfinity => f.write_str("+∞"),
            Self::NegInfinity => f.write_str("-∞"),
            Self::DoesNotExist => f.write_str("DNE (limit does not exist)"),
            Self::Undetermined => f.write_str("undefined"),
        }
    }
}

/// Text shown for a limit estimate.
pub fn format_limit_result(result: &LimitResult) -> String {
    result.outcome.to_string()
}
