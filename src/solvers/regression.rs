//! Least-squares curve fitting.
//!
//! Exponential, power and logarithmic models are fitted by running a linear
//! regression on log-transformed data. R² is always measured against the
//! untransformed y values so models can be compared with each other.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::equations::gaussian_elimination;
use super::round10;
use crate::calculator::round_to;
use crate::error::{CalcError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegressionModel {
    /// `y = ax + b`
    Linear,
    /// `y = ax² + bx + c`
    Quadratic,
    /// `y = a·e^(bx)`
    Exponential,
    /// `y = a·x^b`
    Power,
    /// `y = a + b·ln(x)`
    Logarithmic,
}

impl RegressionModel {
    pub const ALL: [RegressionModel; 5] = [
        Self::Linear,
        Self::Quadratic,
        Self::Exponential,
        Self::Power,
        Self::Logarithmic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Quadratic => "quadratic",
            Self::Exponential => "exponential",
            Self::Power => "power",
            Self::Logarithmic => "logarithmic",
        }
    }
}

impl fmt::Display for RegressionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RegressionModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" | "lin" => Ok(Self::Linear),
            "quadratic" | "quad" => Ok(Self::Quadratic),
            "exponential" | "exp" => Ok(Self::Exponential),
            "power" | "pow" => Ok(Self::Power),
            "logarithmic" | "log" | "ln" => Ok(Self::Logarithmic),
            other => Err(format!("unknown regression model '{}'", other)),
        }
    }
}

/// A fitted model.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegressionResult {
    pub model: RegressionModel,
    /// Human-readable equation with coefficients to 4 decimals.
    pub equation: String,
    /// Coefficients in the order they appear in the equation, rounded to 10 decimals.
    pub coefficients: Vec<f64>,
    pub r_squared: f64,
    #[serde(skip)]
    exact: Vec<f64>,
}

impl RegressionResult {
    fn new(model: RegressionModel, exact: Vec<f64>, r_squared: f64) -> Self {
        let c: Vec<String> = exact.iter().map(|&v| coefficient(v)).collect();
        let equation = match model {
            RegressionModel::Linear => format!("y = {}x + {}", c[0], c[1]),
            RegressionModel::Quadratic => format!("y = {}x² + {}x + {}", c[0], c[1], c[2]),
            RegressionModel::Exponential => format!("y = {}e^({}x)", c[0], c[1]),
            RegressionModel::Power => format!("y = {}x^{}", c[0], c[1]),
            RegressionModel::Logarithmic => format!("y = {} + {}ln(x)", c[0], c[1]),
        };

        Self {
            model,
            equation,
            coefficients: exact.iter().copied().map(round10).collect(),
            r_squared: round10(r_squared),
            exact,
        }
    }

    /// Evaluate the fitted model at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        predict(self.model, &self.exact, x)
    }
}

fn predict(model: RegressionModel, c: &[f64], x: f64) -> f64 {
    match model {
        RegressionModel::Linear => c[0] * x + c[1],
        RegressionModel::Quadratic => c[0] * x * x + c[1] * x + c[2],
        RegressionModel::Exponential => c[0] * (c[1] * x).exp(),
        RegressionModel::Power => c[0] * x.powf(c[1]),
        RegressionModel::Logarithmic => c[0] + c[1] * x.ln(),
    }
}

fn coefficient(value: f64) -> String {
    format!("{}", round_to(value, 4))
}

/// Coefficient of determination of `predicted` against `actual`.
fn r_squared(actual: &[f64], predicted: impl Iterator<Item = f64>) -> f64 {
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = actual.iter().zip(predicted).map(|(y, p)| (y - p).powi(2)).sum();
    if ss_tot == 0.0 {
        return 1.0;
    }
    1.0 - ss_res / ss_tot
}

fn check_data(xs: &[f64], ys: &[f64]) -> Result<()> {
    if xs.len() != ys.len() {
        return Err(CalcError::DimensionMismatch(format!(
            "Got {} x values and {} y values",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < 2 {
        return Err(CalcError::InsufficientData(
            "Need at least 2 data points".into(),
        ));
    }
    Ok(())
}

/// Slope and intercept of the least-squares line.
fn least_squares(xs: &[f64], ys: &[f64]) -> Result<(f64, f64)> {
    if xs.iter().all(|&x| x == xs[0]) {
        return Err(CalcError::InsufficientData(
            "Need at least 2 distinct x values".into(),
        ));
    }

    let n = xs.len() as f64;
    let sum_x: f64 = xs.iter().sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_xy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
    let sum_x2: f64 = xs.iter().map(|x| x * x).sum();

    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_x2 - sum_x * sum_x);
    let intercept = (sum_y - slope * sum_x) / n;
    Ok((slope, intercept))
}

/// Points whose coordinates pass `keep`, split into transformed axes.
fn retain_points(
    xs: &[f64],
    ys: &[f64],
    keep: impl Fn(f64, f64) -> bool,
    min_message: &str,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let (kept_x, kept_y): (Vec<f64>, Vec<f64>) = xs
        .iter()
        .zip(ys)
        .filter(|&(&x, &y)| keep(x, y))
        .map(|(&x, &y)| (x, y))
        .unzip();

    if kept_x.len() < 2 {
        return Err(CalcError::InsufficientData(min_message.to_string()));
    }
    Ok((kept_x, kept_y))
}

pub fn linear_regression(xs: &[f64], ys: &[f64]) -> Result<RegressionResult> {
    check_data(xs, ys)?;
    let (slope, intercept) = least_squares(xs, ys)?;

    let c = vec![slope, intercept];
    let r2 = r_squared(ys, xs.iter().map(|&x| predict(RegressionModel::Linear, &c, x)));
    Ok(RegressionResult::new(RegressionModel::Linear, c, r2))
}

/// Fit `y = ax² + bx + c` by solving the 3×3 normal equations.
pub fn quadratic_regression(xs: &[f64], ys: &[f64]) -> Result<RegressionResult> {
    check_data(xs, ys)?;

    let n = xs.len() as f64;
    let (mut sx, mut sx2, mut sx3, mut sx4) = (0.0, 0.0, 0.0, 0.0);
    let (mut sy, mut sxy, mut sx2y) = (0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        let x2 = x * x;
        sx += x;
        sx2 += x2;
        sx3 += x2 * x;
        sx4 += x2 * x2;
        sy += y;
        sxy += x * y;
        sx2y += x2 * y;
    }

    let matrix = vec![
        vec![sx4, sx3, sx2],
        vec![sx3, sx2, sx],
        vec![sx2, sx, n],
    ];
    let c = gaussian_elimination(&matrix, &[sx2y, sxy, sy]).ok_or(CalcError::SingularSystem)?;

    let r2 = r_squared(ys, xs.iter().map(|&x| predict(RegressionModel::Quadratic, &c, x)));
    Ok(RegressionResult::new(RegressionModel::Quadratic, c, r2))
}

/// Fit `y = a·e^(bx)` using the points with positive y.
pub fn exponential_regression(xs: &[f64], ys: &[f64]) -> Result<RegressionResult> {
    check_data(xs, ys)?;
    let (kept_x, kept_y) = retain_points(
        xs,
        ys,
        |_, y| y > 0.0,
        "Need at least 2 positive y values for exponential regression",
    )?;

    let ln_y: Vec<f64> = kept_y.iter().map(|y| y.ln()).collect();
    let (b, ln_a) = least_squares(&kept_x, &ln_y)?;

    let c = vec![ln_a.exp(), b];
    let r2 = r_squared(ys, xs.iter().map(|&x| predict(RegressionModel::Exponential, &c, x)));
    Ok(RegressionResult::new(RegressionModel::Exponential, c, r2))
}

/// Fit `y = a·x^b` using the points with positive x and y.
pub fn power_regression(xs: &[f64], ys: &[f64]) -> Result<RegressionResult> {
    check_data(xs, ys)?;
    let (kept_x, kept_y) = retain_points(
        xs,
        ys,
        |x, y| x > 0.0 && y > 0.0,
        "Need at least 2 positive x,y pairs for power regression",
    )?;

    let ln_x: Vec<f64> = kept_x.iter().map(|x| x.ln()).collect();
    let ln_y: Vec<f64> = kept_y.iter().map(|y| y.ln()).collect();
    let (b, ln_a) = least_squares(&ln_x, &ln_y)?;

    let c = vec![ln_a.exp(), b];
    let r2 = r_squared(
        &kept_y,
        kept_x.iter().map(|&x| predict(RegressionModel::Power, &c, x)),
    );
    Ok(RegressionResult::new(RegressionModel::Power, c, r2))
}

/// Fit `y = a + b·ln(x)` using the points with positive x.
pub fn logarithmic_regression(xs: &[f64], ys: &[f64]) -> Result<RegressionResult> {
    check_data(xs, ys)?;
    let (kept_x, kept_y) = retain_points(
        xs,
        ys,
        |x, _| x > 0.0,
        "Need at least 2 positive x values for logarithmic regression",
    )?;

    let ln_x: Vec<f64> = kept_x.iter().map(|x| x.ln()).collect();
    let (b, a) = least_squares(&ln_x, &kept_y)?;

    let c = vec![a, b];
    let r2 = r_squared(
        &kept_y,
        kept_x.iter().map(|&x| predict(RegressionModel::Logarithmic, &c, x)),
    );
    Ok(RegressionResult::new(RegressionModel::Logarithmic, c, r2))
}

/// Fit the given model.
pub fn regression(model: RegressionModel, xs: &[f64], ys: &[f64]) -> Result<RegressionResult> {
    tracing::debug!(%model, points = xs.len(), "fitting regression");
    match model {
        RegressionModel::Linear => linear_regression(xs, ys),
        RegressionModel::Quadratic => quadratic_regression(xs, ys),
        RegressionModel::Exponential => exponential_regression(xs, ys),
        RegressionModel::Power => power_regression(xs, ys),
        RegressionModel::Logarithmic => logarithmic_regression(xs, ys),
    }
}
