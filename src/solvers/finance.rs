//! Time value of money and loan amortization.
//!
//! All quantities follow the cash-flow sign convention of the annuity identity
//! `PV(1+r)ⁿ + PMT((1+r)ⁿ−1)/r + FV = 0`: money received is positive, money
//! paid out is negative.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::round10;
use crate::calculator::round_to;
use crate::error::{CalcError, Result};

const NEWTON_INITIAL_RATE: f64 = 0.1;
const NEWTON_MAX_ITERATIONS: usize = 100;
const NEWTON_STEP_TOLERANCE: f64 = 1e-12;
const NEWTON_MIN_SLOPE: f64 = 1e-15;

fn cents(value: f64) -> f64 {
    round_to(value, 2)
}

/// The TVM quantity to solve for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TvmVariable {
    #[serde(rename = "N")]
    N,
    #[serde(rename = "I%")]
    Rate,
    #[serde(rename = "PV")]
    Pv,
    #[serde(rename = "PMT")]
    Pmt,
    #[serde(rename = "FV")]
    Fv,
}

impl TvmVariable {
    /// Calculator key label.
    pub fn label(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::Rate => "I%",
            Self::Pv => "PV",
            Self::Pmt => "PMT",
            Self::Fv => "FV",
        }
    }
}

impl fmt::Display for TvmVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TvmVariable {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "n" => Ok(Self::N),
            "rate" | "i" | "i%" => Ok(Self::Rate),
            "pv" => Ok(Self::Pv),
            "pmt" => Ok(Self::Pmt),
            "fv" => Ok(Self::Fv),
            other => Err(format!("unknown TVM variable '{}'", other)),
        }
    }
}

/// Known TVM quantities. The one being solved for may be left empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TvmInputs {
    pub n: Option<f64>,
    /// Interest rate per period as a decimal (`0.05` for 5%).
    pub rate: Option<f64>,
    pub pv: Option<f64>,
    pub pmt: Option<f64>,
    pub fv: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TvmResult {
    pub n: f64,
    pub rate: f64,
    pub pv: f64,
    pub pmt: f64,
    pub fv: f64,
    pub solved_for: TvmVariable,
}

/// Left-hand side of the annuity identity.
fn tvm_equation(n: f64, r: f64, pv: f64, pmt: f64, fv: f64) -> f64 {
    if r.abs() < NEWTON_MIN_SLOPE {
        return pv + pmt * n + fv;
    }
    let factor = (1.0 + r).powf(n);
    pv * factor + pmt * (factor - 1.0) / r + fv
}

/// Derivative of [`tvm_equation`] with respect to the rate.
fn tvm_derivative(n: f64, r: f64, pv: f64, pmt: f64) -> f64 {
    let factor = (1.0 + r).powf(n);
    let dfactor = n * (1.0 + r).powf(n - 1.0);
    pv * dfactor + pmt * ((dfactor * r - (factor - 1.0)) / (r * r))
}

/// Newton's method on the annuity identity, starting at 10%.
///
/// Returns the last estimate when the iteration cap is reached.
fn solve_rate(n: f64, pv: f64, pmt: f64, fv: f64) -> f64 {
    let mut r = NEWTON_INITIAL_RATE;
    for iteration in 0..NEWTON_MAX_ITERATIONS {
        let f = tvm_equation(n, r, pv, pmt, fv);
        let df = tvm_derivative(n, r, pv, pmt);
        if df.abs() < NEWTON_MIN_SLOPE {
            tracing::debug!(iteration, r, "rate solver hit a flat derivative");
            break;
        }
        let next = r - f / df;
        if (next - r).abs() < NEWTON_STEP_TOLERANCE {
            tracing::debug!(iteration, rate = next, "rate solver converged");
            return next;
        }
        r = next;
    }
    r
}

/// Solve the annuity identity for one unknown.
///
/// The four other quantities must be present, otherwise
/// [`CalcError::MissingInputs`] is returned. Solved money amounts are rounded
/// to cents; a solved period count or rate keeps 10 decimals. A zero rate uses
/// the linear form of the identity.
pub fn solve_tvm(inputs: &TvmInputs, solve_for: TvmVariable) -> Result<TvmResult> {
    let need = |value: Option<f64>, variable: TvmVariable| match value {
        Some(v) => Ok(v),
        None if variable == solve_for => Ok(f64::NAN),
        None => Err(CalcError::MissingInputs),
    };
    let n = need(inputs.n, TvmVariable::N)?;
    let rate = need(inputs.rate, TvmVariable::Rate)?;
    let pv = need(inputs.pv, TvmVariable::Pv)?;
    let pmt = need(inputs.pmt, TvmVariable::Pmt)?;
    let fv = need(inputs.fv, TvmVariable::Fv)?;

    let mut result = TvmResult {
        n,
        rate,
        pv,
        pmt,
        fv,
        solved_for: solve_for,
    };

    match solve_for {
        TvmVariable::N => {
            result.n = if rate == 0.0 {
                round10(-(pv + fv) / pmt)
            } else {
                let num = ((pmt - fv * rate) / (pmt + pv * rate)).ln();
                round10(num / (1.0 + rate).ln())
            };
        }
        TvmVariable::Rate => {
            result.rate = round10(solve_rate(n, pv, pmt, fv));
        }
        TvmVariable::Pv => {
            result.pv = if rate == 0.0 {
                cents(-(pmt * n + fv))
            } else {
                let factor = (1.0 + rate).powf(n);
                cents(-(pmt * (factor - 1.0) / (rate * factor) + fv / factor))
            };
        }
        TvmVariable::Pmt => {
            result.pmt = if rate == 0.0 {
                cents(-(pv + fv) / n)
            } else {
                let factor = (1.0 + rate).powf(n);
                cents(-(pv * rate * factor + fv * rate) / (factor - 1.0))
            };
        }
        TvmVariable::Fv => {
            result.fv = if rate == 0.0 {
                cents(-(pv + pmt * n))
            } else {
                let factor = (1.0 + rate).powf(n);
                cents(-(pv * factor + pmt * (factor - 1.0) / rate))
            };
        }
    }

    Ok(result)
}

/// Future value of `principal` compounded `compounds_per_year` times a year.
pub fn compound_interest(
    principal: f64,
    annual_rate: f64,
    compounds_per_year: f64,
    years: f64,
) -> f64 {
    let periodic = annual_rate / compounds_per_year;
    cents(principal * (1.0 + periodic).powf(compounds_per_year * years))
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AmortizationRow {
    pub period: u32,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub balance: f64,
}

/// Monthly amortization schedule for a level-payment loan.
///
/// Money fields are rounded to cents. The last row always closes the balance
/// at exactly zero.
pub fn generate_amortization(
    principal: f64,
    annual_rate: f64,
    total_payments: u32,
) -> Vec<AmortizationRow> {
    if total_payments == 0 {
        return Vec::new();
    }

    let monthly_rate = annual_rate / 12.0;
    let periods = f64::from(total_payments);
    let payment = if monthly_rate == 0.0 {
        principal / periods
    } else {
        let factor = (1.0 + monthly_rate).powf(periods);
        principal * (monthly_rate * factor) / (factor - 1.0)
    };

    let mut balance = principal;
    let mut rows: Vec<AmortizationRow> = (1..=total_payments)
        .map(|period| {
            let interest = balance * monthly_rate;
            let principal_paid = payment - interest;
            balance -= principal_paid;
            AmortizationRow {
                period,
                payment: cents(payment),
                principal: cents(principal_paid),
                interest: cents(interest),
                balance: cents(balance.max(0.0)),
            }
        })
        .collect();

    if let Some(last) = rows.last_mut() {
        last.balance = 0.0;
    }
    rows
}
