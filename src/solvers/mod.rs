//! Numerical solvers working on plain numeric inputs.
//!
//! Every solver is a value-in/value-out function. Invalid inputs fail with a
//! displayable [`crate::error::CalcError`]; heuristic routines report
//! non-convergence through their result types instead.

mod calculus;
mod equations;
mod finance;
mod regression;
mod stats;
mod vectors;

pub use calculus::{
    Approach, InfinityDirection, LimitOutcome, LimitResult, OneSidedLimit, compute_integral,
    compute_integral_trapezoidal, compute_limit, compute_limit_at_infinity, format_limit_result,
};
pub use equations::{
    CubicNature, CubicResult, LinearSystemResult, QuadraticNature, QuadraticResult, Vertex,
    solve_cubic, solve_linear_system, solve_quadratic,
};
pub use finance::{
    AmortizationRow, TvmInputs, TvmResult, TvmVariable, compound_interest, generate_amortization,
    solve_tvm,
};
pub use regression::{
    RegressionModel, RegressionResult, exponential_regression, linear_regression,
    logarithmic_regression, power_regression, quadratic_regression, regression,
};
pub use stats::{DescriptiveStats, descriptive_stats};
pub use vectors::{
    ORTHOGONALITY_TOLERANCE, angle_between, are_parallel, are_perpendicular, cross_product,
    distance, dot_product, format_vector, magnitude, normalize, parse_vector, projection,
    scalar_multiply, scalar_projection, vector_add, vector_subtract,
};

use crate::calculator::round_to;

/// Round to 10 decimals, the precision solver outputs are reported at.
fn round10(value: f64) -> f64 {
    round_to(value, 10)
}

/// Format a solver output after rounding to 10 decimals.
fn format_number(value: f64) -> String {
    format!("{}", round10(value))
}
