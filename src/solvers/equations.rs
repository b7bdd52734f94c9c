//! Closed-form polynomial root finding and Gaussian elimination.

use serde::Serialize;
use std::f64::consts::PI;

use super::{format_number, round10};
use crate::error::{CalcError, Result};

/// Magnitude below which the cubic discriminant and depressed coefficient count as zero.
const CUBIC_TOLERANCE: f64 = 1e-10;

/// Magnitude below which a pivot marks the linear system unsolvable.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Kind of roots a quadratic has.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuadraticNature {
    TwoReal,
    Repeated,
    ComplexPair,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuadraticResult {
    /// Both roots, formatted. Complex roots read `re + imi` / `re - imi`.
    pub roots: [String; 2],
    pub discriminant: f64,
    pub vertex: Vertex,
    pub nature: QuadraticNature,
}

/// Kind of roots a cubic has, decided by the depressed-cubic discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CubicNature {
    /// One real root of multiplicity three.
    TripleRoot,
    /// Two real roots, one of them repeated.
    RealRepeated,
    OneRealTwoComplex,
    ThreeRealDistinct,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CubicResult {
    pub roots: Vec<String>,
    /// The real roots among `roots`, unformatted.
    pub real_roots: Vec<f64>,
    pub nature: CubicNature,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LinearSystemResult {
    pub solvable: bool,
    pub solution: Vec<f64>,
}

fn complex_pair(re: f64, im: f64) -> [String; 2] {
    let re = format_number(re);
    let im = format_number(im.abs());
    [format!("{} + {}i", re, im), format!("{} - {}i", re, im)]
}

/// Solve `ax² + bx + c = 0`.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Result<QuadraticResult> {
    if a == 0.0 {
        return Err(CalcError::ZeroLeadingCoefficient {
            equation: "quadratic",
        });
    }

    let discriminant = b * b - 4.0 * a * c;
    let vertex_x = -b / (2.0 * a);
    let vertex_y = a * vertex_x * vertex_x + b * vertex_x + c;

    let (roots, nature) = if discriminant > 0.0 {
        let sqrt_d = discriminant.sqrt();
        let r1 = (-b + sqrt_d) / (2.0 * a);
        let r2 = (-b - sqrt_d) / (2.0 * a);
        ([format_number(r1), format_number(r2)], QuadraticNature::TwoReal)
    } else if discriminant == 0.0 {
        let r = format_number(vertex_x);
        ([r.clone(), r], QuadraticNature::Repeated)
    } else {
        let imag = (-discriminant).sqrt() / (2.0 * a);
        (complex_pair(vertex_x, imag), QuadraticNature::ComplexPair)
    };

    Ok(QuadraticResult {
        roots,
        discriminant,
        vertex: Vertex {
            x: round10(vertex_x),
            y: round10(vertex_y),
        },
        nature,
    })
}

/// Solve `ax³ + bx² + cx + d = 0` through the depressed cubic `t³ + pt + q = 0`.
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Result<CubicResult> {
    if a == 0.0 {
        return Err(CalcError::ZeroLeadingCoefficient { equation: "cubic" });
    }

    // Monic form x³ + b'x² + c'x + d'.
    let (b, c, d) = (b / a, c / a, d / a);
    let shift = b / 3.0;

    let p = c - b * b / 3.0;
    let q = d - b * c / 3.0 + 2.0 * b * b * b / 27.0;
    let disc = q * q / 4.0 + p * p * p / 27.0;

    let (real_roots, complex, nature) = if disc.abs() < CUBIC_TOLERANCE {
        if p.abs() < CUBIC_TOLERANCE {
            (vec![-shift], None, CubicNature::TripleRoot)
        } else {
            let u = (-q / 2.0).cbrt();
            (
                vec![2.0 * u - shift, -u - shift],
                None,
                CubicNature::RealRepeated,
            )
        }
    } else if disc > 0.0 {
        let sqrt_disc = disc.sqrt();
        let u = (-q / 2.0 + sqrt_disc).cbrt();
        let v = (-q / 2.0 - sqrt_disc).cbrt();
        let re = -(u + v) / 2.0 - shift;
        let im = 3f64.sqrt() / 2.0 * (u - v);
        (
            vec![u + v - shift],
            Some(complex_pair(re, im)),
            CubicNature::OneRealTwoComplex,
        )
    } else {
        let m = 2.0 * (-p / 3.0).sqrt();
        let theta = ((3.0 * q) / (p * m)).clamp(-1.0, 1.0).acos() / 3.0;
        let roots = (0..3)
            .map(|k| m * (theta - 2.0 * PI * k as f64 / 3.0).cos() - shift)
            .collect();
        (roots, None, CubicNature::ThreeRealDistinct)
    };

    tracing::debug!(p, q, disc, ?nature, "solved cubic");

    let mut roots: Vec<String> = real_roots.iter().map(|&r| format_number(r)).collect();
    if let Some(pair) = complex {
        roots.extend(pair);
    }

    Ok(CubicResult {
        roots,
        real_roots: real_roots.into_iter().map(round10).collect(),
        nature,
    })
}

fn check_dimensions(matrix: &[Vec<f64>], constants: &[f64]) -> Result<()> {
    let n = matrix.len();
    if n == 0 {
        return Err(CalcError::DimensionMismatch("Matrix is empty".into()));
    }
    if constants.len() != n {
        return Err(CalcError::DimensionMismatch(format!(
            "Expected {} constants, got {}",
            n,
            constants.len()
        )));
    }
    if let Some(row) = matrix.iter().position(|row| row.len() != n) {
        return Err(CalcError::DimensionMismatch(format!(
            "Row {} has {} entries, expected {}",
            row + 1,
            matrix[row].len(),
            n
        )));
    }
    Ok(())
}

/// Row at or below `col` with the largest magnitude in that column.
///
/// Ties keep the topmost row.
fn pivot_row(aug: &[Vec<f64>], col: usize) -> usize {
    (col + 1..aug.len()).fold(col, |best, row| {
        if aug[row][col].abs() > aug[best][col].abs() {
            row
        } else {
            best
        }
    })
}

/// Gaussian elimination with partial pivoting on a square system.
///
/// Returns `None` when a pivot falls below the tolerance. Inputs must already
/// have matching dimensions.
pub(crate) fn gaussian_elimination(matrix: &[Vec<f64>], constants: &[f64]) -> Option<Vec<f64>> {
    let n = matrix.len();
    let mut aug: Vec<Vec<f64>> = matrix
        .iter()
        .zip(constants)
        .map(|(row, &c)| {
            let mut row = row.clone();
            row.push(c);
            row
        })
        .collect();

    for col in 0..n {
        let pivot = pivot_row(&aug, col);
        aug.swap(col, pivot);

        if aug[col][col].abs() < PIVOT_TOLERANCE {
            return None;
        }

        for row in col + 1..n {
            let factor = aug[row][col] / aug[col][col];
            for j in col..=n {
                aug[row][j] -= factor * aug[col][j];
            }
        }
    }

    let mut solution = vec![0.0; n];
    for i in (0..n).rev() {
        let tail: f64 = (i + 1..n).map(|j| aug[i][j] * solution[j]).sum();
        solution[i] = (aug[i][n] - tail) / aug[i][i];
    }
    Some(solution)
}

/// Solve `matrix · x = constants`.
///
/// A near-zero pivot yields `solvable: false` with an empty solution, whether
/// the system is inconsistent or has infinitely many solutions.
pub fn solve_linear_system(matrix: &[Vec<f64>], constants: &[f64]) -> Result<LinearSystemResult> {
    check_dimensions(matrix, constants)?;

    Ok(match gaussian_elimination(matrix, constants) {
        Some(solution) => LinearSystemResult {
            solvable: true,
            solution: solution.into_iter().map(round10).collect(),
        },
        None => LinearSystemResult {
            solvable: false,
            solution: Vec::new(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic_at(a: f64, b: f64, c: f64, d: f64, x: f64) -> f64 {
        ((a * x + b) * x + c) * x + d
    }

    #[test]
    fn test_quadratic_two_real_roots() {
        let result = solve_quadratic(1.0, -5.0, 6.0).unwrap();
        assert_eq!(result.roots, ["3".to_string(), "2".to_string()]);
        assert_eq!(result.discriminant, 1.0);
        assert_eq!(result.vertex, Vertex { x: 2.5, y: -0.25 });
        assert_eq!(result.nature, QuadraticNature::TwoReal);
    }

    #[test]
    fn test_quadratic_repeated_root() {
        let result = solve_quadratic(1.0, -4.0, 4.0).unwrap();
        assert_eq!(result.roots, ["2".to_string(), "2".to_string()]);
        assert_eq!(result.nature, QuadraticNature::Repeated);
    }

    #[test]
    fn test_quadratic_complex_roots() {
        let result = solve_quadratic(1.0, 2.0, 5.0).unwrap();
        assert_eq!(result.roots, ["-1 + 2i".to_string(), "-1 - 2i".to_string()]);
        assert_eq!(result.discriminant, -16.0);

        // Negative leading coefficient keeps the imaginary part positive.
        let result = solve_quadratic(-1.0, 0.0, -4.0).unwrap();
        assert_eq!(result.roots, ["0 + 2i".to_string(), "0 - 2i".to_string()]);
    }

    #[test]
    fn test_quadratic_zero_leading_coefficient() {
        let err = solve_quadratic(0.0, 1.0, 1.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Coefficient a cannot be zero for a quadratic equation"
        );
    }

    #[test]
    fn test_cubic_three_real_roots() {
        // (x-1)(x-2)(x-3)
        let result = solve_cubic(1.0, -6.0, 11.0, -6.0).unwrap();
        assert_eq!(result.nature, CubicNature::ThreeRealDistinct);
        let mut roots = result.real_roots.clone();
        roots.sort_by(f64::total_cmp);
        assert_eq!(roots, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_cubic_one_real_two_complex() {
        // x³ - 1
        let result = solve_cubic(1.0, 0.0, 0.0, -1.0).unwrap();
        assert_eq!(result.nature, CubicNature::OneRealTwoComplex);
        assert_eq!(result.roots.len(), 3);
        assert_eq!(result.roots[0], "1");
        assert_eq!(result.roots[1], "-0.5 + 0.8660254038i");
        assert_eq!(result.roots[2], "-0.5 - 0.8660254038i");
    }

    #[test]
    fn test_cubic_repeated_roots() {
        // (x-1)³
        let result = solve_cubic(1.0, -3.0, 3.0, -1.0).unwrap();
        assert_eq!(result.nature, CubicNature::TripleRoot);
        assert_eq!(result.roots, vec!["1".to_string()]);

        // (x-1)²(x+2) = x³ - 3x + 2
        let result = solve_cubic(1.0, 0.0, -3.0, 2.0).unwrap();
        assert_eq!(result.nature, CubicNature::RealRepeated);
        assert_eq!(result.real_roots, vec![-2.0, 1.0]);
    }

    #[test]
    fn test_cubic_roots_satisfy_polynomial() {
        let (a, b, c, d) = (2.0, -4.0, -22.0, 24.0);
        let result = solve_cubic(a, b, c, d).unwrap();
        for root in result.real_roots {
            assert!(cubic_at(a, b, c, d, root).abs() < 1e-6);
        }
    }

    #[test]
    fn test_cubic_zero_leading_coefficient() {
        assert_eq!(
            solve_cubic(0.0, 1.0, 1.0, 1.0),
            Err(CalcError::ZeroLeadingCoefficient { equation: "cubic" })
        );
    }

    #[test]
    fn test_linear_system() {
        let result =
            solve_linear_system(&[vec![2.0, 1.0], vec![1.0, -1.0]], &[5.0, 1.0]).unwrap();
        assert!(result.solvable);
        assert_eq!(result.solution, vec![2.0, 1.0]);
    }

    #[test]
    fn test_linear_system_needs_pivoting() {
        let matrix = vec![
            vec![0.0, 1.0, 1.0],
            vec![1.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
        ];
        let result = solve_linear_system(&matrix, &[5.0, 4.0, 3.0]).unwrap();
        assert!(result.solvable);
        assert_eq!(result.solution, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_pivot_ties_keep_first_row() {
        let aug = vec![
            vec![1.0, 2.0, 3.0],
            vec![-4.0, 1.0, 0.0],
            vec![4.0, 5.0, 1.0],
        ];
        assert_eq!(pivot_row(&aug, 0), 1);
        assert_eq!(pivot_row(&aug, 1), 2);
    }

    #[test]
    fn test_linear_system_singular() {
        // Inconsistent and dependent systems are both reported unsolvable.
        let matrix = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        let inconsistent = solve_linear_system(&matrix, &[1.0, 3.0]).unwrap();
        let dependent = solve_linear_system(&matrix, &[1.0, 2.0]).unwrap();
        assert!(!inconsistent.solvable);
        assert!(!dependent.solvable);
        assert!(dependent.solution.is_empty());
    }

    #[test]
    fn test_linear_system_dimension_mismatch() {
        let err = solve_linear_system(&[vec![1.0, 2.0], vec![3.0]], &[1.0, 2.0]);
        assert!(matches!(err, Err(CalcError::DimensionMismatch(_))));

        let err = solve_linear_system(&[vec![1.0]], &[1.0, 2.0]);
        assert!(matches!(err, Err(CalcError::DimensionMismatch(_))));

        let err = solve_linear_system(&[], &[]);
        assert!(matches!(err, Err(CalcError::DimensionMismatch(_))));
    }
}
