//! Vector arithmetic on n-dimensional `f64` slices.

use std::f64::consts::PI;

use crate::calculator::round_to;
use crate::error::{CalcError, Result};

/// Tolerance used by [`are_parallel`] and [`are_perpendicular`].
pub const ORTHOGONALITY_TOLERANCE: f64 = 1e-10;

fn same_dimension(a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        return Err(CalcError::DimensionMismatch(
            "Vectors must have the same dimension".to_string(),
        ));
    }
    Ok(())
}

pub fn magnitude(v: &[f64]) -> f64 {
    v.iter().map(|c| c * c).sum::<f64>().sqrt()
}

pub fn normalize(v: &[f64]) -> Result<Vec<f64>> {
    let mag = magnitude(v);
    if mag == 0.0 {
        return Err(CalcError::ZeroVector("normalize"));
    }
    Ok(v.iter().map(|c| c / mag).collect())
}

pub fn dot_product(a: &[f64], b: &[f64]) -> Result<f64> {
    same_dimension(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Cross product, perpendicular to both inputs.
pub fn cross_product(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn vector_add(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    same_dimension(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| x + y).collect())
}

pub fn vector_subtract(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    same_dimension(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| x - y).collect())
}

pub fn scalar_multiply(v: &[f64], scalar: f64) -> Vec<f64> {
    v.iter().map(|c| c * scalar).collect()
}

/// Angle between two vectors in radians, in `[0, π]`.
pub fn angle_between(a: &[f64], b: &[f64]) -> Result<f64> {
    let dot = dot_product(a, b)?;
    let (mag_a, mag_b) = (magnitude(a), magnitude(b));
    if mag_a == 0.0 || mag_b == 0.0 {
        return Err(CalcError::ZeroVector("compute angle with"));
    }
    // Rounding can push the cosine just outside [-1, 1].
    Ok((dot / (mag_a * mag_b)).clamp(-1.0, 1.0).acos())
}

/// Vector projection of `a` onto `b`.
pub fn projection(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    let dot = dot_product(a, b)?;
    let mag_b_squared = dot_product(b, b)?;
    if mag_b_squared == 0.0 {
        return Err(CalcError::ZeroVector("project onto"));
    }
    Ok(scalar_multiply(b, dot / mag_b_squared))
}

/// Signed length of the projection of `a` onto `b`.
pub fn scalar_projection(a: &[f64], b: &[f64]) -> Result<f64> {
    let mag_b = magnitude(b);
    if mag_b == 0.0 {
        return Err(CalcError::ZeroVector("project onto"));
    }
    Ok(dot_product(a, b)? / mag_b)
}

pub fn are_parallel(a: &[f64], b: &[f64], tolerance: f64) -> Result<bool> {
    let angle = angle_between(a, b)?;
    Ok(angle.abs() < tolerance || (angle - PI).abs() < tolerance)
}

pub fn are_perpendicular(a: &[f64], b: &[f64], tolerance: f64) -> Result<bool> {
    Ok(dot_product(a, b)?.abs() < tolerance)
}

/// Euclidean distance between two points.
pub fn distance(a: &[f64], b: &[f64]) -> Result<f64> {
    Ok(magnitude(&vector_subtract(a, b)?))
}

/// Parse `"[1, 2, 3]"`, `"(1 2 3)"` or `"1,2,3"` into components.
pub fn parse_vector(input: &str) -> Result<Vec<f64>> {
    let cleaned: String = input
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '(' | ')'))
        .collect();
    cleaned
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>()
                .map_err(|_| CalcError::MalformedExpression("Invalid vector format".to_string()))
        })
        .collect()
}

/// Format as `[a, b, c]` with each component rounded to `precision` decimals.
pub fn format_vector(v: &[f64], precision: i32) -> String {
    let parts: Vec<String> = v
        .iter()
        .map(|&c| format!("{}", round_to(c, precision)))
        .collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_magnitude_and_normalize() {
        assert_eq!(magnitude(&[3.0, 4.0]), 5.0);
        assert_eq!(normalize(&[3.0, 4.0]).unwrap(), vec![0.6, 0.8]);
        assert_eq!(
            normalize(&[0.0, 0.0]).unwrap_err().to_string(),
            "Cannot normalize zero vector"
        );
    }

    #[test]
    fn test_dot_and_cross() {
        assert_eq!(dot_product(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap(), 32.0);
        assert_eq!(
            cross_product([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            [0.0, 0.0, 1.0]
        );
        let err = dot_product(&[1.0], &[1.0, 2.0]).unwrap_err();
        assert_eq!(err.to_string(), "Vectors must have the same dimension");
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(vector_add(&[1.0, 2.0], &[3.0, 4.0]).unwrap(), vec![4.0, 6.0]);
        assert_eq!(vector_subtract(&[1.0, 2.0], &[3.0, 4.0]).unwrap(), vec![-2.0, -2.0]);
        assert_eq!(scalar_multiply(&[1.0, -2.0], 3.0), vec![3.0, -6.0]);
        assert!(vector_add(&[1.0], &[]).is_err());
    }

    #[test]
    fn test_angle_between() {
        let right = angle_between(&[1.0, 0.0], &[0.0, 2.0]).unwrap();
        assert!(close(right, PI / 2.0));
        // Parallel inputs must not produce NaN from a cosine slightly above 1.
        let zero = angle_between(&[0.1, 0.2, 0.3], &[0.2, 0.4, 0.6]).unwrap();
        assert!(zero.is_finite() && zero < 1e-6);
        assert_eq!(
            angle_between(&[0.0, 0.0], &[1.0, 0.0]).unwrap_err().to_string(),
            "Cannot compute angle with zero vector"
        );
    }

    #[test]
    fn test_projections() {
        assert_eq!(projection(&[2.0, 3.0], &[1.0, 0.0]).unwrap(), vec![2.0, 0.0]);
        assert_eq!(scalar_projection(&[2.0, 3.0], &[0.0, 2.0]).unwrap(), 3.0);
        assert_eq!(
            projection(&[1.0, 1.0], &[0.0, 0.0]).unwrap_err(),
            CalcError::ZeroVector("project onto")
        );
    }

    #[test]
    fn test_parallel_and_perpendicular() {
        let tol = ORTHOGONALITY_TOLERANCE;
        assert!(are_parallel(&[3.0, 4.0], &[-6.0, -8.0], tol).unwrap());
        assert!(!are_parallel(&[1.0, 2.0], &[2.0, 1.0], tol).unwrap());
        assert!(are_perpendicular(&[1.0, 1.0], &[1.0, -1.0], tol).unwrap());
        assert!(!are_perpendicular(&[1.0, 1.0], &[1.0, 0.0], tol).unwrap());
    }

    #[test]
    fn test_distance() {
        assert_eq!(distance(&[1.0, 1.0], &[4.0, 5.0]).unwrap(), 5.0);
    }

    #[test]
    fn test_parse_and_format() {
        assert_eq!(parse_vector("[1, 2, 3]").unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(parse_vector("(1.5 -2)").unwrap(), vec![1.5, -2.0]);
        assert_eq!(parse_vector("4,5").unwrap(), vec![4.0, 5.0]);
        assert!(parse_vector("[1, a]").is_err());

        assert_eq!(format_vector(&[1.0 / 3.0, 2.0, -0.5], 4), "[0.3333, 2, -0.5]");
    }
}
