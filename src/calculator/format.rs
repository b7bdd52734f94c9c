//! Formatting of evaluation results.

/// Denominator bound for [`to_fraction`].
const MAX_DENOMINATOR: i64 = 1_000_000;

/// Round to `decimals` decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    // Avoid printing "-0".
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Exponential notation with a signed exponent, e.g. `1.234568e+12`.
fn to_exponential(value: f64, digits: usize) -> String {
    let formatted = format!("{:.*e}", digits, value);
    match formatted.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => formatted,
    }
}

/// Format a numeric result.
///
/// Very large (`≥ 1e12`) and very small (`< 1e-6`) magnitudes use exponential
/// notation with 6 fractional digits. Everything else is rounded to 10 decimals.
pub fn format_result(value: f64) -> String {
    if !value.is_finite() {
        return match value {
            v if v.is_nan() => "NaN".to_string(),
            v if v > 0.0 => "Infinity".to_string(),
            _ => "-Infinity".to_string(),
        };
    }

    let magnitude = value.abs();
    if magnitude >= 1e12 || (magnitude < 1e-6 && value != 0.0) {
        return to_exponential(value, 6);
    }

    format!("{}", round_to(value, 10))
}

/// Format with `digits` significant digits.
///
/// Fixed notation is used for decimal exponents in `-6..digits`, exponential
/// notation otherwise.
pub fn to_precision(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return format_result(value);
    }
    let digits = digits.max(1);
    if value == 0.0 {
        return format!("{:.*}", digits - 1, 0.0);
    }

    // Exponent after rounding to the requested digits.
    let scientific = format!("{:.*e}", digits - 1, value);
    let exponent: i32 = scientific
        .split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0);
    if exponent < -6 || exponent >= digits as i32 {
        return to_exponential(value, digits - 1);
    }
    let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
    format!("{:.*}", decimals, value)
}

/// Insert thousand separators into a run of digits.
fn group_thousands(digits: &str) -> String {
    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a number for display with thousand separators.
pub fn format_display(value: f64) -> String {
    let plain = format_result(value);
    if plain.contains('e') || !value.is_finite() {
        return plain;
    }

    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain.as_str()),
    };

    match unsigned.split_once('.') {
        Some((int_part, frac_part)) => {
            format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
        }
        None => format!("{}{}", sign, group_thousands(unsigned)),
    }
}

/// Best rational approximation of `value` as `n/d`.
///
/// Integers, non-finite values and magnitudes beyond `1e9` are returned in
/// their [`format_result`] form.
pub fn to_fraction(value: f64) -> String {
    if !value.is_finite() || value.fract() == 0.0 || value.abs() > 1e9 {
        return format_result(value);
    }

    let (numer, denom) = approximate_ratio(value);
    format!("{}/{}", numer, denom)
}

/// Continued-fraction convergents of `value`, stopping at [`MAX_DENOMINATOR`].
fn approximate_ratio(value: f64) -> (i64, i64) {
    let sign = if value < 0.0 { -1 } else { 1 };
    let target = value.abs();
    let mut x = target;

    let (mut h_prev, mut h) = (0i64, 1i64);
    let (mut k_prev, mut k) = (1i64, 0i64);

    loop {
        let a = x.floor() as i64;
        let h_next = a * h + h_prev;
        let k_next = a * k + k_prev;
        if k_next > MAX_DENOMINATOR {
            break;
        }
        (h_prev, h) = (h, h_next);
        (k_prev, k) = (k, k_next);

        let frac = x - x.floor();
        if frac < 1e-12 || (h as f64 / k as f64 - target).abs() < 1e-12 {
            break;
        }
        x = 1.0 / frac;
    }

    (sign * h, k)
}
