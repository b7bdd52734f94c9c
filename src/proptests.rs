//! Property-based tests for the input engine and the solvers.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::input::{rewrite_operators, sanitize_input};
    use crate::solvers::{
        CubicNature, QuadraticNature, TvmInputs, TvmVariable, generate_amortization,
        linear_regression, solve_cubic, solve_linear_system, solve_quadratic, solve_tvm,
    };

    const PLAIN_TOKENS: &[&str] = &[
        "1", "2", "7", "0", ".", "+", "-", "*", "/", "^", "(", ")", "sin(", "log10(", "pi", "e",
        "3.5", "%",
    ];

    const MARKED_TOKENS: &[&str] = &["√", "∛", "!", "√(", "4!", "pi!"];

    // Expressions built from keypad tokens without symbolic operators
    fn plain_expression() -> impl Strategy<Value = String> {
        proptest::collection::vec(proptest::sample::select(PLAIN_TOKENS), 0..20)
            .prop_map(|tokens| tokens.concat())
    }

    // Expressions that mix in root and factorial markers
    fn marked_expression() -> impl Strategy<Value = String> {
        let token = prop_oneof![
            2 => proptest::sample::select(PLAIN_TOKENS),
            1 => proptest::sample::select(MARKED_TOKENS),
        ];
        proptest::collection::vec(token, 1..20).prop_map(|tokens| tokens.concat())
    }

    fn keystrokes() -> impl Strategy<Value = Vec<&'static str>> {
        let vocabulary: Vec<&'static str> = PLAIN_TOKENS
            .iter()
            .chain(MARKED_TOKENS)
            .copied()
            .chain([" mod ", "cos("])
            .collect();
        proptest::collection::vec(proptest::sample::select(vocabulary), 0..40)
    }

    fn coeff() -> impl Strategy<Value = f64> {
        (-10i32..=10).prop_map(f64::from)
    }

    fn leading_coeff() -> impl Strategy<Value = f64> {
        prop_oneof![(-5i32..=-1), (1i32..=5)].prop_map(f64::from)
    }

    fn polynomial(coeffs: &[f64], x: f64) -> f64 {
        coeffs.iter().fold(0.0, |acc, c| acc * x + c)
    }

    // Residual bound for evaluating a polynomial at x after rounding.
    fn tolerance(coeffs: &[f64], x: f64) -> f64 {
        let scale: f64 = coeffs
            .iter()
            .rev()
            .enumerate()
            .map(|(k, c)| c.abs() * x.abs().powi(k as i32))
            .sum();
        1e-6 * (1.0 + scale)
    }

    proptest! {
        #[test]
        fn rewrite_is_identity_without_markers(expr in plain_expression()) {
            prop_assert_eq!(rewrite_operators(&expr).unwrap(), expr);
        }

        #[test]
        fn rewrite_removes_all_markers(expr in marked_expression()) {
            let rewritten = rewrite_operators(&expr).unwrap();
            prop_assert!(!rewritten.contains(['√', '∛', '!']), "{} -> {}", expr, rewritten);
        }

        #[test]
        fn validator_keeps_parentheses_balanced(tokens in keystrokes()) {
            let mut expr = String::new();
            for token in tokens {
                sanitize_input(&expr, token).apply(&mut expr);
                let open = expr.chars().filter(|&c| c == '(').count();
                let close = expr.chars().filter(|&c| c == ')').count();
                prop_assert!(close <= open, "unbalanced: {}", expr);
            }
        }

        #[test]
        fn quadratic_roots_satisfy_equation(a in leading_coeff(), b in coeff(), c in coeff()) {
            let result = solve_quadratic(a, b, c).unwrap();
            prop_assume!(result.nature != QuadraticNature::ComplexPair);
            for root in &result.roots {
                let x: f64 = root.parse().unwrap();
                prop_assert!(polynomial(&[a, b, c], x).abs() < tolerance(&[a, b, c], x));
            }
        }

        #[test]
        fn cubic_real_roots_satisfy_equation(
            a in leading_coeff(),
            b in coeff(),
            c in coeff(),
            d in coeff(),
        ) {
            let result = solve_cubic(a, b, c, d).unwrap();
            let expected_real = match result.nature {
                CubicNature::TripleRoot | CubicNature::OneRealTwoComplex => 1,
                CubicNature::RealRepeated => 2,
                CubicNature::ThreeRealDistinct => 3,
            };
            prop_assert_eq!(result.real_roots.len(), expected_real);
            for &x in &result.real_roots {
                let coeffs = [a, b, c, d];
                prop_assert!(
                    polynomial(&coeffs, x).abs() < tolerance(&coeffs, x),
                    "{:?} at {}", coeffs, x
                );
            }
        }

        #[test]
        fn linear_solution_satisfies_system(
            matrix in proptest::collection::vec(proptest::collection::vec(coeff(), 3), 3),
            constants in proptest::collection::vec(coeff(), 3),
        ) {
            let result = solve_linear_system(&matrix, &constants).unwrap();
            prop_assume!(result.solvable);
            for (row, &b) in matrix.iter().zip(&constants) {
                let lhs: f64 = row.iter().zip(&result.solution).map(|(a, x)| a * x).sum();
                let scale: f64 = row.iter().zip(&result.solution).map(|(a, x)| (a * x).abs()).sum();
                prop_assert!((lhs - b).abs() < 1e-6 * (1.0 + scale));
            }
        }

        #[test]
        fn tvm_solution_closes_identity(
            n in 1u32..120,
            rate in 0.001f64..0.05,
            pv in -100_000f64..-100.0,
            pmt in -1_000f64..0.0,
            solve_for in prop_oneof![
                Just(TvmVariable::N),
                Just(TvmVariable::Rate),
                Just(TvmVariable::Pv),
                Just(TvmVariable::Pmt),
                Just(TvmVariable::Fv),
            ],
        ) {
            let n = f64::from(n);
            let factor = (1.0 + rate).powf(n);
            let annuity = (factor - 1.0) / rate;
            // Future value that balances the generated cash flows.
            let fv = -(pv * factor + pmt * annuity);

            let mut inputs = TvmInputs {
                n: Some(n),
                rate: Some(rate),
                pv: Some(pv),
                pmt: Some(pmt),
                fv: Some(fv),
            };
            match solve_for {
                TvmVariable::N => inputs.n = None,
                TvmVariable::Rate => inputs.rate = None,
                TvmVariable::Pv => inputs.pv = None,
                TvmVariable::Pmt => inputs.pmt = None,
                TvmVariable::Fv => inputs.fv = None,
            }
            let r = solve_tvm(&inputs, solve_for).unwrap();
            prop_assert_eq!(r.solved_for, solve_for);

            let factor = (1.0 + r.rate).powf(r.n);
            let annuity = (factor - 1.0) / r.rate;
            let residual = r.pv * factor + r.pmt * annuity + r.fv;
            // Cent rounding of a solved amount, plus float noise on the flows.
            let scale = r.pv.abs() * factor + r.pmt.abs() * annuity + r.fv.abs();
            let bound = 0.005 * (1.0 + factor + annuity) + 1e-9 * scale;
            prop_assert!(residual.abs() < bound, "{:?}: residual {}", solve_for, residual);
        }

        #[test]
        fn amortization_repays_principal(
            principal in 1_000f64..1_000_000.0,
            annual_rate in 0.0f64..0.2,
            payments in 1u32..480,
        ) {
            let rows = generate_amortization(principal, annual_rate, payments);
            prop_assert_eq!(rows.len(), payments as usize);
            prop_assert_eq!(rows.last().map(|r| r.balance), Some(0.0));

            let repaid: f64 = rows.iter().map(|r| r.principal).sum();
            prop_assert!((repaid - principal).abs() <= 0.005 * f64::from(payments) + 1e-6);
        }

        #[test]
        fn linear_r_squared_in_unit_interval(
            points in proptest::collection::vec((coeff(), coeff()), 2..20),
        ) {
            let (xs, ys): (Vec<f64>, Vec<f64>) = points.into_iter().unzip();
            prop_assume!(xs.iter().any(|&x| x != xs[0]));
            let result = linear_regression(&xs, &ys).unwrap();
            prop_assert!((0.0..=1.0).contains(&result.r_squared));
        }

        #[test]
        fn exact_linear_data_fits_perfectly(
            slope in coeff(),
            intercept in coeff(),
            xs in proptest::collection::vec(coeff(), 2..20),
        ) {
            prop_assume!(xs.iter().any(|&x| x != xs[0]));
            let ys: Vec<f64> = xs.iter().map(|x| slope * x + intercept).collect();
            let result = linear_regression(&xs, &ys).unwrap();
            prop_assert!((result.r_squared - 1.0).abs() < 1e-9);
        }
    }
}
