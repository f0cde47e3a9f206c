// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Reference singular-value polynomial transforms.
//!
//! Used for benchmarking circuit constructions against the exact transform.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{Result, ValidationError};
use crate::linalg::{dagger, svd};

/// Evaluate a monomial-basis polynomial (ascending coefficients) by Horner.
fn horner(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Polynomial transform of the singular values of `operator`.
///
/// For an even polynomial only the right singular vectors appear:
/// `Σ_k P(s_k) |v_k⟩⟨v_k|`; for an odd polynomial the transform maps right
/// to left singular vectors: `Σ_k P(s_k) |u_k⟩⟨v_k|`. Coefficients are in
/// the monomial basis, ascending.
pub fn singular_value_transform(
    operator: &Array2<Complex64>,
    coeffs: &[f64],
) -> Result<Array2<Complex64>> {
    if coeffs.is_empty() {
        return Err(ValidationError::Field {
            field: "coeffs".into(),
            message: "polynomial needs at least one coefficient".into(),
        }
        .into());
    }

    let (u, s, vh) = svd(operator)?;
    let n = s.len();
    let mut diag = Array2::<Complex64>::zeros((n, n));
    for k in 0..n {
        diag[[k, k]] = Complex64::new(horner(coeffs, s[k]), 0.0);
    }

    let degree = coeffs.len() - 1;
    if degree % 2 == 0 {
        // Σ_k P(s_k) |v_k><v_k|
        Ok(dagger(&vh).dot(&diag).dot(&vh))
    } else {
        // Σ_k P(s_k) |u_k><v_k|
        Ok(u.dot(&diag).dot(&vh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn test_horner() {
        // 1 + 2x + 3x²
        assert!((horner(&[1.0, 2.0, 3.0], 2.0) - 17.0).abs() < 1e-12);
    }

    #[test]
    fn test_odd_identity_polynomial_reproduces_operator() {
        // P(x) = x applied to singular values reproduces the operator
        let a = ndarray::array![[c(0.8), c(0.1)], [c(-0.2), c(0.5)]];
        let out = singular_value_transform(&a, &[0.0, 1.0]).unwrap();
        for i in 0..2 {
            for j in 0..2 {
                assert!((out[[i, j]] - a[[i, j]]).norm() < 1e-9);
            }
        }
    }

    #[test]
    fn test_even_square_polynomial_on_diagonal() {
        // For diagonal positive A, P(x) = x² gives A² on right vectors
        let a = ndarray::array![[c(0.5), c(0.0)], [c(0.0), c(0.25)]];
        let out = singular_value_transform(&a, &[0.0, 0.0, 1.0]).unwrap();
        assert!((out[[0, 0]] - c(0.25)).norm() < 1e-9);
        assert!((out[[1, 1]] - c(0.0625)).norm() < 1e-9);
        assert!(out[[0, 1]].norm() < 1e-9);
    }

    #[test]
    fn test_constant_polynomial_is_scaled_identity() {
        // Even (degree 0) polynomial: Σ P(s_k)|v_k><v_k| = P · I
        let a = ndarray::array![[c(0.3), c(0.1)], [c(0.1), c(0.6)]];
        let out = singular_value_transform(&a, &[2.0]).unwrap();
        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 2.0 } else { 0.0 };
                assert!((out[[i, j]] - c(expected)).norm() < 1e-9);
            }
        }
    }

    #[test]
    fn test_rejects_empty_polynomial() {
        let a = ndarray::array![[c(1.0)]];
        assert!(singular_value_transform(&a, &[]).is_err());
    }
}
