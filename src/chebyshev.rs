// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chebyshev interpolation on the root grid.

use num_complex::Complex64;

use crate::error::{Result, ValidationError};

/// Chebyshev interpolant of a target function.
///
/// Coefficients come from the type-II discrete cosine transform identity on
/// the Chebyshev root grid; with the filter degrees used here the direct
/// cosine sums are cheap, so no transform dependency is pulled in.
#[derive(Debug, Clone)]
pub struct ChebyshevPolynomial {
    degree: u32,
    coeffs: Vec<f64>,
    roots: Vec<f64>,
    extrema: Vec<f64>,
}

impl ChebyshevPolynomial {
    /// Interpolate `target` with a degree-`degree` Chebyshev expansion.
    pub fn fit(target: impl Fn(f64) -> f64, degree: u32) -> Result<Self> {
        let n = (degree + 1) as usize;
        let pi = std::f64::consts::PI;

        let roots: Vec<f64> = (0..n)
            .map(|k| ((k as f64 + 0.5) * pi / n as f64).cos())
            .collect();
        let extrema: Vec<f64> = (0..n).map(|k| (k as f64 * pi / n as f64).cos()).collect();

        let values: Vec<f64> = roots.iter().map(|&x| target(x)).collect();
        for (&x, &v) in roots.iter().zip(values.iter()) {
            if !v.is_finite() {
                return Err(ValidationError::Field {
                    field: "target".into(),
                    message: format!("target function is not finite at {}", x),
                }
                .into());
            }
        }

        let mut coeffs = vec![0.0; n];
        for (k, c) in coeffs.iter_mut().enumerate() {
            let sum: f64 = values
                .iter()
                .enumerate()
                .map(|(j, &v)| v * (pi * k as f64 * (j as f64 + 0.5) / n as f64).cos())
                .sum();
            *c = 2.0 * sum / n as f64;
        }
        coeffs[0] /= 2.0;

        Ok(Self {
            degree,
            coeffs,
            roots,
            extrema,
        })
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// Coefficients of `Σ c_k T_k(x)`.
    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// The interpolation grid (Chebyshev roots).
    pub fn roots(&self) -> &[f64] {
        &self.roots
    }

    pub fn extrema(&self) -> &[f64] {
        &self.extrema
    }

    /// Clenshaw evaluation at a real point.
    pub fn eval(&self, x: f64) -> f64 {
        let mut b1 = 0.0;
        let mut b2 = 0.0;
        for &c in self.coeffs.iter().skip(1).rev() {
            let b0 = c + 2.0 * x * b1 - b2;
            b2 = b1;
            b1 = b0;
        }
        self.coeffs[0] + x * b1 - b2
    }

    /// Clenshaw evaluation at a complex point.
    pub fn eval_complex(&self, x: Complex64) -> Complex64 {
        let mut b1 = Complex64::new(0.0, 0.0);
        let mut b2 = Complex64::new(0.0, 0.0);
        for &c in self.coeffs.iter().skip(1).rev() {
            let b0 = Complex64::new(c, 0.0) + 2.0 * x * b1 - b2;
            b2 = b1;
            b1 = b0;
        }
        Complex64::new(self.coeffs[0], 0.0) + x * b1 - b2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_fit_recovers_chebyshev_basis() {
        // T_2(x) = 2x² − 1
        let p = ChebyshevPolynomial::fit(|x| 2.0 * x * x - 1.0, 2).unwrap();
        assert_abs_diff_eq!(p.coeffs()[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.coeffs()[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.coeffs()[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fit_cubic_monomial() {
        // x³ = (3 T_1 + T_3) / 4
        let p = ChebyshevPolynomial::fit(|x| x * x * x, 3).unwrap();
        assert_abs_diff_eq!(p.coeffs()[1], 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(p.coeffs()[3], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(p.coeffs()[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.coeffs()[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_eval_matches_target_on_grid() {
        let target = |x: f64| (2.5 * x).sin();
        let p = ChebyshevPolynomial::fit(target, 9).unwrap();
        for &x in p.roots() {
            assert!((p.eval(x) - target(x)).abs() < 1e-9);
        }
        // And off-grid with interpolation accuracy
        for &x in &[-0.9, -0.3, 0.1, 0.77] {
            assert!((p.eval(x) - target(x)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_grid_shapes() {
        let p = ChebyshevPolynomial::fit(|x| x, 4).unwrap();
        assert_eq!(p.roots().len(), 5);
        assert_eq!(p.extrema().len(), 5);
        assert_eq!(p.coeffs().len(), 5);
        // Roots are inside (-1, 1), descending
        for w in p.roots().windows(2) {
            assert!(w[0] > w[1]);
        }
        assert!(p.roots().iter().all(|&x| x.abs() < 1.0));
    }

    #[test]
    fn test_eval_complex_agrees_on_real_axis() {
        let p = ChebyshevPolynomial::fit(|x| x * x, 2).unwrap();
        let z = p.eval_complex(Complex64::new(0.3, 0.0));
        assert!((z.re - p.eval(0.3)).abs() < 1e-12);
        assert!(z.im.abs() < 1e-12);
    }

    #[test]
    fn test_fit_rejects_non_finite_target() {
        assert!(ChebyshevPolynomial::fit(|_| f64::NAN, 2).is_err());
    }
}
