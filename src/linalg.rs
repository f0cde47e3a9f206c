// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dense linear-algebra kernels used by the circuit and filter machinery.
//!
//! Everything here targets the small Hilbert-space dimensions the library
//! works with (block-encoding tests, sector-restricted Hamiltonians), so the
//! implementations favour clarity over asymptotics: cyclic Jacobi sweeps for
//! the symmetric eigenproblem and a one-sided Jacobi SVD.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::error::{OperatorError, Result, ValidationError};

/// Kronecker product of a list of matrices, left to right.
pub fn kron_list(mats: &[Array2<Complex64>]) -> Array2<Complex64> {
    let mut out = Array2::from_diag_elem(1, Complex64::new(1.0, 0.0));
    for m in mats {
        out = ndarray::linalg::kron(&out, m);
    }
    out
}

/// Kronecker product of a list of vectors, left to right.
pub fn kron_vec_list(vecs: &[Array1<Complex64>]) -> Array1<Complex64> {
    let mut out = Array1::from_elem(1, Complex64::new(1.0, 0.0));
    for v in vecs {
        let mut next = Array1::zeros(out.len() * v.len());
        for (i, a) in out.iter().enumerate() {
            for (j, b) in v.iter().enumerate() {
                next[i * v.len() + j] = a * b;
            }
        }
        out = next;
    }
    out
}

/// Conjugate transpose.
pub fn dagger(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|x| x.conj())
}

/// Eigendecomposition of a real symmetric matrix by cyclic Jacobi rotations.
///
/// Returns eigenvalues in ascending order and the matching eigenvectors as
/// columns of the second return value.
///
/// # Panics
/// Panics if `a` is not square.
pub fn eigh_symmetric(a: &Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = a.nrows();
    assert_eq!(n, a.ncols(), "eigh_symmetric requires a square matrix");

    let mut m = a.clone();
    let mut v = Array2::<f64>::eye(n);

    let max_sweeps = 64;
    let tol = 1e-14;

    for _ in 0..max_sweeps {
        let mut off = 0.0f64;
        for i in 0..n {
            for j in (i + 1)..n {
                off += m[[i, j]] * m[[i, j]];
            }
        }
        if off.sqrt() < tol {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = m[[p, q]];
                if apq.abs() < 1e-300 {
                    continue;
                }
                let app = m[[p, p]];
                let aqq = m[[q, q]];
                let tau = (aqq - app) / (2.0 * apq);
                let t = if tau >= 0.0 {
                    1.0 / (tau + (1.0 + tau * tau).sqrt())
                } else {
                    -1.0 / (-tau + (1.0 + tau * tau).sqrt())
                };
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = c * t;

                for k in 0..n {
                    let mkp = m[[k, p]];
                    let mkq = m[[k, q]];
                    m[[k, p]] = c * mkp - s * mkq;
                    m[[k, q]] = s * mkp + c * mkq;
                }
                for k in 0..n {
                    let mpk = m[[p, k]];
                    let mqk = m[[q, k]];
                    m[[p, k]] = c * mpk - s * mqk;
                    m[[q, k]] = s * mpk + c * mqk;
                }
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| m[[i, i]].total_cmp(&m[[j, j]]));

    let mut evals = Array1::zeros(n);
    let mut evecs = Array2::zeros((n, n));
    for (dst, &src) in order.iter().enumerate() {
        evals[dst] = m[[src, src]];
        for k in 0..n {
            evecs[[k, dst]] = v[[k, src]];
        }
    }
    (evals, evecs)
}

/// Singular value decomposition by one-sided Jacobi orthogonalisation.
///
/// Returns `(u, s, vh)` with `a = u · diag(s) · vh` and singular values in
/// descending order. Only square inputs are supported, which covers every
/// call site in the crate.
pub fn svd(a: &Array2<Complex64>) -> Result<(Array2<Complex64>, Array1<f64>, Array2<Complex64>)> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(OperatorError::DimensionMismatch {
            expected: n,
            actual: a.ncols(),
        }
        .into());
    }

    let mut w = a.clone();
    let mut v = Array2::<Complex64>::eye(n);

    let max_sweeps = 64;
    let tol = 1e-14;

    for _ in 0..max_sweeps {
        let mut converged = true;
        for p in 0..n {
            for q in (p + 1)..n {
                // Hermitian 2x2 Gram block of columns p, q
                let mut alpha = 0.0f64;
                let mut beta = 0.0f64;
                let mut gamma = Complex64::new(0.0, 0.0);
                for k in 0..n {
                    alpha += w[[k, p]].norm_sqr();
                    beta += w[[k, q]].norm_sqr();
                    gamma += w[[k, p]].conj() * w[[k, q]];
                }
                let denom = (alpha * beta).sqrt();
                if denom <= 0.0 || gamma.norm() <= tol * denom {
                    continue;
                }
                converged = false;

                let phase = Complex64::from_polar(1.0, gamma.arg());
                let g = gamma.norm();
                let tau = (beta - alpha) / (2.0 * g);
                let t = if tau >= 0.0 {
                    1.0 / (tau + (1.0 + tau * tau).sqrt())
                } else {
                    -1.0 / (-tau + (1.0 + tau * tau).sqrt())
                };
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = c * t;

                // Right-multiply by the unitary [[c, s·phase], [-s·phase*, c]]
                for k in 0..n {
                    let wp = w[[k, p]];
                    let wq = w[[k, q]];
                    w[[k, p]] = wp * c - wq * phase.conj() * s;
                    w[[k, q]] = wp * phase * s + wq * c;
                }
                for k in 0..n {
                    let vp = v[[k, p]];
                    let vq = v[[k, q]];
                    v[[k, p]] = vp * c - vq * phase.conj() * s;
                    v[[k, q]] = vp * phase * s + vq * c;
                }
            }
        }
        if converged {
            break;
        }
    }

    // Column norms are the singular values; normalised columns form U.
    let mut sigma: Vec<(usize, f64)> = (0..n)
        .map(|j| {
            let norm: f64 = (0..n).map(|k| w[[k, j]].norm_sqr()).sum::<f64>().sqrt();
            (j, norm)
        })
        .collect();
    sigma.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut u = Array2::<Complex64>::zeros((n, n));
    let mut s_out = Array1::<f64>::zeros(n);
    let mut v_sorted = Array2::<Complex64>::zeros((n, n));
    for (dst, &(src, norm)) in sigma.iter().enumerate() {
        s_out[dst] = norm;
        for k in 0..n {
            v_sorted[[k, dst]] = v[[k, src]];
        }
        if norm > 1e-300 {
            for k in 0..n {
                u[[k, dst]] = w[[k, src]] / Complex64::new(norm, 0.0);
            }
        }
    }

    // Null-space columns of U: complete to an orthonormal basis. Unfilled
    // columns are all-zero and are skipped when projecting.
    for j in 0..n {
        if s_out[j] > 1e-300 {
            continue;
        }
        for cand in 0..n {
            let mut col: Array1<Complex64> = Array1::zeros(n);
            col[cand] = Complex64::new(1.0, 0.0);
            for prev in 0..n {
                let prev_norm: f64 = (0..n).map(|k| u[[k, prev]].norm_sqr()).sum();
                if prev_norm < 0.5 {
                    continue;
                }
                let overlap: Complex64 = (0..n).map(|k| u[[k, prev]].conj() * col[k]).sum();
                for k in 0..n {
                    col[k] -= overlap * u[[k, prev]];
                }
            }
            let norm: f64 = col.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
            if norm > 1e-8 {
                for k in 0..n {
                    u[[k, j]] = col[k] / Complex64::new(norm, 0.0);
                }
                break;
            }
        }
    }

    Ok((u, s_out, dagger(&v_sorted)))
}

/// Complete a unit vector to a unitary whose first column is that vector.
///
/// Gram-Schmidt over the computational basis; used by state-preparation
/// gates, whose action is only pinned on the all-zeros input.
pub fn unitary_completion(state: &Array1<Complex64>) -> Result<Array2<Complex64>> {
    let n = state.len();
    let norm: f64 = state.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
    if (norm - 1.0).abs() > 1e-9 {
        return Err(ValidationError::Field {
            field: "state".into(),
            message: format!("state vector must be normalised, got norm {}", norm),
        }
        .into());
    }

    let mut cols: Vec<Array1<Complex64>> = vec![state.clone()];
    for cand in 0..n {
        if cols.len() == n {
            break;
        }
        let mut col: Array1<Complex64> = Array1::zeros(n);
        col[cand] = Complex64::new(1.0, 0.0);
        for prev in &cols {
            let overlap: Complex64 = prev.iter().zip(col.iter()).map(|(p, c)| p.conj() * c).sum();
            for k in 0..n {
                col[k] -= overlap * prev[k];
            }
        }
        let cnorm: f64 = col.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
        if cnorm > 1e-8 {
            cols.push(col.mapv(|x| x / Complex64::new(cnorm, 0.0)));
        }
    }

    let mut u = Array2::zeros((n, n));
    for (j, col) in cols.iter().enumerate() {
        for k in 0..n {
            u[[k, j]] = col[k];
        }
    }
    Ok(u)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_kron_list_identity() {
        let eye2 = Array2::from_diag_elem(2, c(1.0, 0.0));
        let k = kron_list(&[eye2.clone(), eye2]);
        assert_eq!(k.nrows(), 4);
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((k[[i, j]] - c(expected, 0.0)).norm() < 1e-15);
            }
        }
    }

    #[test]
    fn test_kron_vec_list() {
        let v0 = Array1::from_vec(vec![c(1.0, 0.0), c(0.0, 0.0)]);
        let v1 = Array1::from_vec(vec![c(0.0, 0.0), c(1.0, 0.0)]);
        let k = kron_vec_list(&[v0, v1]);
        // |0> ⊗ |1> = |01> with the first factor most significant
        assert!((k[1] - c(1.0, 0.0)).norm() < 1e-15);
        assert!((k.iter().map(|x| x.norm_sqr()).sum::<f64>() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_eigh_diagonal() {
        let mut a = Array2::zeros((3, 3));
        a[[0, 0]] = 3.0;
        a[[1, 1]] = -1.0;
        a[[2, 2]] = 2.0;
        let (evals, _) = eigh_symmetric(&a);
        assert!((evals[0] - (-1.0)).abs() < 1e-12);
        assert!((evals[1] - 2.0).abs() < 1e-12);
        assert!((evals[2] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_eigh_pauli_x() {
        let mut a = Array2::zeros((2, 2));
        a[[0, 1]] = 1.0;
        a[[1, 0]] = 1.0;
        let (evals, evecs) = eigh_symmetric(&a);
        assert!((evals[0] + 1.0).abs() < 1e-12);
        assert!((evals[1] - 1.0).abs() < 1e-12);
        // A v = λ v for the ground eigenvector
        let v0 = evecs.column(0);
        let av0_0 = a[[0, 1]] * v0[1];
        assert!((av0_0 - evals[0] * v0[0]).abs() < 1e-10);
    }

    #[test]
    fn test_eigh_reconstructs() {
        let a = ndarray::array![[2.0, -1.0, 0.0], [-1.0, 2.0, -1.0], [0.0, -1.0, 2.0]];
        let (evals, evecs) = eigh_symmetric(&a);
        // a = V diag(λ) V^T
        let mut recon = Array2::<f64>::zeros((3, 3));
        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    recon[[i, j]] += evecs[[i, k]] * evals[k] * evecs[[j, k]];
                }
            }
        }
        for i in 0..3 {
            for j in 0..3 {
                assert!((recon[[i, j]] - a[[i, j]]).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_svd_diagonal() {
        let mut a = Array2::zeros((2, 2));
        a[[0, 0]] = c(3.0, 0.0);
        a[[1, 1]] = c(1.0, 0.0);
        let (_, s, _) = svd(&a).unwrap();
        assert!((s[0] - 3.0).abs() < 1e-10);
        assert!((s[1] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_svd_reconstructs() {
        let a = ndarray::array![
            [c(1.0, 0.5), c(-0.3, 0.0), c(0.2, 0.1)],
            [c(0.0, 1.0), c(0.7, -0.2), c(0.5, 0.0)],
            [c(0.4, 0.0), c(0.1, 0.9), c(-1.1, 0.3)]
        ];
        let (u, s, vh) = svd(&a).unwrap();
        let mut recon = Array2::<Complex64>::zeros((3, 3));
        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    recon[[i, j]] += u[[i, k]] * Complex64::new(s[k], 0.0) * vh[[k, j]];
                }
            }
        }
        for i in 0..3 {
            for j in 0..3 {
                assert!(
                    (recon[[i, j]] - a[[i, j]]).norm() < 1e-9,
                    "mismatch at ({}, {})",
                    i,
                    j
                );
            }
        }
        // U unitary
        let udu = dagger(&u).dot(&u);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((udu[[i, j]] - c(expected, 0.0)).norm() < 1e-9);
            }
        }
    }

    #[test]
    fn test_unitary_completion_basis_state() {
        let mut state = Array1::zeros(4);
        state[2] = c(1.0, 0.0);
        let u = unitary_completion(&state).unwrap();
        // First column is the state
        assert!((u[[2, 0]] - c(1.0, 0.0)).norm() < 1e-12);
        // Unitarity
        let udu = dagger(&u).dot(&u);
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((udu[[i, j]] - c(expected, 0.0)).norm() < 1e-10);
            }
        }
    }

    #[test]
    fn test_unitary_completion_superposition() {
        let amp = 1.0 / 2.0f64.sqrt();
        let state = Array1::from_vec(vec![c(amp, 0.0), c(0.0, amp)]);
        let u = unitary_completion(&state).unwrap();
        assert!((u[[0, 0]] - c(amp, 0.0)).norm() < 1e-12);
        assert!((u[[1, 0]] - c(0.0, amp)).norm() < 1e-12);
        let udu = dagger(&u).dot(&u);
        assert!((udu[[0, 1]]).norm() < 1e-10);
    }

    #[test]
    fn test_unitary_completion_rejects_unnormalised() {
        let state = Array1::from_vec(vec![c(2.0, 0.0), c(0.0, 0.0)]);
        assert!(unitary_completion(&state).is_err());
    }
}
