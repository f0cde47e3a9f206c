// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Post-selection of state vectors and unitaries, expectation values, and
//! fixed-point bitstring readout.
//!
//! Slicing follows the crate-wide convention: the sorted qubit list forms the
//! bits of a basis index, first qubit most significant. Post-selecting a
//! unitary without an explicit pre-selection assumes the selected qubits
//! enter in the |0⟩ state.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::circuits::register::{Qubit, RegisterCircuit};
use crate::error::{OperatorError, Result, ValidationError};

fn bit_positions(qubits: &[Qubit]) -> BTreeMap<Qubit, usize> {
    let n = qubits.len();
    qubits
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, q)| (q, n - 1 - i))
        .collect()
}

fn check_selection(
    positions: &BTreeMap<Qubit, usize>,
    selection: &BTreeMap<Qubit, u8>,
) -> Result<()> {
    for (q, &v) in selection {
        if !positions.contains_key(q) {
            return Err(ValidationError::Field {
                field: "postselect".into(),
                message: format!("qubit {} is not in the qubit list", q),
            }
            .into());
        }
        if v > 1 {
            return Err(ValidationError::Field {
                field: "postselect".into(),
                message: format!("value for {} must be 0 or 1, got {}", q, v),
            }
            .into());
        }
    }
    Ok(())
}

/// Selected-bits mask and value over the full index space.
fn mask_value(
    positions: &BTreeMap<Qubit, usize>,
    selection: &BTreeMap<Qubit, u8>,
) -> (usize, usize) {
    let mut mask = 0usize;
    let mut value = 0usize;
    for (q, &v) in selection {
        let bit = positions[q];
        mask |= 1usize << bit;
        if v == 1 {
            value |= 1usize << bit;
        }
    }
    (mask, value)
}

/// Indices of the full space whose selected bits match, ordered by the
/// remaining qubits' bits.
fn selected_indices(n: usize, mask: usize, value: usize) -> Vec<usize> {
    (0..1usize << n)
        .filter(|idx| idx & mask == value)
        .collect()
}

/// Post-select a state vector on the given qubit values.
///
/// The result ranges over the remaining qubits in their original order and
/// is not normalised unless `renorm` is set; renormalising a vanishing
/// vector is an error.
pub fn statevector_postselect(
    qubits: &[Qubit],
    sv: &Array1<Complex64>,
    post: &BTreeMap<Qubit, u8>,
    renorm: bool,
) -> Result<Array1<Complex64>> {
    let n = qubits.len();
    if sv.len() != 1usize << n {
        return Err(OperatorError::DimensionMismatch {
            expected: 1usize << n,
            actual: sv.len(),
        }
        .into());
    }
    let positions = bit_positions(qubits);
    check_selection(&positions, post)?;

    let (mask, value) = mask_value(&positions, post);
    let kept = selected_indices(n, mask, value);
    let mut out = Array1::zeros(kept.len());
    for (j, &idx) in kept.iter().enumerate() {
        out[j] = sv[idx];
    }

    if renorm {
        let norm: f64 = out.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
        if norm < 1e-12 {
            return Err(ValidationError::Field {
                field: "postselect".into(),
                message: "post-selected state vector has vanishing norm".into(),
            }
            .into());
        }
        out.mapv_inplace(|x| x / Complex64::new(norm, 0.0));
    }
    Ok(out)
}

/// Post-/pre-select a unitary on the given qubit values.
///
/// Rows are sliced by `post`, columns by `pre`; without `pre` the selected
/// qubits are assumed to start in |0⟩. `pre`, when given, must select the
/// same qubits as `post`.
pub fn unitary_postselect(
    qubits: &[Qubit],
    unitary: &Array2<Complex64>,
    post: &BTreeMap<Qubit, u8>,
    pre: Option<&BTreeMap<Qubit, u8>>,
) -> Result<Array2<Complex64>> {
    let n = qubits.len();
    if unitary.nrows() != 1usize << n || unitary.ncols() != 1usize << n {
        return Err(OperatorError::DimensionMismatch {
            expected: 1usize << n,
            actual: unitary.nrows(),
        }
        .into());
    }
    let positions = bit_positions(qubits);
    check_selection(&positions, post)?;
    if let Some(pre) = pre {
        check_selection(&positions, pre)?;
        if !pre.keys().eq(post.keys()) {
            return Err(ValidationError::Field {
                field: "preselect".into(),
                message: "pre-selection must cover the same qubits as post-selection".into(),
            }
            .into());
        }
    }

    let (row_mask, row_value) = mask_value(&positions, post);
    let (col_mask, col_value) = match pre {
        Some(pre) => mask_value(&positions, pre),
        None => (row_mask, 0),
    };

    let rows = selected_indices(n, row_mask, row_value);
    let cols = selected_indices(n, col_mask, col_value);
    let mut out = Array2::zeros((rows.len(), cols.len()));
    for (i, &r) in rows.iter().enumerate() {
        for (j, &c) in cols.iter().enumerate() {
            out[[i, j]] = unitary[[r, c]];
        }
    }
    Ok(out)
}

/// Post-select the state vector of a circuit run from all-zeros.
pub fn circuit_statevector_postselect(
    circ: &RegisterCircuit,
    post: &BTreeMap<Qubit, u8>,
    renorm: bool,
) -> Result<Array1<Complex64>> {
    statevector_postselect(&circ.qubits(), &circ.statevector()?, post, renorm)
}

/// Post-select the unitary of a circuit.
pub fn circuit_unitary_postselect(
    circ: &RegisterCircuit,
    post: &BTreeMap<Qubit, u8>,
    pre: Option<&BTreeMap<Qubit, u8>>,
) -> Result<Array2<Complex64>> {
    unitary_postselect(&circ.qubits(), &circ.unitary()?, post, pre)
}

/// `⟨ψ|M|ψ⟩` for a (not necessarily normalised) state vector.
pub fn expectation_value(sv: &Array1<Complex64>, m: &Array2<Complex64>) -> Result<Complex64> {
    if m.nrows() != sv.len() || m.ncols() != sv.len() {
        return Err(OperatorError::DimensionMismatch {
            expected: sv.len(),
            actual: m.nrows(),
        }
        .into());
    }
    let mv = m.dot(sv);
    Ok(sv.iter().zip(mv.iter()).map(|(a, b)| a.conj() * b).sum())
}

/// Fixed-point decimal of a bit tuple: successive bitstrings step by
/// `1 / 2^len`.
pub fn bit_fixed_point(bits: &[u8]) -> f64 {
    let mut value = 0u64;
    for &b in bits {
        value = (value << 1) | u64::from(b & 1);
    }
    value as f64 / (1u64 << bits.len()) as f64
}

/// Map a distribution over bitstrings to one over fixed-point decimals.
pub fn distribution_fixed_point(dist: &BTreeMap<Vec<u8>, f64>) -> Vec<(f64, f64)> {
    dist.iter()
        .map(|(bits, prob)| (bit_fixed_point(bits), *prob))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn qubits(names: &[(&str, u32)]) -> Vec<Qubit> {
        names.iter().map(|(n, i)| Qubit::new(*n, *i)).collect()
    }

    #[test]
    fn test_statevector_postselect_zero() {
        // Two qubits, state (a|00> + b|10>); select q0 = 0 keeps (a, 0)
        let qs = qubits(&[("q", 0), ("q", 1)]);
        let sv = Array1::from_vec(vec![c(0.6, 0.0), c(0.0, 0.0), c(0.8, 0.0), c(0.0, 0.0)]);
        let mut post = BTreeMap::new();
        post.insert(Qubit::new("q", 0), 0u8);
        let out = statevector_postselect(&qs, &sv, &post, false).unwrap();
        assert_eq!(out.len(), 2);
        assert!((out[0] - c(0.6, 0.0)).norm() < 1e-12);
        assert!(out[1].norm() < 1e-12);
    }

    #[test]
    fn test_statevector_postselect_one_with_renorm() {
        let qs = qubits(&[("q", 0), ("q", 1)]);
        let sv = Array1::from_vec(vec![c(0.6, 0.0), c(0.0, 0.0), c(0.8, 0.0), c(0.0, 0.0)]);
        let mut post = BTreeMap::new();
        post.insert(Qubit::new("q", 0), 1u8);
        let out = statevector_postselect(&qs, &sv, &post, true).unwrap();
        assert!((out[0] - c(1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_statevector_postselect_multiple_qubits() {
        let qs = qubits(&[("p", 0), ("q", 0), ("q", 1)]);
        let mut sv = Array1::zeros(8);
        sv[0b101] = c(1.0, 0.0);
        let mut post = BTreeMap::new();
        post.insert(Qubit::new("p", 0), 1u8);
        post.insert(Qubit::new("q", 1), 1u8);
        let out = statevector_postselect(&qs, &sv, &post, false).unwrap();
        assert_eq!(out.len(), 2);
        // Remaining qubit q0 is 0
        assert!((out[0] - c(1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_statevector_postselect_rejects_bad_value() {
        let qs = qubits(&[("q", 0)]);
        let sv = Array1::from_vec(vec![c(1.0, 0.0), c(0.0, 0.0)]);
        let mut post = BTreeMap::new();
        post.insert(Qubit::new("q", 0), 2u8);
        assert!(statevector_postselect(&qs, &sv, &post, false).is_err());
    }

    #[test]
    fn test_statevector_postselect_rejects_unknown_qubit() {
        let qs = qubits(&[("q", 0)]);
        let sv = Array1::from_vec(vec![c(1.0, 0.0), c(0.0, 0.0)]);
        let mut post = BTreeMap::new();
        post.insert(Qubit::new("r", 0), 0u8);
        assert!(statevector_postselect(&qs, &sv, &post, false).is_err());
    }

    #[test]
    fn test_renorm_vanishing_norm_errors() {
        let qs = qubits(&[("q", 0)]);
        let sv = Array1::from_vec(vec![c(0.0, 0.0), c(1.0, 0.0)]);
        let mut post = BTreeMap::new();
        post.insert(Qubit::new("q", 0), 0u8);
        assert!(statevector_postselect(&qs, &sv, &post, true).is_err());
    }

    #[test]
    fn test_unitary_postselect_top_left_block() {
        let qs = qubits(&[("p", 0), ("q", 0)]);
        let mut u = Array2::zeros((4, 4));
        for i in 0..4 {
            for j in 0..4 {
                u[[i, j]] = c((i * 4 + j) as f64, 0.0);
            }
        }
        let mut post = BTreeMap::new();
        post.insert(Qubit::new("p", 0), 0u8);
        let out = unitary_postselect(&qs, &u, &post, None).unwrap();
        // p is the most significant bit: rows/cols 0..2
        assert_eq!(out.nrows(), 2);
        assert!((out[[0, 0]] - c(0.0, 0.0)).norm() < 1e-12);
        assert!((out[[1, 1]] - c(5.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_unitary_postselect_with_preselect() {
        let qs = qubits(&[("p", 0), ("q", 0)]);
        let mut u = Array2::zeros((4, 4));
        for i in 0..4 {
            for j in 0..4 {
                u[[i, j]] = c((i * 4 + j) as f64, 0.0);
            }
        }
        let mut post = BTreeMap::new();
        post.insert(Qubit::new("p", 0), 1u8);
        let mut pre = BTreeMap::new();
        pre.insert(Qubit::new("p", 0), 1u8);
        let out = unitary_postselect(&qs, &u, &post, Some(&pre)).unwrap();
        // Bottom-right block
        assert!((out[[0, 0]] - c(10.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_unitary_postselect_pre_must_match_keys() {
        let qs = qubits(&[("p", 0), ("q", 0)]);
        let u = Array2::from_diag_elem(4, c(1.0, 0.0));
        let mut post = BTreeMap::new();
        post.insert(Qubit::new("p", 0), 0u8);
        let mut pre = BTreeMap::new();
        pre.insert(Qubit::new("q", 0), 0u8);
        assert!(unitary_postselect(&qs, &u, &post, Some(&pre)).is_err());
    }

    #[test]
    fn test_circuit_level_postselect() {
        use crate::circuits::register::RegisterCircuit;

        // H on p, X on q: selecting p = 1 leaves q in |1>
        let mut circ = RegisterCircuit::unnamed();
        let p = circ.add_register("p", 1).unwrap();
        let q = circ.add_register("q", 1).unwrap();
        circ.h(p.qubit(0)).unwrap();
        circ.x(q.qubit(0)).unwrap();

        let mut post = BTreeMap::new();
        post.insert(p.qubit(0), 1u8);
        let sv = circuit_statevector_postselect(&circ, &post, true).unwrap();
        assert!((sv[1] - c(1.0, 0.0)).norm() < 1e-12);

        let u = circuit_unitary_postselect(&circ, &post, None).unwrap();
        // <1_p| (H⊗X) |0_p> = (1/√2) X
        let amp = std::f64::consts::FRAC_1_SQRT_2;
        assert!((u[[0, 1]] - c(amp, 0.0)).norm() < 1e-12);
        assert!((u[[1, 0]] - c(amp, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_expectation_value() {
        let sv = Array1::from_vec(vec![c(1.0, 0.0), c(0.0, 0.0)]);
        let z = ndarray::array![[c(1.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(-1.0, 0.0)]];
        let e = expectation_value(&sv, &z).unwrap();
        assert!((e - c(1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_bit_fixed_point() {
        assert!((bit_fixed_point(&[0, 0]) - 0.0).abs() < 1e-15);
        assert!((bit_fixed_point(&[0, 1]) - 0.25).abs() < 1e-15);
        assert!((bit_fixed_point(&[1, 0]) - 0.5).abs() < 1e-15);
        assert!((bit_fixed_point(&[1, 1]) - 0.75).abs() < 1e-15);
    }

    #[test]
    fn test_distribution_fixed_point() {
        let mut dist = BTreeMap::new();
        dist.insert(vec![1u8, 0], 0.25);
        dist.insert(vec![0u8, 0], 0.75);
        let fixed = distribution_fixed_point(&dist);
        assert_eq!(fixed.len(), 2);
        assert!((fixed[0].0 - 0.0).abs() < 1e-15);
        assert!((fixed[0].1 - 0.75).abs() < 1e-15);
        assert!((fixed[1].0 - 0.5).abs() < 1e-15);
    }
}
