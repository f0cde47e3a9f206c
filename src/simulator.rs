// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! State-vector engine for register circuits.
//!
//! Basis convention: the circuit's qubits in lexicographic order form the
//! bits of a basis index, first qubit most significant. Gates are applied by
//! gathering the amplitudes addressed by their qubits' bit positions and
//! multiplying by the gate matrix.

use std::collections::{BTreeMap, BTreeSet};

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::circuits::gate::Gate;
use crate::circuits::register::{Qubit, RegisterCircuit};
use crate::error::{CircuitError, Result};
use crate::linalg::{dagger, kron_list, unitary_completion};

/// Largest circuit the engine will address.
pub const MAX_QUBITS: usize = 24;

/// State vector of the circuit applied to the all-zeros input.
pub fn circuit_statevector(circ: &RegisterCircuit) -> Result<Array1<Complex64>> {
    let n = circ.n_qubits();
    check_width(n)?;
    let mut state = Array1::zeros(1usize << n);
    state[0] = Complex64::new(1.0, 0.0);
    apply_circuit(circ, &mut state)?;
    Ok(state)
}

/// Full unitary of the circuit, one basis column at a time.
pub fn circuit_unitary(circ: &RegisterCircuit) -> Result<Array2<Complex64>> {
    let n = circ.n_qubits();
    check_width(n)?;
    let dim = 1usize << n;
    let mut u = Array2::zeros((dim, dim));
    for col in 0..dim {
        let mut state = Array1::zeros(dim);
        state[col] = Complex64::new(1.0, 0.0);
        apply_circuit(circ, &mut state)?;
        for row in 0..dim {
            u[[row, col]] = state[row];
        }
    }
    Ok(u)
}

/// Apply every gate of the circuit to `state` in place.
pub fn apply_circuit(circ: &RegisterCircuit, state: &mut Array1<Complex64>) -> Result<()> {
    let n = circ.n_qubits();
    check_width(n)?;
    if state.len() != 1usize << n {
        return Err(CircuitError::InvalidGate(format!(
            "state length {} does not match {} qubits",
            state.len(),
            n
        ))
        .into());
    }
    let positions = qubit_bits(circ);
    for gate in circ.gates() {
        apply_gate(gate, state, &positions)?;
    }
    Ok(())
}

fn check_width(n: usize) -> Result<()> {
    if n > MAX_QUBITS {
        return Err(CircuitError::TooManyQubits {
            n_qubits: n,
            max: MAX_QUBITS,
        }
        .into());
    }
    Ok(())
}

/// Bit position of each qubit within a basis index (first qubit of the
/// sorted order owns the most significant bit).
fn qubit_bits(circ: &RegisterCircuit) -> BTreeMap<Qubit, usize> {
    let qubits = circ.qubits();
    let n = qubits.len();
    qubits
        .into_iter()
        .enumerate()
        .map(|(i, q)| (q, n - 1 - i))
        .collect()
}

fn bit_of(positions: &BTreeMap<Qubit, usize>, q: &Qubit) -> Result<usize> {
    positions
        .get(q)
        .copied()
        .ok_or_else(|| CircuitError::QubitNotInCircuit(q.to_string()).into())
}

fn apply_gate(
    gate: &Gate,
    state: &mut Array1<Complex64>,
    positions: &BTreeMap<Qubit, usize>,
) -> Result<()> {
    match gate {
        Gate::X(q) | Gate::Y(q) | Gate::Z(q) | Gate::H(q) => {
            let m = fixed_matrix(gate);
            apply_multi(state, &m, &[bit_of(positions, q)?]);
        }
        Gate::Rx { angle, qubit } => {
            apply_multi(state, &rotation_matrix('x', *angle), &[bit_of(positions, qubit)?]);
        }
        Gate::Ry { angle, qubit } => {
            apply_multi(state, &rotation_matrix('y', *angle), &[bit_of(positions, qubit)?]);
        }
        Gate::Rz { angle, qubit } => {
            apply_multi(state, &rotation_matrix('z', *angle), &[bit_of(positions, qubit)?]);
        }
        Gate::Cx { control, target } => {
            let x = fixed_matrix(&Gate::X(target.clone()));
            apply_multi_controlled(
                state,
                &x,
                &[bit_of(positions, target)?],
                &[bit_of(positions, control)?],
                &[true],
            );
        }
        Gate::Unitary1 { matrix, qubit } => {
            if matrix.nrows() != 2 || matrix.ncols() != 2 {
                return Err(
                    CircuitError::InvalidGate("Unitary1 payload must be 2x2".into()).into(),
                );
            }
            apply_multi(state, matrix, &[bit_of(positions, qubit)?]);
        }
        Gate::StatePreparation {
            amplitudes,
            qubits,
            adjoint,
        } => {
            let k = qubits.len();
            if amplitudes.len() != 1usize << k {
                return Err(CircuitError::InvalidGate(format!(
                    "state preparation over {} qubits needs {} amplitudes, got {}",
                    k,
                    1usize << k,
                    amplitudes.len()
                ))
                .into());
            }
            let mut u = unitary_completion(amplitudes)?;
            if *adjoint {
                u = dagger(&u);
            }
            let bits = qubit_positions(positions, qubits)?;
            apply_multi(state, &u, &bits);
        }
        Gate::MultiplexedU2 {
            controls,
            targets,
            terms,
        } => {
            let control_bits = qubit_positions(positions, controls)?;
            let target_bits = qubit_positions(positions, targets)?;
            let mut seen = BTreeSet::new();
            for (pattern, ops) in terms {
                if pattern.len() != controls.len() {
                    return Err(CircuitError::InvalidGate(format!(
                        "multiplexor pattern width {} does not match {} controls",
                        pattern.len(),
                        controls.len()
                    ))
                    .into());
                }
                if ops.len() != targets.len() {
                    return Err(CircuitError::InvalidGate(format!(
                        "multiplexor term has {} ops for {} targets",
                        ops.len(),
                        targets.len()
                    ))
                    .into());
                }
                if !seen.insert(pattern.clone()) {
                    return Err(CircuitError::InvalidGate(
                        "duplicate multiplexor control pattern".into(),
                    )
                    .into());
                }
                let block = kron_list(ops);
                apply_multi_controlled(state, &block, &target_bits, &control_bits, pattern);
            }
        }
        Gate::Controlled { controls, body } => {
            let body_u = circuit_unitary(body)?;
            let body_qubits = body.qubits();
            let target_bits = qubit_positions(positions, &body_qubits)?;
            let control_bits = qubit_positions(positions, controls)?;
            let pattern = vec![true; controls.len()];
            apply_multi_controlled(state, &body_u, &target_bits, &control_bits, &pattern);
        }
    }
    Ok(())
}

fn qubit_positions(positions: &BTreeMap<Qubit, usize>, qubits: &[Qubit]) -> Result<Vec<usize>> {
    qubits.iter().map(|q| bit_of(positions, q)).collect()
}

fn fixed_matrix(gate: &Gate) -> Array2<Complex64> {
    let zero = Complex64::new(0.0, 0.0);
    let one = Complex64::new(1.0, 0.0);
    let i = Complex64::new(0.0, 1.0);
    let s = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
    match gate {
        Gate::X(_) => ndarray::array![[zero, one], [one, zero]],
        Gate::Y(_) => ndarray::array![[zero, -i], [i, zero]],
        Gate::Z(_) => ndarray::array![[one, zero], [zero, -one]],
        Gate::H(_) => ndarray::array![[s, s], [s, -s]],
        _ => unreachable!("fixed_matrix only covers X/Y/Z/H"),
    }
}

/// `R_a(θ) = exp(-iθ·σ_a/2)`.
fn rotation_matrix(axis: char, angle: f64) -> Array2<Complex64> {
    let c = Complex64::new((angle / 2.0).cos(), 0.0);
    let s = (angle / 2.0).sin();
    match axis {
        'x' => ndarray::array![
            [c, Complex64::new(0.0, -s)],
            [Complex64::new(0.0, -s), c]
        ],
        'y' => ndarray::array![
            [c, Complex64::new(-s, 0.0)],
            [Complex64::new(s, 0.0), c]
        ],
        'z' => ndarray::array![
            [Complex64::new((angle / 2.0).cos(), -s), Complex64::new(0.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new((angle / 2.0).cos(), s)]
        ],
        _ => unreachable!("rotation axis is x, y or z"),
    }
}

/// Apply a 2^k x 2^k operator to the amplitudes addressed by `bits`, where
/// `bits[0]` is the most significant bit of the operator's index.
fn apply_multi(state: &mut Array1<Complex64>, op: &Array2<Complex64>, bits: &[usize]) {
    let k = bits.len();
    let dim_k = 1usize << k;
    debug_assert_eq!(op.nrows(), dim_k);
    let mask: usize = bits.iter().map(|b| 1usize << b).sum();
    let dim = state.len();

    let mut gathered = vec![Complex64::new(0.0, 0.0); dim_k];
    let mut indices = vec![0usize; dim_k];
    for base in 0..dim {
        if base & mask != 0 {
            continue;
        }
        for (j, idx) in indices.iter_mut().enumerate() {
            let mut address = base;
            for (t, b) in bits.iter().enumerate() {
                if (j >> (k - 1 - t)) & 1 == 1 {
                    address |= 1usize << b;
                }
            }
            *idx = address;
        }
        for (j, g) in gathered.iter_mut().enumerate() {
            *g = state[indices[j]];
        }
        for j in 0..dim_k {
            let mut acc = Complex64::new(0.0, 0.0);
            for (l, g) in gathered.iter().enumerate() {
                acc += op[[j, l]] * g;
            }
            state[indices[j]] = acc;
        }
    }
}

/// As [`apply_multi`], restricted to amplitudes whose control bits match
/// `pattern` (`pattern[0]` belongs to `control_bits[0]`).
fn apply_multi_controlled(
    state: &mut Array1<Complex64>,
    op: &Array2<Complex64>,
    target_bits: &[usize],
    control_bits: &[usize],
    pattern: &[bool],
) {
    let k = target_bits.len();
    let dim_k = 1usize << k;
    let mask: usize = target_bits.iter().map(|b| 1usize << b).sum();
    let dim = state.len();

    let mut control_mask = 0usize;
    let mut control_value = 0usize;
    for (b, &on) in control_bits.iter().zip(pattern.iter()) {
        control_mask |= 1usize << b;
        if on {
            control_value |= 1usize << b;
        }
    }

    let mut gathered = vec![Complex64::new(0.0, 0.0); dim_k];
    let mut indices = vec![0usize; dim_k];
    for base in 0..dim {
        if base & mask != 0 {
            continue;
        }
        if base & control_mask != control_value {
            continue;
        }
        for (j, idx) in indices.iter_mut().enumerate() {
            let mut address = base;
            for (t, b) in target_bits.iter().enumerate() {
                if (j >> (k - 1 - t)) & 1 == 1 {
                    address |= 1usize << b;
                }
            }
            *idx = address;
        }
        for (j, g) in gathered.iter_mut().enumerate() {
            *g = state[indices[j]];
        }
        for j in 0..dim_k {
            let mut acc = Complex64::new(0.0, 0.0);
            for (l, g) in gathered.iter().enumerate() {
                acc += op[[j, l]] * g;
            }
            state[indices[j]] = acc;
        }
    }
}
