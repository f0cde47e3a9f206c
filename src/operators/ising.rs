// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Transverse-field Ising chain Hamiltonian.

use num_complex::Complex64;

use super::pauli::{Pauli, PauliOperator, PauliString};

/// Open-boundary Ising chain: `j · Σ Z_i Z_{i+1} + h · Σ X_i`.
pub fn ising_model(n_qubits: u32, h: f64, j: f64) -> PauliOperator {
    let mut op = PauliOperator::new();
    for i in 0..n_qubits.saturating_sub(1) {
        op.add_term(
            PauliString::new([(i, Pauli::Z), (i + 1, Pauli::Z)]),
            Complex64::new(j, 0.0),
        );
    }
    for i in 0..n_qubits {
        op.add_term(PauliString::single(i, Pauli::X), Complex64::new(h, 0.0));
    }
    op
}
