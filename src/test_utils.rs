// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for circuit and box tests.

use ndarray::Array2;
use num_complex::Complex64;

use crate::circuits::boxes::RegisterBox;
use crate::circuits::register::RegisterCircuit;
use crate::measurement::{circuit_unitary_postselect, unitary_postselect};

/// Assert two complex matrices agree entrywise within `tol`.
pub fn assert_matrix_close(a: &Array2<Complex64>, b: &Array2<Complex64>, tol: f64) {
    assert_eq!(a.shape(), b.shape());
    for ((i, j), val) in a.indexed_iter() {
        let diff = (val - b[[i, j]]).norm();
        assert!(
            diff < tol,
            "Mismatch at ({}, {}): {:?} vs {:?} (diff={})",
            i,
            j,
            val,
            b[[i, j]],
            diff
        );
    }
}

/// Unitary of the n-qubit quantum Fourier transform.
pub fn qft_unitary(n_qubits: u32) -> Array2<Complex64> {
    let dim = 1usize << n_qubits;
    let mut out = Array2::zeros((dim, dim));
    for u in 0..dim {
        for v in 0..dim {
            out[[u, v]] = Complex64::from_polar(
                1.0 / (dim as f64).sqrt(),
                2.0 * std::f64::consts::PI * (u * v) as f64 / dim as f64,
            );
        }
    }
    out
}

/// Circuit-level reference for controlled boxes: rotate an ancilla by
/// `theta`, trigger the controlled box through an X sandwich, rotate again
/// and post-select the ancilla to zero alongside the box's own
/// post-selection.
pub fn controlled_circuit_unitary(
    register_box: &(impl RegisterBox + ?Sized),
    theta: f64,
) -> Array2<Complex64> {
    let qc = register_box
        .qcontrol(1, "anc", None)
        .expect("qcontrol of a valid box");
    let control = qc.control_register().qubit(0);

    let mut circ: RegisterCircuit = qc.initialise_circuit();
    circ.ry(theta, control.clone()).expect("control in circuit");
    circ.x(control.clone()).expect("control in circuit");
    circ.add_box_circuit(qc.circuit(), None).expect("box wires onto circuit");
    circ.x(control.clone()).expect("control in circuit");
    circ.ry(theta, control.clone()).expect("control in circuit");

    let mut post = register_box.postselect();
    post.insert(control, 0);
    circuit_unitary_postselect(&circ, &post, None).expect("postselected unitary")
}

/// Matrix-level reference for the same construction:
/// `cos²(θ/2)·U − sin²(θ/2)·I` on the box's post-selected unitary.
pub fn controlled_reference_unitary(
    register_box: &(impl RegisterBox + ?Sized),
    theta: f64,
) -> Array2<Complex64> {
    let post = register_box.postselect();
    let u = if post.is_empty() {
        register_box.unitary(None, None).expect("box unitary")
    } else {
        let full = register_box.unitary(None, None).expect("box unitary");
        unitary_postselect(&register_box.qubits(), &full, &post, None)
            .expect("postselected box unitary")
    };
    let factor = (theta / 2.0).cos().powi(2);
    let eye = Array2::from_diag_elem(u.nrows(), Complex64::new(1.0, 0.0));
    u.mapv(|x| x * Complex64::new(factor, 0.0))
        - eye.mapv(|x| x * Complex64::new(1.0 - factor, 0.0))
}

/// Check a box's controlled form against the interference reference.
pub fn qcontrol_test(register_box: &(impl RegisterBox + ?Sized), atol: f64) {
    let theta = 0.1;
    let expected = controlled_reference_unitary(register_box, theta);
    let actual = controlled_circuit_unitary(register_box, theta);
    assert_matrix_close(&actual, &expected, atol);
}
