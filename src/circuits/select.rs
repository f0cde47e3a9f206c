// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Operator-selection boxes for LCU circuits.

use ndarray::Array2;
use num_complex::Complex64;

use crate::circuits::boxes::{QControlRegisterBox, RegisterBox};
use crate::circuits::gate::Gate;
use crate::circuits::int_to_bits;
use crate::circuits::lcu::MultiplexedOperator;
use crate::circuits::register::{QubitRegister, RegisterCircuit};
use crate::error::Result;
use crate::operators::pauli::PauliOperator;

/// Registers of a select box.
#[derive(Debug, Clone)]
pub struct SelectQRegs {
    /// The prepare register (default name "p").
    pub prepare: QubitRegister,
    /// The state register (default name "q").
    pub state: QubitRegister,
}

/// A box that applies the i-th operator term to the state register when the
/// prepare register indexes i.
pub trait SelectBox: RegisterBox {
    /// The selected operator.
    fn operator(&self) -> &PauliOperator;

    /// The prepare register.
    fn prepare_register(&self) -> &QubitRegister;

    /// The state register.
    fn state_register(&self) -> &QubitRegister;

    /// Whether every term payload is Hermitian.
    fn is_hermitian(&self) -> bool;
}

/// Select box lowering a Pauli operator to one multiplexed
/// tensored-single-qubit gate.
#[derive(Debug, Clone)]
pub struct SelectMultiplexorBox {
    circuit: RegisterCircuit,
    qregs: SelectQRegs,
    operator: PauliOperator,
    multi_op: MultiplexedOperator,
}

impl SelectMultiplexorBox {
    pub fn new(
        operator: &PauliOperator,
        n_state_qubits: u32,
        prepare_name: &str,
        state_name: &str,
    ) -> Result<Self> {
        let multi_op = MultiplexedOperator::new(operator, n_state_qubits)?;
        let n_prep = multi_op.n_prepare_qubits();

        let mut circuit = RegisterCircuit::new("SelectMultiplexorBox");
        let state = circuit.add_register(state_name, n_state_qubits)?;
        let prepare = circuit.add_register(prepare_name, n_prep)?;

        circuit.push(Gate::MultiplexedU2 {
            controls: prepare.qubits(),
            targets: state.qubits(),
            terms: Self::op_map(&multi_op, n_prep as usize, &[]),
        })?;

        Ok(Self {
            circuit,
            qregs: SelectQRegs { prepare, state },
            operator: operator.clone(),
            multi_op,
        })
    }

    /// Control patterns for the multiplexed gate: term index bits, prefixed
    /// by `control_prefix` (one fixed bit per extra control qubit).
    fn op_map(
        multi_op: &MultiplexedOperator,
        n_prep: usize,
        control_prefix: &[bool],
    ) -> Vec<(Vec<bool>, Vec<Array2<Complex64>>)> {
        multi_op
            .terms()
            .iter()
            .enumerate()
            .map(|(i, term)| {
                let mut pattern = control_prefix.to_vec();
                pattern.extend(int_to_bits(i as u64, n_prep));
                (pattern, term.ops().to_vec())
            })
            .collect()
    }

    pub fn qregs(&self) -> &SelectQRegs {
        &self.qregs
    }

    pub fn multi_op(&self) -> &MultiplexedOperator {
        &self.multi_op
    }

    pub fn n_prepare_qubits(&self) -> u32 {
        self.qregs.prepare.size()
    }

    pub fn n_state_qubits(&self) -> u32 {
        self.qregs.state.size()
    }
}

impl RegisterBox for SelectMultiplexorBox {
    fn circuit(&self) -> &RegisterCircuit {
        &self.circuit
    }

    /// Controlled select by widening the multiplexor with the control
    /// qubits instead of wrapping the whole box.
    ///
    /// Control qubits sort ahead of the prepare register, so they prefix
    /// every pattern. The listed patterns carry zeros there and the control
    /// qubits are X-conjugated, which makes the gate trigger on all-ones;
    /// `control_index` is then realised on top of that in the usual way.
    fn qcontrol(
        &self,
        n_control: u32,
        control_name: &str,
        control_index: Option<u64>,
    ) -> Result<QControlRegisterBox> {
        let mut circ = self.initialise_circuit();
        circ.set_name(format!("C{}SelectMultiplexorBox", n_control));
        let control = circ.add_register(control_name, n_control)?;

        let prefix = vec![false; n_control as usize];
        let n_prep = self.n_prepare_qubits() as usize;
        let terms = Self::op_map(&self.multi_op, n_prep, &prefix);

        for q in control.qubits() {
            circ.x(q)?;
        }
        circ.push(Gate::MultiplexedU2 {
            controls: control
                .qubits()
                .into_iter()
                .chain(self.qregs.prepare.qubits())
                .collect(),
            targets: self.qregs.state.qubits(),
            terms,
        })?;
        for q in control.qubits() {
            circ.x(q)?;
        }

        QControlRegisterBox::from_controlled_circuit(circ, control, control_index, self.postselect())
    }
}

impl SelectBox for SelectMultiplexorBox {
    fn operator(&self) -> &PauliOperator {
        &self.operator
    }

    fn prepare_register(&self) -> &QubitRegister {
        &self.qregs.prepare
    }

    fn state_register(&self) -> &QubitRegister {
        &self.qregs.state
    }

    fn is_hermitian(&self) -> bool {
        self.multi_op.is_hermitian()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::pauli::{Pauli, PauliString};

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    fn two_term_op() -> PauliOperator {
        PauliOperator::from_terms([
            (PauliString::single(0, Pauli::X), c(0.5)),
            (PauliString::single(0, Pauli::Z), c(0.5)),
        ])
    }

    #[test]
    fn test_select_applies_term_for_index() {
        let select = SelectMultiplexorBox::new(&two_term_op(), 1, "p", "q").unwrap();
        assert_eq!(select.n_prepare_qubits(), 1);
        let u = select.unitary(None, None).unwrap();

        // Qubit order (p, q), p most significant. p=0 selects the X term,
        // p=1 the Z term.
        assert!((u[[0, 1]] - c(1.0)).norm() < 1e-12);
        assert!((u[[1, 0]] - c(1.0)).norm() < 1e-12);
        assert!((u[[2, 2]] - c(1.0)).norm() < 1e-12);
        assert!((u[[3, 3]] - c(-1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_select_single_term_needs_no_prepare_qubits() {
        let op = PauliOperator::from_terms([(PauliString::single(0, Pauli::X), c(1.0))]);
        let select = SelectMultiplexorBox::new(&op, 1, "p", "q").unwrap();
        assert_eq!(select.n_prepare_qubits(), 0);
        let u = select.unitary(None, None).unwrap();
        assert!((u[[0, 1]] - c(1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_select_hermiticity_detection() {
        let select = SelectMultiplexorBox::new(&two_term_op(), 1, "p", "q").unwrap();
        assert!(select.is_hermitian());

        let complex_op = PauliOperator::from_terms([
            (PauliString::single(0, Pauli::X), Complex64::new(0.0, 0.5)),
            (PauliString::single(0, Pauli::Z), c(0.5)),
        ]);
        let select = SelectMultiplexorBox::new(&complex_op, 1, "p", "q").unwrap();
        assert!(!select.is_hermitian());
    }

    #[test]
    fn test_controlled_select_widens_multiplexor() {
        let select = SelectMultiplexorBox::new(&two_term_op(), 1, "p", "q").unwrap();
        let qc = select.qcontrol(1, "a", None).unwrap();
        let u = qc.unitary(None, None).unwrap();

        // Qubit order (a, p, q). Control off (a=0): identity.
        for i in 0..4 {
            assert!((u[[i, i]] - c(1.0)).norm() < 1e-12, "row {}", i);
        }
        // Control on (a=1): the select unitary in the lower block.
        let inner = select.unitary(None, None).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                assert!(
                    (u[[4 + i, 4 + j]] - inner[[i, j]]).norm() < 1e-12,
                    "mismatch at ({}, {})",
                    i,
                    j
                );
            }
        }
    }
}
