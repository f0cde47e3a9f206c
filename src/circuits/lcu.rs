// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Linear-combination-of-unitaries block encodings.
//!
//! An [`LcuBox`] sandwiches a select stage between a prepare stage and its
//! adjoint. With the prepare register post-selected back to all-zeros, the
//! state register experiences `operator / l1_norm`.

use std::collections::BTreeMap;

use ndarray::Array2;
use num_complex::Complex64;

use crate::circuits::boxes::{QControlRegisterBox, RegisterBox};
use crate::circuits::prepare::{PrepareBox, PrepareMultiplexorBox};
use crate::circuits::register::{Qubit, QubitRegister, RegisterCircuit};
use crate::circuits::select::{SelectBox, SelectMultiplexorBox};
use crate::error::{CircuitError, OperatorError, Result, ValidationError};
use crate::operators::pauli::{Pauli, PauliOperator, PauliString};

/// One term of a multiplexed operator: per-state-qubit 2x2 matrices plus the
/// coefficient magnitude. The coefficient's phase is absorbed into the first
/// matrix, making it a general SU(2) payload.
#[derive(Debug, Clone)]
pub struct MultiplexedOperatorTerm {
    magnitude: f64,
    phase: f64,
    ops: Vec<Array2<Complex64>>,
    hermitian: bool,
}

impl MultiplexedOperatorTerm {
    pub fn new(string: &PauliString, coeff: Complex64, n_state_qubits: u32) -> Result<Self> {
        if string.n_qubits() > n_state_qubits {
            return Err(OperatorError::QubitOutOfRange {
                index: string.n_qubits() - 1,
                n_qubits: n_state_qubits,
            }
            .into());
        }

        let mut ops: Vec<Array2<Complex64>> = (0..n_state_qubits)
            .map(|q| {
                string
                    .letters()
                    .get(&q)
                    .copied()
                    .unwrap_or(Pauli::I)
                    .matrix()
            })
            .collect();

        let (magnitude, phase) = coeff.to_polar();
        let exp_phase = Complex64::from_polar(1.0, phase);
        let hermitian = (exp_phase - Complex64::new(1.0, 0.0)).norm() < 1e-12
            || (exp_phase + Complex64::new(1.0, 0.0)).norm() < 1e-12;
        ops[0] = ops[0].mapv(|x| x * exp_phase);

        Ok(Self {
            magnitude,
            phase,
            ops,
            hermitian,
        })
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Phase in units of π.
    pub fn phase(&self) -> f64 {
        self.phase / std::f64::consts::PI
    }

    pub fn ops(&self) -> &[Array2<Complex64>] {
        &self.ops
    }

    pub fn is_hermitian(&self) -> bool {
        self.hermitian
    }
}

/// An operator processed for multiplexed selection: ordered terms with
/// magnitudes split from SU(2) payloads.
#[derive(Debug, Clone)]
pub struct MultiplexedOperator {
    terms: Vec<MultiplexedOperatorTerm>,
    hermitian: bool,
}

impl MultiplexedOperator {
    pub fn new(operator: &PauliOperator, n_state_qubits: u32) -> Result<Self> {
        if operator.is_empty() {
            return Err(OperatorError::Empty.into());
        }
        if n_state_qubits == 0 {
            return Err(ValidationError::Field {
                field: "n_state_qubits".into(),
                message: "state register must have at least one qubit".into(),
            }
            .into());
        }
        let terms: Vec<MultiplexedOperatorTerm> = operator
            .terms()
            .map(|(s, &c)| MultiplexedOperatorTerm::new(s, c, n_state_qubits))
            .collect::<Result<_>>()?;
        let hermitian = terms.iter().all(|t| t.is_hermitian());
        Ok(Self { terms, hermitian })
    }

    pub fn terms(&self) -> &[MultiplexedOperatorTerm] {
        &self.terms
    }

    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    /// Width of the prepare register indexing the terms.
    pub fn n_prepare_qubits(&self) -> u32 {
        (self.n_terms() as f64).log2().ceil() as u32
    }

    pub fn magnitudes(&self) -> Vec<f64> {
        self.terms.iter().map(|t| t.magnitude()).collect()
    }

    pub fn is_hermitian(&self) -> bool {
        self.hermitian
    }
}

/// Registers of an LCU box.
#[derive(Debug, Clone)]
pub struct LcuQRegs {
    /// The prepare register (default name "p").
    pub prepare: QubitRegister,
    /// The state register (default name "q").
    pub state: QubitRegister,
}

/// Prepare · Select · Prepare† block encoding.
#[derive(Debug, Clone)]
pub struct LcuBox<P, S> {
    prepare: P,
    select: S,
    circuit: RegisterCircuit,
    qregs: LcuQRegs,
    postselect: BTreeMap<Qubit, u8>,
}

impl<P: PrepareBox, S: SelectBox> LcuBox<P, S> {
    pub fn new(prepare: P, select: S) -> Result<Self> {
        if prepare.prepare_register() != select.prepare_register() {
            return Err(CircuitError::IncompatibleRegisters(format!(
                "prepare box register {} does not match select box register {}",
                prepare.prepare_register(),
                select.prepare_register()
            ))
            .into());
        }

        let qregs = LcuQRegs {
            prepare: prepare.prepare_register().clone(),
            state: select.state_register().clone(),
        };

        let mut circuit = RegisterCircuit::new("LcuBox");
        circuit.adopt_register(&qregs.prepare)?;
        circuit.adopt_register(&qregs.state)?;
        circuit.add_box_circuit(prepare.circuit(), None)?;
        circuit.add_box_circuit(select.circuit(), None)?;
        circuit.add_box_circuit(prepare.dagger().circuit(), None)?;

        let postselect = qregs.prepare.qubits().into_iter().map(|q| (q, 0u8)).collect();

        Ok(Self {
            prepare,
            select,
            circuit,
            qregs,
            postselect,
        })
    }

    pub fn prepare_box(&self) -> &P {
        &self.prepare
    }

    pub fn select_box(&self) -> &S {
        &self.select
    }

    pub fn qregs(&self) -> &LcuQRegs {
        &self.qregs
    }

    pub fn l1_norm(&self) -> f64 {
        self.prepare.l1_norm()
    }

    pub fn operator(&self) -> &PauliOperator {
        self.select.operator()
    }

    pub fn n_state_qubits(&self) -> u32 {
        self.qregs.state.size()
    }

    pub fn n_prepare_qubits(&self) -> u32 {
        self.qregs.prepare.size()
    }

    pub fn is_hermitian(&self) -> bool {
        self.select.is_hermitian()
    }
}

impl<P: PrepareBox, S: SelectBox> RegisterBox for LcuBox<P, S> {
    fn circuit(&self) -> &RegisterCircuit {
        &self.circuit
    }

    fn postselect(&self) -> BTreeMap<Qubit, u8> {
        self.postselect.clone()
    }

    /// The conjugation structure means only the select stage needs the
    /// control; the prepare stages stay uncontrolled.
    fn qcontrol(
        &self,
        n_control: u32,
        control_name: &str,
        control_index: Option<u64>,
    ) -> Result<QControlRegisterBox> {
        let mut circ = self.initialise_circuit();
        circ.set_name(format!("C{}LcuBox", n_control));
        let control = circ.add_register(control_name, n_control)?;

        circ.add_box_circuit(self.prepare.circuit(), None)?;
        let controlled_select = self.select.qcontrol(n_control, control_name, None)?;
        circ.add_box_circuit(controlled_select.circuit(), None)?;
        circ.add_box_circuit(self.prepare.dagger().circuit(), None)?;

        QControlRegisterBox::from_controlled_circuit(
            circ,
            control,
            control_index,
            self.postselect(),
        )
    }
}

/// LCU box over a Pauli operator built from the two multiplexor boxes.
pub type LcuMultiplexorBox = LcuBox<PrepareMultiplexorBox, SelectMultiplexorBox>;

impl LcuMultiplexorBox {
    /// Build the block encoding of `operator` on `n_state_qubits` state
    /// qubits with default register names.
    pub fn from_operator(operator: &PauliOperator, n_state_qubits: u32) -> Result<Self> {
        Self::from_operator_named(operator, n_state_qubits, "p", "q")
    }

    /// As [`from_operator`](Self::from_operator) with explicit register
    /// names.
    pub fn from_operator_named(
        operator: &PauliOperator,
        n_state_qubits: u32,
        prepare_name: &str,
        state_name: &str,
    ) -> Result<Self> {
        let select = SelectMultiplexorBox::new(operator, n_state_qubits, prepare_name, state_name)?;
        let prepare = PrepareMultiplexorBox::new(&select.multi_op().magnitudes(), prepare_name)?;
        LcuBox::new(prepare, select)
    }
}

/// Dense matrix a block encoding realises on its state register:
/// `operator / l1_norm`.
pub fn block_encoded_matrix<P: PrepareBox, S: SelectBox>(
    lcu: &LcuBox<P, S>,
) -> Result<Array2<Complex64>> {
    let m = lcu.operator().to_matrix(lcu.n_state_qubits())?;
    Ok(m.mapv(|x| x / Complex64::new(lcu.l1_norm(), 0.0)))
}

/// Whether the full block-encoding unitary is Hermitian (checked as
/// `U² = I`).
pub fn unitary_is_hermitian(lcu: &impl RegisterBox) -> Result<bool> {
    let u = lcu.unitary(None, None)?;
    let u2 = u.dot(&u);
    let dim = u2.nrows();
    for i in 0..dim {
        for j in 0..dim {
            let expected = if i == j { 1.0 } else { 0.0 };
            if (u2[[i, j]] - Complex64::new(expected, 0.0)).norm() > 1e-10 {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Block encoding of the diagonal operator whose entries discretise
/// `[-1, 1]` uniformly over `2^n_qubits` points.
pub fn diagonal_block_encoding(n_qubits: u32) -> PauliOperator {
    let mut op = PauliOperator::new();
    let denom = (2f64.powi(n_qubits as i32)) - 1.0;
    for j in (0..n_qubits).rev() {
        op.add_term(
            PauliString::single(n_qubits - 1 - j, Pauli::Z),
            Complex64::new(-(2f64.powi(j as i32)) / denom, 0.0),
        );
    }
    op
}
