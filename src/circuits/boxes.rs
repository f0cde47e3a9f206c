// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Register boxes: reusable circuit fragments with named registers and an
//! optional post-selection map.
//!
//! [`RegisterBox`] is the seam every composite circuit element implements.
//! Boxes are wired onto circuits with
//! [`RegisterCircuit::add_box_circuit`](crate::circuits::register::RegisterCircuit)
//! and composed through the provided `qcontrol` / `power` / `dagger`
//! operations.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::circuits::gate::Gate;
use crate::circuits::register::{Qubit, QubitRegister, RegisterCircuit};
use crate::circuits::int_to_bits;
use crate::error::{Result, ValidationError};
use crate::measurement::{statevector_postselect, unitary_postselect};

/// A circuit fragment with named registers.
pub trait RegisterBox {
    /// The underlying circuit.
    fn circuit(&self) -> &RegisterCircuit;

    /// Qubits that must be measured in the given value for the box to act as
    /// intended. Empty by default.
    fn postselect(&self) -> BTreeMap<Qubit, u8> {
        BTreeMap::new()
    }

    /// Display name.
    fn box_name(&self) -> String {
        self.circuit()
            .name()
            .unwrap_or("RegisterBox")
            .to_string()
    }

    /// Registers of the box circuit.
    fn registers(&self) -> Vec<QubitRegister> {
        self.circuit().registers().to_vec()
    }

    /// Sorted qubits of the box circuit.
    fn qubits(&self) -> Vec<Qubit> {
        self.circuit().qubits()
    }

    fn n_qubits(&self) -> usize {
        self.circuit().n_qubits()
    }

    /// Empty circuit carrying the same registers, ready for composition.
    fn initialise_circuit(&self) -> RegisterCircuit {
        let mut circ = RegisterCircuit::unnamed();
        for r in self.circuit().registers() {
            // Registers of an existing circuit are unique by construction.
            let _ = circ.adopt_register(r);
        }
        circ
    }

    /// Unitary of the box, optionally post-/pre-selected.
    ///
    /// Pre-selection without post-selection is rejected; without an explicit
    /// pre-selection the selected qubits are assumed to start in |0⟩.
    fn unitary(
        &self,
        post: Option<&BTreeMap<Qubit, u8>>,
        pre: Option<&BTreeMap<Qubit, u8>>,
    ) -> Result<Array2<Complex64>> {
        let full = self.circuit().unitary()?;
        match (post, pre) {
            (None, Some(_)) => Err(ValidationError::Field {
                field: "preselect".into(),
                message: "cannot pre-select without a post-selection".into(),
            }
            .into()),
            (None, None) => Ok(full),
            (Some(post), pre) => unitary_postselect(&self.qubits(), &full, post, pre),
        }
    }

    /// State vector from the all-zeros input, optionally post-selected.
    ///
    /// The post-selected vector is normalised unless its norm vanishes, in
    /// which case it is returned as-is.
    fn statevector(&self, post: Option<&BTreeMap<Qubit, u8>>) -> Result<Array1<Complex64>> {
        let sv = self.circuit().statevector()?;
        match post {
            None => Ok(sv),
            Some(post) => {
                let selected = statevector_postselect(&self.qubits(), &sv, post, false)?;
                let norm: f64 = selected.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
                if norm > 0.0 {
                    Ok(selected.mapv(|x| x / Complex64::new(norm, 0.0)))
                } else {
                    Ok(selected)
                }
            }
        }
    }

    /// Adjoint box. The post-selection map carries over.
    fn dagger(&self) -> GenericBox {
        GenericBox::with_postselect(self.circuit().dagger(), self.postselect())
    }

    /// Controlled box on `n_control` fresh control qubits.
    ///
    /// `control_index` selects which control bit pattern triggers the box,
    /// encoded by X-conjugation; it defaults to all-ones.
    fn qcontrol(
        &self,
        n_control: u32,
        control_name: &str,
        control_index: Option<u64>,
    ) -> Result<QControlRegisterBox> {
        let mut circ = self.initialise_circuit();
        circ.set_name(format!("C{}{}", n_control, self.box_name()));
        let control = circ.add_register(control_name, n_control)?;
        circ.push(Gate::Controlled {
            controls: control.qubits(),
            body: Box::new(self.circuit().clone()),
        })?;
        QControlRegisterBox::from_controlled_circuit(circ, control, control_index, self.postselect())
    }

    /// The box repeated `power` times.
    fn power(&self, power: u32) -> Result<PowerBox> {
        PowerBox::new(self, power)
    }
}

/// A plain box: circuit plus post-selection map. Produced by `dagger` and
/// useful for wrapping hand-built circuits.
#[derive(Debug, Clone)]
pub struct GenericBox {
    circuit: RegisterCircuit,
    postselect: BTreeMap<Qubit, u8>,
}

impl GenericBox {
    pub fn from_circuit(circuit: RegisterCircuit) -> Self {
        Self {
            circuit,
            postselect: BTreeMap::new(),
        }
    }

    pub fn with_postselect(circuit: RegisterCircuit, postselect: BTreeMap<Qubit, u8>) -> Self {
        Self {
            circuit,
            postselect,
        }
    }
}

impl RegisterBox for GenericBox {
    fn circuit(&self) -> &RegisterCircuit {
        &self.circuit
    }

    fn postselect(&self) -> BTreeMap<Qubit, u8> {
        self.postselect.clone()
    }
}

/// A controlled register box.
///
/// Holds the already-controlled circuit plus the control register. The
/// control index is realised by X-conjugation around the controlled body, so
/// any bit pattern of the control register can trigger the box.
#[derive(Debug, Clone)]
pub struct QControlRegisterBox {
    circuit: RegisterCircuit,
    control: QubitRegister,
    inner_postselect: BTreeMap<Qubit, u8>,
}

impl QControlRegisterBox {
    /// Wrap a circuit whose gates already trigger on the all-ones control
    /// pattern, realising `control_index` by X-conjugation.
    pub fn from_controlled_circuit(
        circ: RegisterCircuit,
        control: QubitRegister,
        control_index: Option<u64>,
        inner_postselect: BTreeMap<Qubit, u8>,
    ) -> Result<Self> {
        let n_control = control.size();
        let index = control_index.unwrap_or((1u64 << n_control) - 1);
        if index >= 1u64 << n_control {
            return Err(ValidationError::Field {
                field: "control_index".into(),
                message: format!(
                    "index {} does not fit in {} control bits",
                    index, n_control
                ),
            }
            .into());
        }

        let bits = int_to_bits(index, n_control as usize);
        let mut wrapped = RegisterCircuit::unnamed();
        if let Some(name) = circ.name() {
            wrapped.set_name(format!("{}({})", name, index));
        }
        for r in circ.registers() {
            let _ = wrapped.adopt_register(r);
        }
        for (i, &bit) in bits.iter().enumerate() {
            if !bit {
                wrapped.x(control.qubit(i as u32))?;
            }
        }
        wrapped.append(&circ)?;
        for (i, &bit) in bits.iter().enumerate() {
            if !bit {
                wrapped.x(control.qubit(i as u32))?;
            }
        }

        Ok(Self {
            circuit: wrapped,
            control,
            inner_postselect,
        })
    }

    pub fn control_register(&self) -> &QubitRegister {
        &self.control
    }
}

impl RegisterBox for QControlRegisterBox {
    fn circuit(&self) -> &RegisterCircuit {
        &self.circuit
    }

    fn postselect(&self) -> BTreeMap<Qubit, u8> {
        self.inner_postselect.clone()
    }
}

/// A box applied `power` times in sequence.
#[derive(Debug, Clone)]
pub struct PowerBox {
    circuit: RegisterCircuit,
    inner_circuit: RegisterCircuit,
    inner_postselect: BTreeMap<Qubit, u8>,
    power: u32,
}

impl PowerBox {
    pub fn new(inner: &(impl RegisterBox + ?Sized), power: u32) -> Result<Self> {
        let mut circ = inner.initialise_circuit();
        circ.set_name(format!("{}^{}", inner.box_name(), power));
        for _ in 0..power {
            circ.add_box_circuit(inner.circuit(), None)?;
        }
        Ok(Self {
            circuit: circ,
            inner_circuit: inner.circuit().clone(),
            inner_postselect: inner.postselect(),
            power,
        })
    }

    pub fn power_value(&self) -> u32 {
        self.power
    }
}

impl RegisterBox for PowerBox {
    fn circuit(&self) -> &RegisterCircuit {
        &self.circuit
    }

    fn postselect(&self) -> BTreeMap<Qubit, u8> {
        self.inner_postselect.clone()
    }

    /// Controls each repetition separately rather than the whole block,
    /// which keeps the controlled body small.
    fn qcontrol(
        &self,
        n_control: u32,
        control_name: &str,
        control_index: Option<u64>,
    ) -> Result<QControlRegisterBox> {
        let mut circ = self.initialise_circuit();
        circ.set_name(format!("C{}{}", n_control, self.box_name()));
        let control = circ.add_register(control_name, n_control)?;
        for _ in 0..self.power {
            circ.push(Gate::Controlled {
                controls: control.qubits(),
                body: Box::new(self.inner_circuit.clone()),
            })?;
        }
        QControlRegisterBox::from_controlled_circuit(
            circ,
            control,
            control_index,
            self.inner_postselect.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn x_box() -> GenericBox {
        let mut circ = RegisterCircuit::new("Xbox");
        let q = circ.add_register("q", 1).unwrap();
        circ.x(q.qubit(0)).unwrap();
        GenericBox::from_circuit(circ)
    }

    #[test]
    fn test_generic_box_unitary() {
        let b = x_box();
        let u = b.unitary(None, None).unwrap();
        assert!((u[[0, 1]] - c(1.0, 0.0)).norm() < 1e-12);
        assert!((u[[1, 0]] - c(1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_dagger_undoes_box() {
        let mut circ = RegisterCircuit::new("rot");
        let q = circ.add_register("q", 1).unwrap();
        circ.ry(0.4, q.qubit(0)).unwrap();
        circ.rz(1.1, q.qubit(0)).unwrap();
        let b = GenericBox::from_circuit(circ);

        let mut full = b.initialise_circuit();
        full.add_box_circuit(b.circuit(), None).unwrap();
        full.add_box_circuit(b.dagger().circuit(), None).unwrap();
        let u = full.unitary().unwrap();
        assert!((u[[0, 0]] - c(1.0, 0.0)).norm() < 1e-10);
        assert!(u[[0, 1]].norm() < 1e-10);
    }

    #[test]
    fn test_qcontrol_identity_when_control_off() {
        let b = x_box();
        let qc = b.qcontrol(1, "a", None).unwrap();
        let u = qc.unitary(None, None).unwrap();
        // a=0 block (a is most significant): identity on q
        assert!((u[[0, 0]] - c(1.0, 0.0)).norm() < 1e-12);
        assert!((u[[1, 1]] - c(1.0, 0.0)).norm() < 1e-12);
        // a=1 block: X
        assert!((u[[2, 3]] - c(1.0, 0.0)).norm() < 1e-12);
        assert!((u[[3, 2]] - c(1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_qcontrol_control_index_zero() {
        let b = x_box();
        let qc = b.qcontrol(1, "a", Some(0)).unwrap();
        let u = qc.unitary(None, None).unwrap();
        // Triggers on a=0: X in the top-left block
        assert!((u[[0, 1]] - c(1.0, 0.0)).norm() < 1e-12);
        // Identity in the a=1 block
        assert!((u[[2, 2]] - c(1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_qcontrol_rejects_oversized_index() {
        let b = x_box();
        assert!(b.qcontrol(1, "a", Some(2)).is_err());
    }

    #[test]
    fn test_power_box_squares() {
        let mut circ = RegisterCircuit::new("ry");
        let q = circ.add_register("q", 1).unwrap();
        circ.ry(0.3, q.qubit(0)).unwrap();
        let b = GenericBox::from_circuit(circ);
        let squared = b.power(2).unwrap();

        let u1 = b.unitary(None, None).unwrap();
        let u2 = squared.unitary(None, None).unwrap();
        let expected = u1.dot(&u1);
        for i in 0..2 {
            for j in 0..2 {
                assert!((u2[[i, j]] - expected[[i, j]]).norm() < 1e-12);
            }
        }
        assert_eq!(squared.power_value(), 2);
    }

    #[test]
    fn test_qcontrol_against_interference_reference() {
        let mut circ = RegisterCircuit::new("rot");
        let q = circ.add_register("q", 1).unwrap();
        circ.ry(0.8, q.qubit(0)).unwrap();
        circ.rz(0.3, q.qubit(0)).unwrap();
        let b = GenericBox::from_circuit(circ);
        crate::test_utils::qcontrol_test(&b, 1e-9);
    }

    #[test]
    fn test_power_box_qcontrol_matches_controlled_power() {
        let mut circ = RegisterCircuit::new("ry");
        let q = circ.add_register("q", 1).unwrap();
        circ.ry(0.3, q.qubit(0)).unwrap();
        let b = GenericBox::from_circuit(circ);

        let u_pow_ctrl = b.power(2).unwrap().qcontrol(1, "a", None).unwrap();
        let u = u_pow_ctrl.unitary(None, None).unwrap();
        // a=1 block equals Ry(0.6)
        let mut ref_circ = RegisterCircuit::unnamed();
        let r = ref_circ.add_register("q", 1).unwrap();
        ref_circ.ry(0.6, r.qubit(0)).unwrap();
        let expected = ref_circ.unitary().unwrap();
        for i in 0..2 {
            for j in 0..2 {
                assert!((u[[2 + i, 2 + j]] - expected[[i, j]]).norm() < 1e-12);
            }
        }
    }
}
