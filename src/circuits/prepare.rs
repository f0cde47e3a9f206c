// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! State-preparation boxes for the LCU prepare register.

use ndarray::Array1;
use num_complex::Complex64;

use crate::circuits::boxes::RegisterBox;
use crate::circuits::gate::Gate;
use crate::circuits::register::{QubitRegister, RegisterCircuit};
use crate::error::{OperatorError, Result, ValidationError};

/// Registers of a prepare box.
#[derive(Debug, Clone)]
pub struct PrepareQRegs {
    /// The prepare register (default name "p").
    pub prepare: QubitRegister,
}

/// A box that loads a weight distribution onto the prepare register.
pub trait PrepareBox: RegisterBox {
    /// L1 norm of the unnormalised weights the box encodes.
    fn l1_norm(&self) -> f64;

    /// The prepare register.
    fn prepare_register(&self) -> &QubitRegister;
}

/// Prepare box backed by a state-preparation gate.
///
/// Given unnormalised nonnegative weights `w`, prepares the amplitudes
/// `sqrt(w_i / ||w||_1)` on the prepare register, zero-padded to the next
/// power of two. Post-selecting the register back to all-zeros after a
/// conjugated select stage reproduces the weighted operator sum.
#[derive(Debug, Clone)]
pub struct PrepareMultiplexorBox {
    circuit: RegisterCircuit,
    qregs: PrepareQRegs,
    l1_norm: f64,
}

impl PrepareMultiplexorBox {
    pub fn new(weights: &[f64], prepare_name: &str) -> Result<Self> {
        if weights.is_empty() {
            return Err(OperatorError::Empty.into());
        }
        if weights.iter().any(|&w| w < 0.0 || !w.is_finite()) {
            return Err(ValidationError::Field {
                field: "weights".into(),
                message: "weights must be finite and nonnegative".into(),
            }
            .into());
        }
        let l1_norm: f64 = weights.iter().sum();
        if l1_norm <= 0.0 {
            return Err(ValidationError::Field {
                field: "weights".into(),
                message: "weights must not all be zero".into(),
            }
            .into());
        }

        let n_qubits = (weights.len() as f64).log2().ceil() as u32;
        let dim = 1usize << n_qubits;
        let mut amplitudes = Array1::zeros(dim);
        for (i, &w) in weights.iter().enumerate() {
            amplitudes[i] = Complex64::new((w / l1_norm).sqrt(), 0.0);
        }

        let mut circuit = RegisterCircuit::new("PrepareMultiplexorBox");
        let prepare = circuit.add_register(prepare_name, n_qubits)?;
        if n_qubits > 0 {
            circuit.push(Gate::StatePreparation {
                amplitudes,
                qubits: prepare.qubits(),
                adjoint: false,
            })?;
        }

        Ok(Self {
            circuit,
            qregs: PrepareQRegs { prepare },
            l1_norm,
        })
    }

    pub fn qregs(&self) -> &PrepareQRegs {
        &self.qregs
    }

    pub fn n_prepare_qubits(&self) -> u32 {
        self.qregs.prepare.size()
    }
}

impl RegisterBox for PrepareMultiplexorBox {
    fn circuit(&self) -> &RegisterCircuit {
        &self.circuit
    }
}

impl PrepareBox for PrepareMultiplexorBox {
    fn l1_norm(&self) -> f64 {
        self.l1_norm
    }

    fn prepare_register(&self) -> &QubitRegister {
        &self.qregs.prepare
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_amplitudes() {
        let b = PrepareMultiplexorBox::new(&[1.0, 3.0], "p").unwrap();
        assert!((b.l1_norm() - 4.0).abs() < 1e-12);
        let sv = b.statevector(None).unwrap();
        assert!((sv[0].re - 0.5).abs() < 1e-12);
        assert!((sv[1].re - (0.75f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_prepare_pads_to_power_of_two() {
        let b = PrepareMultiplexorBox::new(&[1.0, 1.0, 1.0], "p").unwrap();
        assert_eq!(b.n_prepare_qubits(), 2);
        let sv = b.statevector(None).unwrap();
        assert_eq!(sv.len(), 4);
        assert!(sv[3].norm() < 1e-12);
        let total: f64 = sv.iter().map(|x| x.norm_sqr()).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_prepare_single_weight_uses_no_qubits() {
        let b = PrepareMultiplexorBox::new(&[2.5], "p").unwrap();
        assert_eq!(b.n_prepare_qubits(), 0);
        assert!((b.l1_norm() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_prepare_rejects_bad_weights() {
        assert!(PrepareMultiplexorBox::new(&[], "p").is_err());
        assert!(PrepareMultiplexorBox::new(&[-1.0, 2.0], "p").is_err());
        assert!(PrepareMultiplexorBox::new(&[0.0, 0.0], "p").is_err());
    }

    #[test]
    fn test_prepare_dagger_returns_to_zero() {
        let b = PrepareMultiplexorBox::new(&[0.2, 0.3, 0.5], "p").unwrap();
        let mut circ = b.initialise_circuit();
        circ.add_box_circuit(b.circuit(), None).unwrap();
        circ.add_box_circuit(b.dagger().circuit(), None).unwrap();
        let sv = circ.statevector().unwrap();
        assert!((sv[0] - Complex64::new(1.0, 0.0)).norm() < 1e-10);
    }
}
