// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Gate set understood by the state-vector engine.
//!
//! Rotation angles are in radians: `Rz(θ) = exp(-iθZ/2)` and likewise for
//! `Rx`/`Ry`. Multi-qubit composite gates keep their payload matrices so the
//! adjoint is always available without re-synthesis.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::circuits::register::{Qubit, QubitRegister, RegisterCircuit};
use crate::linalg::dagger;

/// A single circuit instruction.
#[derive(Debug, Clone)]
pub enum Gate {
    X(Qubit),
    Y(Qubit),
    Z(Qubit),
    H(Qubit),
    Rx { angle: f64, qubit: Qubit },
    Ry { angle: f64, qubit: Qubit },
    Rz { angle: f64, qubit: Qubit },
    Cx { control: Qubit, target: Qubit },
    /// Arbitrary single-qubit unitary.
    Unitary1 { matrix: Array2<Complex64>, qubit: Qubit },
    /// Prepare `amplitudes` on `qubits` from the all-zeros state (the gate is
    /// any unitary whose first column is the amplitude vector). `adjoint`
    /// marks the un-preparation direction.
    StatePreparation {
        amplitudes: Array1<Complex64>,
        qubits: Vec<Qubit>,
        adjoint: bool,
    },
    /// Multiplexed tensored single-qubit unitaries: for each listed control
    /// bit pattern, the tensor product of the per-target 2x2 matrices is
    /// applied. Patterns not listed act as the identity.
    MultiplexedU2 {
        controls: Vec<Qubit>,
        targets: Vec<Qubit>,
        terms: Vec<(Vec<bool>, Vec<Array2<Complex64>>)>,
    },
    /// Apply `body` only when every control qubit is |1⟩.
    Controlled {
        controls: Vec<Qubit>,
        body: Box<RegisterCircuit>,
    },
}

impl Gate {
    /// All qubits the gate touches, controls first where applicable.
    pub fn qubits(&self) -> Vec<Qubit> {
        match self {
            Gate::X(q) | Gate::Y(q) | Gate::Z(q) | Gate::H(q) => vec![q.clone()],
            Gate::Rx { qubit, .. } | Gate::Ry { qubit, .. } | Gate::Rz { qubit, .. } => {
                vec![qubit.clone()]
            }
            Gate::Cx { control, target } => vec![control.clone(), target.clone()],
            Gate::Unitary1 { qubit, .. } => vec![qubit.clone()],
            Gate::StatePreparation { qubits, .. } => qubits.clone(),
            Gate::MultiplexedU2 {
                controls, targets, ..
            } => controls.iter().chain(targets.iter()).cloned().collect(),
            Gate::Controlled { controls, body } => {
                let mut qs = controls.clone();
                qs.extend(body.qubits());
                qs
            }
        }
    }

    /// Adjoint gate.
    pub fn dagger(&self) -> Gate {
        match self {
            Gate::X(_) | Gate::Y(_) | Gate::Z(_) | Gate::H(_) | Gate::Cx { .. } => self.clone(),
            Gate::Rx { angle, qubit } => Gate::Rx {
                angle: -angle,
                qubit: qubit.clone(),
            },
            Gate::Ry { angle, qubit } => Gate::Ry {
                angle: -angle,
                qubit: qubit.clone(),
            },
            Gate::Rz { angle, qubit } => Gate::Rz {
                angle: -angle,
                qubit: qubit.clone(),
            },
            Gate::Unitary1 { matrix, qubit } => Gate::Unitary1 {
                matrix: dagger(matrix),
                qubit: qubit.clone(),
            },
            Gate::StatePreparation {
                amplitudes,
                qubits,
                adjoint,
            } => Gate::StatePreparation {
                amplitudes: amplitudes.clone(),
                qubits: qubits.clone(),
                adjoint: !adjoint,
            },
            Gate::MultiplexedU2 {
                controls,
                targets,
                terms,
            } => Gate::MultiplexedU2 {
                controls: controls.clone(),
                targets: targets.clone(),
                terms: terms
                    .iter()
                    .map(|(bits, ops)| (bits.clone(), ops.iter().map(dagger).collect()))
                    .collect(),
            },
            Gate::Controlled { controls, body } => Gate::Controlled {
                controls: controls.clone(),
                body: Box::new(body.dagger()),
            },
        }
    }

    /// Gate with each qubit replaced through `map`; qubits absent from the
    /// map are kept.
    pub fn remapped(&self, map: &BTreeMap<Qubit, Qubit>) -> Gate {
        let m = |q: &Qubit| map.get(q).cloned().unwrap_or_else(|| q.clone());
        match self {
            Gate::X(q) => Gate::X(m(q)),
            Gate::Y(q) => Gate::Y(m(q)),
            Gate::Z(q) => Gate::Z(m(q)),
            Gate::H(q) => Gate::H(m(q)),
            Gate::Rx { angle, qubit } => Gate::Rx {
                angle: *angle,
                qubit: m(qubit),
            },
            Gate::Ry { angle, qubit } => Gate::Ry {
                angle: *angle,
                qubit: m(qubit),
            },
            Gate::Rz { angle, qubit } => Gate::Rz {
                angle: *angle,
                qubit: m(qubit),
            },
            Gate::Cx { control, target } => Gate::Cx {
                control: m(control),
                target: m(target),
            },
            Gate::Unitary1 { matrix, qubit } => Gate::Unitary1 {
                matrix: matrix.clone(),
                qubit: m(qubit),
            },
            Gate::StatePreparation {
                amplitudes,
                qubits,
                adjoint,
            } => Gate::StatePreparation {
                amplitudes: amplitudes.clone(),
                qubits: qubits.iter().map(m).collect(),
                adjoint: *adjoint,
            },
            Gate::MultiplexedU2 {
                controls,
                targets,
                terms,
            } => Gate::MultiplexedU2 {
                controls: controls.iter().map(m).collect(),
                targets: targets.iter().map(m).collect(),
                terms: terms.clone(),
            },
            Gate::Controlled { controls, body } => Gate::Controlled {
                controls: controls.iter().map(m).collect(),
                body: Box::new(remap_body(body, map)),
            },
        }
    }
}

/// Rebuild a controlled-gate body after a qubit remap. The body's registers
/// are reconstructed from the remapped qubit set; gates were validated when
/// the body was first built, so re-pushing them cannot fail.
fn remap_body(body: &RegisterCircuit, map: &BTreeMap<Qubit, Qubit>) -> RegisterCircuit {
    let mut fresh = RegisterCircuit::unnamed();
    if let Some(name) = body.name() {
        fresh.set_name(name);
    }
    let mut sizes: BTreeMap<String, u32> = BTreeMap::new();
    for q in body.qubits() {
        let t = map.get(&q).cloned().unwrap_or(q);
        let entry = sizes.entry(t.register_name().to_string()).or_insert(0);
        *entry = (*entry).max(t.index() + 1);
    }
    for (name, size) in sizes {
        let _ = fresh.adopt_register(&QubitRegister::new(name, size));
    }
    for g in body.gates() {
        let _ = fresh.push(g.remapped(map));
    }
    fresh
}
