// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Wall-Chebyshev ground-state projection.
//!
//! The filter is a product of shifted block encodings
//! `Π_ν (H − a_ν) / λ_ν` applied to a reference determinant, with every
//! prepare register post-selected back to all-zeros. The shift values place
//! the product's zeros across the excited spectrum, so repeated application
//! leaves the ground-state component dominant; the projected energy
//! `⟨ψ|H|ψ⟩ / ⟨ψ|ψ⟩` then descends towards the ground-state energy as the
//! filter order grows.

use std::collections::BTreeMap;

use ndarray::Array1;
use num_complex::Complex64;
use serde::Serialize;
use tracing::{debug, info};

use crate::backend::r#trait::QuantumBackend;
use crate::circuits::boxes::RegisterBox;
use crate::circuits::lcu::LcuMultiplexorBox;
use crate::circuits::register::{QRegMap, Qubit, RegisterCircuit};
use crate::config::{Config, ModelConfig};
use crate::error::{BackendError, Error, Result};
use crate::linalg::eigh_symmetric;
use crate::measurement::{expectation_value, statevector_postselect};
use crate::operators::hubbard::{hubbard_shifted_family, shifted_family, wall_shift_values};
use crate::operators::ising::ising_model;
use crate::operators::pauli::PauliOperator;
use crate::simulator;
use crate::validation::{validate_filter_order, validate_operator};

/// Default reference determinant: the two-site half-filling choice
/// (site 0 spin-up, site 1 spin-down).
pub const DEFAULT_HUBBARD_REFERENCE: u64 = 0b1001;

/// Chain block encodings that share a state register, giving each factor a
/// fresh prepare register.
///
/// Returns the product circuit and the combined post-selection map. Factor
/// `i`'s prepare register is renamed `"{name}{i}"` so the factors cannot
/// collide.
pub fn product_block_encoding(
    boxes: &[LcuMultiplexorBox],
) -> Result<(RegisterCircuit, BTreeMap<Qubit, u8>)> {
    let first = boxes.first().ok_or(Error::Config(
        "product block encoding needs at least one factor".into(),
    ))?;
    let state_reg = first.qregs().state.clone();

    let mut circ = RegisterCircuit::new("ProductBlockEncoding");
    circ.adopt_register(&state_reg)?;
    let mut postselect = BTreeMap::new();

    for (i, lcu) in boxes.iter().enumerate() {
        if lcu.qregs().state != state_reg {
            return Err(Error::Config(format!(
                "factor {} state register {} does not match {}",
                i,
                lcu.qregs().state,
                state_reg
            )));
        }
        let prepare = circ.add_register(
            &format!("{}{}", lcu.qregs().prepare.name(), i),
            lcu.n_prepare_qubits(),
        )?;
        let map = QRegMap::new(
            vec![(&lcu.qregs().prepare).into(), (&lcu.qregs().state).into()],
            vec![(&prepare).into(), (&state_reg).into()],
        )?;
        circ.add_box_circuit(lcu.circuit(), Some(&map))?;
        for q in prepare.qubits() {
            postselect.insert(q, 0u8);
        }
    }
    Ok((circ, postselect))
}

/// The same block encoding applied `power` times, each repetition on a fresh
/// prepare register.
pub fn power_block_encoding(
    lcu: &LcuMultiplexorBox,
    power: u32,
) -> Result<(RegisterCircuit, BTreeMap<Qubit, u8>)> {
    if power == 0 {
        return Err(Error::Config("power must be at least 1".into()));
    }
    let boxes = vec![lcu.clone(); power as usize];
    product_block_encoding(&boxes)
}

/// Result of one projection at a fixed filter order.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionOutcome {
    /// Filter order m
    pub order: u32,
    /// Projected energy `⟨ψ|H|ψ⟩ / ⟨ψ|ψ⟩`
    pub energy: f64,
    /// Probability that all prepare registers post-select to zero
    pub acceptance: f64,
    /// Shots surviving post-selection (sampled runs)
    pub accepted_shots: Option<u32>,
    /// Total shots (sampled runs)
    pub total_shots: Option<u32>,
}

/// Ground-state projector for one Hamiltonian and one shifted family.
pub struct WallChebProjector {
    hamiltonian: PauliOperator,
    family: Vec<PauliOperator>,
    n_state_qubits: u32,
    reference: u64,
}

impl WallChebProjector {
    /// `reference` is a mode-occupation mask; bit i set puts an X on state
    /// qubit i.
    pub fn new(
        hamiltonian: PauliOperator,
        family: Vec<PauliOperator>,
        n_state_qubits: u32,
        reference: u64,
    ) -> Result<Self> {
        if family.is_empty() {
            return Err(Error::Config("shifted family must not be empty".into()));
        }
        if hamiltonian.n_qubits() > n_state_qubits {
            return Err(Error::Config(format!(
                "hamiltonian addresses {} qubits but the state register has {}",
                hamiltonian.n_qubits(),
                n_state_qubits
            )));
        }
        for member in &family {
            if member.n_qubits() > n_state_qubits {
                return Err(Error::Config(
                    "shifted family member is wider than the state register".into(),
                ));
            }
        }
        if n_state_qubits < 64 && reference >= 1u64 << n_state_qubits {
            return Err(Error::Config(format!(
                "reference mask {:#b} does not fit {} state qubits",
                reference, n_state_qubits
            )));
        }
        Ok(Self {
            hamiltonian,
            family,
            n_state_qubits,
            reference,
        })
    }

    /// Filter order m.
    pub fn order(&self) -> u32 {
        self.family.len() as u32
    }

    /// Basis vector of the reference determinant.
    fn reference_state(&self) -> Array1<Complex64> {
        let n = self.n_state_qubits;
        let index: usize = (0..n)
            .filter(|i| (self.reference >> i) & 1 == 1)
            .map(|i| 1usize << (n - 1 - i))
            .sum();
        let mut state = Array1::zeros(1usize << n);
        state[index] = Complex64::new(1.0, 0.0);
        state
    }

    /// Apply one block encoding to an (unnormalised) state-register vector,
    /// post-selecting the prepare register back to zero.
    fn apply_block_encoding(
        &self,
        state: &Array1<Complex64>,
        lcu: &LcuMultiplexorBox,
    ) -> Result<Array1<Complex64>> {
        let qubits = lcu.circuit().qubits();
        let n_tot = qubits.len();
        let postselect = lcu.postselect();
        if state.len() != 1usize << (n_tot - postselect.len()) {
            return Err(crate::error::OperatorError::DimensionMismatch {
                expected: 1usize << (n_tot - postselect.len()),
                actual: state.len(),
            }
            .into());
        }

        let mut prep_mask = 0usize;
        for q in postselect.keys() {
            let pos = qubits.iter().position(|x| x == q).ok_or_else(|| {
                Error::Circuit(crate::error::CircuitError::QubitNotInCircuit(q.to_string()))
            })?;
            prep_mask |= 1usize << (n_tot - 1 - pos);
        }

        // Embed |0…0>_p ⊗ state into the full space.
        let mut full: Array1<Complex64> = Array1::zeros(1usize << n_tot);
        let mut src = 0usize;
        for idx in 0..1usize << n_tot {
            if idx & prep_mask == 0 {
                full[idx] = state[src];
                src += 1;
            }
        }

        simulator::apply_circuit(lcu.circuit(), &mut full)?;
        statevector_postselect(&qubits, &full, &postselect, false)
    }

    /// Exact projection: apply the filter factor by factor on the state
    /// register, carrying the unnormalised vector so its final norm² is the
    /// total acceptance probability.
    pub fn project_exact(&self) -> Result<ProjectionOutcome> {
        let mut state = self.reference_state();
        for (i, member) in self.family.iter().enumerate() {
            let lcu = LcuMultiplexorBox::from_operator(member, self.n_state_qubits)?;
            state = self.apply_block_encoding(&state, &lcu)?;
            debug!(
                factor = i,
                norm = state.iter().map(|x| x.norm_sqr()).sum::<f64>(),
                "applied shifted block encoding"
            );
        }

        let acceptance: f64 = state.iter().map(|x| x.norm_sqr()).sum();
        if acceptance < 1e-14 {
            return Err(BackendError::PostselectionFailed(
                "the filtered state has vanishing norm".into(),
            )
            .into());
        }
        let normalised = state.mapv(|x| x / Complex64::new(acceptance.sqrt(), 0.0));
        let energy = self.energy_of(&normalised)?;

        Ok(ProjectionOutcome {
            order: self.order(),
            energy,
            acceptance,
            accepted_shots: None,
            total_shots: None,
        })
    }

    /// Shot-based projection through a backend: builds the explicit product
    /// circuit with per-factor prepare registers and samples the
    /// repeat-until-success acceptance.
    pub fn project_sampled(
        &self,
        backend: &dyn QuantumBackend,
        shots: u32,
    ) -> Result<ProjectionOutcome> {
        let boxes: Vec<LcuMultiplexorBox> = self
            .family
            .iter()
            .map(|member| LcuMultiplexorBox::from_operator(member, self.n_state_qubits))
            .collect::<Result<_>>()?;
        let (mut circ, postselect) = product_block_encoding(&boxes)?;

        // Reference-determinant preparation goes in front of the filter.
        let mut prepared = RegisterCircuit::new("WallChebFilter");
        for r in circ.registers() {
            prepared.adopt_register(r)?;
        }
        let state_reg = boxes[0].qregs().state.clone();
        for i in 0..self.n_state_qubits {
            if (self.reference >> i) & 1 == 1 {
                prepared.x(state_reg.qubit(i))?;
            }
        }
        prepared.append(&circ)?;
        circ = prepared;

        let run = backend
            .run_postselected(&circ, &postselect, shots)
            .map_err(Error::Backend)?;
        let state = run.state.as_ref().ok_or_else(|| {
            BackendError::PostselectionFailed(format!(
                "no shot survived out of {} (acceptance {:.3e})",
                run.total_shots, run.acceptance_probability
            ))
        })?;
        let energy = self.energy_of(state)?;

        Ok(ProjectionOutcome {
            order: self.order(),
            energy,
            acceptance: run.acceptance_probability,
            accepted_shots: Some(run.accepted_shots),
            total_shots: Some(run.total_shots),
        })
    }

    fn energy_of(&self, state: &Array1<Complex64>) -> Result<f64> {
        let h = self.hamiltonian.to_matrix(self.n_state_qubits)?;
        Ok(expectation_value(state, &h)?.re)
    }
}

/// Run the configured projection sweep over the filter-order range.
pub fn run_sweep(
    config: &Config,
    backend: Option<&dyn QuantumBackend>,
) -> Result<Vec<ProjectionOutcome>> {
    let mut records = Vec::new();
    for m in config.run.order_min..=config.run.order_max {
        validate_filter_order(m, &config.limits)?;

        let (family, hamiltonian, n_state, reference) = match &config.run.model {
            ModelConfig::Hubbard {
                u,
                n_sites,
                reference,
            } => {
                let r = reference.unwrap_or(DEFAULT_HUBBARD_REFERENCE);
                let (family, ham) = hubbard_shifted_family(*u, *n_sites, m, config.run.alpha, r)?;
                (family, ham, 2 * n_sites, r)
            }
            ModelConfig::Ising { n_qubits, h, j } => {
                let ham = ising_model(*n_qubits, *h, *j);
                let hm = ham.to_matrix(*n_qubits)?.mapv(|x| x.re);
                let (evals, _) = eigh_symmetric(&hm);
                let shifts =
                    wall_shift_values(evals[evals.len() - 1], evals[0], m, config.run.alpha);
                (shifted_family(&ham, &shifts), ham, *n_qubits, 0)
            }
        };
        for member in &family {
            validate_operator(member, &config.limits)?;
        }

        let projector = WallChebProjector::new(hamiltonian, family, n_state, reference)?;
        let outcome = if config.run.exact {
            projector.project_exact()?
        } else {
            let backend = backend.ok_or(Error::Backend(BackendError::Unavailable(
                "sampled runs need a backend".into(),
            )))?;
            projector.project_sampled(backend, config.run.shots)?
        };

        info!(
            order = outcome.order,
            energy = outcome.energy,
            acceptance = outcome.acceptance,
            "projection step"
        );
        records.push(outcome);
    }
    Ok(records)
}
