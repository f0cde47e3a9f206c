// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Seeded state-vector simulator backend.

use std::collections::BTreeMap;

use ndarray::Array1;
use num_complex::Complex64;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::backend::r#trait::{
    BackendType, HealthStatus, PostselectedRun, QuantumBackend, ShotResult,
};
use crate::circuits::register::{Qubit, RegisterCircuit};
use crate::config::ResourceLimits;
use crate::error::BackendError;
use crate::measurement::statevector_postselect;
use crate::simulator;
use crate::validation::validate_run_request;

/// Exact state-vector execution with seeded shot sampling.
pub struct StatevectorBackend {
    name: String,
    limits: ResourceLimits,
    rng: Mutex<StdRng>,
}

impl StatevectorBackend {
    pub fn new(seed: u64, limits: ResourceLimits) -> Self {
        Self {
            name: "statevector".to_string(),
            limits,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn simulate(&self, circuit: &RegisterCircuit) -> std::result::Result<Array1<Complex64>, BackendError> {
        simulator::circuit_statevector(circuit)
            .map_err(|e| BackendError::ExecutionFailed(e.to_string()))
    }

    /// Draw a basis index from the measurement distribution.
    fn sample_index(probabilities: &[f64], draw: f64) -> usize {
        let mut acc = 0.0;
        for (i, &p) in probabilities.iter().enumerate() {
            acc += p;
            if draw < acc {
                return i;
            }
        }
        probabilities.len() - 1
    }
}

impl QuantumBackend for StatevectorBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Simulator
    }

    fn health_check(&self) -> std::result::Result<HealthStatus, BackendError> {
        Ok(HealthStatus::Healthy)
    }

    fn resource_limits(&self) -> &ResourceLimits {
        &self.limits
    }

    fn run(
        &self,
        circuit: &RegisterCircuit,
        shots: u32,
    ) -> std::result::Result<ShotResult, BackendError> {
        validate_run_request(circuit.n_qubits(), shots, &self.limits)
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;

        let sv = self.simulate(circuit)?;
        let probabilities: Vec<f64> = sv.iter().map(|a| a.norm_sqr()).collect();
        let n = circuit.n_qubits();

        let mut counts: BTreeMap<Vec<u8>, u32> = BTreeMap::new();
        {
            let mut rng = self.rng.lock();
            for _ in 0..shots {
                let idx = Self::sample_index(&probabilities, rng.gen::<f64>());
                let bits: Vec<u8> = (0..n).rev().map(|b| ((idx >> b) & 1) as u8).collect();
                *counts.entry(bits).or_insert(0) += 1;
            }
        }

        debug!(
            backend = %self.name,
            n_qubits = n,
            shots,
            outcomes = counts.len(),
            "sampled circuit"
        );

        Ok(ShotResult {
            counts,
            total_shots: shots,
            statevector: Some(sv),
        })
    }

    fn run_postselected(
        &self,
        circuit: &RegisterCircuit,
        postselect: &BTreeMap<Qubit, u8>,
        shots: u32,
    ) -> std::result::Result<PostselectedRun, BackendError> {
        validate_run_request(circuit.n_qubits(), shots, &self.limits)
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;
        if postselect.is_empty() {
            return Err(BackendError::InvalidRequest(
                "post-selection map is empty".into(),
            ));
        }

        let sv = self.simulate(circuit)?;
        let selected = statevector_postselect(&circuit.qubits(), &sv, postselect, false)
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;
        let acceptance: f64 = selected.iter().map(|a| a.norm_sqr()).sum();

        let accepted_shots = {
            let mut rng = self.rng.lock();
            (0..shots).filter(|_| rng.gen::<f64>() < acceptance).count() as u32
        };

        debug!(
            backend = %self.name,
            acceptance,
            accepted_shots,
            shots,
            "post-selected run"
        );

        let state = if accepted_shots > 0 && acceptance > 1e-12 {
            let norm = acceptance.sqrt();
            Some(selected.mapv(|x| x / Complex64::new(norm, 0.0)))
        } else {
            None
        };

        Ok(PostselectedRun {
            accepted_shots,
            total_shots: shots,
            acceptance_probability: acceptance,
            state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> StatevectorBackend {
        StatevectorBackend::new(42, ResourceLimits::default())
    }

    #[test]
    fn test_run_deterministic_circuit() {
        let mut circ = RegisterCircuit::unnamed();
        let q = circ.add_register("q", 2).unwrap();
        circ.x(q.qubit(0)).unwrap();
        let result = backend().run(&circ, 100).unwrap();
        assert_eq!(result.total_shots, 100);
        // Only |10> can ever be observed
        assert_eq!(result.counts.len(), 1);
        assert_eq!(result.counts[&vec![1u8, 0u8]], 100);
    }

    #[test]
    fn test_run_superposition_counts_split() {
        let mut circ = RegisterCircuit::unnamed();
        let q = circ.add_register("q", 1).unwrap();
        circ.h(q.qubit(0)).unwrap();
        let result = backend().run(&circ, 2000).unwrap();
        let zeros = *result.counts.get(&vec![0u8]).unwrap_or(&0);
        let ones = *result.counts.get(&vec![1u8]).unwrap_or(&0);
        assert_eq!(zeros + ones, 2000);
        // Both outcomes appear with a 50/50 distribution
        assert!(zeros > 700 && ones > 700);
    }

    #[test]
    fn test_run_rejects_zero_shots() {
        let mut circ = RegisterCircuit::unnamed();
        circ.add_register("q", 1).unwrap();
        assert!(backend().run(&circ, 0).is_err());
    }

    #[test]
    fn test_postselected_run_certain_acceptance() {
        let mut circ = RegisterCircuit::unnamed();
        let p = circ.add_register("p", 1).unwrap();
        let q = circ.add_register("q", 1).unwrap();
        circ.x(q.qubit(0)).unwrap();
        let mut post = BTreeMap::new();
        post.insert(p.qubit(0), 0u8);
        let run = backend().run_postselected(&circ, &post, 500).unwrap();
        assert_eq!(run.accepted_shots, 500);
        assert!((run.acceptance_probability - 1.0).abs() < 1e-12);
        let state = run.state.unwrap();
        assert!((state[1].re - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_postselected_run_impossible_branch() {
        let mut circ = RegisterCircuit::unnamed();
        let p = circ.add_register("p", 1).unwrap();
        circ.add_register("q", 1).unwrap();
        let mut post = BTreeMap::new();
        post.insert(p.qubit(0), 1u8);
        let run = backend().run_postselected(&circ, &post, 100).unwrap();
        assert_eq!(run.accepted_shots, 0);
        assert!(run.acceptance_probability < 1e-12);
        assert!(run.state.is_none());
    }

    #[test]
    fn test_postselected_run_partial_acceptance() {
        let mut circ = RegisterCircuit::unnamed();
        let p = circ.add_register("p", 1).unwrap();
        circ.add_register("q", 1).unwrap();
        circ.h(p.qubit(0)).unwrap();
        let mut post = BTreeMap::new();
        post.insert(p.qubit(0), 0u8);
        let run = backend().run_postselected(&circ, &post, 4000).unwrap();
        assert!((run.acceptance_probability - 0.5).abs() < 1e-12);
        assert!(run.accepted_shots > 1600 && run.accepted_shots < 2400);
    }

    #[test]
    fn test_postselected_rejects_empty_map() {
        let mut circ = RegisterCircuit::unnamed();
        circ.add_register("q", 1).unwrap();
        let post = BTreeMap::new();
        assert!(backend().run_postselected(&circ, &post, 10).is_err());
    }
}
