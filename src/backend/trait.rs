// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quantum backend trait definition.

use std::collections::BTreeMap;

use ndarray::Array1;
use num_complex::Complex64;

use crate::circuits::register::{Qubit, RegisterCircuit};
use crate::config::ResourceLimits;
use crate::error::BackendError;

/// Type of backend (simulator or hardware).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Local or remote simulator
    Simulator,
    /// Real quantum hardware
    Hardware,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::Simulator => write!(f, "simulator"),
            BackendType::Hardware => write!(f, "hardware"),
        }
    }
}

/// Health status of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Backend is fully operational
    Healthy,
    /// Backend is operational but with degraded performance
    Degraded,
    /// Backend is not available
    Unavailable,
}

/// Result of a computational-basis shot run.
#[derive(Debug, Clone)]
pub struct ShotResult {
    /// Counts per measured bitstring, bits in sorted-qubit order
    pub counts: BTreeMap<Vec<u8>, u32>,
    /// Total shots taken
    pub total_shots: u32,
    /// Final state vector (simulators only)
    pub statevector: Option<Array1<Complex64>>,
}

/// Result of a repeat-until-success post-selected run.
#[derive(Debug, Clone)]
pub struct PostselectedRun {
    /// Shots surviving the post-selection
    pub accepted_shots: u32,
    /// Total shots taken
    pub total_shots: u32,
    /// Exact acceptance probability where the backend can compute it
    pub acceptance_probability: f64,
    /// Normalised state of the remaining qubits, present when at least one
    /// shot survived
    pub state: Option<Array1<Complex64>>,
}

/// The trait all execution backends implement.
pub trait QuantumBackend: Send + Sync {
    /// Backend name.
    fn name(&self) -> &str;

    /// Backend type.
    fn backend_type(&self) -> BackendType;

    /// Check backend health.
    fn health_check(&self) -> std::result::Result<HealthStatus, BackendError>;

    /// Resource limits.
    fn resource_limits(&self) -> &ResourceLimits;

    /// Run a circuit from the all-zeros state and sample every qubit in the
    /// computational basis.
    fn run(
        &self,
        circuit: &RegisterCircuit,
        shots: u32,
    ) -> std::result::Result<ShotResult, BackendError>;

    /// Run a circuit, measuring the selected qubits and keeping only shots
    /// where they match; the surviving state of the remaining qubits is
    /// returned alongside acceptance statistics.
    fn run_postselected(
        &self,
        circuit: &RegisterCircuit,
        postselect: &BTreeMap<Qubit, u8>,
        shots: u32,
    ) -> std::result::Result<PostselectedRun, BackendError>;
}
