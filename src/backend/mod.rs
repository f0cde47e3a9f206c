// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Execution backends.
//!
//! # Modules
//!
//! - [`r#trait`]: the [`QuantumBackend`] trait and result types
//! - [`statevector`]: seeded exact simulator backend
//! - [`registry`]: backend registration and lookup

pub mod registry;
pub mod statevector;
pub mod r#trait;

pub use registry::BackendRegistry;
pub use statevector::StatevectorBackend;
pub use r#trait::{BackendType, HealthStatus, PostselectedRun, QuantumBackend, ShotResult};
