// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Qubit-operator algebra and model Hamiltonians.
//!
//! # Modules
//!
//! - [`pauli`]: Pauli strings and weighted sums of them
//! - [`ising`]: transverse-field Ising chain
//! - [`hubbard`]: Jordan-Wigner Fermi-Hubbard chain, particle-sector
//!   restriction and the wall-Chebyshev shift values

pub mod hubbard;
pub mod ising;
pub mod pauli;

pub use hubbard::{hubbard_chain, hubbard_shifted_family, shifted_family, wall_shift_values};
pub use ising::ising_model;
pub use pauli::{Pauli, PauliOperator, PauliString};
