// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fermi-Hubbard chain under the Jordan-Wigner transform, plus the
//! particle-sector restriction and wall-Chebyshev shift values used to build
//! the ground-state filter.
//!
//! Mode ordering: site `i` spin-up is mode `2i`, spin-down is mode `2i + 1`;
//! mode `k` lives on qubit line `k`.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{OperatorError, Result};
use crate::linalg::eigh_symmetric;

use super::pauli::{Pauli, PauliOperator, PauliString};

/// Spinful Fermi-Hubbard chain with open boundaries.
///
/// `-t Σ_{i,σ} (c†_{iσ} c_{i+1,σ} + h.c.) + U Σ_i n_{i↑} n_{i↓}`, mapped to
/// qubits by Jordan-Wigner. Hopping between modes p and p+2 produces
/// `-t/2 · (X_p Z_{p+1} X_{p+2} + Y_p Z_{p+1} Y_{p+2})`; the on-site term
/// expands to `U/4 · (I − Z_↑ − Z_↓ + Z_↑ Z_↓)`.
pub fn hubbard_chain(n_sites: u32, tunneling: f64, coulomb: f64) -> PauliOperator {
    let mut op = PauliOperator::new();
    let half_t = Complex64::new(-tunneling / 2.0, 0.0);
    for spin in 0..2u32 {
        for site in 0..n_sites.saturating_sub(1) {
            let p = 2 * site + spin;
            let q = p + 2;
            op.add_term(
                PauliString::new([(p, Pauli::X), (p + 1, Pauli::Z), (q, Pauli::X)]),
                half_t,
            );
            op.add_term(
                PauliString::new([(p, Pauli::Y), (p + 1, Pauli::Z), (q, Pauli::Y)]),
                half_t,
            );
        }
    }
    let quarter_u = Complex64::new(coulomb / 4.0, 0.0);
    for site in 0..n_sites {
        let up = 2 * site;
        let down = 2 * site + 1;
        op.add_term(PauliString::identity(), quarter_u);
        op.add_term(PauliString::single(up, Pauli::Z), -quarter_u);
        op.add_term(PauliString::single(down, Pauli::Z), -quarter_u);
        op.add_term(
            PauliString::new([(up, Pauli::Z), (down, Pauli::Z)]),
            quarter_u,
        );
    }
    op
}

/// Number of set bits of a determinant bitmask.
pub fn count_set_bits(n: u64) -> u32 {
    n.count_ones()
}

/// Number of set bits at even positions (spin-up modes).
pub fn count_even_set_bits(mut n: u64) -> u32 {
    let mut count = 0;
    while n != 0 {
        if n & 1 != 0 {
            count += 1;
        }
        n >>= 2;
    }
    count
}

/// Mode-occupation mask of a basis index (basis bit n−1−i holds mode i, so
/// this is a bit reversal over `n_qubits` bits).
pub fn basis_to_modes(basis: u64, n_qubits: u32) -> u64 {
    let mut modes = 0u64;
    for i in 0..n_qubits {
        if (basis >> (n_qubits - 1 - i)) & 1 == 1 {
            modes |= 1 << i;
        }
    }
    modes
}

/// Restrict a dense Hamiltonian to the determinants with `n_elec` electrons
/// of which `n_alpha` occupy spin-up (even) modes.
///
/// `reference` is a mode-occupation mask (bit i set means mode i occupied).
/// Returns the restricted real matrix and the row index of `reference`
/// within the sector. The input matrix must be real up to round-off (the
/// Jordan-Wigner Hubbard matrix is).
pub fn sector_restriction(
    hmat: &Array2<Complex64>,
    n_qubits: u32,
    n_elec: u32,
    n_alpha: u32,
    reference: u64,
) -> Result<(Array2<f64>, usize)> {
    let dim = 1usize << n_qubits;
    if hmat.nrows() != dim {
        return Err(OperatorError::DimensionMismatch {
            expected: dim,
            actual: hmat.nrows(),
        }
        .into());
    }

    let mut subset = Vec::new();
    let mut ref_index = None;
    for i in 0..dim as u64 {
        let modes = basis_to_modes(i, n_qubits);
        if count_set_bits(modes) == n_elec && count_even_set_bits(modes) == n_alpha {
            subset.push(i as usize);
            if modes == reference {
                ref_index = Some(subset.len() - 1);
            }
        }
    }
    let ref_index = ref_index.ok_or(OperatorError::ReferenceNotInSector(reference))?;

    let k = subset.len();
    let mut restricted = Array2::<f64>::zeros((k, k));
    for (a, &i) in subset.iter().enumerate() {
        for (b, &j) in subset.iter().enumerate() {
            restricted[[a, b]] = hmat[[i, j]].re;
        }
    }
    Ok((restricted, ref_index))
}

/// Wall-Chebyshev shift values.
///
/// `a_ν = S + (R/2)·(1 − cos(νπ/(m + 0.5)))` for ν = 1..m, with
/// `R = alpha·(e_max − e_min)` and `S = e_min`. The shifts place the zeros of
/// the product filter `Π_ν (H − a_ν)` across the excited part of the
/// spectrum, leaving the ground state amplified.
pub fn wall_shift_values(e_max: f64, e_min: f64, m: u32, alpha: f64) -> Vec<f64> {
    let r = alpha * (e_max - e_min);
    (1..=m)
        .map(|v| {
            e_min + (r / 2.0) * (1.0 - (v as f64 * std::f64::consts::PI / (m as f64 + 0.5)).cos())
        })
        .collect()
}

/// The family `H − a_ν · I` for a list of shifts.
pub fn shifted_family(op: &PauliOperator, shifts: &[f64]) -> Vec<PauliOperator> {
    shifts
        .iter()
        .map(|&a| {
            let mut shifted = op.clone();
            shifted.sub_identity(a);
            shifted
        })
        .collect()
}

/// Build the Hubbard Hamiltonian and its shifted family for a filter of
/// order `m`.
///
/// The spectral bounds for the shifts come from the particle-sector
/// restriction around `reference` (half filling, `n_alpha = n_elec / 2`),
/// matching how the filter is deployed: it only has to suppress states the
/// projected dynamics can reach.
///
/// Returns `(family, hamiltonian)`.
pub fn hubbard_shifted_family(
    u: f64,
    n_sites: u32,
    m: u32,
    alpha: f64,
    reference: u64,
) -> Result<(Vec<PauliOperator>, PauliOperator)> {
    let ham = hubbard_chain(n_sites, 1.0, u);
    let n_qubits = 2 * n_sites;
    let hmat = ham.to_matrix(n_qubits)?;

    let n_elec = n_sites;
    let (restricted, _) = sector_restriction(&hmat, n_qubits, n_elec, n_elec / 2, reference)?;
    let (evals, _) = eigh_symmetric(&restricted);
    let e_min = evals[0];
    let e_max = evals[evals.len() - 1];

    let shifts = wall_shift_values(e_max, e_min, m, alpha);
    Ok((shifted_family(&ham, &shifts), ham))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_counts() {
        assert_eq!(count_set_bits(0b1001), 2);
        assert_eq!(count_set_bits(0), 0);
        // Even positions are 0, 2, 4, ...
        assert_eq!(count_even_set_bits(0b0101), 2);
        assert_eq!(count_even_set_bits(0b1010), 0);
        assert_eq!(count_even_set_bits(0b1001), 1);
    }

    #[test]
    fn test_basis_to_modes_reverses_bits() {
        // Basis |1000> (qubit 0 set) is mode 0 occupied
        assert_eq!(basis_to_modes(0b1000, 4), 0b0001);
        assert_eq!(basis_to_modes(0b1001, 4), 0b1001);
        assert_eq!(basis_to_modes(0b0010, 4), 0b0100);
    }

    #[test]
    fn test_hubbard_hermitian_and_real() {
        let op = hubbard_chain(2, 1.0, 1.0);
        assert!(op.is_hermitian());
        let m = op.to_matrix(4).unwrap();
        for x in m.iter() {
            assert!(x.im.abs() < 1e-12);
        }
    }

    #[test]
    fn test_hubbard_single_site() {
        // One site: no hopping, H = U n↑ n↓, eigenvalues {0, 0, 0, U}
        let op = hubbard_chain(1, 1.0, 3.0);
        let m = op.to_matrix(2).unwrap();
        // |11> is index 3 (mode 0 most significant)
        assert!((m[[3, 3]].re - 3.0).abs() < 1e-12);
        assert!(m[[0, 0]].norm() < 1e-12);
        assert!(m[[1, 1]].norm() < 1e-12);
        assert!(m[[2, 2]].norm() < 1e-12);
    }

    #[test]
    fn test_sector_restriction_two_sites() {
        let op = hubbard_chain(2, 1.0, 1.0);
        let m = op.to_matrix(4).unwrap();
        // Half filling, Sz = 0: 2 electrons, 1 in spin-up modes.
        // Determinants: one up mode from {0, 2} x one down mode from {1, 3}.
        let reference = 0b1001; // modes 0 and 3 occupied
        let (restricted, idx) = sector_restriction(&m, 4, 2, 1, reference).unwrap();
        assert_eq!(restricted.nrows(), 4);
        assert!(idx < 4);
    }

    #[test]
    fn test_sector_restriction_rejects_bad_reference() {
        let op = hubbard_chain(2, 1.0, 1.0);
        let m = op.to_matrix(4).unwrap();
        // Three electrons is outside the 2-electron sector
        assert!(sector_restriction(&m, 4, 2, 1, 0b0111).is_err());
    }

    #[test]
    fn test_wall_shifts_increase_within_window() {
        let shifts = wall_shift_values(3.0, -2.0, 5, 1.0);
        assert_eq!(shifts.len(), 5);
        for w in shifts.windows(2) {
            assert!(w[0] < w[1]);
        }
        // All shifts live in [e_min, e_min + R]
        for &a in &shifts {
            assert!(a > -2.0 && a < 3.0 + 5.0);
        }
    }

    #[test]
    fn test_shifted_family_matches_shifts() {
        let op = ising_like();
        let shifts = [0.5, 1.5];
        let family = shifted_family(&op, &shifts);
        assert_eq!(family.len(), 2);
        let m0 = family[0].to_matrix(1).unwrap();
        let base = op.to_matrix(1).unwrap();
        assert!((m0[[0, 0]] - (base[[0, 0]] - Complex64::new(0.5, 0.0))).norm() < 1e-12);
    }

    #[test]
    fn test_two_site_ground_energy() {
        // Exact 2-site Hubbard ground energy at U=1, t=1 in the half-filling
        // sector: U/2 - sqrt((U/2)^2 + 4t^2)
        let (family, ham) = hubbard_shifted_family(1.0, 2, 3, 1.0, 0b1001).unwrap();
        assert_eq!(family.len(), 3);
        let m = ham.to_matrix(4).unwrap();
        let (restricted, _) = sector_restriction(&m, 4, 2, 1, 0b1001).unwrap();
        let (evals, _) = eigh_symmetric(&restricted);
        let expected = 0.5 - (0.25f64 + 4.0).sqrt();
        assert!((evals[0] - expected).abs() < 1e-8);
    }

    fn ising_like() -> PauliOperator {
        PauliOperator::from_terms([(
            PauliString::single(0, Pauli::Z),
            Complex64::new(1.0, 0.0),
        )])
    }
}
