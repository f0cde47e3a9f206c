// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pauli strings and qubit operators.
//!
//! A [`PauliString`] maps qubit line indices to non-identity Pauli letters; a
//! [`PauliOperator`] is a weighted sum of strings. Matrix conventions follow
//! the rest of the crate: qubit 0 is the most significant bit of a basis
//! index.

use std::collections::BTreeMap;
use std::fmt;

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{OperatorError, Result};
use crate::linalg::kron_list;

/// Single-qubit Pauli letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pauli {
    I,
    X,
    Y,
    Z,
}

impl Pauli {
    /// 2x2 matrix of the letter.
    pub fn matrix(self) -> Array2<Complex64> {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        match self {
            Pauli::I => ndarray::array![[one, zero], [zero, one]],
            Pauli::X => ndarray::array![[zero, one], [one, zero]],
            Pauli::Y => ndarray::array![[zero, -i], [i, zero]],
            Pauli::Z => ndarray::array![[one, zero], [zero, -one]],
        }
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Pauli::I => "I",
            Pauli::X => "X",
            Pauli::Y => "Y",
            Pauli::Z => "Z",
        };
        write!(f, "{}", s)
    }
}

/// Product of Pauli letters over qubit lines; identity entries are omitted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PauliString {
    letters: BTreeMap<u32, Pauli>,
}

impl PauliString {
    /// Identity string.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Build from (qubit, letter) pairs; identity letters are dropped.
    pub fn new(pairs: impl IntoIterator<Item = (u32, Pauli)>) -> Self {
        let mut letters = BTreeMap::new();
        for (q, p) in pairs {
            if p != Pauli::I {
                letters.insert(q, p);
            }
        }
        Self { letters }
    }

    /// Single-letter string.
    pub fn single(qubit: u32, letter: Pauli) -> Self {
        Self::new([(qubit, letter)])
    }

    /// Non-identity letters, keyed by qubit line.
    pub fn letters(&self) -> &BTreeMap<u32, Pauli> {
        &self.letters
    }

    /// Number of non-identity letters.
    pub fn weight(&self) -> usize {
        self.letters.len()
    }

    /// True for the identity string.
    pub fn is_identity(&self) -> bool {
        self.letters.is_empty()
    }

    /// Highest addressed qubit line plus one, zero for the identity.
    pub fn n_qubits(&self) -> u32 {
        self.letters.keys().next_back().map_or(0, |q| q + 1)
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.letters.is_empty() {
            return write!(f, "I");
        }
        for (q, p) in &self.letters {
            write!(f, "{}{}", p, q)?;
        }
        Ok(())
    }
}

/// Weighted sum of Pauli strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PauliOperator {
    terms: BTreeMap<PauliString, Complex64>,
}

impl PauliOperator {
    /// Empty operator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (string, coefficient) pairs, accumulating duplicates.
    pub fn from_terms(terms: impl IntoIterator<Item = (PauliString, Complex64)>) -> Self {
        let mut op = Self::new();
        for (s, c) in terms {
            op.add_term(s, c);
        }
        op
    }

    /// Add a coefficient to a string, dropping terms that cancel to zero.
    pub fn add_term(&mut self, string: PauliString, coeff: Complex64) {
        let entry = self.terms.entry(string.clone()).or_insert(Complex64::new(0.0, 0.0));
        *entry += coeff;
        if entry.norm() < 1e-15 {
            self.terms.remove(&string);
        }
    }

    /// Add another operator, term by term.
    pub fn add(&mut self, other: &PauliOperator) {
        for (s, c) in &other.terms {
            self.add_term(s.clone(), *c);
        }
    }

    /// Multiply every coefficient by a scalar.
    pub fn scale(&mut self, factor: Complex64) {
        for c in self.terms.values_mut() {
            *c *= factor;
        }
    }

    /// Subtract `shift · I`.
    pub fn sub_identity(&mut self, shift: f64) {
        self.add_term(PauliString::identity(), Complex64::new(-shift, 0.0));
    }

    /// Terms in deterministic (string-sorted) order.
    pub fn terms(&self) -> impl Iterator<Item = (&PauliString, &Complex64)> {
        self.terms.iter()
    }

    /// Number of terms.
    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    /// True when no terms are present.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Sum of coefficient magnitudes.
    pub fn l1_norm(&self) -> f64 {
        self.terms.values().map(|c| c.norm()).sum()
    }

    /// Highest addressed qubit line plus one.
    pub fn n_qubits(&self) -> u32 {
        self.terms.keys().map(|s| s.n_qubits()).max().unwrap_or(0)
    }

    /// Hermitian iff every coefficient is real (strings are Hermitian).
    pub fn is_hermitian(&self) -> bool {
        self.terms.values().all(|c| c.im.abs() < 1e-12)
    }

    /// Dense matrix over `n_qubits` lines, qubit 0 most significant.
    pub fn to_matrix(&self, n_qubits: u32) -> Result<Array2<Complex64>> {
        if self.is_empty() {
            return Err(OperatorError::Empty.into());
        }
        if self.n_qubits() > n_qubits {
            return Err(OperatorError::QubitOutOfRange {
                index: self.n_qubits() - 1,
                n_qubits,
            }
            .into());
        }

        let dim = 1usize << n_qubits;
        let mut out = Array2::<Complex64>::zeros((dim, dim));
        for (string, &coeff) in &self.terms {
            let factors: Vec<Array2<Complex64>> = (0..n_qubits)
                .map(|q| string.letters().get(&q).copied().unwrap_or(Pauli::I).matrix())
                .collect();
            let term = kron_list(&factors);
            out = out + term.mapv(|x| x * coeff);
        }
        Ok(out)
    }
}

impl fmt::Display for PauliOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (s, c) in &self.terms {
            if !first {
                write!(f, " + ")?;
            }
            write!(f, "({:.6}{:+.6}i)·{}", c.re, c.im, s)?;
            first = false;
        }
        if first {
            write!(f, "0")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn test_string_drops_identity_letters() {
        let s = PauliString::new([(0, Pauli::I), (1, Pauli::X)]);
        assert_eq!(s.weight(), 1);
        assert_eq!(s.n_qubits(), 2);
    }

    #[test]
    fn test_operator_accumulates_and_cancels() {
        let mut op = PauliOperator::new();
        op.add_term(PauliString::single(0, Pauli::Z), c(1.0));
        op.add_term(PauliString::single(0, Pauli::Z), c(-1.0));
        assert!(op.is_empty());

        op.add_term(PauliString::single(0, Pauli::Z), c(0.5));
        op.add_term(PauliString::single(0, Pauli::Z), c(0.25));
        assert_eq!(op.n_terms(), 1);
        assert!((op.l1_norm() - 0.75).abs() < 1e-15);
    }

    #[test]
    fn test_sub_identity() {
        let mut op = PauliOperator::from_terms([(PauliString::single(0, Pauli::X), c(1.0))]);
        op.sub_identity(2.0);
        let m = op.to_matrix(1).unwrap();
        // X - 2I = [[-2, 1], [1, -2]]
        assert!((m[[0, 0]] - c(-2.0)).norm() < 1e-12);
        assert!((m[[0, 1]] - c(1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_to_matrix_qubit_zero_most_significant() {
        // Z on qubit 0 of two lines: diag(1, 1, -1, -1)
        let op = PauliOperator::from_terms([(PauliString::single(0, Pauli::Z), c(1.0))]);
        let m = op.to_matrix(2).unwrap();
        assert!((m[[0, 0]] - c(1.0)).norm() < 1e-12);
        assert!((m[[1, 1]] - c(1.0)).norm() < 1e-12);
        assert!((m[[2, 2]] - c(-1.0)).norm() < 1e-12);
        assert!((m[[3, 3]] - c(-1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_to_matrix_rejects_out_of_range() {
        let op = PauliOperator::from_terms([(PauliString::single(3, Pauli::X), c(1.0))]);
        assert!(op.to_matrix(2).is_err());
    }

    #[test]
    fn test_hermiticity() {
        let mut op = PauliOperator::from_terms([(PauliString::single(0, Pauli::Y), c(0.5))]);
        assert!(op.is_hermitian());
        op.add_term(PauliString::single(1, Pauli::X), Complex64::new(0.0, 1.0));
        assert!(!op.is_hermitian());
    }

    #[test]
    fn test_pauli_matrices_square_to_identity() {
        for p in [Pauli::X, Pauli::Y, Pauli::Z] {
            let m = p.matrix();
            let sq = m.dot(&m);
            assert!((sq[[0, 0]] - c(1.0)).norm() < 1e-15);
            assert!((sq[[1, 1]] - c(1.0)).norm() < 1e-15);
            assert!(sq[[0, 1]].norm() < 1e-15);
        }
    }
}
