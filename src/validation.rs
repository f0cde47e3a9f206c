// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input validation for projection runs.

use crate::config::ResourceLimits;
use crate::error::{Result, ValidationError};
use crate::operators::pauli::PauliOperator;

/// Validate a circuit run request against the limits.
pub fn validate_run_request(n_qubits: usize, shots: u32, limits: &ResourceLimits) -> Result<()> {
    if shots == 0 {
        return Err(ValidationError::Field {
            field: "shots".into(),
            message: "must be greater than 0".into(),
        }
        .into());
    }
    if shots > limits.max_shots {
        return Err(ValidationError::ResourceLimit {
            resource: "shots".into(),
            limit: limits.max_shots as u64,
            requested: shots as u64,
        }
        .into());
    }
    if n_qubits > limits.max_qubits as usize {
        return Err(ValidationError::ResourceLimit {
            resource: "n_qubits".into(),
            limit: limits.max_qubits as u64,
            requested: n_qubits as u64,
        }
        .into());
    }
    Ok(())
}

/// Validate an operator before it is lowered to a block encoding.
pub fn validate_operator(operator: &PauliOperator, limits: &ResourceLimits) -> Result<()> {
    if operator.is_empty() {
        return Err(ValidationError::Field {
            field: "operator".into(),
            message: "operator has no terms".into(),
        }
        .into());
    }
    if operator.n_terms() > limits.max_terms as usize {
        return Err(ValidationError::ResourceLimit {
            resource: "operator terms".into(),
            limit: limits.max_terms as u64,
            requested: operator.n_terms() as u64,
        }
        .into());
    }
    for (_, c) in operator.terms() {
        if !c.re.is_finite() || !c.im.is_finite() {
            return Err(ValidationError::Field {
                field: "operator".into(),
                message: "coefficients must be finite".into(),
            }
            .into());
        }
    }
    Ok(())
}

/// Validate a wall filter order.
pub fn validate_filter_order(order: u32, limits: &ResourceLimits) -> Result<()> {
    if order == 0 {
        return Err(ValidationError::Field {
            field: "order".into(),
            message: "must be greater than 0".into(),
        }
        .into());
    }
    if order > limits.max_filter_order {
        return Err(ValidationError::ResourceLimit {
            resource: "filter order".into(),
            limit: limits.max_filter_order as u64,
            requested: order as u64,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::pauli::{Pauli, PauliString};
    use num_complex::Complex64;

    #[test]
    fn test_validate_run_request() {
        let limits = ResourceLimits::default();
        assert!(validate_run_request(4, 1000, &limits).is_ok());
        assert!(validate_run_request(4, 0, &limits).is_err());
        assert!(validate_run_request(4, 10_000_000, &limits).is_err());
        assert!(validate_run_request(64, 1000, &limits).is_err());
    }

    #[test]
    fn test_validate_operator() {
        let limits = ResourceLimits::default();
        let op = PauliOperator::from_terms([(
            PauliString::single(0, Pauli::X),
            Complex64::new(1.0, 0.0),
        )]);
        assert!(validate_operator(&op, &limits).is_ok());
        assert!(validate_operator(&PauliOperator::new(), &limits).is_err());

        let bad = PauliOperator::from_terms([(
            PauliString::single(0, Pauli::X),
            Complex64::new(f64::INFINITY, 0.0),
        )]);
        assert!(validate_operator(&bad, &limits).is_err());
    }

    #[test]
    fn test_validate_filter_order() {
        let limits = ResourceLimits::default();
        assert!(validate_filter_order(5, &limits).is_ok());
        assert!(validate_filter_order(0, &limits).is_err());
        assert!(validate_filter_order(1000, &limits).is_err());
    }
}
