// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the wallcheb library.

use std::fmt;

/// Result type alias for wallcheb operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug)]
pub enum Error {
    /// Configuration error
    Config(String),
    /// Circuit construction error
    Circuit(CircuitError),
    /// Operator construction error
    Operator(OperatorError),
    /// Backend error
    Backend(BackendError),
    /// Validation error
    Validation(ValidationError),
    /// IO error
    Io(std::io::Error),
    /// Serialization error
    Serialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Circuit(e) => write!(f, "Circuit error: {}", e),
            Error::Operator(e) => write!(f, "Operator error: {}", e),
            Error::Backend(e) => write!(f, "Backend error: {}", e),
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Circuit(e) => Some(e),
            Error::Operator(e) => Some(e),
            Error::Backend(e) => Some(e),
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<CircuitError> for Error {
    fn from(e: CircuitError) -> Self {
        Error::Circuit(e)
    }
}

impl From<OperatorError> for Error {
    fn from(e: OperatorError) -> Self {
        Error::Operator(e)
    }
}

impl From<BackendError> for Error {
    fn from(e: BackendError) -> Self {
        Error::Backend(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Circuit construction and register-wiring errors.
#[derive(Debug)]
pub enum CircuitError {
    /// A register with this name already exists in the circuit
    DuplicateRegister(String),
    /// A qubit appears more than once in a register map input
    DuplicateQubit(String),
    /// Register map sides differ in size
    RegisterMapSize { box_qubits: usize, circ_qubits: usize },
    /// Qubit referenced by a gate or map is not in the circuit
    QubitNotInCircuit(String),
    /// A box could not be wired onto a circuit
    IncompatibleRegisters(String),
    /// Gate input is malformed (dimensions, amplitudes, patterns)
    InvalidGate(String),
    /// Circuit exceeds what the state-vector engine can address
    TooManyQubits { n_qubits: usize, max: usize },
}

impl fmt::Display for CircuitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitError::DuplicateRegister(name) => {
                write!(f, "Register '{}' already exists in the circuit", name)
            }
            CircuitError::DuplicateQubit(q) => {
                write!(f, "Qubit {} appears more than once in the input", q)
            }
            CircuitError::RegisterMapSize {
                box_qubits,
                circ_qubits,
            } => write!(
                f,
                "Register map sides differ in size: {} box qubits vs {} circuit qubits",
                box_qubits, circ_qubits
            ),
            CircuitError::QubitNotInCircuit(q) => {
                write!(f, "Qubit {} is not in the circuit", q)
            }
            CircuitError::IncompatibleRegisters(msg) => {
                write!(f, "Incompatible registers: {}", msg)
            }
            CircuitError::InvalidGate(msg) => write!(f, "Invalid gate: {}", msg),
            CircuitError::TooManyQubits { n_qubits, max } => write!(
                f,
                "Circuit has {} qubits, engine supports at most {}",
                n_qubits, max
            ),
        }
    }
}

impl std::error::Error for CircuitError {}

/// Operator construction errors.
#[derive(Debug)]
pub enum OperatorError {
    /// Operator has no terms where at least one is required
    Empty,
    /// Pauli string addresses a qubit outside the state register
    QubitOutOfRange { index: u32, n_qubits: u32 },
    /// Sector restriction could not locate the reference determinant
    ReferenceNotInSector(u64),
    /// Matrix input has the wrong shape
    DimensionMismatch { expected: usize, actual: usize },
}

impl fmt::Display for OperatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorError::Empty => write!(f, "Operator has no terms"),
            OperatorError::QubitOutOfRange { index, n_qubits } => write!(
                f,
                "Pauli string qubit {} is outside the {}-qubit register",
                index, n_qubits
            ),
            OperatorError::ReferenceNotInSector(r) => write!(
                f,
                "Reference determinant {:#b} is not in the requested particle sector",
                r
            ),
            OperatorError::DimensionMismatch { expected, actual } => write!(
                f,
                "Matrix dimension mismatch: expected {}, got {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for OperatorError {}

/// Backend-specific errors.
#[derive(Debug)]
pub enum BackendError {
    /// Backend not found
    NotFound(String),
    /// Backend unavailable
    Unavailable(String),
    /// Execution failed
    ExecutionFailed(String),
    /// Every shot was rejected by post-selection
    PostselectionFailed(String),
    /// Invalid request
    InvalidRequest(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::NotFound(name) => write!(f, "Backend not found: {}", name),
            BackendError::Unavailable(msg) => write!(f, "Backend unavailable: {}", msg),
            BackendError::ExecutionFailed(msg) => write!(f, "Execution failed: {}", msg),
            BackendError::PostselectionFailed(msg) => {
                write!(f, "Post-selection failed: {}", msg)
            }
            BackendError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

/// Validation errors.
#[derive(Debug)]
pub enum ValidationError {
    /// Field validation failed
    Field { field: String, message: String },
    /// Resource limit exceeded
    ResourceLimit {
        resource: String,
        limit: u64,
        requested: u64,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Field { field, message } => {
                write!(f, "Field '{}': {}", field, message)
            }
            ValidationError::ResourceLimit {
                resource,
                limit,
                requested,
            } => {
                write!(
                    f,
                    "Resource limit exceeded for {}: limit={}, requested={}",
                    resource, limit, requested
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_error_display_config() {
        let e = Error::Config("bad order".into());
        assert_eq!(e.to_string(), "Configuration error: bad order");
    }

    #[test]
    fn test_error_display_backend() {
        let e = Error::Backend(BackendError::NotFound("statevector".into()));
        assert_eq!(
            e.to_string(),
            "Backend error: Backend not found: statevector"
        );
    }

    #[test]
    fn test_error_display_circuit() {
        let e = Error::Circuit(CircuitError::DuplicateRegister("p".into()));
        assert_eq!(
            e.to_string(),
            "Circuit error: Register 'p' already exists in the circuit"
        );
    }

    #[test]
    fn test_error_display_validation() {
        let e = Error::Validation(ValidationError::ResourceLimit {
            resource: "shots".into(),
            limit: 100,
            requested: 200,
        });
        assert_eq!(
            e.to_string(),
            "Validation error: Resource limit exceeded for shots: limit=100, requested=200"
        );
    }

    #[test]
    fn test_error_source_chain() {
        let e = Error::Circuit(CircuitError::DuplicateQubit("q[0]".into()));
        assert!(e.source().is_some());
        let e = Error::Config("x".into());
        assert!(e.source().is_none());
    }

    #[test]
    fn test_from_conversions() {
        let e: Error = CircuitError::DuplicateRegister("a".into()).into();
        assert!(matches!(e, Error::Circuit(_)));
        let e: Error = BackendError::Unavailable("down".into()).into();
        assert!(matches!(e, Error::Backend(_)));
        let e: Error = OperatorError::Empty.into();
        assert!(matches!(e, Error::Operator(_)));
    }
}
