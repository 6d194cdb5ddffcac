//! Error types for simdmat operations.
//!
//! The raw kernels never fail: they reproduce IEEE-754 behaviour (and the
//! documented partial writes of the 3x3 inverse) on degenerate input. The
//! `try_*` entry points report those conditions through [`SimdmatError`]
//! instead.

use thiserror::Error;

/// Determinant magnitude at or below which `try_inverse` treats a matrix as singular.
pub const DEFAULT_SINGULAR_EPSILON: f32 = f32::EPSILON;

/// Errors that can occur during simdmat operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimdmatError {
    /// The matrix determinant is too close to zero to invert.
    #[error("Singular matrix: |determinant| = {} is not above epsilon {epsilon}", .determinant.abs())]
    SingularMatrix {
        /// The determinant that was computed.
        determinant: f32,
        /// The threshold the determinant was compared against.
        epsilon: f32,
    },
    /// Input validation error.
    #[error("Validation error: {message}")]
    ValidationError {
        /// Human-readable error message.
        message: String,
    },
}

/// Result type alias for simdmat operations.
pub type Result<T> = std::result::Result<T, SimdmatError>;

/// Creates a singular matrix error.
pub fn singular_matrix_error(determinant: f32, epsilon: f32) -> SimdmatError {
    SimdmatError::SingularMatrix {
        determinant,
        epsilon,
    }
}

/// Creates a validation error.
pub fn validation_error(message: impl Into<String>) -> SimdmatError {
    SimdmatError::ValidationError {
        message: message.into(),
    }
}
