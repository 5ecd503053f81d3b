//! Error Types - Tessera Error Handling
//!
//! One error enum covers every recoverable failure of the iteration core:
//! broadcasting and shape disagreements, kind and casting violations,
//! dimension validation, placement and allocation failures, and dispatch
//! registration misuse. Each variant belongs to one `ErrorKind` category so
//! callers can branch on the category without matching every variant.
//!
//! A missing kernel at dispatch time is not represented here. It is a
//! packaging defect and panics.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use thiserror::Error;

use crate::device::{Device, DeviceType};
use crate::dtype::{CastingPolicy, ScalarKind};

// =============================================================================
// Error Types
// =============================================================================

/// The main error type for tessera operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Shape mismatch between an explicit output and the broadcast result,
    /// or between two operands that must agree exactly.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// The expected shape.
        expected: Vec<usize>,
        /// The actual shape.
        actual: Vec<usize>,
    },

    /// Shapes cannot be broadcast together.
    #[error("Cannot broadcast shapes {shapes:?}: mismatch at dimension {dim}")]
    BroadcastError {
        /// Every shape taking part in the broadcast.
        shapes: Vec<Vec<usize>>,
        /// Offending dimension, counted in the broadcast result.
        dim: usize,
    },

    /// Two operands were required to have the same kind.
    #[error("Kind mismatch: expected {expected}, got {actual}")]
    DTypeMismatch {
        /// The expected kind.
        expected: ScalarKind,
        /// The actual kind.
        actual: ScalarKind,
    },

    /// A result kind cannot be written into an output of another kind.
    #[error("Cannot cast result of kind {from} to output kind {to} under the '{policy}' casting rule")]
    InvalidCast {
        /// The computed kind.
        from: ScalarKind,
        /// The output kind.
        to: ScalarKind,
        /// The policy that refused the conversion.
        policy: CastingPolicy,
    },

    /// A floating `alpha` was supplied to an integral computation.
    #[error("For integral input tensors, argument alpha must not be a floating point number (computing in {kind})")]
    InvalidAlpha {
        /// The resolved computation kind.
        kind: ScalarKind,
    },

    /// An operand carries the `Undefined` kind.
    #[error("Operand kind is undefined")]
    UndefinedKind,

    /// Invalid dimension index.
    #[error("Invalid dimension: index {index} for tensor with {ndim} dimensions")]
    InvalidDimension {
        /// The invalid dimension index.
        index: i64,
        /// Number of dimensions in the tensor.
        ndim: usize,
    },

    /// A dimension appears twice in a dimension list.
    #[error("Dimension {dim} appears multiple times in the list of dims")]
    DuplicateDimension {
        /// The repeated (normalized) dimension.
        dim: usize,
    },

    /// Index out of bounds.
    #[error("Index out of bounds: index {index} for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index.
        index: usize,
        /// The size of the dimension.
        size: usize,
    },

    /// Rank exceeds a structural limit.
    #[error("Rank overflow: {ndim} dimensions exceed the supported maximum of {max}")]
    RankOverflow {
        /// The requested rank.
        ndim: usize,
        /// The supported maximum.
        max: usize,
    },

    /// Device mismatch between operands.
    #[error("Device mismatch: expected {expected}, got {actual}")]
    DeviceMismatch {
        /// The expected device.
        expected: Device,
        /// The actual device.
        actual: Device,
    },

    /// Device not available.
    #[error("Device not available: {device}")]
    DeviceNotAvailable {
        /// The unavailable device.
        device: Device,
    },

    /// Memory allocation failed.
    #[error("Memory allocation failed: requested {size} bytes on {device}")]
    AllocationFailed {
        /// The requested size in bytes.
        size: usize,
        /// The device on which allocation failed.
        device: Device,
    },

    /// The written-to operand has elements sharing one memory location.
    #[error("Unsupported operation: more than one element of the written-to tensor refers to a single memory location")]
    InternalOverlap,

    /// Integral division by zero.
    #[error("Integer division by zero")]
    ZeroDivision,

    /// A kernel was already registered for this key.
    #[error("A kernel for '{op}' on {device_type} is already registered")]
    DuplicateStub {
        /// Operation identifier.
        op: String,
        /// Device type of the duplicate registration.
        device_type: DeviceType,
    },

    /// The dispatch table no longer accepts registrations.
    #[error("Dispatch table is sealed; cannot register '{op}'")]
    RegistrySealed {
        /// Operation identifier of the rejected registration.
        op: String,
    },

    /// Invalid operation for the given operands.
    #[error("Invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },

    /// Internal error (should not happen).
    #[error("Internal error: {message}")]
    InternalError {
        /// Description of the internal error.
        message: String,
    },
}

// =============================================================================
// Error Categories
// =============================================================================

/// Coarse category of an `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Broadcasting or explicit-shape disagreement.
    ShapeMismatch,
    /// Kind promotion, casting or scalar argument violation.
    TypeError,
    /// Dimension or index validation failure.
    IndexError,
    /// Rank beyond a structural limit.
    RankOverflow,
    /// Placement failure.
    Device,
    /// Allocation or memory layout failure.
    Memory,
    /// Arithmetic failure inside a kernel.
    Arithmetic,
    /// Dispatch table misuse.
    Dispatch,
    /// Anything else.
    Internal,
}

// =============================================================================
// Result Type
// =============================================================================

/// A specialized Result type for tessera operations.
pub type Result<T> = core::result::Result<T, Error>;

// =============================================================================
// Helper Functions
// =============================================================================

impl Error {
    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ShapeMismatch { .. } | Self::BroadcastError { .. } => ErrorKind::ShapeMismatch,
            Self::DTypeMismatch { .. }
            | Self::InvalidCast { .. }
            | Self::InvalidAlpha { .. }
            | Self::UndefinedKind => ErrorKind::TypeError,
            Self::InvalidDimension { .. }
            | Self::DuplicateDimension { .. }
            | Self::IndexOutOfBounds { .. } => ErrorKind::IndexError,
            Self::RankOverflow { .. } => ErrorKind::RankOverflow,
            Self::DeviceMismatch { .. } | Self::DeviceNotAvailable { .. } => ErrorKind::Device,
            Self::AllocationFailed { .. } | Self::InternalOverlap => ErrorKind::Memory,
            Self::ZeroDivision => ErrorKind::Arithmetic,
            Self::DuplicateStub { .. } | Self::RegistrySealed { .. } => ErrorKind::Dispatch,
            Self::InvalidOperation { .. } | Self::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Creates a new shape mismatch error.
    #[must_use]
    pub fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Creates a new broadcast error naming every participating shape.
    #[must_use]
    pub fn broadcast<S: AsRef<[usize]>>(shapes: &[S], dim: usize) -> Self {
        Self::BroadcastError {
            shapes: shapes.iter().map(|s| s.as_ref().to_vec()).collect(),
            dim,
        }
    }

    /// Creates a new invalid operation error.
    #[must_use]
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::shape_mismatch(&[2, 3], &[2, 4]);
        assert!(err.to_string().contains("Shape mismatch"));

        let err = Error::broadcast(&[vec![2, 3], vec![4, 3]], 0);
        assert!(err.to_string().contains("[[2, 3], [4, 3]]"));
        assert!(err.to_string().contains("dimension 0"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::broadcast(&[[1usize]], 0).kind(), ErrorKind::ShapeMismatch);
        assert_eq!(
            Error::InvalidCast {
                from: ScalarKind::Float,
                to: ScalarKind::Int,
                policy: CastingPolicy::SameKind,
            }
            .kind(),
            ErrorKind::TypeError
        );
        assert_eq!(
            Error::InvalidDimension { index: 4, ndim: 4 }.kind(),
            ErrorKind::IndexError
        );
        assert_eq!(
            Error::RankOverflow { ndim: 65, max: 64 }.kind(),
            ErrorKind::RankOverflow
        );
        assert_eq!(Error::InternalOverlap.kind(), ErrorKind::Memory);
        assert_eq!(Error::ZeroDivision.kind(), ErrorKind::Arithmetic);
    }

    #[test]
    fn test_alpha_message() {
        let err = Error::InvalidAlpha { kind: ScalarKind::Long };
        assert!(err
            .to_string()
            .starts_with("For integral input tensors, argument alpha must not be a floating point number"));
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(Error::InternalOverlap, Error::InternalOverlap);
        assert_ne!(Error::internal("a"), Error::internal("b"));
    }
}
