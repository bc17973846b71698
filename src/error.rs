//! This module defines the custom error types for the library.
//!
//! Every failure that the Lanczos tridiagonalization, the tridiagonal assembler or the
//! Ritz extraction can report is collected into a single enum, [`LanczosErrorKind`],
//! which is kept private behind the opaque [`LanczosError`].
//!
//! Using the [`thiserror`] crate allows us to create idiomatic error types with minimal
//! boilerplate. Note that [`faer::linalg::evd::EvdError`] does not implement the standard
//! [`std::error::Error`] trait, so we wrap it manually to provide a compatible error type.
use thiserror::Error;

/// Represents all possible errors that can occur during a Lanczos process.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct LanczosError(#[from] LanczosErrorKind);

impl LanczosError {
    /// Returns `true` if the iteration stopped because a residual norm vanished
    /// under [`crate::algorithms::BreakdownPolicy::Fail`].
    pub fn is_breakdown(&self) -> bool {
        matches!(self.0, LanczosErrorKind::Breakdown { .. })
    }

    /// Returns `true` if the error was caused by malformed caller input
    /// (shape, norm, symmetry or parameter range) rather than by the numerics.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self.0,
            LanczosErrorKind::NotSquare { .. }
                | LanczosErrorKind::DimensionMismatch { .. }
                | LanczosErrorKind::NotUnitNorm
                | LanczosErrorKind::NotHermitian
                | LanczosErrorKind::ParameterMismatch { .. }
                | LanczosErrorKind::InputError(_)
        )
    }
}

/// Private enum containing the distinct kinds of errors.
/// This separation allows for a clean `Display` implementation via [`thiserror`]
/// while handling non-standard error types manually.
#[derive(Error, Debug, PartialEq)]
pub(crate) enum LanczosErrorKind {
    /// The residual norm beta fell below the breakdown tolerance before the last step.
    /// The Krylov subspace generated so far is invariant under the operator.
    #[error(
        "Lanczos iteration breakdown at step {step}: Beta coefficient is zero. The Krylov subspace is invariant."
    )]
    Breakdown { step: usize },

    #[error("Operator must be square and non-empty, got {nrows}x{ncols}.")]
    NotSquare { nrows: usize, ncols: usize },

    /// Indicates that the dimensions of the operator and the starting vector are
    /// incompatible for a matrix-vector product.
    #[error(
        "Dimension mismatch: operator has {operator_cols} columns but vector has {vector_rows} rows."
    )]
    DimensionMismatch {
        operator_cols: usize,
        vector_rows: usize,
    },

    #[error("The starting vector must have unit Euclidean norm.")]
    NotUnitNorm,

    #[error("The input matrix is not Hermitian.")]
    NotHermitian,

    /// A sequence handed to the tridiagonal assembler has the wrong length.
    #[error("Parameter mismatch for `{param_name}`: expected length {expected}, got {actual}.")]
    ParameterMismatch {
        param_name: String,
        expected: usize,
        actual: usize,
    },

    /// Indicates that an invalid input parameter was provided to a function.
    #[error("Invalid input parameter: {0}")]
    InputError(String),

    /// Wraps an error originating from [`faer`]'s eigendecomposition module.
    #[error("A numerical error occurred during the eigendecomposition of T_k: {0:?}")]
    EvdError(faer::linalg::evd::EvdError),
}

// Manually implement PartialEq for the public error type.
// We compare the inner `LanczosErrorKind`.
impl PartialEq for LanczosError {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
