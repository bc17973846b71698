//! Input checks and small constructors for dense test operators.
//!
//! The Lanczos recurrence silently produces a meaningless `T` when it is fed a
//! non-Hermitian matrix or a starting vector that is not normalized, so the public entry
//! points validate their arguments here and fail fast with an invalid-argument error.

use crate::error::{LanczosError, LanczosErrorKind};
use faer::{
    prelude::*,
    traits::{ComplexField, RealField},
};

/// Allowed deviation of `||v1||` from one.
pub const UNIT_NORM_TOLERANCE: f64 = 1e-6;

/// Allowed `||A - A^H||_F` relative to `||A||_F`.
pub const HERMITIAN_TOLERANCE: f64 = 1e-8;

/// Checks that an `nrows x ncols` operator is square and non-empty.
pub(crate) fn validate_square(nrows: usize, ncols: usize) -> Result<(), LanczosError> {
    if nrows != ncols || nrows == 0 {
        return Err(LanczosErrorKind::NotSquare { nrows, ncols }.into());
    }
    Ok(())
}

/// Checks the starting vector and step count against an `nrows x ncols` operator.
pub(crate) fn validate_start_vector<T>(
    nrows: usize,
    ncols: usize,
    v1: MatRef<'_, T>,
    steps: usize,
) -> Result<(), LanczosError>
where
    T: ComplexField,
    T::Real: RealField,
{
    validate_square(nrows, ncols)?;

    if v1.nrows() != ncols || v1.ncols() != 1 {
        return Err(LanczosErrorKind::DimensionMismatch {
            operator_cols: ncols,
            vector_rows: v1.nrows(),
        }
        .into());
    }

    let norm = v1.norm_l2();
    let lower = T::Real::from_f64_impl(1.0 - UNIT_NORM_TOLERANCE);
    let upper = T::Real::from_f64_impl(1.0 + UNIT_NORM_TOLERANCE);
    // Written so that a NaN norm is rejected too.
    if !(norm >= lower && norm <= upper) {
        return Err(LanczosErrorKind::NotUnitNorm.into());
    }

    if steps == 0 || steps > nrows {
        return Err(LanczosErrorKind::InputError(format!(
            "The number of steps must lie in 1..={nrows}, got {steps}."
        ))
        .into());
    }
    Ok(())
}

/// Checks that `a` equals its conjugate transpose up to [`HERMITIAN_TOLERANCE`].
pub(crate) fn validate_hermitian<T>(a: MatRef<'_, T>) -> Result<(), LanczosError>
where
    T: ComplexField,
    T::Real: RealField,
{
    validate_square(a.nrows(), a.ncols())?;

    let adjoint = a.adjoint().to_owned();
    let asymmetry = (a - adjoint.as_ref()).norm_l2();
    let allowed = (a * Scale(T::from_f64_impl(HERMITIAN_TOLERANCE))).norm_l2();
    // Written so that a NaN entry is rejected as well.
    if !(asymmetry <= allowed) {
        return Err(LanczosErrorKind::NotHermitian.into());
    }
    Ok(())
}

/// The unit vector with every entry equal to `1 / sqrt(n)`.
pub fn uniform_unit_vector<T: ComplexField>(n: usize) -> Mat<T> {
    let entry = 1.0 / (n as f64).sqrt();
    Mat::from_fn(n, 1, |_, _| T::from_f64_impl(entry))
}

/// The dense diagonal matrix with the given entries.
pub fn diagonal_matrix<T: ComplexField>(entries: &[T]) -> Mat<T> {
    let n = entries.len();
    Mat::from_fn(n, n, |i, j| {
        if i == j {
            T::copy_impl(&entries[i])
        } else {
            T::zero_impl()
        }
    })
}
