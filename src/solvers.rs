//! This module provides a high-level, user-friendly API for tridiagonalizing a dense
//! Hermitian matrix with the Lanczos process and for reading approximate eigenpairs
//! off the result.

use crate::{
    algorithms::{
        LanczosOptions, LanczosOutput, lanczos::lanczos_tridiagonalize,
    },
    error::{LanczosError, LanczosErrorKind},
    matrix::validate_hermitian,
    tridiagonal::DiagonalConvention,
};
use faer::{
    Side,
    dyn_stack::{MemBuffer, MemStack},
    matrix_free::LinOp,
    prelude::*,
    traits::{ComplexField, RealField},
};

/// Computes the `n x n` real symmetric tridiagonal matrix `T` of the Lanczos process
/// on the Hermitian matrix `a`, started from the unit vector `v1`.
///
/// This runs the full `n` steps with the default [`LanczosOptions`]: breakdowns are
/// recovered from and the diagonal keeps the sign of each alpha_j. The eigenvalues of
/// `T` approximate those of `a`; see [`ritz_values`].
///
/// # Errors
/// Returns an invalid-argument error if `a` is not square and Hermitian, or if `v1` is
/// not an `n x 1` unit vector.
pub fn lanczos<T>(a: MatRef<'_, T>, v1: MatRef<'_, T>) -> Result<Mat<T::Real>, LanczosError>
where
    T: ComplexField,
    T::Real: RealField,
{
    let options = LanczosOptions::default();
    let output = lanczos_with_options(a, v1, &options)?;
    output.decomposition.tridiagonal(options.convention)
}

/// Runs the Lanczos process on a dense Hermitian matrix with explicit options and
/// returns the raw coefficients together with the basis, if it was stored.
pub fn lanczos_with_options<T>(
    a: MatRef<'_, T>,
    v1: MatRef<'_, T>,
    options: &LanczosOptions,
) -> Result<LanczosOutput<T>, LanczosError>
where
    T: ComplexField,
    T::Real: RealField,
{
    validate_hermitian(a)?;

    let mut mem = MemBuffer::new(a.apply_scratch(1, Par::Seq));
    let stack = MemStack::new(&mut mem);
    lanczos_tridiagonalize(&a, v1, options, stack, None)
}

/// Eigenvalues of a symmetric tridiagonal (or any self-adjoint) matrix, in
/// nondecreasing order.
///
/// Applied to the `T` returned by [`lanczos`], these are the Ritz values that
/// approximate the spectrum of the original matrix.
pub fn ritz_values<R: RealField>(t: MatRef<'_, R>) -> Result<Vec<R>, LanczosError> {
    let k = t.nrows();
    if k != t.ncols() {
        return Err(LanczosErrorKind::NotSquare {
            nrows: k,
            ncols: t.ncols(),
        }
        .into());
    }
    if k == 0 {
        return Ok(Vec::new());
    }

    let evd = t
        .self_adjoint_eigen(Side::Lower)
        .map_err(LanczosErrorKind::EvdError)?;
    let s = evd.S();
    Ok((0..k).map(|i| R::copy_impl(&s[i])).collect())
}

/// Ritz values and, as columns, the matching Ritz vectors `V_k Q`.
#[derive(Debug)]
pub struct RitzPairs<T: ComplexField> {
    pub values: Vec<T::Real>,
    pub vectors: Mat<T>,
}

/// Computes Ritz pairs from a Lanczos run whose basis was stored.
///
/// With `Q` the eigenvectors of `T_k`, the Ritz vectors are the columns of `V_k Q`.
/// They are only meaningful while the basis is close to orthonormal.
///
/// # Errors
/// Fails with an invalid-argument error if `output` carries no basis (run with
/// [`LanczosOptions::with_basis`]), or if the eigendecomposition of `T_k` fails.
pub fn ritz_pairs<T>(
    output: &LanczosOutput<T>,
    convention: DiagonalConvention,
) -> Result<RitzPairs<T>, LanczosError>
where
    T: ComplexField,
    T::Real: RealField,
{
    let v_k = output.basis.as_ref().ok_or_else(|| {
        LanczosErrorKind::InputError(
            "Ritz vectors require the Lanczos basis; enable `keep_basis`.".to_string(),
        )
    })?;

    let t_k = output.decomposition.tridiagonal(convention)?;
    let k = t_k.nrows();
    let evd = t_k
        .as_ref()
        .self_adjoint_eigen(Side::Lower)
        .map_err(LanczosErrorKind::EvdError)?;

    let s = evd.S();
    let values = (0..k).map(|i| T::Real::copy_impl(&s[i])).collect();

    // Lift the real eigenvectors of T_k into the scalar type of the basis.
    let u = evd.U();
    let q = Mat::<T>::from_fn(k, k, |i, j| T::from_real_impl(&u[(i, j)]));
    let vectors = v_k * &q;

    Ok(RitzPairs { values, vectors })
}
