//! Dense assembly of tridiagonal matrices.
//!
//! The Lanczos recurrence produces two scalar sequences: the diagonal coefficients
//! alpha_j and the off-diagonal coefficients beta_j. Downstream consumers (dense
//! eigensolvers, matrix-function evaluations) want the explicit matrix
//!
//! ```text
//!     T_k = | α_1 β_1  0  ... |
//!           | β_1 α_2 β_2 ... |
//!           |  0  β_2 α_3 ... |
//!           | ... ... ... ... |
//! ```
//!
//! This module builds it.

use crate::error::{LanczosError, LanczosErrorKind};
use faer::{Mat, traits::ComplexField, traits::RealField};

/// How the alpha coefficients are placed on the main diagonal of `T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagonalConvention {
    /// Keep alpha_j as computed. This is the textbook algorithm and preserves the
    /// spectrum of operators with negative eigenvalues.
    #[default]
    Signed,
    /// Place |alpha_j| on the diagonal. Discards the sign of alpha_j, so the
    /// spectrum of `T` no longer matches an indefinite operator. Kept for
    /// compatibility with tooling that expects this layout.
    Magnitude,
}

impl DiagonalConvention {
    pub(crate) fn apply<R: RealField>(self, alpha: &R) -> R {
        match self {
            DiagonalConvention::Signed => R::copy_impl(alpha),
            DiagonalConvention::Magnitude => R::abs_impl(alpha),
        }
    }
}

/// Builds the dense `n x n` matrix with `sub` on the first sub-diagonal, `diag` on the
/// main diagonal and `sup` on the first super-diagonal. All other entries are zero.
///
/// # Errors
/// Returns a parameter mismatch error unless `sub.len() == sup.len() == diag.len() - 1`.
/// An empty `diag` requires empty `sub` and `sup` and yields a `0 x 0` matrix.
pub fn assemble_tridiagonal<T: ComplexField>(
    sub: &[T],
    diag: &[T],
    sup: &[T],
) -> Result<Mat<T>, LanczosError> {
    let n = diag.len();
    let expected_off = n.saturating_sub(1);

    for (param_name, seq) in [("sub", sub), ("sup", sup)] {
        if seq.len() != expected_off {
            return Err(LanczosErrorKind::ParameterMismatch {
                param_name: param_name.to_string(),
                expected: expected_off,
                actual: seq.len(),
            }
            .into());
        }
    }

    let mut t = Mat::<T>::zeros(n, n);
    for (i, d) in diag.iter().enumerate() {
        t[(i, i)] = T::copy_impl(d);
    }
    for (i, (lower, upper)) in sub.iter().zip(sup).enumerate() {
        t[(i + 1, i)] = T::copy_impl(lower);
        t[(i, i + 1)] = T::copy_impl(upper);
    }
    Ok(t)
}

/// Builds the symmetric tridiagonal matrix with `diag` on the main diagonal and
/// `off` on both adjacent diagonals.
pub fn symmetric_tridiagonal<T: ComplexField>(
    diag: &[T],
    off: &[T],
) -> Result<Mat<T>, LanczosError> {
    assemble_tridiagonal(off, diag, off)
}

/// A borrowed view of the Lanczos coefficients generated so far.
///
/// This is what monitoring callbacks receive at each step: `alphas` holds the signed
/// diagonal coefficients and `betas` the off-diagonal ones. `betas.len()` is either
/// `steps_taken - 1` or `steps_taken`, depending on whether the residual of the latest
/// step has already been accepted as an off-diagonal entry.
#[derive(Debug, Clone, Copy)]
pub struct TridiagonalSystemView<'a, R> {
    pub alphas: &'a [R],
    pub betas: &'a [R],
    pub steps_taken: usize,
}

impl<R: RealField> TridiagonalSystemView<'_, R> {
    /// Materializes the leading `steps_taken x steps_taken` tridiagonal matrix.
    ///
    /// `steps_taken` is clamped to the number of available diagonal coefficients.
    pub fn to_dense(&self, convention: DiagonalConvention) -> Mat<R> {
        let k = self.steps_taken.min(self.alphas.len());
        let diag: Vec<R> = self.alphas[..k]
            .iter()
            .map(|alpha| convention.apply(alpha))
            .collect();
        let off = &self.betas[..k.saturating_sub(1).min(self.betas.len())];

        let mut t = Mat::<R>::zeros(k, k);
        for (i, d) in diag.into_iter().enumerate() {
            t[(i, i)] = d;
        }
        for (i, beta) in off.iter().enumerate() {
            t[(i + 1, i)] = R::copy_impl(beta);
            t[(i, i + 1)] = R::copy_impl(beta);
        }
        t
    }
}
