//! Core state machine of the symmetric Lanczos process.
//!
//! [`LanczosIteration`] advances the three-term recurrence
//!
//! ```text
//!     w_j = A v_j - alpha_j v_j - beta_{j-1} v_{j-1},    beta_j = ||w_j||
//! ```
//!
//! retaining only the two most recent basis vectors. It does not decide what happens
//! when `beta_j` vanishes; that is the job of the driver in [`lanczos`], which applies
//! the configured [`BreakdownPolicy`].

pub mod lanczos;

use crate::{
    error::LanczosError,
    matrix::validate_start_vector,
    tridiagonal::{DiagonalConvention, TridiagonalSystemView, symmetric_tridiagonal},
};
use faer::{
    dyn_stack::MemStack,
    matrix_free::LinOp,
    prelude::*,
    traits::{ComplexField, RealField},
};

/// Multiplier applied to `n * eps * ||A v_j||` to obtain the breakdown tolerance.
const BREAKDOWN_SAFETY_FACTOR: f64 = 64.0;

/// Signature of the optional monitoring callback.
///
/// It receives the 1-based step index and a view of the coefficients generated so far.
/// Returning `false` stops the iteration gracefully after the current step.
pub type LanczosCallback<'c, R> = dyn FnMut(usize, &TridiagonalSystemView<'_, R>) -> bool + 'c;

/// What to do when the residual norm `beta_j` vanishes before the last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BreakdownPolicy {
    /// Record `beta_j = 0` and continue from a unit vector orthogonal to every basis
    /// vector generated so far. Requires storing the basis.
    #[default]
    Recover,
    /// Divide by `beta_j` regardless. A zero residual turns every later coefficient
    /// into NaN.
    Unguarded,
    /// Stop and report [`LanczosError`] with the breakdown step.
    Fail,
}

impl BreakdownPolicy {
    pub(crate) fn needs_basis(self) -> bool {
        matches!(self, BreakdownPolicy::Recover)
    }
}

/// Configuration for a Lanczos run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LanczosOptions {
    /// Number of steps `k`. `None` runs the full dimension of the operator.
    pub steps: Option<usize>,
    pub breakdown: BreakdownPolicy,
    pub convention: DiagonalConvention,
    /// Keep the Krylov basis `V_k` in the output even when the breakdown policy
    /// does not need it. Required for Ritz vectors.
    pub keep_basis: bool,
}

impl LanczosOptions {
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn with_breakdown(mut self, breakdown: BreakdownPolicy) -> Self {
        self.breakdown = breakdown;
        self
    }

    pub fn with_convention(mut self, convention: DiagonalConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn with_basis(mut self) -> Self {
        self.keep_basis = true;
        self
    }
}

/// The scalars produced by one step of the recurrence.
#[derive(Debug, Clone)]
pub struct LanczosStep<R> {
    /// 1-based index of the step.
    pub step: usize,
    pub alpha: R,
    /// Norm of the residual `w_j`.
    pub beta: R,
    /// `beta` is below the breakdown tolerance.
    pub breakdown: bool,
    /// No further step will be taken, so `beta` is not part of `T`.
    pub is_last: bool,
}

/// The scalar output of a Lanczos run, which fully defines the tridiagonal matrix `T_k`.
#[derive(Debug, Clone)]
pub struct LanczosDecomposition<R> {
    /// Signed diagonal coefficients alpha_1..alpha_k.
    pub alphas: Vec<R>,
    /// Off-diagonal coefficients beta_1..beta_{k-1}.
    pub betas: Vec<R>,
    pub steps_taken: usize,
    /// 1-based steps at which the residual vanished.
    pub breakdowns: Vec<usize>,
}

impl<R: RealField> LanczosDecomposition<R> {
    pub fn view(&self) -> TridiagonalSystemView<'_, R> {
        TridiagonalSystemView {
            alphas: &self.alphas,
            betas: &self.betas,
            steps_taken: self.steps_taken,
        }
    }

    /// Assembles the dense `k x k` tridiagonal matrix `T_k`.
    pub fn tridiagonal(&self, convention: DiagonalConvention) -> Result<Mat<R>, LanczosError> {
        let diag: Vec<R> = self
            .alphas
            .iter()
            .map(|alpha| convention.apply(alpha))
            .collect();
        symmetric_tridiagonal(&diag, &self.betas)
    }
}

/// Result of [`lanczos::lanczos_tridiagonalize`].
#[derive(Debug)]
pub struct LanczosOutput<T: ComplexField> {
    pub decomposition: LanczosDecomposition<T::Real>,
    /// The orthonormal basis `V_k` (n x k), if it was stored.
    pub basis: Option<Mat<T>>,
}

/// Stateful Lanczos recurrence holding only `v_{j-1}` and `v_j`.
pub struct LanczosIteration<'a, T: ComplexField, O: LinOp<T>> {
    operator: &'a O,
    pub(crate) v_prev: Mat<T>,
    pub(crate) v_curr: Mat<T>,
    residual: Mat<T>,
    residual_norm: T::Real,
    beta_prev: T::Real,
    steps_taken: usize,
    max_steps: usize,
}

impl<'a, T, O> LanczosIteration<'a, T, O>
where
    T: ComplexField,
    T::Real: RealField,
    O: LinOp<T>,
{
    /// Starts a recurrence of at most `max_steps` steps from the unit vector `v1`.
    ///
    /// # Errors
    /// Fails if the operator is not square, if `v1` is not an `n x 1` unit vector, or if
    /// `max_steps` is outside `1..=n`.
    pub fn new(operator: &'a O, v1: MatRef<'_, T>, max_steps: usize) -> Result<Self, LanczosError> {
        validate_start_vector(operator.nrows(), operator.ncols(), v1, max_steps)?;
        let n = operator.nrows();

        Ok(Self {
            operator,
            v_prev: Mat::zeros(n, 1),
            v_curr: v1.to_owned(),
            residual: Mat::zeros(n, 1),
            residual_norm: T::Real::zero_impl(),
            beta_prev: T::Real::zero_impl(),
            steps_taken: 0,
            max_steps,
        })
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    /// The current basis vector `v_j`.
    pub fn current(&self) -> MatRef<'_, T> {
        self.v_curr.as_ref()
    }

    /// Computes alpha_j, the residual `w_j` and its norm beta_j for the current vector.
    ///
    /// The basis is not advanced; call [`Self::advance`] or [`Self::restart_from`]
    /// afterwards. Returns `None` once `max_steps` steps have been taken.
    pub fn next_step(&mut self, stack: &mut MemStack) -> Option<LanczosStep<T::Real>> {
        if self.steps_taken >= self.max_steps {
            return None;
        }
        let n = self.v_curr.nrows();

        let mut applied = Mat::<T>::zeros(n, 1);
        self.operator
            .apply(applied.as_mut(), self.v_curr.as_ref(), Par::Seq, stack);

        // alpha_j = v_j^H A v_j is real for a Hermitian operator.
        let projection = self.v_curr.as_ref().adjoint() * applied.as_ref();
        let alpha = T::real_part_impl(&projection[(0, 0)]);

        let along_curr = &self.v_curr * Scale(T::from_real_impl(&alpha));
        let along_prev = &self.v_prev * Scale(T::from_real_impl(&self.beta_prev));
        let residual = &(&applied - &along_curr) - &along_prev;

        let beta = residual.norm_l2();
        let breakdown = beta <= breakdown_tolerance(&applied, n);

        self.residual = residual;
        self.residual_norm = T::Real::copy_impl(&beta);
        self.steps_taken += 1;

        Some(LanczosStep {
            step: self.steps_taken,
            alpha,
            beta,
            breakdown,
            is_last: self.steps_taken == self.max_steps,
        })
    }

    /// Normalizes the latest residual into the next basis vector, `v_{j+1} = w_j / beta_j`.
    ///
    /// The division is unconditional: a zero `beta_j` yields a NaN vector.
    pub fn advance(&mut self) {
        let inv_beta = T::Real::recip_impl(&self.residual_norm);
        let next = &self.residual * Scale(T::from_real_impl(&inv_beta));
        let beta = T::Real::copy_impl(&self.residual_norm);
        self.rotate(next, beta);
    }

    /// Continues from a caller-supplied unit vector, treating `beta_j` as exactly zero.
    pub fn restart_from(&mut self, next: Mat<T>) {
        self.rotate(next, T::Real::zero_impl());
    }

    fn rotate(&mut self, next: Mat<T>, beta: T::Real) {
        self.v_prev = core::mem::replace(&mut self.v_curr, next);
        self.beta_prev = beta;
    }
}

/// Residual norms at or below `64 * n * eps * ||A v_j||` count as a breakdown.
pub(crate) fn breakdown_tolerance<T>(applied: &Mat<T>, dim: usize) -> T::Real
where
    T: ComplexField,
    T::Real: RealField,
{
    // Scale the norm, not the vector, so operators near the overflow threshold stay finite.
    applied.norm_l2()
        * T::Real::from_f64_impl(BREAKDOWN_SAFETY_FACTOR * dim as f64)
        * T::Real::epsilon_impl()
}
