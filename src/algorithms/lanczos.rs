//! Unrestarted symmetric Lanczos tridiagonalization.
//!
//! ** NOTE: We recommend using the high-level methods in [`crate::solvers`] instead. This
//! module is intended for use cases where fine-grained control over the Lanczos process is
//! required: matrix-free operators, per-step monitoring, or early termination.
//!
//! The driver [`lanczos_tridiagonalize`] runs [`LanczosIteration`] for `k` steps and
//! collects the coefficients of the tridiagonal matrix `T_k`. No reorthogonalization is
//! performed between steps, so in floating point the basis gradually loses orthogonality
//! and `T_k` may carry duplicated copies of converged eigenvalues. This is the classical
//! behaviour of the method.
//!
//! The only place the basis is revisited is a breakdown under [`BreakdownPolicy::Recover`]:
//! the next vector is then chosen orthogonal to all previous ones.

use super::{
    BreakdownPolicy, LanczosCallback, LanczosDecomposition, LanczosError, LanczosIteration,
    LanczosOptions, LanczosOutput, TridiagonalSystemView,
};
use crate::error::LanczosErrorKind;
use faer::{
    dyn_stack::MemStack,
    matrix_free::LinOp,
    prelude::*,
    traits::{ComplexField, RealField},
};

/// Runs the Lanczos process on `operator` from the unit vector `v1`.
///
/// # Arguments
/// * `operator`: A Hermitian linear operator implementing [`faer::matrix_free::LinOp`].
///   Its symmetry is not checked here.
/// * `v1`: The starting vector, `n x 1` with unit norm.
/// * `options`: Step count, breakdown policy and whether to keep the basis.
/// * `stack`: A [`MemStack`] sized for `operator.apply_scratch(1, Par::Seq)`.
/// * `callback`: Invoked after every step; returning `false` stops the process.
///
/// # Returns
/// The coefficients of `T_k` and, if stored, the basis `V_k`. `steps_taken` is below `k`
/// only when the callback requested an early stop.
pub fn lanczos_tridiagonalize<T, O>(
    operator: &O,
    v1: MatRef<'_, T>,
    options: &LanczosOptions,
    stack: &mut MemStack,
    mut callback: Option<&mut LanczosCallback<'_, T::Real>>,
) -> Result<LanczosOutput<T>, LanczosError>
where
    T: ComplexField,
    T::Real: RealField,
    O: LinOp<T>,
{
    let n = operator.nrows();
    let k = options.steps.unwrap_or(n);
    let mut lanczos_iter = LanczosIteration::new(operator, v1, k)?;

    let store_basis = options.keep_basis || options.breakdown.needs_basis();
    let mut basis = store_basis.then(|| Mat::<T>::zeros(n, k));
    if let Some(v_k) = basis.as_mut() {
        v_k.col_mut(0).copy_from(lanczos_iter.v_curr.as_ref().col(0));
    }

    let mut alphas = Vec::with_capacity(k);
    let mut betas = Vec::with_capacity(k - 1);
    let mut breakdowns = Vec::new();

    while let Some(step) = lanczos_iter.next_step(stack) {
        let j = step.step;
        alphas.push(step.alpha);

        if let Some(ref mut cb) = callback {
            let t_k_view = TridiagonalSystemView {
                alphas: &alphas,
                betas: &betas,
                steps_taken: j,
            };
            if !cb(j, &t_k_view) {
                log::debug!("Callback requested a stop after step {j} of {k}.");
                break;
            }
        }

        // The residual of the last step is never turned into a basis vector.
        if step.is_last {
            break;
        }

        if step.breakdown {
            breakdowns.push(j);
            match options.breakdown {
                BreakdownPolicy::Fail => {
                    return Err(LanczosErrorKind::Breakdown { step: j }.into());
                }
                BreakdownPolicy::Unguarded => {
                    log::warn!(
                        "Lanczos breakdown at step {j} (beta = {:?}); dividing anyway.",
                        step.beta
                    );
                    betas.push(step.beta);
                    lanczos_iter.advance();
                }
                BreakdownPolicy::Recover => {
                    log::warn!(
                        "Lanczos breakdown at step {j} (beta = {:?}); continuing from an orthogonal vector.",
                        step.beta
                    );
                    let v_k = basis.as_ref().ok_or_else(|| {
                        LanczosErrorKind::InputError(
                            "Breakdown recovery requires the Krylov basis.".to_string(),
                        )
                    })?;
                    let next = orthogonal_unit_vector(v_k.as_ref().get(.., 0..j))
                        .ok_or(LanczosErrorKind::Breakdown { step: j })?;
                    betas.push(T::Real::zero_impl());
                    lanczos_iter.restart_from(next);
                }
            }
        } else {
            betas.push(step.beta);
            lanczos_iter.advance();
        }

        // `v_curr` now holds v_{j+1}.
        if let Some(v_k) = basis.as_mut() {
            v_k.col_mut(j).copy_from(lanczos_iter.v_curr.as_ref().col(0));
        }
    }

    let steps_taken = lanczos_iter.steps_taken();
    log::debug!(
        "Lanczos finished: {steps_taken} steps, {} breakdown(s).",
        breakdowns.len()
    );

    // Only the callback can stop the loop early. Drop the unused basis columns so the
    // basis always has `steps_taken` columns.
    let basis = basis.map(|v_k| {
        if steps_taken == k {
            v_k
        } else {
            v_k.as_ref().get(.., 0..steps_taken).to_owned()
        }
    });

    Ok(LanczosOutput {
        decomposition: LanczosDecomposition {
            alphas,
            betas,
            steps_taken,
            breakdowns,
        },
        basis,
    })
}

/// Returns a unit vector orthogonal to the columns of `basis`, which must be orthonormal.
///
/// Every standard basis vector `e_i` is projected onto the orthogonal complement of
/// `basis` with two passes of classical Gram-Schmidt, and the one with the largest
/// remaining norm is normalized. Ties resolve to the smallest `i`, so the choice is
/// deterministic. Returns `None` when the complement is numerically empty.
pub(crate) fn orthogonal_unit_vector<T>(basis: MatRef<'_, T>) -> Option<Mat<T>>
where
    T: ComplexField,
    T::Real: RealField,
{
    let n = basis.nrows();
    let mut best: Option<(T::Real, Mat<T>)> = None;

    for i in 0..n {
        let mut candidate = Mat::<T>::zeros(n, 1);
        candidate[(i, 0)] = T::one_impl();
        for _ in 0..2 {
            let coefficients = basis.adjoint() * candidate.as_ref();
            let projection = basis * coefficients.as_ref();
            candidate = &candidate - &projection;
        }

        let norm = candidate.norm_l2();
        let improves = match &best {
            Some((best_norm, _)) => &norm > best_norm,
            None => true,
        };
        if improves {
            best = Some((norm, candidate));
        }
    }

    let (norm, candidate) = best?;
    // Some e_i keeps at least sqrt((n - j) / n) of its norm, so a tiny maximum means
    // the basis already spans the whole space.
    if !(norm > T::Real::sqrt_impl(&T::Real::epsilon_impl())) {
        return None;
    }
    let inv_norm = T::Real::recip_impl(&norm);
    Some(&candidate * Scale(T::from_real_impl(&inv_norm)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{diagonal_matrix, uniform_unit_vector};
    use faer::dyn_stack::MemBuffer;

    fn run(
        a: &Mat<f64>,
        v1: &Mat<f64>,
        options: &LanczosOptions,
    ) -> Result<LanczosOutput<f64>, LanczosError> {
        let op = a.as_ref();
        let mut mem = MemBuffer::new(op.apply_scratch(1, Par::Seq));
        let stack = MemStack::new(&mut mem);
        lanczos_tridiagonalize(&op, v1.as_ref(), options, stack, None)
    }

    #[test]
    fn test_coefficient_counts_for_full_run() {
        let a = diagonal_matrix(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let v1 = uniform_unit_vector(5);
        let output = run(&a, &v1, &LanczosOptions::default()).unwrap();

        let decomposition = &output.decomposition;
        assert_eq!(decomposition.steps_taken, 5);
        assert_eq!(decomposition.alphas.len(), 5);
        assert_eq!(decomposition.betas.len(), 4);
        assert!(decomposition.breakdowns.is_empty());
        // The default recovery policy keeps the basis around.
        assert_eq!(output.basis.as_ref().map(|v| v.ncols()), Some(5));
    }

    #[test]
    fn test_partial_run_without_basis() {
        let a = diagonal_matrix(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let v1 = uniform_unit_vector(5);
        let options = LanczosOptions::default()
            .with_steps(3)
            .with_breakdown(BreakdownPolicy::Unguarded);
        let output = run(&a, &v1, &options).unwrap();

        assert_eq!(output.decomposition.steps_taken, 3);
        assert_eq!(output.decomposition.betas.len(), 2);
        assert!(output.basis.is_none());
        // alpha_1 = v1^T A v1 is the mean of the diagonal.
        assert!((output.decomposition.alphas[0] - 3.0).abs() < 1e-14);
    }

    #[test]
    fn test_callback_can_stop_early() {
        let a = diagonal_matrix(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let v1 = uniform_unit_vector(6);
        let op = a.as_ref();
        let mut mem = MemBuffer::new(op.apply_scratch(1, Par::Seq));
        let stack = MemStack::new(&mut mem);

        let mut seen = Vec::new();
        let mut callback = |step: usize, view: &TridiagonalSystemView<'_, f64>| {
            assert_eq!(view.alphas.len(), step);
            assert_eq!(view.betas.len(), step - 1);
            seen.push(step);
            step < 2
        };
        let options = LanczosOptions::default().with_basis();
        let output =
            lanczos_tridiagonalize(&op, v1.as_ref(), &options, stack, Some(&mut callback))
                .unwrap();

        assert_eq!(seen, vec![1, 2]);
        assert_eq!(output.decomposition.steps_taken, 2);
        assert_eq!(output.decomposition.alphas.len(), 2);
        assert_eq!(output.decomposition.betas.len(), 1);
        assert_eq!(output.basis.map(|v| v.ncols()), Some(2));
    }

    #[test]
    fn test_fail_policy_reports_step() {
        let a = Mat::<f64>::identity(3, 3);
        let v1 = Mat::from_fn(3, 1, |i, _| if i == 0 { 1.0 } else { 0.0 });
        let options = LanczosOptions::default().with_breakdown(BreakdownPolicy::Fail);
        let err = run(&a, &v1, &options).unwrap_err();
        assert_eq!(
            err,
            LanczosError::from(LanczosErrorKind::Breakdown { step: 1 })
        );
    }

    #[test]
    fn test_recover_policy_records_zero_beta() {
        let a = Mat::<f64>::identity(3, 3);
        let v1 = Mat::from_fn(3, 1, |i, _| if i == 0 { 1.0 } else { 0.0 });
        let output = run(&a, &v1, &LanczosOptions::default()).unwrap();

        assert_eq!(output.decomposition.alphas, vec![1.0, 1.0, 1.0]);
        assert_eq!(output.decomposition.betas, vec![0.0, 0.0]);
        assert_eq!(output.decomposition.breakdowns, vec![1, 2]);

        let basis = output.basis.unwrap();
        let gram = basis.as_ref().adjoint() * basis.as_ref();
        let identity = Mat::<f64>::identity(3, 3);
        assert!((&gram - &identity).norm_l2() < 1e-14);
    }

    #[test]
    fn test_orthogonal_unit_vector() {
        let inv_sqrt2 = 1.0 / 2f64.sqrt();
        let basis = Mat::from_fn(3, 2, |i, j| match (i, j) {
            (0, 0) | (1, 0) => inv_sqrt2,
            (2, 1) => 1.0,
            _ => 0.0,
        });
        let v = orthogonal_unit_vector(basis.as_ref()).unwrap();
        assert!((v.norm_l2() - 1.0).abs() < 1e-14);
        let overlaps = basis.as_ref().adjoint() * v.as_ref();
        assert!(overlaps.norm_l2() < 1e-14);
        // The complement is spanned by (1, -1, 0) / sqrt(2).
        assert!((v[(0, 0)].abs() - inv_sqrt2).abs() < 1e-14);
        assert!((v[(0, 0)] + v[(1, 0)]).abs() < 1e-14);
    }

    #[test]
    fn test_orthogonal_unit_vector_of_full_basis() {
        let basis = Mat::<f64>::identity(3, 3);
        assert!(orthogonal_unit_vector(basis.as_ref()).is_none());
    }

    #[test]
    fn test_orthogonal_unit_vector_single_precision() {
        // A rotated orthonormal basis of the whole plane. Rounding leaves residuals near
        // f32 epsilon, which must read as an empty complement.
        let (s, c) = 0.3f32.sin_cos();
        let rotated = Mat::from_fn(2, 2, |i, j| match (i, j) {
            (0, 0) | (1, 1) => c,
            (1, 0) => s,
            _ => -s,
        });
        assert!(orthogonal_unit_vector(rotated.as_ref()).is_none());

        let partial = rotated.as_ref().get(.., 0..1);
        let v = orthogonal_unit_vector(partial).unwrap();
        assert!((v.norm_l2() - 1.0).abs() < 1e-6);
        assert!((partial.adjoint() * v.as_ref()).norm_l2() < 1e-6);
    }
}
