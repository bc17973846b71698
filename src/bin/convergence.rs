//! Experiment Runner for Ritz Value Convergence.
//!
//! This executable tracks how the extremal Ritz values of the Lanczos tridiagonal matrix
//! T_j approach the extremal eigenvalues of a diagonal test matrix as the step count j
//! grows from 1 to n. The default problem is A = diag(0, 1, ..., n - 2, top) with a
//! uniform starting vector, which separates one dominant eigenvalue from a cluster of
//! small ones. Results are written to a CSV file, one row per step.

use anyhow::{Context, Result, anyhow, ensure};
use clap::{Parser, ValueEnum};
use faer::{
    dyn_stack::{MemBuffer, MemStack},
    matrix_free::LinOp,
    prelude::*,
};
use lanczos_tridiagonal::{
    BreakdownPolicy, DiagonalConvention, LanczosOptions,
    algorithms::lanczos::lanczos_tridiagonalize,
    matrix::{diagonal_matrix, uniform_unit_vector},
    ritz_values,
    tridiagonal::TridiagonalSystemView,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;
use std::path::PathBuf;

/// How the run reacts to a vanishing residual.
#[derive(ValueEnum, Clone, Debug, Copy)]
enum Policy {
    /// Continue from a vector orthogonal to the current basis.
    Recover,
    /// Divide by the vanishing residual norm, propagating NaN.
    Unguarded,
    /// Abort the run.
    Fail,
}

impl From<Policy> for BreakdownPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Recover => BreakdownPolicy::Recover,
            Policy::Unguarded => BreakdownPolicy::Unguarded,
            Policy::Fail => BreakdownPolicy::Fail,
        }
    }
}

/// Layout of the main diagonal of T.
#[derive(ValueEnum, Clone, Debug, Copy)]
enum Convention {
    /// Keep the sign of each alpha coefficient.
    Signed,
    /// Place |alpha| on the diagonal.
    Magnitude,
}

impl From<Convention> for DiagonalConvention {
    fn from(convention: Convention) -> Self {
        match convention {
            Convention::Signed => DiagonalConvention::Signed,
            Convention::Magnitude => DiagonalConvention::Magnitude,
        }
    }
}

/// Choice of the starting vector v1.
#[derive(ValueEnum, Clone, Debug, Copy)]
enum StartVector {
    /// Every entry equal to 1 / sqrt(n).
    Uniform,
    /// Normalized vector with entries drawn uniformly from [-1, 1).
    Random,
}

/// Command-line arguments for the convergence runner.
#[derive(Parser, Debug)]
#[clap(
    name = "convergence-runner",
    about = "Records the extremal Ritz values of the Lanczos tridiagonal matrix at every step."
)]
struct ConvergenceArgs {
    /// Dimension of the diagonal test matrix.
    #[clap(long, default_value_t = 6)]
    n: usize,
    /// The largest diagonal entry; the others are 0, 1, ..., n - 2.
    #[clap(long, default_value_t = 100000.0)]
    top: f64,
    /// Breakdown handling.
    #[clap(long, value_enum, default_value = "recover")]
    policy: Policy,
    /// Diagonal convention for T.
    #[clap(long, value_enum, default_value = "signed")]
    convention: Convention,
    /// Starting vector.
    #[clap(long, value_enum, default_value = "uniform")]
    start: StartVector,
    /// Seed for the random starting vector.
    #[clap(long, default_value_t = 42)]
    seed: u64,
    /// Path to the output CSV file where results will be written.
    #[clap(long, value_name = "PATH")]
    output: PathBuf,
}

/// One row of the output CSV file.
#[derive(Debug, Serialize)]
struct ConvergenceRow {
    /// Number of Lanczos steps taken.
    step: usize,
    /// Smallest eigenvalue of T_step.
    ritz_min: f64,
    /// Largest eigenvalue of T_step.
    ritz_max: f64,
    /// Absolute error of `ritz_min` against the smallest eigenvalue of A.
    error_min: f64,
    /// Relative error of `ritz_max` against the largest eigenvalue of A.
    error_max: f64,
    /// Off-diagonal coefficient linking this step to the previous one, if any.
    beta: Option<f64>,
    /// Whether the residual of this step vanished.
    breakdown: bool,
}

fn start_vector(kind: StartVector, n: usize, seed: u64) -> Mat<f64> {
    match kind {
        StartVector::Uniform => uniform_unit_vector(n),
        StartVector::Random => {
            let mut rng = StdRng::seed_from_u64(seed);
            let v = Mat::from_fn(n, 1, |_, _| rng.random_range(-1.0..1.0));
            let norm = v.norm_l2();
            &v * Scale(1.0 / norm)
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .try_init()?;
    let args = ConvergenceArgs::parse();
    ensure!(args.n >= 2, "The test matrix needs at least two rows, got {}", args.n);

    let mut eigs: Vec<f64> = (0..args.n - 1).map(|i| i as f64).collect();
    eigs.push(args.top);
    let exact_min = eigs.iter().cloned().fold(f64::INFINITY, f64::min);
    let exact_max = eigs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    log::info!(
        "Starting convergence run: n = {}, spectrum [{exact_min}, {exact_max}], policy {:?}, convention {:?}.",
        args.n,
        args.policy,
        args.convention
    );

    let a = diagonal_matrix(&eigs);
    let v1 = start_vector(args.start, args.n, args.seed);
    let convention = DiagonalConvention::from(args.convention);
    let options = LanczosOptions::default()
        .with_breakdown(args.policy.into())
        .with_convention(convention);

    // Snapshot T_j after every step; the eigensolves happen after the run so that
    // their errors can be propagated.
    let mut snapshots = Vec::with_capacity(args.n);
    let mut record = |step: usize, view: &TridiagonalSystemView<'_, f64>| {
        snapshots.push((step, view.to_dense(convention), view.betas.last().copied()));
        true
    };

    let op = a.as_ref();
    let mut stack_mem = MemBuffer::new(op.apply_scratch(1, Par::Seq));
    let stack = MemStack::new(&mut stack_mem);
    let output = lanczos_tridiagonalize(&op, v1.as_ref(), &options, stack, Some(&mut record))
        .context("Lanczos run failed")?;
    let breakdowns = output.decomposition.breakdowns;

    let mut writer = csv::Writer::from_path(&args.output)?;
    for (step, t_j, beta) in snapshots {
        let ritz = ritz_values(t_j.as_ref())
            .map_err(|e| anyhow!("Eigensolve of T_{step} failed: {e}"))?;
        let ritz_min = ritz.iter().cloned().fold(f64::INFINITY, f64::min);
        let ritz_max = ritz.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        writer.serialize(ConvergenceRow {
            step,
            ritz_min,
            ritz_max,
            error_min: (ritz_min - exact_min).abs(),
            error_max: (ritz_max - exact_max).abs() / exact_max.abs().max(f64::MIN_POSITIVE),
            beta,
            breakdown: breakdowns.contains(&step),
        })?;
    }

    writer.flush()?;
    log::info!(
        "Convergence run complete. Results saved to {:?}.",
        &args.output
    );
    Ok(())
}
