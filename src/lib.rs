//! Symmetric Lanczos tridiagonalization of Hermitian matrices.
//!
//! Given a Hermitian matrix A (n×n) and a unit starting vector v₁, the Lanczos process
//! builds an orthonormal basis of the Krylov subspace span{v₁, Av₁, A²v₁, …} through a
//! three-term recurrence, and along the way a real symmetric tridiagonal matrix T whose
//! eigenvalues (the Ritz values) approximate those of A. The extremal eigenvalues
//! converge first.
//!
//! This crate implements the textbook, unrestarted, single-vector variant: it keeps only
//! the two most recent basis vectors and does not reorthogonalize. Built on the [`faer`]
//! linear algebra framework, the low-level driver operates on matrix-free linear
//! operators ([`faer::matrix_free::LinOp`]), while the high-level API takes dense
//! matrices and validates them.
//!
//! ## Modules
//!
//! - [`solvers`]: the entry points [`lanczos`] and [`lanczos_with_options`], plus Ritz
//!   value/vector extraction.
//! - [`algorithms`]: the recurrence itself ([`algorithms::LanczosIteration`]) and the
//!   driver [`algorithms::lanczos::lanczos_tridiagonalize`] with breakdown handling and
//!   per-step callbacks.
//! - [`tridiagonal`]: dense assembly of tridiagonal matrices.
//! - [`matrix`]: input validation and small constructors.
//! - [`error`]: the [`LanczosError`] type.
//!
//! ## Breakdown
//!
//! If a residual norm beta_j vanishes before the last step, the Krylov subspace is
//! invariant and `w_j / beta_j` is undefined. [`algorithms::BreakdownPolicy`] selects
//! between textbook recovery (the default), unguarded division and failing with an error.
//!
//! ## Example Usage
//!
//! ```rust
//! use faer::Mat;
//! use lanczos_tridiagonal::{lanczos, matrix::uniform_unit_vector, ritz_values};
//!
//! let diag = [0.0, 1.0, 2.0, 3.0, 4.0, 100000.0];
//! let a = Mat::from_fn(6, 6, |i, j| if i == j { diag[i] } else { 0.0 });
//! let v1 = uniform_unit_vector::<f64>(6);
//!
//! let t = lanczos(a.as_ref(), v1.as_ref()).unwrap();
//! assert_eq!(t.nrows(), 6);
//! assert_eq!(t[(0, 1)], t[(1, 0)]);
//!
//! let ritz = ritz_values(t.as_ref()).unwrap();
//! let largest = ritz.iter().cloned().fold(f64::MIN, f64::max);
//! assert!((largest - 100000.0).abs() / 100000.0 < 1e-3);
//! ```

pub mod algorithms;
pub mod error;
pub mod matrix;
pub mod solvers;
pub mod tridiagonal;

pub use algorithms::{BreakdownPolicy, LanczosOptions};
pub use error::LanczosError;
pub use solvers::{lanczos, lanczos_with_options, ritz_pairs, ritz_values};
pub use tridiagonal::{DiagonalConvention, assemble_tridiagonal};
