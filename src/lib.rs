//! `tessera` is a tile-scheduled dense linear algebra library.
//!
//! Matrices are split into square tiles held by [`TileMatrix`](desc::TileMatrix) descriptors.
//! Each routine is a driver that walks the tile grid and submits one task per tile kernel call to
//! a parallel region, together with the tiles the task reads and writes. The region runs a task
//! once every earlier task that touches the same tiles has completed, so independent tile
//! operations run concurrently while the result stays identical to the sequential order.
//!
//! The routines are available as column-major entry points that take LAPACK-style arrays, and as
//! tile routines that work on descriptors, see [`api`].
//!
//! # Example
//! ```
//! use tessera::{api, c64, Context, Parallelism, TileParams, Uplo};
//!
//! let ctx = Context::new(TileParams { nb: 2, ib: 2 }, Parallelism::None).unwrap();
//!
//! // tridiagonal Hermitian matrix, lower band storage
//! let (n, kd) = (4, 1);
//! let mut ab = vec![c64::new(0.0, 0.0); 2 * n];
//! for j in 0..n {
//!     ab[2 * j] = c64::new(4.0, 0.0);
//!     ab[2 * j + 1] = c64::new(1.0, 0.0);
//! }
//! let mut b: Vec<c64> = [5.0, 6.0, 6.0, 5.0].map(|x| c64::new(x, 0.0)).to_vec();
//! api::pbsv(&ctx, Uplo::Lower, n, kd, 1, &mut ab, 2, &mut b, n).unwrap();
//! for x in &b {
//!     assert!((x - c64::new(1.0, 0.0)).norm() < 1e-12);
//! }
//! ```

#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use equator::{assert, debug_assert};

pub use dyn_stack;
pub use reborrow;

pub mod api;
pub mod compute;
pub mod context;
pub mod desc;
pub mod error;
pub mod kernels;
pub mod mat;
pub mod runtime;
pub mod scalar;
pub mod sequence;
pub mod tile_ops;
pub mod utils;

pub use context::{Context, TileParams};
pub use error::Error;
pub use scalar::{c32, c64, ComplexField, RealField};
pub use sequence::{Request, Sequence};

/// Which part of a matrix is referenced.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Uplo {
    /// The whole matrix.
    General,
    /// The upper triangle, including the diagonal.
    Upper,
    /// The lower triangle, including the diagonal.
    Lower,
}

/// Side from which an operator is applied.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// `op(a) * b`.
    Left,
    /// `b * op(a)`.
    Right,
}

/// Operation applied to a matrix operand.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Trans {
    /// `a`.
    NoTrans,
    /// `a^T`.
    Trans,
    /// `a^H`.
    ConjTrans,
}

/// Whether a triangular matrix has an implicit unit diagonal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Diag {
    /// The diagonal is read from the matrix.
    NonUnit,
    /// The diagonal is assumed to be all ones and is not read.
    Unit,
}

/// Parallelism strategy of a [`Context`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Parallelism {
    /// No parallelism.
    ///
    /// Every task runs on the calling thread as soon as it is submitted.
    None,
    /// Rayon parallelism. Only available with the `rayon` feature.
    ///
    /// Tasks run on a rayon thread pool as soon as their dependencies are satisfied. A value of
    /// `0` runs on the currently active pool, and any other value on a pool of that many threads
    /// owned by the context.
    #[cfg(feature = "rayon")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rayon")))]
    Rayon(usize),
}
