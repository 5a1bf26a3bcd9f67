//! User-facing routines.
//!
//! Every routine comes in three flavors:
//! - a column-major entry point, such as [`her2k`], which validates its arguments, copies the
//!   caller's arrays into tile descriptors, runs the routine in its own parallel region and copies
//!   the results back. Invalid arguments are reported as [`Error::IllegalArgument`], with the
//!   1-based position of the offending argument, before any work is scheduled;
//! - a synchronous tile routine, such as [`her2k_tile`], working on tile descriptors;
//! - an asynchronous tile routine, such as [`her2k_tile_async`], which submits its work to a
//!   region opened by the caller and records failures in the caller's [`Sequence`]. Invalid
//!   arguments fail the sequence with [`Error::IllegalValue`].
//!
//! # Example
//! ```
//! use tessera::{api, Context, Parallelism, TileParams, Uplo};
//!
//! let ctx = Context::new(TileParams { nb: 2, ib: 2 }, Parallelism::None).unwrap();
//! let mut a = vec![1.0f64, 2.0, 3.0, 4.0];
//! api::lascl(&ctx, Uplo::General, 2.0, 1.0, 2, 2, &mut a, 2).unwrap();
//! assert_eq!(a, [0.5, 1.0, 1.5, 2.0]);
//! ```

mod gelqf;
mod her2k;
mod lascl;
mod pb;
mod unmlq;

pub use gelqf::{gelqf, gelqf_scalars, gelqf_tile, gelqf_tile_async};
pub use her2k::{her2k, her2k_tile, her2k_tile_async};
pub use lascl::{lascl, lascl_tile, lascl_tile_async};
pub use pb::{
    band_matrix, pbsv, pbsv_tile, pbsv_tile_async, pbtrf, pbtrf_tile, pbtrf_tile_async, pbtrs,
    pbtrs_tile, pbtrs_tile_async,
};
pub use unmlq::{unmlq, unmlq_tile, unmlq_tile_async};

use crate::{
    desc::{Shape, TileMatrix},
    runtime::{self, Region},
    scalar::ComplexField,
    Context, Error, Request, Sequence, Trans,
};

/// Checks that `data` can hold an `nrows × ncols` column-major matrix with leading dimension `ld`.
#[inline]
fn check_len<E>(
    data: &[E],
    nrows: usize,
    ncols: usize,
    ld: usize,
    position: u8,
    name: &'static str,
) -> Result<(), Error> {
    let required = if nrows == 0 || ncols == 0 {
        Some(0)
    } else {
        (ncols - 1).checked_mul(ld).and_then(|len| len.checked_add(nrows))
    };
    match required {
        Some(required) if data.len() >= required => Ok(()),
        _ => Err(Error::illegal(position, name)),
    }
}

/// `Trans::Trans` is only meaningful for real element types, where it is the same operation as
/// `Trans::ConjTrans`.
#[inline]
fn trans_is_valid<E: ComplexField>(trans: Trans) -> bool {
    trans != Trans::Trans || !E::PRECISION.is_complex()
}

/// Records an illegal argument of an asynchronous tile routine in the sequence.
#[cold]
fn fail_illegal(seq: &Sequence, req: &Request, name: &str) {
    log::error!(target: "tessera", "illegal value of {name}");
    seq.fail(req, Error::IllegalValue);
}

/// Checks that `a` is a non-band descriptor.
#[inline]
fn is_general<E: ComplexField>(a: &TileMatrix<E>) -> bool {
    !matches!(a.desc().shape(), Shape::Band { .. })
}

/// Runs `f` in a fresh region with its own sequence, and returns the status of the sequence.
fn run_with_sequence<'env>(
    ctx: &Context,
    seq: &'env Sequence,
    req: &'env Request,
    f: impl Send + FnOnce(&Region<'_, 'env>, &'env Sequence, &'env Request),
) -> Result<(), Error> {
    runtime::run(ctx, |region| f(region, seq, req));
    seq.status()
}
