//! Hermitian positive definite band systems.
//!
//! The column-major routines take the band in the LAPACK layout: with `ldab >= kd + 1`, element
//! `(i, j)` of the `uplo` triangle is stored at `ab[kd + i - j + j * ldab]` for [`Uplo::Upper`] and
//! at `ab[i - j + j * ldab]` for [`Uplo::Lower`].

use super::{check_len, fail_illegal, is_general, run_with_sequence};
use crate::{
    compute,
    desc::{ColMajorMut, ColMajorRef, Shape, TileMatrix},
    runtime::Region,
    scalar::ComplexField,
    Context, Diag, Error, Request, Sequence, Trans, Uplo,
};

/// Allocates the band descriptor of an `n × n` Hermitian matrix with `kd` off-diagonals in its
/// `uplo` triangle.
pub fn band_matrix<E: ComplexField>(
    ctx: &Context,
    uplo: Uplo,
    n: usize,
    kd: usize,
) -> Result<TileMatrix<E>, Error> {
    let nb = ctx.params().nb;
    TileMatrix::try_new(nb, nb, n, n, Shape::Band { uplo, kl: kd, ku: kd })
}

fn check_band<E>(
    uplo: Uplo,
    n: usize,
    kd: usize,
    ab: &[E],
    ldab: usize,
    ab_pos: u8,
) -> Result<(), Error> {
    if uplo == Uplo::General {
        return Err(Error::illegal(1, "uplo"));
    }
    if ldab < kd + 1 {
        return Err(Error::illegal(ab_pos + 1, "ldab"));
    }
    check_len(ab, ldab, n, ldab, ab_pos, "AB")
}

/// Cholesky factorization of the Hermitian positive definite band matrix `ab`:
/// `a = L * L^H` for [`Uplo::Lower`], `a = U^H * U` for [`Uplo::Upper`]. The factor overwrites
/// the band.
///
/// # Errors
/// - [`Error::IllegalArgument`] if an argument is invalid, with the position of the argument in
///   `(uplo, n, kd, ab, ldab)`.
/// - [`Error::NotPositiveDefinite`] with the order of the first leading minor that is not positive
///   definite. `ab` is left unchanged in that case.
/// - [`Error::OutOfMemory`] if the band descriptor could not be allocated.
pub fn pbtrf<E: ComplexField>(
    ctx: &Context,
    uplo: Uplo,
    n: usize,
    kd: usize,
    ab: &mut [E],
    ldab: usize,
) -> Result<(), Error> {
    check_band(uplo, n, kd, ab, ldab, 4)?;
    if n == 0 {
        return Ok(());
    }

    let a = band_matrix::<E>(ctx, uplo, n, kd)?;
    let buf = ColMajorMut::new(ab, ldab, n, ldab);
    let (seq, req) = (Sequence::new(), Request::new());
    let (a, buf) = (&a, &buf);
    run_with_sequence(ctx, &seq, &req, |region, seq, req| {
        compute::pb2desc(region, buf.as_ref(), a, seq, req);
        pbtrf_tile_async(region, uplo, a, seq, req);
    })?;
    // the write-back of a finished tile column may not wait for a later failing minor, so it
    // only starts once the whole factorization succeeded
    run_with_sequence(ctx, &seq, &req, |region, seq, req| {
        compute::desc2pb(region, a, buf, seq, req);
    })
}

/// Solves `a * x = b` for the `n × nrhs` matrix `b`, given the band Cholesky factor `ab` computed
/// by [`pbtrf`]. `b` is overwritten with `x`.
///
/// # Errors
/// - [`Error::IllegalArgument`] if an argument is invalid, with the position of the argument in
///   `(uplo, n, kd, nrhs, ab, ldab, b, ldb)`.
/// - [`Error::OutOfMemory`] if the tile descriptors could not be allocated.
pub fn pbtrs<E: ComplexField>(
    ctx: &Context,
    uplo: Uplo,
    n: usize,
    kd: usize,
    nrhs: usize,
    ab: &[E],
    ldab: usize,
    b: &mut [E],
    ldb: usize,
) -> Result<(), Error> {
    check_band(uplo, n, kd, ab, ldab, 5)?;
    if ldb < Ord::max(1, n) {
        return Err(Error::illegal(8, "ldb"));
    }
    check_len(b, n, nrhs, ldb, 7, "B")?;
    if Ord::min(n, nrhs) == 0 {
        return Ok(());
    }

    let a = band_matrix::<E>(ctx, uplo, n, kd)?;
    let x = TileMatrix::<E>::try_zeros(ctx.params().nb, n, nrhs)?;
    let src = ColMajorRef::new(ab, ldab, n, ldab);
    let buf = ColMajorMut::new(b, n, nrhs, ldb);
    let (seq, req) = (Sequence::new(), Request::new());
    let (a, x, buf) = (&a, &x, &buf);
    run_with_sequence(ctx, &seq, &req, |region, seq, req| {
        compute::pb2desc(region, src, a, seq, req);
        compute::ge2desc(region, buf.as_ref(), x, seq, req);
        pbtrs_tile_async(region, uplo, a, x, seq, req);
        compute::desc2ge(region, x, buf, seq, req);
    })
}

/// Solves `a * x = b` for the Hermitian positive definite band matrix `ab` and the `n × nrhs`
/// matrix `b`. On success, `ab` holds the band Cholesky factor of `a`, and `b` holds `x`.
///
/// # Errors
/// - [`Error::IllegalArgument`] if an argument is invalid, with the position of the argument in
///   `(uplo, n, kd, nrhs, ab, ldab, b, ldb)`.
/// - [`Error::NotPositiveDefinite`] with the order of the first leading minor that is not positive
///   definite. Neither `ab` nor `b` is modified in that case.
/// - [`Error::OutOfMemory`] if the tile descriptors could not be allocated.
pub fn pbsv<E: ComplexField>(
    ctx: &Context,
    uplo: Uplo,
    n: usize,
    kd: usize,
    nrhs: usize,
    ab: &mut [E],
    ldab: usize,
    b: &mut [E],
    ldb: usize,
) -> Result<(), Error> {
    check_band(uplo, n, kd, ab, ldab, 5)?;
    if ldb < Ord::max(1, n) {
        return Err(Error::illegal(8, "ldb"));
    }
    check_len(b, n, nrhs, ldb, 7, "B")?;
    if Ord::min(n, nrhs) == 0 {
        return Ok(());
    }

    let a = band_matrix::<E>(ctx, uplo, n, kd)?;
    let x = TileMatrix::<E>::try_zeros(ctx.params().nb, n, nrhs)?;
    let band = ColMajorMut::new(ab, ldab, n, ldab);
    let buf = ColMajorMut::new(b, n, nrhs, ldb);
    let (seq, req) = (Sequence::new(), Request::new());
    let (a, x, band, buf) = (&a, &x, &band, &buf);
    run_with_sequence(ctx, &seq, &req, |region, seq, req| {
        compute::pb2desc(region, band.as_ref(), a, seq, req);
        compute::ge2desc(region, buf.as_ref(), x, seq, req);
        pbsv_tile_async(region, uplo, a, x, seq, req);
    })?;
    run_with_sequence(ctx, &seq, &req, |region, seq, req| {
        compute::desc2pb(region, a, band, seq, req);
        compute::desc2ge(region, x, buf, seq, req);
    })
}

/// Tile version of [`pbtrf`], running in its own region.
pub fn pbtrf_tile<E: ComplexField>(
    ctx: &Context,
    uplo: Uplo,
    a: &mut TileMatrix<E>,
) -> Result<(), Error> {
    let (seq, req) = (Sequence::new(), Request::new());
    let a = &*a;
    run_with_sequence(ctx, &seq, &req, |region, seq, req| {
        pbtrf_tile_async(region, uplo, a, seq, req);
    })
}

/// Tile version of [`pbtrs`], running in its own region.
pub fn pbtrs_tile<E: ComplexField>(
    ctx: &Context,
    uplo: Uplo,
    a: &TileMatrix<E>,
    b: &mut TileMatrix<E>,
) -> Result<(), Error> {
    let (seq, req) = (Sequence::new(), Request::new());
    let b = &*b;
    run_with_sequence(ctx, &seq, &req, |region, seq, req| {
        pbtrs_tile_async(region, uplo, a, b, seq, req);
    })
}

/// Tile version of [`pbsv`], running in its own region.
pub fn pbsv_tile<E: ComplexField>(
    ctx: &Context,
    uplo: Uplo,
    a: &mut TileMatrix<E>,
    b: &mut TileMatrix<E>,
) -> Result<(), Error> {
    let (seq, req) = (Sequence::new(), Request::new());
    let (a, b) = (&*a, &*b);
    run_with_sequence(ctx, &seq, &req, |region, seq, req| {
        pbsv_tile_async(region, uplo, a, b, seq, req);
    })
}

/// Returns whether `a` is a square band descriptor holding the `uplo` triangle.
fn is_band<E: ComplexField>(uplo: Uplo, a: &TileMatrix<E>) -> bool {
    let desc = a.desc();
    matches!(desc.shape(), Shape::Band { uplo: band_uplo, .. } if band_uplo == uplo)
        && desc.m() == desc.n()
}

fn fits_rhs<E: ComplexField>(a: &TileMatrix<E>, b: &TileMatrix<E>) -> bool {
    let (ad, bd) = (a.desc(), b.desc());
    is_general(b) && bd.m() == ad.n() && bd.mb() == ad.nb() && bd.nb() == ad.nb()
}

/// Asynchronous tile version of [`pbtrf`].
pub fn pbtrf_tile_async<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    uplo: Uplo,
    a: &'env TileMatrix<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    if uplo == Uplo::General {
        return fail_illegal(seq, req, "uplo");
    }
    if !is_band(uplo, a) {
        return fail_illegal(seq, req, "A");
    }
    if a.desc().n() == 0 {
        return;
    }
    compute::pbtrf(region, uplo, a, seq, req);
}

/// Asynchronous tile version of [`pbtrs`].
pub fn pbtrs_tile_async<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    uplo: Uplo,
    a: &'env TileMatrix<E>,
    b: &'env TileMatrix<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    if uplo == Uplo::General {
        return fail_illegal(seq, req, "uplo");
    }
    if !is_band(uplo, a) {
        return fail_illegal(seq, req, "A");
    }
    if !fits_rhs(a, b) {
        return fail_illegal(seq, req, "B");
    }
    if Ord::min(b.desc().m(), b.desc().n()) == 0 {
        return;
    }

    let one = E::one();
    let (first, second) = match uplo {
        Uplo::Upper => (Trans::ConjTrans, Trans::NoTrans),
        _ => (Trans::NoTrans, Trans::ConjTrans),
    };
    compute::tbsm(region, uplo, first, Diag::NonUnit, one, a, b, seq, req);
    compute::tbsm(region, uplo, second, Diag::NonUnit, one, a, b, seq, req);
}

/// Asynchronous tile version of [`pbsv`].
pub fn pbsv_tile_async<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    uplo: Uplo,
    a: &'env TileMatrix<E>,
    b: &'env TileMatrix<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    if uplo == Uplo::General {
        return fail_illegal(seq, req, "uplo");
    }
    if !is_band(uplo, a) {
        return fail_illegal(seq, req, "A");
    }
    if !fits_rhs(a, b) {
        return fail_illegal(seq, req, "B");
    }
    if Ord::min(b.desc().m(), b.desc().n()) == 0 {
        return;
    }
    pbtrf_tile_async(region, uplo, a, seq, req);
    pbtrs_tile_async(region, uplo, a, b, seq, req);
}
