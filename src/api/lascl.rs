use super::{check_len, fail_illegal, is_general, run_with_sequence};
use crate::{
    compute,
    desc::{ColMajorMut, TileMatrix},
    runtime::Region,
    scalar::ComplexField,
    Context, Error, Request, Sequence, Uplo,
};
use num_traits::Zero;

/// Multiplies the `uplo` part of the `m × n` matrix `a` by `cto / cfrom`.
///
/// The scaling is applied in steps that never overflow or underflow, so the result is exact
/// whenever `cto / cfrom` itself is representable.
///
/// # Errors
/// - [`Error::IllegalArgument`] if an argument is invalid, with the position of the argument in
///   `(uplo, cfrom, cto, m, n, a, lda)`. `cfrom` must be nonzero, and neither scale may be NaN.
/// - [`Error::OutOfMemory`] if the tile descriptor could not be allocated.
pub fn lascl<E: ComplexField>(
    ctx: &Context,
    uplo: Uplo,
    cfrom: E::Real,
    cto: E::Real,
    m: usize,
    n: usize,
    a: &mut [E],
    lda: usize,
) -> Result<(), Error> {
    if cfrom == E::Real::zero() || cfrom.is_nan() {
        return Err(Error::illegal(2, "cfrom"));
    }
    if cto.is_nan() {
        return Err(Error::illegal(3, "cto"));
    }
    if lda < Ord::max(1, m) {
        return Err(Error::illegal(7, "lda"));
    }
    check_len(a, m, n, lda, 6, "A")?;

    if Ord::min(m, n) == 0 {
        return Ok(());
    }

    let tile_a = TileMatrix::<E>::try_zeros(ctx.params().nb, m, n)?;
    let buf = ColMajorMut::new(a, m, n, lda);
    let (seq, req) = (Sequence::new(), Request::new());
    let (tile_a, buf) = (&tile_a, &buf);
    run_with_sequence(ctx, &seq, &req, |region, seq, req| {
        compute::ge2desc(region, buf.as_ref(), tile_a, seq, req);
        lascl_tile_async(region, uplo, cfrom, cto, tile_a, seq, req);
        compute::desc2ge(region, tile_a, buf, seq, req);
    })
}

/// Tile version of [`lascl`], running in its own region.
pub fn lascl_tile<E: ComplexField>(
    ctx: &Context,
    uplo: Uplo,
    cfrom: E::Real,
    cto: E::Real,
    a: &mut TileMatrix<E>,
) -> Result<(), Error> {
    let (seq, req) = (Sequence::new(), Request::new());
    let a = &*a;
    run_with_sequence(ctx, &seq, &req, |region, seq, req| {
        lascl_tile_async(region, uplo, cfrom, cto, a, seq, req);
    })
}

/// Asynchronous tile version of [`lascl`].
pub fn lascl_tile_async<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    uplo: Uplo,
    cfrom: E::Real,
    cto: E::Real,
    a: &'env TileMatrix<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    if cfrom == E::Real::zero() || cfrom.is_nan() {
        return fail_illegal(seq, req, "cfrom");
    }
    if cto.is_nan() {
        return fail_illegal(seq, req, "cto");
    }
    if !is_general(a) {
        return fail_illegal(seq, req, "A");
    }
    if Ord::min(a.desc().m(), a.desc().n()) == 0 {
        return;
    }
    compute::lascl(region, uplo, cfrom, cto, a, seq, req);
}
