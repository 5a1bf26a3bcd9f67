use super::{check_len, fail_illegal, is_general, run_with_sequence, trans_is_valid};
use crate::{
    compute,
    desc::{ColMajorMut, ColMajorRef, TileMatrix},
    runtime::Region,
    scalar::ComplexField,
    Context, Error, Request, Sequence, Trans, Uplo,
};
use num_traits::One;

/// Hermitian rank-2k update
/// `c := alpha * op(a) * op(b)^H + conj(alpha) * op(b) * op(a)^H + beta * c`, where `c` is
/// `n × n` and `op(a)`, `op(b)` are `n × k`. Only the `uplo` triangle of `c` is referenced.
///
/// `a` and `b` are `n × k` for [`Trans::NoTrans`] and `k × n` otherwise.
///
/// # Errors
/// - [`Error::IllegalArgument`] if an argument is invalid, with the position of the argument in
///   `(uplo, trans, n, k, alpha, a, lda, b, ldb, beta, c, ldc)`.
/// - [`Error::OutOfMemory`] if the tile descriptors could not be allocated.
pub fn her2k<E: ComplexField>(
    ctx: &Context,
    uplo: Uplo,
    trans: Trans,
    n: usize,
    k: usize,
    alpha: E,
    a: &[E],
    lda: usize,
    b: &[E],
    ldb: usize,
    beta: E::Real,
    c: &mut [E],
    ldc: usize,
) -> Result<(), Error> {
    if uplo == Uplo::General {
        return Err(Error::illegal(1, "uplo"));
    }
    if !trans_is_valid::<E>(trans) {
        return Err(Error::illegal(2, "trans"));
    }
    let (am, an) = if trans == Trans::NoTrans { (n, k) } else { (k, n) };
    if lda < Ord::max(1, am) {
        return Err(Error::illegal(7, "lda"));
    }
    if ldb < Ord::max(1, am) {
        return Err(Error::illegal(9, "ldb"));
    }
    if ldc < Ord::max(1, n) {
        return Err(Error::illegal(12, "ldc"));
    }
    check_len(a, am, an, lda, 6, "A")?;
    check_len(b, am, an, ldb, 8, "B")?;
    check_len(c, n, n, ldc, 11, "C")?;

    if n == 0 || ((alpha == E::zero() || k == 0) && beta == E::Real::one()) {
        return Ok(());
    }

    let nb = ctx.params().nb;
    let tile_a = TileMatrix::<E>::try_zeros(nb, am, an)?;
    let tile_b = TileMatrix::<E>::try_zeros(nb, am, an)?;
    let tile_c = TileMatrix::<E>::try_zeros(nb, n, n)?;

    let src_a = ColMajorRef::new(a, am, an, lda);
    let src_b = ColMajorRef::new(b, am, an, ldb);
    let dst = ColMajorMut::new(c, n, n, ldc);
    let (seq, req) = (Sequence::new(), Request::new());
    let (tile_a, tile_b, tile_c, dst) = (&tile_a, &tile_b, &tile_c, &dst);
    run_with_sequence(ctx, &seq, &req, |region, seq, req| {
        compute::ge2desc(region, src_a, tile_a, seq, req);
        compute::ge2desc(region, src_b, tile_b, seq, req);
        compute::ge2desc(region, dst.as_ref(), tile_c, seq, req);
        her2k_tile_async(region, uplo, trans, alpha, tile_a, tile_b, beta, tile_c, seq, req);
        compute::desc2ge(region, tile_c, dst, seq, req);
    })
}

/// Tile version of [`her2k`], running in its own region.
pub fn her2k_tile<E: ComplexField>(
    ctx: &Context,
    uplo: Uplo,
    trans: Trans,
    alpha: E,
    a: &TileMatrix<E>,
    b: &TileMatrix<E>,
    beta: E::Real,
    c: &mut TileMatrix<E>,
) -> Result<(), Error> {
    let (seq, req) = (Sequence::new(), Request::new());
    let c = &*c;
    run_with_sequence(ctx, &seq, &req, |region, seq, req| {
        her2k_tile_async(region, uplo, trans, alpha, a, b, beta, c, seq, req);
    })
}

/// Asynchronous tile version of [`her2k`].
///
/// Invalid arguments fail `seq` with [`Error::IllegalValue`].
pub fn her2k_tile_async<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    uplo: Uplo,
    trans: Trans,
    alpha: E,
    a: &'env TileMatrix<E>,
    b: &'env TileMatrix<E>,
    beta: E::Real,
    c: &'env TileMatrix<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    if uplo == Uplo::General {
        return fail_illegal(seq, req, "uplo");
    }
    if !trans_is_valid::<E>(trans) {
        return fail_illegal(seq, req, "trans");
    }
    let (ad, bd, cd) = (a.desc(), b.desc(), c.desc());
    if !is_general(a) || ad.mb() != ad.nb() {
        return fail_illegal(seq, req, "A");
    }
    if !is_general(b) || (bd.mb(), bd.nb(), bd.m(), bd.n()) != (ad.mb(), ad.nb(), ad.m(), ad.n()) {
        return fail_illegal(seq, req, "B");
    }
    let (n, k) = if trans == Trans::NoTrans {
        (ad.m(), ad.n())
    } else {
        (ad.n(), ad.m())
    };
    if !is_general(c) || (cd.mb(), cd.nb(), cd.m(), cd.n()) != (ad.mb(), ad.nb(), n, n) {
        return fail_illegal(seq, req, "C");
    }

    if n == 0 || ((alpha == E::zero() || k == 0) && beta == E::Real::one()) {
        return;
    }
    compute::her2k(region, uplo, trans, alpha, a, b, beta, c, seq, req);
}
