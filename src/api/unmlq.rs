use super::{
    check_len, fail_illegal, gelqf::scalars_fit, is_general, run_with_sequence, trans_is_valid,
};
use crate::{
    compute,
    desc::{ColMajorMut, ColMajorRef, TileMatrix},
    runtime::Region,
    scalar::ComplexField,
    Context, Error, Request, Sequence, Side, Trans,
};

/// Overwrites the `m × n` matrix `b` with `op(Q) * b` for [`Side::Left`], or `b * op(Q)` for
/// [`Side::Right`], where `Q` is the unitary factor of the LQ factorization computed by
/// [`gelqf`](super::gelqf), defined by `k` reflectors.
///
/// `a` holds the reflectors in its first `k` rows, and has `m` columns for [`Side::Left`], `n`
/// otherwise. `t` is the descriptor returned by [`gelqf`](super::gelqf).
///
/// # Errors
/// - [`Error::IllegalArgument`] if an argument is invalid, with the position of the argument in
///   `(side, trans, m, n, k, a, lda, t, b, ldb)`.
/// - [`Error::OutOfMemory`] if the tile descriptors could not be allocated.
pub fn unmlq<E: ComplexField>(
    ctx: &Context,
    side: Side,
    trans: Trans,
    m: usize,
    n: usize,
    k: usize,
    a: &[E],
    lda: usize,
    t: &TileMatrix<E>,
    b: &mut [E],
    ldb: usize,
) -> Result<(), Error> {
    if !trans_is_valid::<E>(trans) {
        return Err(Error::illegal(2, "trans"));
    }
    let an = match side {
        Side::Left => m,
        Side::Right => n,
    };
    if k > an {
        return Err(Error::illegal(5, "k"));
    }
    if lda < Ord::max(1, k) {
        return Err(Error::illegal(7, "lda"));
    }
    if ldb < Ord::max(1, m) {
        return Err(Error::illegal(10, "ldb"));
    }
    check_len(a, k, an, lda, 6, "A")?;
    check_len(b, m, n, ldb, 9, "B")?;

    let params = ctx.params();
    let tile_a = TileMatrix::<E>::try_zeros(params.nb, k, an)?;
    if t.desc().mb() != params.ib || !scalars_fit(&tile_a, t) {
        return Err(Error::illegal(8, "T"));
    }

    if Ord::min(Ord::min(m, n), k) == 0 {
        return Ok(());
    }

    let tile_b = TileMatrix::<E>::try_zeros(params.nb, m, n)?;
    let src = ColMajorRef::new(a, k, an, lda);
    let buf = ColMajorMut::new(b, m, n, ldb);
    let (seq, req) = (Sequence::new(), Request::new());
    let (tile_a, tile_b, buf) = (&tile_a, &tile_b, &buf);
    run_with_sequence(ctx, &seq, &req, |region, seq, req| {
        compute::ge2desc(region, src, tile_a, seq, req);
        compute::ge2desc(region, buf.as_ref(), tile_b, seq, req);
        unmlq_tile_async(region, side, trans, tile_a, t, tile_b, seq, req);
        compute::desc2ge(region, tile_b, buf, seq, req);
    })
}

/// Tile version of [`unmlq`], running in its own region.
pub fn unmlq_tile<E: ComplexField>(
    ctx: &Context,
    side: Side,
    trans: Trans,
    a: &TileMatrix<E>,
    t: &TileMatrix<E>,
    b: &mut TileMatrix<E>,
) -> Result<(), Error> {
    let (seq, req) = (Sequence::new(), Request::new());
    let b = &*b;
    run_with_sequence(ctx, &seq, &req, |region, seq, req| {
        unmlq_tile_async(region, side, trans, a, t, b, seq, req);
    })
}

/// Asynchronous tile version of [`unmlq`].
pub fn unmlq_tile_async<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    side: Side,
    trans: Trans,
    a: &'env TileMatrix<E>,
    t: &'env TileMatrix<E>,
    b: &'env TileMatrix<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    if !trans_is_valid::<E>(trans) {
        return fail_illegal(seq, req, "trans");
    }
    let (ad, bd) = (a.desc(), b.desc());
    let an = match side {
        Side::Left => bd.m(),
        Side::Right => bd.n(),
    };
    if !is_general(a) || ad.mb() != ad.nb() || ad.n() != an || ad.m() > an {
        return fail_illegal(seq, req, "A");
    }
    if !scalars_fit(a, t) {
        return fail_illegal(seq, req, "T");
    }
    if !is_general(b) || bd.mb() != ad.mb() || bd.nb() != ad.nb() {
        return fail_illegal(seq, req, "B");
    }
    if Ord::min(Ord::min(bd.m(), bd.n()), ad.m()) == 0 {
        return;
    }
    compute::unmlq(region, side, trans, a, t, b, seq, req);
}
