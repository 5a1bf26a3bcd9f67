use super::{check_len, fail_illegal, is_general, run_with_sequence};
use crate::{
    compute,
    desc::{ColMajorMut, Shape, TileMatrix},
    runtime::Region,
    scalar::ComplexField,
    utils::DivCeil,
    Context, Error, Request, Sequence,
};

/// Allocates the descriptor that receives the reflector scalars of the LQ factorization of an
/// `m × n` matrix: one `ib × nb` tile per tile of the matrix.
pub fn gelqf_scalars<E: ComplexField>(
    ctx: &Context,
    m: usize,
    n: usize,
) -> Result<TileMatrix<E>, Error> {
    let params = ctx.params();
    let (mt, nt) = (m.msrv_div_ceil(params.nb), n.msrv_div_ceil(params.nb));
    TileMatrix::try_new(params.ib, params.nb, mt * params.ib, nt * params.nb, Shape::General)
}

/// LQ factorization `a = L * Q` of the `m × n` matrix `a`.
///
/// On return, the lower trapezoid of `a` holds `L`, and the elements above it hold the
/// reflectors that define `Q`. The returned descriptor holds the reflector scalars, it is passed
/// along with `a` to [`unmlq`](super::unmlq) to apply `Q`.
///
/// # Errors
/// - [`Error::IllegalArgument`] if an argument is invalid, with the position of the argument in
///   `(m, n, a, lda)`.
/// - [`Error::OutOfMemory`] if the tile descriptors could not be allocated.
pub fn gelqf<E: ComplexField>(
    ctx: &Context,
    m: usize,
    n: usize,
    a: &mut [E],
    lda: usize,
) -> Result<TileMatrix<E>, Error> {
    if lda < Ord::max(1, m) {
        return Err(Error::illegal(4, "lda"));
    }
    check_len(a, m, n, lda, 3, "A")?;

    let t = gelqf_scalars::<E>(ctx, m, n)?;
    if Ord::min(m, n) == 0 {
        return Ok(t);
    }

    let tile_a = TileMatrix::<E>::try_zeros(ctx.params().nb, m, n)?;
    let buf = ColMajorMut::new(a, m, n, lda);
    let (seq, req) = (Sequence::new(), Request::new());
    {
        let (tile_a, tile_t, buf) = (&tile_a, &t, &buf);
        run_with_sequence(ctx, &seq, &req, |region, seq, req| {
            compute::ge2desc(region, buf.as_ref(), tile_a, seq, req);
            gelqf_tile_async(region, tile_a, tile_t, seq, req);
            compute::desc2ge(region, tile_a, buf, seq, req);
        })?;
    }
    Ok(t)
}

/// Tile version of [`gelqf`], running in its own region. `t` is typically allocated by
/// [`gelqf_scalars`].
pub fn gelqf_tile<E: ComplexField>(
    ctx: &Context,
    a: &mut TileMatrix<E>,
    t: &mut TileMatrix<E>,
) -> Result<(), Error> {
    let (seq, req) = (Sequence::new(), Request::new());
    let (a, t) = (&*a, &*t);
    run_with_sequence(ctx, &seq, &req, |region, seq, req| {
        gelqf_tile_async(region, a, t, seq, req);
    })
}

/// Checks that `t` can hold the reflector scalars of the factorization of `a`.
pub(crate) fn scalars_fit<E: ComplexField>(a: &TileMatrix<E>, t: &TileMatrix<E>) -> bool {
    let (ad, td) = (a.desc(), t.desc());
    is_general(t)
        && td.nb() == ad.nb()
        && td.mb() <= td.nb()
        && td.m() >= ad.mt() * td.mb()
        && td.n() >= ad.nt() * td.nb()
}

/// Asynchronous tile version of [`gelqf`].
pub fn gelqf_tile_async<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    a: &'env TileMatrix<E>,
    t: &'env TileMatrix<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    if !is_general(a) || a.desc().mb() != a.desc().nb() {
        return fail_illegal(seq, req, "A");
    }
    if !scalars_fit(a, t) {
        return fail_illegal(seq, req, "T");
    }
    if Ord::min(a.desc().m(), a.desc().n()) == 0 {
        return;
    }
    compute::gelqf(region, a, t, seq, req);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::{tests::ctx, unmlq},
        assert, c64,
        error::status_code,
        kernels::tests::{max_diff, random, rng},
        Side, Trans,
    };

    #[test]
    fn applying_q_to_the_input_yields_l() {
        for (m, n, nb, ib) in [(5, 7, 2, 1), (7, 5, 3, 2), (6, 6, 6, 4)] {
            let ctx = ctx(nb, ib);
            let a0 = random::<c64>(&mut rng(), m * n);
            let mut a = a0.clone();
            let t = gelqf(&ctx, m, n, &mut a, m).unwrap();

            // a0 * Q^H = L
            let k = Ord::min(m, n);
            let mut b = a0.clone();
            unmlq(&ctx, Side::Right, Trans::ConjTrans, m, n, k, &a, m, &t, &mut b, m).unwrap();

            let mut l = vec![c64::new(0.0, 0.0); m * n];
            for j in 0..n {
                for i in j..m {
                    l[i + j * m] = a[i + j * m];
                }
            }
            assert!(max_diff(&b, &l) < 1e-12);
        }
    }

    #[test]
    fn empty_matrices_return_immediately() {
        let ctx = ctx(2, 2);
        let mut a = [c64::new(1.0, 0.0); 3];
        let t = gelqf(&ctx, 3, 0, &mut a, 3).unwrap();
        assert!(t.desc().m() == 4);
        assert!(a == [c64::new(1.0, 0.0); 3]);
    }

    #[test]
    fn argument_positions() {
        let ctx = ctx(2, 2);
        let mut a = [0.0f64; 6];
        assert!(status_code(gelqf(&ctx, 3, 2, &mut a, 2).map(drop)) == -4);
        assert!(status_code(gelqf(&ctx, 3, 3, &mut a, 3).map(drop)) == -3);
        assert!(status_code(gelqf(&ctx, 3, 2, &mut a, 3).map(drop)) == 0);
    }

    #[test]
    fn tile_api_checks_the_scalars() {
        let ctx = ctx(2, 2);
        let mut a = TileMatrix::<f64>::try_zeros(2, 4, 4).unwrap();
        let mut small = TileMatrix::<f64>::try_new(2, 2, 2, 4, Shape::General).unwrap();
        assert!(gelqf_tile(&ctx, &mut a, &mut small) == Err(Error::IllegalValue));
        let mut t = gelqf_scalars::<f64>(&ctx, 4, 4).unwrap();
        assert!(gelqf_tile(&ctx, &mut a, &mut t) == Ok(()));
    }
}
