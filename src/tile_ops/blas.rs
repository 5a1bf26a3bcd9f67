use crate::{
    desc::Tile,
    kernels::{gemm, herk, potrf, trsm},
    runtime::{Region, Task},
    scalar::ComplexField,
    Diag, Error, Request, Sequence, Side, Trans, Uplo,
};

/// Submits `c := alpha * op(a) * op(b) + beta * c`.
pub fn gemm<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    transa: Trans,
    transb: Trans,
    alpha: E,
    a: Tile<E>,
    b: Tile<E>,
    beta: E,
    c: Tile<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    let k = if transa == Trans::NoTrans {
        a.ncols()
    } else {
        a.nrows()
    };
    let task = Task::new("gemm")
        .read(a.key())
        .read(b.key())
        .read_write(c.key())
        .flops(gemm::gemm_flops::<E>(c.nrows(), c.ncols(), k));

    region.submit(seq, req, task, move |_| {
        unsafe {
            gemm::gemm(
                transa,
                transb,
                alpha,
                a.as_ref(),
                b.as_ref(),
                beta,
                c.as_mut(),
            )
        };
        Ok(())
    });
}

/// Submits the `uplo` triangle of `c := alpha * op(a) * op(a)^H + beta * c`.
pub fn herk<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    uplo: Uplo,
    trans: Trans,
    alpha: E::Real,
    a: Tile<E>,
    beta: E::Real,
    c: Tile<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    let k = if trans == Trans::NoTrans {
        a.ncols()
    } else {
        a.nrows()
    };
    let task = Task::new("herk")
        .read(a.key())
        .read_write(c.key())
        .flops(herk::herk_flops::<E>(c.nrows(), k));

    region.submit(seq, req, task, move |_| {
        unsafe { herk::herk(uplo, trans, alpha, a.as_ref(), beta, c.as_mut()) };
        Ok(())
    });
}

/// Submits the `uplo` triangle of
/// `c := alpha * op(a) * op(b)^H + conj(alpha) * op(b) * op(a)^H + beta * c`.
pub fn her2k<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    uplo: Uplo,
    trans: Trans,
    alpha: E,
    a: Tile<E>,
    b: Tile<E>,
    beta: E::Real,
    c: Tile<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    let k = if trans == Trans::NoTrans {
        a.ncols()
    } else {
        a.nrows()
    };
    let task = Task::new("her2k")
        .read(a.key())
        .read(b.key())
        .read_write(c.key())
        .flops(herk::her2k_flops::<E>(c.nrows(), k));

    region.submit(seq, req, task, move |_| {
        unsafe { herk::her2k(uplo, trans, alpha, a.as_ref(), b.as_ref(), beta, c.as_mut()) };
        Ok(())
    });
}

/// Submits the triangular solve `op(a) * x = alpha * b` or `x * op(a) = alpha * b`, overwriting
/// `b` with `x`.
pub fn trsm<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    side: Side,
    uplo: Uplo,
    trans: Trans,
    diag: Diag,
    alpha: E,
    a: Tile<E>,
    b: Tile<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    let task = Task::new("trsm")
        .read(a.key())
        .read_write(b.key())
        .flops(trsm::trsm_flops::<E>(side, b.nrows(), b.ncols()));

    region.submit(seq, req, task, move |_| {
        unsafe { trsm::trsm(side, uplo, trans, diag, alpha, a.as_ref(), b.as_mut()) };
        Ok(())
    });
}

/// Submits the Cholesky factorization of the diagonal tile `a`.
///
/// `offset` is the global index of the first row of `a`. A failure of the factorization fails the
/// sequence with [`Error::NotPositiveDefinite`], with the order of the minor counted from the
/// start of the whole matrix.
pub fn potrf<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    uplo: Uplo,
    a: Tile<E>,
    offset: usize,
    seq: &'env Sequence,
    req: &'env Request,
) {
    let task = Task::new("potrf")
        .read_write(a.key())
        .flops(potrf::potrf_flops::<E>(a.nrows()));

    region.submit(seq, req, task, move |_| {
        unsafe { potrf::potrf(uplo, a.as_mut()) }.map_err(|minor| {
            log::debug!(target: "tessera", "potrf failed at minor {}", minor + offset);
            Error::NotPositiveDefinite {
                minor: minor + offset,
            }
        })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, c64, desc::TileMatrix, runtime::run, Context};

    #[test]
    fn failing_factorization_reports_the_global_minor() {
        let ctx = Context::sequential();
        let mut a = TileMatrix::<c64>::try_zeros(2, 4, 4).unwrap();
        for i in 0..4 {
            a.write(i, i, c64::new(1.0, 0.0));
        }
        a.write(3, 3, c64::new(-1.0, 0.0));

        let seq = Sequence::new();
        let req = Request::new();
        let (a, seq, req) = (&a, &seq, &req);
        run(&ctx, |region| {
            for k in 0..2 {
                potrf(region, Uplo::Lower, a.tile(k, k).unwrap(), 2 * k, seq, req);
            }
        });
        assert!(seq.status() == Err(Error::NotPositiveDefinite { minor: 4 }));
        assert!(req.status() == seq.status());
    }
}
