use super::tile;
use crate::{
    desc::TileMatrix, runtime::Region, scalar::ComplexField, tile_ops, Diag, Request, Sequence,
    Side, Trans, Uplo,
};

/// Number of tile off-diagonals of the band factor held by `a`.
#[inline]
pub(crate) fn tile_bandwidth<E: ComplexField>(uplo: Uplo, a: &TileMatrix<E>) -> usize {
    let (kut, klt) = a.desc().tile_bandwidths();
    match uplo {
        Uplo::Upper => kut,
        Uplo::Lower => klt,
        Uplo::General => Ord::max(kut, klt),
    }
}

/// Submits the Cholesky factorization of the Hermitian positive definite band matrix held by the
/// band descriptor `a`: `a = L * L^H` for [`Uplo::Lower`], `a = U^H * U` for [`Uplo::Upper`].
///
/// Only the tiles within `ceil(kd / nb)` tile off-diagonals of the diagonal are touched. A
/// non-positive-definite minor fails the sequence with its global order.
pub fn pbtrf<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    uplo: Uplo,
    a: &'env TileMatrix<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    if seq.is_failed() {
        return;
    }
    let nb = a.desc().nb();
    let mt = a.desc().mt();
    let kdt = tile_bandwidth(uplo, a);
    let one = E::one();
    let minus_one = -E::one();
    let minus_one_real = -<E::Real as num_traits::One>::one();
    let one_real = <E::Real as num_traits::One>::one();

    for k in 0..mt {
        if seq.is_failed() {
            return;
        }
        let akk = tile(a, k, k);
        let end = Ord::min(mt, k + kdt + 1);
        tile_ops::blas::potrf(region, uplo, akk, nb * k, seq, req);

        match uplo {
            Uplo::Lower => {
                for m in k + 1..end {
                    tile_ops::blas::trsm(
                        region,
                        Side::Right,
                        Uplo::Lower,
                        Trans::ConjTrans,
                        Diag::NonUnit,
                        one,
                        akk,
                        tile(a, m, k),
                        seq,
                        req,
                    );
                }
                for m in k + 1..end {
                    let amk = tile(a, m, k);
                    tile_ops::blas::herk(
                        region,
                        Uplo::Lower,
                        Trans::NoTrans,
                        minus_one_real,
                        amk,
                        one_real,
                        tile(a, m, m),
                        seq,
                        req,
                    );
                    for n in k + 1..m {
                        tile_ops::blas::gemm(
                            region,
                            Trans::NoTrans,
                            Trans::ConjTrans,
                            minus_one,
                            amk,
                            tile(a, n, k),
                            one,
                            tile(a, m, n),
                            seq,
                            req,
                        );
                    }
                }
            }
            _ => {
                for m in k + 1..end {
                    tile_ops::blas::trsm(
                        region,
                        Side::Left,
                        Uplo::Upper,
                        Trans::ConjTrans,
                        Diag::NonUnit,
                        one,
                        akk,
                        tile(a, k, m),
                        seq,
                        req,
                    );
                }
                for m in k + 1..end {
                    let akm = tile(a, k, m);
                    tile_ops::blas::herk(
                        region,
                        Uplo::Upper,
                        Trans::ConjTrans,
                        minus_one_real,
                        akm,
                        one_real,
                        tile(a, m, m),
                        seq,
                        req,
                    );
                    for n in k + 1..m {
                        tile_ops::blas::gemm(
                            region,
                            Trans::ConjTrans,
                            Trans::NoTrans,
                            minus_one,
                            tile(a, k, n),
                            akm,
                            one,
                            tile(a, n, m),
                            seq,
                            req,
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assert, c64,
        desc::Shape,
        kernels::tests::{matmul, max_diff},
        mat::MatRef,
        runtime::run_traced,
        Context,
    };

    #[test]
    fn updates_stay_within_the_tile_band() {
        let ctx = Context::sequential();
        let (n, kd, nb) = (11, 3, 2);
        for uplo in [Uplo::Lower, Uplo::Upper] {
            let shape = Shape::Band { uplo, kl: kd, ku: kd };
            let mut a = TileMatrix::<c64>::try_new(nb, nb, n, n, shape).unwrap();
            // tridiagonal-dominant Hermitian band
            let mut dense = vec![c64::new(0.0, 0.0); n * n];
            for j in 0..n {
                for i in j..Ord::min(n, j + kd + 1) {
                    let value = if i == j {
                        c64::new(8.0, 0.0)
                    } else {
                        c64::new(1.0 / (i + j) as f64, 0.5 / (i - j) as f64)
                    };
                    dense[i + j * n] = value;
                    dense[j + i * n] = value.conj();
                    match uplo {
                        Uplo::Lower => a.write(i, j, value),
                        _ => a.write(j, i, value.conj()),
                    }
                }
            }

            let seq = Sequence::new();
            let req = Request::new();
            let (_, trace) = {
                let (a, seq, req) = (&a, &seq, &req);
                run_traced(&ctx, |region| pbtrf(region, uplo, a, seq, req))
            };
            assert!(seq.status() == Ok(()));

            let kdt = tile_bandwidth(uplo, &a);
            assert!(kdt == 2);
            for record in &trace {
                for (key, _) in &record.tiles {
                    assert!(key.m.abs_diff(key.n) <= kdt);
                }
            }
            let mt = a.desc().mt();
            assert!(trace.iter().filter(|record| record.kernel == "potrf").count() == mt);

            // the factor reproduces the matrix
            let mut factor = vec![c64::new(0.0, 0.0); n * n];
            for j in 0..n {
                for i in 0..n {
                    let inside = match uplo {
                        Uplo::Lower => i >= j && i - j <= kd,
                        _ => j >= i && j - i <= kd,
                    };
                    if inside {
                        factor[i + j * n] = a.read(i, j);
                    }
                }
            }
            let mut adjoint = vec![c64::new(0.0, 0.0); n * n];
            for j in 0..n {
                for i in 0..n {
                    adjoint[i + j * n] = factor[j + i * n].conj();
                }
            }
            let (left, right) = match uplo {
                Uplo::Lower => (&factor, &adjoint),
                _ => (&adjoint, &factor),
            };
            let product = matmul(
                MatRef::from_column_major_slice(left, n, n, n),
                MatRef::from_column_major_slice(right, n, n, n),
            );
            assert!(max_diff(&product, &dense) < 1e-12);
        }
    }
}
