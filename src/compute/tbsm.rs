use super::{pbtrf::tile_bandwidth, tile};
use crate::{
    desc::TileMatrix, runtime::Region, scalar::ComplexField, tile_ops, utils::sub_clamped, Diag,
    Request, Sequence, Side, Trans, Uplo,
};

/// Submits the solve `op(a) * x = alpha * b`, overwriting `b` with `x`, where `a` is the
/// triangular band factor computed by [`pbtrf`](super::pbtrf).
///
/// The block rows are solved forward for `(Lower, NoTrans)` and `(Upper, ConjTrans)`, and backward
/// otherwise. Each block row of `b` is scaled by `alpha` at the first step that updates it.
pub fn tbsm<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    uplo: Uplo,
    trans: Trans,
    diag: Diag,
    alpha: E,
    a: &'env TileMatrix<E>,
    b: &'env TileMatrix<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    if seq.is_failed() {
        return;
    }
    let (mt, nt) = (b.desc().mt(), b.desc().nt());
    let kdt = tile_bandwidth(uplo, a);
    let notrans = trans == Trans::NoTrans;
    let forward = (uplo == Uplo::Lower) == notrans;

    // first step of the traversal that touches block row m
    let first = |m: usize| {
        if forward {
            sub_clamped(m, kdt)
        } else {
            Ord::min(mt - 1, m + kdt)
        }
    };
    let scale = |m: usize, k: usize| if first(m) == k { alpha } else { E::one() };
    // tile of a that, under op, sits at (m, k)
    let op_tile = |m: usize, k: usize| if notrans { tile(a, m, k) } else { tile(a, k, m) };
    let ta = if notrans { Trans::NoTrans } else { Trans::ConjTrans };

    for step in 0..mt {
        if seq.is_failed() {
            return;
        }
        let k = if forward { step } else { mt - 1 - step };
        for n in 0..nt {
            tile_ops::blas::trsm(
                region,
                Side::Left,
                uplo,
                trans,
                diag,
                scale(k, k),
                tile(a, k, k),
                tile(b, k, n),
                seq,
                req,
            );
        }

        let rows = if forward {
            k + 1..Ord::min(mt, k + kdt + 1)
        } else {
            sub_clamped(k, kdt)..k
        };
        for m in rows {
            for n in 0..nt {
                tile_ops::blas::gemm(
                    region,
                    ta,
                    Trans::NoTrans,
                    -E::one(),
                    op_tile(m, k),
                    tile(b, k, n),
                    scale(m, k),
                    tile(b, m, n),
                    seq,
                    req,
                );
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
        kernels::tests::{matmul, max_diff, random, rng},
        mat::MatRef,
        runtime::run,
        Context,
    };

    // dense n × n band factor with bandwidth kd and a dominant diagonal
    fn band_factor(n: usize, kd: usize, uplo: Uplo) -> Vec<c64> {
        let mut rng = rng();
        let values = random::<c64>(&mut rng, n * n);
        let mut out = vec![c64::new(0.0, 0.0); n * n];
        for j in 0..n {
            for i in 0..n {
                let inside = match uplo {
                    Uplo::Lower => i >= j && i - j <= kd,
                    _ => j >= i && j - i <= kd,
                };
                if inside {
                    out[i + j * n] = values[i + j * n];
                }
            }
            out[j + j * n] += c64::new(3.0, 0.0);
        }
        out
    }

    #[test]
    fn solves_every_combination() {
        let ctx = Context::sequential();
        let (n, kd, nb, nrhs) = (7, 3, 2, 3);
        let alpha = c64::new(0.5, 2.0);
        for uplo in [Uplo::Lower, Uplo::Upper] {
            for trans in [Trans::NoTrans, Trans::ConjTrans] {
                let dense = band_factor(n, kd, uplo);
                let shape = Shape::Band { uplo, kl: kd, ku: kd };
                let mut a = TileMatrix::<c64>::try_new(nb, nb, n, n, shape).unwrap();
                for j in 0..n {
                    for i in 0..n {
                        let value = dense[i + j * n];
                        if value != c64::new(0.0, 0.0) {
                            a.write(i, j, value);
                        }
                    }
                }
                let b0 = random::<c64>(&mut rng(), n * nrhs);
                let mut b = TileMatrix::<c64>::try_zeros(nb, n, nrhs).unwrap();
                for j in 0..nrhs {
                    for i in 0..n {
                        b.write(i, j, b0[i + j * n]);
                    }
                }

                let seq = Sequence::new();
                let req = Request::new();
                {
                    let (a, b, seq, req) = (&a, &b, &seq, &req);
                    run(&ctx, |region| {
                        tbsm(region, uplo, trans, Diag::NonUnit, alpha, a, b, seq, req);
                    });
                }
                assert!(seq.status() == Ok(()));

                let mut x = vec![c64::new(0.0, 0.0); n * nrhs];
                for j in 0..nrhs {
                    for i in 0..n {
                        x[i + j * n] = b.read(i, j);
                    }
                }
                let mut op_a = vec![c64::new(0.0, 0.0); n * n];
                for j in 0..n {
                    for i in 0..n {
                        op_a[i + j * n] = if trans == Trans::NoTrans {
                            dense[i + j * n]
                        } else {
                            dense[j + i * n].conj()
                        };
                    }
                }
                let product = matmul(
                    MatRef::from_column_major_slice(&op_a, n, n, n),
                    MatRef::from_column_major_slice(&x, n, nrhs, n),
                );
                let expected: Vec<c64> = b0.iter().map(|&v| alpha * v).collect();
                assert!(max_diff(&product, &expected) < 1e-10);
            }
        }
    }
}
