use super::tile;
use crate::{
    desc::TileMatrix, runtime::Region, scalar::ComplexField, tile_ops, Request, Sequence, Trans,
    Uplo,
};

/// Submits the Hermitian rank-2k update
/// `c := alpha * op(a) * op(b)^H + conj(alpha) * op(b) * op(a)^H + beta * c` on the `uplo` triangle
/// of `c`.
///
/// `op(x)` is `x` for [`Trans::NoTrans`], and `x^H` otherwise. Only the first contribution to each
/// tile of `c` is scaled by `beta`.
pub fn her2k<'env, E: ComplexField>(
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
    if seq.is_failed() {
        return;
    }
    let one = <E::Real as num_traits::One>::one();
    let notrans = trans == Trans::NoTrans;
    // number of tiles along the inner dimension
    let kt = if notrans {
        a.desc().nt()
    } else {
        a.desc().mt()
    };
    // tile (i, k) of op(x)
    let op_tile = |x: &TileMatrix<E>, i: usize, k: usize| {
        if notrans {
            tile(x, i, k)
        } else {
            tile(x, k, i)
        }
    };

    if kt == 0 {
        super::lascl(region, uplo, one, beta, c, seq, req);
        return;
    }

    let (ta, tb) = if notrans {
        (Trans::NoTrans, Trans::ConjTrans)
    } else {
        (Trans::ConjTrans, Trans::NoTrans)
    };

    for n in 0..c.desc().nt() {
        if seq.is_failed() {
            return;
        }
        for k in 0..kt {
            let dbeta = if k == 0 { beta } else { one };
            tile_ops::blas::her2k(
                region,
                uplo,
                trans,
                alpha,
                op_tile(a, n, k),
                op_tile(b, n, k),
                dbeta,
                tile(c, n, n),
                seq,
                req,
            );
        }

        for m in n + 1..c.desc().mt() {
            // the tile of c being updated, and the row and column operand indices
            let (ctile, row, col) = match uplo {
                Uplo::Lower => (tile(c, m, n), m, n),
                _ => (tile(c, n, m), n, m),
            };
            for k in 0..kt {
                let zbeta = if k == 0 {
                    E::from_real(beta)
                } else {
                    E::one()
                };
                tile_ops::blas::gemm(
                    region,
                    ta,
                    tb,
                    alpha,
                    op_tile(a, row, k),
                    op_tile(b, col, k),
                    zbeta,
                    ctile,
                    seq,
                    req,
                );
                tile_ops::blas::gemm(
                    region,
                    ta,
                    tb,
                    alpha.conj(),
                    op_tile(b, row, k),
                    op_tile(a, col, k),
                    E::one(),
                    ctile,
                    seq,
                    req,
                );
            }
        }
    }
}
