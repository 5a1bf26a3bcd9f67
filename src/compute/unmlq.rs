use super::tile;
use crate::{
    desc::TileMatrix, runtime::Region, scalar::ComplexField, tile_ops, Request, Sequence, Side,
    Trans,
};

/// Submits the application of the unitary factor `Q` of the LQ factorization held by `a` and `t`
/// to `b`: `b := op(Q) * b` for [`Side::Left`], `b := b * op(Q)` for [`Side::Right`].
///
/// `a` and `t` are the outputs of [`gelqf`](super::gelqf). The inner blocking is the tile row
/// count of `t`.
///
/// The panel index runs forward for `(Left, NoTrans)` and `(Right, ConjTrans)`, and backward
/// otherwise. The trailing tiles of a panel are visited after its diagonal tile in the forward
/// cases, and before it, in reverse order, in the backward cases.
pub fn unmlq<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    side: Side,
    trans: Trans,
    a: &'env TileMatrix<E>,
    t: &'env TileMatrix<E>,
    b: &'env TileMatrix<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    if seq.is_failed() {
        return;
    }
    let ib = t.desc().mb();
    let kt = Ord::min(a.desc().mt(), a.desc().nt());
    let (bmt, bnt) = (b.desc().mt(), b.desc().nt());
    let trans = if trans == Trans::NoTrans {
        Trans::NoTrans
    } else {
        Trans::ConjTrans
    };

    match (side, trans) {
        (Side::Left, Trans::NoTrans) => {
            for k in 0..kt {
                if seq.is_failed() {
                    return;
                }
                for n in 0..bnt {
                    let (v, tk) = (tile(a, k, k), tile(t, k, k));
                    tile_ops::lq::unmlq(region, side, trans, ib, v, tk, tile(b, k, n), seq, req);
                }
                for m in k + 1..bmt {
                    for n in 0..bnt {
                        tile_ops::lq::tsmlq(
                            region,
                            side,
                            trans,
                            ib,
                            tile(b, k, n),
                            tile(b, m, n),
                            tile(a, k, m),
                            tile(t, k, m),
                            seq,
                            req,
                        );
                    }
                }
            }
        }
        (Side::Left, _) => {
            for k in (0..kt).rev() {
                if seq.is_failed() {
                    return;
                }
                for m in (k + 1..bmt).rev() {
                    for n in 0..bnt {
                        tile_ops::lq::tsmlq(
                            region,
                            side,
                            trans,
                            ib,
                            tile(b, k, n),
                            tile(b, m, n),
                            tile(a, k, m),
                            tile(t, k, m),
                            seq,
                            req,
                        );
                    }
                }
                for n in 0..bnt {
                    let (v, tk) = (tile(a, k, k), tile(t, k, k));
                    tile_ops::lq::unmlq(region, side, trans, ib, v, tk, tile(b, k, n), seq, req);
                }
            }
        }
        (Side::Right, Trans::NoTrans) => {
            for k in (0..kt).rev() {
                if seq.is_failed() {
                    return;
                }
                for n in (k + 1..bnt).rev() {
                    for m in 0..bmt {
                        tile_ops::lq::tsmlq(
                            region,
                            side,
                            trans,
                            ib,
                            tile(b, m, k),
                            tile(b, m, n),
                            tile(a, k, n),
                            tile(t, k, n),
                            seq,
                            req,
                        );
                    }
                }
                for m in 0..bmt {
                    let (v, tk) = (tile(a, k, k), tile(t, k, k));
                    tile_ops::lq::unmlq(region, side, trans, ib, v, tk, tile(b, m, k), seq, req);
                }
            }
        }
        (Side::Right, _) => {
            for k in 0..kt {
                if seq.is_failed() {
                    return;
                }
                for m in 0..bmt {
                    let (v, tk) = (tile(a, k, k), tile(t, k, k));
                    tile_ops::lq::unmlq(region, side, trans, ib, v, tk, tile(b, m, k), seq, req);
                }
                for n in k + 1..bnt {
                    for m in 0..bmt {
                        tile_ops::lq::tsmlq(
                            region,
                            side,
                            trans,
                            ib,
                            tile(b, m, k),
                            tile(b, m, n),
                            tile(a, k, n),
                            tile(t, k, n),
                            seq,
                            req,
                        );
                    }
                }
            }
        }
    }
}
