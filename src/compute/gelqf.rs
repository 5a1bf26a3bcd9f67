use super::tile;
use crate::{
    desc::TileMatrix, runtime::Region, scalar::ComplexField, tile_ops, Request, Sequence, Side,
    Trans,
};

/// Submits the tile LQ factorization `a = L * Q`.
///
/// On completion, the lower trapezoid of `a` holds `L`, the rest of `a` holds the reflectors that
/// define `Q`, and `t` holds their scalars. `t` must have `ib`-row tiles, `ib` being its tile row
/// count, and at least as many tiles as `a`.
pub fn gelqf<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    a: &'env TileMatrix<E>,
    t: &'env TileMatrix<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    if seq.is_failed() {
        return;
    }
    let ib = t.desc().mb();
    let (mt, nt) = (a.desc().mt(), a.desc().nt());

    for k in 0..Ord::min(mt, nt) {
        if seq.is_failed() {
            return;
        }
        let (akk, tkk) = (tile(a, k, k), tile(t, k, k));
        tile_ops::lq::gelqt(region, ib, akk, tkk, seq, req);
        for m in k + 1..mt {
            tile_ops::lq::unmlq(
                region,
                Side::Right,
                Trans::ConjTrans,
                ib,
                akk,
                tkk,
                tile(a, m, k),
                seq,
                req,
            );
        }
        for n in k + 1..nt {
            let (akn, tkn) = (tile(a, k, n), tile(t, k, n));
            tile_ops::lq::tslqt(region, ib, akk, akn, tkn, seq, req);
            for m in k + 1..mt {
                tile_ops::lq::tsmlq(
                    region,
                    Side::Right,
                    Trans::ConjTrans,
                    ib,
                    tile(a, m, k),
                    tile(a, m, n),
                    akn,
                    tkn,
                    seq,
                    req,
                );
            }
        }
    }
}
