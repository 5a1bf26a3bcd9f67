use super::tile;
use crate::{
    desc::TileMatrix, runtime::Region, scalar::ComplexField, tile_ops, Request, Sequence, Uplo,
};

/// Submits the multiplication of the `uplo` part of `a` by `cto / cfrom`.
///
/// Diagonal tiles are scaled on their `uplo` triangle, the other tiles of the selected part are
/// scaled entirely.
pub fn lascl<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    uplo: Uplo,
    cfrom: E::Real,
    cto: E::Real,
    a: &'env TileMatrix<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    if seq.is_failed() {
        return;
    }
    let (mt, nt) = (a.desc().mt(), a.desc().nt());

    for m in 0..mt {
        if seq.is_failed() {
            return;
        }
        let cols = match uplo {
            Uplo::General => 0..nt,
            Uplo::Upper => Ord::min(m, nt)..nt,
            Uplo::Lower => 0..Ord::min(m + 1, nt),
        };
        for n in cols {
            let part = if m == n { uplo } else { Uplo::General };
            tile_ops::copy::lascl(region, part, cfrom, cto, tile(a, m, n), seq, req);
        }
    }
}
