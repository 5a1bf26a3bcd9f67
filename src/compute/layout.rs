use crate::{
    desc::{ColMajorMut, ColMajorRef, TileMatrix},
    runtime::Region,
    scalar::ComplexField,
    tile_ops, Request, Sequence, Uplo,
};

/// Submits the copy of the column-major matrix `src` into the tiles of `a`.
pub fn ge2desc<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    src: ColMajorRef<'env, E>,
    a: &'env TileMatrix<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    if seq.is_failed() {
        return;
    }
    let desc = *a.desc();
    for n in 0..desc.nt() {
        if seq.is_failed() {
            return;
        }
        for m in 0..desc.mt() {
            if let Some(dst) = a.tile(m, n) {
                tile_ops::copy::lacpy(region, Uplo::General, src.tile(&desc, m, n), dst, seq, req);
            }
        }
    }
}

/// Submits the copy of the tiles of `a` into the column-major matrix `dst`.
pub fn desc2ge<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    a: &'env TileMatrix<E>,
    dst: &'env ColMajorMut<'env, E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    if seq.is_failed() {
        return;
    }
    let desc = *a.desc();
    for n in 0..desc.nt() {
        if seq.is_failed() {
            return;
        }
        for m in 0..desc.mt() {
            if let Some(src) = a.tile(m, n) {
                tile_ops::copy::lacpy(region, Uplo::General, src, dst.tile(&desc, m, n), seq, req);
            }
        }
    }
}
