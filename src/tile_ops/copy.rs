use crate::{
    desc::{Tile, TileDesc},
    kernels::{lacpy, lascl},
    runtime::{Region, Task},
    scalar::ComplexField,
    Request, Sequence, Uplo,
};

/// Submits the copy of the `uplo` part of `src` into `dst`.
pub fn lacpy<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    uplo: Uplo,
    src: Tile<E>,
    dst: Tile<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    let task = Task::new("lacpy").read(src.key()).read_write(dst.key());
    region.submit(seq, req, task, move |_| {
        unsafe { lacpy::lacpy(uplo, src.as_ref(), dst.as_mut()) };
        Ok(())
    });
}

/// Submits the copy of tile `(i, j)` of the band descriptor `desc` out of a LAPACK band array.
///
/// `src` is the handle over the tile inside the band array.
pub fn band_to_tile<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    desc: TileDesc,
    i: usize,
    j: usize,
    src: Tile<E>,
    dst: Tile<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    let task = Task::new("band_to_tile")
        .read(src.key())
        .read_write(dst.key());
    let (row, col) = (i * desc.mb(), j * desc.nb());
    region.submit(seq, req, task, move |_| {
        let in_band = |r: usize, c: usize| desc.in_band(row + r, col + c);
        unsafe { lacpy::band_to_tile(in_band, src.as_ref(), dst.as_mut()) };
        Ok(())
    });
}

/// Submits the copy of tile `(i, j)` of the band descriptor `desc` back into a LAPACK band array.
pub fn tile_to_band<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    desc: TileDesc,
    i: usize,
    j: usize,
    src: Tile<E>,
    dst: Tile<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    let task = Task::new("tile_to_band")
        .read(src.key())
        .read_write(dst.key());
    let (row, col) = (i * desc.mb(), j * desc.nb());
    region.submit(seq, req, task, move |_| {
        let in_band = |r: usize, c: usize| desc.in_band(row + r, col + c);
        unsafe { lacpy::tile_to_band(in_band, src.as_ref(), dst.as_mut()) };
        Ok(())
    });
}

/// Submits the multiplication of the `uplo` part of `a` by `cto / cfrom`.
pub fn lascl<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    uplo: Uplo,
    cfrom: E::Real,
    cto: E::Real,
    a: Tile<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    let task = Task::new("lascl")
        .read_write(a.key())
        .flops(crate::kernels::flops::<E>((a.nrows() * a.ncols()) as f64));
    region.submit(seq, req, task, move |_| {
        unsafe { lascl::lascl(uplo, cfrom, cto, a.as_mut()) };
        Ok(())
    });
}
