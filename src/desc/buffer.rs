//! Caller-owned column-major buffers, as seen by the layout conversion tasks.
//!
//! Each buffer gets its own identifier, so that the tasks reading or writing a block of it are
//! ordered by the dependency tracker just like tasks touching a tile.

use super::{next_id, Shape, Tile, TileDesc};
use crate::{assert, runtime::TileKey};
use core::marker::PhantomData;

#[inline]
fn min_len(nrows: usize, ncols: usize, ld: usize) -> usize {
    if nrows == 0 || ncols == 0 {
        0
    } else {
        (ncols - 1) * ld + nrows
    }
}

#[derive(Copy, Clone, Debug)]
struct Raw<E> {
    id: u64,
    ptr: *mut E,
    nrows: usize,
    ncols: usize,
    ld: usize,
}

impl<E: Copy> Raw<E> {
    #[track_caller]
    fn new(ptr: *mut E, len: usize, nrows: usize, ncols: usize, ld: usize) -> Self {
        assert!(all(ld >= Ord::max(1, nrows), len >= min_len(nrows, ncols, ld)));
        Self {
            id: next_id(),
            ptr,
            nrows,
            ncols,
            ld,
        }
    }

    #[track_caller]
    fn tile(&self, desc: &TileDesc, i: usize, j: usize) -> Tile<E> {
        assert!(all(
            !matches!(desc.shape(), Shape::Band { .. }),
            desc.m() <= self.nrows,
            desc.n() <= self.ncols,
        ));
        let (mb, nb) = (desc.mb(), desc.nb());
        let offset = i * mb + j * nb * self.ld;
        Tile::from_raw_parts(
            TileKey { desc: self.id, m: i, n: j },
            self.ptr.wrapping_add(offset),
            desc.tile_row_extent(i),
            desc.tile_col_extent(j),
            self.ld,
        )
    }

    #[track_caller]
    fn band_tile(&self, desc: &TileDesc, i: usize, j: usize) -> Tile<E> {
        assert!(all(
            matches!(desc.shape(), Shape::Band { .. }),
            desc.n() <= self.ncols,
        ));
        let offset = desc.band_address(self.ld, i, j);
        Tile::from_raw_parts(
            TileKey { desc: self.id, m: i, n: j },
            self.ptr.wrapping_offset(offset),
            desc.tile_row_extent(i),
            desc.tile_col_extent(j),
            self.ld - 1,
        )
    }
}

/// Read-only column-major buffer, borrowed for the lifetime `'a`.
#[derive(Copy, Clone, Debug)]
pub struct ColMajorRef<'a, E> {
    raw: Raw<E>,
    __marker: PhantomData<&'a [E]>,
}

/// Mutable column-major buffer, borrowed for the lifetime `'a`.
#[derive(Debug)]
pub struct ColMajorMut<'a, E> {
    raw: Raw<E>,
    __marker: PhantomData<&'a mut [E]>,
}

unsafe impl<E: Sync> Send for ColMajorRef<'_, E> {}
unsafe impl<E: Sync> Sync for ColMajorRef<'_, E> {}
unsafe impl<E: Send> Send for ColMajorMut<'_, E> {}
unsafe impl<E: Sync> Sync for ColMajorMut<'_, E> {}

impl<'a, E: Copy> ColMajorRef<'a, E> {
    /// Wraps an `nrows × ncols` column-major matrix with leading dimension `ld`.
    ///
    /// # Panics
    /// Panics if `ld < max(1, nrows)` or if `data` is too short.
    #[track_caller]
    pub fn new(data: &'a [E], nrows: usize, ncols: usize, ld: usize) -> Self {
        Self {
            raw: Raw::new(data.as_ptr() as *mut E, data.len(), nrows, ncols, ld),
            __marker: PhantomData,
        }
    }

    #[inline]
    pub fn ld(&self) -> usize {
        self.raw.ld
    }

    /// Handle over the block of the buffer that corresponds to tile `(i, j)` of `desc`.
    ///
    /// The handle must only be read from.
    #[track_caller]
    #[inline]
    pub(crate) fn tile(&self, desc: &TileDesc, i: usize, j: usize) -> Tile<E> {
        self.raw.tile(desc, i, j)
    }

    /// Handle over tile `(i, j)` of the band descriptor `desc`, inside the LAPACK band array held
    /// by the buffer. Its column stride is `ld - 1`, and only its in-band elements are valid.
    ///
    /// The handle must only be read from.
    #[track_caller]
    #[inline]
    pub(crate) fn band_tile(&self, desc: &TileDesc, i: usize, j: usize) -> Tile<E> {
        self.raw.band_tile(desc, i, j)
    }
}

impl<'a, E: Copy> ColMajorMut<'a, E> {
    /// Wraps an `nrows × ncols` column-major matrix with leading dimension `ld`.
    ///
    /// # Panics
    /// Panics if `ld < max(1, nrows)` or if `data` is too short.
    #[track_caller]
    pub fn new(data: &'a mut [E], nrows: usize, ncols: usize, ld: usize) -> Self {
        Self {
            raw: Raw::new(data.as_mut_ptr(), data.len(), nrows, ncols, ld),
            __marker: PhantomData,
        }
    }

    #[inline]
    pub fn ld(&self) -> usize {
        self.raw.ld
    }

    /// Read-only view of the buffer. Both share their identifier, so that the tasks reading
    /// through the view are ordered with the tasks writing to the buffer.
    #[inline]
    pub fn as_ref(&self) -> ColMajorRef<'a, E> {
        ColMajorRef {
            raw: self.raw,
            __marker: PhantomData,
        }
    }

    #[track_caller]
    #[inline]
    pub(crate) fn tile(&self, desc: &TileDesc, i: usize, j: usize) -> Tile<E> {
        self.raw.tile(desc, i, j)
    }

    #[track_caller]
    #[inline]
    pub(crate) fn band_tile(&self, desc: &TileDesc, i: usize, j: usize) -> Tile<E> {
        self.raw.band_tile(desc, i, j)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, scalar::Precision, Uplo};

    #[test]
    fn blocks_follow_the_tile_grid() {
        let mut data = vec![0.0f64; 9 * 7];
        for (idx, x) in data.iter_mut().enumerate() {
            *x = idx as f64;
        }
        let desc = TileDesc::new(Precision::RealDouble, 4, 4, 7, 7, Shape::General).unwrap();
        let buf = ColMajorRef::new(&data, 7, 7, 9);
        let tile = buf.tile(&desc, 1, 1);
        assert!(all(tile.nrows() == 3, tile.ncols() == 3, tile.ld() == 9));
        let view = unsafe { tile.as_ref() };
        assert!(view.read(0, 0) == (4 + 4 * 9) as f64);
        assert!(view.read(2, 1) == (6 + 5 * 9) as f64);
    }

    #[test]
    fn band_blocks_use_the_compacted_layout() {
        // lower band, kd = 1, n = 4, ldab = 2: element (i, j) is stored at (i - j) + 2 * j
        let mut data = vec![0.0f64; 8];
        let shape = Shape::Band { uplo: Uplo::Lower, kl: 1, ku: 1 };
        let desc = TileDesc::new(Precision::RealDouble, 2, 2, 4, 4, shape).unwrap();
        let buf = ColMajorMut::new(&mut data, 2, 4, 2);
        let tile = buf.band_tile(&desc, 1, 0);
        // tile (1, 0) holds rows 2..4 of columns 0..2, of which only (2, 1) is in the band
        unsafe { tile.as_mut().write(0, 1, 5.0) };
        let tile = buf.band_tile(&desc, 1, 1);
        unsafe { tile.as_mut().write(1, 0, 6.0) };
        assert!(data == [0.0, 0.0, 0.0, 5.0, 0.0, 6.0, 0.0, 0.0]);
    }
}
