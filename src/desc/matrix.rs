use super::{Shape, TileDesc};
use crate::{
    assert,
    error::try_zeroed,
    mat::{MatMut, MatRef},
    runtime::TileKey,
    scalar::ComplexField,
    utils::thread::Ptr,
    Error,
};
use core::ptr::NonNull;

/// Tiled matrix: a [`TileDesc`] and the storage it describes.
///
/// The storage is shared with the tasks of a [`Region`](crate::runtime::Region) through
/// [`Tile`] handles, so a `TileMatrix` is only ever borrowed immutably while a region runs. Direct
/// element access requires a mutable borrow, which guarantees that no task is in flight.
pub struct TileMatrix<E> {
    desc: TileDesc,
    ptr: NonNull<E>,
    len: usize,
}

unsafe impl<E: Send> Send for TileMatrix<E> {}
unsafe impl<E: Sync> Sync for TileMatrix<E> {}

impl<E> Drop for TileMatrix<E> {
    fn drop(&mut self) {
        drop(unsafe {
            Box::from_raw(core::ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr(),
                self.len,
            ))
        });
    }
}

impl<E: core::fmt::Debug> core::fmt::Debug for TileMatrix<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TileMatrix").field("desc", &self.desc).finish()
    }
}

/// Handle to one tile of a [`TileMatrix`], captured by the tasks that access it.
pub struct Tile<E> {
    key: TileKey,
    ptr: Ptr<E>,
    nrows: usize,
    ncols: usize,
    ld: usize,
}

impl<E> Copy for Tile<E> {}
impl<E> Clone for Tile<E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> core::fmt::Debug for Tile<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tile")
            .field("key", &self.key)
            .field("nrows", &self.nrows)
            .field("ncols", &self.ncols)
            .field("ld", &self.ld)
            .finish()
    }
}

impl<E: Copy> Tile<E> {
    /// Creates a handle over `nrows × ncols` elements starting at `ptr`, with unit row stride and
    /// column stride `ld`.
    #[inline]
    pub(crate) fn from_raw_parts(
        key: TileKey,
        ptr: *mut E,
        nrows: usize,
        ncols: usize,
        ld: usize,
    ) -> Self {
        Self {
            key,
            ptr: Ptr(ptr),
            nrows,
            ncols,
            ld,
        }
    }

    /// Key of the tile in the dependency tracker.
    #[inline]
    pub fn key(&self) -> TileKey {
        self.key
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Leading dimension of the tile in the backing storage.
    #[inline]
    pub fn ld(&self) -> usize {
        self.ld
    }

    /// Returns a view over the tile.
    ///
    /// # Safety
    /// The tile must not be mutated for the lifetime `'a`.
    #[inline]
    pub unsafe fn as_ref<'a>(self) -> MatRef<'a, E> {
        MatRef::from_raw_parts(self.ptr.0, self.nrows, self.ncols, 1, self.ld as isize)
    }

    /// Returns a mutable view over the tile.
    ///
    /// # Safety
    /// The tile must not be accessed through any other handle for the lifetime `'a`.
    #[inline]
    pub unsafe fn as_mut<'a>(self) -> MatMut<'a, E> {
        MatMut::from_raw_parts_mut(self.ptr.0, self.nrows, self.ncols, 1, self.ld as isize)
    }
}

impl<E: ComplexField> TileMatrix<E> {
    /// Allocates a zero-filled tiled matrix.
    ///
    /// # Errors
    /// - [`Error::IllegalValue`] if the tile sizes are invalid for the shape.
    /// - [`Error::OutOfMemory`] if the storage could not be allocated.
    pub fn try_new(mb: usize, nb: usize, m: usize, n: usize, shape: Shape) -> Result<Self, Error> {
        let desc = TileDesc::new(E::PRECISION, mb, nb, m, n, shape)?;
        let storage = try_zeroed::<E>(desc.storage_len())?.into_boxed_slice();
        let len = storage.len();
        let ptr = unsafe { NonNull::new_unchecked(Box::into_raw(storage) as *mut E) };
        Ok(Self { desc, ptr, len })
    }

    /// Allocates a zero-filled general tiled matrix with square tiles.
    #[inline]
    pub fn try_zeros(nb: usize, m: usize, n: usize) -> Result<Self, Error> {
        Self::try_new(nb, nb, m, n, Shape::General)
    }

    #[inline]
    pub fn desc(&self) -> &TileDesc {
        &self.desc
    }

    /// Returns a handle to tile `(i, j)`, or `None` if the tile is not stored.
    ///
    /// # Panics
    /// Panics if `(i, j)` is outside of the tile grid.
    #[track_caller]
    #[inline]
    pub fn tile(&self, i: usize, j: usize) -> Option<Tile<E>> {
        let offset = self.desc.tile_address(i, j)?;
        Some(Tile {
            key: TileKey {
                desc: self.desc.id(),
                m: i,
                n: j,
            },
            ptr: Ptr(unsafe { self.ptr.as_ptr().add(offset) }),
            nrows: self.desc.tile_row_extent(i),
            ncols: self.desc.tile_col_extent(j),
            ld: self.desc.leading_dimension(i, j),
        })
    }

    /// Returns a mutable view over tile `(i, j)`, or `None` if the tile is not stored.
    #[track_caller]
    #[inline]
    pub fn tile_mut(&mut self, i: usize, j: usize) -> Option<MatMut<'_, E>> {
        let tile = self.tile(i, j)?;
        Some(unsafe { tile.as_mut() })
    }

    /// Reads the element at the global position `(i, j)`. Elements of tiles that are not stored
    /// read as zero.
    #[track_caller]
    pub fn read(&mut self, i: usize, j: usize) -> E {
        assert!(all(i < self.desc.m(), j < self.desc.n()));
        let (mb, nb) = (self.desc.mb(), self.desc.nb());
        match self.tile(i / mb, j / nb) {
            Some(tile) => unsafe { tile.as_ref().read(i % mb, j % nb) },
            None => E::zero(),
        }
    }

    /// Writes the element at the global position `(i, j)`.
    ///
    /// # Panics
    /// Panics if the tile holding `(i, j)` is not stored.
    #[track_caller]
    pub fn write(&mut self, i: usize, j: usize, value: E) {
        assert!(all(i < self.desc.m(), j < self.desc.n()));
        let (mb, nb) = (self.desc.mb(), self.desc.nb());
        let tile = self.tile(i / mb, j / nb);
        assert!(tile.is_some());
        if let Some(tile) = tile {
            unsafe { tile.as_mut().write(i % mb, j % nb, value) };
        }
    }
}
