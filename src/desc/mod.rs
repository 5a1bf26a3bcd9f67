//! Tile descriptors.
//!
//! A [`TileDesc`] describes an `m × n` matrix split into `mb × nb` tiles, along with the storage
//! shape that decides which tiles are materialized and where they live in the backing storage.
//! [`TileMatrix`] pairs a descriptor with its storage.
//!
//! Tiles are stored one after the other, column of tiles by column of tiles. Each tile is itself
//! column-major. Inside a general (or triangular) descriptor the tiles of the last tile row and
//! tile column are smaller, and packed with their actual row count as leading dimension. Band
//! descriptors store every tile as a full `mb × nb` block, and only the tiles inside the tile
//! band.

use crate::{assert, scalar::Precision, utils::DivCeil, utils::sub_clamped, Error, Uplo};
use core::ops::Range;
use core::sync::atomic::{AtomicU64, Ordering};

mod buffer;
mod matrix;
pub use buffer::{ColMajorMut, ColMajorRef};
pub use matrix::{Tile, TileMatrix};

/// Storage shape of a tile descriptor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Every tile is stored.
    General,
    /// Only the tiles on or above the diagonal are addressable.
    Upper,
    /// Only the tiles on or below the diagonal are addressable.
    Lower,
    /// Only the tiles that intersect the band are stored.
    Band {
        /// Which band is stored. A general band keeps `ku + kl` superdiagonals, the extra `kl`
        /// ones holding the fill-in of a banded LU factorization.
        uplo: Uplo,
        /// Number of subdiagonals.
        kl: usize,
        /// Number of superdiagonals.
        ku: usize,
    },
}

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Returns an identifier that no other descriptor or buffer uses.
#[inline]
pub(crate) fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Tile layout of a matrix.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileDesc {
    id: u64,
    precision: Precision,
    mb: usize,
    nb: usize,
    m: usize,
    n: usize,
    mt: usize,
    nt: usize,
    shape: Shape,
    // tile bandwidths of band descriptors
    kut: usize,
    klt: usize,
    len: usize,
}

impl TileDesc {
    /// Creates a new descriptor for an `m × n` matrix split into `mb × nb` tiles.
    ///
    /// # Errors
    /// - [`Error::IllegalValue`] if a tile size is zero, or if the shape is a band and `mb != nb`.
    /// - [`Error::OutOfMemory`] if the number of elements of the backing storage overflows
    ///   `usize`.
    pub fn new(
        precision: Precision,
        mb: usize,
        nb: usize,
        m: usize,
        n: usize,
        shape: Shape,
    ) -> Result<Self, Error> {
        if mb == 0 || nb == 0 {
            log::error!(target: "tessera", "illegal tile size {mb}×{nb}");
            return Err(Error::IllegalValue);
        }
        let (kut, klt) = match shape {
            Shape::Band { uplo, kl, ku } => {
                if mb != nb {
                    log::error!(
                        target: "tessera",
                        "band descriptors need square tiles, got {mb}×{nb}"
                    );
                    return Err(Error::IllegalValue);
                }
                let Some(kd) = ku.checked_add(kl) else {
                    log::error!(target: "tessera", "bandwidths {kl} + {ku} overflow");
                    return Err(Error::IllegalValue);
                };
                match uplo {
                    Uplo::General => (kd.msrv_div_ceil(nb), kl.msrv_div_ceil(nb)),
                    Uplo::Upper => (ku.msrv_div_ceil(nb), 0),
                    Uplo::Lower => (0, kl.msrv_div_ceil(nb)),
                }
            }
            _ => (0, 0),
        };

        let (mt, nt) = (m.msrv_div_ceil(mb), n.msrv_div_ceil(nb));
        let len = match shape {
            Shape::Band { .. } => kut
                .checked_add(klt)
                .and_then(|tiles| tiles.checked_add(1))
                .and_then(|tiles_per_col| tiles_per_col.checked_mul(nt))
                .and_then(|tiles| tiles.checked_mul(mb))
                .and_then(|len| len.checked_mul(nb)),
            _ => m.checked_mul(n),
        };
        let Some(len) = len else {
            log::error!(target: "tessera", "storage of a {m}×{n} matrix overflows");
            return Err(Error::OutOfMemory);
        };

        Ok(Self {
            id: next_id(),
            precision,
            mb,
            nb,
            m,
            n,
            mt,
            nt,
            shape,
            kut,
            klt,
            len,
        })
    }

    /// Unique identifier of the descriptor, used to key its tiles in the dependency tracker.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Number of rows of a full tile.
    #[inline]
    pub fn mb(&self) -> usize {
        self.mb
    }

    /// Number of columns of a full tile.
    #[inline]
    pub fn nb(&self) -> usize {
        self.nb
    }

    /// Number of rows of the matrix.
    #[inline]
    pub fn m(&self) -> usize {
        self.m
    }

    /// Number of columns of the matrix.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of tile rows.
    #[inline]
    pub fn mt(&self) -> usize {
        self.mt
    }

    /// Number of tile columns.
    #[inline]
    pub fn nt(&self) -> usize {
        self.nt
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Number of tile superdiagonals and tile subdiagonals stored by a band descriptor.
    #[inline]
    pub fn tile_bandwidths(&self) -> (usize, usize) {
        (self.kut, self.klt)
    }

    /// Number of rows of the tiles in tile row `i`.
    #[track_caller]
    #[inline]
    pub fn tile_row_extent(&self, i: usize) -> usize {
        assert!(i < self.mt);
        Ord::min(self.mb, self.m - i * self.mb)
    }

    /// Number of columns of the tiles in tile column `j`.
    #[track_caller]
    #[inline]
    pub fn tile_col_extent(&self, j: usize) -> usize {
        assert!(j < self.nt);
        Ord::min(self.nb, self.n - j * self.nb)
    }

    /// Row stride of tile `(i, j)` in the backing storage.
    #[track_caller]
    #[inline]
    pub fn leading_dimension(&self, i: usize, j: usize) -> usize {
        assert!(all(i < self.mt, j < self.nt));
        match self.shape {
            Shape::Band { .. } => self.mb,
            _ => self.tile_row_extent(i),
        }
    }

    /// Returns whether tile `(i, j)` is addressable under the storage shape.
    #[track_caller]
    #[inline]
    pub fn is_stored(&self, i: usize, j: usize) -> bool {
        assert!(all(i < self.mt, j < self.nt));
        match self.shape {
            Shape::General => true,
            Shape::Upper => i <= j,
            Shape::Lower => i >= j,
            Shape::Band { .. } => i + self.kut >= j && i <= j + self.klt,
        }
    }

    /// Offset, in elements, of the first element of tile `(i, j)` inside the backing storage, or
    /// `None` if the tile is not stored.
    ///
    /// # Panics
    /// Panics if `(i, j)` is outside of the tile grid.
    #[track_caller]
    #[inline]
    pub fn tile_address(&self, i: usize, j: usize) -> Option<usize> {
        if !self.is_stored(i, j) {
            return None;
        }
        match self.shape {
            Shape::Band { .. } => {
                let tiles_per_col = self.kut + self.klt + 1;
                Some(((i + self.kut - j) + j * tiles_per_col) * self.mb * self.nb)
            }
            _ => Some(self.m * self.nb * j + self.mb * i * self.tile_col_extent(j)),
        }
    }

    /// Number of elements of the backing storage.
    ///
    /// Every stored tile lies inside the first `storage_len()` elements.
    #[inline]
    pub fn storage_len(&self) -> usize {
        self.len
    }

    /// Band parameters `(uplo, kl, ku)` of a band descriptor.
    #[track_caller]
    #[inline]
    fn band(&self) -> (Uplo, usize, usize) {
        let (is_band, band) = match self.shape {
            Shape::Band { uplo, kl, ku } => (true, (uplo, kl, ku)),
            _ => (false, (Uplo::General, 0, 0)),
        };
        assert!(is_band);
        band
    }

    /// Offset of the origin of tile `(i, j)` inside a LAPACK band array with leading dimension
    /// `lda`.
    ///
    /// Inside the tile, element `(r, c)` lives at `band_address(lda, i, j) + r + c * (lda - 1)`.
    /// The returned value may be negative, only the in-band elements of the tile are valid
    /// positions of the band array.
    #[track_caller]
    #[inline]
    pub fn band_address(&self, lda: usize, i: usize, j: usize) -> isize {
        assert!(all(i < self.mt, j < self.nt));
        let offset = match self.band() {
            (Uplo::Upper, _, ku) => ku,
            (Uplo::Lower, _, _) => 0,
            (Uplo::General, kl, ku) => ku + kl,
        };
        (lda * (self.nb * j) + offset) as isize + self.mb as isize * (i as isize - j as isize)
    }

    /// Range of tile rows of tile column `j` that intersect the band.
    #[track_caller]
    pub fn band_row_range(&self, j: usize) -> Range<usize> {
        assert!(j < self.nt);
        let (uplo, kl, ku) = self.band();
        if self.m == 0 {
            return 0..0;
        }
        let nb = self.nb;
        let (start, end) = match uplo {
            Uplo::General => (
                sub_clamped(j * nb, ku + kl) / nb,
                Ord::min(self.m - 1, (j + 1) * nb + kl - 1) / nb,
            ),
            Uplo::Upper => (
                sub_clamped(j * nb, ku) / nb,
                Ord::min(self.m - 1, (j + 1) * nb - 1) / nb,
            ),
            Uplo::Lower => (j, Ord::min(self.m - 1, (j + 1) * nb + kl - 1) / nb),
        };
        start..Ord::max(start, end + 1)
    }

    /// Returns whether the element at `(i, j)` lies inside the band, relative to `i - j`.
    #[inline]
    pub(crate) fn in_band(&self, i: usize, j: usize) -> bool {
        let Shape::Band { uplo, kl, ku } = self.shape else {
            return true;
        };
        match uplo {
            Uplo::General => i + ku + kl >= j && i <= j + kl,
            Uplo::Upper => i + ku >= j && i <= j,
            Uplo::Lower => i >= j && i <= j + kl,
        }
    }
}
