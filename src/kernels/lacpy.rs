use crate::{
    assert,
    mat::{MatMut, MatRef},
    scalar::ComplexField,
    Uplo,
};

/// Copies the `uplo` part of `src` into `dst`. The rest of `dst` is left untouched.
#[track_caller]
pub fn lacpy<E: ComplexField>(uplo: Uplo, src: MatRef<'_, E>, mut dst: MatMut<'_, E>) {
    let (m, n) = (src.nrows(), src.ncols());
    assert!(all(dst.nrows() == m, dst.ncols() == n));
    for j in 0..n {
        let rows = match uplo {
            Uplo::General => 0..m,
            Uplo::Upper => 0..Ord::min(j + 1, m),
            Uplo::Lower => Ord::min(j, m)..m,
        };
        for i in rows {
            dst.write(i, j, src.read(i, j));
        }
    }
}

/// Copies a tile out of a LAPACK band array.
///
/// `src` views the tile inside the band array, and `in_band(i, j)` tells whether its element
/// `(i, j)` is stored there. Elements outside of the band are set to zero in `dst`, and never read
/// from `src`.
#[track_caller]
pub fn band_to_tile<E: ComplexField>(
    in_band: impl Fn(usize, usize) -> bool,
    src: MatRef<'_, E>,
    mut dst: MatMut<'_, E>,
) {
    let (m, n) = (dst.nrows(), dst.ncols());
    assert!(all(src.nrows() == m, src.ncols() == n));
    for j in 0..n {
        for i in 0..m {
            let value = if in_band(i, j) {
                src.read(i, j)
            } else {
                E::zero()
            };
            dst.write(i, j, value);
        }
    }
}

/// Copies the in-band elements of a tile back into a LAPACK band array, through the view `dst`.
#[track_caller]
pub fn tile_to_band<E: ComplexField>(
    in_band: impl Fn(usize, usize) -> bool,
    src: MatRef<'_, E>,
    mut dst: MatMut<'_, E>,
) {
    let (m, n) = (src.nrows(), src.ncols());
    assert!(all(dst.nrows() == m, dst.ncols() == n));
    for j in 0..n {
        for i in 0..m {
            if in_band(i, j) {
                dst.write(i, j, src.read(i, j));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;

    #[test]
    fn copies_one_triangle() {
        let src: Vec<f64> = (1..=9).map(|x| x as f64).collect();
        let mut dst = vec![0.0; 9];
        lacpy(
            Uplo::Upper,
            MatRef::from_column_major_slice(&src, 3, 3, 3),
            MatMut::from_column_major_slice_mut(&mut dst, 3, 3, 3),
        );
        assert!(dst == [1.0, 0.0, 0.0, 4.0, 5.0, 0.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn band_view_round_trip() {
        // upper band with one superdiagonal, n = 3, lda = 2: column j holds (j - 1, j) then (j, j)
        let band = vec![f64::NAN, 1.0, 2.0, 3.0, 4.0, 5.0];
        let (lda, ku) = (2isize, 1isize);
        // element (i, j) lives at ku + i - j + j * lda: origin ku, row stride 1, column stride lda - 1
        let view = unsafe {
            MatRef::from_raw_parts(band.as_ptr().wrapping_offset(ku), 3, 3, 1, lda - 1)
        };
        let in_band = |i: usize, j: usize| i <= j && j <= i + 1;

        let mut tile = vec![-1.0; 9];
        band_to_tile(in_band, view, MatMut::from_column_major_slice_mut(&mut tile, 3, 3, 3));
        assert!(tile == [1.0, 0.0, 0.0, 2.0, 3.0, 0.0, 0.0, 4.0, 5.0]);

        let mut out = vec![0.0; 6];
        let view = unsafe {
            MatMut::from_raw_parts_mut(out.as_mut_ptr().wrapping_offset(ku), 3, 3, 1, lda - 1)
        };
        tile_to_band(in_band, MatRef::from_column_major_slice(&tile, 3, 3, 3), view);
        assert!(&out[1..] == &band[1..]);
        assert!(out[0] == 0.0);
    }
}
