//! Strided views over tile storage.
//!
//! A tile is a small column-major matrix that lives inside the backing storage of a
//! [`TileMatrix`](crate::desc::TileMatrix), or inside a caller-owned column-major buffer. The
//! kernels only ever see it through [`MatRef`] and [`MatMut`], which carry a pointer, the
//! dimensions and the strides.

use crate::{assert, debug_assert};
use core::marker::PhantomData;
use dyn_stack::{PodStack, SizeOverflow, StackReq};
use reborrow::*;

struct MatImpl<E> {
    ptr: *mut E,
    nrows: usize,
    ncols: usize,
    row_stride: isize,
    col_stride: isize,
}

impl<E> Copy for MatImpl<E> {}
impl<E> Clone for MatImpl<E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

/// Immutable view over a matrix, similar to an immutable reference to a 2D strided
/// [prim@slice].
pub struct MatRef<'a, E> {
    inner: MatImpl<E>,
    __marker: PhantomData<&'a E>,
}

/// Mutable view over a matrix, similar to a mutable reference to a 2D strided [prim@slice].
///
/// Since `MatMut` mutably borrows data, it cannot be [`Copy`]. Use [`ReborrowMut::rb_mut`] to
/// pass it to a function without giving it up, and [`Reborrow::rb`] to obtain a [`MatRef`] for
/// the lifetime of the borrow.
pub struct MatMut<'a, E> {
    inner: MatImpl<E>,
    __marker: PhantomData<&'a mut E>,
}

unsafe impl<E: Sync> Send for MatRef<'_, E> {}
unsafe impl<E: Sync> Sync for MatRef<'_, E> {}
unsafe impl<E: Send> Send for MatMut<'_, E> {}
unsafe impl<E: Sync> Sync for MatMut<'_, E> {}

impl<E> Copy for MatRef<'_, E> {}
impl<E> Clone for MatRef<'_, E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<'short, E> Reborrow<'short> for MatRef<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        *self
    }
}

impl<'short, E> ReborrowMut<'short> for MatRef<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        *self
    }
}

impl<'a, E> IntoConst for MatRef<'a, E> {
    type Target = MatRef<'a, E>;

    #[inline]
    fn into_const(self) -> Self::Target {
        self
    }
}

impl<'short, E> Reborrow<'short> for MatMut<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        MatRef {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<'short, E> ReborrowMut<'short> for MatMut<'_, E> {
    type Target = MatMut<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        MatMut {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<'a, E> IntoConst for MatMut<'a, E> {
    type Target = MatRef<'a, E>;

    #[inline]
    fn into_const(self) -> Self::Target {
        MatRef {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

#[inline]
fn min_len(nrows: usize, ncols: usize, col_stride: usize) -> usize {
    if nrows == 0 || ncols == 0 {
        0
    } else {
        (ncols - 1) * col_stride + nrows
    }
}

impl<'a, E: Copy> MatRef<'a, E> {
    /// Creates a `MatRef` from a pointer to the matrix data, dimensions and strides.
    ///
    /// # Safety
    /// For every in-bounds `(i, j)`, `ptr.offset(i * row_stride + j * col_stride)` must point to
    /// a valid `E` that is not mutated for the lifetime `'a`.
    #[inline]
    pub unsafe fn from_raw_parts(
        ptr: *const E,
        nrows: usize,
        ncols: usize,
        row_stride: isize,
        col_stride: isize,
    ) -> Self {
        Self {
            inner: MatImpl {
                ptr: ptr as *mut E,
                nrows,
                ncols,
                row_stride,
                col_stride,
            },
            __marker: PhantomData,
        }
    }

    /// Creates a column-major `MatRef` over `slice`, with the given leading dimension.
    #[track_caller]
    #[inline]
    pub fn from_column_major_slice(slice: &'a [E], nrows: usize, ncols: usize, ld: usize) -> Self {
        assert!(all(ld >= nrows, slice.len() >= min_len(nrows, ncols, ld)));
        unsafe { Self::from_raw_parts(slice.as_ptr(), nrows, ncols, 1, ld as isize) }
    }

    /// Returns the number of rows of the matrix.
    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.inner.nrows
    }

    /// Returns the number of columns of the matrix.
    #[inline(always)]
    pub fn ncols(&self) -> usize {
        self.inner.ncols
    }

    /// Returns the offset between the first elements of two successive rows.
    #[inline(always)]
    pub fn row_stride(&self) -> isize {
        self.inner.row_stride
    }

    /// Returns the offset between the first elements of two successive columns.
    #[inline(always)]
    pub fn col_stride(&self) -> isize {
        self.inner.col_stride
    }

    /// Returns a pointer to the first element of the matrix.
    #[inline(always)]
    pub fn as_ptr(self) -> *const E {
        self.inner.ptr
    }

    /// Returns a pointer to the element at the given position, without bound checks.
    #[inline(always)]
    pub fn ptr_at(self, i: usize, j: usize) -> *const E {
        self.inner
            .ptr
            .wrapping_offset(i as isize * self.inner.row_stride + j as isize * self.inner.col_stride)
    }

    /// Reads the value of the element at the given position, without bound checks.
    ///
    /// # Safety
    /// Requires `i < self.nrows()` and `j < self.ncols()`.
    #[inline(always)]
    pub unsafe fn read_unchecked(&self, i: usize, j: usize) -> E {
        debug_assert!(all(i < self.nrows(), j < self.ncols()));
        *self.ptr_at(i, j)
    }

    /// Reads the value of the element at the given position.
    ///
    /// # Panics
    /// Panics if `i >= self.nrows()` or `j >= self.ncols()`.
    #[track_caller]
    #[inline(always)]
    pub fn read(&self, i: usize, j: usize) -> E {
        assert!(all(i < self.nrows(), j < self.ncols()));
        unsafe { self.read_unchecked(i, j) }
    }

    /// Returns the transpose of `self`.
    #[inline]
    pub fn transpose(self) -> Self {
        Self {
            inner: MatImpl {
                ptr: self.inner.ptr,
                nrows: self.inner.ncols,
                ncols: self.inner.nrows,
                row_stride: self.inner.col_stride,
                col_stride: self.inner.row_stride,
            },
            __marker: PhantomData,
        }
    }

    /// Returns a view over the `nrows × ncols` submatrix starting at `(row_start, col_start)`.
    #[track_caller]
    #[inline]
    pub fn submatrix(self, row_start: usize, col_start: usize, nrows: usize, ncols: usize) -> Self {
        assert!(all(
            row_start <= self.nrows(),
            col_start <= self.ncols(),
            nrows <= self.nrows() - row_start,
            ncols <= self.ncols() - col_start,
        ));
        unsafe {
            Self::from_raw_parts(
                self.ptr_at(row_start, col_start),
                nrows,
                ncols,
                self.row_stride(),
                self.col_stride(),
            )
        }
    }
}

impl<'a, E: Copy> MatMut<'a, E> {
    /// Creates a `MatMut` from a pointer to the matrix data, dimensions and strides.
    ///
    /// # Safety
    /// For every in-bounds `(i, j)`, `ptr.offset(i * row_stride + j * col_stride)` must point to
    /// a valid `E` that is not accessed through any other pointer for the lifetime `'a`, and two
    /// distinct in-bounds positions must not alias.
    #[inline]
    pub unsafe fn from_raw_parts_mut(
        ptr: *mut E,
        nrows: usize,
        ncols: usize,
        row_stride: isize,
        col_stride: isize,
    ) -> Self {
        Self {
            inner: MatImpl {
                ptr,
                nrows,
                ncols,
                row_stride,
                col_stride,
            },
            __marker: PhantomData,
        }
    }

    /// Creates a column-major `MatMut` over `slice`, with the given leading dimension.
    #[track_caller]
    #[inline]
    pub fn from_column_major_slice_mut(
        slice: &'a mut [E],
        nrows: usize,
        ncols: usize,
        ld: usize,
    ) -> Self {
        assert!(all(ld >= nrows, slice.len() >= min_len(nrows, ncols, ld)));
        unsafe { Self::from_raw_parts_mut(slice.as_mut_ptr(), nrows, ncols, 1, ld as isize) }
    }

    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.inner.nrows
    }

    #[inline(always)]
    pub fn ncols(&self) -> usize {
        self.inner.ncols
    }

    #[inline(always)]
    pub fn row_stride(&self) -> isize {
        self.inner.row_stride
    }

    #[inline(always)]
    pub fn col_stride(&self) -> isize {
        self.inner.col_stride
    }

    /// Returns a mutable pointer to the first element of the matrix.
    #[inline(always)]
    pub fn as_ptr_mut(self) -> *mut E {
        self.inner.ptr
    }

    #[inline(always)]
    fn ptr_at_mut(&mut self, i: usize, j: usize) -> *mut E {
        self.inner
            .ptr
            .wrapping_offset(i as isize * self.inner.row_stride + j as isize * self.inner.col_stride)
    }

    /// Reads the value of the element at the given position.
    #[track_caller]
    #[inline(always)]
    pub fn read(&self, i: usize, j: usize) -> E {
        self.rb().read(i, j)
    }

    /// Writes the value to the element at the given position, without bound checks.
    ///
    /// # Safety
    /// Requires `i < self.nrows()` and `j < self.ncols()`.
    #[inline(always)]
    pub unsafe fn write_unchecked(&mut self, i: usize, j: usize, value: E) {
        debug_assert!(all(i < self.nrows(), j < self.ncols()));
        *self.ptr_at_mut(i, j) = value;
    }

    /// Writes the value to the element at the given position.
    ///
    /// # Panics
    /// Panics if `i >= self.nrows()` or `j >= self.ncols()`.
    #[track_caller]
    #[inline(always)]
    pub fn write(&mut self, i: usize, j: usize, value: E) {
        assert!(all(i < self.nrows(), j < self.ncols()));
        unsafe { self.write_unchecked(i, j, value) }
    }

    /// Copies the values from `other` into `self`.
    #[track_caller]
    pub fn copy_from(&mut self, other: MatRef<'_, E>) {
        assert!(all(self.nrows() == other.nrows(), self.ncols() == other.ncols()));
        for j in 0..self.ncols() {
            for i in 0..self.nrows() {
                unsafe { self.write_unchecked(i, j, other.read_unchecked(i, j)) };
            }
        }
    }

    /// Fills the elements of `self` with `value`.
    pub fn fill(&mut self, value: E) {
        for j in 0..self.ncols() {
            for i in 0..self.nrows() {
                unsafe { self.write_unchecked(i, j, value) };
            }
        }
    }

    /// Returns the transpose of `self`.
    #[inline]
    pub fn transpose_mut(self) -> Self {
        Self {
            inner: MatImpl {
                ptr: self.inner.ptr,
                nrows: self.inner.ncols,
                ncols: self.inner.nrows,
                row_stride: self.inner.col_stride,
                col_stride: self.inner.row_stride,
            },
            __marker: PhantomData,
        }
    }

    /// Returns a mutable view over the `nrows × ncols` submatrix starting at
    /// `(row_start, col_start)`.
    #[track_caller]
    #[inline]
    pub fn submatrix_mut(
        mut self,
        row_start: usize,
        col_start: usize,
        nrows: usize,
        ncols: usize,
    ) -> Self {
        assert!(all(
            row_start <= self.nrows(),
            col_start <= self.ncols(),
            nrows <= self.nrows() - row_start,
            ncols <= self.ncols() - col_start,
        ));
        let ptr = self.ptr_at_mut(row_start, col_start);
        let (rs, cs) = (self.row_stride(), self.col_stride());
        unsafe { Self::from_raw_parts_mut(ptr, nrows, ncols, rs, cs) }
    }
}

impl<E: Copy + core::fmt::Debug> core::fmt::Debug for MatRef<'_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        struct DebugRow<'a, T: Copy + core::fmt::Debug>(MatRef<'a, T>);

        impl<T: Copy + core::fmt::Debug> core::fmt::Debug for DebugRow<'_, T> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut j = 0;
                f.debug_list()
                    .entries(core::iter::from_fn(|| {
                        let ret = if j < self.0.ncols() {
                            Some(self.0.read(0, j))
                        } else {
                            None
                        };
                        j += 1;
                        ret
                    }))
                    .finish()
            }
        }

        writeln!(f, "[")?;
        for i in 0..self.nrows() {
            let row = self.submatrix(i, 0, 1, self.ncols());
            core::fmt::Debug::fmt(&DebugRow(row), f)?;
            f.write_str(",\n")?;
        }
        write!(f, "]")
    }
}

impl<E: Copy + core::fmt::Debug> core::fmt::Debug for MatMut<'_, E> {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.rb(), f)
    }
}

/// Returns the stack requirements for creating a temporary matrix with the given dimensions.
#[inline]
pub fn temp_mat_req<E: bytemuck::Pod>(
    nrows: usize,
    ncols: usize,
) -> Result<StackReq, SizeOverflow> {
    StackReq::try_new::<E>(nrows.checked_mul(ncols).ok_or(SizeOverflow)?)
}

/// Creates a temporary column-major matrix of zero values, from the given memory stack.
pub fn temp_mat_zeroed<E: bytemuck::Pod>(
    nrows: usize,
    ncols: usize,
    stack: PodStack<'_>,
) -> (MatMut<'_, E>, PodStack<'_>) {
    let (alloc, stack) = stack.make_raw::<E>(nrows * ncols);
    alloc.fill(E::zeroed());
    (
        unsafe { MatMut::from_raw_parts_mut(alloc.as_mut_ptr(), nrows, ncols, 1, nrows as isize) },
        stack,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;

    #[test]
    fn views_and_strides() {
        let mut data: Vec<f64> = (0..12).map(|x| x as f64).collect();
        {
            let a = MatRef::from_column_major_slice(&data, 3, 3, 4);
            assert!(a.read(2, 1) == 6.0);
            let at = a.transpose();
            assert!(at.read(1, 2) == 6.0);
            let s = a.submatrix(1, 1, 2, 2);
            assert!(s.read(0, 0) == 5.0);
            assert!(s.read(1, 1) == 10.0);
        }

        let mut a = MatMut::from_column_major_slice_mut(&mut data, 4, 3, 4);
        a.rb_mut().submatrix_mut(2, 1, 2, 2).fill(-1.0);
        assert!(a.read(2, 1) == -1.0);
        assert!(a.read(3, 2) == -1.0);
        assert!(a.read(1, 1) == 5.0);
        a.rb_mut().transpose_mut().write(0, 3, 7.0);
        assert!(data[3] == 7.0);
    }
}
