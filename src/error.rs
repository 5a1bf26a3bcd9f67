/// Errors that can be reported by entry points, tile routines and kernels.
///
/// The integer mapping returned by [`Error::code`] is stable: negative values name the 1-based
/// position of the offending argument of a column-major entry point, positive values above the
/// status constants are the LAPACK-style info returned by a failing kernel.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[non_exhaustive]
pub enum Error {
    /// The execution context is missing or could not be created.
    NotInitialized,
    /// An argument of a column-major entry point has an illegal value.
    IllegalArgument {
        /// 1-based position of the argument in the entry point signature.
        position: u8,
        /// Name of the argument.
        name: &'static str,
    },
    /// An argument of a tile routine has an illegal value.
    IllegalValue,
    /// Memory allocation failed.
    OutOfMemory,
    /// An invariant was violated that cannot be attributed to the caller's input.
    Internal,
    /// The leading minor of the given order is not positive definite, so the Cholesky
    /// factorization could not be completed.
    NotPositiveDefinite {
        /// Order of the first non positive definite leading minor (1-based).
        minor: usize,
    },
}

impl Error {
    /// Status code of the error, following the LAPACK `info` convention.
    ///
    /// | error                     | code          |
    /// |---------------------------|---------------|
    /// | `IllegalArgument`         | `-position`   |
    /// | `NotInitialized`          | `1`           |
    /// | `IllegalValue`            | `3`           |
    /// | `OutOfMemory`             | `4`           |
    /// | `Internal`                | `6`           |
    /// | `NotPositiveDefinite`     | `minor`       |
    #[inline]
    pub fn code(self) -> i32 {
        match self {
            Error::NotInitialized => 1,
            Error::IllegalArgument { position, .. } => -(position as i32),
            Error::IllegalValue => 3,
            Error::OutOfMemory => 4,
            Error::Internal => 6,
            Error::NotPositiveDefinite { minor } => minor as i32,
        }
    }

    #[track_caller]
    pub(crate) fn illegal(position: u8, name: &'static str) -> Self {
        log::error!(target: "tessera", "illegal value of {name}");
        Error::IllegalArgument { position, name }
    }
}

impl core::fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for Error {}

/// Converts the result of a column-major entry point to its LAPACK status code.
#[inline]
pub fn status_code(result: Result<(), Error>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => err.code(),
    }
}

#[inline]
pub(crate) fn try_zeroed<E: bytemuck::Pod>(n: usize) -> Result<Vec<E>, Error> {
    let mut v = Vec::new();
    v.try_reserve_exact(n).map_err(|_| Error::OutOfMemory)?;
    v.resize(n, E::zeroed());
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;

    #[test]
    fn codes_are_stable() {
        assert!(status_code(Ok(())) == 0);
        assert!(Error::IllegalArgument { position: 7, name: "lda" }.code() == -7);
        assert!(Error::NotPositiveDefinite { minor: 5 }.code() == 5);
        assert!(Error::OutOfMemory.code() == 4);
        assert!(Error::NotInitialized.code() == 1);
    }

    #[test]
    fn zeroed_allocation() {
        let v = try_zeroed::<f64>(9).unwrap();
        assert!(v.len() == 9);
        assert!(v.iter().all(|&x| x == 0.0));
        assert!(try_zeroed::<f64>(usize::MAX / 2) == Err(Error::OutOfMemory));
    }
}
