//! Execution context: tuning parameters and the worker pool.

use crate::{utils::thread::parallelism_degree, Error, Parallelism};

/// Tile sizes used by the entry points to split a matrix into tiles.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileParams {
    /// Tile size, in rows and columns.
    pub nb: usize,
    /// Inner blocking size of the factorizations, which is also the row count of the tiles of
    /// the `T` descriptor produced by [`gelqf`](crate::api::gelqf).
    pub ib: usize,
}

impl Default for TileParams {
    #[inline]
    fn default() -> Self {
        Self { nb: 256, ib: 64 }
    }
}

/// Explicit execution context, passed to every entry point and parallel region.
///
/// # Example
/// ```
/// use tessera::{Context, Parallelism, TileParams};
///
/// let ctx = Context::new(TileParams { nb: 64, ib: 16 }, Parallelism::None).unwrap();
/// assert_eq!(ctx.params().nb, 64);
/// ```
#[derive(Debug)]
pub struct Context {
    params: TileParams,
    parallelism: Parallelism,
    #[cfg(feature = "rayon")]
    pool: Option<rayon::ThreadPool>,
}

impl Context {
    /// Creates a new context.
    ///
    /// `Parallelism::Rayon(n)` with `n > 0` builds a dedicated pool of `n` worker threads, owned by
    /// the context. `Parallelism::Rayon(0)` runs on the current rayon pool.
    ///
    /// # Errors
    /// - [`Error::IllegalValue`] if `params.nb == 0`, or `params.ib` is not in `1..=params.nb`.
    /// - [`Error::NotInitialized`] if the worker pool could not be created.
    pub fn new(params: TileParams, parallelism: Parallelism) -> Result<Self, Error> {
        if params.nb == 0 || params.ib == 0 || params.ib > params.nb {
            log::error!(target: "tessera", "illegal tile parameters {params:?}");
            return Err(Error::IllegalValue);
        }

        #[cfg(feature = "rayon")]
        let pool = match parallelism {
            Parallelism::Rayon(n_threads) if n_threads > 0 => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n_threads)
                    .thread_name(|idx| format!("tessera-worker-{idx}"))
                    .build()
                    .map_err(|err| {
                        log::error!(target: "tessera", "failed to build the worker pool: {err}");
                        Error::NotInitialized
                    })?,
            ),
            _ => None,
        };

        Ok(Self {
            params,
            parallelism,
            #[cfg(feature = "rayon")]
            pool,
        })
    }

    /// Creates a sequential context with the default tile parameters.
    #[inline]
    pub fn sequential() -> Self {
        Self {
            params: TileParams::default(),
            parallelism: Parallelism::None,
            #[cfg(feature = "rayon")]
            pool: None,
        }
    }

    #[inline]
    pub fn params(&self) -> TileParams {
        self.params
    }

    #[inline]
    pub fn parallelism(&self) -> Parallelism {
        self.parallelism
    }

    /// Number of threads that may execute tasks concurrently.
    #[inline]
    pub fn n_threads(&self) -> usize {
        #[cfg(feature = "rayon")]
        if let Some(pool) = &self.pool {
            return pool.current_num_threads();
        }
        parallelism_degree(self.parallelism)
    }

    /// Runs `op` inside the worker pool of the context.
    #[inline]
    pub(crate) fn install<R: Send>(&self, op: impl Send + FnOnce() -> R) -> R {
        #[cfg(feature = "rayon")]
        if let Some(pool) = &self.pool {
            return pool.install(op);
        }
        op()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;

    #[test]
    fn rejects_bad_params() {
        for (nb, ib) in [(0, 1), (8, 9), (8, 0)] {
            let err = Context::new(TileParams { nb, ib }, Parallelism::None).unwrap_err();
            assert!(err == Error::IllegalValue);
        }
        let ctx = Context::new(TileParams { nb: 8, ib: 8 }, Parallelism::None).unwrap();
        assert!(ctx.n_threads() == 1);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn dedicated_pool() {
        let ctx = Context::new(TileParams::default(), Parallelism::Rayon(2)).unwrap();
        assert!(ctx.n_threads() == 2);
        let idx = ctx.install(|| rayon::current_thread_index());
        assert!(idx.is_some());
    }
}
