//! Reference tile kernels.
//!
//! Each kernel works on one to four tiles, given as [`MatRef`](crate::mat::MatRef) and
//! [`MatMut`](crate::mat::MatMut) views, and follows the semantics of the LAPACK/BLAS routine it is
//! named after. Kernels that need temporary memory take a [`PodStack`](dyn_stack::PodStack) and
//! expose a matching `*_req` function. Kernels that can fail numerically return the LAPACK `info`
//! value in their error.

use crate::scalar::ComplexField;

pub mod gemm;
pub mod herk;
pub mod lacpy;
pub mod lascl;
pub mod lq;
pub mod potrf;
pub mod trsm;

/// Converts a real flop count to the flop count of the element type.
#[inline]
pub(crate) fn flops<E: ComplexField>(real_flops: f64) -> f64 {
    if E::PRECISION.is_complex() {
        4.0 * real_flops
    } else {
        real_flops
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::{c64, mat::MatRef, scalar::ComplexField};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    pub trait Sample: ComplexField {
        fn sample(rng: &mut StdRng) -> Self;
    }

    impl Sample for f64 {
        fn sample(rng: &mut StdRng) -> Self {
            rng.gen_range(-1.0..1.0)
        }
    }

    impl Sample for c64 {
        fn sample(rng: &mut StdRng) -> Self {
            c64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
        }
    }

    pub fn rng() -> StdRng {
        StdRng::seed_from_u64(0)
    }

    pub fn random<E: Sample>(rng: &mut StdRng, len: usize) -> Vec<E> {
        (0..len).map(|_| E::sample(rng)).collect()
    }

    /// Column-major `a * b`, for `a: m × k` and `b: k × n`.
    pub fn matmul<E: ComplexField>(a: MatRef<'_, E>, b: MatRef<'_, E>) -> Vec<E> {
        let (m, n, k) = (a.nrows(), b.ncols(), a.ncols());
        let mut out = vec![E::zero(); m * n];
        for j in 0..n {
            for i in 0..m {
                let mut acc = E::zero();
                for l in 0..k {
                    acc = acc + a.read(i, l) * b.read(l, j);
                }
                out[i + j * m] = acc;
            }
        }
        out
    }

    /// Maximum of `|x - y|` over two slices of equal length.
    pub fn max_diff<E: ComplexField>(x: &[E], y: &[E]) -> f64
    where
        E::Real: Into<f64>,
    {
        assert_eq!(x.len(), y.len());
        x.iter()
            .zip(y)
            .map(|(&x, &y)| (x - y).abs().into())
            .fold(0.0, f64::max)
    }
}
