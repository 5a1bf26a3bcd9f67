use crate::{
    assert,
    mat::{MatMut, MatRef},
    scalar::{ComplexField, Precision},
    Trans,
};
use reborrow::*;

/// Returns `op(mat)` as a view, along with whether it should be implicitly conjugated.
#[inline]
pub(crate) fn op<E: Copy>(mat: MatRef<'_, E>, trans: Trans) -> (MatRef<'_, E>, bool) {
    match trans {
        Trans::NoTrans => (mat, false),
        Trans::Trans => (mat.transpose(), false),
        Trans::ConjTrans => (mat.transpose(), true),
    }
}

/// Reads `op(mat)(i, j)`.
#[inline(always)]
pub(crate) fn op_read<E: ComplexField>(mat: MatRef<'_, E>, trans: Trans, i: usize, j: usize) -> E {
    match trans {
        Trans::NoTrans => mat.read(i, j),
        Trans::Trans => mat.read(j, i),
        Trans::ConjTrans => mat.read(j, i).conj(),
    }
}

/// Computes `dst := beta * dst`. A zero `beta` overwrites `dst` with zeros.
pub fn scale<E: ComplexField>(beta: E, mut dst: MatMut<'_, E>) {
    if beta == E::one() {
        return;
    }
    for j in 0..dst.ncols() {
        for i in 0..dst.nrows() {
            let value = if beta == E::zero() {
                E::zero()
            } else {
                beta * dst.read(i, j)
            };
            dst.write(i, j, value);
        }
    }
}

macro_rules! call_gemm {
    (
        $ty: ty,
        $m: expr,
        $n: expr,
        $k: expr,
        $dst: expr,
        $read_dst: expr,
        $lhs: expr,
        $rhs: expr,
        $alpha: expr,
        $beta: expr,
        $conj_lhs: expr,
        $conj_rhs: expr
    ) => {{
        let (dst_cs, dst_rs) = ($dst.col_stride(), $dst.row_stride());
        gemm::gemm(
            $m,
            $n,
            $k,
            $dst.as_ptr_mut() as *mut $ty,
            dst_cs,
            dst_rs,
            $read_dst,
            $lhs.as_ptr() as *const $ty,
            $lhs.col_stride(),
            $lhs.row_stride(),
            $rhs.as_ptr() as *const $ty,
            $rhs.col_stride(),
            $rhs.row_stride(),
            bytemuck::cast::<_, $ty>($alpha),
            bytemuck::cast::<_, $ty>($beta),
            false,
            $conj_lhs,
            $conj_rhs,
            gemm::Parallelism::None,
        )
    }};
}

/// Computes `c := alpha * op(a) * op(b) + beta * c`.
///
/// # Panics
/// Panics if the dimensions of `op(a)`, `op(b)` and `c` do not match.
#[track_caller]
pub fn gemm<E: ComplexField>(
    transa: Trans,
    transb: Trans,
    alpha: E,
    a: MatRef<'_, E>,
    b: MatRef<'_, E>,
    beta: E,
    mut c: MatMut<'_, E>,
) {
    let (a, conj_a) = op(a, transa);
    let (b, conj_b) = op(b, transb);
    assert!(all(
        a.nrows() == c.nrows(),
        b.ncols() == c.ncols(),
        a.ncols() == b.nrows(),
    ));

    let (m, n, k) = (c.nrows(), c.ncols(), a.ncols());
    if m == 0 || n == 0 {
        return;
    }
    if k == 0 || alpha == E::zero() {
        scale(beta, c);
        return;
    }

    let read_dst = beta != E::zero();
    let dst = c.rb_mut();
    // gemm computes dst := alpha * dst + beta * lhs * rhs
    unsafe {
        match E::PRECISION {
            Precision::RealFloat => {
                call_gemm!(f32, m, n, k, dst, read_dst, a, b, beta, alpha, conj_a, conj_b)
            }
            Precision::RealDouble => {
                call_gemm!(f64, m, n, k, dst, read_dst, a, b, beta, alpha, conj_a, conj_b)
            }
            Precision::ComplexFloat => {
                call_gemm!(gemm::c32, m, n, k, dst, read_dst, a, b, beta, alpha, conj_a, conj_b)
            }
            Precision::ComplexDouble => {
                call_gemm!(gemm::c64, m, n, k, dst, read_dst, a, b, beta, alpha, conj_a, conj_b)
            }
        }
    }
}

/// Nominal flop count of [`gemm`].
#[inline]
pub fn gemm_flops<E: ComplexField>(m: usize, n: usize, k: usize) -> f64 {
    super::flops::<E>(2.0 * m as f64 * n as f64 * k as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;
    use crate::{c64, kernels::tests::*};
    use assert_approx_eq::assert_approx_eq;

    fn naive(
        transa: Trans,
        transb: Trans,
        alpha: c64,
        a: MatRef<'_, c64>,
        b: MatRef<'_, c64>,
        beta: c64,
        c: MatRef<'_, c64>,
    ) -> Vec<c64> {
        let (m, n) = (c.nrows(), c.ncols());
        let k = if transa == Trans::NoTrans { a.ncols() } else { a.nrows() };
        let mut out = vec![c64::new(0.0, 0.0); m * n];
        for j in 0..n {
            for i in 0..m {
                let mut acc = c64::new(0.0, 0.0);
                for l in 0..k {
                    acc += op_read(a, transa, i, l) * op_read(b, transb, l, j);
                }
                out[i + j * m] = alpha * acc + beta * c.read(i, j);
            }
        }
        out
    }

    #[test]
    fn matches_naive_product() {
        let mut rng = rng();
        let (m, n, k) = (5, 4, 3);
        for (transa, transb) in [
            (Trans::NoTrans, Trans::NoTrans),
            (Trans::NoTrans, Trans::ConjTrans),
            (Trans::ConjTrans, Trans::NoTrans),
            (Trans::Trans, Trans::Trans),
        ] {
            let (ar, ac) = if transa == Trans::NoTrans { (m, k) } else { (k, m) };
            let (br, bc) = if transb == Trans::NoTrans { (k, n) } else { (n, k) };
            let a = random::<c64>(&mut rng, ar * ac);
            let b = random::<c64>(&mut rng, br * bc);
            let mut c = random::<c64>(&mut rng, m * n);
            let alpha = c64::new(0.5, -1.0);
            let beta = c64::new(2.0, 0.25);

            let a = MatRef::from_column_major_slice(&a, ar, ac, ar);
            let b = MatRef::from_column_major_slice(&b, br, bc, br);
            let c_ref = MatRef::from_column_major_slice(&c, m, n, m);
            let expected = naive(transa, transb, alpha, a, b, beta, c_ref);
            let c_mut = MatMut::from_column_major_slice_mut(&mut c, m, n, m);
            gemm(transa, transb, alpha, a, b, beta, c_mut);
            for (x, y) in c.iter().zip(&expected) {
                assert_approx_eq!(x.re, y.re, 1e-12);
                assert_approx_eq!(x.im, y.im, 1e-12);
            }
        }
    }

    #[test]
    fn zero_beta_ignores_nan() {
        let a = [1.0, 2.0];
        let b = [3.0];
        let mut c = [f64::NAN, f64::NAN];
        gemm(
            Trans::NoTrans,
            Trans::NoTrans,
            1.0,
            MatRef::from_column_major_slice(&a, 2, 1, 2),
            MatRef::from_column_major_slice(&b, 1, 1, 1),
            0.0,
            MatMut::from_column_major_slice_mut(&mut c, 2, 1, 2),
        );
        assert!(c == [3.0, 6.0]);
    }
}
