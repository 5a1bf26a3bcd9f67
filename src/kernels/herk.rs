use super::gemm::op_read;
use crate::{
    assert,
    mat::{MatMut, MatRef},
    scalar::ComplexField,
    Trans, Uplo,
};
use core::ops::Range;

#[inline]
fn triangle(uplo: Uplo, j: usize, n: usize) -> Range<usize> {
    match uplo {
        Uplo::Lower => j..n,
        _ => 0..j + 1,
    }
}

#[inline]
fn accumulate<E: ComplexField>(value: E, beta: E::Real, old: E, diagonal: bool) -> E {
    let value = if beta == <E::Real as num_traits::Zero>::zero() {
        value
    } else {
        value + old.scale_real(beta)
    };
    if diagonal {
        E::from_real(value.real())
    } else {
        value
    }
}

/// Computes the `uplo` triangle of `c := alpha * op(a) * op(a)^H + beta * c`, where `op(a)` is `a`
/// for [`Trans::NoTrans`] and `a^H` otherwise.
///
/// The imaginary part of the diagonal of `c` is set to zero.
#[track_caller]
pub fn herk<E: ComplexField>(
    uplo: Uplo,
    trans: Trans,
    alpha: E::Real,
    a: MatRef<'_, E>,
    beta: E::Real,
    mut c: MatMut<'_, E>,
) {
    let trans = if trans == Trans::NoTrans {
        Trans::NoTrans
    } else {
        Trans::ConjTrans
    };
    let (n, k) = match trans {
        Trans::NoTrans => (a.nrows(), a.ncols()),
        _ => (a.ncols(), a.nrows()),
    };
    assert!(all(uplo != Uplo::General, c.nrows() == n, c.ncols() == n));

    for j in 0..n {
        for i in triangle(uplo, j, n) {
            let mut acc = E::zero();
            for l in 0..k {
                acc = acc + op_read(a, trans, i, l) * op_read(a, trans, j, l).conj();
            }
            let value = accumulate(acc.scale_real(alpha), beta, c.read(i, j), i == j);
            c.write(i, j, value);
        }
    }
}

/// Computes the `uplo` triangle of
/// `c := alpha * op(a) * op(b)^H + conj(alpha) * op(b) * op(a)^H + beta * c`, where `op(x)` is
/// `x` for [`Trans::NoTrans`] and `x^H` otherwise.
///
/// The imaginary part of the diagonal of `c` is set to zero.
#[track_caller]
pub fn her2k<E: ComplexField>(
    uplo: Uplo,
    trans: Trans,
    alpha: E,
    a: MatRef<'_, E>,
    b: MatRef<'_, E>,
    beta: E::Real,
    mut c: MatMut<'_, E>,
) {
    let trans = if trans == Trans::NoTrans {
        Trans::NoTrans
    } else {
        Trans::ConjTrans
    };
    let (n, k) = match trans {
        Trans::NoTrans => (a.nrows(), a.ncols()),
        _ => (a.ncols(), a.nrows()),
    };
    assert!(all(
        uplo != Uplo::General,
        b.nrows() == a.nrows(),
        b.ncols() == a.ncols(),
        c.nrows() == n,
        c.ncols() == n,
    ));

    for j in 0..n {
        for i in triangle(uplo, j, n) {
            let mut ab = E::zero();
            let mut ba = E::zero();
            for l in 0..k {
                ab = ab + op_read(a, trans, i, l) * op_read(b, trans, j, l).conj();
                ba = ba + op_read(b, trans, i, l) * op_read(a, trans, j, l).conj();
            }
            let value = accumulate(alpha * ab + alpha.conj() * ba, beta, c.read(i, j), i == j);
            c.write(i, j, value);
        }
    }
}

/// Nominal flop count of [`herk`].
#[inline]
pub fn herk_flops<E: ComplexField>(n: usize, k: usize) -> f64 {
    super::flops::<E>(k as f64 * n as f64 * (n as f64 + 1.0))
}

/// Nominal flop count of [`her2k`].
#[inline]
pub fn her2k_flops<E: ComplexField>(n: usize, k: usize) -> f64 {
    super::flops::<E>(2.0 * k as f64 * n as f64 * n as f64)
}
