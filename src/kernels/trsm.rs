use super::gemm::op_read;
use crate::{
    assert,
    mat::{MatMut, MatRef},
    scalar::ComplexField,
    Diag, Side, Trans, Uplo,
};

/// Solves `op(a) * x = alpha * b` (left side) or `x * op(a) = alpha * b` (right side) for `x`,
/// where `a` is triangular, and stores the result in `b`.
///
/// Only the `uplo` triangle of `a` is accessed. With [`Diag::Unit`], its diagonal is assumed to be
/// made of ones and is not accessed either.
#[track_caller]
pub fn trsm<E: ComplexField>(
    side: Side,
    uplo: Uplo,
    trans: Trans,
    diag: Diag,
    alpha: E,
    a: MatRef<'_, E>,
    mut b: MatMut<'_, E>,
) {
    let (m, n) = (b.nrows(), b.ncols());
    let dim = if side == Side::Left { m } else { n };
    assert!(all(
        uplo != Uplo::General,
        a.nrows() == dim,
        a.ncols() == dim,
    ));

    // op(a) is lower triangular if exactly one of `a` being lower and `op` transposing holds
    let lower = (uplo == Uplo::Lower) == (trans == Trans::NoTrans);
    let t = |i: usize, j: usize| op_read(a, trans, i, j);
    let pivot = |i: usize, value: E| {
        if diag == Diag::Unit {
            value
        } else {
            value / t(i, i)
        }
    };

    match side {
        Side::Left => {
            for col in 0..n {
                for step in 0..m {
                    let i = if lower { step } else { m - 1 - step };
                    let mut acc = alpha * b.read(i, col);
                    let others = if lower { 0..i } else { i + 1..m };
                    for l in others {
                        acc = acc - t(i, l) * b.read(l, col);
                    }
                    b.write(i, col, pivot(i, acc));
                }
            }
        }
        Side::Right => {
            for row in 0..m {
                for step in 0..n {
                    let j = if lower { n - 1 - step } else { step };
                    let mut acc = alpha * b.read(row, j);
                    let others = if lower { j + 1..n } else { 0..j };
                    for l in others {
                        acc = acc - b.read(row, l) * t(l, j);
                    }
                    b.write(row, j, pivot(j, acc));
                }
            }
        }
    }
}

/// Nominal flop count of [`trsm`].
#[inline]
pub fn trsm_flops<E: ComplexField>(side: Side, m: usize, n: usize) -> f64 {
    let (m, n) = (m as f64, n as f64);
    super::flops::<E>(match side {
        Side::Left => n * m * m,
        Side::Right => m * n * n,
    })
}
