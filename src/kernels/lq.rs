//! LQ tile kernels.
//!
//! The `i`-th elementary reflector of a tile is `H_i = I - tau_i * v_i * v_i^H`, where `v_i` is
//! zero before position `i`, one at position `i`, and holds the conjugate of the `i`-th row of the
//! tile after it. `tau_i` is stored at position `(i % ib, i)` of the `T` tile.
//!
//! The unitary factor of the tile is `Q = H_{k-1}^H * ... * H_1^H * H_0^H`, so that `A = L * Q`.

use super::gemm::scale;
use crate::{
    assert,
    mat::{temp_mat_req, temp_mat_zeroed, MatMut, MatRef},
    scalar::{ComplexField, RealField},
    Side, Trans,
};
use dyn_stack::{PodStack, SizeOverflow, StackReq};
use reborrow::*;

/// Computes the reflector that maps `[head, tail]` to `[beta, 0]`.
///
/// Returns `(tau, beta, tail_scale)`, where `tail_scale` is the factor that turns `tail` into the
/// tail of the reflector.
fn make_householder<E: ComplexField>(head: E, tail_norm: E::Real) -> (E::Real, E, E) {
    let zero = <E::Real as num_traits::Zero>::zero();
    let one = <E::Real as num_traits::One>::one();
    if tail_norm == zero {
        return (zero, head, E::zero());
    }

    let head_norm = head.abs();
    let norm = head_norm.hypot(tail_norm);
    let sign = if head_norm != zero {
        head.scale_real(one / head_norm)
    } else {
        E::one()
    };

    let signed_norm = sign.scale_real(norm);
    let head_with_beta_inv = E::one() / (head + signed_norm);
    let half_inv_tau =
        E::Real::from_f64(0.5) * (one + (tail_norm * head_with_beta_inv.abs()).abs2());
    (one / half_inv_tau, -signed_norm, head_with_beta_inv)
}

#[inline]
fn row_norm<E: ComplexField>(a: MatRef<'_, E>, i: usize, cols: core::ops::Range<usize>) -> E::Real {
    let mut acc = <E::Real as num_traits::Zero>::zero();
    for l in cols {
        acc = acc + a.read(i, l).abs2();
    }
    acc.sqrt()
}

/// Computes the LQ factorization of the tile `a`, in place.
///
/// On exit, the lower trapezoid of `a` holds `L` and the rows of the strict upper trapezoid hold
/// the reflectors. The reflector scalars are stored in `t`.
#[track_caller]
pub fn gelqt<E: ComplexField>(ib: usize, mut a: MatMut<'_, E>, mut t: MatMut<'_, E>) {
    let (m, n) = (a.nrows(), a.ncols());
    let k = Ord::min(m, n);
    assert!(all(ib > 0, t.nrows() >= Ord::min(ib, k), t.ncols() >= k));

    for i in 0..k {
        let head = a.read(i, i).conj();
        let tail_norm = row_norm(a.rb(), i, i + 1..n);
        let (tau, beta, tail_scale) = make_householder(head, tail_norm);

        let stored_scale = tail_scale.conj();
        for l in i + 1..n {
            let value = a.read(i, l) * stored_scale;
            a.write(i, l, value);
        }
        a.write(i, i, beta.conj());
        t.write(i % ib, i, E::from_real(tau));

        // apply H_i to the remaining rows from the right
        for p in i + 1..m {
            let mut w = a.read(p, i);
            for l in i + 1..n {
                w = w + a.read(p, l) * a.read(i, l).conj();
            }
            let w = w.scale_real(tau);
            let value = a.read(p, i) - w;
            a.write(p, i, value);
            for l in i + 1..n {
                let value = a.read(p, l) - w * a.read(i, l);
                a.write(p, l, value);
            }
        }
    }
}

/// Computes the LQ factorization of `[a1, a2]`, where `a1` is lower triangular, in place.
///
/// On exit, `a1` holds `L` and the rows of `a2` hold the tails of the reflectors. The reflector
/// scalars are stored in `t`.
#[track_caller]
pub fn tslqt<E: ComplexField>(
    ib: usize,
    mut a1: MatMut<'_, E>,
    mut a2: MatMut<'_, E>,
    mut t: MatMut<'_, E>,
) {
    let m = a1.nrows();
    let n2 = a2.ncols();
    assert!(all(
        ib > 0,
        a1.ncols() >= m,
        a2.nrows() == m,
        t.nrows() >= Ord::min(ib, m),
        t.ncols() >= m,
    ));

    for i in 0..m {
        let head = a1.read(i, i).conj();
        let tail_norm = row_norm(a2.rb(), i, 0..n2);
        let (tau, beta, tail_scale) = make_householder(head, tail_norm);

        let stored_scale = tail_scale.conj();
        for l in 0..n2 {
            let value = a2.read(i, l) * stored_scale;
            a2.write(i, l, value);
        }
        a1.write(i, i, beta.conj());
        t.write(i % ib, i, E::from_real(tau));

        for p in i + 1..m {
            let mut w = a1.read(p, i);
            for l in 0..n2 {
                w = w + a2.read(p, l) * a2.read(i, l).conj();
            }
            let w = w.scale_real(tau);
            let value = a1.read(p, i) - w;
            a1.write(p, i, value);
            for l in 0..n2 {
                let value = a2.read(p, l) - w * a2.read(i, l);
                a2.write(p, l, value);
            }
        }
    }
}

/// Order in which the reflectors are applied, and the scalar of each reflector.
#[inline]
fn schedule(side: Side, trans: Trans, k: usize) -> (impl Iterator<Item = usize>, bool) {
    let forward = matches!(
        (side, trans),
        (Side::Left, Trans::NoTrans) | (Side::Right, Trans::ConjTrans | Trans::Trans)
    );
    let order = (0..k).map(move |step| if forward { step } else { k - 1 - step });
    (order, trans == Trans::NoTrans)
}

#[inline]
fn reflector_scalar<E: ComplexField>(t: MatRef<'_, E>, ib: usize, i: usize, conj: bool) -> E {
    let tau = t.read(i % ib, i);
    if conj {
        tau.conj()
    } else {
        tau
    }
}

/// Returns the stack requirements of [`unmlq`] for a `c` of dimensions `m × n`.
#[inline]
pub fn unmlq_req<E: ComplexField>(
    side: Side,
    m: usize,
    n: usize,
) -> Result<StackReq, SizeOverflow> {
    match side {
        Side::Left => temp_mat_req::<E>(n, 1),
        Side::Right => temp_mat_req::<E>(m, 1),
    }
}

/// Returns the stack requirements of [`tsmlq`] for a `c1` of dimensions `m × n`.
#[inline]
pub fn tsmlq_req<E: ComplexField>(
    side: Side,
    m: usize,
    n: usize,
) -> Result<StackReq, SizeOverflow> {
    unmlq_req::<E>(side, m, n)
}

/// Overwrites `c` with `Q * c`, `Q^H * c`, `c * Q` or `c * Q^H`, where `Q` is the unitary factor of
/// an LQ factorization computed by [`gelqt`], given by the reflectors in `v` and the scalars in
/// `t`.
#[track_caller]
pub fn unmlq<E: ComplexField>(
    side: Side,
    trans: Trans,
    ib: usize,
    v: MatRef<'_, E>,
    t: MatRef<'_, E>,
    mut c: MatMut<'_, E>,
    stack: PodStack<'_>,
) {
    let nq = v.ncols();
    let k = Ord::min(v.nrows(), nq);
    let (m, n) = (c.nrows(), c.ncols());
    assert!(all(
        ib > 0,
        t.ncols() >= k,
        if side == Side::Left { m == nq } else { n == nq },
    ));

    let (order, conj) = schedule(side, trans, k);
    let len = if side == Side::Left { n } else { m };
    let (mut w, _) = temp_mat_zeroed::<E>(len, 1, stack);

    for i in order {
        let tau = reflector_scalar(t, ib, i, conj);
        match side {
            Side::Left => {
                for j in 0..n {
                    let mut acc = c.read(i, j);
                    for l in i + 1..nq {
                        acc = acc + v.read(i, l) * c.read(l, j);
                    }
                    w.write(j, 0, tau * acc);
                }
                for j in 0..n {
                    let wj = w.read(j, 0);
                    let value = c.read(i, j) - wj;
                    c.write(i, j, value);
                    for l in i + 1..nq {
                        let value = c.read(l, j) - v.read(i, l).conj() * wj;
                        c.write(l, j, value);
                    }
                }
            }
            Side::Right => {
                for r in 0..m {
                    let mut acc = c.read(r, i);
                    for l in i + 1..nq {
                        acc = acc + c.read(r, l) * v.read(i, l).conj();
                    }
                    w.write(r, 0, tau * acc);
                }
                for r in 0..m {
                    let wr = w.read(r, 0);
                    let value = c.read(r, i) - wr;
                    c.write(r, i, value);
                    for l in i + 1..nq {
                        let value = c.read(r, l) - wr * v.read(i, l);
                        c.write(r, l, value);
                    }
                }
            }
        }
    }
}

/// Applies the unitary factor computed by [`tslqt`] to the pair `(c1, c2)`, stacked vertically
/// for [`Side::Left`] and horizontally for [`Side::Right`].
///
/// `v` holds the tails of the reflectors, as left in `a2` by [`tslqt`], and `t` their scalars.
#[track_caller]
pub fn tsmlq<E: ComplexField>(
    side: Side,
    trans: Trans,
    ib: usize,
    mut c1: MatMut<'_, E>,
    mut c2: MatMut<'_, E>,
    v: MatRef<'_, E>,
    t: MatRef<'_, E>,
    stack: PodStack<'_>,
) {
    let k = v.nrows();
    let n2 = v.ncols();
    let (m, n) = (c1.nrows(), c1.ncols());
    assert!(all(ib > 0, t.ncols() >= k));
    match side {
        Side::Left => assert!(all(m >= k, c2.nrows() == n2, c2.ncols() == n)),
        Side::Right => assert!(all(n >= k, c2.ncols() == n2, c2.nrows() == m)),
    }

    let (order, conj) = schedule(side, trans, k);
    let len = if side == Side::Left { n } else { m };
    let (mut w, _) = temp_mat_zeroed::<E>(len, 1, stack);

    for i in order {
        let tau = reflector_scalar(t, ib, i, conj);
        match side {
            Side::Left => {
                for j in 0..n {
                    let mut acc = c1.read(i, j);
                    for l in 0..n2 {
                        acc = acc + v.read(i, l) * c2.read(l, j);
                    }
                    w.write(j, 0, tau * acc);
                }
                for j in 0..n {
                    let wj = w.read(j, 0);
                    let value = c1.read(i, j) - wj;
                    c1.write(i, j, value);
                    for l in 0..n2 {
                        let value = c2.read(l, j) - v.read(i, l).conj() * wj;
                        c2.write(l, j, value);
                    }
                }
            }
            Side::Right => {
                for r in 0..m {
                    let mut acc = c1.read(r, i);
                    for l in 0..n2 {
                        acc = acc + c2.read(r, l) * v.read(i, l).conj();
                    }
                    w.write(r, 0, tau * acc);
                }
                for r in 0..m {
                    let wr = w.read(r, 0);
                    let value = c1.read(r, i) - wr;
                    c1.write(r, i, value);
                    for l in 0..n2 {
                        let value = c2.read(r, l) - wr * v.read(i, l);
                        c2.write(r, l, value);
                    }
                }
            }
        }
    }
}

/// Sets the strict upper trapezoid of `a` to zero, leaving `L`.
pub fn zero_upper<E: ComplexField>(mut a: MatMut<'_, E>) {
    let m = a.nrows();
    for j in 1..a.ncols() {
        let rows = Ord::min(j, m);
        scale(E::zero(), a.rb_mut().submatrix_mut(0, j, rows, 1));
    }
}

/// Nominal flop count of [`gelqt`].
#[inline]
pub fn gelqt_flops<E: ComplexField>(m: usize, n: usize) -> f64 {
    let (m, n) = (m as f64, n as f64);
    let k = f64::min(m, n);
    super::flops::<E>(2.0 * k * k * f64::max(m, n) - 2.0 * k * k * k / 3.0)
}

/// Nominal flop count of [`tslqt`].
#[inline]
pub fn tslqt_flops<E: ComplexField>(m: usize, n2: usize) -> f64 {
    super::flops::<E>(2.0 * m as f64 * m as f64 * n2 as f64)
}

/// Nominal flop count of [`unmlq`] and [`tsmlq`].
#[inline]
pub fn unmlq_flops<E: ComplexField>(m: usize, n: usize, k: usize) -> f64 {
    super::flops::<E>(4.0 * m as f64 * n as f64 * k as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;
    use crate::{c64, kernels::tests::*};
    use dyn_stack::GlobalPodBuffer;

    fn stack_for(req: Result<StackReq, SizeOverflow>) -> GlobalPodBuffer {
        GlobalPodBuffer::new(req.unwrap())
    }

    fn identity(n: usize) -> Vec<c64> {
        let mut out = vec![c64::new(0.0, 0.0); n * n];
        for i in 0..n {
            out[i + i * n] = c64::new(1.0, 0.0);
        }
        out
    }

    #[test]
    fn gelqt_then_unmlq_recovers_l() {
        let (m, n, ib) = (3, 5, 2);
        let a0 = random::<c64>(&mut rng(), m * n);
        let mut a = a0.clone();
        let mut t = vec![c64::new(0.0, 0.0); ib * n];
        gelqt(
            ib,
            MatMut::from_column_major_slice_mut(&mut a, m, n, m),
            MatMut::from_column_major_slice_mut(&mut t, ib, n, ib),
        );

        // a0 * Q^H = [L, 0]
        let mut c = a0.clone();
        let mut mem = stack_for(unmlq_req::<c64>(Side::Right, m, n));
        unmlq(
            Side::Right,
            Trans::ConjTrans,
            ib,
            MatRef::from_column_major_slice(&a, m, n, m),
            MatRef::from_column_major_slice(&t, ib, n, ib),
            MatMut::from_column_major_slice_mut(&mut c, m, n, m),
            PodStack::new(&mut mem),
        );

        let mut l = a.clone();
        zero_upper(MatMut::from_column_major_slice_mut(&mut l, m, n, m));
        assert!(max_diff(&c, &l) < 1e-12);
    }

    #[test]
    fn q_is_unitary_on_both_sides() {
        let (k, nq, ib) = (3, 4, 3);
        let mut a = random::<c64>(&mut rng(), k * nq);
        let mut t = vec![c64::new(0.0, 0.0); ib * nq];
        gelqt(
            ib,
            MatMut::from_column_major_slice_mut(&mut a, k, nq, k),
            MatMut::from_column_major_slice_mut(&mut t, ib, nq, ib),
        );
        let v = MatRef::from_column_major_slice(&a, k, nq, k);
        let t = MatRef::from_column_major_slice(&t, ib, nq, ib);

        // q = Q * I, then q^H * q = Q^H * q = I
        let mut mem = stack_for(unmlq_req::<c64>(Side::Left, nq, nq));
        let mut q = identity(nq);
        unmlq(
            Side::Left,
            Trans::NoTrans,
            ib,
            v,
            t,
            MatMut::from_column_major_slice_mut(&mut q, nq, nq, nq),
            PodStack::new(&mut mem),
        );
        let mut qhq = q.clone();
        unmlq(
            Side::Left,
            Trans::ConjTrans,
            ib,
            v,
            t,
            MatMut::from_column_major_slice_mut(&mut qhq, nq, nq, nq),
            PodStack::new(&mut mem),
        );
        assert!(max_diff(&qhq, &identity(nq)) < 1e-12);

        // I * Q must be the same matrix as Q * I
        let mut iq = identity(nq);
        unmlq(
            Side::Right,
            Trans::NoTrans,
            ib,
            v,
            t,
            MatMut::from_column_major_slice_mut(&mut iq, nq, nq, nq),
            PodStack::new(&mut mem),
        );
        assert!(max_diff(&iq, &q) < 1e-12);
    }

    #[test]
    fn tslqt_then_tsmlq_recovers_l() {
        let (m, n2, ib) = (3, 4, 2);
        let mut rng = rng();
        // a1 is lower triangular
        let mut a1 = random::<c64>(&mut rng, m * m);
        zero_upper(MatMut::from_column_major_slice_mut(&mut a1, m, m, m));
        let a2 = random::<c64>(&mut rng, m * n2);
        let (a1_0, a2_0) = (a1.clone(), a2.clone());

        let mut a2 = a2;
        let mut t = vec![c64::new(0.0, 0.0); ib * m];
        tslqt(
            ib,
            MatMut::from_column_major_slice_mut(&mut a1, m, m, m),
            MatMut::from_column_major_slice_mut(&mut a2, m, n2, m),
            MatMut::from_column_major_slice_mut(&mut t, ib, m, ib),
        );

        // [a1_0, a2_0] * Q^H = [L, 0]
        let (mut c1, mut c2) = (a1_0, a2_0);
        let mut mem = stack_for(tsmlq_req::<c64>(Side::Right, m, m));
        tsmlq(
            Side::Right,
            Trans::ConjTrans,
            ib,
            MatMut::from_column_major_slice_mut(&mut c1, m, m, m),
            MatMut::from_column_major_slice_mut(&mut c2, m, n2, m),
            MatRef::from_column_major_slice(&a2, m, n2, m),
            MatRef::from_column_major_slice(&t, ib, m, ib),
            PodStack::new(&mut mem),
        );
        let mut l = a1.clone();
        zero_upper(MatMut::from_column_major_slice_mut(&mut l, m, m, m));
        assert!(max_diff(&c1, &l) < 1e-12);
        assert!(max_diff(&c2, &vec![c64::new(0.0, 0.0); m * n2]) < 1e-12);

        // left application followed by its inverse is the identity
        let b0 = random::<c64>(&mut rng, (m + n2) * 2);
        let (mut b1, mut b2) = (b0[..m * 2].to_vec(), b0[m * 2..].to_vec());
        for trans in [Trans::NoTrans, Trans::ConjTrans] {
            let mut mem = stack_for(tsmlq_req::<c64>(Side::Left, m, 2));
            tsmlq(
                Side::Left,
                trans,
                ib,
                MatMut::from_column_major_slice_mut(&mut b1, m, 2, m),
                MatMut::from_column_major_slice_mut(&mut b2, n2, 2, n2),
                MatRef::from_column_major_slice(&a2, m, n2, m),
                MatRef::from_column_major_slice(&t, ib, m, ib),
                PodStack::new(&mut mem),
            );
        }
        assert!(max_diff(&b1, &b0[..m * 2]) < 1e-12);
        assert!(max_diff(&b2, &b0[m * 2..]) < 1e-12);
    }
}
