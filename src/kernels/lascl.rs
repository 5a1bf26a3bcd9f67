use crate::{
    assert,
    mat::MatMut,
    scalar::{ComplexField, RealField},
    Uplo,
};
use num_traits::{One, Zero};
use reborrow::*;

/// Multiplies the `uplo` part of `a` by `cto / cfrom`.
///
/// The scaling is done in steps that never overflow or underflow, so that the result is exact
/// whenever `a * cto / cfrom` is representable. `cfrom` must be nonzero, and neither value may be
/// NaN.
#[track_caller]
pub fn lascl<E: ComplexField>(uplo: Uplo, cfrom: E::Real, cto: E::Real, mut a: MatMut<'_, E>) {
    let zero = E::Real::zero();
    assert!(all(cfrom != zero, !cfrom.is_nan(), !cto.is_nan()));

    let small = E::Real::safe_min();
    let big = E::Real::one() / small;
    let (mut cfromc, mut ctoc) = (cfrom, cto);

    loop {
        let cfrom1 = cfromc * small;
        let (mul, done) = if cfrom1 == cfromc {
            // cfromc is infinite, the ratio is a signed zero or NaN
            (ctoc / cfromc, true)
        } else {
            let cto1 = ctoc / big;
            if cto1 == ctoc {
                // ctoc is zero or infinite
                let mul = ctoc;
                cfromc = E::Real::one();
                (mul, true)
            } else if cfrom1.abs() > ctoc.abs() && ctoc != zero {
                cfromc = cfrom1;
                (small, false)
            } else if cto1.abs() > cfromc.abs() {
                ctoc = cto1;
                (big, false)
            } else {
                (ctoc / cfromc, true)
            }
        };

        if done && mul == E::Real::one() {
            return;
        }
        scale_part(uplo, mul, a.rb_mut());
        if done {
            return;
        }
    }
}

fn scale_part<E: ComplexField>(uplo: Uplo, mul: E::Real, mut a: MatMut<'_, E>) {
    let (m, n) = (a.nrows(), a.ncols());
    for j in 0..n {
        let rows = match uplo {
            Uplo::General => 0..m,
            Uplo::Upper => 0..Ord::min(j + 1, m),
            Uplo::Lower => Ord::min(j, m)..m,
        };
        for i in rows {
            let value = a.read(i, j).scale_real(mul);
            a.write(i, j, value);
        }
    }
}
