use crate::{
    assert,
    mat::MatMut,
    scalar::{ComplexField, RealField},
    Uplo,
};

/// Computes the Cholesky factor of the Hermitian positive definite matrix stored in the `uplo`
/// triangle of `a`, in place: `a = l * l^H` for [`Uplo::Lower`], `a = u^H * u` for
/// [`Uplo::Upper`].
///
/// # Errors
/// Returns the 1-based order of the first leading minor that is not positive definite. The
/// factorization is left incomplete in that case.
#[track_caller]
pub fn potrf<E: ComplexField>(uplo: Uplo, mut a: MatMut<'_, E>) -> Result<(), usize> {
    let n = a.nrows();
    assert!(all(uplo != Uplo::General, a.ncols() == n));
    let zero = <E::Real as num_traits::Zero>::zero();

    // the upper factor is the conjugate transpose of the lower one
    let get = |a: &MatMut<'_, E>, i: usize, j: usize| match uplo {
        Uplo::Lower => a.read(i, j),
        _ => a.read(j, i).conj(),
    };
    let set = |a: &mut MatMut<'_, E>, i: usize, j: usize, value: E| match uplo {
        Uplo::Lower => a.write(i, j, value),
        _ => a.write(j, i, value.conj()),
    };

    for j in 0..n {
        let mut d = get(&a, j, j).real();
        for l in 0..j {
            d = d - get(&a, j, l).abs2();
        }
        if !(d > zero) {
            return Err(j + 1);
        }
        let d = d.sqrt();
        set(&mut a, j, j, E::from_real(d));

        let inv = <E::Real as num_traits::One>::one() / d;
        for i in j + 1..n {
            let mut acc = get(&a, i, j);
            for l in 0..j {
                acc = acc - get(&a, i, l) * get(&a, j, l).conj();
            }
            set(&mut a, i, j, acc.scale_real(inv));
        }
    }
    Ok(())
}

/// Nominal flop count of [`potrf`].
#[inline]
pub fn potrf_flops<E: ComplexField>(n: usize) -> f64 {
    let n = n as f64;
    super::flops::<E>(n * n * n / 3.0)
}
