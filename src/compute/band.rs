use super::tile;
use crate::{
    desc::{ColMajorMut, ColMajorRef, TileMatrix},
    runtime::Region,
    scalar::ComplexField,
    tile_ops, Request, Sequence,
};

/// Submits the copy of the LAPACK band array `src` into the band descriptor `a`.
///
/// Only the tiles in [`band_row_range`](crate::desc::TileDesc::band_row_range) of each tile column
/// are touched. Their out-of-band elements are set to zero.
pub fn pb2desc<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    src: ColMajorRef<'env, E>,
    a: &'env TileMatrix<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    if seq.is_failed() {
        return;
    }
    let desc = *a.desc();
    for n in 0..desc.nt() {
        if seq.is_failed() {
            return;
        }
        for m in desc.band_row_range(n) {
            tile_ops::copy::band_to_tile(
                region,
                desc,
                m,
                n,
                src.band_tile(&desc, m, n),
                tile(a, m, n),
                seq,
                req,
            );
        }
    }
}

/// Submits the copy of the band descriptor `a` back into the LAPACK band array `dst`. Only the
/// in-band elements of `dst` are written.
pub fn desc2pb<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    a: &'env TileMatrix<E>,
    dst: &'env ColMajorMut<'env, E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    if seq.is_failed() {
        return;
    }
    let desc = *a.desc();
    for n in 0..desc.nt() {
        if seq.is_failed() {
            return;
        }
        for m in desc.band_row_range(n) {
            tile_ops::copy::tile_to_band(
                region,
                desc,
                m,
                n,
                tile(a, m, n),
                dst.band_tile(&desc, m, n),
                seq,
                req,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assert,
        desc::Shape,
        runtime::{run, run_traced, Access},
        Context, Uplo,
    };

    #[test]
    fn traversal_stays_inside_the_band() {
        let ctx = Context::sequential();
        let (n, nb) = (10, 3);
        for (uplo, kl, ku) in [
            (Uplo::Lower, 4, 4),
            (Uplo::Upper, 2, 2),
            (Uplo::General, 1, 2),
        ] {
            let shape = Shape::Band { uplo, kl, ku };
            let a = TileMatrix::<f64>::try_new(nb, nb, n, n, shape).unwrap();
            let ldab = match uplo {
                Uplo::General => 2 * kl + ku + 1,
                Uplo::Upper => ku + 1,
                Uplo::Lower => kl + 1,
            };
            let mut data = vec![0.0; ldab * n];
            let seq = Sequence::new();
            let req = Request::new();

            let (a, seq, req) = (&a, &seq, &req);
            let buf = ColMajorMut::new(&mut data, ldab, n, ldab);
            let buf = &buf;
            let (_, trace) = run_traced(&ctx, |region| {
                pb2desc(region, buf.as_ref(), a, seq, req);
                desc2pb(region, a, buf, seq, req);
            });
            assert!(seq.status() == Ok(()));

            let desc = a.desc();
            let mut touched: Vec<(usize, usize)> = trace
                .iter()
                .flat_map(|record| record.tiles.iter())
                .filter(|(key, access)| key.desc == desc.id() && *access != Access::Scratch)
                .map(|(key, _)| (key.m, key.n))
                .collect();
            touched.sort_unstable();
            touched.dedup();
            let expected: Vec<(usize, usize)> = (0..desc.nt())
                .flat_map(|j| desc.band_row_range(j).map(move |m| (m, j)))
                .collect();
            let mut expected_sorted = expected.clone();
            expected_sorted.sort_unstable();
            assert!(touched == expected_sorted);
            assert!(trace.len() == 2 * expected.len());

            // every touched tile intersects the band
            let (above, below) = match uplo {
                Uplo::General => ((ku + kl) as isize, kl as isize),
                Uplo::Upper => (ku as isize, 0),
                Uplo::Lower => (0, kl as isize),
            };
            for (m, j) in touched {
                assert!(desc.is_stored(m, j));
                let nb = nb as isize;
                let (m, j) = (m as isize, j as isize);
                let min_diff = m * nb - ((j + 1) * nb - 1);
                let max_diff = (m + 1) * nb - 1 - j * nb;
                assert!(all(min_diff <= below, max_diff >= -above));
            }
        }
    }

    #[test]
    fn band_round_trip_is_exact() {
        let ctx = Context::sequential();
        let (n, kd, nb) = (9, 2, 4);
        for uplo in [Uplo::Lower, Uplo::Upper] {
            let ldab = kd + 2;
            let original: Vec<f64> = (0..ldab * n).map(|x| x as f64 * 0.37 - 3.0).collect();
            let shape = Shape::Band { uplo, kl: kd, ku: kd };
            let a = TileMatrix::<f64>::try_new(nb, nb, n, n, shape).unwrap();

            let mut data = vec![f64::NAN; ldab * n];
            let seq = Sequence::new();
            let req = Request::new();
            let (a, seq, req) = (&a, &seq, &req);
            let src = ColMajorRef::new(&original, ldab, n, ldab);
            let dst = ColMajorMut::new(&mut data, ldab, n, ldab);
            let dst = &dst;
            run(&ctx, |region| {
                pb2desc(region, src, a, seq, req);
                desc2pb(region, a, dst, seq, req);
            });
            assert!(seq.status() == Ok(()));

            // in-band positions of the band array are restored, the others are left alone
            for j in 0..n {
                for r in 0..ldab {
                    let i = match uplo {
                        Uplo::Upper => (r + j) as isize - kd as isize,
                        _ => (r + j) as isize,
                    };
                    let stored = r <= kd && i >= 0 && (i as usize) < n;
                    let value = data[r + j * ldab];
                    if stored {
                        assert!(value == original[r + j * ldab]);
                    } else {
                        assert!(value.is_nan());
                    }
                }
            }
        }
    }
}
