use criterion::{criterion_group, criterion_main, Criterion};
use rand::prelude::*;

use tessera::{api, c64, Context, Parallelism, TileParams, Trans, Uplo};

fn random(rng: &mut StdRng, len: usize) -> Vec<c64> {
    (0..len)
        .map(|_| c64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
        .collect()
}

fn contexts() -> Vec<(&'static str, Context)> {
    let params = TileParams { nb: 128, ib: 32 };
    vec![
        ("st", Context::new(params, Parallelism::None).unwrap()),
        ("mt", Context::new(params, Parallelism::Rayon(0)).unwrap()),
    ]
}

pub fn her2k(c: &mut Criterion) {
    let rng = &mut StdRng::seed_from_u64(0);
    for n in [256, 512, 1024] {
        let k = n / 2;
        let a = random(rng, n * k);
        let b = random(rng, n * k);
        let mut mat = random(rng, n * n);
        let alpha = c64::new(1.0, 0.5);

        for (name, ctx) in contexts() {
            c.bench_function(&format!("tessera-{name}-her2k-{n}"), |bencher| {
                bencher.iter(|| {
                    let (uplo, trans) = (Uplo::Lower, Trans::NoTrans);
                    api::her2k(&ctx, uplo, trans, n, k, alpha, &a, n, &b, n, 0.5, &mut mat, n)
                        .unwrap();
                })
            });
        }
    }
}

pub fn pbsv(c: &mut Criterion) {
    let rng = &mut StdRng::seed_from_u64(0);
    for (n, kd) in [(1024, 64), (4096, 128)] {
        let ldab = kd + 1;
        // diagonally dominant lower band
        let mut band = random(rng, ldab * n);
        for j in 0..n {
            band[j * ldab] = c64::new(4.0 * kd as f64, 0.0);
        }
        let rhs = random(rng, n * 8);

        for (name, ctx) in contexts() {
            c.bench_function(&format!("tessera-{name}-pbsv-{n}-{kd}"), |bencher| {
                bencher.iter(|| {
                    let mut ab = band.clone();
                    let mut x = rhs.clone();
                    api::pbsv(&ctx, Uplo::Lower, n, kd, 8, &mut ab, ldab, &mut x, n).unwrap();
                })
            });
        }
    }
}

criterion_group!(benches, her2k, pbsv);
criterion_main!(benches);
