use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use immoprice::geo::{distance_km, haversine_km, RegionReference};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_points(n: usize) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|_| (rng.gen_range(49.5..51.5), rng.gen_range(2.5..6.4)))
        .collect()
}

fn bench_haversine(c: &mut Criterion) {
    for size in [1000, 100000].iter() {
        c.bench_with_input(BenchmarkId::new("haversine_km", size), size, |b, &n| {
            let points = random_points(n);

            b.iter(|| {
                let total: f64 = points
                    .iter()
                    .map(|&(lat, lon)| haversine_km(black_box(lat), black_box(lon), 50.8466, 4.3528))
                    .sum();
                black_box(total);
            });
        });
    }
}

fn bench_distance_to_capital(c: &mut Criterion) {
    let regions = RegionReference::default();
    let names: Vec<String> = regions.regions().map(str::to_string).collect();

    for size in [1000, 100000].iter() {
        c.bench_with_input(BenchmarkId::new("distance_km", size), size, |b, &n| {
            let points = random_points(n);

            b.iter(|| {
                let mut total = 0.0;
                for (i, &(lat, lon)) in points.iter().enumerate() {
                    let region = &names[i % names.len()];
                    if let Ok(km) = distance_km(black_box(lat), black_box(lon), region, &regions) {
                        total += km;
                    }
                }
                black_box(total);
            });
        });
    }
}

criterion_group!(benches, bench_haversine, bench_distance_to_capital);
criterion_main!(benches);
