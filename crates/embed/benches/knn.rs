use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion, SamplingMode};
use embed::prelude::*;
use frechet::Error;
use rand::prelude::*;

struct Euclidean;

impl Measure<Vec<f64>> for Euclidean {
    fn distance(&self, a: &Vec<f64>, b: &Vec<f64>) -> Result<f64, Error> {
        Ok(a.iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt())
    }
}

fn knn(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let points = testdata::uniform_points(&mut rng, 5_000, 3);
    let neighbors = 5;

    let mut group = c.benchmark_group("knn");
    group
        .sample_size(10)
        .measurement_time(Duration::from_secs(60))
        .sampling_mode(SamplingMode::Flat);

    group.bench_function("brute_force", |b| {
        b.iter(|| black_box(brute_force_neighbors(&points, &Euclidean, neighbors).unwrap()))
    });
    group.bench_function("nn_descent", |b| {
        b.iter(|| {
            let mut descent = NnDescent::new();
            black_box(descent.graph(&points, &Euclidean, neighbors).unwrap())
        })
    });

    group.finish();
}

criterion_group!(benches, knn);
criterion_main!(benches);
