//! End-to-end checks of the embedding pipelines on constructed inputs.

use embed::prelude::*;
use frechet::Error as MeasureError;
use rand::prelude::*;

struct Euclidean;

impl Measure<Vec<f64>> for Euclidean {
    fn distance(&self, a: &Vec<f64>, b: &Vec<f64>) -> Result<f64, MeasureError> {
        Ok(a.iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt())
    }
}

fn average_neighbor_distance(graph: &AdjacencyGraph, neighbors: usize) -> f64 {
    let n = graph.node_count();
    let mut total = 0.0;
    for v in 0..n {
        let mut distances: Vec<f64> = graph.neighbors(v).map(|(_, d)| d).collect();
        distances.sort_by(f64::total_cmp);
        distances.truncate(neighbors);
        total += distances.iter().sum::<f64>() / distances.len() as f64;
    }
    total / n as f64
}

#[test]
fn nn_descent_matches_brute_force_on_uniform_points() {
    let mut rng = StdRng::seed_from_u64(42);
    let points = testdata::uniform_points(&mut rng, 1_000, 3);
    let neighbors = 5;

    let exact = brute_force_neighbors(&points, &Euclidean, neighbors).unwrap();
    let approximate = NnDescent::new()
        .graph(&points, &Euclidean, neighbors)
        .unwrap();

    let exact_average = average_neighbor_distance(&exact, neighbors);
    let approximate_average = average_neighbor_distance(&approximate, neighbors);

    assert!(
        approximate_average <= exact_average * 1.01,
        "average neighbor distance {approximate_average} more than 1% above {exact_average}"
    );
}

#[test]
fn isomap_unrolls_the_swiss_roll() {
    let mut rng = StdRng::seed_from_u64(1);
    let (points, _) = testdata::swiss_roll(&mut rng, 1_000);

    let mut isomap = Isomap::new(points, Euclidean, 5).unwrap();
    isomap.use_landmarks(true);
    isomap.set_landmark_count(50).unwrap();

    let quality = isomap.embedding_quality(2).unwrap();
    assert!(
        quality < 0.05,
        "swiss roll residual variance too high: {quality}"
    );
}

#[test]
fn swiss_roll_geodesics_match_the_unrolled_plane() {
    let mut rng = StdRng::seed_from_u64(5);
    let (points, unrolled) = testdata::swiss_roll(&mut rng, 800);

    let mut rolled = Isomap::new(points, Euclidean, 6).unwrap();
    rolled.use_landmarks(true);
    rolled.set_landmark_count(40).unwrap();
    let coordinates = rolled.embed(2).unwrap();

    // The 2-D embedding must correlate with the unrolled ground truth:
    // compare the pairwise distances of both on a vertex sample.
    let sample: Vec<usize> = (0..800).step_by(37).collect();
    let mut truth = Vec::new();
    let mut embedded = Vec::new();
    for (a, &i) in sample.iter().enumerate() {
        for &j in sample.iter().skip(a + 1) {
            truth.push(distance_2d(&unrolled[i], &unrolled[j]));
            embedded.push(embedded_distance(&coordinates, i, j));
        }
    }

    let residual = residual_variance(&[truth], &[embedded]);
    assert!(residual < 0.1, "embedding diverges from ground truth: {residual}");
}

fn distance_2d(a: &[f64], b: &[f64]) -> f64 {
    ((a[0] - b[0]) * (a[0] - b[0]) + (a[1] - b[1]) * (a[1] - b[1])).sqrt()
}

fn embedded_distance(coordinates: &[Vec<f64>], i: usize, j: usize) -> f64 {
    coordinates
        .iter()
        .map(|row| (row[i] - row[j]) * (row[i] - row[j]))
        .sum::<f64>()
        .sqrt()
}

#[test]
fn direct_embedder_handles_frechet_measures() {
    // A 6x6 sweep of spike curves, compared by discrete Fréchet distance.
    let curves = testdata::shifted_spikes(0.5, 0.2);
    assert_eq!(curves.len(), 36);

    let mut embedder = DirectEmbedder::new(curves, DiscreteFrechet::maximum()).unwrap();
    let coordinates = embedder.embed(2).unwrap();

    assert_eq!(coordinates.len(), 2);
    assert_eq!(coordinates[0].len(), 36);
    assert!(coordinates.iter().flatten().all(|c| c.is_finite()));

    let quality = embedder.embedding_quality(2).unwrap();
    assert!((0.0..=1.0).contains(&quality));
}

#[test]
fn isomap_handles_continuous_frechet_measures() {
    let mut rng = StdRng::seed_from_u64(9);
    let curves: Vec<Polyline> = (0..60)
        .map(|_| testdata::random_walk_polyline(&mut rng, 8, 2, 1.0))
        .collect();

    let measure = FrechetDistance::new(1e-4).unwrap();
    let mut isomap = Isomap::new(curves, measure, 4).unwrap();

    let coordinates = isomap.embed(3).unwrap();
    assert_eq!(coordinates.len(), 3);
    assert_eq!(coordinates[0].len(), 60);
    assert!(coordinates.iter().flatten().all(|c| c.is_finite()));
}

#[test]
fn landmark_counts_follow_the_growing_sample() {
    let mut rng = StdRng::seed_from_u64(3);
    let points = testdata::uniform_points(&mut rng, 300, 3);

    let mut embedder = DirectEmbedder::new(points, Euclidean).unwrap();
    embedder.use_landmarks(true);

    // Default landmark count for n = 300 is min(n, max(5, 2·√n)) = 34.
    assert_eq!(embedder.landmark_count(), 34);

    embedder.set_landmark_count(20).unwrap();
    let first = embedder.embed(3).unwrap();
    embedder.set_landmark_count(60).unwrap();
    let second = embedder.embed(3).unwrap();

    assert_eq!(first[0].len(), 300);
    assert_eq!(second[0].len(), 300);

    // At full target dimension the landmark embedding of Euclidean data
    // reproduces the distances almost exactly.
    let quality = embedder.embedding_quality(3).unwrap();
    assert!(quality < 0.01, "euclidean landmark quality: {quality}");
}
