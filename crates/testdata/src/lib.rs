//! Constructed curve and point collections shared by tests and
//! benchmarks.

use frechet::Polyline;
use rand::prelude::*;

/// A family of spike curves whose two apex offsets sweep
/// `-range..=range` inclusively at the given step, one curve per offset
/// pair. `shifted_spikes(1.99, 0.05)` yields 80 values per sweep and
/// 6400 curves.
pub fn shifted_spikes(range: f64, step: f64) -> Vec<Polyline> {
    let offsets = |index: usize| -range + index as f64 * step;

    let mut curves = Vec::new();
    let mut i = 0;
    while offsets(i) <= range {
        let mut j = 0;
        while offsets(j) <= range {
            curves.push(spike(offsets(i), offsets(j)));
            j += 1;
        }
        i += 1;
    }
    curves
}

/// A flat curve with two unit spikes at the given horizontal offsets.
fn spike(first: f64, second: f64) -> Polyline {
    Polyline::new(vec![
        vec![-3.0, 0.0],
        vec![first, 1.0],
        vec![second, -1.0],
        vec![3.0, 0.0],
    ])
    .expect("spike vertices are well-formed")
}

/// A uniform random walk with `len` vertices, each coordinate stepping by
/// at most `step`.
pub fn random_walk_polyline(rng: &mut StdRng, len: usize, dimension: usize, step: f64) -> Polyline {
    let mut vertex = vec![0.0; dimension];
    let mut vertices = Vec::with_capacity(len.max(2));
    for _ in 0..len.max(2) {
        for coordinate in vertex.iter_mut() {
            *coordinate += rng.gen_range(-step..step);
        }
        vertices.push(vertex.clone());
    }
    Polyline::new(vertices).expect("random walk vertices are well-formed")
}

/// Uniform points in `[0, 1]^dimension`.
pub fn uniform_points(rng: &mut StdRng, n: usize, dimension: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|_| (0..dimension).map(|_| rng.gen_range(0.0..1.0)).collect())
        .collect()
}

/// The classic Swiss-roll point cloud: a 2-D strip rolled up in 3-D.
/// Returns the 3-D points together with the unrolled 2-D ground truth.
pub fn swiss_roll(rng: &mut StdRng, n: usize) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let mut points = Vec::with_capacity(n);
    let mut unrolled = Vec::with_capacity(n);

    for _ in 0..n {
        let angle = 1.5 * std::f64::consts::PI * (1.0 + 2.0 * rng.gen_range(0.0..1.0));
        let height = rng.gen_range(0.0..21.0);

        points.push(vec![angle * angle.cos(), height, angle * angle.sin()]);
        // Arc length of t·cos t / t·sin t from 0: (t·√(1+t²) + asinh t) / 2.
        let arc = (angle * (1.0 + angle * angle).sqrt() + angle.asinh()) / 2.0;
        unrolled.push(vec![arc, height]);
    }

    (points, unrolled)
}
