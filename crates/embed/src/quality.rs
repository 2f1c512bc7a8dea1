//! Embedding-quality metric: residual variance between two distance
//! matrices.

/// Pearson correlation of the flattened matrices. Degenerate input with
/// zero variance correlates to 0.
pub fn pearson_correlation(a: &[Vec<f64>], b: &[Vec<f64>]) -> f64 {
    let values = || a.iter().flatten().zip(b.iter().flatten());
    let count = values().count();
    if count == 0 {
        return 0.0;
    }

    let (mut mean_a, mut mean_b) = (0.0, 0.0);
    for (&x, &y) in values() {
        mean_a += x;
        mean_b += y;
    }
    mean_a /= count as f64;
    mean_b /= count as f64;

    let (mut covariance, mut variance_a, mut variance_b) = (0.0, 0.0, 0.0);
    for (&x, &y) in values() {
        covariance += (x - mean_a) * (y - mean_b);
        variance_a += (x - mean_a) * (x - mean_a);
        variance_b += (y - mean_b) * (y - mean_b);
    }

    if variance_a == 0.0 || variance_b == 0.0 {
        return 0.0;
    }

    covariance / (variance_a * variance_b).sqrt()
}

/// `1 − r²` of the flattened matrices: 0 for perfectly correlated
/// distances, 1 for uncorrelated ones. Lower is better.
pub fn residual_variance(a: &[Vec<f64>], b: &[Vec<f64>]) -> f64 {
    let r = pearson_correlation(a, b);
    1.0 - r * r
}
