//! Classical and landmark multidimensional scaling.
//!
//! Classical MDS turns an n×n distance matrix into coordinates whose
//! pairwise Euclidean distances approximate the input: square the
//! distances, double-center them and read coordinates off the top
//! eigenpairs of the resulting Gram matrix. Landmark MDS runs the full
//! procedure on a small L×L block only and places the remaining points by
//! distance-based triangulation against the landmark eigensystem, which
//! drops the cost from O(n²) distances to O(n·L).
//!
//! [1] de Silva, Tenenbaum:
//! "Sparse multidimensional scaling using landmark points", 2004
//!
//! The sign of each output dimension is arbitrary (eigenvector sign
//! ambiguity).

use log::debug;
use nalgebra::{DMatrix, SymmetricEigen};
use rayon::prelude::*;

use crate::Error;

/// Eigenvalues below this are treated as degenerate in the landmark
/// projection: the corresponding coordinate is left at zero for
/// non-landmark points.
const MIN_PROJECTION_EIGENVALUE: f64 = 0.01;

/// Classical MDS of a symmetric n×n distance matrix with zero diagonal.
///
/// Returns coordinates in dimension-major layout: `coordinates[i][v]` is
/// the i-th coordinate of point `v`.
pub fn classical(distances: &[Vec<f64>], dimension: usize) -> Result<Vec<Vec<f64>>, Error> {
    classical_with_eigenvalues(distances, dimension).map(|(_, coordinates)| coordinates)
}

/// Classical MDS that also reports the eigenvalue of every output
/// dimension; the landmark projection needs them.
pub(crate) fn classical_with_eigenvalues(
    distances: &[Vec<f64>],
    dimension: usize,
) -> Result<(Vec<f64>, Vec<Vec<f64>>), Error> {
    let n = validate_square(distances)?;
    if dimension < 1 || dimension > n {
        return Err(Error::InvalidDimension { dimension, maximum: n });
    }

    // B = -1/2 · J · D² · J, expressed through row, column and grand means
    // of the squared distances.
    let squared = |i: usize, j: usize| distances[i][j] * distances[i][j];

    let mut row_means = vec![0.0; n];
    let mut column_means = vec![0.0; n];
    let mut grand_mean = 0.0;
    for i in 0..n {
        for j in 0..n {
            let value = squared(i, j);
            row_means[i] += value;
            column_means[j] += value;
            grand_mean += value;
        }
    }
    for mean in row_means.iter_mut().chain(column_means.iter_mut()) {
        *mean /= n as f64;
    }
    grand_mean /= (n * n) as f64;

    let gram = DMatrix::from_fn(n, n, |i, j| {
        -0.5 * (squared(i, j) - row_means[i] - column_means[j] + grand_mean)
    });

    let eigen = SymmetricEigen::new(gram);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    let mut eigenvalues = Vec::with_capacity(dimension);
    let mut coordinates = vec![vec![0.0; n]; dimension];
    for (i, &e) in order.iter().take(dimension).enumerate() {
        // Small negative eigenvalues are numerical noise of non-Euclidean
        // inputs; their dimension collapses to zero.
        let eigenvalue = eigen.eigenvalues[e].max(0.0);
        let scale = eigenvalue.sqrt();
        for v in 0..n {
            coordinates[i][v] = scale * eigen.eigenvectors[(v, e)];
        }
        eigenvalues.push(eigenvalue);
    }

    Ok((eigenvalues, coordinates))
}

/// Landmark MDS of a rectangular n×L distance matrix whose first L rows
/// are the landmark-to-landmark block.
///
/// The landmarks are embedded by classical MDS; every remaining point is
/// projected against the landmark eigensystem from its distances to the
/// landmarks. Dimensions with near-zero eigenvalue are skipped for
/// non-landmark points.
pub fn landmark(distances: &[Vec<f64>], dimension: usize) -> Result<Vec<Vec<f64>>, Error> {
    let (n, landmarks) = validate_rectangular(distances)?;

    let landmark_block: Vec<Vec<f64>> = distances[..landmarks].to_vec();
    let (eigenvalues, landmark_coordinates) =
        classical_with_eigenvalues(&landmark_block, dimension)?;

    // Column means of the squared landmark block.
    let mut column_means = vec![0.0; landmarks];
    for row in &landmark_block {
        for (j, &value) in row.iter().enumerate() {
            column_means[j] += value * value;
        }
    }
    for mean in column_means.iter_mut() {
        *mean /= landmarks as f64;
    }

    let mut coordinates = vec![vec![0.0; n]; dimension];
    for i in 0..dimension {
        coordinates[i][..landmarks].copy_from_slice(&landmark_coordinates[i][..landmarks]);
        if eigenvalues[i] < MIN_PROJECTION_EIGENVALUE {
            debug!(
                "skipping degenerate embedding dimension {i} (eigenvalue {})",
                eigenvalues[i]
            );
        }
    }

    let projected: Vec<Vec<f64>> = (landmarks..n)
        .into_par_iter()
        .map(|row| {
            (0..dimension)
                .map(|i| {
                    if eigenvalues[i] < MIN_PROJECTION_EIGENVALUE {
                        return 0.0;
                    }
                    let mut sum = 0.0;
                    for j in 0..landmarks {
                        let centered = distances[row][j] * distances[row][j] - column_means[j];
                        sum += landmark_coordinates[i][j] / eigenvalues[i] * centered;
                    }
                    -0.5 * sum
                })
                .collect()
        })
        .collect();

    for (offset, point) in projected.iter().enumerate() {
        for i in 0..dimension {
            coordinates[i][landmarks + offset] = point[i];
        }
    }

    Ok(coordinates)
}

fn validate_rectangular(distances: &[Vec<f64>]) -> Result<(usize, usize), Error> {
    let n = distances.len();
    if n == 0 {
        return Err(Error::NoElements);
    }
    let columns = distances[0].len();
    if n < columns {
        return Err(Error::TooFewRows { rows: n, columns });
    }

    for (row, values) in distances.iter().enumerate() {
        if values.len() != columns {
            return Err(Error::RaggedMatrix {
                row,
                expected: columns,
                actual: values.len(),
            });
        }
        for (column, &value) in values.iter().enumerate() {
            if value < 0.0 {
                return Err(Error::NegativeDistance { row, column, value });
            }
        }
        if row < columns && values[row] != 0.0 {
            return Err(Error::NonZeroDiagonal {
                index: row,
                value: values[row],
            });
        }
    }

    Ok((n, columns))
}

fn validate_square(distances: &[Vec<f64>]) -> Result<usize, Error> {
    let (n, columns) = validate_rectangular(distances)?;
    if n != columns {
        return Err(Error::NotSquare { rows: n, columns });
    }
    Ok(n)
}
