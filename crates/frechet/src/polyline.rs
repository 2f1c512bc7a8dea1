//! The polygonal curve value type.

use crate::Error;

/// A polygonal curve: an ordered sequence of at least two vertices in
/// d-dimensional Euclidean space, joined by line segments.
///
/// The vertex count and the dimension are fixed at construction. Vertices
/// are stored in one flat buffer; [`Polyline::vertex`] hands out immutable
/// slices into it, so callers can never alias-mutate internal storage.
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    coords: Box<[f64]>,
    dimension: usize,
}

impl Polyline {
    /// Creates a polyline from one coordinate row per vertex.
    ///
    /// Fails if fewer than two vertices are given or if the rows do not all
    /// have the same length.
    pub fn new(vertices: Vec<Vec<f64>>) -> Result<Self, Error> {
        if vertices.len() < 2 {
            return Err(Error::TooFewVertices {
                vertices: vertices.len(),
            });
        }

        let dimension = vertices[0].len();
        for (vertex, row) in vertices.iter().enumerate() {
            if row.len() != dimension {
                return Err(Error::MixedDimensions {
                    vertex,
                    expected: dimension,
                    actual: row.len(),
                });
            }
        }
        if dimension == 0 {
            return Err(Error::MixedDimensions {
                vertex: 0,
                expected: 1,
                actual: 0,
            });
        }

        let coords = vertices.into_iter().flatten().collect::<Vec<_>>();

        Ok(Self {
            coords: coords.into_boxed_slice(),
            dimension,
        })
    }

    /// Creates a polyline from a flat coordinate buffer laid out vertex by
    /// vertex.
    pub fn from_flat(coords: Vec<f64>, dimension: usize) -> Result<Self, Error> {
        if dimension == 0 || coords.len() % dimension != 0 {
            return Err(Error::MixedDimensions {
                vertex: coords.len() / dimension.max(1),
                expected: dimension,
                actual: coords.len() % dimension.max(1),
            });
        }
        let vertices = coords.len() / dimension;
        if vertices < 2 {
            return Err(Error::TooFewVertices { vertices });
        }

        Ok(Self {
            coords: coords.into_boxed_slice(),
            dimension,
        })
    }

    /// Number of vertices.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.coords.len() / self.dimension
    }

    /// Dimension of every vertex.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The coordinates of vertex `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not smaller than [`Polyline::len`].
    pub fn vertex(&self, index: usize) -> &[f64] {
        let offset = index * self.dimension;
        &self.coords[offset..offset + self.dimension]
    }

    /// Iterates over all vertices in order.
    pub fn vertices(&self) -> impl ExactSizeIterator<Item = &[f64]> {
        self.coords.chunks_exact(self.dimension)
    }

    /// The Euclidean length of the longest segment.
    pub fn longest_segment(&self) -> f64 {
        let mut longest = 0.0_f64;
        for i in 1..self.len() {
            longest = longest.max(distance(self.vertex(i - 1), self.vertex(i)));
        }
        longest
    }
}

/// Euclidean distance between two coordinate rows of equal length.
pub(crate) fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Validates that two polylines live in the same space.
pub(crate) fn check_dimensions(a: &Polyline, b: &Polyline) -> Result<(), Error> {
    if a.dimension() != b.dimension() {
        return Err(Error::DimensionMismatch {
            left: a.dimension(),
            right: b.dimension(),
        });
    }
    Ok(())
}
