//! Embedder orchestration: direct and Isomap embeddings of element
//! collections.
//!
//! Both embedders share the same frame: the elements are copied and
//! shuffled once by a fixed internal permutation, so that "the first L
//! elements" always is a uniform random landmark sample and growing L
//! strictly extends it. A subclass-specific required-distance matrix
//! (n×S, where S is the landmark count or n) is fed into classical or
//! landmark MDS and the resulting coordinates are mapped back to the
//! caller's element order.
//!
//! Intermediate results are cached per instance: the direct embedder keeps
//! its distance matrix and grows it column-wise on demand, Isomap keeps
//! its NN-descent state and its geodesic matrix. Tuning a parameter
//! invalidates exactly the caches it affects.

use log::info;
use nanorand::Rng;
use rayon::prelude::*;
use std::time::Instant;

use frechet::Measure;

use crate::components::ConnectedComponents;
use crate::knn::check_neighbor_count;
use crate::mds;
use crate::nn_descent::NnDescent;
use crate::quality::residual_variance;
use crate::shortest_paths::{floyd_warshall, multi_source_distances};
use crate::Error;

/// Below this element count, and only when distances from every vertex are
/// required anyway, Floyd-Warshall beats the per-source Dijkstra sweeps.
const FLOYD_WARSHALL_CUTOFF: usize = 210;

/// Anything that can place its elements in ℝᵈ.
pub trait Embedder<T> {
    /// The embedding as a `dimension × n` matrix: `coordinates[i][v]` is
    /// the i-th coordinate of element `v`, in input order.
    fn embed(&mut self, dimension: usize) -> Result<Vec<Vec<f64>>, Error>;

    /// Residual variance between the distances the embedding was computed
    /// from and the Euclidean distances it realizes; in `[0, 1]`, lower is
    /// better.
    fn embedding_quality(&mut self, dimension: usize) -> Result<f64, Error>;
}

/// State shared by all embedders: permuted elements, measure and landmark
/// configuration.
struct EmbedderBase<T, M> {
    elements: Vec<T>,
    /// `permutation[i]` is the input index of permuted element `i`.
    permutation: Vec<usize>,
    measure: M,
    landmark_count: usize,
    use_landmarks: bool,
}

impl<T, M> EmbedderBase<T, M>
where
    M: Measure<T>,
{
    fn new(elements: Vec<T>, measure: M) -> Result<Self, Error> {
        if elements.is_empty() {
            return Err(Error::NoElements);
        }
        let n = elements.len();

        let mut permutation: Vec<usize> = (0..n).collect();
        let mut rng = nanorand::tls_rng();
        for i in (1..n).rev() {
            let j = rng.generate_range(0..=i);
            permutation.swap(i, j);
        }

        let mut rank = vec![0; n];
        for (position, &source) in permutation.iter().enumerate() {
            rank[source] = position;
        }
        let mut tagged: Vec<(usize, T)> = elements.into_iter().enumerate().collect();
        tagged.sort_by_key(|(index, _)| rank[*index]);
        let elements: Vec<T> = tagged.into_iter().map(|(_, element)| element).collect();

        Ok(Self {
            elements,
            permutation,
            measure,
            landmark_count: default_landmark_count(n),
            use_landmarks: false,
        })
    }

    fn len(&self) -> usize {
        self.elements.len()
    }

    /// How many columns the required-distance matrix has.
    fn starting_points(&self) -> usize {
        if self.use_landmarks {
            self.landmark_count
        } else {
            self.len()
        }
    }

    fn set_landmark_count(&mut self, landmarks: usize) -> Result<(), Error> {
        if landmarks < 2 || landmarks > self.len() {
            return Err(Error::InvalidLandmarkCount {
                landmarks,
                node_count: self.len(),
            });
        }
        self.landmark_count = landmarks;
        Ok(())
    }

    fn embed_from(&self, required: &[Vec<f64>], dimension: usize) -> Result<Vec<Vec<f64>>, Error> {
        if self.use_landmarks {
            mds::landmark(required, dimension)
        } else {
            mds::classical(required, dimension)
        }
    }

    /// Maps dimension-major coordinates from permuted back to input order.
    fn unpermute(&self, coordinates: Vec<Vec<f64>>) -> Vec<Vec<f64>> {
        let n = self.len();
        coordinates
            .into_iter()
            .map(|row| {
                let mut unpermuted = vec![0.0; n];
                for (v, value) in row.into_iter().enumerate() {
                    unpermuted[self.permutation[v]] = value;
                }
                unpermuted
            })
            .collect()
    }
}

/// `min(n, max(5, ⌊2·√n⌋))`.
fn default_landmark_count(n: usize) -> usize {
    n.min(((2.0 * (n as f64).sqrt()) as usize).max(5))
}

/// Residual variance between the required distances and the Euclidean
/// distances the (still permuted) embedding realizes for the same index
/// pairs.
fn quality_against(required: &[Vec<f64>], coordinates: &[Vec<f64>]) -> f64 {
    let n = required.len();
    let columns = required.first().map_or(0, Vec::len);

    let embedded: Vec<Vec<f64>> = (0..n)
        .map(|v| {
            (0..columns)
                .map(|s| {
                    coordinates
                        .iter()
                        .map(|row| (row[v] - row[s]) * (row[v] - row[s]))
                        .sum::<f64>()
                        .sqrt()
                })
                .collect()
        })
        .collect();

    residual_variance(required, &embedded)
}

/// Embeds by feeding the measure's distances directly into MDS.
///
/// The distance matrix is cached and grown column by column when the
/// landmark count increases; previously computed columns are never
/// recomputed and the landmark block reuses symmetry.
pub struct DirectEmbedder<T, M> {
    base: EmbedderBase<T, M>,
    distances: Vec<Vec<f64>>,
    cached_columns: usize,
}

impl<T, M> DirectEmbedder<T, M>
where
    T: Sync,
    M: Measure<T>,
{
    pub fn new(elements: Vec<T>, measure: M) -> Result<Self, Error> {
        let base = EmbedderBase::new(elements, measure)?;
        let distances = vec![Vec::new(); base.len()];
        Ok(Self {
            base,
            distances,
            cached_columns: 0,
        })
    }

    /// Switches between full and landmark MDS.
    pub fn use_landmarks(&mut self, enabled: bool) {
        self.base.use_landmarks = enabled;
    }

    pub fn landmark_count(&self) -> usize {
        self.base.landmark_count
    }

    pub fn set_landmark_count(&mut self, landmarks: usize) -> Result<(), Error> {
        self.base.set_landmark_count(landmarks)
    }

    /// Makes sure the first `columns` columns of the distance matrix are
    /// filled, computing only what previous calls have not.
    fn ensure_distances(&mut self, columns: usize) -> Result<(), Error> {
        if columns <= self.cached_columns {
            return Ok(());
        }
        let start = Instant::now();
        let old = self.cached_columns;
        let elements = &self.base.elements;
        let measure = &self.base.measure;

        self.distances
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(v, row)| {
                row.resize(columns, 0.0);
                for s in old..columns {
                    // The upper triangle of the landmark block is mirrored
                    // afterwards instead of being recomputed.
                    if s < v || v >= columns {
                        row[s] = measure.distance(&elements[v], &elements[s])?;
                    }
                }
                Ok::<(), Error>(())
            })?;

        for v in 0..columns {
            for s in old.max(v + 1)..columns {
                self.distances[v][s] = self.distances[s][v];
            }
        }

        self.cached_columns = columns;
        info!(
            "direct distances grown to {}x{} in {:?}",
            self.base.len(),
            columns,
            start.elapsed()
        );
        Ok(())
    }

    fn with_required<R>(
        &mut self,
        run: impl FnOnce(&EmbedderBase<T, M>, &[Vec<f64>]) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let columns = self.base.starting_points();
        self.ensure_distances(columns)?;

        if self.cached_columns == columns {
            run(&self.base, &self.distances)
        } else {
            let trimmed: Vec<Vec<f64>> = self
                .distances
                .iter()
                .map(|row| row[..columns].to_vec())
                .collect();
            run(&self.base, &trimmed)
        }
    }
}

impl<T, M> Embedder<T> for DirectEmbedder<T, M>
where
    T: Sync,
    M: Measure<T>,
{
    fn embed(&mut self, dimension: usize) -> Result<Vec<Vec<f64>>, Error> {
        let coordinates = self.with_required(|base, required| base.embed_from(required, dimension))?;
        Ok(self.base.unpermute(coordinates))
    }

    fn embedding_quality(&mut self, dimension: usize) -> Result<f64, Error> {
        self.with_required(|base, required| {
            let coordinates = base.embed_from(required, dimension)?;
            Ok(quality_against(required, &coordinates))
        })
    }
}

/// Embeds geodesic distances along an approximate k-nearest-neighbor
/// graph, the Isomap way.
///
/// The graph comes from NN-descent, disconnected components are unified
/// along minimum cross edges, and shortest paths from the landmark
/// vertices replace the measure. Changing the neighbor count drops the
/// geodesic cache but keeps the NN-descent state as a warm start.
pub struct Isomap<T, M> {
    base: EmbedderBase<T, M>,
    neighbor_count: usize,
    nn_descent: NnDescent,
    geodesics: Vec<Vec<f64>>,
    /// Column count the geodesic matrix was computed for; 0 when invalid.
    geodesic_columns: usize,
}

impl<T, M> Isomap<T, M>
where
    T: Sync,
    M: Measure<T>,
{
    pub fn new(elements: Vec<T>, measure: M, neighbor_count: usize) -> Result<Self, Error> {
        let base = EmbedderBase::new(elements, measure)?;
        check_neighbor_count(neighbor_count, base.len())?;
        Ok(Self {
            base,
            neighbor_count,
            nn_descent: NnDescent::new(),
            geodesics: Vec::new(),
            geodesic_columns: 0,
        })
    }

    pub fn use_landmarks(&mut self, enabled: bool) {
        self.base.use_landmarks = enabled;
    }

    pub fn landmark_count(&self) -> usize {
        self.base.landmark_count
    }

    pub fn set_landmark_count(&mut self, landmarks: usize) -> Result<(), Error> {
        self.base.set_landmark_count(landmarks)
    }

    pub fn neighbor_count(&self) -> usize {
        self.neighbor_count
    }

    /// Changes k. The geodesic matrix is recomputed on the next embed; the
    /// NN-descent state is kept and refined instead of rebuilt.
    pub fn set_neighbor_count(&mut self, neighbor_count: usize) -> Result<(), Error> {
        check_neighbor_count(neighbor_count, self.base.len())?;
        if neighbor_count != self.neighbor_count {
            self.neighbor_count = neighbor_count;
            self.geodesics.clear();
            self.geodesic_columns = 0;
        }
        Ok(())
    }

    /// The approximate k-nearest-neighbor graph over the permuted
    /// elements, for diagnostics. Reuses the NN-descent state.
    pub fn neighbor_graph(&mut self) -> Result<crate::graph::AdjacencyGraph, Error> {
        self.nn_descent
            .graph(&self.base.elements, &self.base.measure, self.neighbor_count)
    }

    /// The geodesic distance matrix the next embed would use
    /// (`n × starting_points`, permuted indices), for diagnostics.
    pub fn geodesic_distances(&mut self) -> Result<&[Vec<f64>], Error> {
        let columns = self.base.starting_points();
        self.ensure_geodesics(columns)?;
        Ok(&self.geodesics)
    }

    fn ensure_geodesics(&mut self, columns: usize) -> Result<(), Error> {
        if self.geodesic_columns != columns {
            self.geodesics = self.compute_geodesics(columns)?;
            self.geodesic_columns = columns;
        }
        Ok(())
    }

    fn compute_geodesics(&mut self, columns: usize) -> Result<Vec<Vec<f64>>, Error> {
        let start = Instant::now();

        let elements = &self.base.elements;
        let measure = &self.base.measure;
        let mut graph = self
            .nn_descent
            .graph(elements, measure, self.neighbor_count)?;

        let mut components = ConnectedComponents::of(&graph);
        if !components.is_connected() {
            components.connect(&mut graph, |a, b, cap| {
                Ok(measure.distance_capped(&elements[a], &elements[b], cap)?)
            })?;
        }

        let n = self.base.len();
        let matrix = if n <= FLOYD_WARSHALL_CUTOFF && columns == n {
            floyd_warshall(&graph)
        } else {
            multi_source_distances(&graph, columns)
        };

        info!(
            "isomap geodesics ({}x{}, k={}) in {:?}",
            n,
            columns,
            self.neighbor_count,
            start.elapsed()
        );
        Ok(matrix)
    }

    fn with_required<R>(
        &mut self,
        run: impl FnOnce(&EmbedderBase<T, M>, &[Vec<f64>]) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let columns = self.base.starting_points();
        self.ensure_geodesics(columns)?;
        run(&self.base, &self.geodesics)
    }
}

impl<T, M> Embedder<T> for Isomap<T, M>
where
    T: Sync,
    M: Measure<T>,
{
    fn embed(&mut self, dimension: usize) -> Result<Vec<Vec<f64>>, Error> {
        let coordinates = self.with_required(|base, required| base.embed_from(required, dimension))?;
        Ok(self.base.unpermute(coordinates))
    }

    fn embedding_quality(&mut self, dimension: usize) -> Result<f64, Error> {
        self.with_required(|base, required| {
            let coordinates = base.embed_from(required, dimension)?;
            Ok(quality_against(required, &coordinates))
        })
    }
}
