//! A library of embedding algorithms for large curve collections.
//!
//! Given N elements and a dissimilarity measure from the Fréchet family
//! (see the [`frechet`] crate), the crate computes coordinates in ℝᵈ that
//! approximately preserve either the measure itself or its geodesic
//! refinement along a k-nearest-neighbor graph:
//!
//! - [`DirectEmbedder`] feeds pairwise distances straight into
//!   multidimensional scaling.
//! - [`Isomap`] builds an approximate k-NN graph with NN-descent, unifies
//!   its connected components along minimum cross edges and replaces the
//!   measure by shortest-path distances before scaling.
//!
//! Both embedders support landmark mode, which restricts the distance
//! computation to a random subset of L elements and places the remaining
//! ones by barycentric projection; this is what makes collections on the
//! order of 10⁵ curves tractable.
//!
//! The expensive stages run on the rayon thread pool: NN-descent's sample
//! and join phases, the direct distance-matrix fill and the per-source
//! shortest-path sweeps.
//!
//! # Example
//!
//! ```
//! use embed::prelude::*;
//! use frechet::Error;
//!
//! struct Absolute;
//!
//! impl Measure<f64> for Absolute {
//!     fn distance(&self, a: &f64, b: &f64) -> Result<f64, Error> {
//!         Ok((a - b).abs())
//!     }
//! }
//!
//! let elements: Vec<f64> = (0..7).map(f64::from).collect();
//! let mut embedder = DirectEmbedder::new(elements, Absolute)?;
//!
//! let coordinates = embedder.embed(1)?;
//! assert_eq!(coordinates.len(), 1);
//! assert_eq!(coordinates[0].len(), 7);
//!
//! assert!(embedder.embedding_quality(1)? < 0.01);
//! # Ok::<(), embed::Error>(())
//! ```

pub mod components;
pub mod embedder;
pub mod fib_heap;
pub mod graph;
pub mod knn;
pub mod mds;
pub mod nn_descent;
pub mod prelude;
pub mod quality;
pub mod shortest_paths;

pub use crate::components::ConnectedComponents;
pub use crate::embedder::{DirectEmbedder, Embedder, Isomap};
pub use crate::fib_heap::FibonacciHeap;
pub use crate::graph::AdjacencyGraph;
pub use crate::knn::{brute_force_neighbors, Neighbor, NeighborList};
pub use crate::nn_descent::NnDescent;
pub use crate::quality::residual_variance;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("edge weight must be non-negative, got {weight} for ({edge_source}, {target})")]
    NegativeWeight {
        edge_source: usize,
        target: usize,
        weight: f64,
    },

    #[error("self loop at node {node} must have weight 0.0, got {weight}")]
    SelfLoop { node: usize, weight: f64 },

    #[error("neighbor count must be in 1..{node_count}, got {neighbors}")]
    InvalidNeighborCount { neighbors: usize, node_count: usize },

    #[error("landmark count must be in 2..={node_count}, got {landmarks}")]
    InvalidLandmarkCount { landmarks: usize, node_count: usize },

    #[error("embedding requires at least one element")]
    NoElements,

    #[error("distance matrix rows must all have length {expected}, row {row} has {actual}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("distance matrix must be square, got {rows} rows of width {columns}")]
    NotSquare { rows: usize, columns: usize },

    #[error("distance matrix needs at least as many rows as columns, got {rows}x{columns}")]
    TooFewRows { rows: usize, columns: usize },

    #[error("distances must be non-negative, got {value} at ({row}, {column})")]
    NegativeDistance {
        row: usize,
        column: usize,
        value: f64,
    },

    #[error("distance matrix diagonal must be zero, got {value} at {index}")]
    NonZeroDiagonal { index: usize, value: f64 },

    #[error("target dimension must be in 1..={maximum}, got {dimension}")]
    InvalidDimension { dimension: usize, maximum: usize },

    #[error(transparent)]
    Measure(#[from] frechet::Error),
}
