//! A building block for distance computations on polygonal curves.
//!
//! The crate provides the [`Polyline`] value type, the [`Measure`] contract
//! for pairwise dissimilarities and a family of Fréchet distance measures
//! on polylines:
//!
//! - [`DiscreteFrechet`] computes the discrete Fréchet distance, where the
//!   accumulation along a coupling is either the maximum pair distance
//!   (the classic min-max coupling) or the sum of pair distances (the
//!   integral variant).
//! - [`FrechetDistance`] approximates the continuous Fréchet distance to a
//!   configurable precision by bisecting over a decision procedure on the
//!   free-space diagram. Two deciders are available, a tabular sweep and an
//!   on-demand path search.
//!
//! # Example
//!
//! ```
//! use frechet::prelude::*;
//!
//! let p = Polyline::new(vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0], vec![5.0]])?;
//! let q = Polyline::new(vec![vec![1.0], vec![2.0], vec![4.0], vec![5.0]])?;
//!
//! let measure = DiscreteFrechet::maximum();
//! assert_eq!(measure.distance(&p, &q)?, 1.0);
//!
//! // Capped evaluation returns the infinity sentinel once the cap is exceeded.
//! assert_eq!(measure.distance_capped(&p, &q, 0.5)?, f64::INFINITY);
//! # Ok::<(), frechet::Error>(())
//! ```
//!
//! All distances are non-negative `f64` values; `f64::INFINITY` is the
//! sentinel for "capped" results. `NaN` input is outside the contract.

pub mod continuous;
pub mod decider;
pub mod discrete;
pub mod free_space;
pub mod measure;
pub mod polyline;
pub mod prelude;

pub use crate::continuous::FrechetDistance;
pub use crate::decider::{Decider, FrechetDecider};
pub use crate::discrete::{Accumulation, DiscreteFrechet};
pub use crate::free_space::{free_interval, Interval};
pub use crate::measure::Measure;
pub use crate::polyline::Polyline;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("a polyline requires at least two vertices, got {vertices}")]
    TooFewVertices { vertices: usize },

    #[error("vertex {vertex} has dimension {actual}, expected {expected}")]
    MixedDimensions {
        vertex: usize,
        expected: usize,
        actual: usize,
    },

    #[error("polyline dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("precision must be positive, got {precision}")]
    InvalidPrecision { precision: f64 },
}
