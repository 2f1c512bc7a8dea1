pub use crate::components::ConnectedComponents;
pub use crate::embedder::DirectEmbedder;
pub use crate::embedder::Embedder;
pub use crate::embedder::Isomap;
pub use crate::fib_heap::FibonacciHeap;
pub use crate::graph::AdjacencyGraph;
pub use crate::knn::brute_force_neighbors;
pub use crate::knn::Neighbor;
pub use crate::knn::NeighborList;
pub use crate::nn_descent::NnDescent;
pub use crate::quality::residual_variance;
pub use crate::shortest_paths::floyd_warshall;
pub use crate::shortest_paths::multi_source_distances;

pub use frechet::Accumulation;
pub use frechet::Decider;
pub use frechet::DiscreteFrechet;
pub use frechet::FrechetDistance;
pub use frechet::Measure;
pub use frechet::Polyline;

pub use crate::Error;
