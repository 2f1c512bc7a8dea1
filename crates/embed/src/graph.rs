//! A weighted undirected graph over dense vertex indices.

use ahash::AHashMap;

use crate::Error;

/// A weighted undirected graph on the vertex set `0..node_count`, stored
/// as one neighbor-to-weight map per vertex.
///
/// Edge weights are non-negative; `f64::INFINITY` encodes "no edge", both
/// on reads and as a removal sentinel on writes. Self loops carry an
/// implicit weight of zero and are never stored.
///
/// Reads take `&self` and writes `&mut self`, so the borrow checker
/// enforces the "external synchronization for writers" contract.
#[derive(Clone, Debug, Default)]
pub struct AdjacencyGraph {
    adjacency: Vec<AHashMap<usize, f64>>,
}

impl AdjacencyGraph {
    pub fn new(node_count: usize) -> Self {
        Self {
            adjacency: vec![AHashMap::new(); node_count],
        }
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(|neighbors| neighbors.len()).sum::<usize>() / 2
    }

    /// Inserts or updates the undirected edge `(u, v)`.
    ///
    /// A weight of `f64::INFINITY` removes the edge. Negative weights are
    /// rejected, as is any non-zero weight on a self loop; a zero-weight
    /// self loop is accepted and ignored.
    ///
    /// # Panics
    ///
    /// Panics if `u` or `v` is not smaller than [`AdjacencyGraph::node_count`].
    pub fn add_edge(&mut self, u: usize, v: usize, weight: f64) -> Result<(), Error> {
        if weight < 0.0 {
            return Err(Error::NegativeWeight {
                edge_source: u,
                target: v,
                weight,
            });
        }
        if u == v {
            if weight != 0.0 {
                return Err(Error::SelfLoop { node: u, weight });
            }
            return Ok(());
        }

        if weight == f64::INFINITY {
            self.remove_edge(u, v);
        } else {
            self.adjacency[u].insert(v, weight);
            self.adjacency[v].insert(u, weight);
        }
        Ok(())
    }

    pub fn remove_edge(&mut self, u: usize, v: usize) {
        self.adjacency[u].remove(&v);
        self.adjacency[v].remove(&u);
    }

    /// The weight of the edge `(u, v)`, zero for `u == v` and
    /// `f64::INFINITY` for non-edges.
    pub fn distance(&self, u: usize, v: usize) -> f64 {
        if u == v {
            return 0.0;
        }
        self.adjacency[u].get(&v).copied().unwrap_or(f64::INFINITY)
    }

    /// The incident vertices of `u` with their edge weights, in no
    /// particular order.
    pub fn neighbors(&self, u: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.adjacency[u].iter().map(|(&v, &weight)| (v, weight))
    }

    pub fn degree(&self, u: usize) -> usize {
        self.adjacency[u].len()
    }

    /// The dense distance matrix: symmetric, zero diagonal, `f64::INFINITY`
    /// for missing edges.
    pub fn to_matrix(&self) -> Vec<Vec<f64>> {
        let n = self.node_count();
        let mut matrix = vec![vec![f64::INFINITY; n]; n];

        for (u, row) in matrix.iter_mut().enumerate() {
            row[u] = 0.0;
            for (v, weight) in self.neighbors(u) {
                row[v] = weight;
            }
        }

        matrix
    }
}
