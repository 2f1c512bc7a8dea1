//! Single-source and all-pairs shortest paths.
//!
//! Two interchangeable engines: Floyd–Warshall for small dense problems
//! and per-source Dijkstra over a Fibonacci heap for everything else. The
//! sources of the multi-source sweep are independent, so they run on the
//! rayon pool, one heap per source.

use log::info;
use rayon::prelude::*;
use std::time::Instant;

use crate::fib_heap::FibonacciHeap;
use crate::graph::AdjacencyGraph;

/// All-pairs shortest paths by the classic triple loop. O(n³), intended
/// for small graphs only.
pub fn floyd_warshall(graph: &AdjacencyGraph) -> Vec<Vec<f64>> {
    let n = graph.node_count();
    let mut distances = graph.to_matrix();

    for k in 0..n {
        for i in 0..n {
            let via = distances[i][k];
            if !via.is_finite() {
                continue;
            }
            for j in 0..n {
                let candidate = via + distances[k][j];
                if candidate < distances[i][j] {
                    distances[i][j] = candidate;
                }
            }
        }
    }

    distances
}

/// Distances from `source` to every vertex; unreachable vertices stay at
/// `f64::INFINITY`.
pub fn dijkstra(graph: &AdjacencyGraph, source: usize) -> Vec<f64> {
    let n = graph.node_count();

    let mut heap = FibonacciHeap::with_capacity(n);
    let mut handles = Vec::with_capacity(n);
    for v in 0..n {
        let key = if v == source { 0.0 } else { f64::INFINITY };
        handles.push(heap.push(key, v));
    }

    let mut distances = vec![f64::INFINITY; n];
    let mut settled = vec![false; n];

    while let Some((distance, v)) = heap.pop_min() {
        if distance.is_infinite() {
            // Everything still queued is unreachable.
            break;
        }
        distances[v] = distance;
        settled[v] = true;

        for (u, weight) in graph.neighbors(v) {
            if settled[u] {
                continue;
            }
            let candidate = distance + weight;
            if candidate < heap.key(handles[u]) {
                heap.decrease_key(handles[u], candidate);
            }
        }
    }

    distances
}

/// The distance matrix `D[v][s]` from every vertex to the sources
/// `0..source_count`, one parallel Dijkstra sweep per source.
pub fn multi_source_distances(graph: &AdjacencyGraph, source_count: usize) -> Vec<Vec<f64>> {
    let start = Instant::now();

    let per_source: Vec<Vec<f64>> = (0..source_count)
        .into_par_iter()
        .map(|source| dijkstra(graph, source))
        .collect();

    let n = graph.node_count();
    let mut distances = vec![vec![0.0; source_count]; n];
    for (s, column) in per_source.iter().enumerate() {
        for v in 0..n {
            distances[v][s] = column[v];
        }
    }

    info!(
        "shortest paths from {} sources over {} nodes in {:?}",
        source_count,
        n,
        start.elapsed()
    );

    distances
}
