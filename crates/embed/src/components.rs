//! Connected components and minimum-cross-edge unification.
//!
//! A k-nearest-neighbor graph over a clustered collection regularly falls
//! apart into several components, which would leave geodesic distances
//! infinite. [`ConnectedComponents::connect`] stitches the components
//! together with a Kruskal pass over the shortest inter-component vertex
//! pairs, so the added edges form a minimum spanning tree over the
//! component graph. The search is quadratic in the component sizes by
//! design; components are assumed few.

use log::info;
use std::time::Instant;

use crate::graph::AdjacencyGraph;
use crate::Error;

/// The partition of a graph's vertices into connected components, largest
/// first.
#[derive(Clone, Debug)]
pub struct ConnectedComponents {
    components: Vec<Vec<usize>>,
}

impl ConnectedComponents {
    /// Finds all components by iterative depth-first search.
    pub fn of(graph: &AdjacencyGraph) -> Self {
        let n = graph.node_count();
        let mut visited = vec![false; n];
        let mut components = Vec::new();
        let mut stack = Vec::new();

        for start in 0..n {
            if visited[start] {
                continue;
            }

            let mut component = Vec::new();
            visited[start] = true;
            stack.push(start);

            while let Some(v) = stack.pop() {
                component.push(v);
                for (u, _) in graph.neighbors(v) {
                    if !visited[u] {
                        visited[u] = true;
                        stack.push(u);
                    }
                }
            }

            component.sort_unstable();
            components.push(component);
        }

        components.sort_by_key(|component| std::cmp::Reverse(component.len()));

        Self { components }
    }

    /// Number of components.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_connected(&self) -> bool {
        self.components.len() == 1
    }

    /// The components, largest first; the first one is the main component.
    pub fn components(&self) -> &[Vec<usize>] {
        &self.components
    }

    /// Unifies all components by inserting, per Kruskal, the shortest
    /// cross-component edges under the given capped measure over vertex
    /// indices. Returns the added edges `(u, v, distance)`.
    ///
    /// The measure receives a running cap holding the best distance found
    /// so far for the current component pair, so interruptible measures
    /// terminate most comparisons early.
    pub fn connect<F>(
        &mut self,
        graph: &mut AdjacencyGraph,
        mut measure: F,
    ) -> Result<Vec<(usize, usize, f64)>, Error>
    where
        F: FnMut(usize, usize, f64) -> Result<f64, Error>,
    {
        if self.is_connected() {
            return Ok(Vec::new());
        }
        let start = Instant::now();

        // The closest vertex pair for every component pair.
        let mut candidates = Vec::new();
        for i in 0..self.components.len() {
            for j in i + 1..self.components.len() {
                let mut best: Option<(usize, usize, f64)> = None;
                let mut cap = f64::INFINITY;

                for &u in &self.components[i] {
                    for &v in &self.components[j] {
                        let distance = measure(u, v, cap)?;
                        if distance < cap {
                            cap = distance;
                            best = Some((u, v, distance));
                        }
                    }
                }

                if let Some(edge) = best {
                    candidates.push(edge);
                }
            }
        }
        candidates.sort_by(|a, b| a.2.total_cmp(&b.2));

        // Kruskal over the candidates, tracked by a component-number array.
        let mut component_of = vec![0; graph.node_count()];
        for (number, component) in self.components.iter().enumerate() {
            for &v in component {
                component_of[v] = number;
            }
        }

        let mut remaining = self.components.len();
        let mut added = Vec::new();
        for (u, v, distance) in candidates {
            if remaining == 1 {
                break;
            }
            let (a, b) = (component_of[u], component_of[v]);
            if a == b {
                continue;
            }

            graph.add_edge(u, v, distance)?;
            added.push((u, v, distance));
            for number in component_of.iter_mut() {
                if *number == b {
                    *number = a;
                }
            }
            remaining -= 1;
        }

        let mut all: Vec<usize> = self.components.drain(..).flatten().collect();
        all.sort_unstable();
        self.components = vec![all];

        info!(
            "connected {} components with {} edges in {:?}",
            added.len() + 1,
            added.len(),
            start.elapsed()
        );

        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cluster_graph() -> AdjacencyGraph {
        let mut graph = AdjacencyGraph::new(6);
        graph.add_edge(0, 1, 1.0).unwrap();
        graph.add_edge(1, 2, 1.0).unwrap();
        graph.add_edge(3, 4, 1.0).unwrap();
        graph.add_edge(4, 5, 1.0).unwrap();
        graph
    }

    #[test]
    fn finds_components_largest_first() {
        let mut graph = AdjacencyGraph::new(6);
        graph.add_edge(0, 1, 1.0).unwrap();
        graph.add_edge(2, 3, 1.0).unwrap();
        graph.add_edge(3, 4, 1.0).unwrap();

        let components = ConnectedComponents::of(&graph);

        assert_eq!(components.len(), 3);
        assert_eq!(components.components()[0], vec![2, 3, 4]);
        assert!(!components.is_connected());
    }

    #[test]
    fn connect_adds_component_count_minus_one_edges() {
        let mut graph = two_cluster_graph();
        let mut components = ConnectedComponents::of(&graph);
        assert_eq!(components.len(), 2);

        let added = components
            .connect(&mut graph, |u, v, _cap| {
                Ok((u as f64 - v as f64).abs())
            })
            .unwrap();

        assert_eq!(added.len(), 1);
        assert!(components.is_connected());
        assert!(ConnectedComponents::of(&graph).is_connected());

        // The closest cross pair is (2, 3).
        assert_eq!(added[0], (2, 3, 1.0));
        assert_eq!(graph.distance(2, 3), 1.0);
    }

    #[test]
    fn connect_uses_minimum_cross_edges() {
        // Three singleton components at positions 0, 10, 11.
        let mut graph = AdjacencyGraph::new(3);
        let positions: [f64; 3] = [0.0, 10.0, 11.0];
        let mut components = ConnectedComponents::of(&graph);

        let added = components
            .connect(&mut graph, |u, v, _cap| {
                Ok((positions[u] - positions[v]).abs())
            })
            .unwrap();

        assert_eq!(added.len(), 2);
        // The (1, 2) pair is the shortest, then one of the long edges.
        assert_eq!(graph.distance(1, 2), 1.0);
        assert_eq!(graph.distance(0, 1), 10.0);
        assert_eq!(graph.distance(0, 2), f64::INFINITY);
    }

    #[test]
    fn connect_on_connected_graph_is_a_no_op() {
        let mut graph = AdjacencyGraph::new(2);
        graph.add_edge(0, 1, 1.0).unwrap();
        let mut components = ConnectedComponents::of(&graph);

        let added = components
            .connect(&mut graph, |_, _, _| Ok(1.0))
            .unwrap();
        assert!(added.is_empty());
    }

    #[test]
    fn caps_shrink_as_better_pairs_appear() {
        let mut graph = AdjacencyGraph::new(4);
        graph.add_edge(0, 1, 1.0).unwrap();
        graph.add_edge(2, 3, 1.0).unwrap();
        let mut components = ConnectedComponents::of(&graph);

        let mut caps = Vec::new();
        components
            .connect(&mut graph, |u, v, cap| {
                caps.push(cap);
                Ok((u as f64 - v as f64).abs())
            })
            .unwrap();

        // The first comparison is uncapped, later ones are bounded by the
        // best distance so far.
        assert_eq!(caps[0], f64::INFINITY);
        assert!(caps[1..].iter().all(|cap| cap.is_finite()));
    }
}
