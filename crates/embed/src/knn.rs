//! k-nearest-neighbor candidate lists and the exact baseline builder.

use log::info;
use rayon::prelude::*;
use std::time::Instant;

use frechet::Measure;

use crate::graph::AdjacencyGraph;
use crate::Error;

/// One candidate neighbor of a vertex.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
    /// Whether the candidate has not yet participated in an NN-descent
    /// join round.
    pub is_new: bool,
}

/// A bounded candidate set, ordered by distance with the vertex index as
/// tie breaker. The worst candidate is evicted once the capacity is
/// reached.
#[derive(Clone, Debug)]
pub struct NeighborList {
    entries: Vec<Neighbor>,
    capacity: usize,
}

impl NeighborList {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Grows the capacity; never discards existing candidates.
    pub fn grow_capacity(&mut self, capacity: usize) {
        debug_assert!(capacity >= self.capacity);
        self.capacity = capacity;
        self.entries.reserve(capacity - self.entries.len());
    }

    /// The worst retained candidate, if any.
    pub fn worst(&self) -> Option<&Neighbor> {
        self.entries.last()
    }

    /// The distance a new candidate has to beat: the worst retained
    /// distance once the list is full, unbounded before that.
    pub fn worst_distance(&self) -> f64 {
        if self.is_full() {
            self.entries.last().map_or(f64::INFINITY, |n| n.distance)
        } else {
            f64::INFINITY
        }
    }

    pub fn contains_index(&self, index: usize) -> bool {
        self.entries.iter().any(|n| n.index == index)
    }

    /// Inserts a candidate, keeping the order and the capacity bound.
    /// Returns whether the list changed; duplicates and candidates worse
    /// than a full list's tail are rejected.
    pub fn insert(&mut self, neighbor: Neighbor) -> bool {
        if self.contains_index(neighbor.index) {
            return false;
        }

        let position = self
            .entries
            .partition_point(|n| (n.distance, n.index) < (neighbor.distance, neighbor.index));

        if self.is_full() {
            if position == self.entries.len() {
                return false;
            }
            self.entries.pop();
        }
        self.entries.insert(position, neighbor);
        true
    }

    /// Removes and returns the worst candidate.
    pub fn pop_worst(&mut self) -> Option<Neighbor> {
        self.entries.pop()
    }

    /// Clears the "new" flag of the candidate with the given index.
    pub fn mark_joined(&mut self, index: usize) {
        if let Some(neighbor) = self.entries.iter_mut().find(|n| n.index == index) {
            neighbor.is_new = false;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Neighbor> {
        self.entries.iter()
    }

    /// The best `count` candidates in order.
    pub fn best(&self, count: usize) -> impl Iterator<Item = &Neighbor> {
        self.entries.iter().take(count)
    }
}

/// Validates a neighbor count against the vertex count.
pub(crate) fn check_neighbor_count(neighbors: usize, node_count: usize) -> Result<(), Error> {
    if neighbors < 1 || neighbors >= node_count {
        return Err(Error::InvalidNeighborCount {
            neighbors,
            node_count,
        });
    }
    Ok(())
}

/// The exact k-nearest-neighbor graph, one full scan per vertex.
///
/// Deterministic: ties are broken towards the smaller index. The result is
/// symmetrized by the undirected edge storage, so vertices can end up with
/// more than `neighbors` incident edges.
pub fn brute_force_neighbors<T, M>(
    elements: &[T],
    measure: &M,
    neighbors: usize,
) -> Result<AdjacencyGraph, Error>
where
    T: Sync,
    M: Measure<T>,
{
    check_neighbor_count(neighbors, elements.len())?;
    let start = Instant::now();

    let lists = (0..elements.len())
        .into_par_iter()
        .map(|v| {
            let mut list = NeighborList::new(neighbors);
            for (u, element) in elements.iter().enumerate() {
                if u == v {
                    continue;
                }
                let distance =
                    measure.distance_capped(&elements[v], element, list.worst_distance())?;
                if distance.is_finite() {
                    list.insert(Neighbor {
                        index: u,
                        distance,
                        is_new: false,
                    });
                }
            }
            Ok(list)
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let mut graph = AdjacencyGraph::new(elements.len());
    for (v, list) in lists.iter().enumerate() {
        for neighbor in list.iter() {
            graph.add_edge(v, neighbor.index, neighbor.distance)?;
        }
    }

    info!(
        "brute-force {}-nn over {} elements in {:?}",
        neighbors,
        elements.len(),
        start.elapsed()
    );

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use frechet::Error as MeasureError;

    struct Absolute;

    impl Measure<f64> for Absolute {
        fn distance(&self, a: &f64, b: &f64) -> Result<f64, MeasureError> {
            Ok((a - b).abs())
        }
    }

    fn neighbor(index: usize, distance: f64) -> Neighbor {
        Neighbor {
            index,
            distance,
            is_new: false,
        }
    }

    #[test]
    fn keeps_the_best_candidates_in_order() {
        let mut list = NeighborList::new(3);

        assert!(list.insert(neighbor(5, 2.0)));
        assert!(list.insert(neighbor(1, 1.0)));
        assert!(list.insert(neighbor(9, 3.0)));
        assert!(list.insert(neighbor(2, 0.5)));
        assert!(!list.insert(neighbor(7, 9.0)));

        let indices: Vec<usize> = list.iter().map(|n| n.index).collect();
        assert_eq!(indices, vec![2, 1, 5]);
        assert_eq!(list.worst().unwrap().index, 5);
        assert_eq!(list.worst_distance(), 2.0);
    }

    #[test]
    fn ties_are_ordered_by_index() {
        let mut list = NeighborList::new(2);
        list.insert(neighbor(4, 1.0));
        list.insert(neighbor(2, 1.0));
        list.insert(neighbor(3, 1.0));

        let indices: Vec<usize> = list.iter().map(|n| n.index).collect();
        assert_eq!(indices, vec![2, 3]);
    }

    #[test]
    fn rejects_duplicates() {
        let mut list = NeighborList::new(3);
        assert!(list.insert(neighbor(1, 1.0)));
        assert!(!list.insert(neighbor(1, 0.5)));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn pop_worst_and_membership() {
        let mut list = NeighborList::new(2);
        list.insert(neighbor(1, 1.0));
        list.insert(neighbor(2, 2.0));

        assert!(list.contains_index(2));
        assert_eq!(list.pop_worst().unwrap().index, 2);
        assert!(!list.contains_index(2));
    }

    #[test]
    fn brute_force_finds_the_true_neighbors() {
        let elements: Vec<f64> = vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0];
        let graph = brute_force_neighbors(&elements, &Absolute, 2).unwrap();

        // Within each cluster every vertex links to the other two.
        assert_eq!(graph.distance(0, 1), 1.0);
        assert_eq!(graph.distance(0, 2), 2.0);
        assert_eq!(graph.distance(3, 5), 2.0);
        assert_eq!(graph.distance(2, 3), f64::INFINITY);
    }

    #[test]
    fn brute_force_rejects_bad_neighbor_counts() {
        let elements: Vec<f64> = vec![0.0, 1.0, 2.0];

        assert!(matches!(
            brute_force_neighbors(&elements, &Absolute, 0),
            Err(Error::InvalidNeighborCount { .. })
        ));
        assert!(brute_force_neighbors(&elements, &Absolute, 3).is_err());
    }
}
