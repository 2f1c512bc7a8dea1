//! NN-descent: approximate k-nearest-neighbor graphs by local joins.
//!
//! The algorithm maintains a bounded candidate list per vertex, seeded
//! randomly, and iteratively refines all lists by comparing neighbors of
//! neighbors: if u1 and u2 share a neighbor they are likely close
//! themselves. Each round samples the candidates that have not joined yet,
//! mirrors them through reverse lists and attempts updates for every local
//! pair; the process stops once a round produces almost no improvements.
//!
//! [1] Wei Dong, Charikar Moses, Kai Li:
//! "Efficient k-nearest neighbor graph construction for generic similarity
//! measures", WWW 2011
//!
//! The per-vertex state survives between builds. Asking the same instance
//! for a smaller k extracts the answer without recomputation; asking for a
//! larger k refines the existing lists instead of starting from random.

use log::info;
use nanorand::Rng;
use parking_lot::RwLock;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use frechet::Measure;

use crate::graph::AdjacencyGraph;
use crate::knn::{check_neighbor_count, Neighbor, NeighborList};
use crate::Error;

/// Fraction of candidates participating in each join round.
const SAMPLE_RATE: f64 = 0.9;
/// A round with fewer than this fraction of n·k updates terminates the
/// refinement.
const TERMINATION_THRESHOLD: f64 = 0.001;

/// Reusable NN-descent state for one element collection.
#[derive(Default)]
pub struct NnDescent {
    lists: Vec<RwLock<NeighborList>>,
    built_neighbors: usize,
}

impl NnDescent {
    pub fn new() -> Self {
        Self::default()
    }

    /// The capacity the candidate lists were last refined at.
    pub fn built_neighbors(&self) -> usize {
        self.built_neighbors
    }

    /// Builds the approximate k-nearest-neighbor graph, reusing any state
    /// from earlier builds over the same elements.
    pub fn graph<T, M>(
        &mut self,
        elements: &[T],
        measure: &M,
        neighbors: usize,
    ) -> Result<AdjacencyGraph, Error>
    where
        T: Sync,
        M: Measure<T>,
    {
        check_neighbor_count(neighbors, elements.len())?;

        if self.lists.len() != elements.len() {
            self.lists.clear();
            self.built_neighbors = 0;
        }

        if self.lists.is_empty() {
            let start = Instant::now();
            self.initialize(elements, measure, neighbors)?;
            self.built_neighbors = neighbors;
            let rounds = self.refine(elements, measure)?;
            info!(
                "nn-descent built {}-nn over {} elements in {} rounds, {:?}",
                neighbors,
                elements.len(),
                rounds,
                start.elapsed()
            );
        } else if neighbors > self.built_neighbors {
            let start = Instant::now();
            self.grow(elements, measure, neighbors)?;
            self.built_neighbors = neighbors;
            let rounds = self.refine(elements, measure)?;
            info!(
                "nn-descent grew to {}-nn in {} rounds, {:?}",
                neighbors,
                rounds,
                start.elapsed()
            );
        }

        self.extract(neighbors)
    }

    /// Seeds every list with k distinct random candidates.
    fn initialize<T, M>(&mut self, elements: &[T], measure: &M, neighbors: usize) -> Result<(), Error>
    where
        T: Sync,
        M: Measure<T>,
    {
        let n = elements.len();
        self.lists = (0..n)
            .map(|_| RwLock::new(NeighborList::new(neighbors)))
            .collect();

        let lists = &self.lists;
        (0..n).into_par_iter().try_for_each(|v| {
            let mut rng = nanorand::tls_rng();
            let mut list = lists[v].write();
            while !list.is_full() {
                let u = rng.generate_range(0..n);
                if u == v || list.contains_index(u) {
                    continue;
                }
                let distance = measure.distance(&elements[v], &elements[u])?;
                list.insert(Neighbor {
                    index: u,
                    distance,
                    is_new: true,
                });
            }
            Ok(())
        })
    }

    /// Raises the list capacity and tops every list up with fresh random
    /// candidates; the surviving entries keep their state so the next
    /// refinement joins the newcomers against converged neighbors.
    fn grow<T, M>(&mut self, elements: &[T], measure: &M, neighbors: usize) -> Result<(), Error>
    where
        T: Sync,
        M: Measure<T>,
    {
        let n = elements.len();
        let lists = &self.lists;
        (0..n).into_par_iter().try_for_each(|v| {
            let mut rng = nanorand::tls_rng();
            let mut list = lists[v].write();
            list.grow_capacity(neighbors);
            while !list.is_full() {
                let u = rng.generate_range(0..n);
                if u == v || list.contains_index(u) {
                    continue;
                }
                let distance = measure.distance(&elements[v], &elements[u])?;
                list.insert(Neighbor {
                    index: u,
                    distance,
                    is_new: true,
                });
            }
            Ok(())
        })
    }

    /// Runs join rounds until a round falls below the update threshold.
    /// Returns the number of rounds.
    fn refine<T, M>(&self, elements: &[T], measure: &M) -> Result<usize, Error>
    where
        T: Sync,
        M: Measure<T>,
    {
        let n = elements.len();
        let k = self.built_neighbors;
        let sample_count = ((k as f64 * SAMPLE_RATE).ceil() as usize).max(1);
        let threshold = TERMINATION_THRESHOLD * n as f64 * k as f64;
        let lists = &self.lists;

        let mut rounds = 0;
        loop {
            rounds += 1;

            // Sample phase: split each list into its fresh and its settled
            // candidates; sampled fresh candidates will not join again.
            let (mut new_sets, mut old_sets): (Vec<Vec<usize>>, Vec<Vec<usize>>) = (0..n)
                .into_par_iter()
                .map(|v| {
                    let mut rng = nanorand::tls_rng();
                    let mut list = lists[v].write();

                    let fresh: Vec<usize> = list
                        .iter()
                        .filter(|neighbor| neighbor.is_new)
                        .map(|neighbor| neighbor.index)
                        .collect();
                    let settled: Vec<usize> = list
                        .iter()
                        .filter(|neighbor| !neighbor.is_new)
                        .map(|neighbor| neighbor.index)
                        .collect();

                    let sampled = sample_up_to(&fresh, sample_count, &mut rng);
                    for &u in &sampled {
                        list.mark_joined(u);
                    }
                    (sampled, settled)
                })
                .unzip();

            // Reverse phase: who lists v as a candidate?
            let mut new_reverse: Vec<Vec<usize>> = vec![Vec::new(); n];
            let mut old_reverse: Vec<Vec<usize>> = vec![Vec::new(); n];
            for v in 0..n {
                for &u in &new_sets[v] {
                    new_reverse[u].push(v);
                }
                for &u in &old_sets[v] {
                    old_reverse[u].push(v);
                }
            }

            // Augment both sets with samples from their reverse sets.
            new_sets
                .par_iter_mut()
                .zip(old_sets.par_iter_mut())
                .enumerate()
                .for_each(|(v, (new_set, old_set))| {
                    let mut rng = nanorand::tls_rng();
                    new_set.extend(sample_up_to(&new_reverse[v], sample_count, &mut rng));
                    old_set.extend(sample_up_to(&old_reverse[v], sample_count, &mut rng));
                });

            // Join phase: every fresh candidate meets every other local
            // candidate, fresh ones only once per unordered pair.
            let updates = AtomicUsize::new(0);
            (0..n).into_par_iter().try_for_each(|v| {
                let new_set = &new_sets[v];
                let old_set = &old_sets[v];

                for &u1 in new_set {
                    for &u2 in new_set {
                        if u2 < u1 {
                            self.join(elements, measure, u1, u2, &updates)?;
                        }
                    }
                    for &u2 in old_set {
                        if u2 != u1 {
                            self.join(elements, measure, u1, u2, &updates)?;
                        }
                    }
                }
                Ok::<(), Error>(())
            })?;

            if (updates.load(Ordering::Relaxed) as f64) < threshold {
                return Ok(rounds);
            }
        }
    }

    /// Attempts to record `u1` and `u2` in each other's candidate lists.
    fn join<T, M>(
        &self,
        elements: &[T],
        measure: &M,
        u1: usize,
        u2: usize,
        updates: &AtomicUsize,
    ) -> Result<(), Error>
    where
        T: Sync,
        M: Measure<T>,
    {
        let (cap1, known1) = {
            let list = self.lists[u1].read();
            (list.worst_distance(), list.contains_index(u2))
        };
        let (cap2, known2) = {
            let list = self.lists[u2].read();
            (list.worst_distance(), list.contains_index(u1))
        };
        if known1 && known2 {
            return Ok(());
        }

        let cap = match (known1, known2) {
            (true, false) => cap2,
            (false, true) => cap1,
            _ => cap1.max(cap2),
        };
        let distance = measure.distance_capped(&elements[u1], &elements[u2], cap)?;
        if !distance.is_finite() {
            return Ok(());
        }

        if !known1 {
            let mut list = self.lists[u1].write();
            if list.insert(Neighbor {
                index: u2,
                distance,
                is_new: true,
            }) {
                updates.fetch_add(1, Ordering::Relaxed);
            }
        }
        if !known2 {
            let mut list = self.lists[u2].write();
            if list.insert(Neighbor {
                index: u1,
                distance,
                is_new: true,
            }) {
                updates.fetch_add(1, Ordering::Relaxed);
            }
        }

        Ok(())
    }

    /// The top-k graph over the current lists.
    fn extract(&self, neighbors: usize) -> Result<AdjacencyGraph, Error> {
        let mut graph = AdjacencyGraph::new(self.lists.len());
        for (v, list) in self.lists.iter().enumerate() {
            let list = list.read();
            for neighbor in list.best(neighbors) {
                graph.add_edge(v, neighbor.index, neighbor.distance)?;
            }
        }
        Ok(graph)
    }
}

/// At most `count` elements drawn without replacement.
fn sample_up_to(items: &[usize], count: usize, rng: &mut impl Rng<8>) -> Vec<usize> {
    if items.len() <= count {
        return items.to_vec();
    }

    let mut pool = items.to_vec();
    for i in 0..count {
        let j = rng.generate_range(i..pool.len());
        pool.swap(i, j);
    }
    pool.truncate(count);
    pool
}
