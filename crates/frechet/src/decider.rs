//! Decision procedures for the continuous Fréchet distance.
//!
//! A decider answers "is the continuous Fréchet distance of `p` and `q` at
//! most ε?" by testing whether the free-space diagram at radius ε admits a
//! monotone path from the bottom-left to the top-right corner.
//!
//! Two procedures are provided:
//!
//! - [`Decider::Tabular`] sweeps the whole cell grid and propagates
//!   reachability intervals left-to-right and bottom-to-top. Work is
//!   proportional to the grid size, independent of the answer.
//! - [`Decider::PathSearch`] explores reachable cells on demand, preferring
//!   steps that stay close to the diagram diagonal. For similar curves it
//!   touches a narrow corridor of the grid only; visited cells are kept in
//!   a hash map and reused across decisions at different radii.
//!
//! The path search tracks per cell a signed *restriction* `r ∈ [−1, 1]`:
//! `r > 0` records that the cell was entered through its left edge at
//! height `r` (right-going exits must not drop below it), `r < 0` that it
//! was entered through its bottom edge at offset `|r|`, and `r = 0` that
//! the cell is unconstrained, e.g. after a diagonal step through a corner.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;

use crate::free_space::{free_interval, Cell, Interval};
use crate::polyline::{check_dimensions, distance, Polyline};
use crate::Error;

/// The decision procedure to run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Decider {
    /// Full sweep over the free-space grid.
    Tabular,
    /// On-demand search over reachable cells.
    PathSearch,
}

/// A reusable decider for one pair of polylines.
///
/// The instance owns the visited-cell table of the path search, so probing
/// the same pair at a sequence of radii (as the bisection in
/// [`crate::continuous`] does) reuses cell allocations.
pub struct FrechetDecider<'a> {
    p: &'a Polyline,
    q: &'a Polyline,
    kind: Decider,
    cells: AHashMap<usize, Cell>,
    generation: u32,
}

impl<'a> FrechetDecider<'a> {
    pub fn new(p: &'a Polyline, q: &'a Polyline, kind: Decider) -> Result<Self, Error> {
        check_dimensions(p, q)?;

        Ok(Self {
            p,
            q,
            kind,
            cells: AHashMap::new(),
            generation: 0,
        })
    }

    /// Whether the continuous Fréchet distance is at most `radius`.
    pub fn decide(&mut self, radius: f64) -> bool {
        if self.endpoints_too_far(radius) {
            return false;
        }

        match self.kind {
            Decider::Tabular => self.decide_tabular(radius),
            Decider::PathSearch => self.decide_path_search(radius),
        }
    }

    /// Any traversal starts at the first and ends at the last vertex pair,
    /// so both must be within `radius` for any ε to be feasible.
    fn endpoints_too_far(&self, radius: f64) -> bool {
        distance(self.p.vertex(0), self.q.vertex(0)) > radius
            || distance(
                self.p.vertex(self.p.len() - 1),
                self.q.vertex(self.q.len() - 1),
            ) > radius
    }

    fn decide_tabular(&self, radius: f64) -> bool {
        let p = self.p;
        let q = self.q;
        let cols = p.len() - 1;
        let rows = q.len() - 1;

        // Reachability intervals of the left edges of the current cell
        // column. Along the left boundary only an unbroken chain of free
        // intervals anchored at the bottom corner is reachable.
        let mut left_reach: Vec<Option<Interval>> = vec![None; rows];
        left_reach[0] = boundary_reach(
            free_interval(p.vertex(0), q.vertex(0), q.vertex(1), radius),
            true,
        );
        for j in 1..rows {
            let connected = matches!(left_reach[j - 1], Some(below) if below.reaches_end());
            left_reach[j] = boundary_reach(
                free_interval(p.vertex(0), q.vertex(j), q.vertex(j + 1), radius),
                connected,
            );
        }

        // Reachability of the bottom edge of cell (i, 0), maintained along
        // the bottom boundary the same way.
        let mut bottom_boundary = boundary_reach(
            free_interval(q.vertex(0), p.vertex(0), p.vertex(1), radius),
            true,
        );

        for i in 0..cols {
            let mut bottom = bottom_boundary;
            let mut next_left = vec![None; rows];

            for j in 0..rows {
                let left = left_reach[j];
                let right_free =
                    free_interval(p.vertex(i + 1), q.vertex(j), q.vertex(j + 1), radius);
                let top_free =
                    free_interval(q.vertex(j + 1), p.vertex(i), p.vertex(i + 1), radius);

                next_left[j] = propagate(bottom, left, right_free);
                bottom = propagate(left, bottom, top_free);
            }

            left_reach = next_left;

            if i + 1 < cols {
                let connected = matches!(bottom_boundary, Some(b) if b.reaches_end());
                bottom_boundary = boundary_reach(
                    free_interval(q.vertex(0), p.vertex(i + 1), p.vertex(i + 2), radius),
                    connected,
                );
            }
        }

        // The top-right corner is the end of the last right edge.
        matches!(left_reach[rows - 1], Some(reach) if reach.reaches_end())
    }

    fn decide_path_search(&mut self, radius: f64) -> bool {
        let cols = self.p.len() - 1;
        let rows = self.q.len() - 1;
        let target = (cols - 1, rows - 1);

        self.generation += 1;
        let mut queue = BinaryHeap::new();

        // The start cell is entered at the bottom-left corner, which the
        // endpoint check has established to be free.
        self.save(0, 0, 0.0, radius, false, &mut queue);

        while let Some(step) = queue.pop() {
            let (i, j) = (step.i, step.j);
            if (i, j) == target {
                return true;
            }

            let Some(cell) = self.cells.get(&self.key(i, j)) else {
                continue;
            };
            let (right, top, restriction) = (cell.right, cell.top, cell.restriction);

            // Diagonal steps pass through the cell's top-right corner,
            // which must be free on both edges; they clear the restriction.
            if i < target.0 && j < target.1 {
                if let (Some(right), Some(top)) = (right, top) {
                    if right.reaches_end() && top.reaches_end() {
                        self.save(i + 1, j + 1, 0.0, radius, true, &mut queue);
                    }
                }
            }

            // A right step crosses the right edge no lower than the
            // restriction allows; the successor inherits the crossing
            // height as its own restriction.
            if i < target.0 {
                if let Some(right) = right {
                    if right.hi >= restriction {
                        self.save(i + 1, j, restriction.max(right.lo), radius, false, &mut queue);
                    }
                }
            }

            // Mirrored for top steps, with the sign encoding the axis.
            if j < target.1 {
                if let Some(top) = top {
                    if top.hi >= -restriction {
                        self.save(i, j + 1, restriction.min(-top.lo), radius, false, &mut queue);
                    }
                }
            }
        }

        false
    }

    fn key(&self, i: usize, j: usize) -> usize {
        i + j * self.p.len()
    }

    /// Records that cell `(i, j)` was reached under `restriction` and
    /// enqueues it unless an already-saved visit subsumes this one: a saved
    /// restriction of the same sign but closer to zero admits every path
    /// the new one does. A revisit from the orthogonal direction clears
    /// the restriction entirely.
    fn save(
        &mut self,
        i: usize,
        j: usize,
        restriction: f64,
        radius: f64,
        diagonal: bool,
        queue: &mut BinaryHeap<Step>,
    ) {
        let key = self.key(i, j);
        let cell = self
            .cells
            .entry(key)
            .or_insert_with(|| Cell::new(self.p, self.q, i, j, radius));
        if cell.radius != radius {
            *cell = Cell::new(self.p, self.q, i, j, radius);
        }

        if cell.generation == self.generation {
            let saved = cell.restriction;
            if saved == 0.0 {
                return;
            }
            if saved * restriction < 0.0 {
                cell.restriction = 0.0;
            } else if restriction.abs() < saved.abs() {
                cell.restriction = restriction;
            } else {
                return;
            }
        } else {
            cell.generation = self.generation;
            cell.restriction = restriction;
        }

        let offset = (i as f64 + 0.5) / segments(self.p) - (j as f64 + 0.5) / segments(self.q);
        queue.push(Step {
            diagonal,
            closeness: -offset.abs(),
            i,
            j,
        });
    }
}

fn segments(polyline: &Polyline) -> f64 {
    (polyline.len() - 1) as f64
}

/// Reach of a boundary edge: the chain must be connected up to here and
/// the edge must be free from its very start.
fn boundary_reach(free: Option<Interval>, connected: bool) -> Option<Interval> {
    if !connected {
        return None;
    }
    free.filter(|f| f.lo == 0.0)
}

/// Monotone reachability of an edge from within one cell: any point of the
/// edge's free interval is reachable from a perpendicular entry, while a
/// parallel predecessor only reaches positions at or above its own lower
/// bound.
fn propagate(
    perpendicular: Option<Interval>,
    predecessor: Option<Interval>,
    free: Option<Interval>,
) -> Option<Interval> {
    let free = free?;
    if perpendicular.is_some() {
        return Some(free);
    }
    let predecessor = predecessor?;
    if predecessor.lo <= free.hi {
        Some(Interval::new(free.lo.max(predecessor.lo), free.hi))
    } else {
        None
    }
}

/// A pending cell visit. Diagonal steps are expanded first; among the
/// rest, cells closer to the diagram's ideal diagonal win.
struct Step {
    diagonal: bool,
    closeness: f64,
    i: usize,
    j: usize,
}

impl PartialEq for Step {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Step {}

impl PartialOrd for Step {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Step {
    fn cmp(&self, other: &Self) -> Ordering {
        self.diagonal
            .cmp(&other.diagonal)
            .then_with(|| self.closeness.total_cmp(&other.closeness))
            .then_with(|| other.i.cmp(&self.i))
            .then_with(|| other.j.cmp(&self.j))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(values: &[f64]) -> Polyline {
        Polyline::new(values.iter().map(|&v| vec![v]).collect()).unwrap()
    }

    fn deciders<'a>(p: &'a Polyline, q: &'a Polyline) -> Vec<FrechetDecider<'a>> {
        vec![
            FrechetDecider::new(p, q, Decider::Tabular).unwrap(),
            FrechetDecider::new(p, q, Decider::PathSearch).unwrap(),
        ]
    }

    #[test]
    fn zigzag_threshold() {
        let p = line(&[1.0, 2.0, 4.0, 5.0]);
        let q = line(&[2.0, 5.0, 1.0, 5.0]);

        for mut decider in deciders(&p, &q) {
            assert!(!decider.decide(1.9));
            assert!(decider.decide(2.0));
        }
    }

    #[test]
    fn identical_curves_at_zero() {
        let p = Polyline::new(vec![vec![0.0, 0.0], vec![1.0, 2.0], vec![3.0, 1.0]]).unwrap();
        let q = p.clone();

        for mut decider in deciders(&p, &q) {
            assert!(decider.decide(0.0));
        }
    }

    #[test]
    fn endpoint_gap_is_an_early_no() {
        let p = line(&[0.0, 1.0]);
        let q = line(&[0.0, 5.0]);

        for mut decider in deciders(&p, &q) {
            assert!(!decider.decide(3.9));
            assert!(decider.decide(4.0));
        }
    }

    #[test]
    fn parallel_offset_segments() {
        let p = Polyline::new(vec![vec![0.0, 0.0], vec![4.0, 0.0]]).unwrap();
        let q = Polyline::new(vec![vec![0.0, 1.0], vec![4.0, 1.0]]).unwrap();

        for mut decider in deciders(&p, &q) {
            assert!(!decider.decide(0.99));
            assert!(decider.decide(1.0));
        }
    }

    #[test]
    fn reuse_across_radii() {
        let p = line(&[1.0, 2.0, 4.0, 5.0]);
        let q = line(&[2.0, 5.0, 1.0, 5.0]);

        let mut decider = FrechetDecider::new(&p, &q, Decider::PathSearch).unwrap();
        assert!(decider.decide(5.0));
        assert!(!decider.decide(1.5));
        assert!(decider.decide(2.5));
        assert!(!decider.decide(1.9));
        assert!(decider.decide(2.0));
    }

    #[test]
    fn rejects_mismatched_dimensions() {
        let p = line(&[1.0, 2.0]);
        let q = Polyline::new(vec![vec![1.0, 1.0], vec![2.0, 2.0]]).unwrap();

        assert!(FrechetDecider::new(&p, &q, Decider::Tabular).is_err());
    }

    #[test]
    fn deciders_agree_on_skewed_grids() {
        // Deliberately unequal vertex counts so the grid is rectangular.
        let p = line(&[0.0, 3.0, 0.0, 3.0, 0.0, 3.0, 0.0]);
        let q = line(&[0.0, 3.0, 0.0]);

        for radius in [0.4, 0.9, 1.4, 1.5, 1.6, 2.9, 3.1] {
            let mut tabular = FrechetDecider::new(&p, &q, Decider::Tabular).unwrap();
            let mut path = FrechetDecider::new(&p, &q, Decider::PathSearch).unwrap();

            assert_eq!(
                tabular.decide(radius),
                path.decide(radius),
                "deciders disagree at radius {radius}"
            );
        }
    }
}
