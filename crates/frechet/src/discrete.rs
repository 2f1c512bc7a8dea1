//! Discrete Fréchet distances.
//!
//! The discrete Fréchet distance restricts the continuous one to couplings
//! of vertices: both curves are traversed front to back, each step advances
//! one curve or both by one vertex, and the cost of a coupling is the
//! accumulated distance over all simultaneously visited vertex pairs. The
//! distance is the minimum cost over all couplings.
//!
//! The accumulation is pluggable: taking the maximum pair distance yields
//! the classic min-max coupling, summing the pair distances yields the
//! integral variant, which rewards couplings that stay close on average.

use crate::measure::Measure;
use crate::polyline::{check_dimensions, distance, Polyline};
use crate::Error;

/// How per-pair distances combine along a coupling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Accumulation {
    /// `max(a, b)`: the classic discrete Fréchet distance.
    Maximum,
    /// `a + b`: the integral discrete Fréchet distance.
    Sum,
}

/// The discrete Fréchet distance over a fixed [`Accumulation`].
///
/// Stateless; the two stock variants are available as
/// [`DiscreteFrechet::maximum`] and [`DiscreteFrechet::integral`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiscreteFrechet {
    accumulation: Accumulation,
}

impl DiscreteFrechet {
    pub const fn new(accumulation: Accumulation) -> Self {
        Self { accumulation }
    }

    /// The min-max coupling variant.
    pub const fn maximum() -> Self {
        Self::new(Accumulation::Maximum)
    }

    /// The sum-of-pair-distances variant.
    pub const fn integral() -> Self {
        Self::new(Accumulation::Sum)
    }

    pub const fn accumulation(&self) -> Accumulation {
        self.accumulation
    }

    fn accumulate(&self, path: f64, pair: f64) -> f64 {
        match self.accumulation {
            Accumulation::Maximum => path.max(pair),
            Accumulation::Sum => path + pair,
        }
    }
}

impl Measure<Polyline> for DiscreteFrechet {
    fn distance(&self, a: &Polyline, b: &Polyline) -> Result<f64, Error> {
        self.distance_capped(a, b, f64::INFINITY)
    }

    /// Dynamic program over the vertex pairing grid, kept in two rolling
    /// rows so memory stays linear in the shorter curve.
    ///
    /// The accumulated cost never decreases along a coupling, so the
    /// minimum of a finished row bounds the final cost from below; once it
    /// exceeds `max` the result is the infinity sentinel.
    fn distance_capped(&self, a: &Polyline, b: &Polyline, max: f64) -> Result<f64, Error> {
        check_dimensions(a, b)?;

        // Outer loop over the longer curve, rows sized by the shorter one.
        let (p, q) = if a.len() >= b.len() { (a, b) } else { (b, a) };
        let columns = q.len();

        let mut previous = vec![0.0_f64; columns];
        let mut current = vec![0.0_f64; columns];

        previous[0] = distance(p.vertex(0), q.vertex(0));
        for j in 1..columns {
            previous[j] = self.accumulate(previous[j - 1], distance(p.vertex(0), q.vertex(j)));
        }
        if previous.iter().fold(f64::INFINITY, |a, &b| a.min(b)) > max {
            return Ok(f64::INFINITY);
        }

        for i in 1..p.len() {
            let row = p.vertex(i);
            current[0] = self.accumulate(previous[0], distance(row, q.vertex(0)));
            let mut row_minimum = current[0];

            for j in 1..columns {
                let best = previous[j].min(current[j - 1]).min(previous[j - 1]);
                current[j] = self.accumulate(best, distance(row, q.vertex(j)));
                row_minimum = row_minimum.min(current[j]);
            }

            if row_minimum > max {
                return Ok(f64::INFINITY);
            }

            std::mem::swap(&mut previous, &mut current);
        }

        let total = previous[columns - 1];
        Ok(if total <= max { total } else { f64::INFINITY })
    }

    fn is_interruptible(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(values: &[f64]) -> Polyline {
        Polyline::new(values.iter().map(|&v| vec![v]).collect()).unwrap()
    }

    #[test]
    fn maximum_on_one_dimensional_curves() {
        let p = line(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let measure = DiscreteFrechet::maximum();

        assert_eq!(measure.distance(&p, &line(&[1.0, 2.0, 4.0, 5.0])).unwrap(), 1.0);
        assert_eq!(
            measure
                .distance(&p, &line(&[1.0, 1.5, 2.5, 3.5, 4.5, 5.0]))
                .unwrap(),
            0.5
        );
        assert_eq!(
            measure.distance(&p, &line(&[1.0, 5.0, 1.0, 5.0])).unwrap(),
            2.0
        );
    }

    #[test]
    fn integral_on_one_dimensional_curves() {
        let p = line(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let measure = DiscreteFrechet::integral();

        assert_eq!(measure.distance(&p, &line(&[1.0, 2.0, 4.0, 5.0])).unwrap(), 1.0);
        assert_eq!(
            measure
                .distance(&p, &line(&[1.0, 1.5, 2.5, 3.5, 4.5, 5.0]))
                .unwrap(),
            2.0
        );
        assert_eq!(
            measure.distance(&p, &line(&[1.0, 5.0, 1.0, 5.0])).unwrap(),
            6.0
        );
    }

    #[test]
    fn identity_and_symmetry() {
        let p = line(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let q = line(&[1.0, 5.0, 1.0, 5.0]);

        for measure in [DiscreteFrechet::maximum(), DiscreteFrechet::integral()] {
            assert_eq!(measure.distance(&p, &p).unwrap(), 0.0);
            assert_eq!(
                measure.distance(&p, &q).unwrap(),
                measure.distance(&q, &p).unwrap()
            );
        }
    }

    #[test]
    fn cap_returns_sentinel() {
        let p = line(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let q = line(&[1.0, 5.0, 1.0, 5.0]);
        let measure = DiscreteFrechet::maximum();

        assert_eq!(measure.distance_capped(&p, &q, 2.0).unwrap(), 2.0);
        assert_eq!(
            measure.distance_capped(&p, &q, 1.9).unwrap(),
            f64::INFINITY
        );
        assert!(measure.is_interruptible());
    }

    #[test]
    fn rejects_mismatched_dimensions() {
        let p = line(&[1.0, 2.0]);
        let q = Polyline::new(vec![vec![1.0, 1.0], vec![2.0, 2.0]]).unwrap();

        assert!(matches!(
            DiscreteFrechet::maximum().distance(&p, &q),
            Err(Error::DimensionMismatch { left: 1, right: 2 })
        ));
    }

    #[test]
    fn two_dimensional_curves() {
        let p = Polyline::new(vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![2.0, 0.0]]).unwrap();
        let q = Polyline::new(vec![vec![0.0, 1.0], vec![1.0, 1.0], vec![2.0, 1.0]]).unwrap();

        assert_eq!(DiscreteFrechet::maximum().distance(&p, &q).unwrap(), 1.0);
        assert_eq!(DiscreteFrechet::integral().distance(&p, &q).unwrap(), 3.0);
    }
}
