//! Approximation of the continuous Fréchet distance.
//!
//! The exact continuous distance is only ever used through comparisons, so
//! an ε-approximation obtained by bisecting a decision procedure is enough
//! and much cheaper. The discrete Fréchet distance brackets the continuous
//! one from both sides: it is an upper bound, and it overshoots by at most
//! half the longest segment of either curve.

use log::trace;

use crate::decider::{Decider, FrechetDecider};
use crate::discrete::DiscreteFrechet;
use crate::measure::Measure;
use crate::polyline::Polyline;
use crate::Error;

/// The continuous Fréchet distance, approximated to a fixed precision.
///
/// The result is within `precision` of the true distance. The measure is
/// interruptible: a cap prunes the bisection before it starts whenever the
/// discrete bounds already settle the comparison.
#[derive(Copy, Clone, Debug)]
pub struct FrechetDistance {
    precision: f64,
    decider: Decider,
}

impl FrechetDistance {
    /// Uses the path-search decider, the right default for curve
    /// collections where most pairs are similar along the diagonal.
    pub fn new(precision: f64) -> Result<Self, Error> {
        Self::with_decider(precision, Decider::PathSearch)
    }

    pub fn with_decider(precision: f64, decider: Decider) -> Result<Self, Error> {
        if precision <= 0.0 {
            return Err(Error::InvalidPrecision { precision });
        }

        Ok(Self { precision, decider })
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }
}

impl Measure<Polyline> for FrechetDistance {
    fn distance(&self, a: &Polyline, b: &Polyline) -> Result<f64, Error> {
        self.distance_capped(a, b, f64::INFINITY)
    }

    fn distance_capped(&self, a: &Polyline, b: &Polyline, max: f64) -> Result<f64, Error> {
        let discrete = DiscreteFrechet::maximum().distance(a, b)?;
        let longest = a.longest_segment().max(b.longest_segment());

        let mut lower = (discrete - longest / 2.0).max(0.0);
        let mut upper = discrete;

        if max < lower {
            return Ok(f64::INFINITY);
        }

        let mut decider = FrechetDecider::new(a, b, self.decider)?;

        if max < upper {
            if !decider.decide(max) {
                return Ok(f64::INFINITY);
            }
            upper = max;
        }

        let mut probes = 0;
        while (upper - lower) / 2.0 > self.precision {
            let mid = (lower + upper) / 2.0;
            if decider.decide(mid) {
                upper = mid;
            } else {
                lower = mid;
            }
            probes += 1;
        }
        trace!("bisection converged to [{lower}, {upper}] after {probes} probes");

        Ok((lower + upper) / 2.0)
    }

    fn is_interruptible(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    const PRECISION: f64 = 1e-5;

    fn random_walk(rng: &mut StdRng, len: usize, dimension: usize) -> Polyline {
        let mut vertex = vec![0.0; dimension];
        let mut vertices = Vec::with_capacity(len);
        for _ in 0..len {
            for coordinate in vertex.iter_mut() {
                *coordinate += rng.gen_range(-1.0..1.0);
            }
            vertices.push(vertex.clone());
        }
        Polyline::new(vertices).unwrap()
    }

    #[test]
    fn identical_curves_are_at_distance_zero() {
        let p = Polyline::new(vec![vec![0.0, 0.0], vec![1.0, 2.0], vec![3.0, 1.0]]).unwrap();
        let measure = FrechetDistance::new(PRECISION).unwrap();

        assert!(measure.distance(&p, &p).unwrap() <= PRECISION);
    }

    #[test]
    fn matches_the_exact_distance_on_segments() {
        // Two parallel segments at height offset 1: the distance is 1.
        let p = Polyline::new(vec![vec![0.0, 0.0], vec![4.0, 0.0]]).unwrap();
        let q = Polyline::new(vec![vec![0.0, 1.0], vec![4.0, 1.0]]).unwrap();

        for decider in [Decider::Tabular, Decider::PathSearch] {
            let measure = FrechetDistance::with_decider(PRECISION, decider).unwrap();
            assert!((measure.distance(&p, &q).unwrap() - 1.0).abs() <= PRECISION);
        }
    }

    #[test]
    fn subdivision_does_not_change_the_distance() {
        // The continuous distance ignores vertex placement along segments.
        let p = Polyline::new(vec![vec![0.0, 0.0], vec![4.0, 0.0]]).unwrap();
        let q = Polyline::new(vec![
            vec![0.0, 1.0],
            vec![1.0, 1.0],
            vec![2.5, 1.0],
            vec![4.0, 1.0],
        ])
        .unwrap();

        let measure = FrechetDistance::new(PRECISION).unwrap();
        assert!((measure.distance(&p, &q).unwrap() - 1.0).abs() <= PRECISION);
    }

    #[test]
    fn cap_agrees_with_uncapped_distance() {
        let measure = FrechetDistance::new(PRECISION).unwrap();
        let mut rng = StdRng::seed_from_u64(23);

        for _ in 0..20 {
            let p_len = rng.gen_range(3..10);
            let p = random_walk(&mut rng, p_len, 3);
            let q_len = rng.gen_range(3..10);
            let q = random_walk(&mut rng, q_len, 3);

            let distance = measure.distance(&p, &q).unwrap();
            let generous = measure.distance_capped(&p, &q, distance + 1.0).unwrap();
            assert!((generous - distance).abs() <= 2.0 * PRECISION);

            let capped = measure
                .distance_capped(&p, &q, (distance - 1.0).max(0.0) / 2.0)
                .unwrap();
            if distance > 1.0 {
                assert_eq!(capped, f64::INFINITY);
            }
        }
    }

    #[test]
    fn deciders_agree_on_random_walks() {
        let tabular = FrechetDistance::with_decider(PRECISION, Decider::Tabular).unwrap();
        let path = FrechetDistance::with_decider(PRECISION, Decider::PathSearch).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let p_len = rng.gen_range(3..=15);
            let p = random_walk(&mut rng, p_len, 4);
            let q_len = rng.gen_range(3..=15);
            let q = random_walk(&mut rng, q_len, 4);

            let left = tabular.distance(&p, &q).unwrap();
            let right = path.distance(&p, &q).unwrap();
            assert!(
                (left - right).abs() <= 2.0 * PRECISION,
                "deciders disagree: {left} vs {right}"
            );
        }
    }

    #[test]
    fn bounded_by_discrete_distance() {
        let continuous = FrechetDistance::new(PRECISION).unwrap();
        let discrete = DiscreteFrechet::maximum();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let p_len = rng.gen_range(3..12);
            let p = random_walk(&mut rng, p_len, 2);
            let q_len = rng.gen_range(3..12);
            let q = random_walk(&mut rng, q_len, 2);

            let approximate = continuous.distance(&p, &q).unwrap();
            let upper = discrete.distance(&p, &q).unwrap();
            let longest = p.longest_segment().max(q.longest_segment());

            assert!(approximate <= upper + PRECISION);
            assert!(approximate >= upper - longest / 2.0 - PRECISION);
        }
    }

    #[test]
    fn rejects_invalid_precision() {
        assert!(matches!(
            FrechetDistance::new(0.0),
            Err(Error::InvalidPrecision { .. })
        ));
        assert!(FrechetDistance::new(-1e-3).is_err());
    }
}
