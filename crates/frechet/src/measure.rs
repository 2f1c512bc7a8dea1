//! The contract for pairwise dissimilarity measures.

use crate::Error;

/// A symmetric, non-negative dissimilarity over values of type `T` with
/// `distance(a, a) == 0`.
///
/// Implementations come in two flavors. A *direct* measure overrides
/// [`Measure::distance`] and inherits the default capped evaluation, which
/// computes the full distance and compares it against the cap afterwards.
/// An *interruptible* measure overrides [`Measure::distance_capped`] with a
/// cheaper early-exit computation and defines `distance` as
/// `distance_capped(a, b, f64::INFINITY)`; it reports the capability via
/// [`Measure::is_interruptible`] so callers can decide whether running caps
/// actually save work.
pub trait Measure<T: ?Sized>: Send + Sync {
    /// The dissimilarity between `a` and `b`.
    fn distance(&self, a: &T, b: &T) -> Result<f64, Error>;

    /// The dissimilarity between `a` and `b` if it does not exceed `max`,
    /// `f64::INFINITY` otherwise.
    fn distance_capped(&self, a: &T, b: &T, max: f64) -> Result<f64, Error> {
        let distance = self.distance(a, b)?;
        Ok(if distance <= max {
            distance
        } else {
            f64::INFINITY
        })
    }

    /// Whether [`Measure::distance_capped`] can abort early instead of
    /// emulating the cap after a full computation.
    fn is_interruptible(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Absolute;

    impl Measure<f64> for Absolute {
        fn distance(&self, a: &f64, b: &f64) -> Result<f64, Error> {
            Ok((a - b).abs())
        }
    }

    #[test]
    fn default_cap_emulation() {
        let measure = Absolute;

        assert_eq!(measure.distance(&3.0, &7.5).unwrap(), 4.5);
        assert_eq!(measure.distance_capped(&3.0, &7.5, 4.5).unwrap(), 4.5);
        assert_eq!(
            measure.distance_capped(&3.0, &7.5, 4.4).unwrap(),
            f64::INFINITY
        );
        assert!(!measure.is_interruptible());
    }
}
