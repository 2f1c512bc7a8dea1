pub use crate::continuous::FrechetDistance;
pub use crate::decider::Decider;
pub use crate::decider::FrechetDecider;
pub use crate::discrete::Accumulation;
pub use crate::discrete::DiscreteFrechet;
pub use crate::free_space::free_interval;
pub use crate::free_space::Interval;
pub use crate::measure::Measure;
pub use crate::polyline::Polyline;

pub use crate::Error;
