//! Statistical sampling machinery underlying meters, histograms and timers.

mod decaying;
mod ewma;
mod sliding;
mod sliding_time;
mod snapshot;
mod uniform;

pub use self::decaying::{ExponentiallyDecayingReservoir, DEFAULT_ALPHA, DEFAULT_SIZE};
pub use self::ewma::{Ewma, TICK_INTERVAL};
pub use self::sliding::SlidingWindowReservoir;
pub use self::sliding_time::SlidingTimeWindowReservoir;
pub use self::snapshot::Snapshot;
pub use self::uniform::UniformReservoir;

use crate::core::MetricValue;

/// A bounded, statistically representative sample of a stream of values.
/// Implementations are shared between threads; every method takes `&self`.
pub trait Reservoir: Send + Sync {
    /// Add a value to the sample.
    fn update(&self, value: MetricValue);

    /// Number of values currently held, never more than the reservoir capacity.
    fn size(&self) -> usize;

    /// Sorted copy of the values currently held.
    fn snapshot(&self) -> Snapshot;

    /// Drop every value and start over.
    fn clear(&self);
}
