use crate::core::MetricValue;
use crate::stats::{ExponentiallyDecayingReservoir, Reservoir, Snapshot};

use std::fmt;
use std::sync::atomic::Ordering::*;
use std::sync::atomic::{AtomicI64, AtomicU64};

/// The distribution of a stream of values, sampled by a reservoir.
/// Count and sum are exact, quantiles come from the sample.
pub struct Histogram {
    reservoir: Box<dyn Reservoir>,
    count: AtomicU64,
    sum: AtomicI64,
}

impl fmt::Debug for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Histogram {{ count: {}, sum: {} }}", self.count(), self.sum())
    }
}

impl Default for Histogram {
    /// Backed by an exponentially decaying reservoir biased to the last five minutes.
    fn default() -> Self {
        Histogram::new(Box::new(ExponentiallyDecayingReservoir::default()))
    }
}

impl Histogram {
    pub fn new(reservoir: Box<dyn Reservoir>) -> Histogram {
        trace!("New histogram");
        Histogram {
            reservoir,
            count: AtomicU64::new(0),
            sum: AtomicI64::new(0),
        }
    }

    /// Record a value.
    pub fn update(&self, value: MetricValue) {
        self.count.fetch_add(1, AcqRel);
        self.sum.fetch_add(value, AcqRel);
        self.reservoir.update(value);
    }

    /// Number of values ever recorded.
    pub fn count(&self) -> u64 {
        self.count.load(Acquire)
    }

    /// Sum of all values ever recorded, wrapping on overflow.
    pub fn sum(&self) -> i64 {
        self.sum.load(Acquire)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.reservoir.snapshot()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.reservoir.clear();
        self.count.store(0, Release);
        self.sum.store(0, Release);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::stats::UniformReservoir;

    fn histogram() -> Histogram {
        Histogram::new(Box::new(UniformReservoir::new(100).unwrap()))
    }

    #[test]
    fn empty_histogram() {
        let histogram = histogram();
        assert_eq!(histogram.count(), 0);
        assert_eq!(histogram.sum(), 0);
        assert!(histogram.snapshot().is_empty());
    }

    #[test]
    fn updates_count_sum_and_sample() {
        let histogram = histogram();
        for value in 1..=10 {
            histogram.update(value);
        }

        assert_eq!(histogram.count(), 10);
        assert_eq!(histogram.sum(), 55);

        let snapshot = histogram.snapshot();
        assert_eq!(snapshot.size(), 10);
        assert_eq!(snapshot.min(), 1.0);
        assert_eq!(snapshot.max(), 10.0);
        assert_eq!(snapshot.median(), 5.5);
    }

    #[test]
    fn count_stays_exact_past_reservoir_capacity() {
        let histogram = Histogram::new(Box::new(UniformReservoir::new(10).unwrap()));
        for value in 0..1000 {
            histogram.update(value);
        }
        assert_eq!(histogram.count(), 1000);
        assert_eq!(histogram.snapshot().size(), 10);
    }

    #[test]
    fn clear_forgets_everything() {
        let histogram = histogram();
        histogram.update(5);
        histogram.clear();
        assert_eq!(histogram.count(), 0);
        assert_eq!(histogram.sum(), 0);
        assert!(histogram.snapshot().is_empty());
    }
}
