use crate::core::clock::{default_clock, Clock};
use crate::metric::{Histogram, Meter};
use crate::stats::{Reservoir, Snapshot};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Distribution of durations in nanoseconds, plus the rate at which they happen.
///
/// Durations can be recorded in multiple ways:
/// - with the `time!` macro, which wraps an expression or block with a timer context
/// - with `time(FnOnce)`, which wraps a closure
/// - with `start()`, whose context records when stopped or dropped
/// - with `update(Duration)`, for intervals measured elsewhere
pub struct Timer {
    histogram: Histogram,
    meter: Meter,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Timer {{ count: {} }}", self.count())
    }
}

impl Default for Timer {
    fn default() -> Self {
        Timer::new()
    }
}

impl Timer {
    /// A timer sampling into an exponentially decaying reservoir, on the shared clock.
    pub fn new() -> Timer {
        let clock = default_clock();
        Timer {
            histogram: Histogram::default(),
            meter: Meter::with_clock(clock.clone()),
            clock,
        }
    }

    pub fn with_parts(reservoir: Box<dyn Reservoir>, clock: Arc<dyn Clock>) -> Timer {
        trace!("New timer");
        Timer {
            histogram: Histogram::new(reservoir),
            meter: Meter::with_clock(clock.clone()),
            clock,
        }
    }

    /// Record an externally measured duration.
    pub fn update(&self, duration: Duration) {
        let nanos = duration.as_nanos();
        let nanos = if nanos > i64::max_value() as u128 {
            warn!("Timer duration of {}ns clamped to {}ns", nanos, i64::max_value());
            i64::max_value()
        } else {
            nanos as i64
        };
        self.histogram.update(nanos);
        self.meter.mark_one();
    }

    /// Record the time taken to execute the provided closure.
    pub fn time<F: FnOnce() -> R, R>(&self, operations: F) -> R {
        let _context = self.start();
        operations()
    }

    /// Start timing. The duration is recorded when the context is stopped or dropped.
    pub fn start(&self) -> TimerContext {
        TimerContext {
            timer: self,
            start_time: self.clock.tick(),
            stopped: false,
        }
    }

    /// Number of durations recorded.
    pub fn count(&self) -> u64 {
        self.histogram.count()
    }

    /// Sample of recorded durations, in nanoseconds.
    pub fn snapshot(&self) -> Snapshot {
        self.histogram.snapshot()
    }

    /// Rates at which durations are recorded.
    pub fn meter(&self) -> &Meter {
        &self.meter
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }
}

/// An ongoing measurement.
pub struct TimerContext<'a> {
    timer: &'a Timer,
    start_time: u64,
    stopped: bool,
}

impl<'a> TimerContext<'a> {
    /// Record and return the time elapsed since `Timer::start`.
    pub fn stop(mut self) -> Duration {
        self.stopped = true;
        self.record()
    }

    fn record(&self) -> Duration {
        let elapsed = Duration::from_nanos(self.timer.clock.tick().saturating_sub(self.start_time));
        self.timer.update(elapsed);
        elapsed
    }
}

impl<'a> Drop for TimerContext<'a> {
    fn drop(&mut self) {
        if !self.stopped {
            self.record();
        }
    }
}

#[cfg(feature = "bench")]
mod bench {

    use super::*;

    #[bench]
    fn timer_start_stop(b: &mut test::Bencher) {
        let timer = Timer::new();
        b.iter(|| test::black_box(timer.start().stop()));
    }
}
