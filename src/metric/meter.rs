use crate::core::clock::{default_clock, Clock, TimeUnit};
use crate::stats::{Ewma, TICK_INTERVAL};

use std::cmp::min;
use std::convert::TryFrom;
use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering::*;
use std::sync::Arc;

/// Longest idle stretch replayed tick by tick, two days' worth.
/// Past it the fifteen-minute rate has decayed by more than e^-190.
pub const MAX_CATCH_UP_TICKS: u64 = 2 * 24 * 60 * 12;

/// Measures mean throughput and one-, five- and fifteen-minute
/// exponentially-weighted moving average throughputs.
///
/// No background thread is required: ticks missed while idle are replayed
/// lazily on the next mark or read.
pub struct Meter {
    count: AtomicU64,
    m1_rate: Ewma,
    m5_rate: Ewma,
    m15_rate: Ewma,
    start_time: u64,
    last_tick: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for Meter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Meter {{ count: {} }}", self.count())
    }
}

impl Default for Meter {
    fn default() -> Self {
        Meter::new()
    }
}

impl Meter {
    /// A meter using the shared process clock.
    pub fn new() -> Meter {
        Meter::with_clock(default_clock())
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Meter {
        let start_time = clock.tick();
        Meter {
            count: AtomicU64::new(0),
            m1_rate: Ewma::one_minute(),
            m5_rate: Ewma::five_minutes(),
            m15_rate: Ewma::fifteen_minutes(),
            start_time,
            last_tick: AtomicU64::new(start_time),
            clock,
        }
    }

    /// Mark the occurrence of an event.
    pub fn mark_one(&self) {
        self.mark(1)
    }

    /// Mark the occurrence of a given number of events.
    pub fn mark(&self, n: u64) {
        self.tick_if_necessary();
        self.count.fetch_add(n, AcqRel);
        let n = i64::try_from(n).unwrap_or(i64::max_value());
        self.m1_rate.update(n);
        self.m5_rate.update(n);
        self.m15_rate.update(n);
    }

    /// Fold pending events into the moving averages.
    /// Only needed by callers driving ticks themselves on the five second period.
    pub fn tick(&self) {
        self.m1_rate.tick();
        self.m5_rate.tick();
        self.m15_rate.tick();
    }

    fn tick_if_necessary(&self) {
        let interval = TICK_INTERVAL.as_nanos() as u64;
        let old_tick = self.last_tick.load(Acquire);
        let new_tick = self.clock.tick();
        if new_tick < old_tick {
            warn!("Meter clock went backwards by {}ns, no ticks replayed", old_tick - new_tick);
            return;
        }

        let age = new_tick - old_tick;
        if age > interval {
            let new_interval_start = new_tick - age % interval;
            // one thread replays the missed ticks, the others move on
            if self
                .last_tick
                .compare_exchange(old_tick, new_interval_start, AcqRel, Acquire)
                .is_ok()
            {
                let required = age / interval;
                if required > MAX_CATCH_UP_TICKS {
                    debug!("Meter idle for {} ticks, replaying only {}", required, MAX_CATCH_UP_TICKS);
                }
                for _ in 0..min(required, MAX_CATCH_UP_TICKS) {
                    self.tick();
                }
            }
        }
    }

    /// Total number of events marked, exact.
    pub fn count(&self) -> u64 {
        self.count.load(Acquire)
    }

    /// Events per second since the meter was created.
    pub fn mean_rate(&self) -> f64 {
        self.mean_rate_per(TimeUnit::Seconds)
    }

    pub fn mean_rate_per(&self, unit: TimeUnit) -> f64 {
        let count = self.count();
        let elapsed = self.clock.tick().saturating_sub(self.start_time);
        if count == 0 || elapsed == 0 {
            return 0.0;
        }
        count as f64 / elapsed as f64 * unit.nanos() as f64
    }

    /// One-minute moving average, in events per second.
    pub fn one_minute_rate(&self) -> f64 {
        self.one_minute_rate_per(TimeUnit::Seconds)
    }

    pub fn one_minute_rate_per(&self, unit: TimeUnit) -> f64 {
        self.tick_if_necessary();
        self.m1_rate.rate(unit)
    }

    /// Five-minute moving average, in events per second.
    pub fn five_minute_rate(&self) -> f64 {
        self.five_minute_rate_per(TimeUnit::Seconds)
    }

    pub fn five_minute_rate_per(&self, unit: TimeUnit) -> f64 {
        self.tick_if_necessary();
        self.m5_rate.rate(unit)
    }

    /// Fifteen-minute moving average, in events per second.
    pub fn fifteen_minute_rate(&self) -> f64 {
        self.fifteen_minute_rate_per(TimeUnit::Seconds)
    }

    pub fn fifteen_minute_rate_per(&self, unit: TimeUnit) -> f64 {
        self.tick_if_necessary();
        self.m15_rate.rate(unit)
    }
}

#[cfg(feature = "bench")]
mod bench {

    use super::*;

    #[bench]
    fn meter_mark(b: &mut test::Bencher) {
        let meter = Meter::new();
        b.iter(|| test::black_box(meter.mark_one()));
    }
}
