//! Time sources for decay math and reporting.

use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering::*;
use std::sync::Arc;
use std::time::Duration;

const NANOS_PER_MILLI: u64 = 1_000_000;

/// A source of monotonic ticks and wall-clock time.
pub trait Clock: Send + Sync {
    /// Nanosecond counter with an arbitrary origin.
    /// Only meaningful for measuring relative durations.
    fn tick(&self) -> u64;

    /// Milliseconds since the unix epoch.
    fn time(&self) -> u64;
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn tick(&self) -> u64 {
        (**self).tick()
    }

    fn time(&self) -> u64 {
        (**self).time()
    }
}

lazy_static! {
    static ref DEFAULT_CLOCK: Arc<dyn Clock> = Arc::new(SystemClock);
}

/// The shared process clock, used when no other clock is provided.
pub fn default_clock() -> Arc<dyn Clock> {
    DEFAULT_CLOCK.clone()
}

/// Clock backed by the OS monotonic and realtime clocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn tick(&self) -> u64 {
        time::precise_time_ns()
    }

    fn time(&self) -> u64 {
        let now = time::get_time();
        if now.sec < 0 {
            return 0;
        }
        now.sec as u64 * 1000 + (now.nsec as u64 / NANOS_PER_MILLI)
    }
}

/// A clock that only moves when told to.
/// Enables writing reproducible metrics tests without sleeping.
/// Ticks start at zero; `time()` is derived from the ticks.
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
}

impl ManualClock {
    /// A clock frozen at tick zero.
    pub fn new() -> Self {
        ManualClock::starting_at(0)
    }

    /// A clock frozen at an arbitrary tick.
    pub fn starting_at(nanos: u64) -> Self {
        ManualClock {
            nanos: AtomicU64::new(nanos),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, period: Duration) {
        self.add_nanos(period.as_nanos() as u64)
    }

    pub fn add_nanos(&self, nanos: u64) {
        self.nanos.fetch_add(nanos, AcqRel);
    }

    pub fn add_millis(&self, millis: u64) {
        self.add_nanos(millis * NANOS_PER_MILLI)
    }

    pub fn add_seconds(&self, seconds: u64) {
        self.advance(Duration::from_secs(seconds))
    }

    pub fn add_hours(&self, hours: u64) {
        self.advance(Duration::from_secs(hours * 3600))
    }
}

impl Clock for ManualClock {
    fn tick(&self) -> u64 {
        self.nanos.load(Acquire)
    }

    fn time(&self) -> u64 {
        self.tick() / NANOS_PER_MILLI
    }
}

/// Units used to express rates and durations.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Number of nanoseconds in one of this unit.
    pub fn nanos(self) -> u64 {
        match self {
            TimeUnit::Nanoseconds => 1,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Milliseconds => NANOS_PER_MILLI,
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Minutes => 60_000_000_000,
            TimeUnit::Hours => 3_600_000_000_000,
            TimeUnit::Days => 86_400_000_000_000,
        }
    }

    /// Express a nanosecond amount in this unit.
    pub fn convert(self, nanos: f64) -> f64 {
        nanos / self.nanos() as f64
    }

    /// Singular lowercase name, e.g. `second`.
    pub fn name(self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "nanosecond",
            TimeUnit::Microseconds => "microsecond",
            TimeUnit::Milliseconds => "millisecond",
            TimeUnit::Seconds => "second",
            TimeUnit::Minutes => "minute",
            TimeUnit::Hours => "hour",
            TimeUnit::Days => "day",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}s", self.name())
    }
}
