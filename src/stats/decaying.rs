//! An exponentially-decaying random sample of values.
//!
//! Uses Cormode et al's forward-decaying priority reservoir sampling method to produce a
//! statistically representative sample, exponentially biased towards newer entries.
//! See Cormode et al. "Forward Decay: A Practical Time Decay Model for Streaming Systems",
//! ICDE '09.
//!
//! Weights are `exp(alpha * (t - landmark))`. To keep the exponent from growing without bound,
//! every priority is periodically rescaled relative to a new landmark, which leaves the
//! relative weighting of the sample untouched.

use crate::core::clock::{default_clock, Clock};
use crate::core::error::{self, MetricError};
use crate::core::random::{default_random, Random};
use crate::core::MetricValue;
use crate::stats::{Reservoir, Snapshot};

use crossbeam_skiplist::SkipMap;
use ordered_float::OrderedFloat;
use parking_lot::RwLock;

use std::cmp::min;
use std::mem;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering::*;
use std::sync::Arc;

/// Number of values kept by default, offering a 99.9% confidence level
/// with a 5% margin of error assuming a normal distribution.
pub const DEFAULT_SIZE: usize = 1028;

/// Default decay factor, heavily biasing the sample towards the last 5 minutes.
pub const DEFAULT_ALPHA: f64 = 0.015;

/// Priorities are rescaled every hour of clock ticks.
const RESCALE_THRESHOLD: u64 = 60 * 60 * 1_000_000_000;

type Priority = OrderedFloat<f64>;

/// Everything a rescale rewrites.
struct Landmark {
    values: SkipMap<Priority, MetricValue>,
    count: AtomicU64,
    /// Epoch seconds relative to which weights are computed.
    start_time: u64,
}

/// Forward-decaying priority reservoir.
/// Updates share the landmark and insert into a lock-free ordered map;
/// a rescale excludes every other operation while it rewrites the priorities.
pub struct ExponentiallyDecayingReservoir {
    landmark: RwLock<Landmark>,
    alpha: f64,
    size: usize,
    next_scale_time: AtomicU64,
    clock: Arc<dyn Clock>,
    random: Arc<dyn Random>,
}

impl Default for ExponentiallyDecayingReservoir {
    /// A reservoir of 1028 values with a decay factor of 0.015.
    fn default() -> Self {
        ExponentiallyDecayingReservoir::unchecked(DEFAULT_SIZE, DEFAULT_ALPHA, default_clock(), default_random())
    }
}

impl ExponentiallyDecayingReservoir {
    /// A reservoir keeping `size` values, biased towards newer ones by `alpha`.
    /// The higher `alpha` is, the more biased the sample is towards newer values.
    pub fn new(size: usize, alpha: f64) -> error::Result<Self> {
        ExponentiallyDecayingReservoir::with_clock(size, alpha, default_clock())
    }

    pub fn with_clock(size: usize, alpha: f64, clock: Arc<dyn Clock>) -> error::Result<Self> {
        ExponentiallyDecayingReservoir::with_parts(size, alpha, clock, default_random())
    }

    pub fn with_parts(size: usize, alpha: f64, clock: Arc<dyn Clock>, random: Arc<dyn Random>) -> error::Result<Self> {
        if size == 0 {
            return Err(MetricError::InvalidReservoirSize(size).into());
        }
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(MetricError::InvalidAlpha(alpha).into());
        }
        Ok(ExponentiallyDecayingReservoir::unchecked(size, alpha, clock, random))
    }

    fn unchecked(size: usize, alpha: f64, clock: Arc<dyn Clock>, random: Arc<dyn Random>) -> Self {
        trace!("New decaying reservoir of {} values, alpha {}", size, alpha);
        let start_time = epoch_seconds(&*clock);
        let next_scale_time = clock.tick() + RESCALE_THRESHOLD;
        ExponentiallyDecayingReservoir {
            landmark: RwLock::new(Landmark {
                values: SkipMap::new(),
                count: AtomicU64::new(0),
                start_time,
            }),
            alpha,
            size,
            next_scale_time: AtomicU64::new(next_scale_time),
            clock,
            random,
        }
    }

    /// Add a value stamped with an explicit epoch time, in seconds.
    pub fn update_at(&self, value: MetricValue, timestamp: u64) {
        self.rescale_if_needed();

        let landmark = self.landmark.read();
        let priority = self.priority(timestamp as f64 - landmark.start_time as f64);
        let new_count = landmark.count.fetch_add(1, AcqRel) + 1;
        let values = &landmark.values;

        if new_count <= self.size as u64 {
            // a colliding priority must not evict a valid entry
            values.get_or_insert(priority, value);
            return;
        }

        let mut first = match values.front() {
            Some(entry) => *entry.key(),
            None => {
                values.get_or_insert(priority, value);
                return;
            }
        };

        // lower priorities decayed out before admission
        if first < priority {
            let mut inserted = false;
            values.get_or_insert_with(priority, || {
                inserted = true;
                value
            });
            if inserted {
                // always evict one entry, another thread may have taken `first` already
                while values.remove(&first).is_none() {
                    first = match values.front() {
                        Some(entry) => *entry.key(),
                        None => break,
                    };
                }
            }
        }
    }

    /// Maximum number of values held.
    pub fn capacity(&self) -> usize {
        self.size
    }

    fn priority(&self, elapsed_seconds: f64) -> Priority {
        let weight = (self.alpha * elapsed_seconds).exp();
        let draw = self.random.next_f64();
        let priority = weight / draw;
        if priority.is_finite() {
            OrderedFloat(priority)
        } else {
            warn!(
                "Clamped decaying reservoir priority (weight {}, draw {}) to the maximum",
                weight, draw
            );
            OrderedFloat(std::f64::MAX)
        }
    }

    fn rescale_if_needed(&self) {
        let now = self.clock.tick();
        let next = self.next_scale_time.load(Acquire);
        if now >= next {
            self.rescale(now, next);
        }
    }

    // "We can therefore multiply each value based on L by a factor of exp(−α(L′ − L)),
    // and obtain the correct value as if we had instead computed relative to a new
    // landmark L′ (and then use this new L′ at query time). This can be done with
    // a linear pass over whatever data structure is being used."
    fn rescale(&self, now: u64, next: u64) {
        // only one thread gets to rescale
        if self
            .next_scale_time
            .compare_exchange(next, now + RESCALE_THRESHOLD, AcqRel, Acquire)
            .is_err()
        {
            return;
        }

        let mut guard = self.landmark.write();
        let landmark = &mut *guard;
        let old_start_time = landmark.start_time;
        landmark.start_time = epoch_seconds(&*self.clock);
        let factor = (-self.alpha * (landmark.start_time as f64 - old_start_time as f64)).exp();

        let old_values = mem::replace(&mut landmark.values, SkipMap::new());
        let values = &landmark.values;
        for entry in old_values.iter() {
            values.insert(OrderedFloat(entry.key().0 * factor), *entry.value());
        }

        // keep the counter in sync with the number of stored samples
        landmark.count.store(values.len() as u64, Release);
        debug!(
            "Rescaled decaying reservoir by {} to landmark {}s, {} values kept",
            factor,
            landmark.start_time,
            values.len()
        );
    }
}

fn epoch_seconds(clock: &dyn Clock) -> u64 {
    clock.time() / 1000
}

impl Reservoir for ExponentiallyDecayingReservoir {
    fn update(&self, value: MetricValue) {
        self.update_at(value, epoch_seconds(&*self.clock))
    }

    fn size(&self) -> usize {
        // an eviction briefly holds one extra entry
        min(self.size, self.landmark.read().values.len())
    }

    fn snapshot(&self) -> Snapshot {
        let landmark = self.landmark.read();
        // evictions in flight briefly leave extra low priority entries behind
        Snapshot::of(
            landmark
                .values
                .iter()
                .rev()
                .take(self.size)
                .map(|entry| *entry.value()),
        )
    }

    fn clear(&self) {
        let mut landmark = self.landmark.write();
        landmark.values.clear();
        landmark.count.store(0, Release);
        landmark.start_time = epoch_seconds(&*self.clock);
        self.next_scale_time
            .store(self.clock.tick() + RESCALE_THRESHOLD, Release);
    }
}

#[cfg(feature = "bench")]
mod bench {

    use super::*;

    #[bench]
    fn decaying_update(b: &mut test::Bencher) {
        let reservoir = ExponentiallyDecayingReservoir::default();
        let mut i = 0;
        b.iter(|| {
            i += 1;
            test::black_box(reservoir.update(i))
        });
    }

    #[bench]
    fn decaying_snapshot(b: &mut test::Bencher) {
        let reservoir = ExponentiallyDecayingReservoir::default();
        for i in 0..2000 {
            reservoir.update(i);
        }
        b.iter(|| test::black_box(reservoir.snapshot()));
    }
}
