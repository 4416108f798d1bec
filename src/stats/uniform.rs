//! A random sample of a stream where every value has the same odds of being kept.
//! Uses Vitter's Algorithm R.

use crate::core::error::{self, MetricError};
use crate::core::random::{default_random, Random};
use crate::core::MetricValue;
use crate::stats::{Reservoir, Snapshot};

use std::cmp::min;
use std::sync::atomic::Ordering::*;
use std::sync::atomic::{AtomicI64, AtomicU64};
use std::sync::Arc;
use std::thread;

/// Fixed-capacity uniform sample.
/// Slots are individual atomics and a snapshot never observes a torn value.
/// While filling, each update waits for earlier slots to be stored and a snapshot
/// only reads that stored prefix. Once full, updates never block each other.
pub struct UniformReservoir {
    count: AtomicU64,
    /// Number of leading slots holding an offered value.
    filled: AtomicU64,
    values: Box<[AtomicI64]>,
    random: Arc<dyn Random>,
}

impl UniformReservoir {
    /// A reservoir holding at most `size` values, using the shared random source.
    pub fn new(size: usize) -> error::Result<UniformReservoir> {
        UniformReservoir::with_random(size, default_random())
    }

    pub fn with_random(size: usize, random: Arc<dyn Random>) -> error::Result<UniformReservoir> {
        if size == 0 {
            return Err(MetricError::InvalidReservoirSize(size).into());
        }
        trace!("New uniform reservoir of {} values", size);
        Ok(UniformReservoir {
            count: AtomicU64::new(0),
            filled: AtomicU64::new(0),
            values: (0..size).map(|_| AtomicI64::new(0)).collect(),
            random,
        })
    }

    /// Maximum number of values held.
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// Number of values ever offered to the reservoir.
    pub fn count(&self) -> u64 {
        self.count.load(Acquire)
    }

    /// Extend the filled prefix past `slot` once every earlier slot is stored.
    fn publish(&self, slot: u64) {
        loop {
            match self.filled.compare_exchange_weak(slot, slot + 1, AcqRel, Acquire) {
                Ok(_) => return,
                // already published, or cleared since this slot was claimed
                Err(filled) if filled > slot || self.count.load(Acquire) <= slot => return,
                Err(_) => thread::yield_now(),
            }
        }
    }
}

impl Reservoir for UniformReservoir {
    fn update(&self, value: MetricValue) {
        let count = self.count.fetch_add(1, AcqRel) + 1;
        let capacity = self.values.len() as u64;
        if count <= capacity {
            let slot = count - 1;
            self.values[slot as usize].store(value, Release);
            self.publish(slot);
        } else {
            let slot = self.random.next_below(count);
            if slot < capacity {
                self.values[slot as usize].store(value, Release);
            }
        }
    }

    fn size(&self) -> usize {
        min(self.filled.load(Acquire), self.values.len() as u64) as usize
    }

    fn snapshot(&self) -> Snapshot {
        let size = self.size();
        Snapshot::of(self.values[..size].iter().map(|slot| slot.load(Acquire)))
    }

    fn clear(&self) {
        self.filled.store(0, Release);
        self.count.store(0, Release);
    }
}

#[cfg(feature = "bench")]
mod bench {

    use super::*;

    #[bench]
    fn uniform_update(b: &mut test::Bencher) {
        let reservoir = UniformReservoir::new(1028).unwrap();
        let mut i = 0;
        b.iter(|| {
            i += 1;
            test::black_box(reservoir.update(i))
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::random::SeededRandom;

    #[test]
    fn a_reservoir_of_100_out_of_1000_elements() {
        let reservoir = UniformReservoir::new(100).unwrap();
        for i in 0..1000 {
            reservoir.update(i);
        }

        assert_eq!(reservoir.size(), 100);
        assert_eq!(reservoir.count(), 1000);

        let snapshot = reservoir.snapshot();
        assert_eq!(snapshot.size(), 100);
        for value in snapshot.values() {
            assert!(*value >= 0.0 && *value < 1000.0);
        }
    }

    #[test]
    fn a_reservoir_of_100_out_of_10_elements() {
        let reservoir = UniformReservoir::new(100).unwrap();
        for i in 0..10 {
            reservoir.update(i);
        }
        assert_eq!(reservoir.size(), 10);
        assert_eq!(
            reservoir.snapshot().values(),
            &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
        );
    }

    #[test]
    fn empty_reservoir_yields_empty_snapshot() {
        let reservoir = UniformReservoir::new(10).unwrap();
        let snapshot = reservoir.snapshot();
        assert_eq!(snapshot.size(), 0);
        assert_eq!(snapshot.mean(), 0.0);
        assert_eq!(snapshot.max(), 0.0);
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(UniformReservoir::new(0).is_err());
    }

    #[test]
    fn clear_starts_over() {
        let reservoir = UniformReservoir::new(10).unwrap();
        for i in 0..50 {
            reservoir.update(i);
        }
        reservoir.clear();
        assert_eq!(reservoir.size(), 0);
        reservoir.update(42);
        assert_eq!(reservoir.snapshot().values(), &[42.0]);
    }

    #[test]
    fn selection_is_approximately_uniform() {
        let random: Arc<dyn Random> = Arc::new(SeededRandom::new(1234));
        let mut hits = [0u32; 100];
        let trials = 2000;
        for _ in 0..trials {
            let reservoir = UniformReservoir::with_random(10, random.clone()).unwrap();
            for i in 0..100 {
                reservoir.update(i);
            }
            for value in reservoir.snapshot().values() {
                hits[*value as usize] += 1;
            }
        }
        // every value has a 10% chance of being kept: 200 expected hits per value
        for (value, count) in hits.iter().enumerate() {
            assert!(
                *count > 120 && *count < 280,
                "value {} was kept {} times out of {}",
                value,
                count,
                trials
            );
        }
    }

    #[test]
    fn snapshots_taken_while_filling_only_hold_offered_values() {
        let reservoir = Arc::new(UniformReservoir::new(100_000).unwrap());
        let writers: Vec<_> = (0..4)
            .map(|_| {
                let reservoir = reservoir.clone();
                thread::spawn(move || {
                    // zero is never offered
                    for i in 1..=20_000 {
                        reservoir.update(i);
                    }
                })
            })
            .collect();

        while reservoir.size() < 80_000 {
            let snapshot = reservoir.snapshot();
            assert!(snapshot.values().iter().all(|value| *value >= 1.0));
        }
        for writer in writers {
            writer.join().unwrap();
        }
        assert_eq!(reservoir.snapshot().min(), 1.0);
    }
}
