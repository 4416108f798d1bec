//! Random sources for reservoir sampling.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{thread_rng, Rng, SeedableRng};

use std::sync::Arc;

/// A thread-safe source of uniform random numbers.
pub trait Random: Send + Sync {
    /// A double uniformly drawn from `[0, 1)`.
    fn next_f64(&self) -> f64;

    /// An integer uniformly drawn from `[0, bound)`.
    /// `bound` is never zero.
    fn next_below(&self, bound: u64) -> u64;
}

impl<T: Random + ?Sized> Random for Arc<T> {
    fn next_f64(&self) -> f64 {
        (**self).next_f64()
    }

    fn next_below(&self, bound: u64) -> u64 {
        (**self).next_below(bound)
    }
}

lazy_static! {
    static ref DEFAULT_RANDOM: Arc<dyn Random> = Arc::new(ThreadRandom);
}

/// The shared random source, used when no other source is provided.
pub fn default_random() -> Arc<dyn Random> {
    DEFAULT_RANDOM.clone()
}

/// Draws from the calling thread's own generator, never contended.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl Random for ThreadRandom {
    fn next_f64(&self) -> f64 {
        thread_rng().gen::<f64>()
    }

    fn next_below(&self, bound: u64) -> u64 {
        thread_rng().gen_range(0..bound)
    }
}

/// Deterministic generator for reproducible tests.
/// Draws are serialized through a mutex.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        SeededRandom {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Random for SeededRandom {
    fn next_f64(&self) -> f64 {
        self.rng.lock().gen::<f64>()
    }

    fn next_below(&self, bound: u64) -> u64 {
        self.rng.lock().gen_range(0..bound)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn seeded_random_is_reproducible() {
        let a = SeededRandom::new(7);
        let b = SeededRandom::new(7);
        for _ in 0..100 {
            assert_eq!(a.next_f64(), b.next_f64());
            assert_eq!(a.next_below(1000), b.next_below(1000));
        }
    }

    #[test]
    fn draws_stay_in_range() {
        let random = default_random();
        for bound in 1..200 {
            let x = random.next_f64();
            assert!(x >= 0.0 && x < 1.0);
            assert!(random.next_below(bound) < bound);
        }
    }
}
