use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering::*;

/// An incrementing and decrementing count.
#[derive(Debug, Default)]
pub struct Counter {
    count: AtomicI64,
}

impl Counter {
    pub fn new() -> Counter {
        Counter::default()
    }

    /// Increment by one.
    pub fn inc(&self) {
        self.inc_by(1)
    }

    pub fn inc_by(&self, n: i64) {
        self.count.fetch_add(n, AcqRel);
    }

    /// Decrement by one.
    pub fn dec(&self) {
        self.dec_by(1)
    }

    pub fn dec_by(&self, n: i64) {
        self.count.fetch_sub(n, AcqRel);
    }

    pub fn count(&self) -> i64 {
        self.count.load(Acquire)
    }
}
