use crate::core::error::{self, MetricError};
use crate::core::MetricValue;
use crate::stats::{Reservoir, Snapshot};

use parking_lot::Mutex;

use std::cmp::min;

/// Keeps the last `size` values offered, nothing older.
pub struct SlidingWindowReservoir {
    window: Mutex<Window>,
}

struct Window {
    values: Box<[MetricValue]>,
    count: u64,
}

impl SlidingWindowReservoir {
    pub fn new(size: usize) -> error::Result<SlidingWindowReservoir> {
        if size == 0 {
            return Err(MetricError::InvalidReservoirSize(size).into());
        }
        trace!("New sliding window reservoir of {} values", size);
        Ok(SlidingWindowReservoir {
            window: Mutex::new(Window {
                values: vec![0; size].into_boxed_slice(),
                count: 0,
            }),
        })
    }
}

impl Reservoir for SlidingWindowReservoir {
    fn update(&self, value: MetricValue) {
        let mut window = self.window.lock();
        let slot = (window.count % window.values.len() as u64) as usize;
        window.values[slot] = value;
        window.count += 1;
    }

    fn size(&self) -> usize {
        let window = self.window.lock();
        min(window.count, window.values.len() as u64) as usize
    }

    fn snapshot(&self) -> Snapshot {
        let window = self.window.lock();
        let size = min(window.count, window.values.len() as u64) as usize;
        Snapshot::of(window.values[..size].iter().cloned())
    }

    fn clear(&self) {
        self.window.lock().count = 0;
    }
}
