use crate::core::clock::{default_clock, Clock};
use crate::core::error::{self, MetricError};
use crate::core::MetricValue;
use crate::stats::{Reservoir, Snapshot};

use parking_lot::Mutex;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Keeps every value offered during the last `window` of clock ticks.
/// Unbounded in size: memory grows with the update rate.
pub struct SlidingTimeWindowReservoir {
    window: u64,
    /// Values in tick order, oldest first.
    measurements: Mutex<Measurements>,
    clock: Arc<dyn Clock>,
}

struct Measurements {
    values: VecDeque<(u64, MetricValue)>,
    last_tick: u64,
}

impl SlidingTimeWindowReservoir {
    /// A reservoir keeping the values of the last `window`, on the shared clock.
    pub fn new(window: Duration) -> error::Result<SlidingTimeWindowReservoir> {
        SlidingTimeWindowReservoir::with_clock(window, default_clock())
    }

    pub fn with_clock(window: Duration, clock: Arc<dyn Clock>) -> error::Result<SlidingTimeWindowReservoir> {
        if window == Duration::from_secs(0) {
            return Err(MetricError::InvalidWindow.into());
        }
        trace!("New sliding time window reservoir of {:?}", window);
        let last_tick = clock.tick();
        Ok(SlidingTimeWindowReservoir {
            window: window.as_nanos().min(u128::from(u64::max_value())) as u64,
            measurements: Mutex::new(Measurements {
                values: VecDeque::new(),
                last_tick,
            }),
            clock,
        })
    }

    fn trim(&self, measurements: &mut Measurements) -> u64 {
        // ticks never go backwards, out of order values would escape trimming
        let now = self.clock.tick().max(measurements.last_tick);
        measurements.last_tick = now;
        let window_start = now.saturating_sub(self.window);
        while let Some((tick, _)) = measurements.values.front() {
            if *tick >= window_start {
                break;
            }
            measurements.values.pop_front();
        }
        now
    }
}

impl Reservoir for SlidingTimeWindowReservoir {
    fn update(&self, value: MetricValue) {
        let mut measurements = self.measurements.lock();
        let now = self.trim(&mut measurements);
        measurements.values.push_back((now, value));
    }

    fn size(&self) -> usize {
        let mut measurements = self.measurements.lock();
        self.trim(&mut measurements);
        measurements.values.len()
    }

    fn snapshot(&self) -> Snapshot {
        let mut measurements = self.measurements.lock();
        self.trim(&mut measurements);
        Snapshot::of(measurements.values.iter().map(|(_, value)| *value))
    }

    fn clear(&self) {
        self.measurements.lock().values.clear();
    }
}
