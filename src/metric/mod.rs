//! User-facing metric types.

mod counter;
mod gauge;
mod histogram;
mod meter;
mod timer;

pub use self::counter::Counter;
pub use self::gauge::Gauge;
pub use self::histogram::Histogram;
pub use self::meter::{Meter, MAX_CATCH_UP_TICKS};
pub use self::timer::{Timer, TimerContext};
