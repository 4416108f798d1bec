//! Statistical core of a metrics library, in the style of Dropwizard Metrics.
//! Meters estimate event rates with exponentially-weighted moving averages,
//! histograms and timers sample their values into bounded reservoirs
//! from which quantiles, mean and deviation are computed.
//!
//! ```rust
//! use meterstick::*;
//!
//! let registry = MetricRegistry::new();
//! let requests = registry.meter("requests").unwrap();
//! requests.mark_one();
//!
//! let latency = registry.timer("latency").unwrap();
//! latency.time(|| {
//!     // handle the request
//! });
//!
//! LogReporter::default().report(&registry).unwrap();
//! ```

#![cfg_attr(feature = "bench", feature(test))]
#![warn(
    trivial_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
)]

#[cfg(feature = "bench")]
extern crate test;

#[macro_use]
extern crate log;

#[macro_use]
extern crate lazy_static;

pub mod config;
pub mod core;
pub mod macros;
pub mod metric;
pub mod registry;
pub mod report;
pub mod stats;

pub use crate::config::{Configuration, ReservoirConfig};
pub use crate::core::clock::{Clock, ManualClock, SystemClock, TimeUnit};
pub use crate::core::error::{MetricError, Result};
pub use crate::core::name::MetricName;
pub use crate::core::random::{Random, SeededRandom, ThreadRandom};
pub use crate::core::scheduler::CancelHandle;
pub use crate::core::MetricValue;
pub use crate::metric::{Counter, Gauge, Histogram, Meter, Timer, TimerContext};
pub use crate::registry::{Metric, MetricRegistry};
pub use crate::report::{LogReporter, Reporter, ScheduleReport, StreamReporter, Units};
pub use crate::stats::{
    Ewma, ExponentiallyDecayingReservoir, Reservoir, SlidingTimeWindowReservoir, SlidingWindowReservoir,
    Snapshot, UniformReservoir,
};
