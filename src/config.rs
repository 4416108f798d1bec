//! Choice of sampling strategy and registry-wide settings.

use crate::core::clock::{default_clock, Clock};
use crate::core::error;
use crate::core::name::MetricName;
use crate::core::random::{default_random, Random};
use crate::registry::MetricRegistry;
use crate::stats::{
    ExponentiallyDecayingReservoir, Reservoir, SlidingTimeWindowReservoir, SlidingWindowReservoir,
    UniformReservoir,
};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Which reservoir backs a histogram or timer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReservoirConfig {
    /// Every value has the same odds of being kept.
    Uniform { size: usize },
    /// Recent values are favored, decaying at rate `alpha`.
    ExponentiallyDecaying { size: usize, alpha: f64 },
    /// Only the last `size` values are kept.
    SlidingWindow { size: usize },
    /// Every value offered during the last `window`, however many.
    SlidingTimeWindow { window: Duration },
}

impl Default for ReservoirConfig {
    /// 1028 values biased toward the last five minutes.
    fn default() -> Self {
        ReservoirConfig::ExponentiallyDecaying {
            size: crate::stats::DEFAULT_SIZE,
            alpha: crate::stats::DEFAULT_ALPHA,
        }
    }
}

impl ReservoirConfig {
    /// Validate parameters and create an empty reservoir.
    pub fn build(&self, clock: Arc<dyn Clock>, random: Arc<dyn Random>) -> error::Result<Box<dyn Reservoir>> {
        let reservoir: Box<dyn Reservoir> = match *self {
            ReservoirConfig::Uniform { size } => Box::new(UniformReservoir::with_random(size, random)?),
            ReservoirConfig::ExponentiallyDecaying { size, alpha } => Box::new(
                ExponentiallyDecayingReservoir::with_parts(size, alpha, clock, random)?,
            ),
            ReservoirConfig::SlidingWindow { size } => Box::new(SlidingWindowReservoir::new(size)?),
            ReservoirConfig::SlidingTimeWindow { window } => {
                Box::new(SlidingTimeWindowReservoir::with_clock(window, clock)?)
            }
        };
        Ok(reservoir)
    }
}

/// A configuration builder for `MetricRegistry`.
#[derive(Clone)]
pub struct Configuration {
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) random: Arc<dyn Random>,
    pub(crate) reservoir: ReservoirConfig,
    pub(crate) prefix: MetricName,
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("reservoir", &self.reservoir)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl Default for Configuration {
    fn default() -> Configuration {
        Configuration {
            clock: default_clock(),
            random: default_random(),
            reservoir: ReservoirConfig::default(),
            prefix: MetricName::default(),
        }
    }
}

impl Configuration {
    /// Creates a new `Configuration` with default values.
    pub fn new() -> Configuration {
        Default::default()
    }

    /// Sets the time source shared by every metric of the registry.
    ///
    /// Defaults to the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the random source used by sampling reservoirs.
    ///
    /// Defaults to a thread-local generator.
    pub fn random(mut self, random: Arc<dyn Random>) -> Self {
        self.random = random;
        self
    }

    /// Sets the reservoir used by histograms and timers created without an explicit one.
    ///
    /// Defaults to an exponentially decaying reservoir of 1028 values with alpha 0.015.
    pub fn reservoir(mut self, reservoir: ReservoirConfig) -> Self {
        self.reservoir = reservoir;
        self
    }

    /// Sets a namespace prepended to every metric name.
    ///
    /// Defaults to none.
    pub fn prefix<N: Into<MetricName>>(mut self, prefix: N) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Create a `MetricRegistry` based on this configuration.
    /// Fails if the default reservoir parameters are invalid.
    pub fn build(self) -> error::Result<MetricRegistry> {
        self.reservoir.build(self.clock.clone(), self.random.clone())?;
        Ok(MetricRegistry::from_config(self))
    }
}
