//! Named metrics, created on first use and shared afterwards.

use crate::config::{Configuration, ReservoirConfig};
use crate::core::clock::Clock;
use crate::core::error::{self, MetricError};
use crate::core::name::MetricName;
use crate::core::random::Random;
use crate::metric::{Counter, Gauge, Histogram, Meter, Timer};

use parking_lot::RwLock;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Any of the registered metric kinds.
#[derive(Debug, Clone)]
pub enum Metric {
    Counter(Arc<Counter>),
    Gauge(Arc<Gauge>),
    Meter(Arc<Meter>),
    Histogram(Arc<Histogram>),
    Timer(Arc<Timer>),
}

impl Metric {
    /// Lowercase name of the metric kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Metric::Counter(_) => "counter",
            Metric::Gauge(_) => "gauge",
            Metric::Meter(_) => "meter",
            Metric::Histogram(_) => "histogram",
            Metric::Timer(_) => "timer",
        }
    }
}

/// A cloneable handle to a shared set of named metrics.
/// Clones see the same metrics.
#[derive(Clone)]
pub struct MetricRegistry {
    metrics: Arc<RwLock<BTreeMap<String, Metric>>>,
    clock: Arc<dyn Clock>,
    random: Arc<dyn Random>,
    reservoir: ReservoirConfig,
    prefix: MetricName,
}

impl fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MetricRegistry {{ prefix: '{}', metrics: {:?} }}", self.prefix, self.names())
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        MetricRegistry::new()
    }
}

impl MetricRegistry {
    /// An empty registry with default settings.
    pub fn new() -> MetricRegistry {
        MetricRegistry::from_config(Configuration::default())
    }

    pub(crate) fn from_config(config: Configuration) -> MetricRegistry {
        trace!("New metric registry {:?}", config);
        MetricRegistry {
            metrics: Arc::new(RwLock::new(BTreeMap::new())),
            clock: config.clock,
            random: config.random,
            reservoir: config.reservoir,
            prefix: config.prefix,
        }
    }

    fn full_name<N: Into<MetricName>>(&self, name: N) -> String {
        self.prefix.clone().append(name).join(".")
    }

    /// Lookup or create a metric of the requested kind.
    fn get_or_add<T, F>(
        &self,
        name: String,
        requested: &'static str,
        extract: fn(&Metric) -> Option<Arc<T>>,
        wrap: fn(Arc<T>) -> Metric,
        create: F,
    ) -> error::Result<Arc<T>>
    where
        F: FnOnce() -> error::Result<T>,
    {
        let conflict = |name: String, existing: &Metric| MetricError::MetricKindConflict {
            name,
            existing: existing.kind(),
            requested,
        };

        if let Some(existing) = self.metrics.read().get(&name) {
            return extract(existing).ok_or_else(|| conflict(name.clone(), existing).into());
        }

        let mut metrics = self.metrics.write();
        // another thread may have registered it in between
        if let Some(existing) = metrics.get(&name) {
            return extract(existing).ok_or_else(|| conflict(name.clone(), existing).into());
        }

        let metric = Arc::new(create()?);
        trace!("Registered {} '{}'", requested, name);
        metrics.insert(name, wrap(metric.clone()));
        Ok(metric)
    }

    pub fn counter<N: Into<MetricName>>(&self, name: N) -> error::Result<Arc<Counter>> {
        self.get_or_add(
            self.full_name(name),
            "counter",
            |metric| match metric {
                Metric::Counter(counter) => Some(counter.clone()),
                _ => None,
            },
            Metric::Counter,
            || Ok(Counter::new()),
        )
    }

    /// Register a gauge reading its value from `provider`.
    /// If a gauge already exists under this name, it is returned and `provider` is dropped.
    pub fn gauge<N, F>(&self, name: N, provider: F) -> error::Result<Arc<Gauge>>
    where
        N: Into<MetricName>,
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        self.get_or_add(
            self.full_name(name),
            "gauge",
            |metric| match metric {
                Metric::Gauge(gauge) => Some(gauge.clone()),
                _ => None,
            },
            Metric::Gauge,
            || Ok(Gauge::new(provider)),
        )
    }

    pub fn meter<N: Into<MetricName>>(&self, name: N) -> error::Result<Arc<Meter>> {
        let clock = self.clock.clone();
        self.get_or_add(
            self.full_name(name),
            "meter",
            |metric| match metric {
                Metric::Meter(meter) => Some(meter.clone()),
                _ => None,
            },
            Metric::Meter,
            || Ok(Meter::with_clock(clock)),
        )
    }

    /// A histogram backed by the registry's default reservoir.
    pub fn histogram<N: Into<MetricName>>(&self, name: N) -> error::Result<Arc<Histogram>> {
        self.histogram_with(name, self.reservoir)
    }

    /// A histogram backed by a specific reservoir.
    /// The reservoir choice is ignored if the histogram already exists.
    pub fn histogram_with<N: Into<MetricName>>(
        &self,
        name: N,
        reservoir: ReservoirConfig,
    ) -> error::Result<Arc<Histogram>> {
        let (clock, random) = (self.clock.clone(), self.random.clone());
        self.get_or_add(
            self.full_name(name),
            "histogram",
            |metric| match metric {
                Metric::Histogram(histogram) => Some(histogram.clone()),
                _ => None,
            },
            Metric::Histogram,
            || Ok(Histogram::new(reservoir.build(clock, random)?)),
        )
    }

    pub fn timer<N: Into<MetricName>>(&self, name: N) -> error::Result<Arc<Timer>> {
        let (clock, random) = (self.clock.clone(), self.random.clone());
        let reservoir = self.reservoir;
        self.get_or_add(
            self.full_name(name),
            "timer",
            |metric| match metric {
                Metric::Timer(timer) => Some(timer.clone()),
                _ => None,
            },
            Metric::Timer,
            || Ok(Timer::with_parts(reservoir.build(clock.clone(), random)?, clock)),
        )
    }

    /// Unregister a metric. Handles already given out keep working.
    pub fn remove<N: Into<MetricName>>(&self, name: N) -> Option<Metric> {
        let name = self.full_name(name);
        let removed = self.metrics.write().remove(&name);
        if removed.is_some() {
            trace!("Removed metric '{}'", name);
        }
        removed
    }

    /// Full names of every registered metric, sorted.
    pub fn names(&self) -> Vec<String> {
        self.metrics.read().keys().cloned().collect()
    }

    /// Every registered metric, sorted by full name.
    pub fn metrics(&self) -> Vec<(String, Metric)> {
        self.metrics
            .read()
            .iter()
            .map(|(name, metric)| (name.clone(), metric.clone()))
            .collect()
    }

    /// The clock shared by this registry's metrics.
    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }
}
