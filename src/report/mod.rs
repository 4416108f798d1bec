//! Periodic publication of registry contents.

mod log;
mod stream;

pub use self::log::LogReporter;
pub use self::stream::StreamReporter;

use crate::core::clock::TimeUnit;
use crate::core::error;
use crate::core::scheduler::{set_schedule, CancelHandle};
use crate::metric::Meter;
use crate::registry::{Metric, MetricRegistry};
use crate::stats::Snapshot;

use std::time::Duration;

/// Publishes the current value of every metric of a registry.
pub trait Reporter: Send + Sync {
    fn report(&self, registry: &MetricRegistry) -> error::Result<()>;
}

/// Units that rates and durations are converted to before being published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Units {
    pub rate: TimeUnit,
    pub duration: TimeUnit,
}

impl Default for Units {
    /// Events per second, durations in milliseconds.
    fn default() -> Self {
        Units {
            rate: TimeUnit::Seconds,
            duration: TimeUnit::Milliseconds,
        }
    }
}

/// Report a registry at regular intervals.
pub trait ScheduleReport: Reporter + Clone + 'static {
    /// Start a reporting thread. Failed reports are logged and retried on the next period.
    fn report_every(&self, registry: &MetricRegistry, period: Duration) -> error::Result<CancelHandle> {
        let reporter = self.clone();
        let registry = registry.clone();
        set_schedule("meterstick-report", period, move || {
            if let Err(err) = reporter.report(&registry) {
                error!("Could not report metrics: {}", err);
            }
        })
    }
}

impl<T: Reporter + Clone + 'static> ScheduleReport for T {}

/// Labelled values describing a metric, in publication order.
fn fields(metric: &Metric, units: &Units) -> Vec<(&'static str, String)> {
    let mut fields = Vec::new();
    match metric {
        Metric::Counter(counter) => fields.push(("count", counter.count().to_string())),
        Metric::Gauge(gauge) => fields.push(("value", format!("{:.2}", gauge.value()))),
        Metric::Meter(meter) => {
            fields.push(("count", meter.count().to_string()));
            rates(&mut fields, meter, "events", units.rate);
        }
        Metric::Histogram(histogram) => {
            fields.push(("count", histogram.count().to_string()));
            fields.push(("sum", histogram.sum().to_string()));
            distribution(&mut fields, &histogram.snapshot(), |value| format!("{:.2}", value));
        }
        Metric::Timer(timer) => {
            fields.push(("count", timer.count().to_string()));
            rates(&mut fields, timer.meter(), "calls", units.rate);
            let duration = units.duration;
            distribution(&mut fields, &timer.snapshot(), |nanos| {
                format!("{:.2} {}", duration.convert(nanos), duration)
            });
        }
    }
    fields
}

fn rates(fields: &mut Vec<(&'static str, String)>, meter: &Meter, events: &str, unit: TimeUnit) {
    let show = |rate: f64| format!("{:.2} {}/{}", rate, events, unit.name());
    fields.push(("mean rate", show(meter.mean_rate_per(unit))));
    fields.push(("1-minute rate", show(meter.one_minute_rate_per(unit))));
    fields.push(("5-minute rate", show(meter.five_minute_rate_per(unit))));
    fields.push(("15-minute rate", show(meter.fifteen_minute_rate_per(unit))));
}

fn distribution<F>(fields: &mut Vec<(&'static str, String)>, snapshot: &Snapshot, show: F)
where
    F: Fn(f64) -> String,
{
    fields.push(("min", show(snapshot.min())));
    fields.push(("max", show(snapshot.max())));
    fields.push(("mean", show(snapshot.mean())));
    fields.push(("stddev", show(snapshot.std_dev())));
    fields.push(("median", show(snapshot.median())));
    fields.push(("75%", show(snapshot.p75())));
    fields.push(("95%", show(snapshot.p95())));
    fields.push(("98%", show(snapshot.p98())));
    fields.push(("99%", show(snapshot.p99())));
    fields.push(("99.9%", show(snapshot.p999())));
}
