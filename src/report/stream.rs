use crate::core::error;
use crate::registry::{Metric, MetricRegistry};
use crate::report::{fields, Reporter, Units};

use parking_lot::Mutex;

use std::io::{self, Write};
use std::sync::Arc;

const SECTIONS: [(&str, &str); 5] = [
    ("gauge", "Gauges"),
    ("counter", "Counters"),
    ("histogram", "Histograms"),
    ("meter", "Meters"),
    ("timer", "Timers"),
];

/// Write metrics as human readable text blocks, grouped by kind.
pub struct StreamReporter<W: Write + Send + 'static> {
    inner: Arc<Mutex<W>>,
    units: Units,
}

impl<W: Write + Send + 'static> StreamReporter<W> {
    /// Write metric values to provided Write target.
    pub fn write_to(write: W) -> StreamReporter<W> {
        StreamReporter {
            inner: Arc::new(Mutex::new(write)),
            units: Units::default(),
        }
    }

    pub fn units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    fn print(&self, output: &mut W, metrics: &[(String, Metric)]) -> io::Result<()> {
        for (kind, title) in SECTIONS.iter() {
            let mut section = metrics.iter().filter(|(_, metric)| metric.kind() == *kind).peekable();
            if section.peek().is_none() {
                continue;
            }
            writeln!(output, "-- {} {}", title, "-".repeat(72 - title.len()))?;
            for (name, metric) in section {
                writeln!(output, "{}", name)?;
                for (label, value) in fields(metric, &self.units) {
                    writeln!(output, "{:>20} = {}", label, value)?;
                }
            }
            writeln!(output)?;
        }
        output.flush()
    }
}

impl StreamReporter<io::Stderr> {
    /// Write metric values to stderr.
    pub fn stderr() -> StreamReporter<io::Stderr> {
        StreamReporter::write_to(io::stderr())
    }
}

impl StreamReporter<io::Stdout> {
    /// Write metric values to stdout.
    pub fn stdout() -> StreamReporter<io::Stdout> {
        StreamReporter::write_to(io::stdout())
    }
}

// manual Clone, derive would require W: Clone
impl<W: Write + Send + 'static> Clone for StreamReporter<W> {
    fn clone(&self) -> Self {
        StreamReporter {
            inner: self.inner.clone(),
            units: self.units,
        }
    }
}

impl<W: Write + Send + 'static> Reporter for StreamReporter<W> {
    fn report(&self, registry: &MetricRegistry) -> error::Result<()> {
        let metrics = registry.metrics();
        let mut output = self.inner.lock();
        self.print(&mut *output, &metrics)?;
        Ok(())
    }
}
