use crate::core::error;
use crate::registry::MetricRegistry;
use crate::report::{fields, Reporter, Units};

/// Write every metric to the standard log, one line per metric.
#[derive(Debug, Clone)]
pub struct LogReporter {
    level: ::log::Level,
    units: Units,
}

impl Default for LogReporter {
    fn default() -> Self {
        LogReporter::new(::log::Level::Info)
    }
}

impl LogReporter {
    /// Log at the given level with default units.
    pub fn new(level: ::log::Level) -> LogReporter {
        LogReporter {
            level,
            units: Units::default(),
        }
    }

    pub fn units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    fn line(&self, name: &str, kind: &str, fields: &[(&'static str, String)]) -> String {
        let mut line = format!("type={} name={}", kind, name);
        for (label, value) in fields {
            line.push_str(", ");
            line.push_str(label);
            line.push('=');
            line.push_str(value);
        }
        line
    }
}

impl Reporter for LogReporter {
    fn report(&self, registry: &MetricRegistry) -> error::Result<()> {
        if !log_enabled!(self.level) {
            return Ok(());
        }
        for (name, metric) in registry.metrics() {
            let fields = fields(&metric, &self.units);
            log!(self.level, "{}", self.line(&name, metric.kind(), &fields));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn formats_one_line_per_metric() {
        let reporter = LogReporter::default();
        let fields = vec![("count", "3".to_string()), ("sum", "12".to_string())];
        assert_eq!(
            reporter.line("app.rows", "histogram", &fields),
            "type=histogram name=app.rows, count=3, sum=12"
        );
    }

    #[test]
    fn reports_without_a_logger() {
        let registry = MetricRegistry::new();
        registry.counter("c").unwrap().inc();
        assert!(LogReporter::new(::log::Level::Error).report(&registry).is_ok());
    }
}
