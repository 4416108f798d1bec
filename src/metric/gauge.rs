use std::fmt;

/// An instantaneous value, read from a provider function whenever observed.
pub struct Gauge {
    provider: Box<dyn Fn() -> f64 + Send + Sync>,
}

impl fmt::Debug for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Gauge {{ value: {} }}", self.value())
    }
}

impl Gauge {
    pub fn new<F: Fn() -> f64 + Send + Sync + 'static>(provider: F) -> Gauge {
        Gauge {
            provider: Box::new(provider),
        }
    }

    /// Current value, as computed by the provider.
    pub fn value(&self) -> f64 {
        (self.provider)()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering::SeqCst;
    use std::sync::Arc;

    #[test]
    fn reads_provider_on_every_call() {
        let queue = Arc::new(AtomicUsize::new(3));
        let depth = queue.clone();
        let gauge = Gauge::new(move || depth.load(SeqCst) as f64);

        assert_eq!(gauge.value(), 3.0);
        queue.store(7, SeqCst);
        assert_eq!(gauge.value(), 7.0);
    }
}
