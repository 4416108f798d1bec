//! A registry filled by an instrumented workload, then published.

use meterstick::*;

use parking_lot::Mutex;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

#[test]
fn instrumented_workload_is_reported() {
    let clock = Arc::new(ManualClock::new());
    let registry = Configuration::new()
        .clock(clock.clone())
        .random(Arc::new(SeededRandom::new(7)))
        .prefix("shop")
        .build()
        .unwrap();

    let orders = registry.meter("orders").unwrap();
    let basket = registry.histogram_with("basket", ReservoirConfig::Uniform { size: 50 }).unwrap();
    let checkout = registry.timer("checkout").unwrap();
    let open_carts = registry.counter("carts").unwrap();
    registry.gauge("stock", || 12.5).unwrap();

    for size in 1..=10 {
        open_carts.inc();
        time!(checkout, clock.add_millis(size as u64));
        basket.update(size);
        orders.mark_one();
        open_carts.dec();
        clock.add_seconds(1);
    }

    assert_eq!(orders.count(), 10);
    assert_eq!(basket.sum(), 55);
    assert_eq!(checkout.count(), 10);
    assert_eq!(checkout.snapshot().max(), 10_000_000.0);
    assert_eq!(open_carts.count(), 0);

    let captured = Captured::default();
    StreamReporter::write_to(captured.clone()).report(&registry).unwrap();
    let text = captured.text();

    for name in &["shop.orders", "shop.basket", "shop.checkout", "shop.carts", "shop.stock"] {
        assert!(text.contains(name), "{} missing from\n{}", name, text);
    }
    assert!(text.contains("value = 12.50"));
    assert!(text.contains("max = 10.00 milliseconds"));
    assert!(text.contains("sum = 55"));
}

#[test]
fn kind_conflicts_are_reported_as_errors() {
    let registry = MetricRegistry::new();
    registry.histogram("latency").unwrap();

    let error = registry.meter("latency").unwrap_err();
    match error.downcast_ref::<MetricError>() {
        Some(MetricError::MetricKindConflict { existing, requested, .. }) => {
            assert_eq!(*existing, "histogram");
            assert_eq!(*requested, "meter");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn scheduled_stream_report() {
    let registry = MetricRegistry::new();
    registry.counter("ticks").unwrap().inc_by(3);

    let captured = Captured::default();
    let handle = StreamReporter::write_to(captured.clone())
        .report_every(&registry, Duration::from_millis(10))
        .unwrap();

    while !captured.text().contains("count = 3") {
        std::thread::sleep(Duration::from_millis(10));
    }
    handle.cancel();
}
