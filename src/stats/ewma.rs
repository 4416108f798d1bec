//! Exponentially-weighted moving average rate estimation.
//! See UNIX load average computations, where values are decayed on a fixed tick.

use crate::core::clock::TimeUnit;
use crate::core::error::{self, MetricError};

use std::sync::atomic::Ordering::*;
use std::sync::atomic::{AtomicI64, AtomicU64};
use std::time::Duration;

/// Ticks are expected every five seconds.
pub const TICK_INTERVAL: Duration = Duration::from_secs(5);

const SECONDS_PER_MINUTE: f64 = 60.0;
const INTERVAL_SECONDS: f64 = 5.0;

fn minute_alpha(minutes: f64) -> f64 {
    1.0 - (-INTERVAL_SECONDS / SECONDS_PER_MINUTE / minutes).exp()
}

/// Decaying rate of events, updated from any thread and ticked periodically.
/// `alpha` is baked for the tick interval: ticking at another period yields a wrong decay.
#[derive(Debug)]
pub struct Ewma {
    alpha: f64,
    interval_nanos: f64,
    uncounted: AtomicI64,
    /// Events per nanosecond, stored as f64 bits. NaN until the first tick.
    rate: AtomicU64,
}

impl Ewma {
    /// Averages over one minute, expecting a tick every five seconds.
    pub fn one_minute() -> Ewma {
        Ewma::with_alpha(minute_alpha(1.0), TICK_INTERVAL)
    }

    /// Averages over five minutes, expecting a tick every five seconds.
    pub fn five_minutes() -> Ewma {
        Ewma::with_alpha(minute_alpha(5.0), TICK_INTERVAL)
    }

    /// Averages over fifteen minutes, expecting a tick every five seconds.
    pub fn fifteen_minutes() -> Ewma {
        Ewma::with_alpha(minute_alpha(15.0), TICK_INTERVAL)
    }

    /// Averages over an arbitrary window.
    /// The decay constant is derived as `1 - e^(-interval/window)`.
    pub fn with_window(window: Duration, interval: Duration) -> error::Result<Ewma> {
        if window == Duration::from_secs(0) || interval == Duration::from_secs(0) {
            return Err(MetricError::InvalidWindow.into());
        }
        let alpha = 1.0 - (-interval.as_secs_f64() / window.as_secs_f64()).exp();
        Ewma::new(alpha, interval)
    }

    /// An EWMA with an explicit smoothing constant.
    pub fn new(alpha: f64, interval: Duration) -> error::Result<Ewma> {
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(MetricError::InvalidAlpha(alpha).into());
        }
        if interval == Duration::from_secs(0) {
            return Err(MetricError::InvalidWindow.into());
        }
        Ok(Ewma::with_alpha(alpha, interval))
    }

    fn with_alpha(alpha: f64, interval: Duration) -> Ewma {
        Ewma {
            alpha,
            interval_nanos: interval.as_nanos() as f64,
            uncounted: AtomicI64::new(0),
            rate: AtomicU64::new(std::f64::NAN.to_bits()),
        }
    }

    /// Record `n` new events. Never blocks.
    pub fn update(&self, n: i64) {
        self.uncounted.fetch_add(n, AcqRel);
    }

    /// Fold the events seen since the last tick into the rate.
    pub fn tick(&self) {
        let count = self.uncounted.swap(0, AcqRel);
        let instant_rate = count as f64 / self.interval_nanos;

        let mut current = self.rate.load(Acquire);
        loop {
            let rate = f64::from_bits(current);
            // the first tick seeds the rate instead of blending it
            let next = if rate.is_nan() {
                instant_rate
            } else {
                rate + self.alpha * (instant_rate - rate)
            };
            match self.rate.compare_exchange_weak(current, next.to_bits(), AcqRel, Acquire) {
                Ok(_) => break,
                // race detected, retry
                Err(actual) => current = actual,
            }
        }
    }

    /// Rate in events per `unit`.
    pub fn rate(&self, unit: TimeUnit) -> f64 {
        let rate = f64::from_bits(self.rate.load(Acquire));
        if rate.is_nan() {
            return 0.0;
        }
        rate * unit.nanos() as f64
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

#[cfg(feature = "bench")]
mod bench {

    use super::*;

    #[bench]
    fn ewma_update(b: &mut test::Bencher) {
        let ewma = Ewma::one_minute();
        b.iter(|| test::black_box(ewma.update(1)));
    }

    #[bench]
    fn ewma_tick(b: &mut test::Bencher) {
        let ewma = Ewma::one_minute();
        b.iter(|| {
            ewma.update(3);
            test::black_box(ewma.tick())
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::test::assert_close;

    fn elapse_minute(ewma: &Ewma) {
        for _ in 0..12 {
            ewma.tick();
        }
    }

    fn assert_decay(ewma: Ewma, expected: &[f64]) {
        ewma.update(3);
        ewma.tick();
        assert_close(ewma.rate(TimeUnit::Seconds), 0.6, 0.000001);

        for rate in expected {
            elapse_minute(&ewma);
            assert_close(ewma.rate(TimeUnit::Seconds), *rate, 0.000001);
        }
    }

    #[test]
    fn one_minute_ewma_with_a_value_of_three() {
        assert_decay(
            Ewma::one_minute(),
            &[
                0.22072766, 0.08120117, 0.02987224, 0.01098938, 0.00404277, 0.00148725, 0.00054713, 0.00020128,
                0.00007405, 0.00002724, 0.00001002, 0.00000369, 0.00000136, 0.00000050, 0.00000018,
            ],
        );
    }

    #[test]
    fn five_minute_ewma_with_a_value_of_three() {
        assert_decay(
            Ewma::five_minutes(),
            &[
                0.49123845, 0.40219203, 0.32928698, 0.26959738, 0.22072766, 0.18071653, 0.14795818, 0.12113791,
                0.09917933, 0.08120117, 0.06648190, 0.05443077, 0.04456415, 0.03648604, 0.02987224,
            ],
        );
    }

    #[test]
    fn fifteen_minute_ewma_with_a_value_of_three() {
        assert_decay(
            Ewma::fifteen_minutes(),
            &[
                0.56130419, 0.52510399, 0.49123845, 0.45955700, 0.42991879, 0.40219203, 0.37625345, 0.35198773,
                0.32928698, 0.30805027, 0.28818318, 0.26959738, 0.25221023, 0.23594443, 0.22072766,
            ],
        );
    }

    #[test]
    fn rate_is_zero_before_first_tick() {
        let ewma = Ewma::one_minute();
        ewma.update(100);
        assert_eq!(ewma.rate(TimeUnit::Seconds), 0.0);
    }

    #[test]
    fn first_tick_sets_rate_without_blending() {
        let ewma = Ewma::fifteen_minutes();
        ewma.update(10);
        ewma.tick();
        assert_close(ewma.rate(TimeUnit::Seconds), 2.0, 1e-12);
        assert_close(ewma.rate(TimeUnit::Minutes), 120.0, 1e-9);
    }

    #[test]
    fn window_constructor_matches_named_constructors() {
        let custom = Ewma::with_window(Duration::from_secs(60), TICK_INTERVAL).unwrap();
        assert_close(custom.alpha(), Ewma::one_minute().alpha(), 1e-15);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(Ewma::new(0.0, TICK_INTERVAL).is_err());
        assert!(Ewma::new(-0.5, TICK_INTERVAL).is_err());
        assert!(Ewma::new(std::f64::NAN, TICK_INTERVAL).is_err());
        assert!(Ewma::new(0.5, Duration::from_secs(0)).is_err());
        assert!(Ewma::with_window(Duration::from_secs(0), TICK_INTERVAL).is_err());
    }

    #[test]
    fn concurrent_updates_are_all_counted() {
        use std::sync::Arc;
        use std::thread;

        let ewma = Arc::new(Ewma::one_minute());
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let ewma = ewma.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        ewma.update(1);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        ewma.tick();
        assert_close(ewma.rate(TimeUnit::Seconds), 8000.0 / 5.0, 1e-9);
    }

    #[test]
    fn racing_first_ticks_keep_the_seeded_rate() {
        use std::sync::{Arc, Barrier};
        use std::thread;

        for _ in 0..200 {
            let ewma = Arc::new(Ewma::one_minute());
            ewma.update(10);
            let barrier = Arc::new(Barrier::new(4));
            let workers: Vec<_> = (0..4)
                .map(|_| {
                    let (ewma, barrier) = (ewma.clone(), barrier.clone());
                    thread::spawn(move || {
                        barrier.wait();
                        ewma.tick();
                    })
                })
                .collect();
            for worker in workers {
                worker.join().unwrap();
            }
            // only one tick saw the ten events, whatever the order it must show
            let rate = ewma.rate(TimeUnit::Seconds);
            assert!(rate > 0.0 && rate <= 2.0, "rate {} lost the first tick", rate);
        }
    }
}
