pub mod clock;
pub mod error;
pub mod name;
pub mod random;
pub mod scheduler;

/// Base type for recorded metric values.
pub type MetricValue = i64;


#[cfg(feature = "bench")]
pub mod bench {

    use super::clock::*;

    #[bench]
    fn system_clock_tick(b: &mut test::Bencher) {
        let clock = SystemClock;
        b.iter(|| test::black_box(clock.tick()));
    }

    #[bench]
    fn system_clock_time(b: &mut test::Bencher) {
        let clock = SystemClock;
        b.iter(|| test::black_box(clock.time()));
    }
}
