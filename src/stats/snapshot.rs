//! Immutable sorted views over reservoir contents.

use num::ToPrimitive;

use std::io::{self, Write};

const MEDIAN_Q: f64 = 0.5;
const P75_Q: f64 = 0.75;
const P95_Q: f64 = 0.95;
const P98_Q: f64 = 0.98;
const P99_Q: f64 = 0.99;
const P999_Q: f64 = 0.999;

/// A statistical snapshot of a sample, sorted ascending.
/// Cheap to share between threads, never mutated after creation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    values: Vec<f64>,
}

impl Snapshot {
    /// Copy and sort any collection of numbers.
    /// The iterator's size hint is only used to preallocate,
    /// every yielded value is kept regardless.
    /// Values without a float representation are skipped.
    pub fn of<I, V>(values: I) -> Snapshot
    where
        I: IntoIterator<Item = V>,
        V: ToPrimitive,
    {
        let values = values.into_iter();
        let mut copy = Vec::with_capacity(values.size_hint().0);
        for value in values {
            if let Some(value) = value.to_f64() {
                copy.push(value);
            }
        }
        Snapshot::sorted(copy)
    }

    fn sorted(mut values: Vec<f64>) -> Snapshot {
        // NaN cannot come out of integer reservoirs; sort them last if supplied by hand
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or_else(|| a.is_nan().cmp(&b.is_nan())));
        Snapshot { values }
    }

    /// Value at the given quantile, linearly interpolated between the two closest order statistics.
    /// Returns 0 for an empty snapshot.
    ///
    /// # Panics
    ///
    /// Panics if `quantile` is NaN or outside `[0, 1]`.
    pub fn value(&self, quantile: f64) -> f64 {
        assert!(
            quantile >= 0.0 && quantile <= 1.0,
            "{} is not in [0..1]",
            quantile
        );

        if self.values.is_empty() {
            return 0.0;
        }

        let pos = quantile * (self.values.len() + 1) as f64;

        if pos < 1.0 {
            return self.values[0];
        }

        if pos >= self.values.len() as f64 {
            return self.values[self.values.len() - 1];
        }

        let index = pos as usize;
        let lower = self.values[index - 1];
        let upper = self.values[index];
        lower + (pos - pos.floor()) * (upper - lower)
    }

    pub fn median(&self) -> f64 {
        self.value(MEDIAN_Q)
    }

    pub fn p75(&self) -> f64 {
        self.value(P75_Q)
    }

    pub fn p95(&self) -> f64 {
        self.value(P95_Q)
    }

    pub fn p98(&self) -> f64 {
        self.value(P98_Q)
    }

    pub fn p99(&self) -> f64 {
        self.value(P99_Q)
    }

    pub fn p999(&self) -> f64 {
        self.value(P999_Q)
    }

    /// Number of values in the snapshot.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The sorted values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn min(&self) -> f64 {
        self.values.first().cloned().unwrap_or(0.0)
    }

    pub fn max(&self) -> f64 {
        self.values.last().cloned().unwrap_or(0.0)
    }

    /// Arithmetic mean, 0 if empty.
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Sample standard deviation, 0 with less than two values.
    pub fn std_dev(&self) -> f64 {
        // two-pass algorithm for variance, avoids numeric overflow
        if self.values.len() <= 1 {
            return 0.0;
        }

        let mean = self.mean();
        let sum = self
            .values
            .iter()
            .map(|value| {
                let diff = value - mean;
                diff * diff
            })
            .sum::<f64>();

        (sum / (self.values.len() - 1) as f64).sqrt()
    }

    /// Write each value on its own line.
    pub fn dump<W: Write>(&self, output: &mut W) -> io::Result<()> {
        for value in &self.values {
            writeln!(output, "{}", value)?;
        }
        output.flush()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::test::assert_close;

    fn snapshot() -> Snapshot {
        Snapshot::of(vec![5, 1, 2, 3, 4])
    }

    #[test]
    fn small_quantiles_are_the_first_value() {
        assert_eq!(snapshot().value(0.0), 1.0);
    }

    #[test]
    fn big_quantiles_are_the_last_value() {
        assert_eq!(snapshot().value(1.0), 5.0);
    }

    #[test]
    fn percentiles_are_interpolated_exactly() {
        let snapshot = snapshot();
        assert_eq!(snapshot.median(), 3.0);
        assert_eq!(snapshot.p75(), 4.5);
        assert_eq!(snapshot.p95(), 5.0);
        assert_eq!(snapshot.p98(), 5.0);
        assert_eq!(snapshot.p99(), 5.0);
        assert_eq!(snapshot.p999(), 5.0);
    }

    #[test]
    #[should_panic]
    fn disallows_nan_quantile() {
        snapshot().value(std::f64::NAN);
    }

    #[test]
    #[should_panic]
    fn disallows_negative_quantile() {
        snapshot().value(-0.5);
    }

    #[test]
    #[should_panic]
    fn disallows_quantile_over_one() {
        snapshot().value(1.5);
    }

    #[test]
    fn has_sorted_values_and_size() {
        let snapshot = snapshot();
        assert_eq!(snapshot.values(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(snapshot.size(), 5);
    }

    #[test]
    fn can_be_created_from_doubles() {
        let snapshot = Snapshot::of(vec![2.5, -1.0, 0.25]);
        assert_eq!(snapshot.values(), &[-1.0, 0.25, 2.5]);
    }

    #[test]
    fn summary_statistics() {
        let snapshot = snapshot();
        assert_eq!(snapshot.min(), 1.0);
        assert_eq!(snapshot.max(), 5.0);
        assert_eq!(snapshot.mean(), 3.0);
        assert_close(snapshot.std_dev(), 1.5811, 0.0001);
    }

    #[test]
    fn empty_snapshot_is_all_zeroes() {
        let empty = Snapshot::of(Vec::<i64>::new());
        assert_eq!(empty.min(), 0.0);
        assert_eq!(empty.max(), 0.0);
        assert_eq!(empty.mean(), 0.0);
        assert_eq!(empty.std_dev(), 0.0);
        assert_eq!(empty.median(), 0.0);
        assert_eq!(empty.p999(), 0.0);
        assert!(empty.is_empty());
    }

    #[test]
    fn singleton_has_no_deviation() {
        assert_eq!(Snapshot::of(vec![1]).std_dev(), 0.0);
    }

    #[test]
    fn dumps_to_a_stream() {
        let mut output = Vec::new();
        snapshot().dump(&mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "1\n2\n3\n4\n5\n");
    }

    /// An iterator that lies about how many items it holds.
    struct Drifting {
        items: std::vec::IntoIter<i64>,
        claimed: usize,
    }

    impl Iterator for Drifting {
        type Item = i64;

        fn next(&mut self) -> Option<i64> {
            self.items.next()
        }

        fn size_hint(&self) -> (usize, Option<usize>) {
            (self.claimed, Some(self.claimed))
        }
    }

    #[test]
    fn tolerates_underestimated_size() {
        let drifting = Drifting {
            items: vec![5, 1, 2, 3, 4].into_iter(),
            claimed: 4,
        };
        assert_eq!(Snapshot::of(drifting).values(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn tolerates_overestimated_size() {
        let drifting = Drifting {
            items: vec![5, 1, 2, 3, 4].into_iter(),
            claimed: 6,
        };
        assert_eq!(Snapshot::of(drifting).values(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }
}
