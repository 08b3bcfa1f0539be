//! Overlap-aware duration accumulator.
//!
//! Spans recorded under one category frequently run concurrently (parallel
//! resource registrations, overlapping RPCs). Summing their raw durations
//! would count the shared wall-clock time more than once, so instead every
//! interval is folded into a minimal disjoint cover and the total is the
//! measure of that cover.
//!
//! The cover is kept sorted by start time. Because the held intervals are
//! disjoint and non-touching, their ends are sorted too, which lets an
//! insertion binary-search for the first candidate and then consume forward
//! only the intervals it actually absorbs.

use super::interval::{Interval, InvalidInterval, TimePoint};

/// Disjoint union of inserted intervals plus its running measure
///
/// **Public** - one instance per (trace file, category)
#[derive(Debug, Clone)]
pub struct IntervalAccumulator<T: TimePoint> {
    /// Disjoint, non-touching, sorted by start
    held: Vec<Interval<T>>,

    /// Sum of the durations in `held`
    total: T::Span,
}

impl<T: TimePoint> Default for IntervalAccumulator<T> {
    fn default() -> Self {
        Self {
            held: Vec::new(),
            total: T::zero_span(),
        }
    }
}

impl<T: TimePoint> IntervalAccumulator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge an interval into the held cover
    ///
    /// **Public** - main entry point for accumulation
    ///
    /// # Errors
    /// * `InvalidInterval` - `end` precedes `start`; nothing is modified
    pub fn insert(&mut self, interval: Interval<T>) -> Result<(), InvalidInterval<T>> {
        if !interval.is_valid() {
            return Err(InvalidInterval {
                start: interval.start,
                end: interval.end,
            });
        }

        // Everything before `first` ends strictly before the new start.
        let first = self.held.partition_point(|held| held.end < interval.start);

        let mut merged = interval;
        let mut last = first;
        let mut absorbed = T::zero_span();

        while let Some(next) = self.held.get(last) {
            let Some(grown) = merged.merge(next) else {
                break;
            };
            absorbed = absorbed + next.duration();
            merged = grown;
            last += 1;
        }

        self.total = self.total - absorbed + merged.duration();
        self.held.splice(first..last, std::iter::once(merged));

        Ok(())
    }

    /// Measure of the union of everything inserted so far
    pub fn total_duration(&self) -> T::Span {
        self.total
    }

    /// The current disjoint cover, sorted by start
    pub fn intervals(&self) -> &[Interval<T>] {
        &self.held
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accumulate(intervals: &[(i64, i64)]) -> IntervalAccumulator<i64> {
        let mut acc = IntervalAccumulator::new();
        for &(start, end) in intervals {
            acc.insert(Interval::new(start, end)).unwrap();
        }
        acc
    }

    #[test]
    fn test_empty_total_is_zero() {
        let acc: IntervalAccumulator<i64> = IntervalAccumulator::new();
        assert_eq!(acc.total_duration(), 0);
        assert!(acc.is_empty());
    }

    #[test]
    fn test_touching_intervals_merge() {
        let acc = accumulate(&[(0, 10), (10, 20)]);
        assert_eq!(acc.total_duration(), 20);
        assert_eq!(acc.intervals(), &[Interval::new(0, 20)]);
    }

    #[test]
    fn test_disjoint_intervals_stay_disjoint() {
        let acc = accumulate(&[(0, 5), (10, 15)]);
        assert_eq!(acc.total_duration(), 10);
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn test_contained_interval_absorbed() {
        let acc = accumulate(&[(0, 20), (5, 10)]);
        assert_eq!(acc.total_duration(), 20);
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn test_bridge_merges_chain() {
        let acc = accumulate(&[(0, 5), (10, 15), (4, 11)]);
        assert_eq!(acc.total_duration(), 15);
        assert_eq!(acc.intervals(), &[Interval::new(0, 15)]);
    }

    #[test]
    fn test_wide_interval_swallows_many() {
        let acc = accumulate(&[(10, 11), (20, 21), (30, 31), (40, 41), (0, 35)]);
        assert_eq!(acc.intervals(), &[Interval::new(0, 35), Interval::new(40, 41)]);
        assert_eq!(acc.total_duration(), 36);
    }

    #[test]
    fn test_insert_before_existing_keeps_order() {
        let acc = accumulate(&[(50, 60), (10, 20), (30, 40)]);
        assert_eq!(
            acc.intervals(),
            &[Interval::new(10, 20), Interval::new(30, 40), Interval::new(50, 60)]
        );
        assert_eq!(acc.total_duration(), 30);
    }

    #[test]
    fn test_invalid_interval_rejected_without_mutation() {
        let mut acc = accumulate(&[(0, 5)]);
        let err = acc.insert(Interval::new(10, 5)).unwrap_err();
        assert_eq!(err, InvalidInterval { start: 10, end: 5 });
        assert_eq!(acc.total_duration(), 5);
        assert_eq!(acc.intervals(), &[Interval::new(0, 5)]);
    }

    #[test]
    fn test_zero_length_interval() {
        let acc = accumulate(&[(7, 7)]);
        assert_eq!(acc.total_duration(), 0);
        assert_eq!(acc.len(), 1);

        // A point touching an existing interval is absorbed
        let acc = accumulate(&[(0, 5), (5, 5)]);
        assert_eq!(acc.len(), 1);
        assert_eq!(acc.total_duration(), 5);
    }

    #[test]
    fn test_redundant_coverage_is_idempotent() {
        let mut acc = accumulate(&[(0, 5), (3, 12)]);
        let before = acc.total_duration();
        acc.insert(Interval::new(2, 9)).unwrap();
        acc.insert(Interval::new(0, 12)).unwrap();
        assert_eq!(acc.total_duration(), before);
    }

    #[test]
    fn test_extreme_i64_instants() {
        let mut acc = IntervalAccumulator::new();
        acc.insert(Interval::new(-10i64, i64::MAX)).unwrap();
        assert_eq!(acc.total_duration(), i64::MAX as u64 + 10);

        let mut acc = IntervalAccumulator::new();
        acc.insert(Interval::new(i64::MIN, -1)).unwrap();
        acc.insert(Interval::new(1, i64::MAX)).unwrap();
        assert_eq!(acc.total_duration(), u64::MAX - 2);

        // bridging the gap yields the whole range
        acc.insert(Interval::new(-1, 1)).unwrap();
        assert_eq!(acc.intervals(), &[Interval::new(i64::MIN, i64::MAX)]);
        assert_eq!(acc.total_duration(), u64::MAX);
    }

    #[test]
    fn test_instant_accumulation() {
        use std::time::{Duration, Instant};

        let t0 = Instant::now();
        let ms = Duration::from_millis;
        let mut acc = IntervalAccumulator::new();
        acc.insert(Interval::new(t0, t0 + ms(30))).unwrap();
        acc.insert(Interval::new(t0 + ms(20), t0 + ms(50))).unwrap();
        acc.insert(Interval::new(t0 + ms(100), t0 + ms(110))).unwrap();
        assert_eq!(acc.total_duration(), ms(60));
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn test_unsigned_instants() {
        let mut acc: IntervalAccumulator<u64> = IntervalAccumulator::new();
        acc.insert(Interval::new(100, 200)).unwrap();
        acc.insert(Interval::new(150, 400)).unwrap();
        assert_eq!(acc.total_duration(), 300);
    }
}
