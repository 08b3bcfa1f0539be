//! Closed time intervals over an abstract instant type.

use chrono::{DateTime, Utc};
use std::fmt;
use std::ops::{Add, Sub};
use thiserror::Error;

/// An absolute instant that intervals can be built from.
///
/// The accumulator only needs ordering and a way to measure the distance
/// between two instants, so timestamps, raw nanosecond counters and
/// `std::time::Instant` all qualify.
pub trait TimePoint: Copy + Ord + fmt::Debug {
    /// Measure of the distance between two instants
    type Span: Copy + fmt::Debug + Add<Output = Self::Span> + Sub<Output = Self::Span>;

    /// The empty span
    fn zero_span() -> Self::Span;

    /// Distance from `start` to `end`; callers guarantee `start <= end`
    fn span_between(start: Self, end: Self) -> Self::Span;
}

impl TimePoint for DateTime<Utc> {
    type Span = chrono::Duration;

    fn zero_span() -> Self::Span {
        chrono::Duration::zero()
    }

    fn span_between(start: Self, end: Self) -> Self::Span {
        end.signed_duration_since(start)
    }
}

impl TimePoint for std::time::Instant {
    type Span = std::time::Duration;

    fn zero_span() -> Self::Span {
        std::time::Duration::ZERO
    }

    fn span_between(start: Self, end: Self) -> Self::Span {
        end.duration_since(start)
    }
}

// Unsigned spans: the distance between any two i64 instants fits in a u64
impl TimePoint for i64 {
    type Span = u64;

    fn zero_span() -> Self::Span {
        0
    }

    fn span_between(start: Self, end: Self) -> Self::Span {
        end.abs_diff(start)
    }
}

impl TimePoint for u64 {
    type Span = u64;

    fn zero_span() -> Self::Span {
        0
    }

    fn span_between(start: Self, end: Self) -> Self::Span {
        end - start
    }
}

/// A closed interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval<T> {
    pub start: T,
    pub end: T,
}

impl<T: TimePoint> Interval<T> {
    pub fn new(start: T, end: T) -> Self {
        Self { start, end }
    }

    /// `start <= end`
    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    /// Length of the interval
    ///
    /// Only meaningful for valid intervals.
    pub fn duration(&self) -> T::Span {
        T::span_between(self.start, self.end)
    }

    /// True unless the two intervals are strictly separated.
    ///
    /// Touching endpoints count as overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.end < other.start || other.end < self.start)
    }

    /// Smallest interval covering both, if they overlap
    pub fn merge(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        })
    }
}

/// Rejected insertion: `end` strictly precedes `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid negative interval: {start:?} .. {end:?}")]
pub struct InvalidInterval<T: fmt::Debug> {
    pub start: T,
    pub end: T,
}
