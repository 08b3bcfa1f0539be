//! Time interval sums accounting for overlap.
//!
//! This module is independent of trace formats and timestamp parsing:
//! it works over any [`TimePoint`] and only ever sees pairs of instants.

pub mod accumulator;
pub mod interval;

// Re-export main types
pub use accumulator::IntervalAccumulator;
pub use interval::{Interval, InvalidInterval, TimePoint};
