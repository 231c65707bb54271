//! Hourly apportionment of closed intervals.
//!
//! Takes a reconstructed foreground interval, clips it to the query
//! window, and splits the clipped span at civil-hour boundaries into
//! per-hour duration contributions. The split is exact: the per-hour
//! contributions of an interval always sum to the duration of its
//! clipped portion, with nothing created, lost, or double-counted
//! across boundaries.

use std::collections::HashMap;

use crate::calendar::CivilCalendar;
use crate::session::ClosedInterval;
use crate::types::{PackageId, ValidationError};

/// A half-open query window `[start, end)` in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    start_ms: i64,
    end_ms: i64,
}

impl QueryWindow {
    /// Creates a window, rejecting `start > end`.
    pub const fn new(start_ms: i64, end_ms: i64) -> Result<Self, ValidationError> {
        if start_ms > end_ms {
            return Err(ValidationError::InvertedWindow { start_ms, end_ms });
        }
        Ok(Self { start_ms, end_ms })
    }

    /// Window start in epoch milliseconds.
    #[must_use]
    pub const fn start_ms(&self) -> i64 {
        self.start_ms
    }

    /// Window end in epoch milliseconds.
    #[must_use]
    pub const fn end_ms(&self) -> i64 {
        self.end_ms
    }

    /// Clips an interval to this window. Returns `None` when the clipped
    /// range is empty or degenerate.
    #[must_use]
    pub fn clip(&self, interval: &ClosedInterval) -> Option<(i64, i64)> {
        let start = interval.start_ms.max(self.start_ms);
        let end = interval.end_ms.min(self.end_ms);
        (start < end).then_some((start, end))
    }
}

/// Per-hour duration accumulator: one slot per civil hour of the day.
///
/// Accumulation is additive; a bucket never shrinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HourBuckets([i64; 24]);

impl HourBuckets {
    /// An empty histogram.
    #[must_use]
    pub const fn new() -> Self {
        Self([0; 24])
    }

    /// Adds `duration_ms` to the bucket for `hour`. Out-of-range hours
    /// are ignored, keeping the accumulator total-preserving for any
    /// calendar that honors its contract.
    pub const fn add(&mut self, hour: u32, duration_ms: i64) {
        if hour < 24 && duration_ms > 0 {
            self.0[hour as usize] += duration_ms;
        }
    }

    /// Duration accumulated for a single hour.
    #[must_use]
    pub const fn get(&self, hour: u32) -> i64 {
        if hour < 24 { self.0[hour as usize] } else { 0 }
    }

    /// Sum across all 24 buckets.
    #[must_use]
    pub fn total_ms(&self) -> i64 {
        self.0.iter().sum()
    }

    /// Whether every bucket is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&ms| ms == 0)
    }

    /// Merges another histogram into this one, summing per hour.
    pub fn merge(&mut self, other: &Self) {
        for (slot, add) in self.0.iter_mut().zip(other.0.iter()) {
            *slot += add;
        }
    }

    /// `(hour, duration)` pairs for the hours with nonzero usage, in
    /// hour order.
    pub fn nonzero(&self) -> impl Iterator<Item = (u32, i64)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|&(_, &ms)| ms != 0)
            .map(|(hour, &ms)| (u32::try_from(hour).unwrap_or(23), ms))
    }
}

/// Per-application hour histograms.
pub type HourBucketMap = HashMap<PackageId, HourBuckets>;

/// Splits one interval into per-hour contributions within the window.
///
/// Walks from the clipped start, segment by segment: each segment ends at
/// the next civil-hour boundary, the clipped end, or the window end,
/// whichever comes first, and is credited to the hour it began in.
pub fn apportion<C: CivilCalendar>(
    interval: &ClosedInterval,
    window: &QueryWindow,
    calendar: &C,
) -> HourBuckets {
    let mut buckets = HourBuckets::new();
    let Some((actual_start, actual_end)) = window.clip(interval) else {
        return buckets;
    };

    let mut current = actual_start;
    while current < actual_end {
        let segment_end = calendar
            .next_hour_boundary(current)
            .min(actual_end)
            .min(window.end_ms());
        if segment_end <= current {
            // A calendar that fails to advance would spin forever; give
            // up on the remainder instead.
            tracing::debug!(current, segment_end, "calendar boundary did not advance");
            break;
        }
        buckets.add(calendar.hour_of_day(current), segment_end - current);
        current = segment_end;
    }

    buckets
}

/// Reconstructs and accumulates per-hour usage for a whole interval
/// stream. Contributions for the same `(package, hour)` sum across
/// intervals, in any order.
pub fn accumulate_usage<C, I>(intervals: I, window: &QueryWindow, calendar: &C) -> HourBucketMap
where
    C: CivilCalendar,
    I: IntoIterator<Item = ClosedInterval>,
{
    let mut map = HourBucketMap::new();
    for interval in intervals {
        let contribution = apportion(&interval, window, calendar);
        if !contribution.is_empty() {
            map.entry(interval.package)
                .or_insert_with(HourBuckets::new)
                .merge(&contribution);
        }
    }
    map
}
