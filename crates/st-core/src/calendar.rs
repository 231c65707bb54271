//! Civil-calendar abstraction for hour arithmetic.
//!
//! Hour boundaries are calendar facts, not fixed 3,600,000 ms strides:
//! a daylight-saving transition makes one civil hour shorter or longer
//! than an hour of elapsed time. Everything that needs "which hour is
//! this instant in" or "where does the next hour start" goes through the
//! [`CivilCalendar`] trait so the apportioner never bakes in a timezone
//! or a fixed-width-hour assumption.

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};

/// Calendar capability injected into the apportioner.
///
/// Implementations must keep `start_of_hour(ts) <= ts` and make
/// `next_hour_boundary(ts)` strictly greater than `ts` for every
/// representable instant, otherwise apportionment degenerates to
/// contributing nothing for the offending segment.
pub trait CivilCalendar {
    /// The civil hour-of-day (0..=23) containing `ts_ms`.
    fn hour_of_day(&self, ts_ms: i64) -> u32;

    /// The instant at which the civil hour containing `ts_ms` began.
    fn start_of_hour(&self, ts_ms: i64) -> i64;

    /// The instant `n` civil hours after `ts_ms`.
    fn add_hours(&self, ts_ms: i64, n: i64) -> i64;

    /// The instant at which the next civil hour after `ts_ms` begins.
    fn next_hour_boundary(&self, ts_ms: i64) -> i64 {
        self.add_hours(self.start_of_hour(ts_ms), 1)
    }
}

/// A [`CivilCalendar`] backed by a chrono [`TimeZone`].
#[derive(Debug, Clone)]
pub struct ZoneCalendar<Tz: TimeZone> {
    tz: Tz,
}

impl<Tz: TimeZone> ZoneCalendar<Tz> {
    /// Creates a calendar for the given timezone.
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    fn at(&self, ts_ms: i64) -> DateTime<Tz> {
        // Timestamps outside chrono's representable range clamp to the
        // epoch; callers feed platform timestamps, which are well inside.
        DateTime::from_timestamp_millis(ts_ms)
            .unwrap_or_default()
            .with_timezone(&self.tz)
    }

    /// Maps a naive local time back to an instant. Ambiguous local times
    /// (fall-back fold) resolve to the earlier instant; local times
    /// inside a spring-forward gap fall back to `fallback_ms`.
    fn resolve_local(&self, naive: chrono::NaiveDateTime, fallback_ms: i64) -> i64 {
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .map_or(fallback_ms, |dt| dt.timestamp_millis())
    }
}

impl ZoneCalendar<chrono::Local> {
    /// Calendar for the host's local timezone.
    #[must_use]
    pub fn local() -> Self {
        Self::new(chrono::Local)
    }
}

impl ZoneCalendar<Utc> {
    /// Calendar for UTC, where every hour is exactly 3,600,000 ms.
    #[must_use]
    pub const fn utc() -> Self {
        Self::new(Utc)
    }
}

impl<Tz: TimeZone> CivilCalendar for ZoneCalendar<Tz> {
    fn hour_of_day(&self, ts_ms: i64) -> u32 {
        self.at(ts_ms).hour()
    }

    fn start_of_hour(&self, ts_ms: i64) -> i64 {
        let local = self.at(ts_ms).naive_local();
        let truncated = local
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(local);
        self.resolve_local(truncated, ts_ms)
    }

    fn add_hours(&self, ts_ms: i64, n: i64) -> i64 {
        let local = self.at(ts_ms).naive_local();
        let shifted = local + Duration::hours(n);
        self.resolve_local(shifted, ts_ms + n * 3_600_000)
    }
}
