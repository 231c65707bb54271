//! Reconciliation of hourly histograms with daily aggregate totals.
//!
//! Daily totals come from a separate platform query than the event log,
//! so the two can disagree (clock skew, events trimmed at the log's
//! retention edge, partial permission grants). The daily total stays
//! authoritative for the report's `total_foreground_ms`; a disagreement
//! is surfaced as a warning, never a failure, and no correction is
//! applied in either direction.

use serde::{Deserialize, Serialize};

use crate::apportion::{HourBucketMap, QueryWindow, accumulate_usage};
use crate::calendar::CivilCalendar;
use crate::event::RawEvent;
use crate::session::{OpenSessions, close_sessions};
use crate::types::PackageId;

/// Per-application daily aggregate, as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotal {
    /// The application.
    pub package: PackageId,
    /// Total foreground time for the day in milliseconds.
    pub total_foreground_ms: i64,
    /// When the application was last in the foreground.
    pub last_used_ms: i64,
    /// Start of the aggregate's measurement range.
    pub first_seen_ms: i64,
    /// End of the aggregate's measurement range.
    pub last_seen_ms: i64,
}

/// One hour's usage within a report, ordered by hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyUsage {
    /// Civil hour of day, 0..=23.
    pub hour: u32,
    /// Accumulated foreground time in that hour, milliseconds.
    pub duration_ms: i64,
}

/// Final per-application usage record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageReport {
    /// The application.
    pub package: PackageId,
    /// Human-readable name, falling back to the package ID.
    pub app_name: String,
    /// Authoritative daily total from the platform aggregate.
    pub total_foreground_ms: i64,
    /// When the application was last in the foreground.
    pub last_used_ms: i64,
    /// Start of the aggregate's measurement range.
    pub first_seen_ms: i64,
    /// End of the aggregate's measurement range.
    pub last_seen_ms: i64,
    /// Nonzero hours of the reconstructed histogram, in hour order.
    pub hourly: Vec<HourlyUsage>,
    /// Sum of the histogram, for cross-validation against the total.
    pub hourly_total_ms: i64,
}

/// Combines daily totals with the reconstructed hour histograms.
///
/// Applications with a zero (or negative) daily total are excluded.
/// A missing histogram entry is treated as empty. `resolve_name` is
/// invoked once per emitted report; callers wanting memoization across
/// calls own the cache.
pub fn build_reports<F>(
    daily_totals: Vec<DailyTotal>,
    usage: &HourBucketMap,
    mut resolve_name: F,
) -> Vec<UsageReport>
where
    F: FnMut(&PackageId) -> String,
{
    let mut reports: Vec<UsageReport> = daily_totals
        .into_iter()
        .filter(|total| total.total_foreground_ms > 0)
        .map(|total| {
            let buckets = usage.get(&total.package).copied().unwrap_or_default();
            let hourly_total_ms = buckets.total_ms();

            if hourly_total_ms != total.total_foreground_ms && !buckets.is_empty() {
                tracing::warn!(
                    package = %total.package,
                    hourly_total_ms,
                    total_foreground_ms = total.total_foreground_ms,
                    "hourly histogram disagrees with daily total"
                );
            }

            let app_name = resolve_name(&total.package);
            UsageReport {
                package: total.package,
                app_name,
                total_foreground_ms: total.total_foreground_ms,
                last_used_ms: total.last_used_ms,
                first_seen_ms: total.first_seen_ms,
                last_seen_ms: total.last_seen_ms,
                hourly: buckets
                    .nonzero()
                    .map(|(hour, duration_ms)| HourlyUsage { hour, duration_ms })
                    .collect(),
                hourly_total_ms,
            }
        })
        .collect();

    // Heaviest usage first; package ID breaks ties for stable output.
    reports.sort_by(|a, b| {
        b.total_foreground_ms
            .cmp(&a.total_foreground_ms)
            .then_with(|| a.package.as_str().cmp(b.package.as_str()))
    });
    reports
}

/// The full pipeline: reconstruct sessions, apportion them into hourly
/// buckets within the window, and reconcile with the daily totals.
///
/// Pure and synchronous; every invocation gets its own session store and
/// histogram map, so concurrent hosts need no locking.
pub fn compute_usage_report<C, F>(
    window: &QueryWindow,
    events: Vec<RawEvent>,
    daily_totals: Vec<DailyTotal>,
    calendar: &C,
    resolve_name: F,
) -> Vec<UsageReport>
where
    C: CivilCalendar,
    F: FnMut(&PackageId) -> String,
{
    let mut open = OpenSessions::new();
    let intervals = close_sessions(events, &mut open);
    let usage = accumulate_usage(intervals, window, calendar);
    if !open.is_empty() {
        tracing::debug!(open = open.len(), "sessions still open at end of stream");
    }
    build_reports(daily_totals, &usage, resolve_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apportion::HourBuckets;
    use crate::calendar::ZoneCalendar;
    use crate::event::EventKind;
    use chrono::{TimeZone, Utc};

    fn pkg(id: &str) -> PackageId {
        PackageId::new(id).unwrap()
    }

    fn total(id: &str, ms: i64) -> DailyTotal {
        DailyTotal {
            package: pkg(id),
            total_foreground_ms: ms,
            last_used_ms: 0,
            first_seen_ms: 0,
            last_seen_ms: 0,
        }
    }

    #[test]
    fn zero_usage_apps_are_excluded() {
        let usage = HourBucketMap::new();
        let reports = build_reports(
            vec![total("a", 0), total("b", 5000)],
            &usage,
            |p| p.to_string(),
        );
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].package, pkg("b"));
    }

    #[test]
    fn mismatch_is_reported_not_corrected() {
        let mut usage = HourBucketMap::new();
        let mut buckets = HourBuckets::new();
        buckets.add(14, 4000);
        usage.insert(pkg("a"), buckets);

        let reports = build_reports(vec![total("a", 5000)], &usage, |p| p.to_string());

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].total_foreground_ms, 5000);
        assert_eq!(reports[0].hourly_total_ms, 4000);
        assert_eq!(
            reports[0].hourly,
            vec![HourlyUsage {
                hour: 14,
                duration_ms: 4000,
            }]
        );
    }

    #[test]
    fn missing_histogram_entry_is_empty() {
        let usage = HourBucketMap::new();
        let reports = build_reports(vec![total("a", 5000)], &usage, |p| p.to_string());
        assert_eq!(reports[0].hourly, vec![]);
        assert_eq!(reports[0].hourly_total_ms, 0);
    }

    #[test]
    fn reports_sorted_by_total_descending() {
        let usage = HourBucketMap::new();
        let reports = build_reports(
            vec![total("light", 1000), total("heavy", 9000), total("mid", 5000)],
            &usage,
            |p| p.to_string(),
        );
        let order: Vec<_> = reports.iter().map(|r| r.package.as_str()).collect();
        assert_eq!(order, vec!["heavy", "mid", "light"]);
    }

    #[test]
    fn resolver_fallback_keeps_package_id() {
        let usage = HourBucketMap::new();
        let reports = build_reports(vec![total("com.example.x", 100)], &usage, |p| {
            p.to_string()
        });
        assert_eq!(reports[0].app_name, "com.example.x");
    }

    #[test]
    fn full_pipeline_reconstructs_apportions_and_reconciles() {
        let cal = ZoneCalendar::utc();
        let base = Utc
            .with_ymd_and_hms(2025, 3, 10, 0, 0, 0)
            .unwrap()
            .timestamp_millis();
        let hour = 3_600_000;
        let window = QueryWindow::new(base, base + 24 * hour).unwrap();

        // One session 09:50 -> 10:20 for "mail", one unmatched pause.
        let events = vec![
            RawEvent::new(pkg("maps"), base + 9 * hour, EventKind::Paused),
            RawEvent::new(pkg("mail"), base + 9 * hour + 50 * 60_000, EventKind::Resumed),
            RawEvent::new(pkg("mail"), base + 10 * hour + 20 * 60_000, EventKind::Paused),
        ];
        let totals = vec![total("mail", 30 * 60_000), total("maps", 0)];

        let reports = compute_usage_report(&window, events, totals, &cal, |p| {
            format!("App {p}")
        });

        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.app_name, "App mail");
        assert_eq!(report.hourly_total_ms, 30 * 60_000);
        assert_eq!(
            report.hourly,
            vec![
                HourlyUsage {
                    hour: 9,
                    duration_ms: 10 * 60_000,
                },
                HourlyUsage {
                    hour: 10,
                    duration_ms: 20 * 60_000,
                },
            ]
        );
    }

    #[test]
    fn daily_total_serde_roundtrip() {
        let t = total("com.example.mail", 1234);
        let json = serde_json::to_string(&t).unwrap();
        let parsed: DailyTotal = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, t);
    }
}
