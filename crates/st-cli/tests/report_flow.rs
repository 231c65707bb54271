//! End-to-end flow: JSON dumps on disk through to a finished report.

use std::io::Write;

use chrono::{NaiveDate, Utc};
use st_cli::commands::report::{day_window_ms, format_report, generate_report_data};
use st_cli::commands::sessions::collect_sessions;
use st_core::HourlyUsage;
use st_source::{JsonSource, MemoResolver, TableResolver};
use tempfile::NamedTempFile;

const HOUR_MS: i64 = 3_600_000;
const MIN_MS: i64 = 60_000;

/// Mid-January: no DST transition anywhere on this date, so hour-of-day
/// arithmetic relative to local midnight is stable across host zones.
fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

fn write_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

/// Events for one mail session 09:50 -> 12:10 local, plus log noise that
/// reconstruction must ignore.
fn fixture_files(day_start: i64, day_end: i64) -> (NamedTempFile, NamedTempFile) {
    let session_start = day_start + 9 * HOUR_MS + 50 * MIN_MS;
    let session_end = day_start + 12 * HOUR_MS + 10 * MIN_MS;

    let events = format!(
        r#"[
            {{"package": "com.example.mail", "timestamp_ms": {session_start}, "kind": "resumed"}},
            {{"package": "com.example.maps", "timestamp_ms": {orphan_pause}, "kind": "paused"}},
            {{"package": "com.example.mail", "timestamp_ms": {mid}, "kind": "screen_interactive"}},
            {{"package": "com.example.mail", "timestamp_ms": {session_end}, "kind": "paused"}},
            {{"package": "com.example.camera", "timestamp_ms": {dangling}, "kind": "resumed"}}
        ]"#,
        orphan_pause = day_start + 8 * HOUR_MS,
        mid = day_start + 10 * HOUR_MS,
        dangling = day_start + 13 * HOUR_MS,
    );

    let totals = format!(
        r#"[
            {{"package": "com.example.mail", "total_foreground_ms": {total},
              "last_used_ms": {session_end}, "first_seen_ms": {day_start}, "last_seen_ms": {day_end}}},
            {{"package": "com.example.idle", "total_foreground_ms": 0,
              "last_used_ms": 0, "first_seen_ms": {day_start}, "last_seen_ms": {day_end}}}
        ]"#,
        total = 2 * HOUR_MS + 20 * MIN_MS,
    );

    (write_file(&events), write_file(&totals))
}

#[test]
fn report_reconstructs_and_apportions_a_day() {
    let date = test_date();
    let (day_start, day_end) = day_window_ms(date);
    let (events, totals) = fixture_files(day_start, day_end);

    let source = JsonSource::new(events.path(), totals.path());
    let mut names = std::collections::HashMap::new();
    names.insert("com.example.mail".to_string(), "Mail".to_string());
    let resolver = MemoResolver::new(TableResolver::new(names));

    let data = generate_report_data(&source, &resolver, date, Utc::now()).unwrap();

    // Only the app with nonzero daily total appears.
    assert_eq!(data.reports.len(), 1);
    let report = &data.reports[0];
    assert_eq!(report.app_name, "Mail");
    assert_eq!(report.total_foreground_ms, 2 * HOUR_MS + 20 * MIN_MS);
    assert_eq!(report.hourly_total_ms, report.total_foreground_ms);
    assert_eq!(
        report.hourly,
        vec![
            HourlyUsage {
                hour: 9,
                duration_ms: 10 * MIN_MS,
            },
            HourlyUsage {
                hour: 10,
                duration_ms: HOUR_MS,
            },
            HourlyUsage {
                hour: 11,
                duration_ms: HOUR_MS,
            },
            HourlyUsage {
                hour: 12,
                duration_ms: 10 * MIN_MS,
            },
        ]
    );

    let output = format_report(&data);
    assert!(output.contains("Mail"));
    assert!(output.contains("2h 20m"));
}

#[test]
fn sessions_listing_matches_reconstruction() {
    let date = test_date();
    let (day_start, day_end) = day_window_ms(date);
    let (events, totals) = fixture_files(day_start, day_end);

    let source = JsonSource::new(events.path(), totals.path());
    let rows = collect_sessions(&source, date).unwrap();

    // One closed session; the orphan pause and dangling resume drop out.
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].package, "com.example.mail");
    assert_eq!(rows[0].duration_ms, 2 * HOUR_MS + 20 * MIN_MS);
}

#[test]
fn permission_denied_never_reaches_the_core() {
    let date = test_date();
    let (day_start, day_end) = day_window_ms(date);
    let (events, totals) = fixture_files(day_start, day_end);

    let source = JsonSource::new(events.path(), totals.path()).with_access(false);
    let resolver = MemoResolver::new(TableResolver::default());

    let err = generate_report_data(&source, &resolver, date, Utc::now()).unwrap_err();
    assert!(err.to_string().contains("permission"));
}
