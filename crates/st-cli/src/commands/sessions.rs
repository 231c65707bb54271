//! Sessions command: dump reconstructed foreground intervals.
//!
//! Inspection aid for checking what the reconstruction step makes of a
//! platform dump before it is apportioned into hourly buckets.

use std::fmt::Write;

use anyhow::{Context, Result, ensure};
use chrono::{Local, NaiveDate, TimeZone};
use serde::Serialize;
use st_core::{ClosedInterval, OpenSessions, close_sessions};
use st_source::UsageSource;

use super::report::{day_window_ms, format_duration};

/// One reconstructed session, serializable for `--json`.
#[derive(Debug, Serialize)]
pub struct SessionRow {
    pub package: String,
    pub start_ms: i64,
    pub end_ms: i64,
    pub duration_ms: i64,
}

impl From<ClosedInterval> for SessionRow {
    fn from(interval: ClosedInterval) -> Self {
        Self {
            duration_ms: interval.duration_ms(),
            package: interval.package.into(),
            start_ms: interval.start_ms,
            end_ms: interval.end_ms,
        }
    }
}

/// Reconstructs the day's sessions from the source.
pub fn collect_sessions<S: UsageSource>(source: &S, date: NaiveDate) -> Result<Vec<SessionRow>> {
    ensure!(
        source.has_usage_access(),
        "usage access permission not granted"
    );

    let (start_ms, end_ms) = day_window_ms(date);
    let events = source
        .fetch_events(start_ms, end_ms)
        .context("failed to fetch events")?;

    let mut open = OpenSessions::new();
    let rows: Vec<SessionRow> = close_sessions(events, &mut open)
        .map(SessionRow::from)
        .collect();
    if !open.is_empty() {
        tracing::debug!(open = open.len(), "sessions still open at end of day");
    }
    Ok(rows)
}

/// Formats the human-readable session listing.
pub fn format_sessions(date: NaiveDate, rows: &[SessionRow]) -> String {
    let mut output = String::new();
    writeln!(output, "SESSIONS: {}", date.format("%A, %b %-d, %Y")).unwrap();
    writeln!(output).unwrap();

    if rows.is_empty() {
        writeln!(output, "No closed sessions.").unwrap();
        return output;
    }

    for row in rows {
        let start = format_clock(row.start_ms);
        let end = format_clock(row.end_ms);
        writeln!(
            output,
            "{start} - {end}  {:<40}{:>7}",
            row.package,
            format_duration(row.duration_ms)
        )
        .unwrap();
    }
    writeln!(output).unwrap();
    writeln!(output, "{} sessions", rows.len()).unwrap();
    output
}

/// Local wall-clock `HH:MM:SS` for an epoch timestamp.
fn format_clock(ts_ms: i64) -> String {
    Local
        .timestamp_millis_opt(ts_ms)
        .single()
        .map_or_else(|| "??:??:??".to_string(), |dt| dt.format("%H:%M:%S").to_string())
}

/// Runs the sessions command.
pub fn run<S: UsageSource>(source: &S, date: NaiveDate, json: bool) -> Result<()> {
    let rows = collect_sessions(source, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print!("{}", format_sessions(date, &rows));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(package: &str, start_ms: i64, end_ms: i64) -> SessionRow {
        SessionRow {
            package: package.to_string(),
            start_ms,
            end_ms,
            duration_ms: end_ms - start_ms,
        }
    }

    #[test]
    fn empty_listing_says_so() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let output = format_sessions(date, &[]);
        assert!(output.contains("No closed sessions."));
    }

    #[test]
    fn listing_shows_package_and_duration() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let rows = vec![row("com.example.mail", 1_000_000, 1_600_000)];
        let output = format_sessions(date, &rows);
        assert!(output.contains("com.example.mail"));
        assert!(output.contains("10m"));
        assert!(output.contains("1 sessions"));
    }

    #[test]
    fn json_rows_carry_duration() {
        let rows = vec![row("a", 0, 5000)];
        let json = serde_json::to_string(&rows).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["duration_ms"], 5000);
    }
}
