//! Report command: per-application hourly usage for one day.

use std::fmt::Write;

use anyhow::{Context, Result, ensure};
use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use st_core::{QueryWindow, UsageReport, ZoneCalendar, compute_usage_report};
use st_source::{NameResolver, UsageSource};

/// Computed report data.
#[derive(Debug)]
pub struct ReportData {
    pub generated_at: DateTime<Utc>,
    pub timezone: String,
    pub date: NaiveDate,
    pub window_start_ms: i64,
    pub window_end_ms: i64,
    pub reports: Vec<UsageReport>,
}

// ========== Day Boundary Calculation ==========

/// Converts a local date at midnight to UTC.
/// Handles DST ambiguity by picking the earlier time.
fn local_midnight_to_utc(local_date: NaiveDate) -> DateTime<Utc> {
    let midnight = local_date.and_time(NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    match Local.from_local_datetime(&midnight) {
        // Single or ambiguous (DST fall-back): use the earlier time
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            // DST spring-forward gap at midnight is rare but possible
            // Use 1am local which is guaranteed to exist
            let one_am = local_date.and_time(NaiveTime::from_hms_opt(1, 0, 0).unwrap());
            Local
                .from_local_datetime(&one_am)
                .unwrap()
                .with_timezone(&Utc)
        }
    }
}

/// The local civil day as a half-open `[start, end)` window in epoch ms.
pub fn day_window_ms(date: NaiveDate) -> (i64, i64) {
    let next = date + chrono::Duration::days(1);
    (
        local_midnight_to_utc(date).timestamp_millis(),
        local_midnight_to_utc(next).timestamp_millis(),
    )
}

// ========== Duration Formatting ==========

/// Formats milliseconds as duration string.
/// Returns "Xh Ym" if >= 1 hour, "Xm" if < 1 hour.
/// Negative durations are treated as 0m (defensive).
pub fn format_duration(ms: i64) -> String {
    if ms < 0 {
        return "0m".to_string();
    }
    let total_minutes = ms / 60_000;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

// ========== Progress Bar ==========

/// Generates a 10-character progress bar.
/// Values <5% of max get a single block for visibility.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: i64, max: i64) -> String {
    if max == 0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1 // Minimum 1 for visibility
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

// ========== Report Generation ==========

/// Generates report data for one local civil day.
pub fn generate_report_data<S, R>(
    source: &S,
    resolver: &R,
    date: NaiveDate,
    generated_at: DateTime<Utc>,
) -> Result<ReportData>
where
    S: UsageSource,
    R: NameResolver,
{
    ensure!(
        source.has_usage_access(),
        "usage access permission not granted"
    );

    let (start_ms, end_ms) = day_window_ms(date);
    let window = QueryWindow::new(start_ms, end_ms)?;
    let events = source
        .fetch_events(start_ms, end_ms)
        .context("failed to fetch events")?;
    let totals = source
        .fetch_daily_totals(start_ms, end_ms)
        .context("failed to fetch daily totals")?;
    tracing::debug!(events = events.len(), totals = totals.len(), %date, "query loaded");

    let calendar = ZoneCalendar::local();
    let reports = compute_usage_report(&window, events, totals, &calendar, |p| {
        resolver.resolve(p)
    });

    let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());

    Ok(ReportData {
        generated_at,
        timezone,
        date,
        window_start_ms: start_ms,
        window_end_ms: end_ms,
        reports,
    })
}

/// Formats the human-readable report output.
pub fn format_report(data: &ReportData) -> String {
    let mut output = String::new();

    writeln!(output, "APP USAGE: {}", data.date.format("%A, %b %-d, %Y")).unwrap();

    if data.reports.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "No usage recorded this day.").unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "Hint: Pass --events/--totals or check the configured dump paths."
        )
        .unwrap();
        return output;
    }

    // Bars are scaled to the busiest hour across all apps so columns are
    // comparable between apps.
    let max_hour_ms = data
        .reports
        .iter()
        .flat_map(|r| r.hourly.iter().map(|h| h.duration_ms))
        .max()
        .unwrap_or(0);

    for report in &data.reports {
        writeln!(output).unwrap();
        writeln!(
            output,
            "{:<40}{:>7}",
            report.app_name,
            format_duration(report.total_foreground_ms)
        )
        .unwrap();

        for entry in &report.hourly {
            writeln!(
                output,
                "  {:02}  {}  {:>7}",
                entry.hour,
                progress_bar(entry.duration_ms, max_hour_ms),
                format_duration(entry.duration_ms)
            )
            .unwrap();
        }
        if report.hourly.is_empty() {
            writeln!(output, "  (no events for this app in the window)").unwrap();
        }
    }

    let total: i64 = data.reports.iter().map(|r| r.total_foreground_ms).sum();
    writeln!(output).unwrap();
    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(output, "Total foreground: {}", format_duration(total)).unwrap();
    writeln!(output, "Apps: {}", data.reports.len()).unwrap();

    output
}

// ========== JSON Output ==========

/// JSON report envelope.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub generated_at: String,
    pub timezone: String,
    pub date: String,
    pub window: JsonWindow,
    pub apps: &'a [UsageReport],
}

#[derive(Debug, Serialize)]
pub struct JsonWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

/// Formats report data as JSON.
pub fn format_report_json(data: &ReportData) -> Result<String> {
    let report = JsonReport {
        generated_at: data.generated_at.to_rfc3339(),
        timezone: data.timezone.clone(),
        date: data.date.format("%Y-%m-%d").to_string(),
        window: JsonWindow {
            start_ms: data.window_start_ms,
            end_ms: data.window_end_ms,
        },
        apps: &data.reports,
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run<S, R>(source: &S, resolver: &R, date: NaiveDate, json: bool) -> Result<()>
where
    S: UsageSource,
    R: NameResolver,
{
    let data = generate_report_data(source, resolver, date, Utc::now())?;

    if json {
        println!("{}", format_report_json(&data)?);
    } else {
        print!("{}", format_report(&data));
    }

    Ok(())
}
