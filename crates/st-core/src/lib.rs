//! Core domain logic for hourly app usage reports.
//!
//! This crate contains the fundamental types and logic for:
//! - Session reconstruction: pairing resume/pause transition events into
//!   closed foreground intervals
//! - Hourly apportionment: splitting intervals at civil-hour boundaries
//!   into sum-preserving per-hour contributions
//! - Reconciliation: cross-checking the hourly histogram against the
//!   platform's daily aggregate totals

pub mod apportion;
pub mod calendar;
pub mod event;
pub mod report;
pub mod session;
mod types;

pub use apportion::{HourBucketMap, HourBuckets, QueryWindow, accumulate_usage, apportion};
pub use calendar::{CivilCalendar, ZoneCalendar};
pub use event::{EventKind, RawEvent};
pub use report::{DailyTotal, HourlyUsage, UsageReport, build_reports, compute_usage_report};
pub use session::{ClosedInterval, OpenSessions, close_sessions};
pub use types::{PackageId, ValidationError};
