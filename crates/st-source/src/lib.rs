//! Data source interfaces for the usage report pipeline.
//!
//! The core computation in `st-core` is pure; everything platform-shaped
//! lives behind the traits here: the usage-access permission gate, the
//! raw event stream, the daily aggregate totals, and display-name
//! resolution. [`JsonSource`] is the file-backed implementation used by
//! the CLI and by offline analysis of exported platform dumps.

mod json;
mod resolver;

pub use json::JsonSource;
pub use resolver::{MemoResolver, TableResolver};

use st_core::{DailyTotal, PackageId, RawEvent};
use thiserror::Error;

/// Errors from a usage data source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Usage access has not been granted; the query cannot proceed and
    /// the core is never entered.
    #[error("usage access permission not granted")]
    PermissionDenied,
    /// Failed to read a backing file.
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// A backing file held malformed JSON.
    #[error("failed to parse {path}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Provider of raw usage data for a query window.
///
/// `fetch_events` returns events ordered by timestamp, which downstream
/// session reconstruction relies on. Both fetch methods must refuse with
/// [`SourceError::PermissionDenied`] when [`UsageSource::has_usage_access`]
/// is false.
pub trait UsageSource {
    /// Whether the platform has granted access to usage data.
    fn has_usage_access(&self) -> bool;

    /// Transition events within `[start_ms, end_ms)`, timestamp-ordered.
    fn fetch_events(&self, start_ms: i64, end_ms: i64) -> Result<Vec<RawEvent>, SourceError>;

    /// Daily aggregate totals overlapping `[start_ms, end_ms)`.
    fn fetch_daily_totals(
        &self,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<DailyTotal>, SourceError>;
}

/// Resolves a package ID to a display name.
///
/// Infallible by contract: implementations fall back to the package ID
/// itself when no better name is known. Must be side-effect-free from
/// the caller's perspective.
pub trait NameResolver {
    /// The display name for `package`.
    fn resolve(&self, package: &PackageId) -> String;
}

impl<F> NameResolver for F
where
    F: Fn(&PackageId) -> String,
{
    fn resolve(&self, package: &PackageId) -> String {
        self(package)
    }
}
