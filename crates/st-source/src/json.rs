//! JSON-file-backed usage source.

use std::fs;
use std::path::{Path, PathBuf};

use st_core::{DailyTotal, RawEvent};

use crate::{SourceError, UsageSource};

/// Reads events and daily totals from JSON files.
///
/// The files are arrays of the `st-core` serde shapes ([`RawEvent`] and
/// [`DailyTotal`]). Platform dumps interleave packages and occasionally
/// arrive out of order, so events are re-sorted by timestamp after the
/// window filter; the ordering invariant downstream is satisfied here,
/// at the edge.
#[derive(Debug, Clone)]
pub struct JsonSource {
    events_path: PathBuf,
    totals_path: PathBuf,
    access_granted: bool,
}

impl JsonSource {
    /// Creates a source over the given files.
    pub fn new(events_path: impl Into<PathBuf>, totals_path: impl Into<PathBuf>) -> Self {
        Self {
            events_path: events_path.into(),
            totals_path: totals_path.into(),
            access_granted: true,
        }
    }

    /// Overrides the permission gate, mirroring a platform that has not
    /// granted usage access.
    #[must_use]
    pub const fn with_access(mut self, granted: bool) -> Self {
        self.access_granted = granted;
        self
    }

    fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
        let text = fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SourceError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    fn check_access(&self) -> Result<(), SourceError> {
        if self.access_granted {
            Ok(())
        } else {
            Err(SourceError::PermissionDenied)
        }
    }
}

impl UsageSource for JsonSource {
    fn has_usage_access(&self) -> bool {
        self.access_granted
    }

    fn fetch_events(&self, start_ms: i64, end_ms: i64) -> Result<Vec<RawEvent>, SourceError> {
        self.check_access()?;
        let mut events: Vec<RawEvent> = Self::read_json(&self.events_path)?;
        let before = events.len();
        events.retain(|e| e.timestamp_ms >= start_ms && e.timestamp_ms < end_ms);
        events.sort_by_key(|e| e.timestamp_ms);
        tracing::debug!(
            kept = events.len(),
            dropped = before - events.len(),
            "loaded events"
        );
        Ok(events)
    }

    fn fetch_daily_totals(
        &self,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<DailyTotal>, SourceError> {
        self.check_access()?;
        let mut totals: Vec<DailyTotal> = Self::read_json(&self.totals_path)?;
        totals.retain(|t| t.first_seen_ms < end_ms && t.last_seen_ms >= start_ms);
        Ok(totals)
    }
}
