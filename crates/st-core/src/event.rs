//! Raw foreground/background transition events from the platform.

use serde::{Deserialize, Serialize};

use crate::types::PackageId;

/// A single transition event from the platform's usage event log.
///
/// Events arrive ordered by timestamp; the core treats that ordering as an
/// input invariant and never re-sorts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// The application the event belongs to.
    pub package: PackageId,
    /// Event time in milliseconds since the epoch.
    pub timestamp_ms: i64,
    /// The transition kind.
    pub kind: EventKind,
}

/// The kind of transition an event records.
///
/// Platforms emit many event types beyond foreground transitions
/// (configuration changes, screen interactive, ...). Anything that is not
/// a resume or pause deserializes to [`EventKind::Other`] and is ignored
/// by session reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The application moved to the foreground.
    Resumed,
    /// The application left the foreground.
    Paused,
    /// Any other platform event.
    #[serde(other)]
    Other,
}

impl RawEvent {
    /// Convenience constructor.
    pub const fn new(package: PackageId, timestamp_ms: i64, kind: EventKind) -> Self {
        Self {
            package,
            timestamp_ms,
            kind,
        }
    }
}
