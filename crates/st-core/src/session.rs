//! Session reconstruction from raw transition events.
//!
//! Pairs each pause with the most recent unmatched resume for the same
//! package, yielding closed `[start, end)` foreground intervals. Upstream
//! event logs are lossy by nature, so anything that does not pair up is
//! silently dropped rather than treated as an error: unmatched pauses,
//! dangling resumes, and zero- or negative-duration intervals all
//! contribute nothing.

use std::collections::HashMap;

use crate::event::{EventKind, RawEvent};
use crate::types::PackageId;

/// Open foreground sessions, keyed by package.
///
/// Holds the timestamp of the most recent unmatched resume per package.
/// At most one session per package is open at a time; a second resume
/// before a matching pause replaces the prior timestamp (an application
/// restart, not an error). The store is caller-owned state: pass a fresh
/// one per query, there is no hidden global.
#[derive(Debug, Clone, Default)]
pub struct OpenSessions {
    started: HashMap<PackageId, i64>,
}

impl OpenSessions {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a resume, overwriting any prior open timestamp.
    pub fn resume(&mut self, package: PackageId, timestamp_ms: i64) {
        self.started.insert(package, timestamp_ms);
    }

    /// Removes and returns the open timestamp for a package, if any.
    pub fn pause(&mut self, package: &PackageId) -> Option<i64> {
        self.started.remove(package)
    }

    /// Number of currently open sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.started.len()
    }

    /// Whether no sessions are open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.started.is_empty()
    }
}

/// A reconstructed contiguous foreground session, `[start, end)`.
///
/// `end_ms > start_ms` holds for every interval this module emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedInterval {
    pub package: PackageId,
    pub start_ms: i64,
    pub end_ms: i64,
}

impl ClosedInterval {
    /// Interval length in milliseconds.
    #[must_use]
    pub const fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }
}

/// Reconstructs closed intervals from an ordered event stream.
///
/// Lazy: intervals are emitted as their pause events are consumed, in
/// arrival order. The caller owns the [`OpenSessions`] store; sessions
/// still open after the stream ends remain in it.
pub fn close_sessions<'a, I>(
    events: I,
    open: &'a mut OpenSessions,
) -> impl Iterator<Item = ClosedInterval> + 'a
where
    I: IntoIterator<Item = RawEvent>,
    I::IntoIter: 'a,
{
    events.into_iter().filter_map(move |event| {
        match event.kind {
            EventKind::Resumed => {
                open.resume(event.package, event.timestamp_ms);
                None
            }
            EventKind::Paused => {
                let started = open.pause(&event.package)?;
                // Platform logs occasionally carry zeroed or reordered
                // timestamps; such pairs are dropped, not errors.
                if started > 0 && event.timestamp_ms > started {
                    Some(ClosedInterval {
                        package: event.package,
                        start_ms: started,
                        end_ms: event.timestamp_ms,
                    })
                } else {
                    tracing::trace!(
                        package = %event.package,
                        started,
                        ended = event.timestamp_ms,
                        "dropping degenerate session"
                    );
                    None
                }
            }
            EventKind::Other => None,
        }
    })
}
