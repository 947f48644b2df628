//! Generation tokens for discarding stale loads.
//!
//! Loads may complete out of order. Each one takes a ticket before it starts
//! and the [`SnapshotSlot`] only installs results whose ticket is newer than
//! the one it already shows.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use flowdeck_types::ViewerLocation;
use tracing::debug;

use super::ViewerSnapshot;

/// Monotonically increasing load ticket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Hands out generations. Shared by every session of one viewer so that
/// navigating to a new id still orders against loads for the old one.
#[derive(Debug, Default)]
pub struct LoadSequencer {
    last: AtomicU64,
}

impl LoadSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_generation(&self) -> Generation {
        Generation(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Result of one load cycle.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub generation: Generation,
    pub location: ViewerLocation,
    /// `None` when the instance itself could not be fetched.
    pub snapshot: Option<Arc<ViewerSnapshot>>,
    /// Human readable descriptions of the reads that failed.
    pub errors: Vec<String>,
}

/// Holds the snapshot currently on screen.
#[derive(Debug, Default)]
pub struct SnapshotSlot {
    location: Option<ViewerLocation>,
    shown: Option<Generation>,
    current: Option<Arc<ViewerSnapshot>>,
}

impl SnapshotSlot {
    pub fn new(location: Option<ViewerLocation>) -> Self {
        Self {
            location,
            shown: None,
            current: None,
        }
    }

    /// Switches to another instance. The old snapshot is dropped and late
    /// reports for the previous location are ignored from now on.
    pub fn navigate(&mut self, location: ViewerLocation) {
        if self.location.as_ref() != Some(&location) {
            self.current = None;
        }
        self.location = Some(location);
    }

    pub fn location(&self) -> Option<&ViewerLocation> {
        self.location.as_ref()
    }

    pub fn current(&self) -> Option<&Arc<ViewerSnapshot>> {
        self.current.as_ref()
    }

    pub fn generation(&self) -> Option<Generation> {
        self.shown
    }

    /// Installs the report's snapshot if it is newer than what is shown and
    /// belongs to the current location. A failed load that is newer still
    /// advances the generation but keeps the previous snapshot.
    ///
    /// Returns `true` when the snapshot was replaced.
    pub fn accept(&mut self, report: LoadReport) -> bool {
        if self.location.as_ref() != Some(&report.location) {
            debug!(generation = report.generation.value(), location = %report.location, "discarding load for another location");
            return false;
        }
        if self.shown.is_some_and(|shown| report.generation <= shown) {
            debug!(generation = report.generation.value(), "discarding stale load");
            return false;
        }
        self.shown = Some(report.generation);
        match report.snapshot {
            Some(snapshot) => {
                self.current = Some(snapshot);
                true
            }
            None => false,
        }
    }
}
