//! Dirty state tracking for auto-save.

use std::time::Instant;

use super::AutoSaveConfig;

/// Tracks unsaved chart changes by revision.
///
/// The chart engine bumps a revision counter on every mutation; the tracker
/// compares it with the revision last written to the store. Time is passed in
/// so callers (and tests) control the clock.
#[derive(Debug, Clone)]
pub struct DirtyTracker {
    /// Revision written by the last successful save.
    saved_revision: u64,

    /// Latest revision observed.
    seen_revision: u64,

    /// When the most recent change was observed.
    last_change: Option<Instant>,

    /// When the first unsaved change was observed. Reset when saved.
    first_unsaved_change: Option<Instant>,

    /// Revision being written by an in-flight save.
    saving: Option<u64>,
}

impl DirtyTracker {
    /// A clean tracker for a chart currently at `revision`.
    pub fn new(revision: u64) -> Self {
        Self {
            saved_revision: revision,
            seen_revision: revision,
            last_change: None,
            first_unsaved_change: None,
            saving: None,
        }
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.seen_revision != self.saved_revision
    }

    #[inline]
    pub fn is_saving(&self) -> bool {
        self.saving.is_some()
    }

    pub fn saved_revision(&self) -> u64 {
        self.saved_revision
    }

    /// Record the chart's current revision.
    pub fn observe(&mut self, revision: u64, now: Instant) {
        if revision == self.seen_revision {
            return;
        }
        self.seen_revision = revision;
        if self.is_dirty() {
            self.last_change = Some(now);
            self.first_unsaved_change.get_or_insert(now);
        } else {
            self.last_change = None;
            self.first_unsaved_change = None;
        }
    }

    /// Mark that a save of the latest observed revision has started.
    /// Returns that revision.
    pub fn start_save(&mut self) -> u64 {
        self.saving = Some(self.seen_revision);
        self.seen_revision
    }

    /// Mark that the in-flight save completed.
    ///
    /// Changes observed while saving keep the tracker dirty.
    pub fn save_complete(&mut self) {
        let Some(revision) = self.saving.take() else {
            return;
        };
        self.saved_revision = revision;
        if self.is_dirty() {
            self.first_unsaved_change = self.last_change;
        } else {
            self.last_change = None;
            self.first_unsaved_change = None;
        }
    }

    /// Mark that the in-flight save failed; the changes stay unsaved.
    pub fn save_failed(&mut self) {
        self.saving = None;
    }

    /// Check if auto-save should trigger at `now`.
    pub fn should_auto_save(&self, config: &AutoSaveConfig, now: Instant) -> bool {
        if !self.is_dirty() || self.is_saving() || !config.enabled {
            return false;
        }
        match (self.last_change, self.first_unsaved_change) {
            (Some(last), Some(first)) => {
                config.should_save(now.duration_since(last), now.duration_since(first))
            }
            _ => false,
        }
    }
}
