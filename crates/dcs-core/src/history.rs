//! Undo/redo history over deep chart snapshots.
//!
//! Entries are full copies of [`ChartState`]. Saving after an undo discards
//! every entry past the current index before appending, so there is never
//! more than one branch. Undo at the first entry and redo at the tail are
//! no-ops.

use serde::Serialize;

use dcs_model::ChartState;

/// Default maximum number of retained entries.
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

/// Cursor position exposed to the user-visible layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPosition {
    pub index: usize,
    pub len: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<ChartState>,
    index: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// Empty history retaining at most `limit` entries (minimum 1).
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            limit: limit.max(1),
        }
    }

    /// Append a deep copy of `state` as the new current entry.
    pub fn save(&mut self, state: &ChartState) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(state.clone());
        if self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(..overflow);
        }
        self.index = self.entries.len() - 1;
    }

    /// Step back one entry, returning the state to replay.
    pub fn undo(&mut self) -> Option<&ChartState> {
        if self.index == 0 || self.entries.is_empty() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Step forward one entry, returning the state to replay.
    pub fn redo(&mut self) -> Option<&ChartState> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    /// Drop every entry and seed the history with `state`.
    pub fn reset_with(&mut self, state: &ChartState) {
        self.entries.clear();
        self.index = 0;
        self.entries.push(state.clone());
    }

    pub fn current(&self) -> Option<&ChartState> {
        self.entries.get(self.index)
    }

    pub fn entries(&self) -> &[ChartState] {
        &self.entries
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn position(&self) -> HistoryPosition {
        HistoryPosition {
            index: self.index,
            len: self.entries.len(),
            can_undo: self.index > 0,
            can_redo: self.index + 1 < self.entries.len(),
        }
    }
}
