//! Snapshot-based bounded undo/redo over the surface sequence.
//!
//! Snapshots own deep copies of the surfaces, so later live edits never reach back into history.

use crate::surface::{model::Surface, rescale::rescale_surfaces};

/// Default number of retained snapshots.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Linear history with a cursor. The snapshot at `cursor` mirrors the live state after the most
/// recent commit, undo or redo.
#[derive(Clone, Debug)]
pub struct History {
    snapshots: Vec<Vec<Surface>>,
    cursor: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// Empty history retaining at most `limit` snapshots (at least one).
    pub fn new(limit: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            cursor: 0,
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Snapshot at `index`, oldest first.
    pub fn snapshot(&self, index: usize) -> Option<&[Surface]> {
        self.snapshots.get(index).map(Vec::as_slice)
    }

    /// Record `surfaces`, pruning any redo branch and evicting the oldest snapshot past the
    /// limit.
    pub fn commit(&mut self, surfaces: &[Surface]) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.cursor + 1);
        }
        self.snapshots.push(surfaces.to_vec());
        while self.snapshots.len() > self.limit {
            self.snapshots.remove(0);
        }
        self.cursor = self.snapshots.len() - 1;
        tracing::debug!(
            depth = self.snapshots.len(),
            cursor = self.cursor,
            "history commit"
        );
    }

    /// Step back. On success `surfaces` is replaced by a deep copy of the previous snapshot.
    pub fn undo(&mut self, surfaces: &mut Vec<Surface>) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        self.restore(surfaces);
        tracing::debug!(cursor = self.cursor, "undo");
        true
    }

    /// Step forward. On success `surfaces` is replaced by a deep copy of the next snapshot.
    pub fn redo(&mut self, surfaces: &mut Vec<Surface>) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        self.restore(surfaces);
        tracing::debug!(cursor = self.cursor, "redo");
        true
    }

    /// Drop every snapshot and record `surfaces` as the new baseline.
    pub fn reset(&mut self, surfaces: &[Surface]) {
        self.snapshots.clear();
        self.cursor = 0;
        self.commit(surfaces);
    }

    /// Rescale every retained snapshot proportionally. Returns `false` on a no-op rescale.
    pub fn rescale(&mut self, old_w: f64, old_h: f64, new_w: f64, new_h: f64) -> bool {
        let mut changed = false;
        for snap in &mut self.snapshots {
            changed |= rescale_surfaces(snap, old_w, old_h, new_w, new_h);
        }
        changed
    }

    fn restore(&self, surfaces: &mut Vec<Surface>) {
        if let Some(snap) = self.snapshots.get(self.cursor) {
            *surfaces = snap.clone();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/manager.rs"]
mod tests;
