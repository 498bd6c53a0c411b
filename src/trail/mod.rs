// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Trail-based backtracking over a flat array of cells.
//!
//! Search state that must be undone on backtracking lives in a `Vec<u64>` of cells. Every
//! assignment goes through [`Trail::assign`], which records the cell's previous value.
//! Rewinding to a checkpoint replays the recorded values in reverse, restoring every cell
//! changed since, in O(changes).

/// A single entry in the trail, recording one state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TrailEntry {
    /// Index of the changed cell.
    cell: usize,
    /// The value before the change.
    old_value: u64,
}

/// Undo log for a cell array.
#[derive(Debug, Default)]
pub struct Trail {
    entries: Vec<TrailEntry>,
}

impl Trail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position; pass to [`Trail::rewind_to`] to undo everything recorded after it.
    pub fn checkpoint(&self) -> usize {
        self.entries.len()
    }

    /// Set `cells[cell]`, recording the old value. Unchanged values are not recorded.
    pub fn assign(&mut self, cells: &mut [u64], cell: usize, value: u64) {
        let old_value = cells[cell];
        if old_value != value {
            self.entries.push(TrailEntry { cell, old_value });
            cells[cell] = value;
        }
    }

    /// Restore every cell changed since `checkpoint`.
    pub fn rewind_to(&mut self, checkpoint: usize, cells: &mut [u64]) {
        while self.entries.len() > checkpoint {
            if let Some(TrailEntry { cell, old_value }) = self.entries.pop() {
                cells[cell] = old_value;
            }
        }
    }

    /// Number of recorded changes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
