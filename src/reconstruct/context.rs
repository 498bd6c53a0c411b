// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Search state for one witness reconstruction.
//!
//! Everything the engine must restore on backtracking lives in trailed cells:
//!
//! ```text
//! cells[0..M)          credits satisfied so far, per category
//! cells[M]             number of vectors selected
//! cells[M + 1]         exclusive upper bound on the next vector index
//! cells[M + 2 + k]     k-th selected vector index
//! ```
//!
//! The table, catalog, and random source are shared read-only (or, for the random source,
//! deliberately not restored: a retried step draws a fresh shuffle).

use crate::catalog::Catalog;
use crate::engine::PredicateResult;
use crate::error::{Error, StoreError};
use crate::lattice::Shape;
use crate::table::{TableEntry, TableStore};
use crate::trail::Trail;
use rand::RngCore;

pub struct WitnessContext<'a> {
    store: &'a TableStore,
    shape: &'a Shape,
    catalog: &'a Catalog,
    rng: &'a mut dyn RngCore,
    trail: Trail,
    cells: Vec<u64>,
    error: Option<Error>,
}

impl std::fmt::Debug for WitnessContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WitnessContext")
            .field("satisfied", &self.satisfied())
            .field("selection", &self.selection())
            .field("upper_bound", &self.upper_bound())
            .finish()
    }
}

impl<'a> WitnessContext<'a> {
    /// Start a search from `satisfied`, with room for `size` selections.
    ///
    /// `satisfied` must be a lattice point of the store's shape.
    pub fn new(
        store: &'a TableStore,
        satisfied: &[u16],
        size: u32,
        rng: &'a mut dyn RngCore,
    ) -> Result<Self, StoreError> {
        let shape = store.shape()?;
        let catalog = store.catalog()?;
        shape.check(satisfied)?;

        let dimensions = shape.dimensions();
        let mut cells = vec![0u64; dimensions + 2 + size as usize];
        for (cell, &value) in cells.iter_mut().zip(satisfied) {
            *cell = value as u64;
        }
        cells[dimensions + 1] = catalog.len() as u64;

        Ok(Self {
            store,
            shape,
            catalog,
            rng,
            trail: Trail::new(),
            cells,
            error: None,
        })
    }

    pub fn shape(&self) -> &'a Shape {
        self.shape
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn rng(&mut self) -> &mut dyn RngCore {
        &mut *self.rng
    }

    /// Table entry of a lattice point.
    pub fn entry(&self, point: &[u16]) -> Result<TableEntry, StoreError> {
        self.store.get(point)
    }

    pub fn checkpoint(&self) -> usize {
        self.trail.checkpoint()
    }

    pub fn rewind_to(&mut self, checkpoint: usize) {
        self.trail.rewind_to(checkpoint, &mut self.cells);
    }

    pub fn cell(&self, index: usize) -> u64 {
        self.cells[index]
    }

    /// Set a cell, recording its old value on the trail.
    pub fn assign(&mut self, index: usize, value: u64) {
        self.trail.assign(&mut self.cells, index, value);
    }

    /// Credits satisfied so far.
    pub fn satisfied(&self) -> Vec<u16> {
        self.cells[..self.shape.dimensions()]
            .iter()
            .map(|&v| v as u16)
            .collect()
    }

    pub fn set_satisfied(&mut self, satisfied: &[u16]) {
        for (index, &value) in satisfied.iter().enumerate() {
            self.assign(index, value as u64);
        }
    }

    fn depth_cell(&self) -> usize {
        self.shape.dimensions()
    }

    /// Every vector selected next must have a smaller index than this.
    pub fn upper_bound(&self) -> usize {
        self.cells[self.depth_cell() + 1] as usize
    }

    /// Append `index` to the selection and lower the upper bound to it.
    ///
    /// Returns false, changing nothing, when every selection slot is used.
    pub fn push_selection(&mut self, index: usize) -> bool {
        let depth_cell = self.depth_cell();
        let depth = self.cells[depth_cell] as usize;
        let slot = depth_cell + 2 + depth;
        if slot >= self.cells.len() {
            return false;
        }
        self.assign(slot, index as u64);
        self.assign(depth_cell, depth as u64 + 1);
        self.assign(depth_cell + 1, index as u64);
        true
    }

    /// Selection slots still free.
    pub fn remaining(&self) -> usize {
        let depth_cell = self.depth_cell();
        let used = depth_cell + 2 + self.cells[depth_cell] as usize;
        self.cells.len() - used
    }

    /// Vector indices selected so far, in selection order.
    pub fn selection(&self) -> Vec<usize> {
        let depth_cell = self.depth_cell();
        let depth = self.cells[depth_cell] as usize;
        self.cells[depth_cell + 2..depth_cell + 2 + depth]
            .iter()
            .map(|&v| v as usize)
            .collect()
    }

    /// Record `error` and stop the search.
    pub fn abort(&mut self, error: impl Into<Error>) -> PredicateResult {
        self.error = Some(error.into());
        PredicateResult::Abort
    }

    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_are_trailed() {
        let fixture = fixtures::scenario();
        let mut rng = fixtures::rng();
        let mut ctx = fixture.context(&mut rng);
        assert_eq!(ctx.satisfied(), vec![0, 0]);
        assert_eq!(ctx.upper_bound(), 3);
        assert_eq!(ctx.remaining(), 1);

        let checkpoint = ctx.checkpoint();
        ctx.set_satisfied(&[1, 1]);
        assert!(ctx.push_selection(0));
        assert!(!ctx.push_selection(0));
        assert_eq!(ctx.selection(), vec![0]);
        assert_eq!(ctx.upper_bound(), 0);
        assert_eq!(ctx.remaining(), 0);

        ctx.rewind_to(checkpoint);
        assert_eq!(ctx.satisfied(), vec![0, 0]);
        assert!(ctx.selection().is_empty());
        assert_eq!(ctx.upper_bound(), 3);
    }

    #[test]
    fn test_rejects_point_outside_lattice() {
        let fixture = fixtures::scenario();
        let mut rng = fixtures::rng();
        assert!(WitnessContext::new(&fixture.store, &[2, 0], 1, &mut rng).is_err());
    }

    #[test]
    fn test_abort_keeps_error() {
        let fixture = fixtures::scenario();
        let mut rng = fixtures::rng();
        let mut ctx = fixture.context(&mut rng);
        assert_eq!(
            ctx.abort(StoreError::Uninitialized),
            PredicateResult::Abort
        );
        assert!(matches!(
            ctx.take_error(),
            Some(Error::Store(StoreError::Uninitialized))
        ));
        assert!(ctx.take_error().is_none());
    }
}
