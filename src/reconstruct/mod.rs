// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Witness reconstruction from a finalized table.
//!
//! The table only stores sizes and a preferred index bound, not paths. A witness is found
//! by a randomized backtracking search ([`predicates`]) that uses the table sizes as a
//! lower bound: a vector is accepted only if the state it leads to can still be completed
//! within the remaining number of selections. Some optimal selection always passes these
//! checks, so running out of candidates altogether means the table is inconsistent and is
//! reported as [`SearchError::Exhausted`].
//!
//! Vector indices are then mapped to item ids. Items with identical contributions share a
//! group; each selected index draws one id uniformly from its group, excluding ids already
//! drawn.

pub mod context;
pub mod predicates;

pub use context::WitnessContext;
pub use predicates::{ChooseVectorPredicate, WitnessFoundPredicate};

use crate::catalog::ItemId;
use crate::engine::EngineBuilder;
use crate::error::{InputError, Result, SearchError, StoreError};
use crate::table::TableStore;
use rand::seq::SliceRandom;
use rand::RngCore;
use std::collections::HashSet;
use tracing::debug;

/// Finds witnesses in a finalized table.
#[derive(Debug, Clone, Copy)]
pub struct Reconstructor<'a> {
    store: &'a TableStore,
}

impl<'a> Reconstructor<'a> {
    pub fn new(store: &'a TableStore) -> Result<Self, StoreError> {
        if !store.is_finalized() {
            return Err(StoreError::Uninitialized);
        }
        Ok(Self { store })
    }

    /// Vector indices of one minimal completion of `satisfied`, in decreasing order.
    pub fn vector_indices(&self, satisfied: &[u16], rng: &mut dyn RngCore) -> Result<Vec<usize>> {
        let shape = self.store.shape()?;
        if shape.check(satisfied).is_err() {
            return Err(InputError::SatisfiedOutOfRange {
                satisfied: satisfied.to_vec(),
                capacity: shape.capacity().to_vec(),
            }
            .into());
        }
        let expected = self.store.get(satisfied)?.size;

        let mut ctx = WitnessContext::new(self.store, satisfied, expected, rng)?;
        let engine = EngineBuilder::new()
            .add(Box::new(ChooseVectorPredicate::new()))
            .terminal(Box::new(WitnessFoundPredicate))
            .build();

        match engine.search(&mut ctx) {
            Some(engine) => {
                let (tries, retries) = engine.statistics();
                debug!(
                    "Witness for {:?} found after {} tries and {} retries",
                    satisfied, tries, retries
                );
                Ok(ctx.selection())
            }
            None => match ctx.take_error() {
                Some(err) => Err(err),
                None => Err(SearchError::Exhausted {
                    satisfied: satisfied.to_vec(),
                    expected,
                }
                .into()),
            },
        }
    }

    /// Item ids of one minimal completion of `satisfied`, in selection order.
    pub fn witness(&self, satisfied: &[u16], rng: &mut dyn RngCore) -> Result<Vec<ItemId>> {
        let indices = self.vector_indices(satisfied, rng)?;
        let catalog = self.store.catalog()?;

        let mut used = HashSet::with_capacity(indices.len());
        let mut ids = Vec::with_capacity(indices.len());
        for index in indices {
            let group = catalog.ids_sharing(index);
            let available: Vec<ItemId> = group
                .iter()
                .copied()
                .filter(|id| !used.contains(id))
                .collect();
            let id = match available.choose(rng) {
                Some(&id) => id,
                None => {
                    return Err(SearchError::DuplicateItem {
                        item: catalog.entries()[index].id,
                    }
                    .into())
                }
            };
            used.insert(id);
            ids.push(id);
        }
        Ok(ids)
    }
}
