// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The two operations the crate offers its callers.
//!
//! - [`build_or_load`]: open the table file for a problem, rebuilding it if it is missing,
//!   damaged, unfinished, or describes a different problem.
//! - [`CoverTable::solve`]: complete a partially satisfied requirement with a minimum
//!   number of items, checked against the original catalog before it is returned.
//!
//! # Examples
//!
//! ```
//! use credit_cover::{build_or_load, BuildOptions, Problem};
//! use rand::thread_rng;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let problem = Problem::new(vec![1, 1], vec![vec![1, 0], vec![0, 1], vec![1, 1]]).unwrap();
//! let table = build_or_load(&problem, dir.path().join("table.bin"), BuildOptions::default())
//!     .unwrap();
//!
//! let witness = table.solve(&[0, 0], &mut thread_rng()).unwrap();
//! assert_eq!(witness.into_iter().collect::<Vec<_>>(), vec![2]);
//! assert_eq!(table.min_items(&[1, 0]).unwrap(), 1);
//! ```

use crate::catalog::{Catalog, ItemId, Problem};
use crate::closure::{BuildOptions, BuildReport, ClosureBuilder};
use crate::error::{InputError, Result, SearchError};
use crate::lattice::{add, Shape};
use crate::reconstruct::Reconstructor;
use crate::table::{TableEntry, TableStore};
use rand::RngCore;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, warn};

/// Where a [`CoverTable`]'s contents came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOrigin {
    /// A finalized file for the same problem was already on disk.
    Loaded,
    /// The table was computed by this call.
    Built,
}

/// A finalized table together with the problem it was built for.
///
/// Read-only and `Sync`: any number of threads may call [`CoverTable::solve`] at once.
#[derive(Debug)]
pub struct CoverTable {
    problem: Problem,
    store: TableStore,
    origin: TableOrigin,
    report: Option<BuildReport>,
}

/// Open the table at `path` for `problem`, building it first if necessary.
///
/// Fails with [`InputError::PrunedTable`] if `options` asks for a pruned build, since
/// [`CoverTable::solve`] must be exact from every partially satisfied state.
pub fn build_or_load(
    problem: &Problem,
    path: impl AsRef<Path>,
    options: BuildOptions,
) -> Result<CoverTable> {
    if options.prune_to_full_cover {
        return Err(InputError::PrunedTable.into());
    }
    let path = path.as_ref();
    let catalog = Catalog::canonicalize(problem);
    let mut store = TableStore::open(path)?;

    if store.is_finalized() {
        if describes(&store, problem.shape(), &catalog)? {
            info!("Using existing table {}", path.display());
            return Ok(CoverTable {
                problem: problem.clone(),
                store,
                origin: TableOrigin::Loaded,
                report: None,
            });
        }
        warn!(
            "Table {} was built for a different problem; rebuilding",
            path.display()
        );
        store.discard()?;
    }

    let report = ClosureBuilder::new(problem.shape(), &catalog)
        .with_options(options)
        .build(&mut store)?;
    Ok(CoverTable {
        problem: problem.clone(),
        store,
        origin: TableOrigin::Built,
        report: Some(report),
    })
}

fn describes(store: &TableStore, shape: &Shape, catalog: &Catalog) -> Result<bool> {
    Ok(store.shape()? == shape && store.catalog()? == catalog)
}

impl CoverTable {
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    pub fn origin(&self) -> TableOrigin {
        self.origin
    }

    /// Statistics of the build, when this table was built rather than loaded.
    pub fn report(&self) -> Option<&BuildReport> {
        self.report.as_ref()
    }

    /// The persisted record of a lattice point.
    ///
    /// Points are residuals: `entry(r).size` items cover `C - r`. The capacity point reads
    /// as [`TableEntry::SENTINEL`].
    pub fn entry(&self, point: &[u16]) -> Result<TableEntry> {
        Ok(self.store.get(point)?)
    }

    /// Minimum number of items whose contributions cover `outstanding`.
    ///
    /// Monotone: a componentwise smaller requirement never needs more items.
    pub fn min_items(&self, outstanding: &[u16]) -> Result<u32> {
        let shape = self.problem.shape();
        shape.check(outstanding)?;
        Ok(self.store.get(&shape.complement(outstanding))?.size)
    }

    /// A minimum set of item ids that, together with `satisfied`, meets every capacity.
    ///
    /// `satisfied` holds credits already earned by other means, `0 <= satisfied <= C`.
    /// Duplicate-content items are drawn at random, so repeated calls may return different
    /// sets of the same size.
    pub fn solve<R: RngCore>(&self, satisfied: &[u16], rng: &mut R) -> Result<BTreeSet<ItemId>> {
        let shape = self.problem.shape();
        if shape.check(satisfied).is_err() {
            return Err(InputError::SatisfiedOutOfRange {
                satisfied: satisfied.to_vec(),
                capacity: shape.capacity().to_vec(),
            }
            .into());
        }
        let expected = self.store.get(satisfied)?.size;
        let ids = Reconstructor::new(&self.store)?.witness(satisfied, rng)?;

        let mut witness = BTreeSet::new();
        let mut reached = satisfied.to_vec();
        for &id in &ids {
            if !witness.insert(id) {
                return Err(SearchError::DuplicateItem { item: id }.into());
            }
            let contribution = self
                .problem
                .item(id as usize)
                .ok_or(SearchError::UnknownItem { item: id })?;
            reached = add(&reached, contribution, shape.capacity());
        }
        if reached.as_slice() != shape.capacity() {
            return Err(SearchError::NotCovering {
                outstanding: shape.complement(&reached),
            }
            .into());
        }
        if witness.len() != expected as usize {
            return Err(SearchError::SizeMismatch {
                expected,
                found: witness.len(),
            }
            .into());
        }
        Ok(witness)
    }
}
