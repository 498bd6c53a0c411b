// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Dynamic-programming closure over the whole lattice.
//!
//! The table is keyed by *residual*: the part of the capacity vector still left after
//! subtracting a selection of catalog vectors. For every lattice point `r` the closure
//! records the lexicographically smallest `(size, last)` over all selections, in strictly
//! increasing vector index, whose residual is at or below `r`. Read the other way round,
//! `size(r)` is the minimum number of items that cover `C - r`.
//!
//! # Phases
//!
//! 1. **Frontier expansion** ([`frontier`]): one wave per catalog vector, starting from `C`
//!    alone. Each wave offers its vector to every residual reached so far, so after the last
//!    wave every reachable residual holds its exact best entry.
//! 2. **Dominance sweep** ([`sweep`]): one pass in ascending address order taking the
//!    minimum over each point and its lower neighbours, so every point inherits the best
//!    entry of everything it dominates.
//!
//! Both phases read and write through the [`TableStore`] under construction; the store is
//! finalized only after the sweep completes.

pub mod frontier;
pub mod statistics;
pub mod sweep;

pub use statistics::{Counters, Statistics};

use crate::catalog::Catalog;
use crate::error::{BuildError, Result};
use crate::lattice::Shape;
use crate::table::{TableLayout, TableStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Tuning knobs for a table build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Report progress every this many expanded residuals. Zero disables reporting.
    pub progress_interval: u64,
    /// Skip, for each residual, vectors that cannot help its lowest unsatisfied category.
    ///
    /// The resulting table is exact only for the full requirement (nothing yet satisfied).
    /// Partial queries may see sizes that are too large, so reconstruction from a partially
    /// satisfied state needs an unpruned table. A pruned table is finalized with
    /// [`TableStore::finalize_pruned`] and is not reloaded from disk.
    pub prune_to_full_cover: bool,
    /// Set to request cancellation. Checked periodically during both phases.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            progress_interval: 1000,
            prune_to_full_cover: false,
            cancel: None,
        }
    }
}

impl BuildOptions {
    pub(crate) fn check_cancelled(&self) -> Result<(), BuildError> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(BuildError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// What a completed build did.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub statistics: Statistics,
    pub expansion_time: Duration,
    pub sweep_time: Duration,
    /// Lattice points in the table.
    pub points: u64,
    /// Size of the finalized table file in bytes.
    pub file_len: u64,
}

/// Computes the complete table for one problem into a [`TableStore`].
#[derive(Debug)]
pub struct ClosureBuilder<'a> {
    shape: &'a Shape,
    catalog: &'a Catalog,
    options: BuildOptions,
}

impl<'a> ClosureBuilder<'a> {
    /// The shape and catalog must come from a validated, feasible problem.
    pub fn new(shape: &'a Shape, catalog: &'a Catalog) -> Self {
        Self {
            shape,
            catalog,
            options: BuildOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Initialize `store`, run both phases, and finalize.
    ///
    /// On error or cancellation the store is left unfinalized, and will be discarded the next
    /// time the file is opened.
    pub fn build(&self, store: &mut TableStore) -> Result<BuildReport> {
        let layout = TableLayout::new(self.shape, self.catalog);
        let file_len = layout.file_len().unwrap_or(u64::MAX);
        info!(
            "Building table for capacity {:?} with {} items: {} points, {} bytes on disk",
            self.shape.capacity(),
            self.catalog.len(),
            layout.points,
            file_len
        );

        let mut statistics = Statistics::new();
        store.initialize(self.shape, self.catalog)?;

        let start = Instant::now();
        frontier::expand(store, self.shape, self.catalog, &self.options, &mut statistics)?;
        let expansion_time = start.elapsed();
        info!(
            "Frontier expansion done in {:.2?}: {} of {} points reached",
            expansion_time,
            statistics.get(Counters::PointsReached),
            layout.points
        );

        let start = Instant::now();
        sweep::complete(store, self.shape, &self.options, &mut statistics)?;
        let sweep_time = start.elapsed();
        info!(
            "Dominance sweep done in {:.2?}: {} entries improved",
            sweep_time,
            statistics.get(Counters::SweepImprovements)
        );

        if self.options.prune_to_full_cover {
            store.finalize_pruned()?;
        } else {
            store.finalize()?;
        }
        Ok(BuildReport {
            statistics,
            expansion_time,
            sweep_time,
            points: layout.points,
            file_len,
        })
    }
}
