// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Phase A: frontier expansion.
//!
//! One wave per catalog vector, in canonical order. Wave `i` applies vector `i` to every
//! residual reached by the earlier waves: the reduced residual is recorded as
//! `(size + 1, i)` when it is new or the size improves. After the last wave each reached
//! residual holds the smallest selection leaving exactly that residual, and among those the
//! smallest possible last index.
//!
//! Residuals are visited in ascending address order. A reduced residual is never above the
//! one it came from, so every read in a wave sees the entry from before the wave and a
//! vector is used at most once per selection.

use super::statistics::{Counters, Statistics};
use super::BuildOptions;
use crate::catalog::Catalog;
use crate::error::Result;
use crate::lattice::Shape;
use crate::table::TableStore;
use std::collections::BTreeSet;
use tracing::debug;

/// Residuals between cancellation checks within a wave.
const CANCEL_CHECK_INTERVAL: u64 = 4096;

pub(crate) fn expand(
    store: &mut TableStore,
    shape: &Shape,
    catalog: &Catalog,
    options: &BuildOptions,
    statistics: &mut Statistics,
) -> Result<()> {
    let points = shape.point_count();
    let right_bounds = options
        .prune_to_full_cover
        .then(|| catalog.right_bounds(shape.dimensions()));

    let mut reached = BTreeSet::from([points - 1]);
    for index in 0..catalog.len() {
        statistics.increment_counter(Counters::Waves);
        let contribution = catalog.contribution(index);
        let mut discovered = Vec::new();

        for (visited, &address) in (0u64..).zip(reached.iter()) {
            if visited % CANCEL_CHECK_INTERVAL == 0 {
                options.check_cancelled()?;
            }
            statistics.increment_counter(Counters::NodesExpanded);
            let expanded = statistics.get(Counters::NodesExpanded);
            if options.progress_interval > 0 && expanded % options.progress_interval == 0 {
                debug!(
                    "Closure at least {:.1}% complete (wave {} of {}, {} residuals reached)",
                    index as f64 * 100.0 / catalog.len() as f64,
                    index + 1,
                    catalog.len(),
                    reached.len() + discovered.len()
                );
            }

            // The zero residual is address 0.
            if address == 0 {
                continue;
            }
            if let Some(bounds) = &right_bounds {
                // Later vectors are all zero on this category, so it can never be covered.
                let lowest = (0..shape.dimensions()).find(|&j| shape.digit(address, j) > 0);
                if lowest.map_or(true, |j| index >= bounds[j]) {
                    continue;
                }
            }

            let target = reduced(shape, address, contribution);
            if target == address {
                continue;
            }
            let candidate = store.get_at(address)?.extended(index as u16);
            if store.contains_at(target)? {
                if store.get_at(target)? <= candidate {
                    continue;
                }
            } else {
                statistics.increment_counter(Counters::PointsReached);
                discovered.push(target);
            }
            store.set_at(target, candidate)?;
            statistics.increment_counter(Counters::EntriesRecorded);
        }
        reached.extend(discovered);
    }
    Ok(())
}

/// Address of `sub(residual, contribution)` for the residual at `address`.
///
/// Only categories the vector contributes to are read, one stride subtracted for each that is
/// still positive.
fn reduced(shape: &Shape, address: u64, contribution: &[u8]) -> u64 {
    contribution
        .iter()
        .enumerate()
        .filter(|&(category, &value)| value > 0 && shape.digit(address, category) > 0)
        .fold(address, |target, (category, _)| target - shape.stride(category))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Problem;
    use crate::table::TableEntry;
    use tempfile::TempDir;

    #[test]
    fn test_expansion_reaches_exact_residuals() {
        // Canonical order: (1,1) #0, (1,0) #1, (0,1) #2.
        let problem = Problem::new(vec![2, 1], vec![vec![1, 0], vec![0, 1], vec![1, 1]]).unwrap();
        let catalog = Catalog::canonicalize(&problem);
        let shape = problem.shape();
        let dir = TempDir::new().unwrap();
        let mut store = TableStore::open(dir.path().join("t")).unwrap();
        store.initialize(shape, &catalog).unwrap();

        let mut statistics = Statistics::new();
        expand(
            &mut store,
            shape,
            &catalog,
            &BuildOptions::default(),
            &mut statistics,
        )
        .unwrap();

        assert_eq!(store.get(&[1, 0]).unwrap(), TableEntry::new(1, 0));
        assert_eq!(store.get(&[1, 1]).unwrap(), TableEntry::new(1, 1));
        assert_eq!(store.get(&[2, 0]).unwrap(), TableEntry::new(1, 2));
        assert_eq!(store.get(&[0, 0]).unwrap(), TableEntry::new(2, 1));
        // Reaching (0,1) would need two vectors that are (1,0) exactly; the sweep fills it.
        assert!(!store.contains(&[0, 1]).unwrap());
        assert_eq!(statistics.get(Counters::PointsReached), 4);
        assert_eq!(statistics.get(Counters::Waves), 3);
    }

    #[test]
    fn test_reduced_matches_subtraction() {
        use crate::lattice::{enumerate_between, sub};

        let shape = Shape::new(vec![2, 1, 3]).unwrap();
        let contributions = [[1u8, 1, 1], [0, 1, 0], [1, 0, 1], [0, 0, 0]];
        for residual in enumerate_between(&shape.zero(), shape.capacity()).unwrap() {
            let address = shape.encode(&residual).unwrap();
            for contribution in &contributions {
                assert_eq!(
                    reduced(&shape, address, contribution),
                    shape.encode(&sub(&residual, &contribution[..])).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_pruning_skips_useless_vectors() {
        // Canonical order: (1,0) #0, (0,1) #1.
        let problem = Problem::new(vec![1, 1], vec![vec![1, 0], vec![0, 1]]).unwrap();
        let catalog = Catalog::canonicalize(&problem);
        let shape = problem.shape();
        let dir = TempDir::new().unwrap();
        let mut store = TableStore::open(dir.path().join("t")).unwrap();
        store.initialize(shape, &catalog).unwrap();

        let options = BuildOptions {
            prune_to_full_cover: true,
            ..BuildOptions::default()
        };
        expand(&mut store, shape, &catalog, &options, &mut Statistics::new()).unwrap();

        // From (1,1) only #0 can serve category 0, so (1,0) is never a residual.
        assert!(!store.contains(&[1, 0]).unwrap());
        assert_eq!(store.get(&[0, 1]).unwrap(), TableEntry::new(1, 0));
        assert_eq!(store.get(&[0, 0]).unwrap(), TableEntry::new(2, 1));
    }
}
