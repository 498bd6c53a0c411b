// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Phase B: dominance sweep.
//!
//! Visits every lattice point in ascending address order. Each lower neighbour (one category
//! decremented) has a smaller address, so it is already final when the point is visited, and
//! the point keeps the minimum of its own entry and its neighbours' entries. After the pass
//! each point holds the best entry of every point it dominates.

use super::statistics::{Counters, Statistics};
use super::BuildOptions;
use crate::error::{Result, StoreError};
use crate::lattice::{enumerate_between, Shape};
use crate::table::TableStore;

/// Points between cancellation checks.
const CANCEL_CHECK_INTERVAL: u64 = 4096;

pub(crate) fn complete(
    store: &mut TableStore,
    shape: &Shape,
    options: &BuildOptions,
    statistics: &mut Statistics,
) -> Result<()> {
    for (address, point) in (0u64..).zip(enumerate_between(&shape.zero(), shape.capacity())?) {
        if address % CANCEL_CHECK_INTERVAL == 0 {
            options.check_cancelled()?;
        }

        let mut best = if store.contains_at(address)? {
            Some(store.get_at(address)?)
        } else {
            None
        };
        let mut improved = false;
        for (category, &value) in point.iter().enumerate() {
            if value == 0 {
                continue;
            }
            let neighbour = store.get_at(address - shape.stride(category))?;
            if best.map_or(true, |entry| neighbour < entry) {
                best = Some(neighbour);
                improved = true;
            }
        }

        match best {
            Some(entry) if improved => {
                store.set_at(address, entry)?;
                statistics.increment_counter(Counters::SweepImprovements);
            }
            Some(_) => {}
            // Only the zero point lacks neighbours, and a feasible problem always reaches it.
            None => return Err(StoreError::MissingEntry { point }.into()),
        }
    }
    Ok(())
}
