// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use credit_cover::lattice::enumerate_between;
use credit_cover::{build_or_load, BuildOptions, CoverTable, ItemId, Problem};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tempfile::TempDir;

/// `C = (1,1)`, items `(1,0)`, `(0,1)`, `(1,1)`.
pub fn scenario() -> Problem {
    Problem::new(vec![1, 1], vec![vec![1, 0], vec![0, 1], vec![1, 1]]).unwrap()
}

pub fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Build a table for `problem` in a fresh temporary directory.
pub fn build(problem: &Problem) -> (TempDir, CoverTable) {
    let dir = TempDir::new().unwrap();
    let table = build_or_load(problem, dir.path().join("table.bin"), BuildOptions::default())
        .unwrap();
    (dir, table)
}

/// A random feasible problem with at most 3 categories of capacity at most 3.
pub fn random_problem(rng: &mut ChaCha8Rng) -> Problem {
    loop {
        let dimensions = rng.gen_range(1..=3);
        let capacity: Vec<u16> = (0..dimensions).map(|_| rng.gen_range(1..=3)).collect();
        let count = rng.gen_range(1..=7);
        let items: Vec<Vec<u8>> = (0..count)
            .map(|_| (0..dimensions).map(|_| rng.gen_range(0..=1)).collect())
            .collect();
        if let Ok(problem) = Problem::new(capacity, items) {
            return problem;
        }
    }
}

/// Every lattice point of `problem`, in ascending address order.
pub fn all_points(problem: &Problem) -> Vec<Vec<u16>> {
    let capacity = problem.capacity();
    enumerate_between(&vec![0; capacity.len()], capacity)
        .unwrap()
        .collect()
}

/// Smallest number of items covering `outstanding`, by trying every subset.
pub fn brute_force_min(problem: &Problem, outstanding: &[u16]) -> u32 {
    let items = problem.items();
    assert!(items.len() < 16, "brute force is exponential");
    (0u32..1 << items.len())
        .filter(|mask| {
            let mut totals = vec![0u16; outstanding.len()];
            for (id, item) in items.iter().enumerate() {
                if mask & (1 << id) != 0 {
                    for (total, &v) in totals.iter_mut().zip(item) {
                        *total += v as u16;
                    }
                }
            }
            totals.iter().zip(outstanding).all(|(t, o)| t >= o)
        })
        .map(u32::count_ones)
        .min()
        .unwrap()
}

/// Credits reached from `satisfied` by adding the original contributions of `ids`.
pub fn apply(problem: &Problem, satisfied: &[u16], ids: impl IntoIterator<Item = ItemId>) -> Vec<u16> {
    let mut reached = satisfied.to_vec();
    for id in ids {
        let item = problem.item(id as usize).unwrap();
        for ((r, &v), &c) in reached.iter_mut().zip(item).zip(problem.capacity()) {
            *r = (*r + v as u16).min(c);
        }
    }
    reached
}
