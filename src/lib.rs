// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Minimum-cardinality covering of bounded credit requirements.
//!
//! A problem is a capacity vector `C` (credits required per category, each 1..=256) and a
//! catalog of items, each contributing 0 or 1 credit to every category. The crate finds a
//! smallest set of items whose combined, per-category-capped contribution meets `C`, also
//! when some credits have already been earned by other means.
//!
//! # Architecture
//!
//! The work is split into an expensive build done once per problem and cheap queries.
//!
//! ## Build (once, persisted)
//!
//! - [`lattice`]: vector algebra over the points `0 <= v <= C` and their mixed-radix
//!   addresses.
//! - [`catalog`]: problem validation, the text interchange format, and the canonical
//!   (descending) vector order with its content-to-id groups.
//! - [`closure`]: dynamic programming over every lattice point, in two phases (frontier
//!   expansion, then a dominance sweep).
//! - [`table`]: the byte-exact table file. A file is usable only once its finalize flag is
//!   written; anything else found on open is discarded and rebuilt.
//!
//! ## Query (many, concurrent)
//!
//! - [`engine`] and [`trail`]: an iterative backtracking engine whose state is restored from
//!   a trail of cell changes.
//! - [`reconstruct`]: predicates that walk the finalized table to one concrete witness,
//!   choosing randomly among equally good vectors and among duplicate-content items.
//! - [`solver`]: [`build_or_load`] and [`CoverTable::solve`], which re-checks every witness
//!   against the original catalog.
//!
//! # Example
//!
//! ```
//! use credit_cover::{build_or_load, BuildOptions, Problem};
//! use rand::thread_rng;
//!
//! let dir = tempfile::tempdir().unwrap();
//! // Two categories needing one credit each; item 2 covers both.
//! let problem = Problem::new(vec![1, 1], vec![vec![1, 0], vec![0, 1], vec![1, 1]]).unwrap();
//! let table = build_or_load(&problem, dir.path().join("table.bin"), BuildOptions::default())
//!     .unwrap();
//!
//! // Nothing earned yet: one item suffices.
//! assert_eq!(table.solve(&[0, 0], &mut thread_rng()).unwrap().len(), 1);
//! // Category 1 already satisfied: item 0 or item 2.
//! let witness = table.solve(&[0, 1], &mut thread_rng()).unwrap();
//! assert!(witness.contains(&0) || witness.contains(&2));
//! ```
//!
//! # Logging
//!
//! The crate logs through [`tracing`] and installs no subscriber.

pub mod catalog;
pub mod closure;
pub mod engine;
pub mod error;
pub mod lattice;
pub mod reconstruct;
pub mod solver;
pub mod table;
pub mod trail;

// Re-export commonly used types
pub use catalog::{Catalog, ItemId, Problem};
pub use closure::{BuildOptions, BuildReport, ClosureBuilder};
pub use error::{Error, Result};
pub use lattice::Shape;
pub use solver::{build_or_load, CoverTable, TableOrigin};
pub use table::{TableEntry, TableStore};
