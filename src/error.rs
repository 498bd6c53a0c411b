// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Error taxonomy.
//!
//! - [`InputError`]: the problem instance is malformed. Rejected before any computation.
//! - [`LatticeError`]: a vector or address lies outside the lattice.
//! - [`StoreError`]: I/O failures and misuse of the table file lifecycle. Corruption found
//!   while opening is recovered inside [`crate::table::TableStore::open`] and never reaches
//!   the caller.
//! - [`SearchError`]: reconstruction contradicted the table. Indicates a bug, never retried.
//! - [`BuildError`]: a build was cancelled.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Lattice(#[from] LatticeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Malformed capacity vector, catalog, query, or problem file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("capacity vector is empty")]
    EmptyCapacity,

    #[error("{count} categories given, at most 256 are supported")]
    TooManyCategories { count: usize },

    #[error("capacity of category {category} is {value}, must be in 1..=256")]
    CapacityOutOfRange { category: usize, value: u32 },

    #[error("catalog is empty")]
    EmptyCatalog,

    #[error("{count} items given, at most 65536 are supported")]
    CatalogTooLarge { count: usize },

    #[error("item {item} has {found} categories, expected {expected}")]
    ArityMismatch {
        item: usize,
        expected: usize,
        found: usize,
    },

    #[error("item {item} contributes {value} to category {category}, must be 0 or 1")]
    NonBinaryContribution {
        item: usize,
        category: usize,
        value: u32,
    },

    #[error("category {category} requires {required} credits but the whole catalog offers {available}")]
    Infeasible {
        category: usize,
        required: u16,
        available: usize,
    },

    #[error("lattice of capacity {capacity:?} is too large to address")]
    LatticeTooLarge { capacity: Vec<u16> },

    #[error("satisfied credits {satisfied:?} do not fit capacity {capacity:?}")]
    SatisfiedOutOfRange {
        satisfied: Vec<u16>,
        capacity: Vec<u16>,
    },

    #[error("a pruned table answers only the full requirement and cannot back a CoverTable")]
    PrunedTable,

    #[error("problem file line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// A vector or address outside the bounded lattice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LatticeError {
    #[error("vector has {found} components, lattice has {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("component {category} is {value}, exceeds capacity {capacity}")]
    OutOfRange {
        category: usize,
        value: u16,
        capacity: u16,
    },

    #[error("address {address} outside lattice of {points} points")]
    AddressOutOfRange { address: u64, points: u64 },
}

/// Table file failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Only produced while validating an existing file; `open` recovers from it.
    #[error("table file is unusable: {reason}")]
    Corrupt { reason: String },

    #[error("table has not been initialized")]
    Uninitialized,

    #[error("table is already initialized")]
    AlreadyInitialized,

    #[error("table is finalized and read-only")]
    Finalized,

    #[error("no entry has been written for lattice point {point:?}")]
    MissingEntry { point: Vec<u16> },

    #[error("cannot finalize: {missing} lattice points have no entry")]
    Incomplete { missing: u64 },

    #[error("{points} lattice records do not fit in a table file")]
    TooLarge { points: u64 },

    #[error(transparent)]
    Lattice(#[from] LatticeError),
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Reconstruction contradicted the table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("no candidate makes progress from satisfied credits {satisfied:?} (table claims {expected} items)")]
    Exhausted { satisfied: Vec<u16>, expected: u32 },

    #[error("witness has {found} items, table claims {expected}")]
    SizeMismatch { expected: u32, found: usize },

    #[error("witness leaves {outstanding:?} unsatisfied")]
    NotCovering { outstanding: Vec<u16> },

    #[error("witness repeats item {item}")]
    DuplicateItem { item: u16 },

    #[error("witness names item {item}, which is not in the catalog")]
    UnknownItem { item: u16 },
}

/// Build interrupted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("table build cancelled; the table file is left unfinished")]
    Cancelled,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
