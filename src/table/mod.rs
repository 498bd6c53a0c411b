// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Persistent random-access table: one [`TableEntry`] per lattice point.
//!
//! # Lifecycle
//!
//! ```text
//! open ──valid & finalized──▶ Finalized (read-only)
//!   │
//!   └─missing/corrupt/unfinished──▶ Uninitialized ──initialize──▶ Building ──finalize──▶ Finalized
//! ```
//!
//! A file that fails validation for any reason is truncated and construction restarts from
//! scratch; there is no resumption of a half-built table. The finalize flag at offset 0 is
//! written last, after every record has been flushed, so a crash at any earlier point leaves
//! a file that the next `open` discards. A table built with pruning gets its own flag value
//! and is discarded the same way.
//!
//! While building, which points have been written is tracked in memory ([`Membership`]).
//! Once finalized every point is implicitly present and the capacity point reads as
//! [`TableEntry::SENTINEL`] without touching the disk.
//!
//! Reads go through positioned I/O on a shared `&File`, so a finalized store can serve any
//! number of concurrent readers.

pub mod entry;
pub mod format;
pub mod membership;
mod positioned;

pub use entry::TableEntry;
pub use format::TableLayout;
pub use membership::Membership;

use crate::catalog::Catalog;
use crate::error::StoreError;
use crate::lattice::Shape;
use positioned::{read_exact_at, write_all_at};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Bytes written per call while filling a fresh table.
const FILL_CHUNK: usize = 1 << 16;

/// Problem description shared by the building and finalized states.
#[derive(Debug)]
struct Contents {
    shape: Shape,
    catalog: Catalog,
    layout: TableLayout,
}

#[derive(Debug)]
enum StoreState {
    Uninitialized,
    Building {
        contents: Contents,
        membership: Membership,
    },
    Finalized {
        contents: Contents,
    },
}

/// Lifecycle state of a [`TableStore`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Uninitialized,
    Building,
    Finalized,
}

/// A table file and its lifecycle state.
#[derive(Debug)]
pub struct TableStore {
    path: PathBuf,
    file: File,
    state: StoreState,
}

impl TableStore {
    /// Open or create the table file at `path`.
    ///
    /// A complete, valid file opens [`StoreStatus::Finalized`]. Anything else (missing,
    /// empty, truncated, unfinished, malformed) is truncated and opens
    /// [`StoreStatus::Uninitialized`]. Only genuine I/O failures are returned as errors.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|err| StoreError::io(&path, err))?;

        let len = file
            .metadata()
            .map_err(|err| StoreError::io(&path, err))?
            .len();

        let mut store = Self {
            path,
            file,
            state: StoreState::Uninitialized,
        };
        if len == 0 {
            debug!("No table at {}", store.path.display());
            return Ok(store);
        }

        match format::decode_header(&store.file, &store.path) {
            Ok((shape, catalog)) => {
                info!(
                    "Loaded finalized table {} ({} categories, {} items, {} points)",
                    store.path.display(),
                    shape.dimensions(),
                    catalog.len(),
                    shape.point_count()
                );
                let layout = TableLayout::new(&shape, &catalog);
                store.state = StoreState::Finalized {
                    contents: Contents {
                        shape,
                        catalog,
                        layout,
                    },
                };
            }
            Err(StoreError::Corrupt { reason }) => {
                warn!(
                    "Discarding table {}: {}; it will be rebuilt",
                    store.path.display(),
                    reason
                );
                store.truncate()?;
            }
            Err(err) => return Err(err),
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> StoreStatus {
        match self.state {
            StoreState::Uninitialized => StoreStatus::Uninitialized,
            StoreState::Building { .. } => StoreStatus::Building,
            StoreState::Finalized { .. } => StoreStatus::Finalized,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.status() == StoreStatus::Finalized
    }

    pub fn is_initialized(&self) -> bool {
        self.status() != StoreStatus::Uninitialized
    }

    fn contents(&self) -> Result<&Contents, StoreError> {
        match &self.state {
            StoreState::Uninitialized => Err(StoreError::Uninitialized),
            StoreState::Building { contents, .. } | StoreState::Finalized { contents } => {
                Ok(contents)
            }
        }
    }

    /// Lattice shape described by the table.
    pub fn shape(&self) -> Result<&Shape, StoreError> {
        Ok(&self.contents()?.shape)
    }

    /// Canonical catalog stored in the table.
    pub fn catalog(&self) -> Result<&Catalog, StoreError> {
        Ok(&self.contents()?.catalog)
    }

    /// Throw away whatever the file holds and return to [`StoreStatus::Uninitialized`].
    pub fn discard(&mut self) -> Result<(), StoreError> {
        self.truncate()
    }

    fn truncate(&mut self) -> Result<(), StoreError> {
        self.file
            .set_len(0)
            .map_err(|err| StoreError::io(&self.path, err))?;
        self.state = StoreState::Uninitialized;
        Ok(())
    }

    /// Write the header and an all-`0xFF` record section, and enter the building state.
    ///
    /// The capacity point is recorded as the sentinel immediately.
    pub fn initialize(&mut self, shape: &Shape, catalog: &Catalog) -> Result<(), StoreError> {
        match self.state {
            StoreState::Uninitialized => {}
            StoreState::Building { .. } => return Err(StoreError::AlreadyInitialized),
            StoreState::Finalized { .. } => return Err(StoreError::Finalized),
        }

        let layout = TableLayout::new(shape, catalog);
        let end = layout.file_len().ok_or(StoreError::TooLarge {
            points: layout.points,
        })?;
        let header = format::encode_header(format::UNFINISHED, shape, catalog);
        let io = |err| StoreError::io(&self.path, err);

        self.file.set_len(0).map_err(io)?;
        write_all_at(&self.file, &header, 0).map_err(io)?;

        let fill = vec![0xFFu8; FILL_CHUNK];
        let mut offset = layout.table_offset();
        while offset < end {
            let n = (end - offset).min(FILL_CHUNK as u64) as usize;
            write_all_at(&self.file, &fill[..n], offset).map_err(io)?;
            offset += n as u64;
        }

        self.state = StoreState::Building {
            contents: Contents {
                shape: shape.clone(),
                catalog: catalog.clone(),
                layout,
            },
            membership: Membership::new(layout.points),
        };
        self.set(shape.capacity(), TableEntry::SENTINEL)
    }

    /// Record the entry of lattice point `point`.
    pub fn set(&mut self, point: &[u16], entry: TableEntry) -> Result<(), StoreError> {
        let address = self.shape()?.encode(point)?;
        self.set_at(address, entry)
    }

    /// Record the entry at a lattice address.
    pub fn set_at(&mut self, address: u64, entry: TableEntry) -> Result<(), StoreError> {
        let (contents, membership) = match &mut self.state {
            StoreState::Uninitialized => return Err(StoreError::Uninitialized),
            StoreState::Finalized { .. } => return Err(StoreError::Finalized),
            StoreState::Building {
                contents,
                membership,
            } => (contents, membership),
        };
        check_address(&contents.shape, address)?;

        write_all_at(
            &self.file,
            &entry.to_record(),
            contents.layout.record_offset(address),
        )
        .map_err(|err| StoreError::io(&self.path, err))?;
        membership.insert(address);
        Ok(())
    }

    /// True if `point` has an entry.
    pub fn contains(&self, point: &[u16]) -> Result<bool, StoreError> {
        let address = self.shape()?.encode(point)?;
        self.contains_at(address)
    }

    pub fn contains_at(&self, address: u64) -> Result<bool, StoreError> {
        match &self.state {
            StoreState::Uninitialized => Err(StoreError::Uninitialized),
            StoreState::Building {
                contents,
                membership,
            } => {
                check_address(&contents.shape, address)?;
                Ok(membership.contains(address))
            }
            StoreState::Finalized { contents } => {
                check_address(&contents.shape, address)?;
                Ok(true)
            }
        }
    }

    /// Entry of lattice point `point`.
    pub fn get(&self, point: &[u16]) -> Result<TableEntry, StoreError> {
        let address = self.shape()?.encode(point)?;
        self.get_at(address)
    }

    /// Entry at a lattice address.
    ///
    /// Fails with [`StoreError::MissingEntry`] on a building store if the address has not
    /// been written.
    pub fn get_at(&self, address: u64) -> Result<TableEntry, StoreError> {
        let contents = self.contents()?;
        if !self.contains_at(address)? {
            return Err(StoreError::MissingEntry {
                point: contents.shape.decode(address)?,
            });
        }
        if address == contents.shape.point_count() - 1 {
            return Ok(TableEntry::SENTINEL);
        }

        let mut record = [0u8; 4];
        read_exact_at(&self.file, &mut record, contents.layout.record_offset(address))
            .map_err(|err| StoreError::io(&self.path, err))?;
        Ok(TableEntry::from_record(record))
    }

    /// Mark the table complete.
    ///
    /// Every lattice point must have been written. Records are flushed before the finalize
    /// flag is written, and the flag is flushed before returning.
    pub fn finalize(&mut self) -> Result<(), StoreError> {
        self.finish(format::FINALIZED)
    }

    /// Like [`TableStore::finalize`], for a table exact only at the full requirement.
    ///
    /// The store is readable for the rest of this session, but the file is flagged
    /// [`format::PRUNED`] and the next `open` discards it.
    pub fn finalize_pruned(&mut self) -> Result<(), StoreError> {
        self.finish(format::PRUNED)
    }

    fn finish(&mut self, flag: u8) -> Result<(), StoreError> {
        let state = std::mem::replace(&mut self.state, StoreState::Uninitialized);
        let contents = match state {
            StoreState::Building {
                contents,
                membership,
            } => {
                if !membership.is_full() {
                    let missing = membership.missing();
                    self.state = StoreState::Building {
                        contents,
                        membership,
                    };
                    return Err(StoreError::Incomplete { missing });
                }
                contents
            }
            other => {
                let err = match other {
                    StoreState::Finalized { .. } => StoreError::Finalized,
                    _ => StoreError::Uninitialized,
                };
                self.state = other;
                return Err(err);
            }
        };

        let io = |err| StoreError::io(&self.path, err);
        self.file.sync_data().map_err(io)?;
        write_all_at(&self.file, &[flag], 0).map_err(io)?;
        self.file.sync_data().map_err(io)?;

        info!(
            "Finalized table {} ({} points)",
            self.path.display(),
            contents.shape.point_count()
        );
        self.state = StoreState::Finalized { contents };
        Ok(())
    }
}

fn check_address(shape: &Shape, address: u64) -> Result<(), StoreError> {
    if address >= shape.point_count() {
        return Err(crate::error::LatticeError::AddressOutOfRange {
            address,
            points: shape.point_count(),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Problem;
    use crate::lattice::enumerate_between;
    use tempfile::TempDir;

    fn sample() -> (Shape, Catalog) {
        let problem = Problem::new(vec![1, 1], vec![vec![1, 0], vec![0, 1], vec![1, 1]]).unwrap();
        (problem.shape().clone(), Catalog::canonicalize(&problem))
    }

    fn fill(store: &mut TableStore, shape: &Shape) {
        for point in enumerate_between(&shape.zero(), shape.capacity()).unwrap() {
            if point.as_slice() != shape.capacity() {
                let size = point.iter().filter(|&&v| v == 0).count() as u32;
                store.set(&point, TableEntry::new(size, 2)).unwrap();
            }
        }
    }

    #[test]
    fn test_fresh_store_is_uninitialized() {
        let dir = TempDir::new().unwrap();
        let store = TableStore::open(dir.path().join("nested/table.bin")).unwrap();
        assert_eq!(store.status(), StoreStatus::Uninitialized);
        assert!(matches!(store.get(&[0, 0]), Err(StoreError::Uninitialized)));
    }

    #[test]
    fn test_lifecycle() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.bin");
        let (shape, catalog) = sample();

        let mut store = TableStore::open(&path).unwrap();
        store.initialize(&shape, &catalog).unwrap();
        assert_eq!(store.status(), StoreStatus::Building);
        assert!(matches!(
            store.initialize(&shape, &catalog),
            Err(StoreError::AlreadyInitialized)
        ));

        assert_eq!(store.get(&[1, 1]).unwrap(), TableEntry::SENTINEL);
        assert!(!store.contains(&[0, 1]).unwrap());
        assert!(matches!(
            store.get(&[0, 1]),
            Err(StoreError::MissingEntry { .. })
        ));
        assert!(matches!(
            store.finalize(),
            Err(StoreError::Incomplete { missing: 3 })
        ));

        fill(&mut store, &shape);
        assert_eq!(store.get(&[0, 1]).unwrap(), TableEntry::new(1, 2));
        store.finalize().unwrap();

        assert!(store.is_finalized());
        assert!(matches!(
            store.set(&[0, 0], TableEntry::new(1, 0)),
            Err(StoreError::Finalized)
        ));
        assert!(matches!(store.finalize(), Err(StoreError::Finalized)));
        assert!(matches!(
            store.initialize(&shape, &catalog),
            Err(StoreError::Finalized)
        ));
        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            TableLayout::new(&shape, &catalog).file_len().unwrap()
        );
    }

    #[test]
    fn test_reopen_finalized() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.bin");
        let (shape, catalog) = sample();
        {
            let mut store = TableStore::open(&path).unwrap();
            store.initialize(&shape, &catalog).unwrap();
            fill(&mut store, &shape);
            store.finalize().unwrap();
        }

        let store = TableStore::open(&path).unwrap();
        assert!(store.is_finalized());
        assert_eq!(store.shape().unwrap(), &shape);
        assert_eq!(store.catalog().unwrap(), &catalog);
        assert_eq!(store.get(&[0, 0]).unwrap(), TableEntry::new(2, 2));
        assert_eq!(store.get(&[1, 1]).unwrap(), TableEntry::SENTINEL);
        assert!(store.contains(&[1, 0]).unwrap());
    }

    #[test]
    fn test_unfinished_file_is_discarded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.bin");
        let (shape, catalog) = sample();
        {
            let mut store = TableStore::open(&path).unwrap();
            store.initialize(&shape, &catalog).unwrap();
            fill(&mut store, &shape);
        }

        let store = TableStore::open(&path).unwrap();
        assert_eq!(store.status(), StoreStatus::Uninitialized);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_out_of_range_point() {
        let dir = TempDir::new().unwrap();
        let (shape, catalog) = sample();
        let mut store = TableStore::open(dir.path().join("t")).unwrap();
        store.initialize(&shape, &catalog).unwrap();
        assert!(matches!(
            store.set(&[2, 0], TableEntry::new(1, 0)),
            Err(StoreError::Lattice(_))
        ));
        assert!(matches!(store.get_at(4), Err(StoreError::Lattice(_))));
    }
}
