// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Binary layout of a table file.
//!
//! All integers are big-endian and unsigned. A field that can never be zero stores its
//! value minus one.
//!
//! ```text
//! offset 0      1 byte    finalize flag: 0x00 = fully computed, anything else = unusable
//! offset 1      1 byte    M - 1
//! offset 2      2 bytes   N - 1
//! offset 4      M bytes   C_i - 1
//! offset 4+M    N times   [2 bytes item id][M bytes contribution], canonical order
//! offset T0     prod(C_i + 1) times   [2 bytes size - 1][2 bytes lastIndex]
//! ```
//!
//! `T0 = 4 + M + N * (2 + M)`. Records are in ascending lattice address order; the record of
//! the capacity point itself is unconstrained.

use super::positioned::read_exact_at;
use crate::catalog::{Catalog, CatalogEntry, ItemId};
use crate::error::StoreError;
use crate::lattice::Shape;
use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::Path;

/// Flag byte of a completely computed table.
pub const FINALIZED: u8 = 0x00;

/// Flag byte written while a table is under construction.
pub const UNFINISHED: u8 = 0xFF;

/// Flag byte of a table built with right-bound pruning. Only the full requirement is exact,
/// so such a file is never loaded as a complete table.
pub const PRUNED: u8 = 0x01;

/// Bytes per lattice record.
pub const RECORD_LEN: u64 = 4;

/// Byte size of the fixed prefix before the capacity vector.
const PREFIX_LEN: u64 = 4;

/// Sizes and offsets of one table file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    pub dimensions: usize,
    pub items: usize,
    pub points: u64,
}

impl TableLayout {
    pub fn new(shape: &Shape, catalog: &Catalog) -> Self {
        Self {
            dimensions: shape.dimensions(),
            items: catalog.len(),
            points: shape.point_count(),
        }
    }

    /// Offset of the first lattice record, `T0`.
    pub fn table_offset(&self) -> u64 {
        PREFIX_LEN + self.dimensions as u64 + self.items as u64 * (2 + self.dimensions as u64)
    }

    /// Offset of the record for lattice address `address`.
    ///
    /// Only meaningful when [`TableLayout::file_len`] is `Some`.
    pub fn record_offset(&self, address: u64) -> u64 {
        self.table_offset() + address * RECORD_LEN
    }

    /// Exact length of a complete file, or `None` if it overflows `u64`.
    pub fn file_len(&self) -> Option<u64> {
        self.points
            .checked_mul(RECORD_LEN)?
            .checked_add(self.table_offset())
    }
}

/// Serialize everything before the lattice records.
pub fn encode_header(flag: u8, shape: &Shape, catalog: &Catalog) -> Vec<u8> {
    let layout = TableLayout::new(shape, catalog);
    let mut out = Vec::with_capacity(layout.table_offset() as usize);

    out.push(flag);
    out.push((shape.dimensions() - 1) as u8);
    out.extend_from_slice(&((catalog.len() - 1) as u16).to_be_bytes());
    out.extend(shape.capacity().iter().map(|&c| (c - 1) as u8));
    for entry in catalog.entries() {
        out.extend_from_slice(&entry.id.to_be_bytes());
        out.extend_from_slice(&entry.contribution);
    }

    debug_assert_eq!(out.len() as u64, layout.table_offset());
    out
}

/// Read and validate the header of a finalized table file.
///
/// Short reads, an unfinished flag, malformed catalog entries, and a file length that does
/// not match the header all yield [`StoreError::Corrupt`].
pub fn decode_header(file: &File, path: &Path) -> Result<(Shape, Catalog), StoreError> {
    let mut prefix = [0u8; PREFIX_LEN as usize];
    read(file, path, &mut prefix, 0)?;

    let [flag, m, n_hi, n_lo] = prefix;
    match flag {
        FINALIZED => {}
        PRUNED => return Err(corrupt("table was built pruned".to_string())),
        _ => return Err(corrupt(format!("finalize flag is {:#04x}", flag))),
    }
    let dimensions = m as usize + 1;
    let items = u16::from_be_bytes([n_hi, n_lo]) as usize + 1;

    let mut capacity = vec![0u8; dimensions];
    read(file, path, &mut capacity, PREFIX_LEN)?;
    let shape = Shape::new(capacity.iter().map(|&c| c as u16 + 1).collect())
        .map_err(|err| corrupt(err.to_string()))?;

    let stride = 2 + dimensions;
    let mut raw = vec![0u8; items * stride];
    read(file, path, &mut raw, PREFIX_LEN + dimensions as u64)?;

    let mut seen = HashSet::with_capacity(items);
    let mut entries = Vec::with_capacity(items);
    for (index, chunk) in raw.chunks_exact(stride).enumerate() {
        let id: ItemId = u16::from_be_bytes([chunk[0], chunk[1]]);
        if id as usize >= items || !seen.insert(id) {
            return Err(corrupt(format!("catalog entry {} has bad id {}", index, id)));
        }
        let contribution = chunk[2..].to_vec();
        if contribution.iter().any(|&v| v > 1) {
            return Err(corrupt(format!(
                "catalog entry {} is not a 0/1 vector",
                index
            )));
        }
        entries.push(CatalogEntry { id, contribution });
    }
    let catalog = Catalog::from_canonical(entries);

    let expected = TableLayout::new(&shape, &catalog)
        .file_len()
        .ok_or_else(|| corrupt("header describes an unaddressable table".to_string()))?;
    let actual = file
        .metadata()
        .map_err(|err| StoreError::io(path, err))?
        .len();
    if actual != expected {
        return Err(corrupt(format!(
            "file is {} bytes, header implies {}",
            actual, expected
        )));
    }

    Ok((shape, catalog))
}

fn read(file: &File, path: &Path, buf: &mut [u8], offset: u64) -> Result<(), StoreError> {
    read_exact_at(file, buf, offset).map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => corrupt(format!("short read at offset {}", offset)),
        _ => StoreError::io(path, err),
    })
}

fn corrupt(reason: String) -> StoreError {
    StoreError::Corrupt { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Problem;

    fn sample() -> (Shape, Catalog) {
        let problem = Problem::new(vec![1, 2], vec![vec![0, 1], vec![1, 1], vec![0, 1]]).unwrap();
        (problem.shape().clone(), Catalog::canonicalize(&problem))
    }

    #[test]
    fn test_layout() {
        let (shape, catalog) = sample();
        let layout = TableLayout::new(&shape, &catalog);
        assert_eq!(layout.table_offset(), 4 + 2 + 3 * 4);
        assert_eq!(layout.record_offset(2), 18 + 8);
        assert_eq!(layout.file_len(), Some(18 + 6 * 4));
    }

    #[test]
    fn test_file_len_overflow() {
        let layout = TableLayout {
            dimensions: 8,
            items: 255,
            points: 1 << 63,
        };
        assert_eq!(layout.file_len(), None);
        let layout = TableLayout {
            points: (u64::MAX - layout.table_offset()) / RECORD_LEN,
            ..layout
        };
        assert!(layout.file_len().is_some());
    }

    #[test]
    fn test_header_bytes() {
        let (shape, catalog) = sample();
        let bytes = encode_header(UNFINISHED, &shape, &catalog);
        assert_eq!(
            bytes,
            vec![
                0xFF, 1, 0, 2, // flag, M-1, N-1
                0, 1, // capacity - 1
                0, 1, 1, 1, // id 1: (1,1)
                0, 0, 0, 1, // id 0: (0,1)
                0, 2, 0, 1, // id 2: (0,1)
            ]
        );
    }
}
