// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! One table record: `(size, lastIndex)`.

/// Minimum selection size for a lattice point, plus the tie-break vector index.
///
/// Entries order lexicographically by `(size, last)`, with `last == None` (the `-1` of the
/// sentinel) below every index. Smaller is better everywhere in the closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableEntry {
    /// Minimum number of catalog vectors.
    pub size: u32,
    /// Smallest vector index that ends some optimal increasing-index selection.
    pub last: Option<u16>,
}

impl TableEntry {
    /// Entry of the capacity point itself: nothing selected.
    pub const SENTINEL: TableEntry = TableEntry {
        size: 0,
        last: None,
    };

    pub fn new(size: u32, last: u16) -> Self {
        Self {
            size,
            last: Some(last),
        }
    }

    /// The entry reached by appending vector `index` to a selection described by `self`.
    pub fn extended(self, index: u16) -> Self {
        Self::new(self.size + 1, index)
    }

    /// Encode as `[size-1: u16 BE][last: u16 BE]`, clamping both fields.
    ///
    /// The sentinel has no representation; its bytes are written as `0xFF`.
    pub(crate) fn to_record(self) -> [u8; 4] {
        match self.last {
            None => [0xFF; 4],
            Some(last) => {
                let size = self.size.saturating_sub(1).min(u16::MAX as u32) as u16;
                let [a, b] = size.to_be_bytes();
                let [c, d] = last.to_be_bytes();
                [a, b, c, d]
            }
        }
    }

    pub(crate) fn from_record(record: [u8; 4]) -> Self {
        let size = u16::from_be_bytes([record[0], record[1]]) as u32 + 1;
        let last = u16::from_be_bytes([record[2], record[3]]);
        Self::new(size, last)
    }
}
