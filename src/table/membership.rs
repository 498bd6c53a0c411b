// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Bitset of lattice addresses written during construction.
//!
//! Membership cannot be recovered from the file: an all-`0xFF` record is also the legitimate
//! encoding of `(65536, 65535)`.

/// A set of lattice addresses, one bit per point.
#[derive(Debug, Clone)]
pub struct Membership {
    words: Vec<u64>,
    capacity: u64,
    count: u64,
}

impl Membership {
    /// Create an empty set over addresses `0..capacity`.
    pub fn new(capacity: u64) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(64) as usize],
            capacity,
            count: 0,
        }
    }

    /// Insert an address. Returns true if it was not present.
    pub fn insert(&mut self, address: u64) -> bool {
        debug_assert!(address < self.capacity);
        let word = &mut self.words[(address / 64) as usize];
        let bit = 1u64 << (address % 64);
        if *word & bit != 0 {
            return false;
        }
        *word |= bit;
        self.count += 1;
        true
    }

    pub fn contains(&self, address: u64) -> bool {
        address < self.capacity && self.words[(address / 64) as usize] >> (address % 64) & 1 != 0
    }

    /// Number of addresses present.
    pub fn len(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True when every address in range is present.
    pub fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    /// Addresses not yet present.
    pub fn missing(&self) -> u64 {
        self.capacity - self.count
    }
}
