// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Mixed-radix addressing of lattice points.
//!
//! Digit `i` has radix `C_i + 1` and the first category is the most significant digit, so
//! ascending addresses enumerate the lattice with the last category counting fastest.
//!
//! # Examples
//!
//! ```
//! use credit_cover::lattice::Shape;
//!
//! let shape = Shape::new(vec![1, 2]).unwrap();
//! assert_eq!(shape.point_count(), 6);
//! assert_eq!(shape.encode(&[1, 0]).unwrap(), 3);
//! assert_eq!(shape.decode(5).unwrap(), vec![1, 2]);
//! ```

use crate::error::{InputError, LatticeError};

/// Largest number of categories the table format can describe.
pub const MAX_CATEGORIES: usize = 256;

/// Largest per-category capacity the table format can describe.
pub const MAX_CAPACITY: u16 = 256;

/// The bounded lattice `0 <= v <= C` for a fixed capacity vector `C`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    capacity: Vec<u16>,
    /// `strides[i]` is the address distance between neighbours along category `i`.
    strides: Vec<u64>,
    points: u64,
}

impl Shape {
    /// Validate a capacity vector and precompute its strides.
    ///
    /// Fails if the vector is empty, longer than 256, has a component outside 1..=256, or
    /// describes more points than a `u64` address can hold.
    pub fn new(capacity: Vec<u16>) -> Result<Self, InputError> {
        if capacity.is_empty() {
            return Err(InputError::EmptyCapacity);
        }
        if capacity.len() > MAX_CATEGORIES {
            return Err(InputError::TooManyCategories {
                count: capacity.len(),
            });
        }
        for (category, &value) in capacity.iter().enumerate() {
            if value == 0 || value > MAX_CAPACITY {
                return Err(InputError::CapacityOutOfRange {
                    category,
                    value: value as u32,
                });
            }
        }

        let mut strides = vec![0u64; capacity.len()];
        let mut points: u64 = 1;
        for (i, &value) in capacity.iter().enumerate().rev() {
            strides[i] = points;
            points = points
                .checked_mul(value as u64 + 1)
                .ok_or_else(|| InputError::LatticeTooLarge {
                    capacity: capacity.clone(),
                })?;
        }

        Ok(Self {
            capacity,
            strides,
            points,
        })
    }

    /// The capacity vector `C`.
    pub fn capacity(&self) -> &[u16] {
        &self.capacity
    }

    /// Number of categories `M`.
    pub fn dimensions(&self) -> usize {
        self.capacity.len()
    }

    /// Number of lattice points, `prod(C_i + 1)`.
    pub fn point_count(&self) -> u64 {
        self.points
    }

    /// Address distance between `v` and `v` with category `category` decremented.
    pub fn stride(&self, category: usize) -> u64 {
        self.strides[category]
    }

    /// The all-zero vector.
    pub fn zero(&self) -> Vec<u16> {
        vec![0; self.capacity.len()]
    }

    /// `C - v`, componentwise.
    pub fn complement(&self, v: &[u16]) -> Vec<u16> {
        super::sub(&self.capacity, v)
    }

    /// Check that `v` is a lattice point.
    pub fn check(&self, v: &[u16]) -> Result<(), LatticeError> {
        if v.len() != self.capacity.len() {
            return Err(LatticeError::DimensionMismatch {
                expected: self.capacity.len(),
                found: v.len(),
            });
        }
        for (category, (&value, &capacity)) in v.iter().zip(&self.capacity).enumerate() {
            if value > capacity {
                return Err(LatticeError::OutOfRange {
                    category,
                    value,
                    capacity,
                });
            }
        }
        Ok(())
    }

    /// Mixed-radix address of `v`.
    pub fn encode(&self, v: &[u16]) -> Result<u64, LatticeError> {
        self.check(v)?;
        Ok(v
            .iter()
            .zip(&self.strides)
            .map(|(&value, &stride)| value as u64 * stride)
            .sum())
    }

    /// Exact inverse of [`Shape::encode`].
    pub fn decode(&self, address: u64) -> Result<Vec<u16>, LatticeError> {
        if address >= self.points {
            return Err(LatticeError::AddressOutOfRange {
                address,
                points: self.points,
            });
        }
        let mut rest = address;
        let mut out = vec![0u16; self.capacity.len()];
        for (i, &capacity) in self.capacity.iter().enumerate().rev() {
            let radix = capacity as u64 + 1;
            out[i] = (rest % radix) as u16;
            rest /= radix;
        }
        Ok(out)
    }

    /// Component `category` of the point at `address`, which must be below `point_count()`.
    pub fn digit(&self, address: u64, category: usize) -> u16 {
        ((address / self.strides[category]) % (self.capacity[category] as u64 + 1)) as u16
    }
}
