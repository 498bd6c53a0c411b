// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Exhaustive enumeration of the vectors between two bounds.

use crate::error::LatticeError;

/// Iterator over every `v` with `lo <= v <= hi`, last component counting fastest.
///
/// Yields `prod(hi_i - lo_i + 1)` vectors. Between `0` and `C` this is exactly ascending
/// [`super::Shape`] address order.
#[derive(Debug, Clone)]
pub struct VectorsBetween {
    lo: Vec<u16>,
    hi: Vec<u16>,
    next: Option<Vec<u16>>,
}

/// Enumerate all vectors between `lo` and `hi` inclusive.
///
/// Fails if the bounds differ in length or `lo` does not lie below `hi`.
///
/// # Examples
///
/// ```
/// use credit_cover::lattice::enumerate_between;
///
/// let all: Vec<_> = enumerate_between(&[0, 1], &[1, 2]).unwrap().collect();
/// assert_eq!(all, vec![vec![0, 1], vec![0, 2], vec![1, 1], vec![1, 2]]);
/// ```
pub fn enumerate_between(lo: &[u16], hi: &[u16]) -> Result<VectorsBetween, LatticeError> {
    if lo.len() != hi.len() {
        return Err(LatticeError::DimensionMismatch {
            expected: hi.len(),
            found: lo.len(),
        });
    }
    if let Some(category) = lo.iter().zip(hi).position(|(a, b)| a > b) {
        return Err(LatticeError::OutOfRange {
            category,
            value: lo[category],
            capacity: hi[category],
        });
    }
    Ok(VectorsBetween {
        lo: lo.to_vec(),
        hi: hi.to_vec(),
        next: Some(lo.to_vec()),
    })
}

impl Iterator for VectorsBetween {
    type Item = Vec<u16>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;

        let mut successor = current.clone();
        for i in (0..successor.len()).rev() {
            if successor[i] < self.hi[i] {
                successor[i] += 1;
                successor[i + 1..].copy_from_slice(&self.lo[i + 1..]);
                self.next = Some(successor);
                break;
            }
        }

        Some(current)
    }
}
