// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Vector algebra over the bounded credit lattice.
//!
//! A lattice point is a vector `v` with `0 <= v <= C` componentwise, where `C` is the
//! capacity vector. Credits are `u16` because a single category may require up to 256
//! credits. Contribution vectors are 0/1 and stored as `u8`; the operations below accept
//! either through `Into<u16>`.
//!
//! # Examples
//!
//! ```
//! use credit_cover::lattice::{add, dominates, sub};
//!
//! let capacity = [2u16, 1, 3];
//! let required = [2u16, 1, 1];
//!
//! assert_eq!(sub(&required, &[1u8, 1, 0]), vec![1, 0, 1]);
//! assert_eq!(add(&[2u16, 0, 3], &[1u8, 1, 1], &capacity), vec![2, 1, 3]);
//! assert!(dominates(&[1, 0, 1], &required));
//! ```

pub mod encoding;
pub mod enumerate;

pub use encoding::Shape;
pub use enumerate::{enumerate_between, VectorsBetween};

/// Componentwise `max(a_i - b_i, 0)`.
pub fn sub<T: Copy + Into<u16>>(a: &[u16], b: &[T]) -> Vec<u16> {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(&x, &y)| x.saturating_sub(y.into()))
        .collect()
}

/// Componentwise addition saturating at `capacity`.
///
/// Computed as `C - ((C - a) - b)` with capped subtraction, so the result never exceeds
/// the capacity in any category.
pub fn add<T: Copy + Into<u16>>(a: &[u16], b: &[T], capacity: &[u16]) -> Vec<u16> {
    sub(capacity, &sub(&sub(capacity, a), b))
}

/// True iff `a_i <= b_i` for every component.
pub fn dominates(a: &[u16], b: &[u16]) -> bool {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).all(|(x, y)| x <= y)
}

/// True iff every component is zero or below.
///
/// For unsigned credit vectors this means "all zero": nothing is left to satisfy.
pub fn is_zero_or_below<T: Copy + Default + PartialOrd>(v: &[T]) -> bool {
    let zero = T::default();
    v.iter().all(|&x| x <= zero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_saturates() {
        assert_eq!(sub(&[3, 0, 1], &[1u8, 1, 1]), vec![2, 0, 0]);
        assert_eq!(sub(&[3, 4], &[5u16, 1]), vec![0, 3]);
    }

    #[test]
    fn test_add_capped_by_capacity() {
        let capacity = [1u16, 2];
        assert_eq!(add(&[1, 1], &[1u8, 1], &capacity), vec![1, 2]);
        assert_eq!(add(&[0, 2], &[1u8, 1], &capacity), vec![1, 2]);
        assert_eq!(add(&[0, 0], &[0u8, 0], &capacity), vec![0, 0]);
    }

    #[test]
    fn test_dominates() {
        assert!(dominates(&[0, 1], &[0, 1]));
        assert!(dominates(&[0, 0], &[2, 1]));
        assert!(!dominates(&[1, 0], &[0, 1]));
    }

    #[test]
    fn test_is_zero_or_below() {
        assert!(is_zero_or_below::<u16>(&[0, 0, 0]));
        assert!(!is_zero_or_below::<u16>(&[0, 1]));
        assert!(is_zero_or_below::<i32>(&[-2, 0, -1]));
        assert!(!is_zero_or_below::<i32>(&[-2, 3]));
    }
}
