// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The canonical catalog of contribution vectors.
//!
//! Items arrive in input order, each identified by its position (its [`ItemId`]). The
//! closure and the table file work with the *canonical* order instead: contribution vectors
//! sorted descending lexicographically, ties broken by ascending item id. A position in
//! this order is a "vector index". Choosing vectors in strictly increasing vector index
//! rules out permuted duplicates of the same selection.
//!
//! Several items may share an identical contribution vector. The catalog keeps, for each
//! distinct vector, every item id carrying it, so a witness can name any one of them.

pub mod problem;

pub use problem::Problem;

use std::collections::HashMap;

/// Stable identifier of an item: its position in the input.
pub type ItemId = u16;

/// Largest number of items the table format can describe.
pub const MAX_ITEMS: usize = 1 << 16;

/// One item in canonical position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogEntry {
    pub id: ItemId,
    pub contribution: Vec<u8>,
}

/// Contribution vectors in canonical order, with content-to-id grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    /// Every item id carrying a given contribution vector, ascending.
    groups: HashMap<Vec<u8>, Vec<ItemId>>,
}

impl Catalog {
    /// Reorder a validated problem's items into canonical order.
    pub fn canonicalize(problem: &Problem) -> Self {
        let items = problem.items();
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by(|&a, &b| items[b].cmp(&items[a]).then(a.cmp(&b)));

        let entries = order
            .into_iter()
            .map(|index| CatalogEntry {
                id: index as ItemId,
                contribution: items[index].clone(),
            })
            .collect();
        Self::from_canonical(entries)
    }

    /// Rebuild a catalog from entries already in canonical order (as stored in a table file).
    pub fn from_canonical(entries: Vec<CatalogEntry>) -> Self {
        let mut groups: HashMap<Vec<u8>, Vec<ItemId>> = HashMap::new();
        for entry in &entries {
            groups
                .entry(entry.contribution.clone())
                .or_default()
                .push(entry.id);
        }
        for ids in groups.values_mut() {
            ids.sort_unstable();
        }
        Self { entries, groups }
    }

    /// Number of vectors `N`.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in canonical order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Contribution vector at vector index `index`.
    pub fn contribution(&self, index: usize) -> &[u8] {
        &self.entries[index].contribution
    }

    /// Every item id whose contribution equals the vector at `index`.
    pub fn ids_sharing(&self, index: usize) -> &[ItemId] {
        self.groups
            .get(&self.entries[index].contribution)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct contribution vectors.
    pub fn distinct_len(&self) -> usize {
        self.groups.len()
    }

    /// Per-category right bounds for pruning.
    ///
    /// `bounds[j]` is the first vector index from which every vector is zero on categories
    /// `0..=j`. When the lowest unsatisfied category of a requirement is `j`, no vector at or
    /// beyond `bounds[j]` can ever satisfy it. Relies on the descending canonical order.
    pub fn right_bounds(&self, dimensions: usize) -> Vec<usize> {
        let mut bounds = vec![0; dimensions];
        let mut i = 0;
        for (category, bound) in bounds.iter_mut().enumerate() {
            while i < self.entries.len() && self.entries[i].contribution[category] == 1 {
                i += 1;
            }
            *bound = i;
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(capacity: Vec<u16>, items: Vec<Vec<u8>>) -> Catalog {
        Catalog::canonicalize(&Problem::new(capacity, items).unwrap())
    }

    #[test]
    fn test_canonical_order_descending() {
        let c = catalog(
            vec![1, 1, 1],
            vec![vec![0, 0, 1], vec![1, 0, 0], vec![0, 1, 1], vec![1, 1, 0]],
        );
        let order: Vec<_> = c.entries().iter().map(|e| e.id).collect();
        assert_eq!(order, vec![3, 1, 2, 0]);
        assert_eq!(c.contribution(0), &[1, 1, 0]);
        assert_eq!(c.contribution(3), &[0, 0, 1]);
    }

    #[test]
    fn test_duplicates_grouped_and_ordered_by_id() {
        let c = catalog(
            vec![2, 1],
            vec![vec![1, 0], vec![0, 1], vec![1, 0], vec![1, 0]],
        );
        let order: Vec<_> = c.entries().iter().map(|e| e.id).collect();
        assert_eq!(order, vec![0, 2, 3, 1]);
        assert_eq!(c.ids_sharing(1), &[0, 2, 3]);
        assert_eq!(c.ids_sharing(3), &[1]);
        assert_eq!(c.distinct_len(), 2);
    }

    #[test]
    fn test_right_bounds() {
        // Canonical: 110, 100, 011, 010, 001
        let c = catalog(
            vec![1, 1, 1],
            vec![
                vec![0, 1, 0],
                vec![1, 0, 0],
                vec![0, 0, 1],
                vec![1, 1, 0],
                vec![0, 1, 1],
            ],
        );
        assert_eq!(c.right_bounds(3), vec![2, 4, 5]);
    }

    #[test]
    fn test_from_canonical_round_trip() {
        let c = catalog(vec![1, 1], vec![vec![0, 1], vec![1, 1], vec![0, 1]]);
        let rebuilt = Catalog::from_canonical(c.entries().to_vec());
        assert_eq!(rebuilt, c);
    }
}
