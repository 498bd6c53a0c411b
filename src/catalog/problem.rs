// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Problem instances and their text interchange format.
//!
//! ```text
//! A                       count of free-form header lines that follow
//! <A metadata lines>      ignored
//! M                       category count
//! N                       item count
//! C_0 ... C_{M-1}         capacity vector
//! id v_0 ... v_{M-1}      N lines; id must equal the line's 0-based position in this block
//! ```
//!
//! # Examples
//!
//! ```
//! use credit_cover::catalog::Problem;
//!
//! let text = "1\ncolumns: A B\n2\n3\n     1 1\n   0 1 0\n   1 0 1\n   2 1 1\n";
//! let problem = Problem::parse(text).unwrap();
//! assert_eq!(problem.capacity(), &[1, 1]);
//! assert_eq!(problem.item(2), Some(&[1u8, 1][..]));
//! ```

use super::MAX_ITEMS;
use crate::error::InputError;
use crate::lattice::Shape;
use crate::table::TableLayout;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;

/// A validated capacity vector and the items in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    shape: Shape,
    items: Vec<Vec<u8>>,
}

impl Problem {
    /// Validate a capacity vector and catalog.
    ///
    /// Checks capacity bounds, catalog size, arity, that every contribution is 0 or 1, and
    /// that the whole catalog together can cover every category. The table file for the
    /// problem must also be addressable with `u64` offsets.
    pub fn new(capacity: Vec<u16>, items: Vec<Vec<u8>>) -> Result<Self, InputError> {
        let shape = Shape::new(capacity)?;

        if items.is_empty() {
            return Err(InputError::EmptyCatalog);
        }
        if items.len() > MAX_ITEMS {
            return Err(InputError::CatalogTooLarge { count: items.len() });
        }

        let dimensions = shape.dimensions();
        let mut available = vec![0usize; dimensions];
        for (item, contribution) in items.iter().enumerate() {
            if contribution.len() != dimensions {
                return Err(InputError::ArityMismatch {
                    item,
                    expected: dimensions,
                    found: contribution.len(),
                });
            }
            for (category, &value) in contribution.iter().enumerate() {
                if value > 1 {
                    return Err(InputError::NonBinaryContribution {
                        item,
                        category,
                        value: value as u32,
                    });
                }
                available[category] += value as usize;
            }
        }

        for (category, (&required, &available)) in
            shape.capacity().iter().zip(&available).enumerate()
        {
            if available < required as usize {
                return Err(InputError::Infeasible {
                    category,
                    required,
                    available,
                });
            }
        }

        let layout = TableLayout {
            dimensions,
            items: items.len(),
            points: shape.point_count(),
        };
        if layout.file_len().is_none() {
            return Err(InputError::LatticeTooLarge {
                capacity: shape.capacity().to_vec(),
            });
        }

        Ok(Self { shape, items })
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn capacity(&self) -> &[u16] {
        self.shape.capacity()
    }

    /// Items in input order; an item's id is its index.
    pub fn items(&self) -> &[Vec<u8>] {
        &self.items
    }

    pub fn item(&self, id: usize) -> Option<&[u8]> {
        self.items.get(id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Parse the text interchange format.
    pub fn parse(text: &str) -> Result<Self, InputError> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        let mut cursor = Cursor { lines: &lines, at: 0 };

        let header_lines = cursor.single("header line count")?;
        cursor.skip(header_lines as usize)?;

        let dimensions = cursor.single("category count")? as usize;
        let count = cursor.single("item count")? as usize;

        let (line, capacity) = cursor.numbers("capacity vector")?;
        if capacity.len() != dimensions {
            return Err(InputError::Parse {
                line,
                reason: format!(
                    "capacity vector has {} entries, expected {}",
                    capacity.len(),
                    dimensions
                ),
            });
        }
        let capacity = capacity
            .into_iter()
            .enumerate()
            .map(|(category, value)| {
                u16::try_from(value)
                    .map_err(|_| InputError::CapacityOutOfRange { category, value })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut items = Vec::with_capacity(count.min(MAX_ITEMS));
        for position in 0..count {
            let (line, numbers) = cursor.numbers("item")?;
            let Some((&id, values)) = numbers.split_first() else {
                return Err(InputError::Parse {
                    line,
                    reason: "empty item line".to_string(),
                });
            };
            if id as usize != position {
                return Err(InputError::Parse {
                    line,
                    reason: format!("item id {} does not match position {}", id, position),
                });
            }
            let contribution = values
                .iter()
                .enumerate()
                .map(|(category, &value)| {
                    u8::try_from(value).map_err(|_| InputError::NonBinaryContribution {
                        item: position,
                        category,
                        value,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            items.push(contribution);
        }

        Self::new(capacity, items)
    }

    /// Read and parse a problem file.
    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| InputError::Parse {
            line: 0,
            reason: format!("cannot read {}: {}", path.display(), err),
        })?;
        Self::parse(&text)
    }

    /// Write the text interchange format, with `metadata` as the free-form header lines.
    pub fn write_to<W: Write>(&self, mut out: W, metadata: &[&str]) -> io::Result<()> {
        writeln!(out, "{}", metadata.len())?;
        for line in metadata {
            writeln!(out, "{}", line)?;
        }
        writeln!(out, "{}", self.shape.dimensions())?;
        writeln!(out, "{}", self.items.len())?;
        writeln!(out, "     {}", join(self.capacity().iter()))?;
        for (id, contribution) in self.items.iter().enumerate() {
            writeln!(out, "{:4} {}", id, join(contribution.iter()))?;
        }
        Ok(())
    }

    /// Drop copies of identical contribution vectors that can never all be useful.
    ///
    /// A vector is kept at most `max(C_i : v_i = 1)` times; an all-zero vector is dropped.
    /// Surviving items are renumbered in ascending vector order.
    pub fn with_duplicates_capped(&self) -> Result<Self, InputError> {
        let mut counts: BTreeMap<&[u8], usize> = BTreeMap::new();
        for item in &self.items {
            *counts.entry(item.as_slice()).or_default() += 1;
        }

        let mut items = Vec::with_capacity(self.items.len());
        for (vector, count) in counts {
            let useful = vector
                .iter()
                .zip(self.capacity())
                .filter(|&(&v, _)| v == 1)
                .map(|(_, &c)| c as usize)
                .max()
                .unwrap_or(0);
            items.extend(std::iter::repeat(vector.to_vec()).take(count.min(useful)));
        }

        Self::new(self.capacity().to_vec(), items)
    }
}

fn join<T: ToString>(values: impl Iterator<Item = T>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

/// Line reader for [`Problem::parse`]; line numbers are 1-based.
struct Cursor<'a> {
    lines: &'a [&'a str],
    at: usize,
}

impl Cursor<'_> {
    fn next_line(&mut self, what: &str) -> Result<(usize, &str), InputError> {
        let line = self.at + 1;
        let text = self.lines.get(self.at).ok_or_else(|| InputError::Parse {
            line,
            reason: format!("missing {}", what),
        })?;
        self.at += 1;
        Ok((line, text))
    }

    fn skip(&mut self, count: usize) -> Result<(), InputError> {
        for _ in 0..count {
            self.next_line("header line")?;
        }
        Ok(())
    }

    fn numbers(&mut self, what: &str) -> Result<(usize, Vec<u32>), InputError> {
        let (line, text) = self.next_line(what)?;
        let numbers = text
            .split_whitespace()
            .map(|token| {
                token.parse::<u32>().map_err(|_| InputError::Parse {
                    line,
                    reason: format!("{:?} is not a non-negative integer", token),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((line, numbers))
    }

    fn single(&mut self, what: &str) -> Result<u32, InputError> {
        let (line, numbers) = self.numbers(what)?;
        match numbers.as_slice() {
            [value] => Ok(*value),
            _ => Err(InputError::Parse {
                line,
                reason: format!("expected a single integer for {}", what),
            }),
        }
    }
}
