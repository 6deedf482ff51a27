//! Lazy row permutation.
//!
//! Row swaps are recorded in two mirrored dictionaries instead of touching
//! the cells:
//!
//! - `index_to_row[i]` is the physical row currently holding logical row `i`,
//! - `row_to_index[r]` is the logical index of physical row `r`.
//!
//! While a permutation is pending, cells still carry physical rows. Point
//! queries translate through `index_to_row`; every read that exposes row
//! indices first materializes the permutation by reordering all columns with
//! `row_to_index`, after which both maps are the identity again.

use crate::rows::Index;

/// State of the lazy row permutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapTracker {
    index_to_row: Vec<Index>,
    row_to_index: Vec<Index>,
    pending: bool,
}

impl SwapTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extends both maps with identity entries up to `row` included.
    pub fn ensure_row(&mut self, row: Index) {
        for i in self.index_to_row.len()..=row {
            self.index_to_row.push(i);
            self.row_to_index.push(i);
        }
    }

    /// Records the transposition of logical rows `first` and `second`.
    pub fn swap_rows(&mut self, first: Index, second: Index) {
        self.ensure_row(first.max(second));
        self.pending = true;
        let (r1, r2) = (self.index_to_row[first], self.index_to_row[second]);
        self.row_to_index.swap(r1, r2);
        self.index_to_row.swap(first, second);
    }

    /// Physical row currently holding logical row `index`.
    pub fn physical_row(&self, index: Index) -> Index {
        self.index_to_row.get(index).copied().unwrap_or(index)
    }

    /// Logical index of physical row `row`.
    pub fn logical_index(&self, row: Index) -> Index {
        self.row_to_index.get(row).copied().unwrap_or(row)
    }

    /// `true` while cells carry physical rows that differ from logical ones.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Physical-to-logical map to reorder the columns with, if a permutation
    /// is pending. The tracker is back to the identity afterwards.
    pub fn take_pending(&mut self) -> Option<Vec<Index>> {
        if !self.pending {
            return None;
        }
        let permutation = self.row_to_index.clone();
        for (i, (row, index)) in self
            .index_to_row
            .iter_mut()
            .zip(self.row_to_index.iter_mut())
            .enumerate()
        {
            *row = i;
            *index = i;
        }
        self.pending = false;
        Some(permutation)
    }

    pub fn reset(&mut self) {
        self.index_to_row.clear();
        self.row_to_index.clear();
        self.pending = false;
    }
}
