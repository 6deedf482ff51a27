//! Row access layer.
//!
//! A row sink mirrors, for every row index, the set of columns owning a
//! non-zero cell in that row. Columns own their cells; the sink only stores
//! column indices, so it never controls a cell's lifetime. Every column
//! mutation receives the sink and performs the matching insert or unlink in
//! the same call, which keeps the mirror exact at all times.
//!
//! Matrices choose their sink at compile time: [`NoRowAccess`] turns every
//! hook into a no-op, [`RowContainer`] maintains the rows.

use std::collections::{BTreeMap, BTreeSet};

/// Row or column index.
pub type Index = usize;

/// Receiver of the cell-level events emitted by columns.
pub trait RowAccess: Clone {
    /// `false` for sinks whose hooks do nothing.
    const IS_ACTIVE: bool;

    /// A cell appeared at `(row, column)`.
    fn insert_cell(&mut self, row: Index, column: Index);

    /// The cell at `(row, column)` disappeared. The owning column is untouched.
    fn unlink(&mut self, row: Index, column: Index);

    /// Drops `row` if it is empty and rows are removable.
    fn erase_row(&mut self, row: Index);

    /// Makes sure `row` exists before any cell lands in it.
    fn reserve_row(&mut self, _row: Index) {}
}

/// Sink used when row access is disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoRowAccess;

impl RowAccess for NoRowAccess {
    const IS_ACTIVE: bool = false;

    #[inline]
    fn insert_cell(&mut self, _row: Index, _column: Index) {}

    #[inline]
    fn unlink(&mut self, _row: Index, _column: Index) {}

    #[inline]
    fn erase_row(&mut self, _row: Index) {}
}

/// Columns holding a non-zero cell in one row, in increasing column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    columns: BTreeSet<Index>,
}

impl Row {
    pub fn contains(&self, column: Index) -> bool {
        self.columns.contains(&column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column indices, increasing.
    pub fn iter(&self) -> impl Iterator<Item = Index> + '_ {
        self.columns.iter().copied()
    }
}

#[derive(Debug, Clone)]
enum Rows {
    /// Grows on demand, rows are never dropped.
    Dense(Vec<Row>),
    /// Only stores the rows that were touched and not erased since.
    Removable(BTreeMap<Index, Row>),
}

/// Row sink maintaining every row of a matrix.
#[derive(Debug, Clone)]
pub struct RowContainer {
    rows: Rows,
}

impl RowContainer {
    /// `removable_rows` makes [`RowAccess::erase_row`] drop empty rows;
    /// otherwise rows are kept in a growing vector.
    pub fn new(removable_rows: bool) -> Self {
        let rows = if removable_rows {
            Rows::Removable(BTreeMap::new())
        } else {
            Rows::Dense(Vec::new())
        };
        Self { rows }
    }

    /// Row `row`, if it is currently stored.
    pub fn row(&self, row: Index) -> Option<&Row> {
        match &self.rows {
            Rows::Dense(rows) => rows.get(row),
            Rows::Removable(rows) => rows.get(&row),
        }
    }

    /// Whether row `row` is stored.
    pub fn has_row(&self, row: Index) -> bool {
        self.row(row).is_some()
    }

    /// Number of stored rows (including empty ones in dense mode).
    pub fn row_count(&self) -> usize {
        match &self.rows {
            Rows::Dense(rows) => rows.len(),
            Rows::Removable(rows) => rows.len(),
        }
    }

    pub fn is_removable(&self) -> bool {
        matches!(self.rows, Rows::Removable(_))
    }

    fn row_mut(&mut self, row: Index) -> &mut Row {
        match &mut self.rows {
            Rows::Dense(rows) => {
                if rows.len() <= row {
                    rows.resize_with(row + 1, Row::default);
                }
                &mut rows[row]
            }
            Rows::Removable(rows) => rows.entry(row).or_default(),
        }
    }
}

impl Default for RowContainer {
    fn default() -> Self {
        Self::new(false)
    }
}

impl RowAccess for RowContainer {
    const IS_ACTIVE: bool = true;

    fn insert_cell(&mut self, row: Index, column: Index) {
        self.row_mut(row).columns.insert(column);
    }

    fn unlink(&mut self, row: Index, column: Index) {
        let row = match &mut self.rows {
            Rows::Dense(rows) => rows.get_mut(row),
            Rows::Removable(rows) => rows.get_mut(&row),
        };
        if let Some(row) = row {
            row.columns.remove(&column);
        }
    }

    fn erase_row(&mut self, row: Index) {
        if let Rows::Removable(rows) = &mut self.rows {
            if rows.get(&row).is_some_and(Row::is_empty) {
                rows.remove(&row);
            }
        }
    }

    /// Grows dense rows up to `row`. Removable rows are created on demand.
    fn reserve_row(&mut self, row: Index) {
        if let Rows::Dense(rows) = &mut self.rows {
            if rows.len() <= row {
                rows.resize_with(row + 1, Row::default);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_rows_grow() {
        let mut rows = RowContainer::new(false);
        rows.insert_cell(4, 1);
        rows.insert_cell(4, 0);
        assert_eq!(rows.row_count(), 5);
        assert_eq!(rows.row(4).unwrap().iter().collect::<Vec<_>>(), vec![0, 1]);
        assert!(rows.row(2).unwrap().is_empty());

        rows.unlink(4, 0);
        rows.erase_row(4);
        assert_eq!(rows.row(4).unwrap().len(), 1);
        assert_eq!(rows.row_count(), 5);

        rows.reserve_row(7);
        assert_eq!(rows.row_count(), 8);
    }

    #[test]
    fn test_removable_rows() {
        let mut rows = RowContainer::new(true);
        rows.insert_cell(3, 2);
        assert!(rows.has_row(3));
        assert!(!rows.has_row(0));

        rows.erase_row(3);
        assert!(rows.has_row(3), "non-empty rows are kept");

        rows.unlink(3, 2);
        rows.erase_row(3);
        assert!(!rows.has_row(3));
        assert_eq!(rows.row_count(), 0);
    }

    #[test]
    fn test_unlink_unknown_row_is_noop() {
        let mut rows = RowContainer::default();
        rows.unlink(10, 0);
        assert_eq!(rows.row_count(), 0);
    }
}
