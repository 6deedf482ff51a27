//! Base matrix: a plain container of columns.

use super::{
    default_dimension, pair_mut, swap_column_slots, write_dense, DimensionTracker, MatrixOptions,
    RemovedColumn, SwapTracker,
};
use crate::column::{unit_cells, Cell, Column, Dimension, RowAccessColumn};
use crate::field::FieldOperators;
use crate::rows::{Index, NoRowAccess, Row, RowAccess, RowContainer};
use std::fmt;
use tracing::{debug, trace};

/// Column container without algebraic meaning: columns are inserted,
/// combined, zeroed and swapped as the caller requests.
#[derive(Debug, Clone)]
pub struct BaseMatrix<F: FieldOperators, C: Column<F>, R: RowAccess = NoRowAccess> {
    field: F,
    columns: Vec<C>,
    rows: R,
    swaps: Option<SwapTracker>,
    dimensions: DimensionTracker,
    options: MatrixOptions,
}

impl<F: FieldOperators, C: Column<F>> BaseMatrix<F, C, NoRowAccess> {
    pub fn new(field: F, options: MatrixOptions) -> Self {
        Self::with_capacity(field, options, 0)
    }

    pub fn with_capacity(field: F, options: MatrixOptions, columns: usize) -> Self {
        Self::build(field, options, NoRowAccess, columns)
    }
}

impl<F: FieldOperators, C: Column<F> + RowAccessColumn> BaseMatrix<F, C, RowContainer> {
    /// Matrix maintaining its rows. `options.removable_rows` decides whether
    /// erased rows are dropped.
    pub fn with_row_access(field: F, options: MatrixOptions) -> Self {
        let rows = RowContainer::new(options.removable_rows);
        Self::build(field, options, rows, 0)
    }

    /// Columns with a non-zero cell in `row`, once pending swaps are applied.
    pub fn get_row(&mut self, row: Index) -> Option<&Row> {
        self.materialize();
        self.rows.row(row)
    }
}

impl<F: FieldOperators, C: Column<F>, R: RowAccess> BaseMatrix<F, C, R> {
    fn build(field: F, options: MatrixOptions, rows: R, capacity: usize) -> Self {
        Self {
            field,
            columns: Vec::with_capacity(capacity),
            rows,
            swaps: options.column_and_row_swaps.then(SwapTracker::new),
            dimensions: DimensionTracker::new(),
            options,
        }
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    pub fn options(&self) -> MatrixOptions {
        self.options
    }

    /// Appends a column holding `cells` and returns its index.
    pub fn insert_column(
        &mut self,
        cells: impl IntoIterator<Item = Cell<F::Element>>,
        dimension: Dimension,
    ) -> Index {
        self.materialize();
        let index = self.columns.len();
        let column = C::from_cells(index, dimension, cells, &self.field, &mut self.rows);
        if let Some(swaps) = self.swaps.as_mut() {
            if let Some(pivot) = column.entries().last() {
                swaps.ensure_row(pivot.row);
            }
        }
        self.columns.push(column);
        self.dimensions.update_up(dimension);
        trace!(index, dimension, "column inserted");
        index
    }

    /// Appends a column with unit coefficients on the rows of `boundary`.
    /// Without an explicit dimension, the boundary size minus one is used.
    pub fn insert_boundary(&mut self, boundary: &[Index], dimension: Option<Dimension>) -> Index {
        let dimension = dimension.unwrap_or_else(|| default_dimension(boundary.len()));
        let cells: Vec<_> = unit_cells(&self.field, boundary.iter().copied()).collect();
        self.insert_column(cells, dimension)
    }

    /// Column `column`, with its rows up to date.
    pub fn get_column(&mut self, column: Index) -> &C {
        self.materialize();
        &self.columns[column]
    }

    /// Removes the last column. Returns `None` on an empty matrix.
    pub fn remove_last(&mut self) -> Option<RemovedColumn> {
        let mut column = self.columns.pop()?;
        let mut pivot = column.pivot();
        if pivot.is_some() && self.swaps.as_ref().is_some_and(SwapTracker::is_pending) {
            // cells still carry physical rows
            self.columns.push(column);
            self.materialize();
            column = self.columns.pop()?;
            pivot = column.pivot();
        }
        column.clear(&mut self.rows);
        let dimension = column.dimension();
        self.dimensions.update_down(dimension);
        debug!(index = self.columns.len(), ?pivot, "last column removed");
        Some(RemovedColumn { pivot, dimension })
    }

    /// Drops `row` from the row container if it is empty and rows are
    /// removable.
    pub fn erase_row(&mut self, row: Index) {
        let row = self.physical_row(row);
        self.rows.erase_row(row);
    }

    pub fn get_number_of_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn get_column_dimension(&self, column: Index) -> Dimension {
        self.columns[column].dimension()
    }

    pub fn get_max_dimension(&self) -> Option<Dimension> {
        self.dimensions.max_dimension()
    }

    /// `target += source`
    pub fn add_to(&mut self, source: Index, target: Index) {
        self.combine(source, target, |t, s, field, rows| t.add(s, field, rows));
    }

    /// `target = target * coefficient + source`
    pub fn multiply_target_and_add_to(
        &mut self,
        source: Index,
        coefficient: F::Element,
        target: Index,
    ) {
        self.combine(source, target, |t, s, field, rows| {
            t.multiply_target_and_add(coefficient, s, field, rows)
        });
    }

    /// `target = target + coefficient * source`
    pub fn multiply_source_and_add_to(
        &mut self,
        coefficient: F::Element,
        source: Index,
        target: Index,
    ) {
        self.combine(source, target, |t, s, field, rows| {
            t.multiply_source_and_add(s, coefficient, field, rows)
        });
    }

    fn combine(&mut self, source: Index, target: Index, op: impl FnOnce(&mut C, &C, &F, &mut R)) {
        if source == target {
            let copy = self.columns[source].clone();
            op(&mut self.columns[target], &copy, &self.field, &mut self.rows);
        } else {
            let (target, source) = pair_mut(&mut self.columns, target, source);
            op(target, source, &self.field, &mut self.rows);
        }
    }

    /// Zeroes the cell at logical row `row` of `column`.
    pub fn zero_cell(&mut self, column: Index, row: Index) {
        let row = self.physical_row(row);
        self.columns[column].clear_row(row, &mut self.rows);
    }

    /// `column *= coefficient`
    pub(crate) fn scale_column(&mut self, column: Index, coefficient: F::Element) {
        self.columns[column].scale(coefficient, &self.field, &mut self.rows);
    }

    pub fn zero_column(&mut self, column: Index) {
        self.columns[column].clear(&mut self.rows);
    }

    pub fn is_zero_cell(&self, column: Index, row: Index) -> bool {
        !self.columns[column].is_non_zero(self.physical_row(row))
    }

    pub fn is_zero_column(&mut self, column: Index) -> bool {
        self.columns[column].is_empty()
    }

    pub fn get_pivot(&mut self, column: Index) -> Option<Index> {
        self.materialize();
        self.columns[column].pivot()
    }

    /// Exchanges the columns at `first` and `second`.
    pub fn swap_columns(&mut self, first: Index, second: Index) {
        swap_column_slots::<F, C, R>(&mut self.columns, &mut self.rows, first, second);
    }

    /// Exchanges the logical rows `first` and `second`. Recorded lazily when
    /// swaps are enabled, applied to every column right away otherwise.
    pub fn swap_rows(&mut self, first: Index, second: Index) {
        match self.swaps.as_mut() {
            Some(swaps) => swaps.swap_rows(first, second),
            None => {
                let mut permutation: Vec<Index> = (0..=first.max(second)).collect();
                permutation.swap(first, second);
                for column in &mut self.columns {
                    column.reorder(&permutation, &mut self.rows);
                }
            }
        }
    }

    /// Applies the pending row permutation to every cell. Idempotent.
    pub fn materialize(&mut self) {
        let Some(permutation) = self.swaps.as_mut().and_then(SwapTracker::take_pending) else {
            return;
        };
        trace!(columns = self.columns.len(), "applying pending row swaps");
        for column in &mut self.columns {
            column.reorder(&permutation, &mut self.rows);
        }
    }

    /// Removes every column. The field and options are kept.
    pub fn reset(&mut self) {
        for column in &mut self.columns {
            column.clear(&mut self.rows);
        }
        self.columns.clear();
        self.dimensions.reset();
        if let Some(swaps) = self.swaps.as_mut() {
            swaps.reset();
        }
    }

    /// Value at the pivot of `column`, rows up to date.
    pub(crate) fn pivot_value(&mut self, column: Index) -> Option<F::Element> {
        self.materialize();
        self.columns[column].pivot_value()
    }

    /// Prepares the row sink and the swap tracker for a face about to be
    /// referenced as a row.
    pub(crate) fn reserve_row(&mut self, row: Index) {
        self.rows.reserve_row(row);
        if let Some(swaps) = self.swaps.as_mut() {
            swaps.ensure_row(row);
        }
    }

    fn physical_row(&self, row: Index) -> Index {
        self.swaps.as_ref().map_or(row, |swaps| swaps.physical_row(row))
    }

    /// Dense dump of the columns, rows shown in logical order.
    pub(crate) fn write_columns(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<_> =
            self.columns.iter().map(|c| (c.column_index(), c.entries())).collect();
        let row_count = columns
            .iter()
            .flat_map(|(_, cells)| cells.iter().map(|cell| cell.row + 1))
            .max()
            .unwrap_or(0);
        write_dense(f, &self.field, columns.into_iter(), row_count, |row| {
            self.swaps.as_ref().map_or(row, |swaps| swaps.logical_index(row))
        })
    }
}

impl<F: FieldOperators, C: Column<F>, R: RowAccess> fmt::Display for BaseMatrix<F, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Base matrix ({} columns):", self.columns.len())?;
        self.write_columns(f)
    }
}
