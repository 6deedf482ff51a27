//! Column stored as an ordered map from row to value.

use super::{map_row, normalize_cells, Cell, Column, Dimension, RowAccessColumn};
use crate::field::FieldOperators;
use crate::rows::{Index, RowAccess};
use std::collections::BTreeMap;

/// `BTreeMap` keyed by row: logarithmic lookup, insertion and zeroing.
#[derive(Debug, Clone)]
pub struct SetColumn<F: FieldOperators> {
    cells: BTreeMap<Index, F::Element>,
    column_index: Index,
    dimension: Dimension,
}

impl<F: FieldOperators> RowAccessColumn for SetColumn<F> {}

impl<F: FieldOperators> Column<F> for SetColumn<F> {
    fn new(column_index: Index, dimension: Dimension, _field: &F) -> Self {
        Self {
            cells: BTreeMap::new(),
            column_index,
            dimension,
        }
    }

    fn from_cells<R: RowAccess>(
        column_index: Index,
        dimension: Dimension,
        cells: impl IntoIterator<Item = Cell<F::Element>>,
        field: &F,
        rows: &mut R,
    ) -> Self {
        let cells: BTreeMap<_, _> = normalize_cells(cells, field)
            .into_iter()
            .map(|cell| (cell.row, cell.value))
            .collect();
        for &row in cells.keys() {
            rows.insert_cell(row, column_index);
        }
        Self {
            cells,
            column_index,
            dimension,
        }
    }

    fn column_index(&self) -> Index {
        self.column_index
    }

    fn set_column_index(&mut self, column_index: Index) {
        self.column_index = column_index;
    }

    fn dimension(&self) -> Dimension {
        self.dimension
    }

    fn pivot(&mut self) -> Option<Index> {
        self.cells.keys().next_back().copied()
    }

    fn pivot_value(&mut self) -> Option<F::Element> {
        self.cells.values().next_back().copied()
    }

    fn value_at(&self, row: Index) -> Option<F::Element> {
        self.cells.get(&row).copied()
    }

    fn is_empty(&mut self) -> bool {
        self.cells.is_empty()
    }

    fn entries(&self) -> Vec<Cell<F::Element>> {
        self.cells
            .iter()
            .map(|(&row, &value)| Cell::new(row, value))
            .collect()
    }

    fn len(&self) -> usize {
        self.cells.len()
    }

    fn merge_scaled<R: RowAccess>(
        &mut self,
        source: &Self,
        target_coefficient: F::Element,
        source_coefficient: F::Element,
        field: &F,
        rows: &mut R,
    ) {
        if target_coefficient != field.multiplicative_identity() {
            self.scale(target_coefficient, field, rows);
        }
        for (&row, &value) in &source.cells {
            let value = field.multiply(value, source_coefficient);
            if field.is_zero(value) {
                continue;
            }
            match self.cells.get_mut(&row) {
                Some(existing) => {
                    *existing = field.add(*existing, value);
                    if field.is_zero(*existing) {
                        self.cells.remove(&row);
                        rows.unlink(row, self.column_index);
                    }
                }
                None => {
                    self.cells.insert(row, value);
                    rows.insert_cell(row, self.column_index);
                }
            }
        }
    }

    fn scale<R: RowAccess>(&mut self, coefficient: F::Element, field: &F, rows: &mut R) {
        let column = self.column_index;
        self.cells.retain(|&row, value| {
            *value = field.multiply(*value, coefficient);
            if field.is_zero(*value) {
                rows.unlink(row, column);
                false
            } else {
                true
            }
        });
    }

    fn clear<R: RowAccess>(&mut self, rows: &mut R) {
        for &row in self.cells.keys() {
            rows.unlink(row, self.column_index);
        }
        self.cells.clear();
    }

    fn clear_row<R: RowAccess>(&mut self, row: Index, rows: &mut R) {
        if self.cells.remove(&row).is_some() {
            rows.unlink(row, self.column_index);
        }
    }

    fn reorder<R: RowAccess>(&mut self, row_map: &[Index], rows: &mut R) {
        let old = std::mem::take(&mut self.cells);
        if R::IS_ACTIVE {
            for &row in old.keys() {
                rows.unlink(row, self.column_index);
            }
        }
        self.cells = old
            .into_iter()
            .map(|(row, value)| (map_row(row_map, row), value))
            .collect();
        if R::IS_ACTIVE {
            for &row in self.cells.keys() {
                rows.insert_cell(row, self.column_index);
            }
        }
    }
}
