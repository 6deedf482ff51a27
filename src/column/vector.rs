//! Column stored as a sorted vector of cells.

use super::{map_row, normalize_cells, Cell, Column, Dimension, RowAccessColumn};
use crate::field::FieldOperators;
use crate::rows::{Index, RowAccess};

/// Sorted `Vec` of cells. Additions are linear merges into a fresh buffer;
/// the pivot is the last cell.
#[derive(Debug, Clone)]
pub struct VectorColumn<F: FieldOperators> {
    cells: Vec<Cell<F::Element>>,
    column_index: Index,
    dimension: Dimension,
}

impl<F: FieldOperators> VectorColumn<F> {
    fn position(&self, row: Index) -> Result<usize, usize> {
        self.cells.binary_search_by_key(&row, |cell| cell.row)
    }
}

impl<F: FieldOperators> RowAccessColumn for VectorColumn<F> {}

impl<F: FieldOperators> Column<F> for VectorColumn<F> {
    fn new(column_index: Index, dimension: Dimension, _field: &F) -> Self {
        Self {
            cells: Vec::new(),
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
        let cells = normalize_cells(cells, field);
        for cell in &cells {
            rows.insert_cell(cell.row, column_index);
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
        self.cells.last().map(|cell| cell.row)
    }

    fn pivot_value(&mut self) -> Option<F::Element> {
        self.cells.last().map(|cell| cell.value)
    }

    fn value_at(&self, row: Index) -> Option<F::Element> {
        self.position(row).ok().map(|i| self.cells[i].value)
    }

    fn is_empty(&mut self) -> bool {
        self.cells.is_empty()
    }

    fn entries(&self) -> Vec<Cell<F::Element>> {
        self.cells.clone()
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
        let column = self.column_index;
        let target = std::mem::take(&mut self.cells);
        let mut merged = Vec::with_capacity(target.len() + source.cells.len());
        let mut keep = |cell: Cell<F::Element>, existed: bool, rows: &mut R| {
            if field.is_zero(cell.value) {
                if existed {
                    rows.unlink(cell.row, column);
                }
            } else {
                if !existed {
                    rows.insert_cell(cell.row, column);
                }
                merged.push(cell);
            }
        };

        let mut t = target.into_iter().peekable();
        let mut s = source.cells.iter().copied().peekable();
        loop {
            match (t.peek().copied(), s.peek().copied()) {
                (Some(a), Some(b)) if a.row < b.row => {
                    t.next();
                    keep(Cell::new(a.row, field.multiply(a.value, target_coefficient)), true, rows);
                }
                (Some(a), Some(b)) if a.row > b.row => {
                    s.next();
                    let value = field.multiply(b.value, source_coefficient);
                    keep(Cell::new(b.row, value), false, rows);
                }
                (Some(a), Some(b)) => {
                    t.next();
                    s.next();
                    let value = field.multiply_and_add(
                        a.value,
                        target_coefficient,
                        field.multiply(b.value, source_coefficient),
                    );
                    keep(Cell::new(a.row, value), true, rows);
                }
                (Some(a), None) => {
                    t.next();
                    keep(Cell::new(a.row, field.multiply(a.value, target_coefficient)), true, rows);
                }
                (None, Some(b)) => {
                    s.next();
                    let value = field.multiply(b.value, source_coefficient);
                    keep(Cell::new(b.row, value), false, rows);
                }
                (None, None) => break,
            }
        }
        self.cells = merged;
    }

    fn scale<R: RowAccess>(&mut self, coefficient: F::Element, field: &F, rows: &mut R) {
        let column = self.column_index;
        self.cells.retain_mut(|cell| {
            cell.value = field.multiply(cell.value, coefficient);
            if field.is_zero(cell.value) {
                rows.unlink(cell.row, column);
                false
            } else {
                true
            }
        });
    }

    fn clear<R: RowAccess>(&mut self, rows: &mut R) {
        for cell in self.cells.drain(..) {
            rows.unlink(cell.row, self.column_index);
        }
    }

    fn clear_row<R: RowAccess>(&mut self, row: Index, rows: &mut R) {
        if let Ok(i) = self.position(row) {
            self.cells.remove(i);
            rows.unlink(row, self.column_index);
        }
    }

    fn reorder<R: RowAccess>(&mut self, row_map: &[Index], rows: &mut R) {
        if R::IS_ACTIVE {
            for cell in &self.cells {
                rows.unlink(cell.row, self.column_index);
            }
        }
        for cell in &mut self.cells {
            cell.row = map_row(row_map, cell.row);
        }
        self.cells.sort_unstable_by_key(|cell| cell.row);
        if R::IS_ACTIVE {
            for cell in &self.cells {
                rows.insert_cell(cell.row, self.column_index);
            }
        }
    }
}
