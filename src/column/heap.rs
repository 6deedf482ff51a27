//! Lazy column backed by a binary heap.
//!
//! Additions only push the (scaled) source cells onto the heap. Cells sharing
//! a row are combined when the pivot is requested: the top of the heap is
//! popped together with every cell of the same row until a non-zero sum is
//! found. When the heap grows past twice its size after the last pruning,
//! it is pruned entirely.

use super::{map_row, normalize_cells, Cell, Column, Dimension};
use crate::field::FieldOperators;
use crate::rows::{Index, RowAccess};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Heap entry ordered by row only.
#[derive(Debug, Clone, Copy)]
struct Pending<E>(Cell<E>);

impl<E> PartialEq for Pending<E> {
    fn eq(&self, other: &Self) -> bool {
        self.0.row == other.0.row
    }
}

impl<E> Eq for Pending<E> {}

impl<E> PartialOrd for Pending<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Pending<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.row.cmp(&other.0.row)
    }
}

/// Column accumulating additions in a max-heap.
///
/// Cancelled cells stay in the heap until the next pruning, so the column
/// cannot report exact row events; the row sink passed to its methods is
/// ignored.
#[derive(Debug, Clone)]
pub struct HeapColumn<F: FieldOperators> {
    heap: BinaryHeap<Pending<F::Element>>,
    pruned_size: usize,
    field: F,
    column_index: Index,
    dimension: Dimension,
}

impl<F: FieldOperators> HeapColumn<F> {
    fn prune(&mut self) {
        let cells = normalize_cells(self.heap.drain().map(|p| p.0), &self.field);
        self.heap = cells.into_iter().map(Pending).collect();
        self.pruned_size = self.heap.len();
    }

    fn rebuild_with(&mut self, map: impl Fn(Cell<F::Element>) -> Cell<F::Element>) {
        let field = &self.field;
        self.heap = std::mem::take(&mut self.heap)
            .into_iter()
            .map(|p| map(p.0))
            .filter(|cell| !field.is_zero(cell.value))
            .map(Pending)
            .collect();
    }

    /// Number of pending cells, cancelled ones included.
    pub fn pending_len(&self) -> usize {
        self.heap.len()
    }
}

impl<F: FieldOperators> Column<F> for HeapColumn<F> {
    fn new(column_index: Index, dimension: Dimension, field: &F) -> Self {
        Self {
            heap: BinaryHeap::new(),
            pruned_size: 0,
            field: field.clone(),
            column_index,
            dimension,
        }
    }

    fn from_cells<R: RowAccess>(
        column_index: Index,
        dimension: Dimension,
        cells: impl IntoIterator<Item = Cell<F::Element>>,
        field: &F,
        _rows: &mut R,
    ) -> Self {
        let heap: BinaryHeap<_> = normalize_cells(cells, field).into_iter().map(Pending).collect();
        Self {
            pruned_size: heap.len(),
            heap,
            field: field.clone(),
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
        while let Some(Pending(top)) = self.heap.pop() {
            let mut value = top.value;
            while self.heap.peek().is_some_and(|next| next.0.row == top.row) {
                if let Some(Pending(next)) = self.heap.pop() {
                    value = self.field.add(value, next.value);
                }
            }
            if !self.field.is_zero(value) {
                self.heap.push(Pending(Cell::new(top.row, value)));
                return Some(top.row);
            }
        }
        None
    }

    fn pivot_value(&mut self) -> Option<F::Element> {
        self.pivot()?;
        self.heap.peek().map(|p| p.0.value)
    }

    fn value_at(&self, row: Index) -> Option<F::Element> {
        let value = self
            .heap
            .iter()
            .filter(|p| p.0.row == row)
            .fold(self.field.additive_identity(), |acc, p| self.field.add(acc, p.0.value));
        (!self.field.is_zero(value)).then_some(value)
    }

    fn entries(&self) -> Vec<Cell<F::Element>> {
        normalize_cells(self.heap.iter().map(|p| p.0), &self.field)
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
        for pending in source.heap.iter() {
            let value = field.multiply(pending.0.value, source_coefficient);
            if !field.is_zero(value) {
                self.heap.push(Pending(Cell::new(pending.0.row, value)));
            }
        }
        if self.heap.len() > 2 * self.pruned_size {
            self.prune();
        }
    }

    fn scale<R: RowAccess>(&mut self, coefficient: F::Element, field: &F, _rows: &mut R) {
        self.rebuild_with(|cell| Cell::new(cell.row, field.multiply(cell.value, coefficient)));
    }

    fn clear<R: RowAccess>(&mut self, _rows: &mut R) {
        self.heap.clear();
        self.pruned_size = 0;
    }

    fn clear_row<R: RowAccess>(&mut self, row: Index, _rows: &mut R) {
        self.heap.retain(|p| p.0.row != row);
    }

    fn reorder<R: RowAccess>(&mut self, row_map: &[Index], _rows: &mut R) {
        self.rebuild_with(|cell| Cell::new(map_row(row_map, cell.row), cell.value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::tests::{check_z2_contract, check_zp_contract};
    use crate::column::unit_cells;
    use crate::field::{Z2Field, ZpField};
    use crate::rows::NoRowAccess;

    #[test]
    fn test_heap_column_contract() {
        check_z2_contract::<HeapColumn<Z2Field>>();
        check_zp_contract::<HeapColumn<ZpField>>();
    }

    #[test]
    fn test_additions_are_lazy() {
        let field = Z2Field;
        let mut none = NoRowAccess;
        let mut column = HeapColumn::from_cells(0, 1, unit_cells(&field, 0..8), &field, &mut none);
        let source = HeapColumn::from_cells(1, 1, unit_cells(&field, [6, 7]), &field, &mut none);

        column.add(&source, &field, &mut none);
        // 8 pruned cells + 2 pending, below the pruning threshold
        assert_eq!(column.pending_len(), 10);
        assert_eq!(column.len(), 6);

        // The pivot query combines the cancelled rows 7 and 6.
        assert_eq!(column.pivot(), Some(5));
        assert_eq!(column.pending_len(), 6);
    }

    #[test]
    fn test_pruning_threshold() {
        let field = Z2Field;
        let mut none = NoRowAccess;
        let mut column =
            HeapColumn::from_cells(0, 1, unit_cells(&field, [0, 1]), &field, &mut none);
        let source = HeapColumn::from_cells(1, 1, unit_cells(&field, [1, 2, 3]), &field, &mut none);

        // 2 + 3 > 2 * 2: the heap is pruned right away
        column.add(&source, &field, &mut none);
        assert_eq!(column.pending_len(), 3);
        assert_eq!(column.entries().iter().map(|c| c.row).collect::<Vec<_>>(), vec![0, 2, 3]);
    }
}
