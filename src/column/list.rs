//! Column stored as a doubly linked list of cells.
//!
//! Nodes live in an arena (`Vec`) and link to each other by slot index;
//! freed slots are recycled. Additions walk the target list once and splice
//! source cells in place, so a merge never reallocates the existing cells.

use super::{map_row, normalize_cells, Cell, Column, Dimension, RowAccessColumn};
use crate::field::FieldOperators;
use crate::rows::{Index, RowAccess};

#[derive(Debug, Clone)]
struct Node<E> {
    cell: Cell<E>,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Doubly linked list of cells sorted by row.
#[derive(Debug, Clone)]
pub struct ListColumn<F: FieldOperators> {
    nodes: Vec<Node<F::Element>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    column_index: Index,
    dimension: Dimension,
}

impl<F: FieldOperators> ListColumn<F> {
    fn iter(&self) -> ListIter<'_, F::Element> {
        ListIter {
            nodes: &self.nodes,
            current: self.head,
        }
    }

    fn find(&self, row: Index) -> Option<usize> {
        let mut current = self.head;
        while let Some(slot) = current {
            let node = &self.nodes[slot];
            if node.cell.row == row {
                return Some(slot);
            }
            if node.cell.row > row {
                return None;
            }
            current = node.next;
        }
        None
    }

    fn allocate(&mut self, cell: Cell<F::Element>) -> usize {
        let node = Node {
            cell,
            prev: None,
            next: None,
        };
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    /// Links a new cell before `next` (at the tail when `next` is `None`).
    fn insert_before(&mut self, next: Option<usize>, cell: Cell<F::Element>) {
        let slot = self.allocate(cell);
        let prev = match next {
            Some(n) => self.nodes[n].prev,
            None => self.tail,
        };
        self.nodes[slot].prev = prev;
        self.nodes[slot].next = next;
        match prev {
            Some(p) => self.nodes[p].next = Some(slot),
            None => self.head = Some(slot),
        }
        match next {
            Some(n) => self.nodes[n].prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.len += 1;
    }

    /// Unlinks `slot` and returns the slot that followed it.
    fn remove_node(&mut self, slot: usize) -> Option<usize> {
        let (prev, next) = (self.nodes[slot].prev, self.nodes[slot].next);
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        self.free.push(slot);
        self.len -= 1;
        next
    }

    fn rebuild(&mut self, cells: Vec<Cell<F::Element>>) {
        self.nodes.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
        for cell in cells {
            self.insert_before(None, cell);
        }
    }
}

struct ListIter<'a, E> {
    nodes: &'a [Node<E>],
    current: Option<usize>,
}

impl<'a, E: Copy> Iterator for ListIter<'a, E> {
    type Item = Cell<E>;

    fn next(&mut self) -> Option<Cell<E>> {
        let node = &self.nodes[self.current?];
        self.current = node.next;
        Some(node.cell)
    }
}

impl<F: FieldOperators> RowAccessColumn for ListColumn<F> {}

impl<F: FieldOperators> Column<F> for ListColumn<F> {
    fn new(column_index: Index, dimension: Dimension, _field: &F) -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
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
        let mut column = Self::new(column_index, dimension, field);
        let cells = normalize_cells(cells, field);
        for cell in &cells {
            rows.insert_cell(cell.row, column_index);
        }
        column.rebuild(cells);
        column
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
        self.tail.map(|slot| self.nodes[slot].cell.row)
    }

    fn pivot_value(&mut self) -> Option<F::Element> {
        self.tail.map(|slot| self.nodes[slot].cell.value)
    }

    fn value_at(&self, row: Index) -> Option<F::Element> {
        self.find(row).map(|slot| self.nodes[slot].cell.value)
    }

    fn is_empty(&mut self) -> bool {
        self.head.is_none()
    }

    fn entries(&self) -> Vec<Cell<F::Element>> {
        self.iter().collect()
    }

    fn len(&self) -> usize {
        self.len
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
        let scale_target = target_coefficient != field.multiplicative_identity();
        let mut current = self.head;

        for incoming in source.iter() {
            // Target cells with a smaller row only get scaled.
            while let Some(slot) = current {
                if self.nodes[slot].cell.row >= incoming.row {
                    break;
                }
                current = if scale_target {
                    let value = field.multiply(self.nodes[slot].cell.value, target_coefficient);
                    if field.is_zero(value) {
                        rows.unlink(self.nodes[slot].cell.row, column);
                        self.remove_node(slot)
                    } else {
                        self.nodes[slot].cell.value = value;
                        self.nodes[slot].next
                    }
                } else {
                    self.nodes[slot].next
                };
            }

            let scaled = field.multiply(incoming.value, source_coefficient);
            match current {
                Some(slot) if self.nodes[slot].cell.row == incoming.row => {
                    let current_value = self.nodes[slot].cell.value;
                    let value = field.multiply_and_add(current_value, target_coefficient, scaled);
                    current = if field.is_zero(value) {
                        rows.unlink(incoming.row, column);
                        self.remove_node(slot)
                    } else {
                        self.nodes[slot].cell.value = value;
                        self.nodes[slot].next
                    };
                }
                _ => {
                    if !field.is_zero(scaled) {
                        self.insert_before(current, Cell::new(incoming.row, scaled));
                        rows.insert_cell(incoming.row, column);
                    }
                }
            }
        }

        if scale_target {
            while let Some(slot) = current {
                let value = field.multiply(self.nodes[slot].cell.value, target_coefficient);
                current = if field.is_zero(value) {
                    rows.unlink(self.nodes[slot].cell.row, column);
                    self.remove_node(slot)
                } else {
                    self.nodes[slot].cell.value = value;
                    self.nodes[slot].next
                };
            }
        }
    }

    fn scale<R: RowAccess>(&mut self, coefficient: F::Element, field: &F, rows: &mut R) {
        let mut current = self.head;
        while let Some(slot) = current {
            let value = field.multiply(self.nodes[slot].cell.value, coefficient);
            current = if field.is_zero(value) {
                rows.unlink(self.nodes[slot].cell.row, self.column_index);
                self.remove_node(slot)
            } else {
                self.nodes[slot].cell.value = value;
                self.nodes[slot].next
            };
        }
    }

    fn clear<R: RowAccess>(&mut self, rows: &mut R) {
        for cell in self.iter() {
            rows.unlink(cell.row, self.column_index);
        }
        self.rebuild(Vec::new());
    }

    fn clear_row<R: RowAccess>(&mut self, row: Index, rows: &mut R) {
        if let Some(slot) = self.find(row) {
            self.remove_node(slot);
            rows.unlink(row, self.column_index);
        }
    }

    fn reorder<R: RowAccess>(&mut self, row_map: &[Index], rows: &mut R) {
        let mut cells = self.entries();
        if R::IS_ACTIVE {
            for cell in &cells {
                rows.unlink(cell.row, self.column_index);
            }
        }
        for cell in &mut cells {
            cell.row = map_row(row_map, cell.row);
        }
        cells.sort_unstable_by_key(|cell| cell.row);
        if R::IS_ACTIVE {
            for cell in &cells {
                rows.insert_cell(cell.row, self.column_index);
            }
        }
        self.rebuild(cells);
    }
}
