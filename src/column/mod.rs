//! Column Module: Sparse Columns over a Field
//!
//! A column is a sparse sequence of non-zero cells sorted by strictly
//! increasing row index. Its pivot is the largest row index present, or
//! `None` for the zero column.
//!
//! ## Strategies
//!
//! Every strategy implements the same [`Column`] contract and is picked by
//! type parameter when a matrix is declared, so dispatch is static.
//!
//! - [`VectorColumn`]: sorted vector, cache-friendly merges.
//! - [`SetColumn`]: ordered map, logarithmic point lookup and zeroing.
//! - [`ListColumn`]: arena-backed doubly linked list merged in place.
//! - [`HeapColumn`]: binary heap of pending cells. Additions are pushed
//!   without merging and only combined when the pivot or the content is
//!   queried.
//!
//! [`ChainColumn`] decorates any strategy with the cached pivot and the
//! pairing used by chain matrices.
//!
//! ## Row access
//!
//! Every mutating operation takes a [`RowAccess`] sink and reports each cell
//! it creates or removes. [`HeapColumn`] keeps cancelled cells around until
//! it prunes, so it cannot mirror its rows exactly; it does not implement
//! [`RowAccessColumn`] and matrices refuse to combine it with a
//! [`RowContainer`](crate::rows::RowContainer).

mod chain;
mod heap;
mod list;
mod set;
mod vector;

pub use chain::{ChainColumn, PivotMap};
pub use heap::HeapColumn;
pub use list::ListColumn;
pub use set::SetColumn;
pub use vector::VectorColumn;

use crate::field::FieldOperators;
use crate::rows::{Index, RowAccess};
use std::fmt;

/// Dimension of the face represented by a column.
pub type Dimension = usize;

/// A non-zero entry of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell<E> {
    pub row: Index,
    pub value: E,
}

impl<E> Cell<E> {
    pub fn new(row: Index, value: E) -> Self {
        Self { row, value }
    }
}

/// Marker for strategies that keep their row sink exact after every call.
pub trait RowAccessColumn {}

/// Sparse column over the field `F`.
///
/// Additions, zeroing and reordering never validate their input: keeping the
/// matrix meaningful is the caller's job.
pub trait Column<F: FieldOperators>: Clone + fmt::Debug {
    /// Empty column. Strategies that combine cells lazily keep a copy of
    /// the field context.
    fn new(column_index: Index, dimension: Dimension, field: &F) -> Self;

    /// Column holding `cells`. Cells may come in any order; cells sharing a
    /// row are summed and zero sums are dropped. Every created cell is
    /// reported to `rows`.
    fn from_cells<R: RowAccess>(
        column_index: Index,
        dimension: Dimension,
        cells: impl IntoIterator<Item = Cell<F::Element>>,
        field: &F,
        rows: &mut R,
    ) -> Self;

    fn column_index(&self) -> Index;

    /// Changes the index used when talking to the row sink. The caller is
    /// responsible for relinking the cells.
    fn set_column_index(&mut self, column_index: Index);

    fn dimension(&self) -> Dimension;

    /// Largest row with a non-zero cell.
    fn pivot(&mut self) -> Option<Index>;

    /// Value of the cell at the pivot.
    fn pivot_value(&mut self) -> Option<F::Element>;

    /// Value at `row`, `None` when the cell is zero.
    fn value_at(&self, row: Index) -> Option<F::Element>;

    fn is_non_zero(&self, row: Index) -> bool {
        self.value_at(row).is_some()
    }

    fn is_empty(&mut self) -> bool {
        self.pivot().is_none()
    }

    /// Non-zero cells, sorted by row.
    fn entries(&self) -> Vec<Cell<F::Element>>;

    /// Number of non-zero cells.
    fn len(&self) -> usize {
        self.entries().len()
    }

    /// `self = self * target_coefficient + source * source_coefficient`.
    ///
    /// Every strategy implements this merge; the public additions below are
    /// expressed through it.
    fn merge_scaled<R: RowAccess>(
        &mut self,
        source: &Self,
        target_coefficient: F::Element,
        source_coefficient: F::Element,
        field: &F,
        rows: &mut R,
    );

    /// `self += source`
    fn add<R: RowAccess>(&mut self, source: &Self, field: &F, rows: &mut R) {
        let one = field.multiplicative_identity();
        self.merge_scaled(source, one, one, field, rows);
    }

    /// `self = self * coefficient + source`
    fn multiply_target_and_add<R: RowAccess>(
        &mut self,
        coefficient: F::Element,
        source: &Self,
        field: &F,
        rows: &mut R,
    ) {
        let one = field.multiplicative_identity();
        self.merge_scaled(source, coefficient, one, field, rows);
    }

    /// `self = self + source * coefficient`
    fn multiply_source_and_add<R: RowAccess>(
        &mut self,
        source: &Self,
        coefficient: F::Element,
        field: &F,
        rows: &mut R,
    ) {
        let one = field.multiplicative_identity();
        self.merge_scaled(source, one, coefficient, field, rows);
    }

    /// `self *= coefficient`. Cells whose product vanishes are removed, so
    /// scaling by zero (or by a zero divisor of a multi-field) clears them.
    fn scale<R: RowAccess>(&mut self, coefficient: F::Element, field: &F, rows: &mut R);

    /// Removes every cell.
    fn clear<R: RowAccess>(&mut self, rows: &mut R);

    /// Removes the cell at `row`, if any.
    fn clear_row<R: RowAccess>(&mut self, row: Index, rows: &mut R);

    /// Relabels every cell: the cell at row `r` moves to `row_map[r]`. Rows
    /// past the end of the map keep their index. The map must be a
    /// permutation.
    fn reorder<R: RowAccess>(&mut self, row_map: &[Index], rows: &mut R);
}

/// Image of `row` under a row permutation stored as a vector.
#[inline]
pub(crate) fn map_row(row_map: &[Index], row: Index) -> Index {
    row_map.get(row).copied().unwrap_or(row)
}

/// Sorts `cells` by row, sums duplicates and drops zeros.
pub(crate) fn normalize_cells<F: FieldOperators>(
    cells: impl IntoIterator<Item = Cell<F::Element>>,
    field: &F,
) -> Vec<Cell<F::Element>> {
    let mut cells: Vec<_> = cells.into_iter().collect();
    cells.sort_by_key(|cell| cell.row);
    let mut normalized: Vec<Cell<F::Element>> = Vec::with_capacity(cells.len());
    for cell in cells {
        match normalized.last_mut() {
            Some(last) if last.row == cell.row => last.value = field.add(last.value, cell.value),
            _ => {
                if let Some(last) = normalized.last() {
                    if field.is_zero(last.value) {
                        normalized.pop();
                    }
                }
                normalized.push(cell);
            }
        }
    }
    if normalized.last().is_some_and(|last| field.is_zero(last.value)) {
        normalized.pop();
    }
    normalized
}

/// Unit-coefficient cells for a list of row indices.
pub fn unit_cells<F: FieldOperators>(
    field: &F,
    rows: impl IntoIterator<Item = Index>,
) -> impl Iterator<Item = Cell<F::Element>> {
    let one = field.multiplicative_identity();
    rows.into_iter().map(move |row| Cell::new(row, one))
}

#[cfg(test)]
pub(crate) mod tests {
    //! Contract checks shared by every strategy.

    use super::*;
    use crate::field::{Z2Field, ZpField};
    use crate::rows::RowContainer;

    fn rows_of<F: FieldOperators, C: Column<F>>(column: &C) -> Vec<Index> {
        column.entries().iter().map(|cell| cell.row).collect()
    }

    fn z2<C: Column<Z2Field>>(rows: &[Index]) -> C {
        let cells = unit_cells(&Z2Field, rows.iter().copied());
        C::from_cells(0, 1, cells, &Z2Field, &mut crate::rows::NoRowAccess)
    }

    pub(crate) fn check_z2_contract<C: Column<Z2Field>>() {
        let field = Z2Field;
        let mut none = crate::rows::NoRowAccess;

        let mut empty: C = C::new(3, 0, &field);
        assert!(empty.is_empty());
        assert_eq!(empty.pivot(), None);
        assert_eq!(empty.column_index(), 3);
        assert_eq!(empty.len(), 0);

        // Duplicates cancel on construction.
        let mut a: C = z2(&[5, 1, 3, 1, 1]);
        assert_eq!(rows_of::<Z2Field, C>(&a), vec![1, 3, 5]);
        assert_eq!(a.pivot(), Some(5));
        assert_eq!(a.pivot_value(), Some(true));
        assert!(a.is_non_zero(3));
        assert!(!a.is_non_zero(2));
        assert_eq!(a.dimension(), 1);

        let b: C = z2(&[0, 3, 5, 7]);
        a.add(&b, &field, &mut none);
        assert_eq!(rows_of::<Z2Field, C>(&a), vec![0, 1, 7]);
        assert_eq!(a.pivot(), Some(7));

        // Adding twice restores the target.
        a.add(&b, &field, &mut none);
        assert_eq!(rows_of::<Z2Field, C>(&a), vec![1, 3, 5]);

        a.clear_row(5, &mut none);
        assert_eq!(a.pivot(), Some(3));
        a.clear_row(4, &mut none);
        assert_eq!(a.len(), 2);

        // row r goes to 4 - r
        a.reorder(&[4, 3, 2, 1, 0], &mut none);
        assert_eq!(rows_of::<Z2Field, C>(&a), vec![1, 3]);
        assert_eq!(a.pivot(), Some(3));

        a.scale(false, &field, &mut none);
        assert!(a.is_empty());

        let mut c: C = z2(&[2, 4]);
        c.multiply_target_and_add(false, &b, &field, &mut none);
        assert_eq!(rows_of::<Z2Field, C>(&c), vec![0, 3, 5, 7]);
        c.clear(&mut none);
        assert!(c.is_empty());
    }

    pub(crate) fn check_zp_contract<C: Column<ZpField>>() {
        let field = ZpField::new(5).unwrap();
        let mut none = crate::rows::NoRowAccess;
        let cells = |pairs: &[(Index, u32)]| {
            pairs
                .iter()
                .map(|&(row, value)| Cell::new(row, value))
                .collect::<Vec<_>>()
        };

        let mut a =
            C::from_cells(0, 1, cells(&[(4, 2), (1, 3), (4, 3), (2, 1)]), &field, &mut none);
        // 2 + 3 = 0 at row 4
        assert_eq!(a.entries(), cells(&[(1, 3), (2, 1)]));
        assert_eq!(a.pivot(), Some(2));
        assert_eq!(a.value_at(1), Some(3));

        let b = C::from_cells(1, 1, cells(&[(1, 1), (2, 4), (6, 2)]), &field, &mut none);
        // a + 2b = (1: 3+2, 2: 1+8, 6: 4) = (2: 4, 6: 4)
        a.multiply_source_and_add(&b, 2, &field, &mut none);
        assert_eq!(a.entries(), cells(&[(2, 4), (6, 4)]));

        // 3a + b = (1: 1, 2: 12+4, 6: 12+2) = (1: 1, 2: 1, 6: 4)
        a.multiply_target_and_add(3, &b, &field, &mut none);
        assert_eq!(a.entries(), cells(&[(1, 1), (2, 1), (6, 4)]));
        assert_eq!(a.pivot_value(), Some(4));

        // subtracting restores
        let before = a.entries();
        a.add(&b, &field, &mut none);
        a.multiply_source_and_add(&b, field.additive_inverse(1), &field, &mut none);
        assert_eq!(a.entries(), before);

        a.scale(2, &field, &mut none);
        assert_eq!(a.entries(), cells(&[(1, 2), (2, 2), (6, 3)]));
    }

    pub(crate) fn check_row_access<C: Column<Z2Field> + RowAccessColumn>() {
        let field = Z2Field;
        let mut rows = RowContainer::new(false);
        let mut a = C::from_cells(0, 1, unit_cells(&field, [0, 2]), &field, &mut rows);
        let b = C::from_cells(1, 1, unit_cells(&field, [2, 3]), &field, &mut rows);

        a.add(&b, &field, &mut rows);
        assert!(rows.row(0).unwrap().contains(0));
        assert!(!rows.row(2).unwrap().contains(0));
        assert!(rows.row(2).unwrap().contains(1));
        assert!(rows.row(3).unwrap().contains(0));

        // swap rows 0 and 3
        a.reorder(&[3, 1, 2, 0], &mut rows);
        assert_eq!(rows_of::<Z2Field, C>(&a), vec![0, 3]);
        assert!(rows.row(0).unwrap().contains(0));
        assert!(rows.row(3).unwrap().contains(0));

        a.clear_row(3, &mut rows);
        assert!(!rows.row(3).unwrap().contains(0));
        a.clear(&mut rows);
        assert!(rows.row(0).unwrap().is_empty());
    }

    #[test]
    fn test_normalize_cells() {
        let field = ZpField::new(3).unwrap();
        let cells = [Cell::new(2, 1), Cell::new(0, 2), Cell::new(2, 2), Cell::new(1, 1)];
        assert_eq!(
            normalize_cells(cells, &field),
            vec![Cell::new(0, 2), Cell::new(1, 1)]
        );
        let cancelling = [Cell::new(0, 1), Cell::new(0, 2), Cell::new(1, 1)];
        assert_eq!(normalize_cells(cancelling, &field), vec![Cell::new(1, 1)]);
    }
}
