//! Boundary matrix and the pairing engine.
//!
//! Column `i` holds the boundary of the `i`-th face of the filtration, with
//! rows indexed by face identifiers. By default the identifier of a face is
//! its insertion index; [`BoundaryMatrix::insert_boundary_with_id`] lets the
//! caller pick identifiers, which must then be mapped back to columns when
//! reading bars.
//!
//! ## Reduction
//!
//! Columns are processed one dimension at a time, highest first. A column
//! is reduced left to right against the columns that already own its pivot;
//! once its pivot is new, the face owning the pivot row is a birth and its
//! own column is cleared without being reduced ("twist").
//!
//! Over a multi-field a pivot value may vanish modulo some of the packed
//! primes. The pairing then depends on the prime: the reduction stops at the
//! first such pivot, reduces the projection of the columns onto every prime
//! field separately and returns a split barcode whose bars record the
//! characteristics they hold for.

use super::{default_dimension, BaseMatrix, MatrixOptions, RemovedColumn};
use crate::barcode::{Bar, Barcode};
use crate::column::{unit_cells, Cell, Column, Dimension, RowAccessColumn};
use crate::error::{MatrixError, Result};
use crate::field::FieldOperators;
use crate::rows::{Index, NoRowAccess, Row, RowAccess, RowContainer};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// Filtered boundary matrix computing its barcode by reduction.
#[derive(Debug, Clone)]
pub struct BoundaryMatrix<F: FieldOperators, C: Column<F>, R: RowAccess = NoRowAccess> {
    base: BaseMatrix<F, C, R>,
    /// Face identifier of every column.
    ids: Vec<Index>,
    column_of_id: HashMap<Index, Index>,
    next_id: Index,
    barcode: Barcode,
    barcode_is_current: bool,
}

impl<F: FieldOperators, C: Column<F>> BoundaryMatrix<F, C, NoRowAccess> {
    pub fn new(field: F, options: MatrixOptions) -> Self {
        Self::from_base(BaseMatrix::new(field, options))
    }

    /// Matrix holding `boundaries` in order, dimensions deduced from the
    /// boundary sizes.
    pub fn from_boundaries<B: AsRef<[Index]>>(
        field: F,
        options: MatrixOptions,
        boundaries: impl IntoIterator<Item = B>,
    ) -> Self {
        let mut matrix = Self::new(field, options);
        for boundary in boundaries {
            matrix.insert_boundary(boundary.as_ref(), None);
        }
        matrix
    }
}

impl<F: FieldOperators, C: Column<F> + RowAccessColumn> BoundaryMatrix<F, C, RowContainer> {
    pub fn with_row_access(field: F, options: MatrixOptions) -> Self {
        Self::from_base(BaseMatrix::with_row_access(field, options))
    }

    /// Columns with a non-zero cell in the row of face `row`.
    pub fn get_row(&mut self, row: Index) -> Option<&Row> {
        self.base.get_row(row)
    }
}

impl<F: FieldOperators, C: Column<F>, R: RowAccess> BoundaryMatrix<F, C, R> {
    fn from_base(base: BaseMatrix<F, C, R>) -> Self {
        Self {
            base,
            ids: Vec::new(),
            column_of_id: HashMap::new(),
            next_id: 0,
            barcode: Barcode::new(),
            barcode_is_current: false,
        }
    }

    pub fn field(&self) -> &F {
        self.base.field()
    }

    /// Appends the boundary of the next face, identified by the smallest
    /// identifier not used yet. Returns the new column index.
    ///
    /// Faces of `boundary` must already be in the matrix; this is not
    /// checked.
    ///
    /// # Panics
    ///
    /// If every identifier below `Index::MAX` is taken.
    pub fn insert_boundary(&mut self, boundary: &[Index], dimension: Option<Dimension>) -> Index {
        let id = self.next_id;
        if id == Index::MAX {
            panic!("{}", MatrixError::IdentifierOutOfRange { id });
        }
        let cells: Vec<_> = unit_cells(self.base.field(), boundary.iter().copied()).collect();
        let dimension = dimension.unwrap_or_else(|| default_dimension(boundary.len()));
        self.push_face(id, cells, dimension)
    }

    /// Appends the boundary of face `id`, rejecting unknown faces in the
    /// boundary and identifiers already in use.
    pub fn insert_boundary_with_id(
        &mut self,
        id: Index,
        boundary: &[Index],
        dimension: Option<Dimension>,
    ) -> Result<Index> {
        self.check_new_face(id)?;
        if let Some(&unknown) = boundary.iter().find(|face| !self.column_of_id.contains_key(face)) {
            return Err(MatrixError::UnknownFace { id: unknown }.into());
        }
        let cells: Vec<_> = unit_cells(self.base.field(), boundary.iter().copied()).collect();
        let dimension = dimension.unwrap_or_else(|| default_dimension(boundary.len()));
        Ok(self.push_face(id, cells, dimension))
    }

    /// Appends face `id` with explicit coefficients, as produced by signed
    /// boundaries over Zp.
    pub fn insert_signed_boundary(
        &mut self,
        id: Index,
        cells: impl IntoIterator<Item = Cell<F::Element>>,
        dimension: Dimension,
    ) -> Result<Index> {
        self.check_new_face(id)?;
        let cells: Vec<_> = cells.into_iter().collect();
        let unknown = cells.iter().find(|cell| !self.column_of_id.contains_key(&cell.row));
        if let Some(unknown) = unknown {
            return Err(MatrixError::UnknownFace { id: unknown.row }.into());
        }
        Ok(self.push_face(id, cells, dimension))
    }

    /// Identifiers stay below `Index::MAX` so that `id + 1` is always the
    /// next automatic one.
    fn check_new_face(&self, id: Index) -> Result<()> {
        if id.checked_add(1).is_none() {
            return Err(MatrixError::IdentifierOutOfRange { id }.into());
        }
        if self.column_of_id.contains_key(&id) {
            return Err(MatrixError::DuplicateFace { id }.into());
        }
        Ok(())
    }

    fn push_face(
        &mut self,
        id: Index,
        cells: Vec<Cell<F::Element>>,
        dimension: Dimension,
    ) -> Index {
        self.base.reserve_row(id);
        let index = self.base.insert_column(cells, dimension);
        self.ids.push(id);
        self.column_of_id.insert(id, index);
        self.next_id = self.next_id.max(id + 1);
        self.barcode_is_current = false;
        index
    }

    pub fn get_column(&mut self, column: Index) -> &C {
        self.base.get_column(column)
    }

    /// Face identifier of the column at `column`.
    pub fn get_id(&self, column: Index) -> Index {
        self.ids[column]
    }

    /// Column of face `id`, if it is in the matrix.
    pub fn get_column_of_id(&self, id: Index) -> Option<Index> {
        self.column_of_id.get(&id).copied()
    }

    /// Removes the last face. Returns `None` on an empty matrix.
    ///
    /// With `column_pairings`, a barcode computed before the removal is
    /// updated instead of discarded, unless it is split between
    /// characteristics.
    pub fn remove_last(&mut self) -> Option<RemovedColumn> {
        let removed = self.base.remove_last()?;
        let index = self.ids.len() - 1;
        if let Some(id) = self.ids.pop() {
            self.column_of_id.remove(&id);
            self.base.erase_row(id);
            if id + 1 == self.next_id {
                self.next_id = self.ids.iter().max().map_or(0, |max| max + 1);
            }
        }
        let updatable = self.base.options().column_pairings && !self.barcode.is_split();
        if self.barcode_is_current && updatable {
            self.barcode.forget_column(index);
        } else {
            self.barcode_is_current = false;
        }
        Some(removed)
    }

    pub fn erase_row(&mut self, row: Index) {
        self.base.erase_row(row);
    }

    pub fn get_number_of_columns(&self) -> usize {
        self.base.get_number_of_columns()
    }

    pub fn get_column_dimension(&self, column: Index) -> Dimension {
        self.base.get_column_dimension(column)
    }

    pub fn get_max_dimension(&self) -> Option<Dimension> {
        self.base.get_max_dimension()
    }

    /// `target += source`. The caller keeps the matrix meaningful.
    pub fn add_to(&mut self, source: Index, target: Index) {
        self.barcode_is_current = false;
        self.base.add_to(source, target);
    }

    /// `target = target * coefficient + source`
    pub fn multiply_target_and_add_to(
        &mut self,
        source: Index,
        coefficient: F::Element,
        target: Index,
    ) {
        self.barcode_is_current = false;
        self.base.multiply_target_and_add_to(source, coefficient, target);
    }

    /// `target = target + coefficient * source`
    pub fn multiply_source_and_add_to(
        &mut self,
        coefficient: F::Element,
        source: Index,
        target: Index,
    ) {
        self.barcode_is_current = false;
        self.base.multiply_source_and_add_to(coefficient, source, target);
    }

    pub fn zero_cell(&mut self, column: Index, row: Index) {
        self.barcode_is_current = false;
        self.base.zero_cell(column, row);
    }

    pub fn zero_column(&mut self, column: Index) {
        self.barcode_is_current = false;
        self.base.zero_column(column);
    }

    pub fn is_zero_cell(&self, column: Index, row: Index) -> bool {
        self.base.is_zero_cell(column, row)
    }

    pub fn is_zero_column(&mut self, column: Index) -> bool {
        self.base.is_zero_column(column)
    }

    pub fn get_pivot(&mut self, column: Index) -> Option<Index> {
        self.base.get_pivot(column)
    }

    /// Exchanges two columns together with their face identifiers.
    pub fn swap_columns(&mut self, first: Index, second: Index) {
        self.barcode_is_current = false;
        self.base.swap_columns(first, second);
        self.ids.swap(first, second);
        self.column_of_id.insert(self.ids[first], first);
        self.column_of_id.insert(self.ids[second], second);
    }

    pub fn swap_rows(&mut self, first: Index, second: Index) {
        self.barcode_is_current = false;
        self.base.swap_rows(first, second);
    }

    /// Barcode of the current filtration, births and deaths as column
    /// indices. Reduces the matrix in place.
    pub fn get_current_barcode(&mut self) -> &Barcode {
        if !(self.barcode_is_current && self.base.options().column_pairings) {
            self.barcode = self.reduce();
            self.barcode_is_current = true;
        }
        &self.barcode
    }

    fn reduce(&mut self) -> Barcode {
        self.base.materialize();
        if let Some(barcode) = reduce_pass(&mut self.base, &self.column_of_id, true) {
            return barcode;
        }

        let field = self.base.field().clone();
        let components = field.components();
        debug!(components = components.len(), "zero divisor pivot, reducing each prime field");
        let mut holds_for: BTreeMap<Bar, u64> = BTreeMap::new();
        for (characteristic, idempotent) in components {
            let mut projection = self.base.clone();
            for column in 0..projection.get_number_of_columns() {
                projection.scale_column(column, idempotent);
            }
            match reduce_pass(&mut projection, &self.column_of_id, false) {
                Some(barcode) => {
                    for bar in barcode.bars {
                        *holds_for.entry(bar).or_insert(1) *= characteristic;
                    }
                }
                None => debug!(characteristic, "projected reduction made no progress"),
            }
        }

        let everywhere = field.characteristic();
        let bars = holds_for
            .into_iter()
            .map(|(bar, product)| {
                if product == everywhere {
                    bar
                } else {
                    bar.restricted_to(product)
                }
            })
            .collect();
        Barcode::from_bars(bars)
    }

    /// Removes every column.
    pub fn reset(&mut self) {
        self.base.reset();
        self.ids.clear();
        self.column_of_id.clear();
        self.next_id = 0;
        self.barcode = Barcode::new();
        self.barcode_is_current = false;
    }
}

/// One twist reduction of `base`, highest dimension first.
///
/// With `units_only`, gives up and returns `None` at the first new pivot
/// whose value is not invertible. Every pass returns `None` if an addition
/// leaves the pivot in place, which only a zero divisor can cause.
fn reduce_pass<F: FieldOperators, C: Column<F>, R: RowAccess>(
    base: &mut BaseMatrix<F, C, R>,
    column_of_id: &HashMap<Index, Index>,
    units_only: bool,
) -> Option<Barcode> {
    let field = base.field().clone();
    let one = field.multiplicative_identity();
    let column_count = base.get_number_of_columns();
    let Some(max_dimension) = base.get_max_dimension() else {
        return Some(Barcode::new());
    };

    let mut by_dimension: Vec<Vec<Index>> = vec![Vec::new(); max_dimension + 1];
    for column in 0..column_count {
        by_dimension[base.get_column_dimension(column)].push(column);
    }

    let mut pivot_owner: HashMap<Index, Index> = HashMap::new();
    let mut births: HashSet<Index> = HashSet::new();
    let mut barcode = Barcode::new();
    let mut additions = 0usize;

    for (dimension, columns) in by_dimension.iter().enumerate().rev() {
        for &column in columns {
            if births.contains(&column) {
                continue;
            }
            let mut pivot = base.get_pivot(column);
            while let Some(&owner) = pivot.and_then(|p| pivot_owner.get(&p)) {
                // -(target pivot value) / (source pivot value)
                let target_value = base.pivot_value(column).unwrap_or(one);
                let source_value = base.pivot_value(owner).unwrap_or(one);
                let ratio =
                    field.multiply(target_value, field.multiplicative_inverse(source_value));
                base.multiply_source_and_add_to(field.additive_inverse(ratio), owner, column);
                additions += 1;
                let next = base.get_pivot(column);
                if next == pivot {
                    debug!(column, owner, "pivot did not cancel");
                    return None;
                }
                pivot = next;
            }
            match pivot {
                Some(pivot) => {
                    let value = base.pivot_value(column).unwrap_or(one);
                    if units_only && !field.is_invertible(value) {
                        debug!(column, pivot, "pivot value is a zero divisor");
                        return None;
                    }
                    pivot_owner.insert(pivot, column);
                    let birth = column_of_id.get(&pivot).copied().unwrap_or(pivot);
                    births.insert(birth);
                    if birth < column_count {
                        base.zero_column(birth);
                    }
                    barcode.push(Bar::finite(birth, column, dimension.saturating_sub(1)));
                }
                None => barcode.push(Bar::essential(column, dimension)),
            }
        }
    }

    barcode.sort();
    debug!(columns = column_count, bars = barcode.len(), additions, "boundary matrix reduced");
    Some(barcode)
}

impl<F: FieldOperators, C: Column<F>, R: RowAccess> fmt::Display for BoundaryMatrix<F, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Boundary matrix ({} columns):", self.ids.len())?;
        self.base.write_columns(f)
    }
}
