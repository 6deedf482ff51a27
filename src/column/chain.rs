//! Chain columns: a column plus the bookkeeping of chain matrices.
//!
//! A chain column caches its pivot (a face identifier) and the index of the
//! column it is paired with. The pivot is cached rather than recomputed
//! because, once faces are transposed in the filtration, the pivot is the
//! entry with the largest filtration position, not the largest row.
//!
//! All chain columns of a matrix share a [`PivotMap`]. When an addition
//! cancels the target's pivot, the target inherits the source's pivot: the
//! two map entries and the two cached pivots are swapped in the same call,
//! so at most one column owns any pivot at any time.

use super::{Cell, Column, Dimension};
use crate::field::FieldOperators;
use crate::rows::{Index, RowAccess};
use std::collections::HashMap;
use std::marker::PhantomData;

/// Pivot face identifier -> index of the column owning that pivot.
pub type PivotMap = HashMap<Index, Index>;

/// A column of a chain matrix.
#[derive(Debug, Clone)]
pub struct ChainColumn<F: FieldOperators, C: Column<F>> {
    column: C,
    pivot: Index,
    paired_chain: Option<Index>,
    _field: PhantomData<F>,
}

impl<F: FieldOperators, C: Column<F>> ChainColumn<F, C> {
    /// Wraps `column`, whose pivot is the face `pivot`.
    pub fn new(column: C, pivot: Index) -> Self {
        Self {
            column,
            pivot,
            paired_chain: None,
            _field: PhantomData,
        }
    }

    /// Face identifier owning this chain.
    pub fn pivot(&self) -> Index {
        self.pivot
    }

    /// Value of the chain at its pivot.
    pub fn pivot_value(&self) -> Option<F::Element> {
        self.column.value_at(self.pivot)
    }

    pub fn get_paired_chain_index(&self) -> Option<Index> {
        self.paired_chain
    }

    pub fn is_paired(&self) -> bool {
        self.paired_chain.is_some()
    }

    pub fn assign_paired_chain(&mut self, index: Index) {
        self.paired_chain = Some(index);
    }

    pub fn unassign_paired_chain(&mut self) {
        self.paired_chain = None;
    }

    pub fn column_index(&self) -> Index {
        self.column.column_index()
    }

    pub fn dimension(&self) -> Dimension {
        self.column.dimension()
    }

    pub fn is_non_zero(&self, row: Index) -> bool {
        self.column.is_non_zero(row)
    }

    pub fn value_at(&self, row: Index) -> Option<F::Element> {
        self.column.value_at(row)
    }

    pub fn entries(&self) -> Vec<Cell<F::Element>> {
        self.column.entries()
    }

    /// Underlying column.
    pub fn column(&self) -> &C {
        &self.column
    }

    pub(crate) fn column_mut(&mut self) -> &mut C {
        &mut self.column
    }

    /// `self += source`, with the pivot swap rule.
    pub fn add<R: RowAccess>(
        &mut self,
        source: &mut Self,
        field: &F,
        rows: &mut R,
        pivots: &mut PivotMap,
    ) {
        self.column.add(&source.column, field, rows);
        self.swap_pivot_if_cancelled(source, pivots);
    }

    /// `self = self * coefficient + source`, with the pivot swap rule.
    pub fn multiply_target_and_add<R: RowAccess>(
        &mut self,
        coefficient: F::Element,
        source: &mut Self,
        field: &F,
        rows: &mut R,
        pivots: &mut PivotMap,
    ) {
        self.column.multiply_target_and_add(coefficient, &source.column, field, rows);
        self.swap_pivot_if_cancelled(source, pivots);
    }

    /// `self = self + source * coefficient`, with the pivot swap rule.
    pub fn multiply_source_and_add<R: RowAccess>(
        &mut self,
        source: &mut Self,
        coefficient: F::Element,
        field: &F,
        rows: &mut R,
        pivots: &mut PivotMap,
    ) {
        self.column.multiply_source_and_add(&source.column, coefficient, field, rows);
        self.swap_pivot_if_cancelled(source, pivots);
    }

    fn swap_pivot_if_cancelled(&mut self, source: &mut Self, pivots: &mut PivotMap) {
        if self.column.is_non_zero(self.pivot) {
            return;
        }
        let mine = pivots.get(&self.pivot).copied();
        let theirs = pivots.get(&source.pivot).copied();
        if let (Some(mine), Some(theirs)) = (mine, theirs) {
            pivots.insert(self.pivot, theirs);
            pivots.insert(source.pivot, mine);
        }
        std::mem::swap(&mut self.pivot, &mut source.pivot);
    }
}
