//! Chain matrix: a compatible basis of chains maintained at insertion.
//!
//! Every face is the pivot of exactly one chain. Pivots are compared by
//! filtration position, which starts as the insertion order and changes
//! under vine swaps. Chains fall in three groups:
//!
//! - unpaired cycles, each an essential class born at its pivot,
//! - paired cycles, which are boundaries of their partner,
//! - paired chains whose boundary is their partner.
//!
//! A paired cycle is born at its pivot and dies at the pivot of its
//! partner, so the barcode is read directly from pivots, pairings and
//! positions.
//!
//! Over a multi-field, a face whose boundary scales an unpaired cycle by a
//! zero divisor would pair differently depending on the prime. One basis
//! cannot hold both answers, so such an insertion is rejected with
//! [`MatrixError::ZeroDivisorPivot`] and leaves the matrix untouched.

use super::{pair_mut, write_dense, DimensionTracker, MatrixOptions, RemovedColumn};
use crate::barcode::{Bar, Barcode};
use crate::column::{unit_cells, Cell, ChainColumn, Column, Dimension, PivotMap, RowAccessColumn};
use crate::error::{Error, MatrixError, Result};
use crate::field::FieldOperators;
use crate::rows::{Index, NoRowAccess, Row, RowAccess, RowContainer};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, trace};

/// Column-reduced chain basis of a filtered complex.
#[derive(Debug, Clone)]
pub struct ChainMatrix<F: FieldOperators, C: Column<F>, R: RowAccess = NoRowAccess> {
    pub(super) field: F,
    /// Removed chains leave a hole until every later column is gone.
    pub(super) columns: Vec<Option<ChainColumn<F, C>>>,
    live_columns: usize,
    pub(super) rows: R,
    pub(super) pivot_to_column: PivotMap,
    /// Face identifier -> filtration position.
    pub(super) positions: HashMap<Index, Index>,
    /// Filtration position -> face identifier.
    pub(super) id_at: Vec<Index>,
    next_id: Index,
    dimensions: DimensionTracker,
    options: MatrixOptions,
}

impl<F: FieldOperators, C: Column<F>> ChainMatrix<F, C, NoRowAccess> {
    pub fn new(field: F, options: MatrixOptions) -> Self {
        Self::build(field, options, NoRowAccess)
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

impl<F: FieldOperators, C: Column<F> + RowAccessColumn> ChainMatrix<F, C, RowContainer> {
    pub fn with_row_access(field: F, options: MatrixOptions) -> Self {
        let rows = RowContainer::new(options.removable_rows);
        Self::build(field, options, rows)
    }

    /// Chains containing face `row`.
    pub fn get_row(&self, row: Index) -> Option<&Row> {
        self.rows.row(row)
    }
}

impl<F: FieldOperators, C: Column<F>, R: RowAccess> ChainMatrix<F, C, R> {
    fn build(field: F, options: MatrixOptions, rows: R) -> Self {
        Self {
            field,
            columns: Vec::new(),
            live_columns: 0,
            rows,
            pivot_to_column: PivotMap::new(),
            positions: HashMap::new(),
            id_at: Vec::new(),
            next_id: 0,
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

    /// Inserts the next face, identified by the smallest identifier not used
    /// yet, and returns the index of its chain.
    ///
    /// # Panics
    ///
    /// If `boundary` references a face that is not in the matrix, if every
    /// identifier below `Index::MAX` is taken, or on the zero divisor pivots
    /// that [`ChainMatrix::insert_signed_boundary`] reports.
    pub fn insert_boundary(&mut self, boundary: &[Index], dimension: Option<Dimension>) -> Index {
        let id = self.next_id;
        if id == Index::MAX {
            panic!("{}", MatrixError::IdentifierOutOfRange { id });
        }
        let cells: Vec<_> = unit_cells(&self.field, boundary.iter().copied()).collect();
        let dimension = dimension.unwrap_or_else(|| super::default_dimension(boundary.len()));
        match self.reduce_boundary(id, cells, dimension) {
            Ok(index) => index,
            Err(err) => panic!("{err}"),
        }
    }

    /// Inserts face `id`, rejecting unknown faces in the boundary and
    /// identifiers already in use.
    pub fn insert_boundary_with_id(
        &mut self,
        id: Index,
        boundary: &[Index],
        dimension: Option<Dimension>,
    ) -> Result<Index> {
        let cells: Vec<_> = unit_cells(&self.field, boundary.iter().copied()).collect();
        let dimension = dimension.unwrap_or_else(|| super::default_dimension(boundary.len()));
        self.insert_signed_boundary(id, cells, dimension)
    }

    /// Inserts face `id` with explicit boundary coefficients.
    pub fn insert_signed_boundary(
        &mut self,
        id: Index,
        cells: impl IntoIterator<Item = Cell<F::Element>>,
        dimension: Dimension,
    ) -> Result<Index> {
        if id.checked_add(1).is_none() {
            return Err(MatrixError::IdentifierOutOfRange { id }.into());
        }
        if self.positions.contains_key(&id) {
            return Err(MatrixError::DuplicateFace { id }.into());
        }
        let cells: Vec<_> = cells.into_iter().collect();
        if let Some(unknown) = cells.iter().find(|cell| !self.positions.contains_key(&cell.row)) {
            return Err(MatrixError::UnknownFace { id: unknown.row }.into());
        }
        self.reduce_boundary(id, cells, dimension)
    }

    /// Reduces the boundary of `id` against the basis and inserts its chain.
    ///
    /// The boundary is a cycle, so it reduces to zero using unpaired cycles
    /// and paired cycles only. A paired cycle is replaced by its partner in
    /// the new chain. If unpaired cycles were needed, the youngest of them
    /// absorbs the others, becomes the boundary of the new chain and is
    /// paired with it.
    ///
    /// Nothing is modified before the pairing is known to hold in every
    /// characteristic.
    fn reduce_boundary(
        &mut self,
        id: Index,
        cells: Vec<Cell<F::Element>>,
        dimension: Dimension,
    ) -> Result<Index> {
        let one = self.field.multiplicative_identity();
        let mut workspace = BTreeMap::new();
        accumulate(&mut workspace, cells, one, &self.field, &self.positions);

        let mut partners: Vec<(Index, F::Element)> = Vec::new();
        let mut unpaired: Vec<(Index, F::Element)> = Vec::new();
        while let Some((&position, &value)) = workspace.last_key_value() {
            let owner = self.pivot_to_column[&self.id_at[position]];
            let chain = self.chain(owner);
            let pivot_value = chain.pivot_value().unwrap_or(one);
            if !self.field.is_invertible(pivot_value) {
                return Err(self.zero_divisor(id, pivot_value));
            }
            let coefficient = self.field.multiply(
                self.field.multiplicative_inverse(pivot_value),
                self.field.additive_inverse(value),
            );
            accumulate(&mut workspace, chain.entries(), coefficient, &self.field, &self.positions);
            match chain.get_paired_chain_index() {
                Some(partner) => partners.push((partner, coefficient)),
                None => unpaired.push((owner, self.field.additive_inverse(coefficient))),
            }
        }

        let mut chain_cells = vec![Cell::new(id, one)];
        for &(partner, coefficient) in &partners {
            chain_cells.extend(self.chain(partner).entries().into_iter().map(|cell| {
                Cell::new(cell.row, self.field.multiply(cell.value, coefficient))
            }));
        }

        // the youngest cycle becomes a boundary only where its scale is a unit
        if let Some(&(_, scale)) = unpaired.first() {
            if !self.field.is_invertible(scale) {
                return Err(self.zero_divisor(id, scale));
            }
        }

        let death_of = unpaired.first().map(|&(youngest, _)| youngest);
        if let Some((&(youngest, scale), others)) = unpaired.split_first() {
            {
                let Self { field, columns, rows, .. } = self;
                if let Some(chain) = columns[youngest].as_mut() {
                    chain.column_mut().scale(scale, field, rows);
                }
            }
            for &(other, coefficient) in others {
                self.combine(other, youngest, |target, source, field, rows, pivots| {
                    target.multiply_source_and_add(source, coefficient, field, rows, pivots)
                });
            }
        }

        let index = self.push_chain(id, chain_cells, dimension);
        if let Some(youngest) = death_of {
            self.chain_mut(youngest).assign_paired_chain(index);
            self.chain_mut(index).assign_paired_chain(youngest);
        }
        trace!(
            id,
            index,
            partners = partners.len(),
            unpaired = unpaired.len(),
            "chain inserted"
        );
        Ok(index)
    }

    fn zero_divisor(&self, id: Index, value: F::Element) -> Error {
        let characteristics = self.field.vanishing_characteristics(value);
        debug!(id, ?characteristics, "insertion rejected on a zero divisor pivot");
        MatrixError::ZeroDivisorPivot { id, characteristics }.into()
    }

    fn push_chain(
        &mut self,
        id: Index,
        cells: Vec<Cell<F::Element>>,
        dimension: Dimension,
    ) -> Index {
        self.rows.reserve_row(id);
        self.positions.insert(id, self.id_at.len());
        self.id_at.push(id);
        self.next_id = self.next_id.max(id + 1);

        let index = self.columns.len();
        let column = C::from_cells(index, dimension, cells, &self.field, &mut self.rows);
        self.columns.push(Some(ChainColumn::new(column, id)));
        self.pivot_to_column.insert(id, index);
        self.live_columns += 1;
        self.dimensions.update_up(dimension);
        index
    }

    pub(super) fn chain(&self, column: Index) -> &ChainColumn<F, C> {
        match self.columns.get(column) {
            Some(Some(chain)) => chain,
            _ => panic!("no chain at column {column}"),
        }
    }

    fn chain_mut(&mut self, column: Index) -> &mut ChainColumn<F, C> {
        match self.columns.get_mut(column) {
            Some(Some(chain)) => chain,
            _ => panic!("no chain at column {column}"),
        }
    }

    /// Applies `op(target, source, ..)` to two distinct live chains.
    pub(super) fn combine(
        &mut self,
        source: Index,
        target: Index,
        op: impl FnOnce(&mut ChainColumn<F, C>, &mut ChainColumn<F, C>, &F, &mut R, &mut PivotMap),
    ) {
        let Self { field, columns, rows, pivot_to_column, .. } = self;
        let (target_slot, source_slot) = pair_mut(columns, target, source);
        match (target_slot.as_mut(), source_slot.as_mut()) {
            (Some(target), Some(source)) => op(target, source, field, rows, pivot_to_column),
            _ => panic!("cannot combine removed chains {source} and {target}"),
        }
    }

    pub fn get_column(&self, column: Index) -> &ChainColumn<F, C> {
        self.chain(column)
    }

    /// Column of the chain whose pivot is face `id`.
    pub fn get_column_with_pivot(&self, id: Index) -> Option<Index> {
        self.pivot_to_column.get(&id).copied()
    }

    /// Pivot face of the chain at `column`.
    pub fn get_pivot(&self, column: Index) -> Index {
        self.chain(column).pivot()
    }

    pub fn get_paired_chain_index(&self, column: Index) -> Option<Index> {
        self.chain(column).get_paired_chain_index()
    }

    pub fn is_paired(&self, column: Index) -> bool {
        self.chain(column).is_paired()
    }

    /// Filtration position of face `id`.
    pub fn position_of(&self, id: Index) -> Option<Index> {
        self.positions.get(&id).copied()
    }

    /// Face at filtration position `position`.
    pub fn id_at_position(&self, position: Index) -> Option<Index> {
        self.id_at.get(position).copied()
    }

    /// Removes the face at the last filtration position together with its
    /// chain, the only chain containing it. Returns `None` on an empty
    /// matrix.
    pub fn remove_last(&mut self) -> Option<RemovedColumn> {
        let id = *self.id_at.last()?;
        let index = self.pivot_to_column.remove(&id)?;
        let mut chain = self.columns.get_mut(index)?.take()?;
        if let Some(partner) = chain.get_paired_chain_index() {
            self.chain_mut(partner).unassign_paired_chain();
        }
        chain.column_mut().clear(&mut self.rows);
        self.rows.erase_row(id);
        let dimension = chain.dimension();
        self.dimensions.update_down(dimension);

        self.id_at.pop();
        self.positions.remove(&id);
        if id + 1 == self.next_id {
            self.next_id = self.id_at.iter().max().map_or(0, |max| max + 1);
        }
        while matches!(self.columns.last(), Some(None)) {
            self.columns.pop();
        }
        self.live_columns -= 1;
        debug!(id, index, dimension, "last face removed");
        Some(RemovedColumn { pivot: Some(id), dimension })
    }

    /// Number of live chains.
    pub fn get_number_of_columns(&self) -> usize {
        self.live_columns
    }

    pub fn get_column_dimension(&self, column: Index) -> Dimension {
        self.chain(column).dimension()
    }

    pub fn get_max_dimension(&self) -> Option<Dimension> {
        self.dimensions.max_dimension()
    }

    /// `target += source`, keeping pivots unique. Keeping the basis valid
    /// is the caller's job.
    pub fn add_to(&mut self, source: Index, target: Index) {
        self.combine(source, target, |target, source, field, rows, pivots| {
            target.add(source, field, rows, pivots)
        });
    }

    /// `target = target * coefficient + source`
    pub fn multiply_target_and_add_to(
        &mut self,
        source: Index,
        coefficient: F::Element,
        target: Index,
    ) {
        self.combine(source, target, |target, source, field, rows, pivots| {
            target.multiply_target_and_add(coefficient, source, field, rows, pivots)
        });
    }

    /// `target = target + coefficient * source`
    pub fn multiply_source_and_add_to(
        &mut self,
        coefficient: F::Element,
        source: Index,
        target: Index,
    ) {
        self.combine(source, target, |target, source, field, rows, pivots| {
            target.multiply_source_and_add(source, coefficient, field, rows, pivots)
        });
    }

    pub fn is_zero_cell(&self, column: Index, row: Index) -> bool {
        !self.chain(column).is_non_zero(row)
    }

    pub fn is_zero_column(&self, column: Index) -> bool {
        self.chain(column).entries().is_empty()
    }

    /// Barcode in filtration positions.
    pub fn get_current_barcode(&self) -> Barcode {
        let mut bars = Vec::new();
        for chain in self.columns.iter().flatten() {
            let birth = self.positions[&chain.pivot()];
            match chain.get_paired_chain_index() {
                None => bars.push(Bar::essential(birth, chain.dimension())),
                Some(partner) => {
                    let death = self.positions[&self.chain(partner).pivot()];
                    if birth < death {
                        bars.push(Bar::finite(birth, death, chain.dimension()));
                    }
                }
            }
        }
        Barcode::from_bars(bars)
    }

    /// Live chains, by column index.
    pub fn iter_columns(&self) -> impl Iterator<Item = &ChainColumn<F, C>> {
        self.columns.iter().flatten()
    }
}

/// `workspace += coefficient * cells`, with the workspace keyed by filtration
/// position.
fn accumulate<F: FieldOperators>(
    workspace: &mut BTreeMap<Index, F::Element>,
    cells: impl IntoIterator<Item = Cell<F::Element>>,
    coefficient: F::Element,
    field: &F,
    positions: &HashMap<Index, Index>,
) {
    for cell in cells {
        let value = field.multiply(cell.value, coefficient);
        match workspace.entry(positions[&cell.row]) {
            Entry::Occupied(mut entry) => {
                let sum = field.add(*entry.get(), value);
                if field.is_zero(sum) {
                    entry.remove();
                } else {
                    *entry.get_mut() = sum;
                }
            }
            Entry::Vacant(entry) => {
                if !field.is_zero(value) {
                    entry.insert(value);
                }
            }
        }
    }
}

impl<F: FieldOperators, C: Column<F>, R: RowAccess> fmt::Display for ChainMatrix<F, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Chain matrix ({} columns):", self.live_columns)?;
        let columns: Vec<_> = self
            .iter_columns()
            .map(|chain| (chain.column_index(), chain.entries()))
            .collect();
        write_dense(f, &self.field, columns.into_iter(), self.next_id, |row| row)
    }
}
