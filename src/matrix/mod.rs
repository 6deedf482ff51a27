//! Matrix Module: Base, Boundary and Chain Matrices
//!
//! Every matrix owns an ordered collection of columns indexed by insertion
//! order and composes the optional components it needs instead of
//! inheriting them:
//!
//! - a [`DimensionTracker`] for the maximal dimension,
//! - a [`SwapTracker`] when `column_and_row_swaps` is enabled,
//! - a row sink, [`NoRowAccess`] or [`RowContainer`], chosen by type
//!   parameter,
//! - a cached barcode (boundary matrices with `column_pairings`).
//!
//! ## Variants
//!
//! - [`BaseMatrix`]: plain column container, no algebraic meaning attached.
//! - [`BoundaryMatrix`]: columns are face boundaries inserted in filtration
//!   order. Computing the barcode reduces the matrix in place.
//! - [`ChainMatrix`]: columns form a chain-compatible basis maintained at
//!   insertion. Supports vineyard updates over Z2.
//!
//! ## Lazy row swaps
//!
//! With `column_and_row_swaps`, row swaps only update the [`SwapTracker`].
//! The permutation is applied to the cells right before any read that
//! exposes row indices (columns, rows, pivots, insertion, barcode, removal
//! of a non-empty column). Point queries such as `is_zero_cell` translate
//! the row instead.
//!
//! [`NoRowAccess`]: crate::rows::NoRowAccess
//! [`RowContainer`]: crate::rows::RowContainer

mod base;
mod boundary;
mod chain;
mod dimension;
mod options;
mod swap;
mod vine;

pub use base::BaseMatrix;
pub use boundary::BoundaryMatrix;
pub use chain::ChainMatrix;
pub use dimension::DimensionTracker;
pub use options::MatrixOptions;
pub use swap::SwapTracker;

use crate::column::{Column, Dimension};
use crate::field::FieldOperators;
use crate::rows::{Index, RowAccess};
use std::fmt;

/// What `remove_last` reports about the removed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovedColumn {
    /// Pivot of the column at removal time.
    pub pivot: Option<Index>,
    pub dimension: Dimension,
}

/// Two distinct elements of a slice, both mutably borrowed.
pub(crate) fn pair_mut<T>(items: &mut [T], first: usize, second: usize) -> (&mut T, &mut T) {
    assert_ne!(first, second, "cannot borrow the same column twice");
    if first < second {
        let (left, right) = items.split_at_mut(second);
        (&mut left[first], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(first);
        (&mut right[0], &mut left[second])
    }
}

/// Dimension used when the caller does not give one: boundary size minus one.
pub(crate) fn default_dimension(boundary_len: usize) -> Dimension {
    boundary_len.saturating_sub(1)
}

/// Exchanges the positions of columns `first` and `second`, keeping the row
/// sink consistent. Both columns are unlinked before either is relinked so
/// that cells sharing a row survive the relabeling.
pub(crate) fn swap_column_slots<F, C, R>(
    columns: &mut [C],
    rows: &mut R,
    first: Index,
    second: Index,
)
where
    F: FieldOperators,
    C: Column<F>,
    R: RowAccess,
{
    if first == second {
        return;
    }
    columns.swap(first, second);
    let (a, b) = pair_mut(columns, first, second);
    if R::IS_ACTIVE {
        for cell in a.entries() {
            rows.unlink(cell.row, second);
        }
        for cell in b.entries() {
            rows.unlink(cell.row, first);
        }
    }
    a.set_column_index(first);
    b.set_column_index(second);
    if R::IS_ACTIVE {
        for cell in a.entries() {
            rows.insert_cell(cell.row, first);
        }
        for cell in b.entries() {
            rows.insert_cell(cell.row, second);
        }
    }
}

/// Dense dump shared by the `Display` implementations: one line per column,
/// `-` for zero cells. `logical` maps a stored row to the row shown.
pub(crate) fn write_dense<F: FieldOperators>(
    f: &mut fmt::Formatter<'_>,
    field: &F,
    columns: impl Iterator<Item = (Index, Vec<crate::column::Cell<F::Element>>)>,
    row_count: usize,
    logical: impl Fn(Index) -> Index,
) -> fmt::Result {
    for (index, cells) in columns {
        let mut line = vec![None; row_count];
        for cell in cells {
            let row = logical(cell.row);
            if row < row_count {
                line[row] = Some(field.to_u64(cell.value));
            }
        }
        write!(f, "{index:>4} |")?;
        for value in line {
            match value {
                Some(value) => write!(f, " {value}")?,
                None => write!(f, " -")?,
            }
        }
        writeln!(f)?;
    }
    Ok(())
}
