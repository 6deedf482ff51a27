//! Property tests for the persistence matrices.
//!
//! Random complexes on six vertices are reduced with every column strategy
//! and checked against the algebraic facts the barcode relies on.

mod common;

use common::{arb_filtration, init_test_logging, permute_boundaries, test_proptest_config};
use proptest::prelude::*;
use tda_persistence_matrix::{
    Bar,
    BaseMatrix,
    BoundaryMatrix,
    ChainMatrix,
    Column,
    FieldOperators,
    HeapColumn,
    Index,
    ListColumn,
    MatrixOptions,
    RowAccessColumn,
    RowContainer,
    SetColumn,
    VectorColumn,
    Z2Field,
    ZpField,
};

// ============================================================================
// Helpers
// ============================================================================

fn z3() -> ZpField {
    ZpField::new(3).unwrap()
}

fn boundary_bars<F: FieldOperators, C: Column<F>>(
    field: F,
    options: MatrixOptions,
    boundaries: &[Vec<Index>],
) -> Vec<Bar> {
    let mut matrix: BoundaryMatrix<F, C> =
        BoundaryMatrix::from_boundaries(field, options, boundaries);
    matrix.get_current_barcode().sorted_pairs()
}

fn chain_bars<F: FieldOperators, C: Column<F>>(field: F, boundaries: &[Vec<Index>]) -> Vec<Bar> {
    let matrix: ChainMatrix<F, C> =
        ChainMatrix::from_boundaries(field, MatrixOptions::default(), boundaries);
    matrix.get_current_barcode().sorted_pairs()
}

/// Reduces and checks that non-zero columns have distinct pivots and that
/// every finite bar is read off a pivot.
fn check_reduced<F: FieldOperators, C: Column<F>>(
    field: F,
    boundaries: &[Vec<Index>],
) -> Result<(), TestCaseError> {
    let mut matrix: BoundaryMatrix<F, C> =
        BoundaryMatrix::from_boundaries(field, MatrixOptions::default(), boundaries);
    let barcode = matrix.get_current_barcode().clone();

    let mut seen = std::collections::HashSet::new();
    for column in 0..matrix.get_number_of_columns() {
        if let Some(pivot) = matrix.get_pivot(column) {
            prop_assert!(seen.insert(pivot), "pivot {} owned twice", pivot);
        }
    }
    for bar in barcode.iter() {
        match bar.death {
            Some(death) => prop_assert_eq!(matrix.get_pivot(death), Some(bar.birth)),
            None => prop_assert!(matrix.is_zero_column(bar.birth)),
        }
    }

    let finite = barcode.iter().filter(|bar| !bar.is_essential()).count();
    prop_assert_eq!(2 * finite + (barcode.len() - finite), boundaries.len());
    Ok(())
}

/// Applies a random mix of additions, swaps, zeroings and removals, then
/// checks that rows and columns list the same cells.
fn check_rows_match_columns<C: Column<Z2Field> + RowAccessColumn>(
    boundaries: &[Vec<Index>],
    operations: &[(u8, usize, usize)],
    options: MatrixOptions,
) -> Result<(), TestCaseError> {
    let mut matrix: BaseMatrix<Z2Field, C, RowContainer> =
        BaseMatrix::with_row_access(Z2Field, options);
    for boundary in boundaries {
        matrix.insert_boundary(boundary, None);
    }
    let row_count = boundaries.len();
    for &(kind, a, b) in operations {
        let n = matrix.get_number_of_columns();
        if n == 0 {
            break;
        }
        match kind % 8 {
            0 | 1 => matrix.add_to(a % n, b % n),
            2 => matrix.swap_columns(a % n, b % n),
            3 => matrix.swap_rows(a % row_count, b % row_count),
            4 => matrix.zero_cell(a % n, b % row_count),
            5 => matrix.zero_column(a % n),
            _ => {
                matrix.remove_last();
            }
        }
    }

    let n = matrix.get_number_of_columns();
    for column in 0..n {
        let rows: Vec<Index> =
            matrix.get_column(column).entries().iter().map(|cell| cell.row).collect();
        for row in rows {
            let linked = matrix.get_row(row).is_some_and(|r| r.contains(column));
            prop_assert!(linked, "cell ({}, {}) missing from its row", row, column);
        }
    }
    for row in 0..row_count {
        let columns: Vec<Index> =
            matrix.get_row(row).map(|r| r.iter().collect()).unwrap_or_default();
        for column in columns {
            prop_assert!(column < n, "row {} lists removed column {}", row, column);
            prop_assert!(
                !matrix.is_zero_cell(column, row),
                "row {} lists a zero cell of {}",
                row,
                column
            );
        }
    }
    Ok(())
}

fn eager_and_lazy_agree<C: Column<Z2Field>>(
    boundaries: &[Vec<Index>],
    swaps: &[(usize, usize)],
) -> Result<(), TestCaseError> {
    let mut eager: BaseMatrix<Z2Field, C> = BaseMatrix::new(Z2Field, MatrixOptions::default());
    let mut lazy: BaseMatrix<Z2Field, C> =
        BaseMatrix::new(Z2Field, MatrixOptions::default().with_column_and_row_swaps(true));
    for boundary in boundaries {
        eager.insert_boundary(boundary, None);
        lazy.insert_boundary(boundary, None);
    }
    let n = boundaries.len();
    for &(a, b) in swaps {
        eager.swap_rows(a % n, b % n);
        lazy.swap_rows(a % n, b % n);
    }
    for column in 0..n {
        let expected = eager.get_column(column).entries();
        prop_assert_eq!(lazy.get_column(column).entries(), expected);
    }
    Ok(())
}

fn addition_is_involutive<C: Column<Z2Field>>(
    boundaries: &[Vec<Index>],
    source: usize,
    target: usize,
) -> Result<(), TestCaseError> {
    let mut matrix: BaseMatrix<Z2Field, C> = BaseMatrix::new(Z2Field, MatrixOptions::default());
    for boundary in boundaries {
        matrix.insert_boundary(boundary, None);
    }
    let n = boundaries.len();
    let (source, target) = (source % n, target % n);
    if source == target {
        return Ok(());
    }
    let before = matrix.get_column(target).entries();
    matrix.add_to(source, target);
    matrix.add_to(source, target);
    prop_assert_eq!(matrix.get_column(target).entries(), before);
    Ok(())
}

fn removal_inverts_insertion<C: Column<Z2Field>>(
    boundaries: &[Vec<Index>],
) -> Result<(), TestCaseError> {
    let prefix = &boundaries[..boundaries.len() - 1];
    let expected =
        boundary_bars::<Z2Field, VectorColumn<Z2Field>>(Z2Field, MatrixOptions::default(), prefix);

    let options = MatrixOptions::default().with_column_pairings(true);
    let mut matrix: BoundaryMatrix<Z2Field, C> =
        BoundaryMatrix::from_boundaries(Z2Field, options, boundaries);
    matrix.get_current_barcode();
    matrix.remove_last();
    prop_assert_eq!(matrix.get_current_barcode().sorted_pairs(), expected.clone());

    let mut chains: ChainMatrix<Z2Field, C> =
        ChainMatrix::from_boundaries(Z2Field, MatrixOptions::default(), boundaries);
    chains.remove_last();
    prop_assert_eq!(chains.get_current_barcode().sorted_pairs(), expected);
    Ok(())
}

// ============================================================================
// Boundary of a Boundary
// ============================================================================

proptest! {
    #![proptest_config(test_proptest_config(64))]

    /// Summing the signed boundaries of the faces of a simplex gives zero.
    #[test]
    fn boundary_of_boundary_vanishes(filtration in arb_filtration()) {
        init_test_logging();
        let field = z3();
        let signed = filtration.signed_boundaries(&field);
        let dimensions = filtration.dimensions();
        let mut matrix: BaseMatrix<ZpField, VectorColumn<ZpField>> =
            BaseMatrix::new(field, MatrixOptions::default());
        for (cells, &dimension) in signed.iter().zip(&dimensions) {
            matrix.insert_column(cells.clone(), dimension);
        }

        for cells in &signed {
            let accumulator = matrix.insert_column(Vec::new(), 0);
            for cell in cells {
                matrix.multiply_source_and_add_to(cell.value, cell.row, accumulator);
            }
            prop_assert!(matrix.is_zero_column(accumulator));
            matrix.remove_last();
        }
    }
}

// ============================================================================
// Reduction
// ============================================================================

proptest! {
    #![proptest_config(test_proptest_config(64))]

    #[test]
    fn reduced_pivots_are_unique(filtration in arb_filtration()) {
        init_test_logging();
        let boundaries = filtration.boundaries();
        check_reduced::<Z2Field, VectorColumn<Z2Field>>(Z2Field, &boundaries)?;
        check_reduced::<Z2Field, SetColumn<Z2Field>>(Z2Field, &boundaries)?;
        check_reduced::<Z2Field, ListColumn<Z2Field>>(Z2Field, &boundaries)?;
        check_reduced::<Z2Field, HeapColumn<Z2Field>>(Z2Field, &boundaries)?;
    }

    /// The barcode does not depend on the column strategy nor on lazy swaps.
    #[test]
    fn strategies_agree(filtration in arb_filtration()) {
        init_test_logging();
        let boundaries = filtration.boundaries();
        let options = MatrixOptions::default();
        let lazy = options.with_column_and_row_swaps(true);
        let expected =
            boundary_bars::<Z2Field, VectorColumn<Z2Field>>(Z2Field, options, &boundaries);
        let set = boundary_bars::<Z2Field, SetColumn<Z2Field>>(Z2Field, options, &boundaries);
        prop_assert_eq!(&set, &expected);
        let list = boundary_bars::<Z2Field, ListColumn<Z2Field>>(Z2Field, lazy, &boundaries);
        prop_assert_eq!(&list, &expected);
        let heap = boundary_bars::<Z2Field, HeapColumn<Z2Field>>(Z2Field, lazy, &boundaries);
        prop_assert_eq!(&heap, &expected);
    }

    /// Chain and boundary matrices compute the same pairs.
    #[test]
    fn chain_matches_boundary(filtration in arb_filtration()) {
        init_test_logging();
        let boundaries = filtration.boundaries();
        let options = MatrixOptions::default();
        let expected =
            boundary_bars::<Z2Field, VectorColumn<Z2Field>>(Z2Field, options, &boundaries);
        let vector = chain_bars::<Z2Field, VectorColumn<Z2Field>>(Z2Field, &boundaries);
        prop_assert_eq!(&vector, &expected);
        let set = chain_bars::<Z2Field, SetColumn<Z2Field>>(Z2Field, &boundaries);
        prop_assert_eq!(&set, &expected);
        let list = chain_bars::<Z2Field, ListColumn<Z2Field>>(Z2Field, &boundaries);
        prop_assert_eq!(&list, &expected);
        let heap = chain_bars::<Z2Field, HeapColumn<Z2Field>>(Z2Field, &boundaries);
        prop_assert_eq!(&heap, &expected);
    }

    /// Over Z3 with signed boundaries both matrix types agree as well.
    #[test]
    fn signed_chain_matches_boundary(filtration in arb_filtration()) {
        init_test_logging();
        let field = z3();
        let signed = filtration.signed_boundaries(&field);
        let dimensions = filtration.dimensions();

        let mut boundary: BoundaryMatrix<ZpField, SetColumn<ZpField>> =
            BoundaryMatrix::new(field.clone(), MatrixOptions::default());
        let mut chains: ChainMatrix<ZpField, VectorColumn<ZpField>> =
            ChainMatrix::new(field, MatrixOptions::default());
        for (id, (cells, &dimension)) in signed.iter().zip(&dimensions).enumerate() {
            prop_assert!(boundary.insert_signed_boundary(id, cells.clone(), dimension).is_ok());
            prop_assert!(chains.insert_signed_boundary(id, cells.clone(), dimension).is_ok());
        }
        prop_assert_eq!(
            chains.get_current_barcode().sorted_pairs(),
            boundary.get_current_barcode().sorted_pairs()
        );
    }

    #[test]
    fn removing_last_face_restores_prefix(filtration in arb_filtration()) {
        init_test_logging();
        let boundaries = filtration.boundaries();
        removal_inverts_insertion::<VectorColumn<Z2Field>>(&boundaries)?;
        removal_inverts_insertion::<SetColumn<Z2Field>>(&boundaries)?;
        removal_inverts_insertion::<ListColumn<Z2Field>>(&boundaries)?;
        removal_inverts_insertion::<HeapColumn<Z2Field>>(&boundaries)?;
    }
}

// ============================================================================
// Column Operations
// ============================================================================

proptest! {
    #![proptest_config(test_proptest_config(64))]

    #[test]
    fn z2_addition_is_involutive(
        filtration in arb_filtration(),
        source in any::<usize>(),
        target in any::<usize>(),
    ) {
        init_test_logging();
        let boundaries = filtration.boundaries();
        addition_is_involutive::<VectorColumn<Z2Field>>(&boundaries, source, target)?;
        addition_is_involutive::<SetColumn<Z2Field>>(&boundaries, source, target)?;
        addition_is_involutive::<ListColumn<Z2Field>>(&boundaries, source, target)?;
        addition_is_involutive::<HeapColumn<Z2Field>>(&boundaries, source, target)?;
    }

    #[test]
    fn rows_track_columns(
        filtration in arb_filtration(),
        operations in prop::collection::vec((any::<u8>(), any::<usize>(), any::<usize>()), 0..20),
    ) {
        init_test_logging();
        let boundaries = filtration.boundaries();
        let lazy = MatrixOptions::default().with_column_and_row_swaps(true);
        let eager = MatrixOptions::default();
        check_rows_match_columns::<VectorColumn<Z2Field>>(&boundaries, &operations, eager)?;
        check_rows_match_columns::<SetColumn<Z2Field>>(&boundaries, &operations, lazy)?;
        check_rows_match_columns::<ListColumn<Z2Field>>(&boundaries, &operations, lazy)?;
    }

    #[test]
    fn lazy_row_swaps_match_eager(
        filtration in arb_filtration(),
        swaps in prop::collection::vec((any::<usize>(), any::<usize>()), 0..12),
    ) {
        init_test_logging();
        let boundaries = filtration.boundaries();
        eager_and_lazy_agree::<VectorColumn<Z2Field>>(&boundaries, &swaps)?;
        eager_and_lazy_agree::<HeapColumn<Z2Field>>(&boundaries, &swaps)?;
    }
}

// ============================================================================
// Vineyards
// ============================================================================

proptest! {
    #![proptest_config(test_proptest_config(48))]

    /// After any sequence of legal transpositions the vineyard barcode is the
    /// barcode of the reordered filtration.
    #[test]
    fn vine_swaps_track_reduction(
        filtration in arb_filtration(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..25),
    ) {
        init_test_logging();
        let boundaries = filtration.boundaries();
        prop_assume!(boundaries.len() >= 2);

        let mut matrix: ChainMatrix<Z2Field, SetColumn<Z2Field>> =
            ChainMatrix::from_boundaries(Z2Field, MatrixOptions::default(), &boundaries);
        let mut order: Vec<Index> = (0..boundaries.len()).collect();
        for pick in picks {
            let position = pick.index(order.len() - 1);
            if boundaries[order[position + 1]].contains(&order[position]) {
                continue;
            }
            matrix.vine_swap_positions(position);
            order.swap(position, position + 1);

            let expected = boundary_bars::<Z2Field, VectorColumn<Z2Field>>(
                Z2Field,
                MatrixOptions::default(),
                &permute_boundaries(&boundaries, &order),
            );
            prop_assert_eq!(matrix.get_current_barcode().sorted_pairs(), expected);
        }
    }
}

// ============================================================================
// Field Additions, Chain Pivots and Removal
// ============================================================================

proptest! {
    #![proptest_config(test_proptest_config(64))]

    /// Over Z5, subtracting a scaled source after adding it restores the
    /// target.
    #[test]
    fn zp_scaled_addition_is_invertible(
        filtration in arb_filtration(),
        source in any::<usize>(),
        target in any::<usize>(),
        coefficient in 1u32..5,
    ) {
        init_test_logging();
        let field = ZpField::new(5).unwrap();
        let signed = filtration.signed_boundaries(&field);
        let dimensions = filtration.dimensions();
        let n = signed.len();
        let (source, target) = (source % n, target % n);
        if source == target {
            return Ok(());
        }

        let mut matrix: BaseMatrix<ZpField, ListColumn<ZpField>> =
            BaseMatrix::new(field.clone(), MatrixOptions::default());
        for (cells, &dimension) in signed.iter().zip(&dimensions) {
            matrix.insert_column(cells.clone(), dimension);
        }
        let before = matrix.get_column(target).entries();
        matrix.multiply_source_and_add_to(coefficient, source, target);
        matrix.multiply_source_and_add_to(field.additive_inverse(coefficient), source, target);
        prop_assert_eq!(matrix.get_column(target).entries(), before);
    }

    /// Additions between chains never leave two chains with the same pivot.
    #[test]
    fn chain_pivots_stay_unique(
        filtration in arb_filtration(),
        additions in prop::collection::vec((any::<usize>(), any::<usize>()), 0..20),
    ) {
        init_test_logging();
        let boundaries = filtration.boundaries();
        let mut matrix: ChainMatrix<Z2Field, VectorColumn<Z2Field>> =
            ChainMatrix::from_boundaries(Z2Field, MatrixOptions::default(), &boundaries);
        let n = matrix.get_number_of_columns();
        for (source, target) in additions {
            let (source, target) = (source % n, target % n);
            if source != target {
                matrix.add_to(source, target);
            }
        }

        let mut seen = std::collections::HashSet::new();
        for column in 0..n {
            let pivot = matrix.get_pivot(column);
            prop_assert!(seen.insert(pivot), "pivot {} owned twice", pivot);
            prop_assert_eq!(matrix.get_column_with_pivot(pivot), Some(column));
        }
    }

    /// Inserting a face and removing it again restores the column count,
    /// the maximal dimension and every row.
    #[test]
    fn removal_restores_rows(filtration in arb_filtration()) {
        init_test_logging();
        let boundaries = filtration.boundaries();
        let (last, prefix) = boundaries.split_last().unwrap();

        let mut matrix: BoundaryMatrix<Z2Field, SetColumn<Z2Field>, RowContainer> =
            BoundaryMatrix::with_row_access(Z2Field, MatrixOptions::default());
        for boundary in prefix {
            matrix.insert_boundary(boundary, None);
        }
        let rows_before: Vec<Vec<Index>> = (0..prefix.len())
            .map(|row| matrix.get_row(row).map(|r| r.iter().collect()).unwrap_or_default())
            .collect();
        let columns_before = matrix.get_number_of_columns();
        let dimension_before = matrix.get_max_dimension();

        matrix.insert_boundary(last, None);
        let removed = matrix.remove_last();
        prop_assert_eq!(removed.map(|r| r.dimension), Some(filtration.dimensions()[prefix.len()]));
        prop_assert_eq!(matrix.get_number_of_columns(), columns_before);
        prop_assert_eq!(matrix.get_max_dimension(), dimension_before);
        for (row, expected) in rows_before.iter().enumerate() {
            let actual: Vec<Index> =
                matrix.get_row(row).map(|r| r.iter().collect()).unwrap_or_default();
            prop_assert_eq!(&actual, expected);
        }
    }
}
