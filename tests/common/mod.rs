//! Shared helpers for integration tests.

#![allow(dead_code)]

use proptest::prelude::*;
use std::sync::Once;
use tda_persistence_matrix::{FilteredSimplex, Filtration, Index};

static INIT_LOGGING: Once = Once::new();

/// Routes `tracing` output to the test harness. Safe to call from every
/// test.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .with_target(true)
            .with_ansi(false)
            .try_init();
    });
}

pub fn test_proptest_config(cases: u32) -> ProptestConfig {
    ProptestConfig { cases, ..ProptestConfig::default() }
}

/// Random complexes of dimension at most two on six vertices, closed under
/// faces.
pub fn arb_filtration() -> impl Strategy<Value = Filtration> {
    prop::collection::vec((prop::collection::btree_set(0usize..6, 1..=3), 0u8..8), 1..14).prop_map(
        |simplices| {
            Filtration::from_simplices(simplices.into_iter().map(|(vertices, value)| {
                FilteredSimplex::new(vertices.into_iter().collect(), f64::from(value))
            }))
        },
    )
}

/// Boundaries of `boundaries` after reordering the faces by `order`.
pub fn permute_boundaries(boundaries: &[Vec<Index>], order: &[Index]) -> Vec<Vec<Index>> {
    let mut position_of = vec![0; order.len()];
    for (position, &face) in order.iter().enumerate() {
        position_of[face] = position;
    }
    order
        .iter()
        .map(|&face| {
            let mut faces: Vec<Index> = boundaries[face].iter().map(|&f| position_of[f]).collect();
            faces.sort_unstable();
            faces
        })
        .collect()
}

/// The triangle: three vertices, three edges and the 2-face.
pub fn triangle() -> Vec<Vec<Index>> {
    vec![vec![], vec![], vec![], vec![0, 1], vec![1, 2], vec![0, 2], vec![3, 4, 5]]
}
