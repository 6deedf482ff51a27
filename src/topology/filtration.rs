//! Filtered Simplicial Complexes
//!
//! A [`Filtration`] is a list of simplices sorted by (filtration value,
//! dimension, vertices). The position of a simplex in that order is its
//! face identifier, so the boundaries it produces can be fed directly to
//! any matrix of this crate.
//!
//! ## Clique Filtration
//!
//! For a distance matrix D, the clique (Vietoris-Rips) filtration contains
//! every vertex at value 0 and every simplex [v₀, ..., vₖ] at value
//! max D(vᵢ, vⱼ), up to a maximal value and dimension.

use super::PersistenceDiagram;
use crate::barcode::Barcode;
use crate::column::{Cell, Dimension};
use crate::field::FieldOperators;
use crate::rows::Index;
use itertools::Itertools;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A simplex with the filtration value at which it appears
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredSimplex {
    /// Vertex indices (sorted)
    pub vertices: Vec<usize>,
    pub value: f64,
}

impl FilteredSimplex {
    pub fn new(mut vertices: Vec<usize>, value: f64) -> Self {
        vertices.sort_unstable();
        vertices.dedup();
        Self { vertices, value }
    }

    pub fn dimension(&self) -> Dimension {
        self.vertices.len().saturating_sub(1)
    }

    /// Codimension-1 faces, the i-th one missing vertex i.
    fn facets(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        let count = if self.vertices.len() > 1 { self.vertices.len() } else { 0 };
        (0..count).map(move |i| {
            let mut face = self.vertices.clone();
            face.remove(i);
            face
        })
    }
}

/// Simplices in filtration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filtration {
    simplices: Vec<FilteredSimplex>,
}

impl Filtration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a filtration from arbitrary simplices.
    ///
    /// Missing faces are added and faces appearing later than one of their
    /// cofaces are moved down to the coface's value, so the result is
    /// always a valid filtration. A simplex given twice keeps its smallest
    /// value.
    pub fn from_simplices(simplices: impl IntoIterator<Item = FilteredSimplex>) -> Self {
        let mut values: HashMap<Vec<usize>, f64> = HashMap::new();
        let mut pending: Vec<FilteredSimplex> = simplices.into_iter().collect();
        while let Some(simplex) = pending.pop() {
            if simplex.vertices.is_empty() {
                continue;
            }
            let known = values.get(&simplex.vertices).copied();
            if known.is_some_and(|value| value <= simplex.value) {
                continue;
            }
            values.insert(simplex.vertices.clone(), simplex.value);
            pending.extend(
                simplex
                    .facets()
                    .map(|face| FilteredSimplex { vertices: face, value: simplex.value }),
            );
        }
        let simplices = values
            .into_iter()
            .map(|(vertices, value)| FilteredSimplex { vertices, value })
            .collect();
        Self::sorted(simplices)
    }

    /// Clique filtration of a distance matrix, keeping simplices of value at
    /// most `max_value` and dimension at most `max_dimension`.
    pub fn clique(distances: &Array2<f64>, max_value: f64, max_dimension: Dimension) -> Self {
        let n = distances.nrows();
        let mut simplices: Vec<FilteredSimplex> =
            (0..n).map(|v| FilteredSimplex { vertices: vec![v], value: 0.0 }).collect();

        for size in 2..=max_dimension + 1 {
            for vertices in (0..n).combinations(size) {
                let value = vertices
                    .iter()
                    .tuple_combinations()
                    .map(|(&i, &j)| distances[[i, j]])
                    .fold(0.0, f64::max);
                if value <= max_value {
                    simplices.push(FilteredSimplex { vertices, value });
                }
            }
        }

        let filtration = Self::sorted(simplices);
        debug!(points = n, simplices = filtration.len(), max_dimension, "clique filtration built");
        filtration
    }

    fn sorted(mut simplices: Vec<FilteredSimplex>) -> Self {
        simplices.sort_by(|a, b| {
            a.value
                .total_cmp(&b.value)
                .then(a.dimension().cmp(&b.dimension()))
                .then_with(|| a.vertices.cmp(&b.vertices))
        });
        Self { simplices }
    }

    pub fn len(&self) -> usize {
        self.simplices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simplices.is_empty()
    }

    pub fn simplices(&self) -> &[FilteredSimplex] {
        &self.simplices
    }

    /// Filtration value of the simplex at `position`.
    pub fn value(&self, position: Index) -> f64 {
        self.simplices[position].value
    }

    pub fn dimensions(&self) -> Vec<Dimension> {
        self.simplices.iter().map(FilteredSimplex::dimension).collect()
    }

    /// Boundary of every simplex as increasing face positions.
    pub fn boundaries(&self) -> Vec<Vec<Index>> {
        let index = self.position_index();
        self.simplices
            .iter()
            .map(|simplex| {
                let mut faces: Vec<Index> = simplex
                    .facets()
                    .filter_map(|face| index.get(face.as_slice()).copied())
                    .collect();
                faces.sort_unstable();
                faces
            })
            .collect()
    }

    /// Boundary of every simplex with the alternating signs of the
    /// simplicial boundary operator, reduced into `field`.
    pub fn signed_boundaries<F: FieldOperators>(&self, field: &F) -> Vec<Vec<Cell<F::Element>>> {
        let index = self.position_index();
        let plus = field.multiplicative_identity();
        let minus = field.additive_inverse(plus);
        self.simplices
            .iter()
            .map(|simplex| {
                simplex
                    .facets()
                    .enumerate()
                    .filter_map(|(i, face)| {
                        let sign = if i % 2 == 0 { plus } else { minus };
                        index.get(face.as_slice()).map(|&position| Cell::new(position, sign))
                    })
                    .sorted_by_key(|cell| cell.row)
                    .collect()
            })
            .collect()
    }

    /// Attaches filtration values to a barcode computed in positions.
    /// Bars of zero length are dropped.
    pub fn diagram(&self, barcode: &Barcode) -> PersistenceDiagram {
        PersistenceDiagram::from_barcode(barcode, |position| self.value(position))
    }

    fn position_index(&self) -> HashMap<&[usize], Index> {
        self.simplices
            .iter()
            .enumerate()
            .map(|(position, simplex)| (simplex.vertices.as_slice(), position))
            .collect()
    }
}
