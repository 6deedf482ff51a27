//! Topology Module: Filtrations and Persistence Diagrams
//!
//! Bridges simplicial complexes and the matrices of this crate:
//! - [`Filtration`] orders simplices and produces their boundaries
//! - [`PersistenceDiagram`] attaches filtration values to a [`Barcode`]
//!
//! ## Mathematical Background
//!
//! For a filtration K₀ ⊆ K₁ ⊆ ... ⊆ Kₙ, each simplex is identified with its
//! position in the filtration order. Reducing the boundary matrix pairs a
//! positive simplex (creating a class) with the negative simplex that
//! kills it; the filtration values of the pair give the interval
//! [birth, death) of the persistence diagram.
//!
//! [`Barcode`]: crate::barcode::Barcode

mod diagram;
mod filtration;

pub use diagram::{PersistenceDiagram, ValuedBar};
pub use filtration::{FilteredSimplex, Filtration};
