//! # TDA Persistence Matrix
//!
//! Sparse matrices over finite fields for computing persistent homology,
//! with the column operations needed to keep a reduced basis up to date
//! while the filtration changes.
//!
//! ## Theoretical Framework
//!
//! A filtration K₀ ⊆ K₁ ⊆ ... ⊆ Kₙ of a cell complex is encoded by its
//! boundary matrix D, where column j holds the boundary of the j-th face.
//! A reduction R = D·V with R reduced (all pivots distinct) pairs every
//! face that kills a homology class with the face that created it; the
//! pairs and the unpaired faces form the barcode.
//!
//! ### Matrix Types
//!
//! 1. **Base matrix**: plain column store with additions, zeroing and
//!    lazy row swaps
//!
//! 2. **Boundary matrix**: reduced on demand with the standard algorithm
//!    and the twist optimization
//!
//! 3. **Chain matrix**: keeps the compatible chain basis V of Zomorodian
//!    and Carlsson reduced at every insertion, and supports vine swaps
//!    (transpositions of consecutive faces) over Z2
//!
//! ### Coefficients
//!
//! Every matrix is generic over a field context: Z2, a prime field Zp or a
//! multi-field, which computes over the product of all primes of an
//! interval at once.
//!
//! ### Column Strategies
//!
//! Columns are stored as sorted vectors, ordered sets, linked lists or
//! lazy heaps ([`VectorColumn`], [`SetColumn`], [`ListColumn`],
//! [`HeapColumn`]). Optional row access mirrors every cell in a row index
//! ([`RowContainer`]).
//!
//! ## References
//!
//! - Edelsbrunner & Harer, "Computational Topology" (2010)
//! - Zomorodian & Carlsson, "Computing Persistent Homology" (2005)
//! - Cohen-Steiner, Edelsbrunner & Morozov, "Vines and Vineyards by
//!   Updating Persistence in Linear Time" (2006)
//! - Boissonnat & Maria, "Computing Persistent Homology with Various
//!   Coefficient Fields in a Single Pass" (2014)

pub mod barcode;
pub mod column;
pub mod error;
pub mod field;
pub mod matrix;
pub mod rows;
pub mod topology;

// Re-exports from field
pub use field::{FieldOperators, MultiField, Z2Field, ZpField};

// Re-exports from column
pub use column::{
    Cell,
    ChainColumn,
    Column,
    Dimension,
    HeapColumn,
    ListColumn,
    RowAccessColumn,
    SetColumn,
    VectorColumn,
};

// Re-exports from rows
pub use rows::{Index, NoRowAccess, RowAccess, RowContainer};

// Re-exports from matrix
pub use matrix::{
    BaseMatrix,
    BoundaryMatrix,
    ChainMatrix,
    MatrixOptions,
    RemovedColumn,
};

// Re-exports from barcode and topology
pub use barcode::{Bar, Barcode};
pub use error::{Error, FieldError, MatrixError, Result};
pub use topology::{FilteredSimplex, Filtration, PersistenceDiagram, ValuedBar};
