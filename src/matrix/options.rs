//! Matrix configuration.

use serde::{Deserialize, Serialize};

/// Runtime options shared by every matrix type.
///
/// Row access and the column strategy are chosen by type parameters; the
/// remaining switches live here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixOptions {
    /// Record row swaps lazily and only reorder the cells when a read needs
    /// the true row indices.
    pub column_and_row_swaps: bool,
    /// Let the row container drop rows once they are erased and empty.
    pub removable_rows: bool,
    /// Keep the barcode of a boundary matrix cached and update it when the
    /// last column is removed.
    pub column_pairings: bool,
}

impl MatrixOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column_and_row_swaps(mut self, enabled: bool) -> Self {
        self.column_and_row_swaps = enabled;
        self
    }

    pub fn with_removable_rows(mut self, enabled: bool) -> Self {
        self.removable_rows = enabled;
        self
    }

    pub fn with_column_pairings(mut self, enabled: bool) -> Self {
        self.column_pairings = enabled;
        self
    }
}
