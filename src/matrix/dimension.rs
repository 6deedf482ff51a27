//! Per-dimension column counts.

use crate::column::Dimension;

/// Counts the columns of every dimension so that the maximal dimension is
/// restored exactly when columns are removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionTracker {
    counts: Vec<usize>,
}

impl DimensionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_up(&mut self, dimension: Dimension) {
        if self.counts.len() <= dimension {
            self.counts.resize(dimension + 1, 0);
        }
        self.counts[dimension] += 1;
    }

    pub fn update_down(&mut self, dimension: Dimension) {
        if let Some(count) = self.counts.get_mut(dimension) {
            *count = count.saturating_sub(1);
        }
        while self.counts.last() == Some(&0) {
            self.counts.pop();
        }
    }

    /// Largest dimension of a live column, `None` when there is none.
    pub fn max_dimension(&self) -> Option<Dimension> {
        self.counts.len().checked_sub(1)
    }

    /// Number of live columns of dimension `dimension`.
    pub fn count(&self, dimension: Dimension) -> usize {
        self.counts.get(dimension).copied().unwrap_or(0)
    }

    pub fn reset(&mut self) {
        self.counts.clear();
    }
}
