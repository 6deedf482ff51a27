//! Vine swaps on chain matrices over Z2.
//!
//! Transposing two faces adjacent in the filtration only breaks the basis
//! when the later chain contains the earlier pivot. One addition between
//! the two chains (plus the same addition between their partners when
//! boundaries are involved) repairs it; which direction is legal depends on
//! whether each chain is a birth or a death, and on the order of the
//! partners' pivots.

use super::ChainMatrix;
use crate::column::Column;
use crate::field::Z2Field;
use crate::rows::{Index, RowAccess};
use tracing::trace;

impl<C: Column<Z2Field>, R: RowAccess> ChainMatrix<Z2Field, C, R> {
    /// Transposes the pivots of chains `first` and `second`, which must sit
    /// at consecutive positions, `first` earlier. Returns the column whose
    /// pivot ends at the later position.
    pub fn vine_swap(&mut self, first: Index, second: Index) -> Index {
        let pivot1 = self.get_pivot(first);
        let pivot2 = self.get_pivot(second);

        if !self.chain(second).is_non_zero(pivot1) {
            self.swap_positions(pivot1, pivot2);
            trace!(first, second, "vine swap without addition");
            return first;
        }

        let partner1 = self.get_paired_chain_index(first);
        let partner2 = self.get_paired_chain_index(second);
        let partner_position = |matrix: &Self, partner: Option<Index>| {
            partner.map(|p| matrix.positions[&matrix.get_pivot(p)])
        };
        let position1 = self.positions[&pivot1];
        let position2 = self.positions[&pivot2];
        let other1 = partner_position(self, partner1);
        let other2 = partner_position(self, partner2);
        let negative1 = other1.is_some_and(|other| other < position1);
        let negative2 = other2.is_some_and(|other| other < position2);

        let kept = match (negative1, negative2, partner1, partner2, other1, other2) {
            // both deaths: the older birth keeps the later death
            (true, true, Some(p1), Some(p2), Some(birth1), Some(birth2)) => {
                if birth1 < birth2 {
                    self.add_to(first, second);
                    self.add_to(p1, p2);
                    first
                } else {
                    self.add_to(second, first);
                    self.add_to(p2, p1);
                    second
                }
            }
            // both births that die later
            (false, false, Some(p1), Some(p2), Some(death1), Some(death2)) => {
                if death1 < death2 {
                    self.add_to(first, second);
                    self.add_to(p1, p2);
                    first
                } else {
                    self.add_to(second, first);
                    self.add_to(p2, p1);
                    second
                }
            }
            (false, false, _, None, _, _) => {
                self.add_to(first, second);
                first
            }
            (false, false, _, _, _, _) => {
                self.add_to(second, first);
                second
            }
            (true, false, ..) => {
                self.add_to(second, first);
                second
            }
            (false, true, ..) => {
                self.add_to(first, second);
                first
            }
            // a death always has a partner
            (true, true, ..) => unreachable!("paired chains without partner"),
        };

        self.swap_positions(pivot1, pivot2);
        trace!(first, second, negative1, negative2, kept, "vine swap");
        kept
    }

    /// Transposes the faces at `position` and `position + 1`. Returns the
    /// column whose pivot ends at `position + 1`.
    ///
    /// # Panics
    ///
    /// If `position + 1` is past the last face.
    pub fn vine_swap_positions(&mut self, position: Index) -> Index {
        let first = self.pivot_to_column[&self.id_at[position]];
        let second = self.pivot_to_column[&self.id_at[position + 1]];
        self.vine_swap(first, second)
    }

    fn swap_positions(&mut self, id1: Index, id2: Index) {
        let position1 = self.positions[&id1];
        let position2 = self.positions[&id2];
        self.positions.insert(id1, position2);
        self.positions.insert(id2, position1);
        self.id_at.swap(position1, position2);
    }
}
