//! Barcodes in index units.
//!
//! A bar records the filtration index (or position) at which a class is
//! born, the one at which it dies, and its dimension. Bars never carry
//! filtration values; [`crate::topology::Filtration::diagram`] attaches them.
//!
//! Over a multi-field the pairing may differ between the packed prime
//! fields. Such a barcode is split: each bar records the product of the
//! characteristics it holds for, and [`Barcode::for_characteristic`] reads
//! the barcode of a single prime back.

use crate::column::Dimension;
use crate::rows::Index;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One persistence pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bar {
    pub birth: Index,
    /// `None` for an essential class.
    pub death: Option<Index>,
    pub dimension: Dimension,
    /// Product of the characteristics the bar holds for, `None` when it
    /// holds for every one of them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characteristics: Option<u64>,
}

impl Bar {
    pub fn finite(birth: Index, death: Index, dimension: Dimension) -> Self {
        Self { birth, death: Some(death), dimension, characteristics: None }
    }

    pub fn essential(birth: Index, dimension: Dimension) -> Self {
        Self { birth, death: None, dimension, characteristics: None }
    }

    /// The same bar, holding only for the primes dividing `characteristics`.
    pub fn restricted_to(mut self, characteristics: u64) -> Self {
        self.characteristics = Some(characteristics);
        self
    }

    /// `true` when the bar exists over Z/pZ.
    pub fn holds_for(&self, prime: u64) -> bool {
        self.characteristics.map_or(true, |product| product % prime == 0)
    }

    pub fn is_essential(&self) -> bool {
        self.death.is_none()
    }

    /// Length in index units, `None` for an essential bar.
    pub fn persistence(&self) -> Option<usize> {
        self.death.map(|death| death.saturating_sub(self.birth))
    }
}

impl fmt::Display for Bar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.death {
            Some(death) => write!(f, "[{}, {}) dim {}", self.birth, death, self.dimension)?,
            None => write!(f, "[{}, inf) dim {}", self.birth, self.dimension)?,
        }
        match self.characteristics {
            Some(product) => write!(f, " mod {product}"),
            None => Ok(()),
        }
    }
}

/// Bars of a matrix, sorted by birth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barcode {
    pub bars: Vec<Bar>,
}

impl Barcode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a barcode, sorting the bars by birth.
    pub fn from_bars(mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(Self::order);
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bar> {
        self.bars.iter()
    }

    /// Bars of dimension `d`
    pub fn dim(&self, d: Dimension) -> Vec<&Bar> {
        self.bars.iter().filter(|bar| bar.dimension == d).collect()
    }

    /// Finite bars of dimension `d`
    pub fn finite_bars(&self, d: Dimension) -> Vec<&Bar> {
        self.bars
            .iter()
            .filter(|bar| bar.dimension == d && !bar.is_essential())
            .collect()
    }

    /// Essential bars of dimension `d`
    pub fn essential(&self, d: Dimension) -> Vec<&Bar> {
        self.bars
            .iter()
            .filter(|bar| bar.dimension == d && bar.is_essential())
            .collect()
    }

    /// Number of finite bars in dimension `d`
    pub fn count(&self, d: Dimension) -> usize {
        self.finite_bars(d).len()
    }

    /// `true` when some bar holds only for part of the characteristics.
    pub fn is_split(&self) -> bool {
        self.bars.iter().any(|bar| bar.characteristics.is_some())
    }

    /// Barcode over Z/pZ alone, read from a possibly split barcode.
    pub fn for_characteristic(&self, prime: u64) -> Barcode {
        let bars = self
            .bars
            .iter()
            .filter(|bar| bar.holds_for(prime))
            .map(|bar| Bar { characteristics: None, ..*bar })
            .collect();
        Self::from_bars(bars)
    }

    /// Betti numbers of the whole complex: essential bars per dimension.
    /// On a split barcode, read them per characteristic.
    pub fn betti_numbers(&self) -> Vec<usize> {
        let mut betti = Vec::new();
        for bar in self.bars.iter().filter(|bar| bar.is_essential()) {
            if betti.len() <= bar.dimension {
                betti.resize(bar.dimension + 1, 0);
            }
            betti[bar.dimension] += 1;
        }
        betti
    }

    /// Bars as a canonical sorted list, for order-independent comparison.
    pub fn sorted_pairs(&self) -> Vec<Bar> {
        let mut bars = self.bars.clone();
        bars.sort();
        bars
    }

    pub(crate) fn push(&mut self, bar: Bar) {
        self.bars.push(bar);
    }

    pub(crate) fn sort(&mut self) {
        self.bars.sort_by_key(Self::order);
    }

    fn order(bar: &Bar) -> (Index, Option<Index>, Dimension, Option<u64>) {
        (bar.birth, bar.death, bar.dimension, bar.characteristics)
    }

    /// Reverts the effect of removing the column at `index`: the bar it
    /// killed becomes essential again, the essential bar it created goes.
    pub(crate) fn forget_column(&mut self, index: Index) {
        if let Some(bar) = self.bars.iter_mut().find(|bar| bar.death == Some(index)) {
            bar.death = None;
            return;
        }
        self.bars.retain(|bar| !(bar.birth == index && bar.is_essential()));
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bar in &self.bars {
            writeln!(f, "{bar}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Barcode {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}
