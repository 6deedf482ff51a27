//! Barcodes with filtration values attached.
//!
//! A [`PersistenceDiagram`] keeps every [`Bar`] it was built from, so the
//! index-level pairing (and, over a multi-field, the characteristics a bar
//! holds for) stays available next to the values.

use crate::barcode::{Bar, Barcode};
use crate::column::Dimension;
use crate::rows::Index;
use serde::{Deserialize, Serialize};

/// A bar together with the filtration values of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuedBar {
    pub bar: Bar,
    pub birth: f64,
    /// `None` for an essential class.
    pub death: Option<f64>,
}

impl ValuedBar {
    pub fn dimension(&self) -> Dimension {
        self.bar.dimension
    }

    pub fn is_essential(&self) -> bool {
        self.death.is_none()
    }

    /// `death - birth` in filtration values, `None` for an essential bar.
    pub fn lifetime(&self) -> Option<f64> {
        self.death.map(|death| death - self.birth)
    }
}

/// Bars of one barcode in filtration values, in barcode order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistenceDiagram {
    pub bars: Vec<ValuedBar>,
}

impl PersistenceDiagram {
    /// Reads the value of every endpoint through `value`. Finite bars whose
    /// endpoints carry the same value are dropped.
    pub fn from_barcode(barcode: &Barcode, value: impl Fn(Index) -> f64) -> Self {
        let bars = barcode
            .iter()
            .map(|&bar| ValuedBar {
                bar,
                birth: value(bar.birth),
                death: bar.death.map(&value),
            })
            .filter(|valued| valued.death.map_or(true, |death| death > valued.birth))
            .collect();
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValuedBar> {
        self.bars.iter()
    }

    /// Finite bars of dimension `d`
    pub fn finite(&self, d: Dimension) -> Vec<&ValuedBar> {
        self.bars
            .iter()
            .filter(|valued| valued.dimension() == d && !valued.is_essential())
            .collect()
    }

    /// Essential bars of dimension `d`
    pub fn essential(&self, d: Dimension) -> Vec<&ValuedBar> {
        self.bars
            .iter()
            .filter(|valued| valued.dimension() == d && valued.is_essential())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_follow_bars() {
        let barcode = Barcode::from_bars(vec![
            Bar::essential(0, 0),
            Bar::finite(1, 2, 0),
            Bar::finite(3, 4, 0),
            Bar::essential(5, 1),
        ]);
        let values = [0.0, 0.0, 0.5, 1.0, 1.0, 1.5];
        let diagram = PersistenceDiagram::from_barcode(&barcode, |index| values[index]);

        // [3, 4) has no length in values
        assert_eq!(diagram.len(), 3);
        let finite = diagram.finite(0);
        assert_eq!(finite.len(), 1);
        assert_eq!(finite[0].bar, Bar::finite(1, 2, 0));
        assert_eq!(finite[0].lifetime(), Some(0.5));
        assert_eq!(diagram.essential(0)[0].birth, 0.0);
        assert_eq!(diagram.essential(1)[0].lifetime(), None);
        assert!(diagram.finite(1).is_empty());
    }

    #[test]
    fn test_restricted_bars_keep_their_characteristics() {
        let barcode = Barcode::from_bars(vec![Bar::finite(0, 1, 1).restricted_to(2)]);
        let diagram = PersistenceDiagram::from_barcode(&barcode, |index| index as f64);
        assert_eq!(diagram.bars[0].bar.characteristics, Some(2));
        assert_eq!(diagram.bars[0].dimension(), 1);
    }
}
