//! Canonical price bar and series types.

use chrono::NaiveDate;
use std::collections::BTreeMap;

/// One day of prices in the quote currency.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    /// A bar with open, high and low all equal to close.
    pub fn flat(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
        }
    }

    fn is_finite(&self) -> bool {
        self.open.is_finite() && self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }
}

/// Bars for one instrument, ascending by date with no duplicate dates.
///
/// An empty series means the instrument is unavailable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Builds a series from bars in any order. Bars with non-finite fields
    /// are dropped; for a repeated date the last bar given wins.
    pub fn new(bars: Vec<PriceBar>) -> Self {
        let by_date: BTreeMap<NaiveDate, PriceBar> = bars
            .into_iter()
            .filter(PriceBar::is_finite)
            .map(|bar| (bar.date, bar))
            .collect();
        Self {
            bars: by_date.into_values().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// The trailing `n` bars, or the whole series if it is shorter.
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    /// Close price keyed by date.
    pub fn close_index(&self) -> BTreeMap<NaiveDate, f64> {
        self.bars.iter().map(|bar| (bar.date, bar.close)).collect()
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PriceBar;
    type IntoIter = std::slice::Iter<'a, PriceBar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}
