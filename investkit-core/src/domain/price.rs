//! PricePoint: one daily row of a historical data table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLC(V) row for a single instrument.
///
/// `volume` is `None` when the page carries no volume column (funds, ETFs)
/// or shows a placeholder instead of a figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl PricePoint {
    /// `low <= open, close <= high`. Reported, never enforced: the site
    /// occasionally publishes rows that break it and they are kept as-is.
    pub fn is_consistent(&self) -> bool {
        self.low <= self.open
            && self.low <= self.close
            && self.open <= self.high
            && self.close <= self.high
    }
}
