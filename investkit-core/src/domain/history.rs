//! PriceHistory: the ordered result of a recent or historical query.

use super::instrument::InstrumentKind;
use super::price::PricePoint;
use crate::data::provider::DataError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Requested row order of a price history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest row first.
    #[default]
    Ascending,
    /// Newest row first.
    Descending,
}

impl FromStr for SortOrder {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascending" => Ok(SortOrder::Ascending),
            "descending" => Ok(SortOrder::Descending),
            other => Err(DataError::InvalidArgument(format!(
                "order '{other}' is not valid, it can just be ascending or descending"
            ))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => f.write_str("ascending"),
            SortOrder::Descending => f.write_str("descending"),
        }
    }
}

/// Which query produced a history; also the JSON key of its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistorySpan {
    Recent,
    Historical,
}

/// Daily prices for one instrument, in the requested order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub name: String,
    pub full_name: Option<String>,
    pub kind: InstrumentKind,
    pub span: HistorySpan,
    pub order: SortOrder,
    pub points: Vec<PricePoint>,
}

impl PriceHistory {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First and last dates in chronological order.
    pub fn date_range(&self) -> Option<(chrono::NaiveDate, chrono::NaiveDate)> {
        let first = self.points.first()?.date;
        let last = self.points.last()?.date;
        Some((first.min(last), first.max(last)))
    }
}
