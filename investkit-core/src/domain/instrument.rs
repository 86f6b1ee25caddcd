//! Instrument kinds and bundled catalog rows.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three instrument families the site publishes historical tables for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentKind {
    Equity,
    Fund,
    Etf,
}

impl InstrumentKind {
    pub const ALL: [InstrumentKind; 3] =
        [InstrumentKind::Equity, InstrumentKind::Fund, InstrumentKind::Etf];

    /// URL path segment: `/equities/...`, `/funds/...`, `/etfs/...`.
    pub fn path_segment(self) -> &'static str {
        match self {
            InstrumentKind::Equity => "equities",
            InstrumentKind::Fund => "funds",
            InstrumentKind::Etf => "etfs",
        }
    }

    /// Only equity tables carry a volume column.
    pub fn has_volume(self) -> bool {
        matches!(self, InstrumentKind::Equity)
    }

    /// Only equity JSON documents carry the catalog `full_name`.
    pub fn reports_full_name(self) -> bool {
        matches!(self, InstrumentKind::Equity)
    }

    /// Bundled catalog file name.
    pub fn catalog_file(self) -> &'static str {
        match self {
            InstrumentKind::Equity => "equities.csv",
            InstrumentKind::Fund => "funds.csv",
            InstrumentKind::Etf => "etfs.csv",
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstrumentKind::Equity => "equity",
            InstrumentKind::Fund => "fund",
            InstrumentKind::Etf => "etf",
        };
        f.write_str(s)
    }
}

impl FromStr for InstrumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "equity" | "equities" | "stock" | "stocks" => Ok(InstrumentKind::Equity),
            "fund" | "funds" => Ok(InstrumentKind::Fund),
            "etf" | "etfs" => Ok(InstrumentKind::Etf),
            other => Err(format!(
                "unknown instrument kind '{other}' (expected equities, funds or etfs)"
            )),
        }
    }
}

/// One row of a catalog CSV.
///
/// Columns beyond `name`, `tag` and `id` differ per catalog, so they are
/// all optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub tag: String,
    pub id: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub isin: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}
