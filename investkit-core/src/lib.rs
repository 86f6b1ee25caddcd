//! investkit core: catalog lookup, investing.com scraping, rendering.
//!
//! This crate contains:
//! - Domain types (instrument kinds, catalog entries, price rows, date intervals)
//! - The bundled instrument catalog and its remote refresh
//! - The page source abstraction and its blocking HTTP implementation
//! - Parsers for historical tables, fund overviews, and company profiles
//! - Output rendering (polars DataFrame, JSON, CSV, text table)

pub mod config;
pub mod data;
pub mod domain;
pub mod output;

pub use config::{ConfigError, FetchConfig};
pub use data::{CatalogRepository, DataError, HttpPageSource, InvestingClient, PageSource};
pub use domain::{InstrumentKind, PriceHistory, PricePoint, SortOrder};
