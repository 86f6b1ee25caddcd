//! Domain types: instruments, price rows, date intervals.

pub mod history;
pub mod instrument;
pub mod interval;
pub mod price;

pub use history::{HistorySpan, PriceHistory, SortOrder};
pub use instrument::{CatalogEntry, InstrumentKind};
pub use interval::{
    parse_request_date, split_date_strings, split_range, DateInterval, MAX_SPAN_YEARS,
    REQUEST_DATE_FORMAT,
};
pub use price::PricePoint;
