//! Historical-data table parser.
//!
//! Both the recent-data page and the `HistoricalDataAjax` response carry the
//! prices in `table#curr_table`, one `<tr>` per day, newest first:
//!
//! ```text
//! | date (dd.mm.yyyy) | close | open | high | low | volume* | change % |
//! ```
//!
//! `*` equities only. Numbers use the Spanish locale (decimal comma). When
//! the range holds no data the body carries a single row whose first cell
//! is [`NO_RESULTS_SENTINEL`].

use super::provider::DataError;
use super::units::{parse_decimal, parse_scaled};
use crate::domain::{InstrumentKind, PricePoint};
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

/// First-cell text of an empty result table.
pub const NO_RESULTS_SENTINEL: &str = "No se encontraron resultados";

const ROW_DATE_FORMAT: &str = "%d.%m.%Y";

pub(crate) fn selector(css: &str) -> Result<Selector, DataError> {
    Selector::parse(css).map_err(|e| DataError::ParseFailure(format!("selector '{css}': {e}")))
}

/// Whitespace-normalized text content of an element.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse every row of `table#curr_table` in page order.
///
/// `name` is only used to label a [`DataError::NoResults`].
pub fn parse_history_table(
    html: &str,
    kind: InstrumentKind,
    name: &str,
) -> Result<Vec<PricePoint>, DataError> {
    let doc = Html::parse_document(html);
    let sel_table = selector("table#curr_table")?;
    let sel_row = selector("tbody > tr")?;
    let sel_cell = selector("td")?;

    let table = doc
        .select(&sel_table)
        .next()
        .ok_or_else(|| DataError::ParseFailure("historical data table not found".into()))?;

    let mut points = Vec::new();
    for row in table.select(&sel_row) {
        let cells: Vec<String> = row.select(&sel_cell).map(element_text).collect();
        if cells.is_empty() {
            continue;
        }
        if cells[0] == NO_RESULTS_SENTINEL {
            return Err(DataError::NoResults {
                kind,
                name: name.to_string(),
            });
        }
        points.push(parse_row(&cells, kind)?);
    }

    if points.is_empty() {
        return Err(DataError::ParseFailure(
            "historical data table has no rows".into(),
        ));
    }

    tracing::debug!(rows = points.len(), %kind, name, "parsed historical table");
    Ok(points)
}

/// Parse the fixed-position cells of one table row.
pub fn parse_row<S: AsRef<str>>(cells: &[S], kind: InstrumentKind) -> Result<PricePoint, DataError> {
    let required = if kind.has_volume() { 6 } else { 5 };
    if cells.len() < required {
        return Err(DataError::ParseFailure(format!(
            "row has {} cells, expected at least {required}",
            cells.len()
        )));
    }

    let cell = |i: usize| cells[i].as_ref().trim();

    let date = NaiveDate::parse_from_str(cell(0), ROW_DATE_FORMAT)
        .map_err(|_| DataError::ParseFailure(format!("bad row date '{}'", cell(0))))?;
    let close = parse_decimal(cell(1))?;
    let open = parse_decimal(cell(2))?;
    let high = parse_decimal(cell(3))?;
    let low = parse_decimal(cell(4))?;
    let volume = if kind.has_volume() {
        parse_scaled(cell(5))?
    } else {
        None
    };

    Ok(PricePoint {
        date,
        open,
        high,
        low,
        close,
        volume,
    })
}

/// Text of the first `<h2>` on a page.
///
/// Equity historical queries echo it back in the `header` form field.
pub fn page_heading(html: &str) -> Result<String, DataError> {
    let doc = Html::parse_document(html);
    let sel_h2 = selector("h2")?;
    doc.select(&sel_h2)
        .map(element_text)
        .find(|t| !t.is_empty())
        .ok_or_else(|| DataError::ParseFailure("page has no <h2> heading".into()))
}
