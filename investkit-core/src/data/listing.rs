//! Remote catalog listings.
//!
//! The equity and fund screener pages list every instrument as a row
//! `<tr id="pair_{id}">` whose anchor points at `/{segment}/{tag}`, with the
//! full name in the anchor's `title` and the short name as its text.

use super::provider::DataError;
use super::table::{element_text, selector};
use crate::domain::{CatalogEntry, InstrumentKind};
use scraper::Html;

/// Where a kind's listing lives and which table holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingSource {
    pub path: &'static str,
    pub table_id: &'static str,
}

/// Listing page for `kind`, if the site publishes one.
pub fn listing_source(kind: InstrumentKind) -> Option<ListingSource> {
    match kind {
        InstrumentKind::Equity => Some(ListingSource {
            path: "/equities/StocksFilter?noconstruct=1&smlID=0&sid=&tabletype=price&index_id=all",
            table_id: "cross_rate_markets_stocks_1",
        }),
        InstrumentKind::Fund => Some(ListingSource {
            path: "/funds/spain-funds?&issuer_filter=0",
            table_id: "etfs",
        }),
        // ETF rows need the symbol and country columns the screener omits.
        InstrumentKind::Etf => None,
    }
}

/// Parse the listing table into catalog rows.
pub fn parse_listing(
    html: &str,
    kind: InstrumentKind,
    source: &ListingSource,
) -> Result<Vec<CatalogEntry>, DataError> {
    let doc = Html::parse_document(html);
    let sel_table = selector(&format!("table#{}", source.table_id))?;
    let sel_row = selector("tbody > tr")?;
    let sel_link = selector("a")?;
    let sel_symbol = selector("td.symbol")?;

    let table = doc.select(&sel_table).next().ok_or_else(|| {
        DataError::ParseFailure(format!("listing table '{}' not found", source.table_id))
    })?;

    let prefix = format!("/{}/", kind.path_segment());
    let mut entries = Vec::new();

    for row in table.select(&sel_row) {
        let Some(id) = row.value().attr("id").and_then(|id| id.strip_prefix("pair_")) else {
            continue;
        };
        let Some(link) = row.select(&sel_link).next() else {
            continue;
        };
        let href = link.value().attr("href").unwrap_or_default();
        let Some(tag) = instrument_tag(href, &prefix) else {
            tracing::debug!(id, href, "skipping row that links outside the listing");
            continue;
        };
        let name = element_text(link);
        if name.is_empty() {
            continue;
        }

        let symbol = row
            .select(&sel_symbol)
            .next()
            .and_then(|td| td.value().attr("title").map(str::to_string).or_else(|| Some(element_text(td))))
            .filter(|s| !s.is_empty());

        entries.push(CatalogEntry {
            name,
            full_name: link.value().attr("title").map(|t| t.trim().to_string()),
            tag: tag.to_string(),
            id: id.to_string(),
            symbol,
            isin: None,
            issuer: None,
            country: Some("spain".into()),
        });
    }

    if entries.is_empty() {
        return Err(DataError::ParseFailure(format!(
            "listing table '{}' has no instrument rows",
            source.table_id
        )));
    }
    Ok(entries)
}

/// Tag of an instrument link: the last path segment under `prefix`.
///
/// Absolute links are reduced to their path first. Query strings and
/// fragments are dropped. `None` when the link points elsewhere.
fn instrument_tag<'h>(href: &'h str, prefix: &str) -> Option<&'h str> {
    let path = match href.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |i| &rest[i..]),
        None => href,
    };
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let tag = path.strip_prefix(prefix)?.trim_matches('/');
    (!tag.is_empty() && !tag.contains('/')).then_some(tag)
}
