//! investing.com client.
//!
//! Resolves instruments through the injected catalog and drives the
//! scraping pipeline over a [`PageSource`]:
//!
//! 1. recent data: one `GET` of `/{segment}/{tag}-historical-data`
//! 2. historical data: the range is split into twenty-year intervals and
//!    each one is a `POST` to `/instruments/HistoricalDataAjax`
//! 3. the table of every response is parsed and the pages are merged
//!
//! Calls are sequential. The first failing request aborts the whole query.

use super::aggregate::aggregate;
use super::catalog::CatalogRepository;
use super::fund_info::{parse_fund_overview, FundInformation};
use super::listing::{listing_source, parse_listing};
use super::profile::{parse_profile, profile_url, CompanyProfile, ProfileLanguage};
use super::provider::{DataError, FormFields, PageSource};
use super::table::{page_heading, parse_history_table};
use crate::config::FetchConfig;
use crate::domain::{
    parse_request_date, split_range, CatalogEntry, DateInterval, HistorySpan, InstrumentKind,
    PriceHistory, PricePoint, SortOrder,
};
use chrono::NaiveDate;
use rand::Rng;

/// Lower and upper bound of the random `smlID` form field (7–8 digits).
pub const SML_ID_RANGE: std::ops::RangeInclusive<u32> = 1_000_000..=99_999_999;

const HISTORICAL_AJAX_PATH: &str = "/instruments/HistoricalDataAjax";

/// Client over a page source and a catalog.
pub struct InvestingClient<'a> {
    source: &'a dyn PageSource,
    catalog: &'a CatalogRepository,
    config: &'a FetchConfig,
}

impl<'a> InvestingClient<'a> {
    pub fn new(
        source: &'a dyn PageSource,
        catalog: &'a CatalogRepository,
        config: &'a FetchConfig,
    ) -> Self {
        Self {
            source,
            catalog,
            config,
        }
    }

    fn history_page_url(&self, kind: InstrumentKind, entry: &CatalogEntry) -> String {
        format!(
            "{}/{}/{}-historical-data",
            self.config.base_url,
            kind.path_segment(),
            entry.tag
        )
    }

    /// The last month or so of daily prices.
    pub fn recent_data(
        &self,
        kind: InstrumentKind,
        name: &str,
        order: SortOrder,
    ) -> Result<PriceHistory, DataError> {
        let entry = self.catalog.find(kind, name)?;
        let url = self.history_page_url(kind, entry);
        let html = self.source.get(&url, self.config.recent_timeout())?;
        let page = parse_history_table(&html, kind, &entry.name)?;

        tracing::info!(%kind, name = %entry.name, rows = page.len(), "fetched recent data");
        Ok(history(kind, entry, HistorySpan::Recent, order, vec![page]))
    }

    /// Daily prices between two `dd/mm/yyyy` dates, inclusive.
    pub fn historical_data(
        &self,
        kind: InstrumentKind,
        name: &str,
        start: &str,
        end: &str,
        order: SortOrder,
    ) -> Result<PriceHistory, DataError> {
        let start = parse_request_date(start, "start")?;
        let end = parse_request_date(end, "end")?;
        self.historical_range(kind, name, start, end, order)
    }

    /// Daily prices between two dates, inclusive.
    pub fn historical_range(
        &self,
        kind: InstrumentKind,
        name: &str,
        start: NaiveDate,
        end: NaiveDate,
        order: SortOrder,
    ) -> Result<PriceHistory, DataError> {
        let intervals = split_range(start, end)?;
        let entry = self.catalog.find(kind, name)?;
        let header = self.request_header(kind, entry)?;
        let url = format!("{}{HISTORICAL_AJAX_PATH}", self.config.base_url);

        let mut pages = Vec::with_capacity(intervals.len());
        for (i, interval) in intervals.iter().enumerate() {
            tracing::debug!(
                %kind,
                name = %entry.name,
                interval = i + 1,
                of = intervals.len(),
                start = %interval.start(),
                end = %interval.end(),
                "requesting interval"
            );
            let form = historical_form(entry, &header, interval, &mut rand::thread_rng());
            let html = self
                .source
                .post_form(&url, &form, self.config.historical_timeout())?;
            pages.push(parse_history_table(&html, kind, &entry.name)?);
        }

        let result = history(kind, entry, HistorySpan::Historical, order, pages);
        tracing::info!(
            %kind,
            name = %entry.name,
            intervals = intervals.len(),
            rows = result.len(),
            "fetched historical data"
        );
        Ok(result)
    }

    /// `header` form field. Equities echo the `<h2>` of their historical
    /// page; funds and ETFs use a fixed caption built from the symbol.
    fn request_header(
        &self,
        kind: InstrumentKind,
        entry: &CatalogEntry,
    ) -> Result<String, DataError> {
        match kind {
            InstrumentKind::Equity => {
                let url = self.history_page_url(kind, entry);
                let html = self.source.get(&url, self.config.recent_timeout())?;
                page_heading(&html)
            }
            InstrumentKind::Fund | InstrumentKind::Etf => {
                let symbol = entry
                    .symbol
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        DataError::Catalog(format!(
                            "{kind} '{}' has no symbol in the catalog",
                            entry.name
                        ))
                    })?;
                Ok(format!("Datos históricos {symbol}"))
            }
        }
    }

    /// Overview figures of a fund.
    pub fn fund_information(&self, name: &str) -> Result<FundInformation, DataError> {
        let entry = self.catalog.find(InstrumentKind::Fund, name)?;
        let url = format!("{}/funds/{}", self.config.base_url, entry.tag);
        let html = self.source.get(&url, self.config.recent_timeout())?;
        parse_fund_overview(&html, &entry.name)
    }

    /// Company description of an equity.
    pub fn company_profile(
        &self,
        name: &str,
        language: ProfileLanguage,
    ) -> Result<CompanyProfile, DataError> {
        if name.trim().is_empty() {
            return Err(DataError::InvalidArgument(
                "equity name is mandatory and must be a valid equity name".into(),
            ));
        }
        let entry = self.catalog.find(InstrumentKind::Equity, name)?;
        let url = profile_url(entry, language)?;
        let html = self.source.get(&url, self.config.recent_timeout())?;
        let description = parse_profile(&html, language)?;
        Ok(CompanyProfile { url, description })
    }

    /// Download the current listing for `kind`.
    pub fn fetch_listing(&self, kind: InstrumentKind) -> Result<Vec<CatalogEntry>, DataError> {
        let src = listing_source(kind).ok_or_else(|| {
            DataError::InvalidArgument(format!("no remote listing is published for {kind}"))
        })?;
        let url = format!("{}{}", self.config.base_url, src.path);
        let html = self.source.get(&url, self.config.recent_timeout())?;
        let entries = parse_listing(&html, kind, &src)?;
        tracing::info!(%kind, rows = entries.len(), "fetched listing");
        Ok(entries)
    }
}

/// Form body of one `HistoricalDataAjax` request.
pub fn historical_form<R: Rng + ?Sized>(
    entry: &CatalogEntry,
    header: &str,
    interval: &DateInterval,
    rng: &mut R,
) -> FormFields {
    vec![
        ("curr_id", entry.id.clone()),
        ("smlID", rng.gen_range(SML_ID_RANGE).to_string()),
        ("header", header.to_string()),
        ("st_date", interval.start_param()),
        ("end_date", interval.end_param()),
        ("interval_sec", "Daily".to_string()),
        ("sort_col", "date".to_string()),
        ("sort_ord", "DESC".to_string()),
        ("action", "historical_data".to_string()),
    ]
}

fn history(
    kind: InstrumentKind,
    entry: &CatalogEntry,
    span: HistorySpan,
    order: SortOrder,
    pages: Vec<Vec<PricePoint>>,
) -> PriceHistory {
    PriceHistory {
        name: entry.name.clone(),
        full_name: if kind.reports_full_name() {
            entry.full_name.clone()
        } else {
            None
        },
        kind,
        span,
        order,
        points: aggregate(pages, order),
    }
}
