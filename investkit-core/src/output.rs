//! Rendering of price histories, fund overviews and catalog rows.
//!
//! - `to_dataframe()`: polars frame, `Date` first then `Open High Low Close Volume`
//! - `to_json()`: `{"name", "full_name"?, "recent" | "historical": [...]}`
//! - `to_csv()`: ISO dates, empty volume cell when there is none
//! - `render_table()`: fixed-width text for the terminal
//!
//! Catalog rows are exported through a chosen list of [`CatalogColumn`]s.

use crate::data::{DataError, FundInformation};
use crate::domain::{CatalogEntry, HistorySpan, InstrumentKind, PriceHistory, PricePoint};
use chrono::Datelike;
use polars::prelude::*;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// `num_days_from_ce()` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const JSON_DATE_FORMAT: &str = "%d/%m/%Y";

pub const COLUMNS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

#[derive(Serialize)]
struct JsonRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    volume: Option<u64>,
}

impl From<&PricePoint> for JsonRow {
    fn from(p: &PricePoint) -> Self {
        Self {
            date: p.date.format(JSON_DATE_FORMAT).to_string(),
            open: p.open,
            high: p.high,
            low: p.low,
            close: p.close,
            volume: p.volume,
        }
    }
}

#[derive(Serialize)]
struct JsonHistory<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    full_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recent: Option<Vec<JsonRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    historical: Option<Vec<JsonRow>>,
}

impl PriceHistory {
    fn json_document(&self) -> JsonHistory<'_> {
        let rows: Vec<JsonRow> = self.points.iter().map(JsonRow::from).collect();
        let (recent, historical) = match self.span {
            HistorySpan::Recent => (Some(rows), None),
            HistorySpan::Historical => (None, Some(rows)),
        };
        JsonHistory {
            name: &self.name,
            full_name: self.full_name.as_deref(),
            recent,
            historical,
        }
    }

    /// Pretty-printed JSON document.
    pub fn to_json(&self) -> Result<String, DataError> {
        serde_json::to_string_pretty(&self.json_document())
            .map_err(|e| DataError::Output(format!("json: {e}")))
    }

    /// Same document as [`to_json`](Self::to_json), as a value.
    pub fn to_json_value(&self) -> Result<serde_json::Value, DataError> {
        serde_json::to_value(self.json_document())
            .map_err(|e| DataError::Output(format!("json: {e}")))
    }

    /// Date-indexed frame in row order. `Volume` is null where unknown.
    pub fn to_dataframe(&self) -> Result<DataFrame, DataError> {
        let pts = &self.points;
        let dates: Vec<i32> = pts
            .iter()
            .map(|p| p.date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
            .collect();
        let opens: Vec<f64> = pts.iter().map(|p| p.open).collect();
        let highs: Vec<f64> = pts.iter().map(|p| p.high).collect();
        let lows: Vec<f64> = pts.iter().map(|p| p.low).collect();
        let closes: Vec<f64> = pts.iter().map(|p| p.close).collect();
        let volumes: Vec<Option<u64>> = pts.iter().map(|p| p.volume).collect();

        DataFrame::new(vec![
            Column::new("Date".into(), dates)
                .cast(&DataType::Date)
                .map_err(|e| DataError::Output(format!("date cast: {e}")))?,
            Column::new("Open".into(), opens),
            Column::new("High".into(), highs),
            Column::new("Low".into(), lows),
            Column::new("Close".into(), closes),
            Column::new("Volume".into(), volumes),
        ])
        .map_err(|e| DataError::Output(format!("dataframe creation: {e}")))
    }

    pub fn to_csv(&self) -> Result<String, DataError> {
        let map_err = |e: csv::Error| DataError::Output(format!("csv: {e}"));
        let mut w = csv::Writer::from_writer(Vec::new());
        w.write_record(COLUMNS).map_err(map_err)?;
        for p in &self.points {
            w.write_record([
                p.date.to_string(),
                p.open.to_string(),
                p.high.to_string(),
                p.low.to_string(),
                p.close.to_string(),
                p.volume.map(|v| v.to_string()).unwrap_or_default(),
            ])
            .map_err(map_err)?;
        }
        let bytes = w
            .into_inner()
            .map_err(|e| DataError::Output(format!("csv flush: {e}")))?;
        String::from_utf8(bytes).map_err(|e| DataError::Output(format!("csv encoding: {e}")))
    }

    /// Fixed-width text table with a title line.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let title = match &self.full_name {
            Some(full) => format!("{} ({full})", self.name),
            None => self.name.clone(),
        };
        out.push_str(&format!("{title} - {} {}, {}\n", self.kind, span_label(self.span), self.order));
        out.push_str(&format!(
            "{:<10}  {:>10}  {:>10}  {:>10}  {:>10}  {:>12}\n",
            COLUMNS[0], COLUMNS[1], COLUMNS[2], COLUMNS[3], COLUMNS[4], COLUMNS[5]
        ));
        for p in &self.points {
            let volume = p.volume.map(|v| v.to_string()).unwrap_or_else(|| "-".into());
            out.push_str(&format!(
                "{:<10}  {:>10.4}  {:>10.4}  {:>10.4}  {:>10.4}  {:>12}\n",
                p.date, p.open, p.high, p.low, p.close, volume
            ));
        }
        out.push_str(&format!("{} rows\n", self.points.len()));
        out
    }
}

fn span_label(span: HistorySpan) -> &'static str {
    match span {
        HistorySpan::Recent => "recent data",
        HistorySpan::Historical => "historical data",
    }
}

impl FundInformation {
    pub fn to_json(&self) -> Result<String, DataError> {
        serde_json::to_string_pretty(self).map_err(|e| DataError::Output(format!("json: {e}")))
    }

    /// Two-column `label  value` listing.
    pub fn render_table(&self) -> String {
        let fields = self.fields();
        let width = fields.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
        fields
            .iter()
            .map(|(label, value)| format!("{label:<width$}  {value}\n"))
            .collect()
    }
}

/// One exportable column of a catalog table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogColumn {
    Name,
    FullName,
    Tag,
    Id,
    Symbol,
    Isin,
    Issuer,
    Country,
}

impl CatalogColumn {
    pub const ALL: [CatalogColumn; 8] = [
        CatalogColumn::Name,
        CatalogColumn::FullName,
        CatalogColumn::Tag,
        CatalogColumn::Id,
        CatalogColumn::Symbol,
        CatalogColumn::Isin,
        CatalogColumn::Issuer,
        CatalogColumn::Country,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CatalogColumn::Name => "name",
            CatalogColumn::FullName => "full_name",
            CatalogColumn::Tag => "tag",
            CatalogColumn::Id => "id",
            CatalogColumn::Symbol => "symbol",
            CatalogColumn::Isin => "isin",
            CatalogColumn::Issuer => "issuer",
            CatalogColumn::Country => "country",
        }
    }

    /// Columns a kind's catalog file carries, in file order.
    pub fn defaults(kind: InstrumentKind) -> &'static [CatalogColumn] {
        use CatalogColumn::*;
        match kind {
            InstrumentKind::Equity => &[Name, FullName, Tag, Id, Isin, Country],
            InstrumentKind::Fund => &[Name, Symbol, Tag, Id, Issuer, Isin, Country],
            InstrumentKind::Etf => &[Country, Name, FullName, Symbol, Tag, Id],
        }
    }

    fn value(self, entry: &CatalogEntry) -> Option<&str> {
        match self {
            CatalogColumn::Name => Some(&entry.name),
            CatalogColumn::FullName => entry.full_name.as_deref(),
            CatalogColumn::Tag => Some(&entry.tag),
            CatalogColumn::Id => Some(&entry.id),
            CatalogColumn::Symbol => entry.symbol.as_deref(),
            CatalogColumn::Isin => entry.isin.as_deref(),
            CatalogColumn::Issuer => entry.issuer.as_deref(),
            CatalogColumn::Country => entry.country.as_deref(),
        }
    }
}

impl fmt::Display for CatalogColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        CatalogColumn::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = CatalogColumn::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown column '{}' (expected one of {})", s.trim(), known.join(", "))
            })
    }
}

/// Parse a comma-separated column list such as `name,symbol,isin`.
pub fn parse_columns(list: &str) -> Result<Vec<CatalogColumn>, DataError> {
    let mut columns = Vec::new();
    for part in list.split(',').filter(|p| !p.trim().is_empty()) {
        let column: CatalogColumn = part.parse().map_err(DataError::InvalidArgument)?;
        if columns.contains(&column) {
            return Err(DataError::InvalidArgument(format!(
                "column '{column}' is listed twice"
            )));
        }
        columns.push(column);
    }
    if columns.is_empty() {
        return Err(DataError::InvalidArgument("no columns selected".into()));
    }
    Ok(columns)
}

/// A catalog row restricted to the selected columns, serialized as an
/// object whose keys follow the column order.
struct CatalogRecord<'a> {
    entry: &'a CatalogEntry,
    columns: &'a [CatalogColumn],
}

impl Serialize for CatalogRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in self.columns {
            map.serialize_entry(column.as_str(), &column.value(self.entry))?;
        }
        map.end()
    }
}

/// Pretty-printed JSON array, one object per row. Missing values are `null`.
pub fn catalog_to_json(
    entries: &[&CatalogEntry],
    columns: &[CatalogColumn],
) -> Result<String, DataError> {
    let records: Vec<CatalogRecord<'_>> = entries
        .iter()
        .map(|&entry| CatalogRecord { entry, columns })
        .collect();
    serde_json::to_string_pretty(&records).map_err(|e| DataError::Output(format!("json: {e}")))
}

/// CSV with the column names as header. Missing values are empty cells.
pub fn catalog_to_csv(
    entries: &[&CatalogEntry],
    columns: &[CatalogColumn],
) -> Result<String, DataError> {
    let map_err = |e: csv::Error| DataError::Output(format!("csv: {e}"));
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(columns.iter().map(|c| c.as_str()))
        .map_err(map_err)?;
    for entry in entries {
        w.write_record(columns.iter().map(|c| c.value(entry).unwrap_or_default()))
            .map_err(map_err)?;
    }
    let bytes = w
        .into_inner()
        .map_err(|e| DataError::Output(format!("csv flush: {e}")))?;
    String::from_utf8(bytes).map_err(|e| DataError::Output(format!("csv encoding: {e}")))
}

/// Left-aligned text table sized to its widest cells, with a row count.
pub fn render_catalog_table(entries: &[&CatalogEntry], columns: &[CatalogColumn]) -> String {
    let cells: Vec<Vec<&str>> = entries
        .iter()
        .map(|entry| columns.iter().map(|c| c.value(entry).unwrap_or("-")).collect())
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain([c.as_str().len()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: Vec<&str>| -> String {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{v:<w$}"))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(columns.iter().map(|c| c.as_str()).collect());
    for row in cells {
        out.push_str(&line(row));
    }
    out.push_str(&format!("{} rows\n", entries.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InstrumentKind, SortOrder};
    use chrono::NaiveDate;

    fn history(kind: InstrumentKind, span: HistorySpan) -> PriceHistory {
        let volume = kind.has_volume().then_some(1_200_000);
        PriceHistory {
            name: "BBVA".into(),
            full_name: (kind == InstrumentKind::Equity)
                .then(|| "Banco Bilbao Vizcaya Argentaria SA".to_string()),
            kind,
            span,
            order: SortOrder::Ascending,
            points: vec![
                PricePoint {
                    date: NaiveDate::from_ymd_opt(2020, 2, 1).unwrap(),
                    open: 10.0,
                    high: 11.0,
                    low: 9.5,
                    close: 10.5,
                    volume,
                },
                PricePoint {
                    date: NaiveDate::from_ymd_opt(2020, 2, 3).unwrap(),
                    open: 10.5,
                    high: 10.9,
                    low: 10.1,
                    close: 10.2,
                    volume: None,
                },
            ],
        }
    }

    #[test]
    fn json_uses_span_key_and_spanish_dates() {
        let v = history(InstrumentKind::Equity, HistorySpan::Historical)
            .to_json_value()
            .unwrap();
        assert_eq!(v["name"], "BBVA");
        assert_eq!(v["full_name"], "Banco Bilbao Vizcaya Argentaria SA");
        assert!(v.get("recent").is_none());
        let rows = v["historical"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["date"], "01/02/2020");
        assert_eq!(rows[0]["volume"], 1_200_000);
        assert!(rows[1].get("volume").is_none());
    }

    #[test]
    fn fund_json_has_no_full_name_or_volume() {
        let v = history(InstrumentKind::Fund, HistorySpan::Recent)
            .to_json_value()
            .unwrap();
        assert!(v.get("full_name").is_none());
        let rows = v["recent"].as_array().unwrap();
        assert!(rows.iter().all(|r| r.get("volume").is_none()));
    }

    #[test]
    fn dataframe_is_date_indexed() {
        let df = history(InstrumentKind::Equity, HistorySpan::Recent)
            .to_dataframe()
            .unwrap();
        let names: Vec<&str> = df.get_columns().iter().map(|c| c.name().as_str()).collect();
        assert_eq!(names, COLUMNS);
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("Date").unwrap().dtype(), &DataType::Date);

        let days = df.column("Date").unwrap().date().unwrap().get(0).unwrap();
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(epoch + chrono::Duration::days(days as i64), NaiveDate::from_ymd_opt(2020, 2, 1).unwrap());

        let vol = df.column("Volume").unwrap().u64().unwrap();
        assert_eq!(vol.get(0), Some(1_200_000));
        assert_eq!(vol.get(1), None);
    }

    #[test]
    fn csv_has_header_and_iso_dates() {
        let csv = history(InstrumentKind::Equity, HistorySpan::Recent)
            .to_csv()
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Date,Open,High,Low,Close,Volume");
        assert_eq!(lines[1], "2020-02-01,10,11,9.5,10.5,1200000");
        assert_eq!(lines[2], "2020-02-03,10.5,10.9,10.1,10.2,");
    }

    #[test]
    fn table_lists_every_row() {
        let text = history(InstrumentKind::Equity, HistorySpan::Recent).render_table();
        assert!(text.starts_with("BBVA (Banco Bilbao Vizcaya Argentaria SA) - equity recent data"));
        assert!(text.contains("2020-02-01"));
        assert!(text.contains("1200000"));
        assert!(text.trim_end().ends_with("2 rows"));
    }

    fn catalog_rows() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry {
                name: "BBVA".into(),
                full_name: Some("Banco Bilbao Vizcaya Argentaria SA".into()),
                tag: "bbva".into(),
                id: "26500".into(),
                symbol: None,
                isin: Some("ES0113211835".into()),
                issuer: None,
                country: Some("spain".into()),
            },
            CatalogEntry {
                name: "Telefónica".into(),
                full_name: None,
                tag: "telefonica".into(),
                id: "26481".into(),
                symbol: None,
                isin: None,
                issuer: None,
                country: Some("spain".into()),
            },
        ]
    }

    #[test]
    fn column_list_parses_in_order() {
        let cols = parse_columns("name, SYMBOL,isin").unwrap();
        assert_eq!(cols, [CatalogColumn::Name, CatalogColumn::Symbol, CatalogColumn::Isin]);
    }

    #[test]
    fn bad_column_lists_are_invalid_arguments() {
        for list in ["name,price", "name,name", " , "] {
            assert!(
                matches!(parse_columns(list), Err(DataError::InvalidArgument(_))),
                "{list}"
            );
        }
    }

    #[test]
    fn defaults_follow_the_catalog_files() {
        let names: Vec<&str> = CatalogColumn::defaults(InstrumentKind::Equity)
            .iter()
            .map(|c| c.as_str())
            .collect();
        assert_eq!(names, ["name", "full_name", "tag", "id", "isin", "country"]);
        assert_eq!(CatalogColumn::defaults(InstrumentKind::Etf)[0], CatalogColumn::Country);
    }

    #[test]
    fn catalog_json_keeps_column_order_and_nulls() {
        let rows = catalog_rows();
        let refs: Vec<&CatalogEntry> = rows.iter().collect();
        let cols = parse_columns("name,symbol,isin").unwrap();
        let json = catalog_to_json(&refs, &cols).unwrap();

        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        let arr = v.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["isin"], "ES0113211835");
        assert!(arr[0]["symbol"].is_null());
        assert!(arr[1]["isin"].is_null());
        assert!(arr[0].get("tag").is_none());

        let name_at = json.find("\"name\"").unwrap();
        let isin_at = json.find("\"isin\"").unwrap();
        assert!(name_at < isin_at);
    }

    #[test]
    fn catalog_csv_has_selected_header() {
        let rows = catalog_rows();
        let refs: Vec<&CatalogEntry> = rows.iter().collect();
        let csv = catalog_to_csv(&refs, &parse_columns("name,id,isin").unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, ["name,id,isin", "BBVA,26500,ES0113211835", "Telefónica,26481,"]);
    }

    #[test]
    fn catalog_table_pads_to_widest_cell() {
        let rows = catalog_rows();
        let refs: Vec<&CatalogEntry> = rows.iter().collect();
        let text = render_catalog_table(&refs, &parse_columns("name,isin").unwrap());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "name        isin");
        assert_eq!(lines[1], "BBVA        ES0113211835");
        assert_eq!(lines[2], "Telefónica  -");
        assert_eq!(lines[3], "2 rows");
    }

    #[test]
    fn fund_table_aligns_labels() {
        let info = FundInformation {
            fund_name: "Fondo".into(),
            rating: Some(4),
            ..Default::default()
        };
        let text = info.render_table();
        assert!(text.starts_with("Fund Name       Fondo\n"));
        assert!(text.contains("Rating          4\n"));
        assert!(text.contains("Category        -\n"));
    }
}
