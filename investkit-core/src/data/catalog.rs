//! Catalog repository: the instrument reference tables.
//!
//! One CSV per instrument kind (`equities.csv`, `funds.csv`, `etfs.csv`),
//! bundled into the binary and optionally overridden by a directory of
//! fresher copies. The repository is built once and passed to whatever
//! needs lookups; it never touches the filesystem after construction.

use super::provider::DataError;
use crate::domain::{CatalogEntry, InstrumentKind};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

const BUNDLED_EQUITIES: &str = include_str!("../../resources/equities.csv");
const BUNDLED_FUNDS: &str = include_str!("../../resources/funds.csv");
const BUNDLED_ETFS: &str = include_str!("../../resources/etfs.csv");

/// Fold a name for comparison: transliterate to ASCII, then lowercase.
/// `"Telefónica"` and `"TELEFONICA"` both fold to `"telefonica"`.
pub fn fold_name(name: &str) -> String {
    deunicode::deunicode(name.trim()).to_lowercase()
}

/// Parse catalog rows from CSV text.
pub fn parse_catalog_csv(content: &str) -> Result<Vec<CatalogEntry>, DataError> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut entries = Vec::new();
    for (i, record) in reader.deserialize::<CatalogEntry>().enumerate() {
        let entry = record.map_err(|e| DataError::Catalog(format!("row {}: {e}", i + 1)))?;
        entries.push(entry);
    }
    Ok(entries)
}

/// Serialize catalog rows back to CSV.
pub fn write_catalog_csv(entries: &[CatalogEntry]) -> Result<String, DataError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for entry in entries {
        wtr.serialize(entry)
            .map_err(|e| DataError::Catalog(format!("serialize {}: {e}", entry.name)))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| DataError::Catalog(format!("flush CSV: {e}")))?;
    String::from_utf8(bytes).map_err(|e| DataError::Catalog(format!("CSV is not UTF-8: {e}")))
}

/// In-memory instrument catalogs, one table per kind.
#[derive(Debug, Clone, Default)]
pub struct CatalogRepository {
    tables: BTreeMap<InstrumentKind, Vec<CatalogEntry>>,
}

impl CatalogRepository {
    /// An empty repository. Lookups fail with `NotFound` until tables are
    /// inserted.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The catalogs shipped with the crate.
    pub fn bundled() -> Result<Self, DataError> {
        let mut repo = Self::empty();
        for kind in InstrumentKind::ALL {
            repo.insert(kind, parse_catalog_csv(bundled_csv(kind))?);
        }
        Ok(repo)
    }

    /// Load `{dir}/equities.csv`, `{dir}/funds.csv`, `{dir}/etfs.csv`.
    /// Missing files fall back to the bundled table for that kind.
    pub fn from_dir(dir: &Path) -> Result<Self, DataError> {
        let mut repo = Self::bundled()?;
        for kind in InstrumentKind::ALL {
            let path = dir.join(kind.catalog_file());
            if !path.exists() {
                continue;
            }
            let content = std::fs::read_to_string(&path)
                .map_err(|e| DataError::Catalog(format!("read {}: {e}", path.display())))?;
            let entries = parse_catalog_csv(&content)
                .map_err(|e| DataError::Catalog(format!("{}: {e}", path.display())))?;
            tracing::debug!(%kind, rows = entries.len(), path = %path.display(), "catalog override");
            repo.insert(kind, entries);
        }
        Ok(repo)
    }

    /// Bundled catalogs, overridden from `dir` when given.
    pub fn load(dir: Option<&Path>) -> Result<Self, DataError> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::bundled(),
        }
    }

    /// Replace the table for `kind`.
    pub fn insert(&mut self, kind: InstrumentKind, entries: Vec<CatalogEntry>) {
        self.tables.insert(kind, entries);
    }

    /// Fold freshly listed rows into the table for `kind`, keyed by `id`.
    ///
    /// A listed row replaces the stored row with the same id, but any
    /// column the listing leaves empty keeps its stored value (listings
    /// carry no ISIN or issuer). Unknown ids are appended in listing order.
    /// Stored rows the listing no longer shows are kept.
    pub fn merge(&mut self, kind: InstrumentKind, fetched: Vec<CatalogEntry>) -> MergeSummary {
        let table = self.tables.entry(kind).or_default();
        let mut by_id: HashMap<String, usize> = table
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
        let mut summary = MergeSummary::default();

        for row in fetched {
            match by_id.get(&row.id) {
                Some(&i) => {
                    let stored = &mut table[i];
                    *stored = CatalogEntry {
                        full_name: row.full_name.or_else(|| stored.full_name.take()),
                        symbol: row.symbol.or_else(|| stored.symbol.take()),
                        isin: row.isin.or_else(|| stored.isin.take()),
                        issuer: row.issuer.or_else(|| stored.issuer.take()),
                        country: row.country.or_else(|| stored.country.take()),
                        ..row
                    };
                    summary.updated += 1;
                }
                None => {
                    by_id.insert(row.id.clone(), table.len());
                    table.push(row);
                    summary.added += 1;
                }
            }
        }
        summary
    }

    pub fn entries(&self, kind: InstrumentKind) -> &[CatalogEntry] {
        self.tables.get(&kind).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn names(&self, kind: InstrumentKind) -> Vec<&str> {
        self.entries(kind).iter().map(|e| e.name.as_str()).collect()
    }

    /// Case- and diacritic-insensitive lookup by name.
    pub fn find(&self, kind: InstrumentKind, name: &str) -> Result<&CatalogEntry, DataError> {
        let wanted = fold_name(name);
        self.entries(kind)
            .iter()
            .find(|e| fold_name(&e.name) == wanted)
            .ok_or_else(|| DataError::NotFound {
                kind,
                name: name.trim().to_lowercase(),
            })
    }

    /// ETFs listed in `country` (case-insensitive).
    pub fn etfs_in(&self, country: &str) -> Vec<&CatalogEntry> {
        let wanted = fold_name(country);
        self.entries(InstrumentKind::Etf)
            .iter()
            .filter(|e| e.country.as_deref().map(fold_name).as_deref() == Some(wanted.as_str()))
            .collect()
    }

    /// Distinct ETF countries, sorted.
    pub fn etf_countries(&self) -> Vec<&str> {
        self.entries(InstrumentKind::Etf)
            .iter()
            .filter_map(|e| e.country.as_deref())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Write one kind's table to `{dir}/{kind file}`.
    pub fn save(&self, kind: InstrumentKind, dir: &Path) -> Result<PathBuf, DataError> {
        std::fs::create_dir_all(dir)
            .map_err(|e| DataError::Catalog(format!("create {}: {e}", dir.display())))?;
        let path = dir.join(kind.catalog_file());
        let csv = write_catalog_csv(self.entries(kind))?;
        std::fs::write(&path, csv)
            .map_err(|e| DataError::Catalog(format!("write {}: {e}", path.display())))?;
        Ok(path)
    }
}

/// Row counts of a [`CatalogRepository::merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub updated: usize,
    pub added: usize,
}

fn bundled_csv(kind: InstrumentKind) -> &'static str {
    match kind {
        InstrumentKind::Equity => BUNDLED_EQUITIES,
        InstrumentKind::Fund => BUNDLED_FUNDS,
        InstrumentKind::Etf => BUNDLED_ETFS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalogs_are_non_empty() {
        let repo = CatalogRepository::bundled().unwrap();
        for kind in InstrumentKind::ALL {
            assert!(!repo.entries(kind).is_empty(), "{kind} catalog is empty");
        }
    }

    #[test]
    fn lookup_ignores_case_and_accents() {
        let repo = CatalogRepository::bundled().unwrap();
        let e = repo.find(InstrumentKind::Equity, "TELEFONICA").unwrap();
        assert_eq!(e.tag, "telefonica");
        let e = repo.find(InstrumentKind::Equity, " telefónica ").unwrap();
        assert_eq!(e.tag, "telefonica");
    }

    #[test]
    fn lookup_miss_is_not_found() {
        let repo = CatalogRepository::bundled().unwrap();
        let err = repo.find(InstrumentKind::Fund, "Nonexistent Fund").unwrap_err();
        assert!(matches!(
            err,
            DataError::NotFound { kind: InstrumentKind::Fund, ref name } if name == "nonexistent fund"
        ));
    }

    #[test]
    fn lookup_is_scoped_to_kind() {
        let repo = CatalogRepository::bundled().unwrap();
        assert!(repo.find(InstrumentKind::Etf, "BBVA").is_err());
        assert!(repo.find(InstrumentKind::Equity, "BBVA").is_ok());
    }

    #[test]
    fn optional_columns_may_be_missing() {
        let entries = parse_catalog_csv("name,tag,id\nFoo,foo,1\n").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].symbol, None);
        assert_eq!(entries[0].full_name, None);
    }

    #[test]
    fn missing_required_column_is_a_catalog_error() {
        let err = parse_catalog_csv("name,id\nFoo,1\n").unwrap_err();
        assert!(matches!(err, DataError::Catalog(_)));
    }

    #[test]
    fn etf_country_filter() {
        let repo = CatalogRepository::bundled().unwrap();
        let spain = repo.etfs_in("Spain");
        assert!(!spain.is_empty());
        assert!(spain.iter().all(|e| e.country.as_deref() == Some("spain")));
        assert!(repo.etf_countries().contains(&"united states"));
    }

    fn listed(id: &str, name: &str, tag: &str) -> CatalogEntry {
        CatalogEntry {
            name: name.into(),
            full_name: None,
            tag: tag.into(),
            id: id.into(),
            symbol: None,
            isin: None,
            issuer: None,
            country: Some("spain".into()),
        }
    }

    #[test]
    fn merge_keeps_columns_the_listing_lacks() {
        let mut repo = CatalogRepository::bundled().unwrap();
        let before = repo.find(InstrumentKind::Equity, "BBVA").unwrap().clone();
        let stored_rows = repo.entries(InstrumentKind::Equity).len();

        let summary = repo.merge(
            InstrumentKind::Equity,
            vec![
                listed(&before.id, "BBVA", "bbva"),
                listed("9999001", "Nueva Cotizada", "nueva-cotizada"),
            ],
        );

        assert_eq!(summary, MergeSummary { updated: 1, added: 1 });
        assert_eq!(repo.entries(InstrumentKind::Equity).len(), stored_rows + 1);
        let after = repo.find(InstrumentKind::Equity, "BBVA").unwrap();
        assert_eq!(after.isin, before.isin);
        assert_eq!(after.full_name, before.full_name);
        assert!(after.isin.is_some());
        let added = repo.find(InstrumentKind::Equity, "Nueva Cotizada").unwrap();
        assert_eq!(added.isin, None);
    }

    #[test]
    fn merge_prefers_listed_values() {
        let mut repo = CatalogRepository::empty();
        let mut old = listed("1", "Old Name", "old-tag");
        old.isin = Some("ES0000000001".into());
        repo.insert(InstrumentKind::Equity, vec![old]);

        repo.merge(InstrumentKind::Equity, vec![listed("1", "New Name", "new-tag")]);

        let rows = repo.entries(InstrumentKind::Equity);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "New Name");
        assert_eq!(rows[0].tag, "new-tag");
        assert_eq!(rows[0].isin.as_deref(), Some("ES0000000001"));
    }

    #[test]
    fn merge_into_missing_table_adds_everything() {
        let mut repo = CatalogRepository::empty();
        let summary = repo.merge(
            InstrumentKind::Fund,
            vec![listed("1", "A", "a"), listed("2", "B", "b")],
        );
        assert_eq!(summary, MergeSummary { updated: 0, added: 2 });
        assert_eq!(repo.names(InstrumentKind::Fund), ["A", "B"]);
    }

    #[test]
    fn csv_written_back_parses_to_the_same_rows() {
        let repo = CatalogRepository::bundled().unwrap();
        let csv = write_catalog_csv(repo.entries(InstrumentKind::Etf)).unwrap();
        assert_eq!(parse_catalog_csv(&csv).unwrap(), repo.entries(InstrumentKind::Etf));
    }
}
