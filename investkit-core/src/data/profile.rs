//! Company profile sources.
//!
//! English descriptions come from the investing.com profile page, Spanish
//! ones from the Bolsa de Madrid listing sheet (looked up by ISIN).

use super::provider::DataError;
use super::table::{element_text, selector};
use crate::domain::CatalogEntry;
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileLanguage {
    English,
    Spanish,
}

impl FromStr for ProfileLanguage {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Ok(ProfileLanguage::English),
            "spanish" | "es" => Ok(ProfileLanguage::Spanish),
            other => Err(DataError::InvalidArgument(format!(
                "language '{other}' is not valid, it can just be either spanish (es) or english (en)"
            ))),
        }
    }
}

/// A company description and the page it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub url: String,
    pub description: Option<String>,
}

/// Profile page for an equity in the given language.
pub fn profile_url(entry: &CatalogEntry, language: ProfileLanguage) -> Result<String, DataError> {
    match language {
        ProfileLanguage::English => Ok(format!(
            "https://www.investing.com/equities/{}-company-profile",
            entry.tag
        )),
        ProfileLanguage::Spanish => {
            let isin = entry.isin.as_deref().filter(|s| !s.is_empty()).ok_or_else(|| {
                DataError::Catalog(format!("equity '{}' has no ISIN in the catalog", entry.name))
            })?;
            Ok(format!(
                "http://www.bolsamadrid.es/esp/aspx/Empresas/FichaValor.aspx?ISIN={isin}"
            ))
        }
    }
}

/// Extract the description from a fetched profile page. A page without
/// the description element yields `None`.
pub fn parse_profile(html: &str, language: ProfileLanguage) -> Result<Option<String>, DataError> {
    let doc = Html::parse_document(html);
    let css = match language {
        ProfileLanguage::English => "#profile-fullStory-showhide",
        ProfileLanguage::Spanish => "td[class*='Perfil']",
    };
    let sel = selector(css)?;
    Ok(doc
        .select(&sel)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty()))
}
