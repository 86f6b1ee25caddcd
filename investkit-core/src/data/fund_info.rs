//! Fund overview parser.
//!
//! The fund landing page shows a grid of `div.overviewDataTable > div`
//! blocks, each a label (`span.float_lang_base_1`) and a value
//! (`span.float_lang_base_2`). Ratings are drawn as five stars, of which
//! the unlit ones carry `i.morningStarLight`.

use super::provider::DataError;
use super::table::{element_text, selector};
use super::units::{parse_decimal, parse_scaled};
use chrono::NaiveDate;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};

/// Overview figures for a single fund. Fields the page omits stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundInformation {
    pub fund_name: String,
    pub rating: Option<u8>,
    pub one_year_change: Option<String>,
    pub previous_close: Option<f64>,
    pub risk_rating: Option<u8>,
    pub ttm_yield: Option<String>,
    pub roe: Option<String>,
    pub issuer: Option<String>,
    pub turnover: Option<String>,
    pub roa: Option<String>,
    pub inception_date: Option<NaiveDate>,
    pub total_assets: Option<u64>,
    pub expenses: Option<String>,
    pub min_investment: Option<u64>,
    pub market_cap: Option<u64>,
    pub category: Option<String>,
}

impl FundInformation {
    /// `(label, value)` pairs in display order, for table rendering.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        fn show<T: ToString>(v: &Option<T>) -> String {
            v.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "-".into())
        }
        vec![
            ("Fund Name", self.fund_name.clone()),
            ("Rating", show(&self.rating)),
            ("1-Year Change", show(&self.one_year_change)),
            ("Previous Close", show(&self.previous_close)),
            ("Risk Rating", show(&self.risk_rating)),
            ("TTM Yield", show(&self.ttm_yield)),
            ("ROE", show(&self.roe)),
            ("Issuer", show(&self.issuer)),
            ("Turnover", show(&self.turnover)),
            ("ROA", show(&self.roa)),
            ("Inception Date", show(&self.inception_date)),
            ("Total Assets", show(&self.total_assets)),
            ("Expenses", show(&self.expenses)),
            ("Min Investment", show(&self.min_investment)),
            ("Market Cap", show(&self.market_cap)),
            ("Category", show(&self.category)),
        ]
    }
}

/// Parse the overview grid of a fund page.
pub fn parse_fund_overview(html: &str, fund_name: &str) -> Result<FundInformation, DataError> {
    let doc = Html::parse_document(html);
    let sel_block = selector("div.overviewDataTable > div")?;
    let sel_label = selector("span.float_lang_base_1")?;
    let sel_value = selector("span.float_lang_base_2")?;
    let sel_unlit = selector("span.morningStarsWrap i.morningStarLight")?;

    let mut info = FundInformation {
        fund_name: fund_name.to_string(),
        ..Default::default()
    };

    let mut blocks = 0usize;
    for block in doc.select(&sel_block) {
        blocks += 1;
        let Some(label) = block.select(&sel_label).next().map(element_text) else {
            continue;
        };
        let value = || -> Option<String> {
            block
                .select(&sel_value)
                .next()
                .map(element_text)
                .filter(|v| !v.is_empty())
        };
        let stars = |b: ElementRef<'_>| -> u8 {
            let unlit = b.select(&sel_unlit).count().min(5) as u8;
            5 - unlit
        };

        match label.as_str() {
            "Rating" => info.rating = Some(stars(block)),
            "Calificación de riesgo" => info.risk_rating = Some(stars(block)),
            "Var. en un año" => info.one_year_change = value().map(|v| v.replace(' ', "")),
            "Último cierre" => info.previous_close = value().map(|v| parse_decimal(&v)).transpose()?,
            "Rendimiento año móvil" => info.ttm_yield = value(),
            "ROE" => info.roe = value(),
            "Emisor" => info.issuer = value(),
            "Volumen de ventas" => info.turnover = value(),
            "ROA" => info.roa = value(),
            "Fecha de inicio" => {
                info.inception_date = value()
                    .map(|v| {
                        NaiveDate::parse_from_str(&v, "%d.%m.%Y").map_err(|_| {
                            DataError::ParseFailure(format!("bad inception date '{v}'"))
                        })
                    })
                    .transpose()?
            }
            "Total activos" => info.total_assets = value().map(|v| parse_scaled(&v)).transpose()?.flatten(),
            "Gastos" => info.expenses = value(),
            "Inversión mínima" => info.min_investment = value().map(|v| parse_scaled(&v)).transpose()?.flatten(),
            "Cap. mercado" => info.market_cap = value().map(|v| parse_scaled(&v)).transpose()?.flatten(),
            "Categoría" => info.category = value(),
            other => tracing::debug!(label = other, "unrecognised fund overview label"),
        }
    }

    if blocks == 0 {
        return Err(DataError::ParseFailure("fund overview table not found".into()));
    }
    Ok(info)
}
