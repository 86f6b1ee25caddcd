//! Catalog, transport, and scraping pipeline

pub mod aggregate;
pub mod catalog;
pub mod fund_info;
pub mod http;
pub mod investing;
pub mod listing;
pub mod profile;
pub mod provider;
pub mod table;
pub mod units;
pub mod user_agent;

pub use aggregate::aggregate;
pub use catalog::{CatalogRepository, MergeSummary};
pub use fund_info::FundInformation;
pub use http::HttpPageSource;
pub use investing::InvestingClient;
pub use profile::{CompanyProfile, ProfileLanguage};
pub use provider::{DataError, FormFields, PageSource};
pub use user_agent::UserAgentPool;
