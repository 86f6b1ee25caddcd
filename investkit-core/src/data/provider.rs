//! Page source trait and structured error types.
//!
//! The PageSource trait abstracts over the HTTP layer so the scraping
//! pipeline can be driven by canned HTML in tests. Implementations return
//! the response body on HTTP 200 and a structured error otherwise.

use crate::domain::InstrumentKind;
use std::time::Duration;
use thiserror::Error;

/// Structured error types for data operations.
///
/// Every failure is surfaced to the caller as-is: there is no local
/// recovery, no retry and no partial result.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{kind} '{name}' not found, check if it is correct")]
    NotFound { kind: InstrumentKind, name: String },

    #[error("upstream returned HTTP {status}, try again later")]
    UpstreamUnavailable { status: u16 },

    #[error("network unreachable: {0}")]
    Network(String),

    #[error("{kind} '{name}' information unavailable or not found")]
    NoResults { kind: InstrumentKind, name: String },

    #[error("unexpected page markup: {0}")]
    ParseFailure(String),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("output error: {0}")]
    Output(String),
}

/// A form-encoded POST body, in field order.
pub type FormFields = Vec<(&'static str, String)>;

/// Blocking transport for page downloads.
///
/// Implementations must not retry: a single non-200 answer is reported as
/// [`DataError::UpstreamUnavailable`].
pub trait PageSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// `GET` a page and return its body.
    fn get(&self, url: &str, timeout: Duration) -> Result<String, DataError>;

    /// `POST` a form and return the response body.
    fn post_form(
        &self,
        url: &str,
        form: &FormFields,
        timeout: Duration,
    ) -> Result<String, DataError>;
}
