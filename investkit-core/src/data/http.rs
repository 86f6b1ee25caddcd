//! Blocking HTTP page source.
//!
//! One request per call, sequential, no retry. Each request carries a
//! random user agent and the headers the site's own AJAX calls send.
//! Compression is negotiated by reqwest's gzip/brotli/deflate decoders,
//! which also set `Accept-Encoding`.

use super::provider::{DataError, FormFields, PageSource};
use super::user_agent::UserAgentPool;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONNECTION, USER_AGENT};
use reqwest::StatusCode;
use std::time::Duration;

/// Only `200 OK` carries a usable page; anything else, redirects included,
/// means the site refused the request.
pub(crate) fn check_status(status: StatusCode) -> Result<(), DataError> {
    if status == StatusCode::OK {
        Ok(())
    } else {
        Err(DataError::UpstreamUnavailable {
            status: status.as_u16(),
        })
    }
}

/// Page source backed by `reqwest::blocking`.
pub struct HttpPageSource {
    client: Client,
    user_agents: UserAgentPool,
}

impl HttpPageSource {
    pub fn new(user_agents: UserAgentPool) -> Result<Self, DataError> {
        let client = Client::builder()
            .build()
            .map_err(|e| DataError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            user_agents,
        })
    }

    fn headers(&self) -> Result<HeaderMap, DataError> {
        let agent = self.user_agents.random();
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(agent)
                .map_err(|e| DataError::InvalidArgument(format!("user agent '{agent}': {e}")))?,
        );
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/html"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        Ok(headers)
    }

    fn read_body(url: &str, sent: Result<Response, reqwest::Error>) -> Result<String, DataError> {
        let resp = sent.map_err(|e| DataError::Network(format!("{url}: {e}")))?;
        if let Err(e) = check_status(resp.status()) {
            tracing::debug!(url, status = resp.status().as_u16(), "non-200 response");
            return Err(e);
        }
        resp.text()
            .map_err(|e| DataError::Network(format!("read body of {url}: {e}")))
    }
}

impl PageSource for HttpPageSource {
    fn name(&self) -> &str {
        "http"
    }

    fn get(&self, url: &str, timeout: Duration) -> Result<String, DataError> {
        tracing::debug!(url, ?timeout, "GET");
        let sent = self
            .client
            .get(url)
            .headers(self.headers()?)
            .timeout(timeout)
            .send();
        Self::read_body(url, sent)
    }

    fn post_form(
        &self,
        url: &str,
        form: &FormFields,
        timeout: Duration,
    ) -> Result<String, DataError> {
        tracing::debug!(url, ?timeout, fields = form.len(), "POST");
        let sent = self
            .client
            .post(url)
            .headers(self.headers()?)
            .form(form)
            .timeout(timeout)
            .send();
        Self::read_body(url, sent)
    }
}
