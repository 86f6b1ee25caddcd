//! Shared helpers: a scripted in-memory page source and HTML builders.

#![allow(dead_code)]

use chrono::NaiveDate;
use investkit_core::data::{DataError, FormFields, PageSource};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

pub const BASE: &str = "https://es.investing.com";

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("fixture {}: {e}", path.display()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One request as seen by the scripted source.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub form: Vec<(String, String)>,
    pub timeout: Duration,
}

impl Request {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

type Responder = Box<dyn Fn(&Request) -> Result<String, DataError> + Send + Sync>;

/// PageSource that answers from a closure and records every request.
pub struct ScriptedSource {
    responder: Responder,
    log: Mutex<Vec<Request>>,
}

impl ScriptedSource {
    pub fn new(
        responder: impl Fn(&Request) -> Result<String, DataError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.log.lock().unwrap().clone()
    }

    fn answer(&self, req: Request) -> Result<String, DataError> {
        let out = (self.responder)(&req);
        self.log.lock().unwrap().push(req);
        out
    }
}

impl PageSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    fn get(&self, url: &str, timeout: Duration) -> Result<String, DataError> {
        self.answer(Request {
            method: Method::Get,
            url: url.to_string(),
            form: Vec::new(),
            timeout,
        })
    }

    fn post_form(
        &self,
        url: &str,
        form: &FormFields,
        timeout: Duration,
    ) -> Result<String, DataError> {
        self.answer(Request {
            method: Method::Post,
            url: url.to_string(),
            form: form.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            timeout,
        })
    }
}

fn spanish(x: f64) -> String {
    format!("{x:.2}").replace('.', ",")
}

/// `table#curr_table` with one row per `(date, close)`, in the given order.
/// Open/high/low are derived from the close; volume is `"1,5M"` when
/// `with_volume`.
pub fn history_table(rows: &[(NaiveDate, f64)], with_volume: bool) -> String {
    let mut body = String::new();
    for (date, close) in rows {
        body.push_str("<tr>");
        body.push_str(&format!("<td>{}</td>", date.format("%d.%m.%Y")));
        body.push_str(&format!("<td>{}</td>", spanish(*close)));
        body.push_str(&format!("<td>{}</td>", spanish(*close)));
        body.push_str(&format!("<td>{}</td>", spanish(close + 1.0)));
        body.push_str(&format!("<td>{}</td>", spanish(close - 1.0)));
        if with_volume {
            body.push_str("<td>1,5M</td>");
        }
        body.push_str("<td>0,00%</td></tr>");
    }
    format!(
        r#"<html><body><h2>Datos históricos</h2><table id="curr_table"><thead><tr><th>Fecha</th></tr></thead><tbody>{body}</tbody></table></body></html>"#
    )
}

pub fn no_results_table() -> String {
    r#"<table id="curr_table"><tbody><tr><td colspan="6">No se encontraron resultados</td></tr></tbody></table>"#
        .to_string()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Answer a `HistoricalDataAjax` POST with three rows, newest first: the
/// interval end, one year after the interval start, and the start itself.
/// The close of each row is its year.
pub fn interval_page(req: &Request, with_volume: bool) -> Result<String, DataError> {
    let parse = |k: &str| {
        NaiveDate::parse_from_str(req.field(k).unwrap(), "%d/%m/%Y").unwrap()
    };
    let (start, end) = (parse("st_date"), parse("end_date"));
    let mid = start + chrono::Duration::days(365);
    let mut rows = vec![(end, 0.0), (mid, 0.0), (start, 0.0)];
    rows.dedup_by_key(|(d, _)| *d);
    let rows: Vec<(NaiveDate, f64)> = rows
        .into_iter()
        .filter(|(d, _)| *d <= end)
        .map(|(d, _)| (d, chrono::Datelike::year(&d) as f64))
        .collect();
    Ok(history_table(&rows, with_volume))
}
