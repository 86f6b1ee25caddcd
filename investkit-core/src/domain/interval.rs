//! Date intervals and the 20-year range splitter.
//!
//! The historical-data endpoint refuses spans longer than twenty years, so a
//! requested `[start, end]` range is cut into consecutive sub-intervals. The
//! cut is by calendar year: a chunk is emitted while `end.year - cur.year`
//! exceeds twenty, each chunk ending at `cur + 20 years`, and the remainder
//! becomes the last interval ending exactly at `end`.

use crate::data::provider::DataError;
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Maximum span of a single historical query, in calendar years.
pub const MAX_SPAN_YEARS: i32 = 20;

/// Date format used by the caller-facing API and the request form.
pub const REQUEST_DATE_FORMAT: &str = "%d/%m/%Y";

/// A closed date range `[start, end]` small enough for one historical query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateInterval {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DataError> {
        if end < start {
            return Err(DataError::InvalidArgument(format!(
                "interval end {end} precedes start {start}"
            )));
        }
        if end.year() - start.year() > MAX_SPAN_YEARS {
            return Err(DataError::InvalidArgument(format!(
                "interval {start}..{end} spans more than {MAX_SPAN_YEARS} years"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// `st_date` form value.
    pub fn start_param(&self) -> String {
        self.start.format(REQUEST_DATE_FORMAT).to_string()
    }

    /// `end_date` form value.
    pub fn end_param(&self) -> String {
        self.end.format(REQUEST_DATE_FORMAT).to_string()
    }
}

/// Parse a `dd/mm/yyyy` date. `which` names the argument in the error.
pub fn parse_request_date(value: &str, which: &str) -> Result<NaiveDate, DataError> {
    NaiveDate::parse_from_str(value.trim(), REQUEST_DATE_FORMAT).map_err(|_| {
        DataError::InvalidArgument(format!(
            "incorrect {which} date format '{value}', it should be 'dd/mm/yyyy'"
        ))
    })
}

/// Split `[start, end]` into consecutive intervals of at most twenty years.
///
/// Boundaries are shared: every interval but the last ends on the day the
/// next one starts.
pub fn split_range(start: NaiveDate, end: NaiveDate) -> Result<Vec<DateInterval>, DataError> {
    if end < start {
        return Err(DataError::InvalidArgument(format!(
            "start date {start} is after end date {end}"
        )));
    }

    let step = Months::new(12 * MAX_SPAN_YEARS as u32);
    let mut intervals = Vec::new();
    let mut cursor = start;

    while end.year() - cursor.year() > MAX_SPAN_YEARS {
        // 29 Feb clamps to 28 Feb when the target year is not a leap year.
        let next = cursor.checked_add_months(step).ok_or_else(|| {
            DataError::InvalidArgument(format!("date {cursor} is out of range"))
        })?;
        intervals.push(DateInterval::new(cursor, next)?);
        cursor = next;
    }
    intervals.push(DateInterval::new(cursor, end)?);

    Ok(intervals)
}

/// Parse both bounds as `dd/mm/yyyy` and split the range.
pub fn split_date_strings(start: &str, end: &str) -> Result<Vec<DateInterval>, DataError> {
    let start = parse_request_date(start, "start")?;
    let end = parse_request_date(end, "end")?;
    split_range(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn same_day_yields_one_interval() {
        let iv = split_range(d(2020, 1, 1), d(2020, 1, 1)).unwrap();
        assert_eq!(iv.len(), 1);
        assert_eq!(iv[0].start(), iv[0].end());
    }

    #[test]
    fn twenty_years_is_a_single_interval() {
        let iv = split_range(d(2000, 3, 15), d(2020, 12, 31)).unwrap();
        assert_eq!(iv.len(), 1);
        assert_eq!(iv[0].end(), d(2020, 12, 31));
    }

    #[test]
    fn forty_five_years_yields_three_chained_intervals() {
        let iv = split_range(d(1975, 1, 1), d(2020, 6, 30)).unwrap();
        assert_eq!(iv.len(), 3);
        assert_eq!(iv[0].start(), d(1975, 1, 1));
        assert_eq!(iv[0].end(), d(1995, 1, 1));
        assert_eq!(iv[1].start(), d(1995, 1, 1));
        assert_eq!(iv[1].end(), d(2015, 1, 1));
        assert_eq!(iv[2].start(), d(2015, 1, 1));
        assert_eq!(iv[2].end(), d(2020, 6, 30));
    }

    #[test]
    fn leap_day_start_clamps_in_non_leap_target() {
        // 2080 + 20 = 2100, which is not a leap year.
        let iv = split_range(d(2080, 2, 29), d(2130, 1, 1)).unwrap();
        assert_eq!(iv[0].end(), d(2100, 2, 28));
        assert_eq!(iv[1].start(), d(2100, 2, 28));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = split_range(d(2020, 1, 2), d(2020, 1, 1)).unwrap_err();
        assert!(matches!(err, DataError::InvalidArgument(_)));
    }

    #[test]
    fn malformed_dates_name_the_bad_bound() {
        let err = split_date_strings("2020-01-01", "01/01/2021").unwrap_err();
        assert!(err.to_string().contains("start"));
        let err = split_date_strings("01/01/2020", "31/13/2021").unwrap_err();
        assert!(err.to_string().contains("end"));
    }

    #[test]
    fn request_params_use_slashes() {
        let iv = DateInterval::new(d(2019, 2, 1), d(2019, 3, 9)).unwrap();
        assert_eq!(iv.start_param(), "01/02/2019");
        assert_eq!(iv.end_param(), "09/03/2019");
    }

    #[test]
    fn interval_rejects_overlong_span() {
        assert!(DateInterval::new(d(1990, 1, 1), d(2011, 1, 1)).is_err());
    }
}
