//! Aggregation of per-interval pages into one ordered series.
//!
//! Each page arrives newest-first and intervals are fetched oldest-first,
//! so plain concatenation is ordered within a page but not across pages.
//! Rows are therefore merged by date: the result is globally ascending or
//! globally descending, whatever the number of intervals.
//!
//! Adjacent intervals share their boundary day and both pages carry it;
//! such a date is kept once.

use crate::domain::{PricePoint, SortOrder};

/// Merge pages into a single series in `order`, one row per date.
pub fn aggregate(pages: Vec<Vec<PricePoint>>, order: SortOrder) -> Vec<PricePoint> {
    let mut points: Vec<PricePoint> = pages.into_iter().flatten().collect();

    // Stable: for a duplicated date the row from the earlier page survives.
    points.sort_by_key(|p| p.date);
    let before = points.len();
    points.dedup_by_key(|p| p.date);
    let dropped = before - points.len();
    if dropped > 0 {
        tracing::debug!(dropped, "dropped rows repeated at interval boundaries");
    }

    if order == SortOrder::Descending {
        points.reverse();
    }
    points
}
