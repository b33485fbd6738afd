//! Inclusive calendar-day arithmetic over date ranges.

use chrono::NaiveDate;

/// Number of calendar days in `[start, end]`, both ends included.
///
/// A reversed range yields zero instead of a negative count.
pub fn days_in_period(start: NaiveDate, end: NaiveDate) -> u64 {
    let span = (end - start).num_days() + 1;
    span.max(0) as u64
}

/// Days shared by `[a_start, a_end]` and `[b_start, b_end]`.
pub fn intersection_days(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> u64 {
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    if start <= end {
        days_in_period(start, end)
    } else {
        0
    }
}
