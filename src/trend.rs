use crate::aggregator::PeriodTotals;
use crate::schema::{PropertyFilter, Transaction};
use crate::utils::YearMonth;
use chrono::NaiveDate;
use serde::Serialize;

/// Number of calendar months in the profit chart, current month included.
pub const TREND_MONTHS: i32 = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub profit: f64,
    pub is_current: bool,
}

/// Profit per calendar month for the trailing year, oldest first.
pub fn build_trend(
    transactions: &[Transaction],
    filter: &PropertyFilter,
    today: NaiveDate,
) -> Vec<TrendPoint> {
    let current = YearMonth::of(today);

    (0..TREND_MONTHS)
        .rev()
        .map(|back| {
            let target = current.shift(-back);
            let totals = PeriodTotals::from_transactions(
                transactions
                    .iter()
                    .filter(|t| filter.matches(t.linked_property()) && target.contains(t.date)),
            );
            TrendPoint {
                year: target.year(),
                month: target.month(),
                label: target.abbreviation().to_string(),
                profit: totals.profit,
                is_current: back == 0,
            }
        })
        .collect()
}
