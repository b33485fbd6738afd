use crate::interval::days_in_period;
use crate::utils::YearMonth;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Window used by [`PeriodMode::All`]; wide enough for every plausible record.
pub fn all_time_window() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or(NaiveDate::MIN),
        NaiveDate::from_ymd_opt(2030, 12, 31).unwrap_or(NaiveDate::MAX),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PeriodMode {
    #[schemars(description = "Whole history")]
    All,

    #[default]
    #[schemars(description = "Month to date")]
    Current,

    #[schemars(description = "Previous full calendar month")]
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPeriod {
    pub mode: PeriodMode,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Display only; never used in computation.
    pub label: String,
}

impl ResolvedPeriod {
    pub fn resolve(mode: PeriodMode, today: NaiveDate) -> Self {
        let this_month = YearMonth::of(today);
        match mode {
            PeriodMode::Current => Self {
                mode,
                start: this_month.first_day(),
                end: today,
                label: format!("Atual ({})", this_month.abbreviation()),
            },
            PeriodMode::Last => {
                let last_month = this_month.prev();
                Self {
                    mode,
                    start: last_month.first_day(),
                    end: last_month.last_day(),
                    label: format!("Passado ({})", last_month.abbreviation()),
                }
            }
            PeriodMode::All => {
                let (start, end) = all_time_window();
                Self {
                    mode,
                    start,
                    end,
                    label: "Histórico Geral".to_string(),
                }
            }
        }
    }

    /// Whether a transaction dated `date` counts towards this period.
    ///
    /// Month-to-date ignores entries later in the current month, and the
    /// historical view accepts every date.
    pub fn includes(&self, date: NaiveDate) -> bool {
        match self.mode {
            PeriodMode::All => true,
            PeriodMode::Current | PeriodMode::Last => date >= self.start && date <= self.end,
        }
    }

    pub fn days(&self) -> u64 {
        days_in_period(self.start, self.end)
    }
}

pub fn resolve_period(mode: PeriodMode, today: NaiveDate) -> ResolvedPeriod {
    ResolvedPeriod::resolve(mode, today)
}
