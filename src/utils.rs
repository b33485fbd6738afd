use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Portuguese month abbreviations used by every dashboard label.
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Rounds a currency value to two fractional digits.
///
/// Halves round towards positive infinity, so `-0.125` cleans to `-0.12`.
pub fn clean_amount(value: f64) -> f64 {
    ((value + f64::EPSILON) * 100.0 + 0.5).floor() / 100.0
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        _ => 28,
    }
}

pub fn month_abbreviation(month: u32) -> &'static str {
    MONTH_ABBREVIATIONS[(month.clamp(1, 12) - 1) as usize]
}

/// First word of a person's name, used in rent descriptions.
pub fn first_name(name: &str) -> &str {
    name.split(' ').next().unwrap_or(name)
}

fn calendar_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("month is within 1-12 and day is clamped to the month length")
}

/// A calendar month. `month` is always within 1-12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Moves by `months` calendar months, carrying into the year.
    pub fn shift(self, months: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn first_day(&self) -> NaiveDate {
        calendar_date(self.year, self.month, 1)
    }

    pub fn last_day(&self) -> NaiveDate {
        calendar_date(self.year, self.month, self.days())
    }

    /// Concrete date for a due day, clamped to the length of this month.
    pub fn due_date(&self, due_day: u32) -> NaiveDate {
        calendar_date(self.year, self.month, due_day.clamp(1, self.days()))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn abbreviation(&self) -> &'static str {
        month_abbreviation(self.month)
    }

    /// Short label such as `Out/26`.
    pub fn label(&self) -> String {
        format!("{}/{:02}", self.abbreviation(), self.year.rem_euclid(100))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
