//! Calendar features derived from a date alone.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Date parts used as model features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFeatures {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// 0 = Monday through 6 = Sunday.
    pub day_of_week: u32,
    pub is_weekend: bool,
}

impl CalendarFeatures {
    pub fn from_date(date: NaiveDate) -> Self {
        let weekday = date.weekday();
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            day_of_week: weekday.num_days_from_monday(),
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
        }
    }
}
