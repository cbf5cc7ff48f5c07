//! Holiday lookups used to count business days.
//!
//! The analytics never own holiday data: callers inject a [`HolidayCalendar`], which may
//! be a fixed list of dates ([`HolidaySet`]), a closure, or [`NoHolidays`] for
//! weekend-only counting.

use crate::utils::{days_of_month, is_weekend};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub trait HolidayCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool;

    /// A weekday that is not a holiday.
    fn is_business_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !self.is_holiday(date)
    }

    /// Business days in the month; zero for a month that does not exist.
    fn business_days_in_month(&self, year: i32, month: u32) -> u32 {
        days_of_month(year, month)
            .into_iter()
            .filter(|d| self.is_business_day(*d))
            .count() as u32
    }
}

impl<F> HolidayCalendar for F
where
    F: Fn(NaiveDate) -> bool,
{
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self(date)
    }
}

/// Weekends only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHolidays;

impl HolidayCalendar for NoHolidays {
    fn is_holiday(&self, _date: NaiveDate) -> bool {
        false
    }
}

/// A named, explicit list of public holidays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HolidaySet {
    #[schemars(description = "Locale or market the holidays belong to (e.g. 'KR')")]
    pub name: String,

    #[schemars(description = "Holiday dates in YYYY-MM-DD format")]
    pub dates: BTreeSet<NaiveDate>,
}

impl HolidaySet {
    pub fn new(name: impl Into<String>, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            name: name.into(),
            dates: dates.into_iter().collect(),
        }
    }

    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl HolidayCalendar for HolidaySet {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}
