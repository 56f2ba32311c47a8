//! # Clock
//!
//! The calendar date is the only ambient input the rules read. It comes in
//! through [`Clock`] so tests (and the host's `--day` flag) can pin it.

use chrono::{Datelike, Local, NaiveDate, Weekday};

/// Source of "today" for the calculation rules.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The host's local calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always returns the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Checks whether `date` falls on one of the given weekdays.
pub fn is_one_of(date: NaiveDate, days: &[Weekday]) -> bool {
    days.contains(&date.weekday())
}

/// Full English weekday name.
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
