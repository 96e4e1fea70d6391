//! Water-year calendar arithmetic.
//!
//! Day-of-year is measured against a fixed pair of non-leap reference years so
//! a given month and day always lands in the same slot, whatever the year.
//! February 29 shares the February 28 slot and is flagged as the leap day.

use crate::error::{ProcessingError, Result};
use crate::models::{CalendarObservation, Observation};
use crate::utils::constants::{DAYS_PER_WATER_YEAR, REFERENCE_YEAR};
use chrono::{Datelike, Duration, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaterYearCalendar {
    start_month: u32,
    origin: NaiveDate,
}

impl WaterYearCalendar {
    pub fn new(start_month: u32) -> Result<Self> {
        if !(1..=12).contains(&start_month) {
            return Err(ProcessingError::InvalidConfig(format!(
                "Water year start month {} is outside 1-12",
                start_month
            )));
        }

        let origin = NaiveDate::from_ymd_opt(REFERENCE_YEAR, start_month, 1).ok_or_else(|| {
            ProcessingError::InvalidConfig(format!("Invalid start month {}", start_month))
        })?;

        Ok(Self {
            start_month,
            origin,
        })
    }

    pub fn start_month(&self) -> u32 {
        self.start_month
    }

    /// Water years are labelled by the calendar year in which they end.
    pub fn water_year(&self, date: NaiveDate) -> i32 {
        if self.start_month > 1 && date.month() >= self.start_month {
            date.year() + 1
        } else {
            date.year()
        }
    }

    pub fn is_leap_day(date: NaiveDate) -> bool {
        date.month() == 2 && date.day() == 29
    }

    /// 1-based slot within the water year, always in 1..=365.
    pub fn day_of_year(&self, date: NaiveDate) -> u32 {
        let reference = self.reference_date(date.month(), date.day());
        (reference - self.origin).num_days() as u32 + 1
    }

    /// Representative calendar date of a day-of-year slot.
    pub fn calendar_date(&self, day_of_year: u32) -> NaiveDate {
        let offset = day_of_year.clamp(1, DAYS_PER_WATER_YEAR) - 1;
        self.origin + Duration::days(offset as i64)
    }

    /// First and last calendar dates of a water year, or `None` when either
    /// falls outside the range chrono can represent.
    pub fn water_year_bounds(&self, water_year: i32) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.water_year_start(water_year)?;
        let last = self
            .water_year_start(water_year.checked_add(1)?)?
            .pred_opt()?;
        Some((first, last))
    }

    /// Number of calendar days in a water year (365 or 366).
    pub fn days_in_water_year(&self, water_year: i32) -> Option<u32> {
        let (first, last) = self.water_year_bounds(water_year)?;
        Some((last - first).num_days() as u32 + 1)
    }

    pub fn normalize(&self, observation: &Observation) -> CalendarObservation {
        CalendarObservation {
            station_id: observation.station_id.clone(),
            date: observation.date,
            value: observation.value,
            water_year: self.water_year(observation.date),
            day_of_year: self.day_of_year(observation.date),
            leap_day: Self::is_leap_day(observation.date),
        }
    }

    pub fn normalize_all(&self, observations: &[Observation]) -> Vec<CalendarObservation> {
        observations.iter().map(|o| self.normalize(o)).collect()
    }

    fn water_year_start(&self, water_year: i32) -> Option<NaiveDate> {
        let year = if self.start_month > 1 {
            water_year.checked_sub(1)?
        } else {
            water_year
        };
        NaiveDate::from_ymd_opt(year, self.start_month, 1)
    }

    fn reference_date(&self, month: u32, day: u32) -> NaiveDate {
        let year = if month >= self.start_month {
            REFERENCE_YEAR
        } else {
            REFERENCE_YEAR + 1
        };
        let day = if month == 2 && day == 29 { 28 } else { day };
        // month/day come from a valid date and the reference years are not leap years
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or(self.origin)
    }
}

impl Default for WaterYearCalendar {
    fn default() -> Self {
        Self {
            start_month: 1,
            origin: NaiveDate::from_ymd_opt(REFERENCE_YEAR, 1, 1).unwrap_or(NaiveDate::MIN),
        }
    }
}
