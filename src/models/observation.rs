use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single daily flow observation. `value` is a rate (m³/s) and may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub station_id: String,
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(station_id: impl Into<String>, date: NaiveDate, value: Option<f64>) -> Self {
        Self {
            station_id: station_id.into(),
            date,
            value,
        }
    }

    pub fn missing(station_id: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(station_id, date, None)
    }

    pub fn is_missing(&self) -> bool {
        self.value.is_none()
    }
}

/// An observation placed on the water-year calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarObservation {
    pub station_id: String,
    pub date: NaiveDate,
    pub value: Option<f64>,
    pub water_year: i32,
    pub day_of_year: u32,
    /// February 29; shares its day-of-year slot with February 28.
    pub leap_day: bool,
}

impl CalendarObservation {
    pub fn month(&self) -> u32 {
        self.date.month()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_observation() {
        let date = NaiveDate::from_ymd_opt(2023, 7, 15).unwrap();

        let obs = Observation::missing("08NM116", date);
        assert!(obs.is_missing());
        assert_eq!(obs.station_id, "08NM116");

        let obs = Observation::new("08NM116", date, Some(12.5));
        assert!(!obs.is_missing());
    }
}
