use crate::error::{ProcessingError, Result};
use crate::models::Observation;
use crate::processors::WaterYearCalendar;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Inserts null-valued observations so every water year touched by a station's
/// record has all of its calendar days.
pub struct GapFiller {
    calendar: WaterYearCalendar,
}

impl GapFiller {
    pub fn new(calendar: WaterYearCalendar) -> Self {
        Self { calendar }
    }

    /// Fill gaps for every station; output is grouped by station (ascending id)
    /// and sorted by date within each station.
    pub fn fill(&self, observations: Vec<Observation>) -> Result<Vec<Observation>> {
        let mut by_station: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
        for observation in observations {
            by_station
                .entry(observation.station_id.clone())
                .or_default()
                .push(observation);
        }

        let mut filled = Vec::new();
        for (station_id, records) in by_station {
            filled.extend(self.fill_station(&station_id, records)?);
        }
        Ok(filled)
    }

    /// Fill gaps for a single station's observations.
    ///
    /// Fails with `DateOutOfRange` when a touched water year extends past the
    /// dates chrono can represent.
    pub fn fill_station(
        &self,
        station_id: &str,
        observations: Vec<Observation>,
    ) -> Result<Vec<Observation>> {
        let (Some(first), Some(last)) = (
            observations.iter().map(|o| o.date).min(),
            observations.iter().map(|o| o.date).max(),
        ) else {
            return Ok(Vec::new());
        };

        // duplicate dates: last one wins
        let mut values: HashMap<NaiveDate, Option<f64>> = HashMap::with_capacity(observations.len());
        for observation in observations {
            values.insert(observation.date, observation.value);
        }

        let (start, _) = self.bounds(station_id, first)?;
        let (_, end) = self.bounds(station_id, last)?;

        let mut filled = Vec::with_capacity((end - start).num_days() as usize + 1);
        for date in start.iter_days().take_while(|d| *d <= end) {
            let value = values.get(&date).copied().flatten();
            filled.push(Observation::new(station_id, date, value));
        }

        Ok(filled)
    }

    fn bounds(&self, station_id: &str, date: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let water_year = self.calendar.water_year(date);
        self.calendar
            .water_year_bounds(water_year)
            .ok_or_else(|| ProcessingError::DateOutOfRange {
                station_id: station_id.to_string(),
                water_year,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fill_extends_to_water_year_bounds() {
        let filler = GapFiller::new(WaterYearCalendar::new(1).unwrap());
        let observations = vec![
            Observation::new("A", date(2001, 3, 10), Some(1.0)),
            Observation::new("A", date(2001, 3, 12), Some(2.0)),
        ];

        let filled = filler.fill(observations).unwrap();

        assert_eq!(filled.len(), 365);
        assert_eq!(filled[0].date, date(2001, 1, 1));
        assert_eq!(filled[364].date, date(2001, 12, 31));
        assert!(filled[0].is_missing());

        let march_10 = filled.iter().position(|o| o.date == date(2001, 3, 10)).unwrap();
        assert_eq!(filled[march_10].value, Some(1.0));
        assert_eq!(filled[march_10 + 1].value, None);
        assert_eq!(filled[march_10 + 2].value, Some(2.0));
    }

    #[test]
    fn test_fill_leap_and_custom_start() {
        let filler = GapFiller::new(WaterYearCalendar::new(10).unwrap());
        let observations = vec![
            Observation::new("A", date(2003, 12, 1), Some(1.0)),
            Observation::new("A", date(2004, 11, 1), Some(1.0)),
        ];

        let filled = filler.fill(observations).unwrap();

        // water years 2004 (leap) and 2005
        assert_eq!(filled.len(), 366 + 365);
        assert_eq!(filled[0].date, date(2003, 10, 1));
        assert_eq!(filled.last().unwrap().date, date(2005, 9, 30));
        assert!(filled.iter().any(|o| o.date == date(2004, 2, 29)));
        assert!(filled.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_fill_groups_stations() {
        let filler = GapFiller::new(WaterYearCalendar::default());
        let observations = vec![
            Observation::new("B", date(2001, 6, 1), Some(1.0)),
            Observation::new("A", date(2002, 6, 1), Some(2.0)),
            Observation::new("B", date(2001, 6, 2), Some(3.0)),
        ];

        let filled = filler.fill(observations).unwrap();

        assert_eq!(filled.len(), 730);
        assert!(filled[..365].iter().all(|o| o.station_id == "A"));
        assert!(filled[365..].iter().all(|o| o.station_id == "B"));
        assert_eq!(filled[0].date, date(2002, 1, 1));
    }

    #[test]
    fn test_empty_input() {
        let filler = GapFiller::new(WaterYearCalendar::default());
        assert!(filler.fill(Vec::new()).unwrap().is_empty());
        assert!(filler.fill_station("A", Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_unrepresentable_water_year() {
        let filler = GapFiller::new(WaterYearCalendar::new(10).unwrap());
        let observations = vec![Observation::new("A", NaiveDate::MAX, Some(1.0))];

        let err = filler.fill_station("A", observations).unwrap_err();

        assert!(err.is_station_scoped());
        assert!(matches!(
            err,
            ProcessingError::DateOutOfRange { ref station_id, .. } if station_id == "A"
        ));
    }
}
