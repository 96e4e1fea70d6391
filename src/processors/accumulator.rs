use crate::models::{CalendarObservation, CumulativeRecord};
use crate::processors::UnitConverter;
use std::collections::BTreeMap;

/// Running totals per station and water year.
pub struct CumulativeAccumulator {
    converter: UnitConverter,
}

impl CumulativeAccumulator {
    pub fn new(converter: UnitConverter) -> Self {
        Self { converter }
    }

    /// Accumulate gap-filled, calendar-normalized observations.
    ///
    /// A missing day makes every later cumulative value of that water year
    /// `None`. The leap day has no row; its flow is folded into the February 28
    /// slot so the day-365 total always covers the whole water year.
    pub fn accumulate(&self, observations: &[CalendarObservation]) -> Vec<CumulativeRecord> {
        let mut groups: BTreeMap<(&str, i32), Vec<&CalendarObservation>> = BTreeMap::new();
        for observation in observations {
            groups
                .entry((observation.station_id.as_str(), observation.water_year))
                .or_default()
                .push(observation);
        }

        let mut records = Vec::with_capacity(observations.len());
        for (_, mut days) in groups {
            days.sort_by_key(|o| o.date);
            self.accumulate_water_year(&days, &mut records);
        }

        records
    }

    fn accumulate_water_year(
        &self,
        days: &[&CalendarObservation],
        records: &mut Vec<CumulativeRecord>,
    ) {
        let mut running = Some(0.0);

        for day in days {
            let daily_value = day.value.map(|v| self.converter.convert_daily(v));
            running = match (running, daily_value) {
                (Some(total), Some(value)) => Some(total + value),
                _ => None,
            };

            if day.leap_day {
                if let Some(previous) = records
                    .last_mut()
                    .filter(|r| r.water_year == day.water_year && r.station_id == day.station_id)
                {
                    previous.cumulative_value = running;
                    continue;
                }
            }

            records.push(CumulativeRecord {
                station_id: day.station_id.clone(),
                water_year: day.water_year,
                day_of_year: day.day_of_year,
                date: day.date,
                daily_value,
                cumulative_value: running,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;
    use crate::processors::{GapFiller, WaterYearCalendar};
    use chrono::{Datelike, NaiveDate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn full_year(station: &str, year: i32, value: impl Fn(u32) -> Option<f64>) -> Vec<Observation> {
        let mut day = date(year, 1, 1);
        let mut observations = Vec::new();
        let mut i = 0;
        while day.year() == year {
            i += 1;
            observations.push(Observation::new(station, day, value(i)));
            day = day.succ_opt().unwrap();
        }
        observations
    }

    fn prepare(observations: Vec<Observation>, start_month: u32) -> Vec<CalendarObservation> {
        let calendar = WaterYearCalendar::new(start_month).unwrap();
        let filled = GapFiller::new(calendar).fill(observations).unwrap();
        calendar.normalize_all(&filled)
    }

    #[test]
    fn test_constant_flow_scenario() {
        let observations = prepare(full_year("A", 2001, |_| Some(10.0)), 1);

        let raw = CumulativeAccumulator::new(UnitConverter::raw()).accumulate(&observations);
        assert_eq!(raw.len(), 365);
        assert_eq!(raw[99].day_of_year, 100);
        assert_eq!(raw[99].cumulative_value, Some(1000.0));
        assert_eq!(raw[364].cumulative_value, Some(3650.0));

        let volume = CumulativeAccumulator::new(UnitConverter::volume()).accumulate(&observations);
        assert_eq!(volume[99].cumulative_value, Some(1000.0 * 86_400.0));
        assert_eq!(volume[364].cumulative_value, Some(3650.0 * 86_400.0));
    }

    #[test]
    fn test_non_decreasing_with_non_negative_flow() {
        let observations = prepare(full_year("A", 2003, |i| Some((i % 7) as f64)), 1);
        let records = CumulativeAccumulator::new(UnitConverter::volume()).accumulate(&observations);

        assert!(records
            .windows(2)
            .all(|w| w[0].cumulative_value.unwrap() <= w[1].cumulative_value.unwrap()));
    }

    #[test]
    fn test_missing_day_nulls_rest_of_year() {
        let mut observations = full_year("A", 2001, |i| if i == 50 { None } else { Some(1.0) });
        observations.extend(full_year("A", 2002, |_| Some(1.0)));
        let records =
            CumulativeAccumulator::new(UnitConverter::raw()).accumulate(&prepare(observations, 1));

        assert_eq!(records.len(), 730);
        assert_eq!(records[48].cumulative_value, Some(49.0));
        assert!(records[49..365].iter().all(|r| r.cumulative_value.is_none()));
        // the next water year starts clean
        assert_eq!(records[365].water_year, 2002);
        assert_eq!(records[729].cumulative_value, Some(365.0));
    }

    #[test]
    fn test_leap_day_folded_into_february_28() {
        let observations = prepare(full_year("A", 2004, |_| Some(1.0)), 1);
        let records = CumulativeAccumulator::new(UnitConverter::raw()).accumulate(&observations);

        assert_eq!(records.len(), 365);
        assert!(records.iter().all(|r| r.date != date(2004, 2, 29)));

        let feb_28 = &records[58];
        assert_eq!(feb_28.day_of_year, 59);
        assert_eq!(feb_28.date, date(2004, 2, 28));
        assert_eq!(feb_28.cumulative_value, Some(60.0));

        assert_eq!(records[59].day_of_year, 60);
        assert_eq!(records[59].cumulative_value, Some(61.0));
        assert_eq!(records[364].cumulative_value, Some(366.0));

        let days: Vec<u32> = records.iter().map(|r| r.day_of_year).collect();
        assert_eq!(days, (1..=365).collect::<Vec<_>>());
    }

    #[test]
    fn test_leap_day_at_end_of_march_water_year() {
        // water year 2004 with a March start runs 2003-03-01 .. 2004-02-29
        let mut observations = full_year("A", 2003, |_| Some(1.0));
        observations.extend(full_year("A", 2004, |_| Some(1.0)));
        let records =
            CumulativeAccumulator::new(UnitConverter::raw()).accumulate(&prepare(observations, 3));

        let last_2004 = records
            .iter()
            .filter(|r| r.water_year == 2004)
            .last()
            .unwrap();
        assert_eq!(last_2004.day_of_year, 365);
        assert_eq!(last_2004.cumulative_value, Some(366.0));
    }

    #[test]
    fn test_missing_leap_day_nulls_february_28_slot() {
        let observations = full_year("A", 2004, |i| if i == 60 { None } else { Some(1.0) });
        let records =
            CumulativeAccumulator::new(UnitConverter::raw()).accumulate(&prepare(observations, 1));

        assert_eq!(records[57].cumulative_value, Some(58.0));
        assert_eq!(records[58].daily_value, Some(1.0));
        assert_eq!(records[58].cumulative_value, None);
        assert_eq!(records[364].cumulative_value, None);
    }

    #[test]
    fn test_day_365_equals_year_total() {
        for start_month in [1, 4, 10] {
            let mut observations = full_year("A", 2003, |i| Some(i as f64 * 0.5));
            observations.extend(full_year("A", 2004, |i| Some(i as f64 * 0.25)));
            observations.extend(full_year("A", 2005, |i| Some(i as f64)));
            let prepared = prepare(observations, start_month);
            let records = CumulativeAccumulator::new(UnitConverter::raw()).accumulate(&prepared);

            for record in records.iter().filter(|r| r.day_of_year == 365) {
                let total: Option<f64> = prepared
                    .iter()
                    .filter(|o| o.water_year == record.water_year)
                    .map(|o| o.value)
                    .sum();
                match (record.cumulative_value, total) {
                    (Some(a), Some(b)) => assert!((a - b).abs() < 1e-6),
                    (a, b) => assert_eq!(a, b),
                }
            }
        }
    }
}
