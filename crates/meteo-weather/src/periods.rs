//! Period-of-day bucketing of an hourly series.

use chrono::{NaiveDate, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::metrics::round1;
use crate::types::HourlyRow;

/// Fixed six-hour segment of a local day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// 00:00 - 06:00
    Night,
    /// 06:00 - 12:00
    Morning,
    /// 12:00 - 18:00
    Afternoon,
    /// 18:00 - 24:00
    Evening,
}

impl Period {
    pub const ALL: [Period; 4] = [
        Period::Night,
        Period::Morning,
        Period::Afternoon,
        Period::Evening,
    ];

    /// Bucket for a local hour of day
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => Period::Night,
            6..=11 => Period::Morning,
            12..=17 => Period::Afternoon,
            _ => Period::Evening,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Night => "night",
            Period::Morning => "morning",
            Period::Afternoon => "afternoon",
            Period::Evening => "evening",
        }
    }
}

/// Average / min / max of one field, rounded to one decimal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aggregate {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

impl Aggregate {
    /// `None` when no value is present
    pub fn from_values(values: impl IntoIterator<Item = Option<f64>>) -> Option<Self> {
        let mut sum = 0.0;
        let mut count = 0usize;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for value in values.into_iter().flatten() {
            sum += value;
            count += 1;
            min = min.min(value);
            max = max.max(value);
        }

        if count == 0 {
            return None;
        }

        Some(Self {
            avg: round1(sum / count as f64),
            min: round1(min),
            max: round1(max),
        })
    }
}

/// Aggregates of one period; absent fields are omitted from output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodStats {
    pub hours: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Aggregate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precipitation_probability: Option<Aggregate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<Aggregate>,
}

/// Per-period statistics of one date; periods without rows are absent
pub type PeriodSummary = BTreeMap<Period, PeriodStats>;

/// Assign every row of `date` to exactly one period
pub fn partition_by_period(rows: &[HourlyRow], date: NaiveDate) -> BTreeMap<Period, Vec<&HourlyRow>> {
    let mut buckets: BTreeMap<Period, Vec<&HourlyRow>> = BTreeMap::new();
    for row in rows.iter().filter(|row| row.date() == date) {
        buckets
            .entry(Period::from_hour(row.time.hour()))
            .or_default()
            .push(row);
    }
    buckets
}

/// Summarize temperature, precipitation probability and wind speed per period of `date`
pub fn aggregate_periods(rows: &[HourlyRow], date: NaiveDate) -> PeriodSummary {
    let summary: PeriodSummary = partition_by_period(rows, date)
        .into_iter()
        .map(|(period, bucket)| {
            let stats = PeriodStats {
                hours: bucket.len(),
                temperature: Aggregate::from_values(bucket.iter().map(|r| r.temperature)),
                precipitation_probability: Aggregate::from_values(
                    bucket.iter().map(|r| r.precipitation_probability),
                ),
                wind_speed: Aggregate::from_values(bucket.iter().map(|r| r.wind_speed)),
            };
            (period, stats)
        })
        .collect();

    tracing::debug!("Aggregated {} periods for {}", summary.len(), date);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(date: NaiveDate, hour: u32) -> NaiveDateTime {
        date.and_hms_opt(hour, 0, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn series(date: NaiveDate, hours: std::ops::Range<u32>) -> Vec<HourlyRow> {
        hours
            .map(|h| {
                let mut row = HourlyRow::empty(at(date, h));
                row.temperature = Some(h as f64);
                row.precipitation_probability = Some(10.0);
                row
            })
            .collect()
    }

    #[test]
    fn test_period_boundaries() {
        assert_eq!(Period::from_hour(0), Period::Night);
        assert_eq!(Period::from_hour(5), Period::Night);
        assert_eq!(Period::from_hour(6), Period::Morning);
        assert_eq!(Period::from_hour(11), Period::Morning);
        assert_eq!(Period::from_hour(12), Period::Afternoon);
        assert_eq!(Period::from_hour(17), Period::Afternoon);
        assert_eq!(Period::from_hour(18), Period::Evening);
        assert_eq!(Period::from_hour(23), Period::Evening);
    }

    #[test]
    fn test_partition_covers_exactly_the_matching_date() {
        let mut rows = series(day(1), 0..24);
        rows.extend(series(day(2), 0..24));
        rows.extend(series(day(3), 0..5));

        for target in [day(1), day(2), day(3), day(4)] {
            let buckets = partition_by_period(&rows, target);
            let mut assigned: Vec<NaiveDateTime> =
                buckets.values().flatten().map(|r| r.time).collect();
            assigned.sort();

            let expected: Vec<NaiveDateTime> = rows
                .iter()
                .filter(|r| r.date() == target)
                .map(|r| r.time)
                .collect();

            assert_eq!(assigned, expected, "mismatch for {}", target);
        }
    }

    #[test]
    fn test_aggregate_full_day() {
        let rows = series(day(1), 0..24);
        let summary = aggregate_periods(&rows, day(1));

        assert_eq!(summary.len(), 4);
        let morning = &summary[&Period::Morning];
        assert_eq!(morning.hours, 6);
        assert_eq!(
            morning.temperature,
            Some(Aggregate {
                avg: 8.5,
                min: 6.0,
                max: 11.0
            })
        );
        assert_eq!(morning.wind_speed, None);
        assert_eq!(morning.precipitation_probability.map(|a| a.avg), Some(10.0));
    }

    #[test]
    fn test_empty_bucket_is_omitted() {
        // Only hours 13..16 present
        let rows = series(day(1), 13..16);
        let summary = aggregate_periods(&rows, day(1));

        assert_eq!(summary.keys().copied().collect::<Vec<_>>(), vec![Period::Afternoon]);
        assert!(aggregate_periods(&rows, day(2)).is_empty());
    }

    #[test]
    fn test_rows_without_values_keep_bucket_but_omit_fields() {
        let rows = vec![HourlyRow::empty(at(day(1), 20))];
        let summary = aggregate_periods(&rows, day(1));
        let evening = &summary[&Period::Evening];

        assert_eq!(evening.hours, 1);
        assert_eq!(evening.temperature, None);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json, serde_json::json!({ "evening": { "hours": 1 } }));
    }

    #[test]
    fn test_averages_are_rounded() {
        let mut rows = series(day(1), 0..3);
        rows[0].temperature = Some(1.0);
        rows[1].temperature = Some(1.0);
        rows[2].temperature = Some(2.0);
        let night = &aggregate_periods(&rows, day(1))[&Period::Night];
        assert_eq!(night.temperature.map(|a| a.avg), Some(1.3));
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let rows = series(day(1), 0..24);
        let a = serde_json::to_string(&aggregate_periods(&rows, day(1))).unwrap();
        let b = serde_json::to_string(&aggregate_periods(&rows, day(1))).unwrap();
        assert_eq!(a, b);
        assert!(a.find("night").unwrap() < a.find("evening").unwrap());
    }
}
