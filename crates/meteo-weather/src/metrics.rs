//! Derived metrics computed from normalized fields.
//!
//! Every function here is total: missing or non-finite inputs yield
//! [`Metric::Unavailable`], out-of-domain inputs yield [`Metric::NotApplicable`].

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};
use std::fmt;

use crate::types::{DailyRow, HourlyRow, Metric};

/// Precipitation probability (%) from which an hour counts as rainy
pub const RAIN_PROBABILITY_THRESHOLD: f64 = 50.0;

/// UV index from which an hour counts as high exposure
pub const HIGH_UV_THRESHOLD: f64 = 6.0;

/// Wind speed (km/h) from which an hour counts as strong wind
pub const STRONG_WIND_KMH: f64 = 40.0;

/// Rows scanned by the look-ahead helpers
const LOOKAHEAD_HOURS: usize = 24;

/// Local hours counted as day when no is-day flag is used
const DAY_START_HOUR: u32 = 6;
const DAY_END_HOUR: u32 = 20;

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

// ---------------------------------------------------------------------------
// Wind
// ---------------------------------------------------------------------------

/// Sixteen-point compass rose
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompassPoint {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

impl CompassPoint {
    const ROSE: [CompassPoint; 16] = [
        CompassPoint::N,
        CompassPoint::NNE,
        CompassPoint::NE,
        CompassPoint::ENE,
        CompassPoint::E,
        CompassPoint::ESE,
        CompassPoint::SE,
        CompassPoint::SSE,
        CompassPoint::S,
        CompassPoint::SSW,
        CompassPoint::SW,
        CompassPoint::WSW,
        CompassPoint::W,
        CompassPoint::WNW,
        CompassPoint::NW,
        CompassPoint::NNW,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CompassPoint::N => "N",
            CompassPoint::NNE => "NNE",
            CompassPoint::NE => "NE",
            CompassPoint::ENE => "ENE",
            CompassPoint::E => "E",
            CompassPoint::ESE => "ESE",
            CompassPoint::SE => "SE",
            CompassPoint::SSE => "SSE",
            CompassPoint::S => "S",
            CompassPoint::SSW => "SSW",
            CompassPoint::SW => "SW",
            CompassPoint::WSW => "WSW",
            CompassPoint::W => "W",
            CompassPoint::WNW => "WNW",
            CompassPoint::NW => "NW",
            CompassPoint::NNW => "NNW",
        }
    }
}

impl fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for CompassPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Compass point for a bearing in degrees.
///
/// Sectors are 22.5° wide and centred on each label, so a bearing exactly on
/// `center + 11.25` belongs to the next label clockwise.
pub fn compass_from_bearing(degrees: f64) -> Metric<CompassPoint> {
    let Some(degrees) = finite(degrees) else {
        return Metric::Unavailable;
    };
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized + 11.25) / 22.5).floor() as usize % 16;
    Metric::Value(CompassPoint::ROSE[index])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindFeel {
    Calm,
    Breezy,
    Windy,
}

/// Felt wind for a speed in km/h: breezy above 10, windy above 25
pub fn wind_feel(speed_kmh: f64) -> Metric<WindFeel> {
    let Some(speed) = finite(speed_kmh) else {
        return Metric::Unavailable;
    };
    Metric::Value(if speed > 25.0 {
        WindFeel::Windy
    } else if speed > 10.0 {
        WindFeel::Breezy
    } else {
        WindFeel::Calm
    })
}

// ---------------------------------------------------------------------------
// Pressure / sky
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureTendency {
    /// Unsettled weather likely
    Low,
    Normal,
    /// Settled weather likely
    High,
}

/// Sea-level pressure band: below 1000 hPa low, above 1020 hPa high
pub fn pressure_tendency(pressure_hpa: f64) -> Metric<PressureTendency> {
    let Some(p) = finite(pressure_hpa) else {
        return Metric::Unavailable;
    };
    Metric::Value(if p < 1000.0 {
        PressureTendency::Low
    } else if p > 1020.0 {
        PressureTendency::High
    } else {
        PressureTendency::Normal
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkyCover {
    Clear,
    PartlyCloudy,
    Cloudy,
}

/// Sky label for a cloud cover percentage: partly cloudy above 30, cloudy above 70
pub fn sky_cover(cloud_pct: f64) -> Metric<SkyCover> {
    let Some(c) = finite(cloud_pct) else {
        return Metric::Unavailable;
    };
    Metric::Value(if c > 70.0 {
        SkyCover::Cloudy
    } else if c > 30.0 {
        SkyCover::PartlyCloudy
    } else {
        SkyCover::Clear
    })
}

// ---------------------------------------------------------------------------
// UV
// ---------------------------------------------------------------------------

/// UV risk band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UvRisk {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvRisk {
    pub fn label(&self) -> &'static str {
        match self {
            UvRisk::Low => "low",
            UvRisk::Moderate => "moderate",
            UvRisk::High => "high",
            UvRisk::VeryHigh => "very-high",
            UvRisk::Extreme => "extreme",
        }
    }
}

impl fmt::Display for UvRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Risk band for a UV index; each threshold belongs to the upper band
pub fn uv_risk_category(index: f64) -> Metric<UvRisk> {
    let Some(index) = finite(index) else {
        return Metric::Unavailable;
    };
    let risk = if index < 3.0 {
        UvRisk::Low
    } else if index < 6.0 {
        UvRisk::Moderate
    } else if index < 8.0 {
        UvRisk::High
    } else if index < 11.0 {
        UvRisk::VeryHigh
    } else {
        UvRisk::Extreme
    };
    Metric::Value(risk)
}

/// First and last hour at or above a UV threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UvWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub peak: f64,
}

/// High-UV span within the first 24 rows, if any hour reaches `threshold`
pub fn uv_exposure_window(rows: &[HourlyRow], threshold: f64) -> Option<UvWindow> {
    let mut window: Option<UvWindow> = None;
    for row in rows.iter().take(LOOKAHEAD_HOURS) {
        let Some(uv) = row.uv_index.filter(|uv| *uv >= threshold) else {
            continue;
        };
        window = Some(match window {
            None => UvWindow {
                start: row.time,
                end: row.time,
                peak: uv,
            },
            Some(w) => UvWindow {
                end: row.time,
                peak: w.peak.max(uv),
                ..w
            },
        });
    }
    window
}

// ---------------------------------------------------------------------------
// Durations
// ---------------------------------------------------------------------------

/// Format seconds as `"{h}h{mm}"`, e.g. 3661 → `"1h01"`
pub fn duration_to_clock_string(seconds: f64) -> Metric<String> {
    let Some(seconds) = finite(seconds).filter(|s| *s >= 0.0) else {
        return Metric::Unavailable;
    };
    let total = seconds.round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    Metric::Value(format!("{hours}h{minutes:02}"))
}

// ---------------------------------------------------------------------------
// Temperature / humidity
// ---------------------------------------------------------------------------

/// Dew point estimate `t - (100 - rh) / 5`.
///
/// A rough approximation that only holds near saturation; do not use it where
/// meteorological precision matters.
pub fn dew_point_approx(temp_c: f64, humidity_pct: f64) -> Metric<f64> {
    match (finite(temp_c), finite(humidity_pct)) {
        (Some(t), Some(rh)) => Metric::Value(t - (100.0 - rh) / 5.0),
        _ => Metric::Unavailable,
    }
}

/// Simplified Celsius heat index, defined only above 27 °C and 40 % humidity
pub fn heat_index_approx(temp_c: f64, humidity_pct: f64) -> Metric<f64> {
    let (Some(t), Some(h)) = (finite(temp_c), finite(humidity_pct)) else {
        return Metric::Unavailable;
    };
    if t <= 27.0 || h <= 40.0 {
        return Metric::NotApplicable;
    }
    Metric::Value(-8.78 + 1.61 * t + 2.34 * h - 0.14 * t * h)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatStress {
    Negligible,
    Discomfort,
    Extreme,
}

/// Heat stress band for a heat index value
pub fn heat_stress(heat_index: f64) -> HeatStress {
    if heat_index > 40.0 {
        HeatStress::Extreme
    } else if heat_index > 32.0 {
        HeatStress::Discomfort
    } else {
        HeatStress::Negligible
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComfortLevel {
    Cold,
    Comfortable,
    Warm,
}

/// Thermal comfort of an air temperature: comfortable within 18..=24 °C
pub fn comfort_level(temp_c: f64) -> Metric<ComfortLevel> {
    let Some(t) = finite(temp_c) else {
        return Metric::Unavailable;
    };
    Metric::Value(if t < 18.0 {
        ComfortLevel::Cold
    } else if t <= 24.0 {
        ComfortLevel::Comfortable
    } else {
        ComfortLevel::Warm
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepComfort {
    TooCool,
    Optimal,
    TooWarm,
}

/// Sleeping comfort of a night mean temperature: optimal within 16..=19 °C
pub fn sleep_comfort(night_mean_c: f64) -> Metric<SleepComfort> {
    let Some(t) = finite(night_mean_c) else {
        return Metric::Unavailable;
    };
    Metric::Value(if t < 16.0 {
        SleepComfort::TooCool
    } else if t <= 19.0 {
        SleepComfort::Optimal
    } else {
        SleepComfort::TooWarm
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Clothing {
    /// Heavy coat, scarf, gloves
    Heavy,
    /// Jacket or light sweater
    MidSeason,
    Light,
    /// Shorts; stay hydrated
    VeryLight,
}

/// Clothing advice from a mean temperature: bands split at 5, 15 and 25 °C
pub fn clothing_advice(mean_temp_c: f64) -> Metric<Clothing> {
    let Some(t) = finite(mean_temp_c) else {
        return Metric::Unavailable;
    };
    Metric::Value(if t < 5.0 {
        Clothing::Heavy
    } else if t < 15.0 {
        Clothing::MidSeason
    } else if t < 25.0 {
        Clothing::Light
    } else {
        Clothing::VeryLight
    })
}

// ---------------------------------------------------------------------------
// Day / night
// ---------------------------------------------------------------------------

/// How rows are classified as day or night
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySource {
    /// Use each row's is-day flag, falling back to the hour window when absent
    IsDayFlag,
    /// Local `[06:00, 20:00)` is day
    HourWindow,
}

impl DaySource {
    fn is_day(&self, row: &HourlyRow) -> bool {
        let by_hour = || (DAY_START_HOUR..DAY_END_HOUR).contains(&row.time.hour());
        match self {
            DaySource::IsDayFlag => row.is_day.unwrap_or_else(by_hour),
            DaySource::HourWindow => by_hour(),
        }
    }
}

/// Mean / min / max temperature of a set of rows
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TemperatureStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl TemperatureStats {
    fn from_rows(rows: &[&HourlyRow]) -> Option<Self> {
        let temps: Vec<f64> = rows.iter().filter_map(|r| r.temperature).collect();
        if temps.is_empty() {
            return None;
        }
        let mean = temps.iter().sum::<f64>() / temps.len() as f64;
        let min = temps.iter().copied().fold(f64::INFINITY, f64::min);
        let max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self { mean, min, max })
    }

    fn rounded(self) -> Self {
        Self {
            mean: round1(self.mean),
            min: round1(self.min),
            max: round1(self.max),
        }
    }
}

/// Rows split into day and night with per-side temperature statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayNightSplit<'a> {
    #[serde(skip)]
    pub day: Vec<&'a HourlyRow>,
    #[serde(skip)]
    pub night: Vec<&'a HourlyRow>,
    #[serde(rename = "day")]
    pub day_stats: Metric<TemperatureStats>,
    #[serde(rename = "night")]
    pub night_stats: Metric<TemperatureStats>,
    /// Day mean minus night mean
    pub amplitude: Metric<f64>,
}

pub fn day_night_split(rows: &[HourlyRow], source: DaySource) -> DayNightSplit<'_> {
    let (day, night): (Vec<&HourlyRow>, Vec<&HourlyRow>) =
        rows.iter().partition(|row| source.is_day(row));

    let day_raw = TemperatureStats::from_rows(&day);
    let night_raw = TemperatureStats::from_rows(&night);

    let amplitude = match (day_raw, night_raw) {
        (Some(d), Some(n)) => Metric::Value(round1(d.mean - n.mean)),
        _ => Metric::Unavailable,
    };

    DayNightSplit {
        day,
        night,
        day_stats: day_raw.map(TemperatureStats::rounded).into(),
        night_stats: night_raw.map(TemperatureStats::rounded).into(),
        amplitude,
    }
}

// ---------------------------------------------------------------------------
// Multi-day
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rise,
    Fall,
    Stable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trend::Rise => "rise",
            Trend::Fall => "fall",
            Trend::Stable => "stable",
        })
    }
}

/// Compare the last temperature with the first; a change over 3 °C is a trend
pub fn trend_from_daily_series(temps: &[f64]) -> Trend {
    let finite: Vec<f64> = temps.iter().copied().filter(|t| t.is_finite()).collect();
    let (Some(first), Some(last)) = (finite.first(), finite.last()) else {
        return Trend::Stable;
    };
    if finite.len() < 2 {
        Trend::Stable
    } else if *last > first + 3.0 {
        Trend::Rise
    } else if *last < first - 3.0 {
        Trend::Fall
    } else {
        Trend::Stable
    }
}

/// A value attached to the day it occurs on
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayValue {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyExtremes {
    pub hottest: Option<DayValue>,
    pub coldest: Option<DayValue>,
    pub wettest: Option<DayValue>,
    pub windiest: Option<DayValue>,
}

fn extreme_by(
    daily: &[DailyRow],
    field: impl Fn(&DailyRow) -> Option<f64>,
    prefer: impl Fn(f64, f64) -> bool,
) -> Option<DayValue> {
    daily
        .iter()
        .filter_map(|row| field(row).map(|value| DayValue { date: row.date, value }))
        .fold(None, |best, candidate| match best {
            Some(b) if !prefer(candidate.value, b.value) => Some(b),
            _ => Some(candidate),
        })
}

/// Hottest, coldest, wettest and windiest day; ties keep the earliest day
pub fn daily_extremes(daily: &[DailyRow]) -> DailyExtremes {
    DailyExtremes {
        hottest: extreme_by(daily, |r| r.temperature_max, |a, b| a > b),
        coldest: extreme_by(daily, |r| r.temperature_min, |a, b| a < b),
        wettest: extreme_by(daily, |r| r.precipitation_sum, |a, b| a > b),
        windiest: extreme_by(daily, |r| r.wind_speed_max, |a, b| a > b),
    }
}

/// Precipitation accumulated over the first day, the first two days and all days
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RainTotals {
    pub next_24h: Metric<f64>,
    pub next_48h: Metric<f64>,
    pub total: Metric<f64>,
}

fn sum_present(rows: &[DailyRow]) -> Metric<f64> {
    let values: Vec<f64> = rows.iter().filter_map(|r| r.precipitation_sum).collect();
    if values.is_empty() {
        return Metric::Unavailable;
    }
    Metric::Value(round1(values.iter().sum()))
}

/// Rain accumulation of a daily series.
///
/// The 48 h total needs two rows; absent sums are skipped.
pub fn rain_totals(daily: &[DailyRow]) -> RainTotals {
    RainTotals {
        next_24h: Metric::from(daily.first().and_then(|d| d.precipitation_sum)).map(round1),
        next_48h: match daily.get(..2) {
            Some(two) => sum_present(two),
            None => Metric::Unavailable,
        },
        total: sum_present(daily),
    }
}

fn upcoming(rows: &[HourlyRow], from: NaiveDateTime) -> impl Iterator<Item = &HourlyRow> {
    rows.iter()
        .filter(move |row| row.time >= from)
        .take(LOOKAHEAD_HOURS)
}

/// First hour at or after `from`, within the next 24 rows, likely to see rain
pub fn next_rain(rows: &[HourlyRow], from: NaiveDateTime, threshold: f64) -> Option<&HourlyRow> {
    upcoming(rows, from).find(|row| row.precipitation_probability.is_some_and(|p| p >= threshold))
}

/// First and last rainy hour
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RainSpan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Rollup of the next 24 hourly rows
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyOutlook {
    pub hours: usize,
    pub temperature_avg: Metric<f64>,
    pub rain_probability_max: Metric<f64>,
    pub rain_probability_avg: Metric<f64>,
    pub rain_span: Option<RainSpan>,
    pub uv_max: Metric<f64>,
    pub wind_max: Metric<f64>,
    pub strong_wind_hours: usize,
    pub cloud_avg: Metric<f64>,
    pub sky: Metric<SkyCover>,
    pub clothing: Metric<Clothing>,
}

fn present(rows: &[&HourlyRow], field: impl Fn(&HourlyRow) -> Option<f64>) -> Vec<f64> {
    rows.iter().filter_map(|row| field(*row)).collect()
}

fn mean(values: &[f64]) -> Metric<f64> {
    if values.is_empty() {
        return Metric::Unavailable;
    }
    Metric::Value(round1(values.iter().sum::<f64>() / values.len() as f64))
}

fn peak(values: &[f64]) -> Metric<f64> {
    values
        .iter()
        .copied()
        .reduce(f64::max)
        .map_or(Metric::Unavailable, Metric::Value)
}

/// Summarize the 24 rows starting at `from`; `None` when no row is left
pub fn hourly_outlook(rows: &[HourlyRow], from: NaiveDateTime) -> Option<HourlyOutlook> {
    let window: Vec<&HourlyRow> = upcoming(rows, from).collect();
    if window.is_empty() {
        return None;
    }

    let temps = present(&window, |r| r.temperature);
    let rain = present(&window, |r| r.precipitation_probability);
    let uv = present(&window, |r| r.uv_index);
    let wind = present(&window, |r| r.wind_speed);
    let clouds = present(&window, |r| r.cloud_cover);

    let rainy: Vec<NaiveDateTime> = window
        .iter()
        .filter(|row| {
            row.precipitation_probability
                .is_some_and(|p| p >= RAIN_PROBABILITY_THRESHOLD)
        })
        .map(|row| row.time)
        .collect();
    let rain_span = match (rainy.first(), rainy.last()) {
        (Some(start), Some(end)) => Some(RainSpan {
            start: *start,
            end: *end,
        }),
        _ => None,
    };

    let temperature_avg = mean(&temps);
    let cloud_avg = mean(&clouds);

    Some(HourlyOutlook {
        hours: window.len(),
        temperature_avg,
        rain_probability_max: peak(&rain),
        rain_probability_avg: mean(&rain),
        rain_span,
        uv_max: peak(&uv),
        wind_max: peak(&wind),
        strong_wind_hours: wind.iter().filter(|w| **w >= STRONG_WIND_KMH).count(),
        cloud_avg,
        sky: cloud_avg.and_then(sky_cover),
        clothing: temperature_avg.and_then(clothing_advice),
    })
}
