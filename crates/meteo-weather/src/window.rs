//! Forecast window selection and response envelope assembly.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

use crate::metrics::{
    comfort_level, compass_from_bearing, daily_extremes, day_night_split, dew_point_approx,
    duration_to_clock_string, heat_index_approx, heat_stress, hourly_outlook, next_rain,
    pressure_tendency, rain_totals, round1, sleep_comfort, trend_from_daily_series,
    uv_exposure_window, uv_risk_category, wind_feel, ComfortLevel, CompassPoint, DailyExtremes,
    DaySource, DayValue, HeatStress, HourlyOutlook, PressureTendency, RainTotals, SleepComfort,
    TemperatureStats, Trend, UvRisk, UvWindow, WindFeel, HIGH_UV_THRESHOLD,
    RAIN_PROBABILITY_THRESHOLD,
};
use crate::periods::{aggregate_periods, PeriodSummary};
use crate::types::{
    CurrentConditions, DailyRow, Forecast, HourlyRow, Location, Metric, TemperatureUnit,
    WeatherCondition,
};

/// Longest horizon a window can request
pub const MAX_DAYS: u8 = 7;

/// Coarse forecast horizon requested by a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowToken {
    #[default]
    Today,
    Tomorrow,
    Week,
    /// Always within `1..=7`
    Days(u8),
}

impl WindowToken {
    /// Parse a request token.
    ///
    /// Unrecognized tokens fall back to [`WindowToken::Today`].
    pub fn parse(token: &str) -> Self {
        let normalized = token.trim().to_lowercase();
        match normalized.as_str() {
            "today" | "aujourd'hui" | "aujourd\u{2019}hui" => Self::Today,
            "tomorrow" | "demain" => Self::Tomorrow,
            "week" | "semaine" => Self::Week,
            other => match day_count_token(other) {
                Some(n) => Self::Days(n),
                None => {
                    tracing::debug!("Unrecognized window token {:?}, using today", token);
                    Self::Today
                }
            },
        }
    }

    /// Number of daily rows the window asks for
    pub fn day_count(&self) -> usize {
        match self {
            Self::Today | Self::Tomorrow => 1,
            Self::Week => usize::from(MAX_DAYS),
            Self::Days(n) => usize::from((*n).clamp(1, MAX_DAYS)),
        }
    }
}

/// Integer token clamped to `1..=7`; integers too large for `i64` saturate
fn day_count_token(token: &str) -> Option<u8> {
    let digits = token.strip_prefix(&['+', '-'][..]).unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n = token.parse::<i64>().unwrap_or(if token.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    });
    u8::try_from(n.clamp(1, i64::from(MAX_DAYS))).ok()
}

impl fmt::Display for WindowToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => f.write_str("today"),
            Self::Tomorrow => f.write_str("tomorrow"),
            Self::Week => f.write_str("week"),
            Self::Days(n) => write!(f, "{}-days", n),
        }
    }
}

impl Serialize for WindowToken {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Current snapshot with its derived values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentBlock {
    #[serde(flatten)]
    pub conditions: CurrentConditions,
    pub condition: Metric<&'static str>,
    pub wind_compass: Metric<CompassPoint>,
    pub dew_point: Metric<f64>,
    pub heat_index: Metric<f64>,
    pub heat_stress: Metric<HeatStress>,
    pub comfort: Metric<ComfortLevel>,
    pub wind_feel: Metric<WindFeel>,
    pub pressure_tendency: Metric<PressureTendency>,
}

impl CurrentBlock {
    pub fn from_conditions(conditions: &CurrentConditions) -> Self {
        let temp = conditions.temperature;
        let humidity = conditions.relative_humidity;
        let heat_index = both(temp, humidity, heat_index_approx).map(round1);

        Self {
            condition: describe(conditions.weather_code),
            wind_compass: Metric::from(conditions.wind_direction).and_then(compass_from_bearing),
            dew_point: both(temp, humidity, dew_point_approx).map(round1),
            heat_index,
            heat_stress: heat_index.map(heat_stress),
            comfort: Metric::from(temp).and_then(comfort_level),
            wind_feel: Metric::from(conditions.wind_speed).and_then(wind_feel),
            pressure_tendency: Metric::from(conditions.pressure_msl).and_then(pressure_tendency),
            conditions: conditions.clone(),
        }
    }
}

/// One day with its derived values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBlock {
    #[serde(flatten)]
    pub day: DailyRow,
    pub condition: Metric<&'static str>,
    pub uv_risk: Metric<UvRisk>,
    pub daylight: Metric<String>,
    pub sunshine: Metric<String>,
}

impl DayBlock {
    pub fn from_row(day: &DailyRow) -> Self {
        Self {
            condition: describe(day.weather_code),
            uv_risk: Metric::from(day.uv_index_max).and_then(uv_risk_category),
            daylight: Metric::from(day.daylight_duration).and_then(duration_to_clock_string),
            sunshine: Metric::from(day.sunshine_duration).and_then(duration_to_clock_string),
            day: day.clone(),
        }
    }
}

/// Day/night temperature contrast of a single date
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayNightBlock {
    pub day: Metric<TemperatureStats>,
    pub night: Metric<TemperatureStats>,
    pub amplitude: Metric<f64>,
    pub sleep_comfort: Metric<SleepComfort>,
}

impl DayNightBlock {
    fn from_rows(rows: &[HourlyRow]) -> Self {
        let split = day_night_split(rows, DaySource::IsDayFlag);
        Self {
            sleep_comfort: split.night_stats.and_then(|n| sleep_comfort(n.mean)),
            day: split.day_stats,
            night: split.night_stats,
            amplitude: split.amplitude,
        }
    }
}

/// Upcoming hour likely to see rain
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RainHint {
    pub time: NaiveDateTime,
    pub probability: f64,
}

/// Compact response for one window request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastEnvelope {
    pub window: WindowToken,
    pub temperature_unit: TemperatureUnit,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<CurrentBlock>,
    pub daily: Vec<DayBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periods: Option<PeriodSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_night: Option<DayNightBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_rain: Option<RainHint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv_window: Option<UvWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outlook: Option<HourlyOutlook>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extremes: Option<DailyExtremes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rain_totals: Option<RainTotals>,
}

impl ForecastEnvelope {
    fn new(window: WindowToken, forecast: &Forecast) -> Self {
        Self {
            window,
            temperature_unit: TemperatureUnit::Celsius,
            location: forecast.location.clone(),
            current: None,
            daily: Vec::new(),
            periods: None,
            day_night: None,
            next_rain: None,
            uv_window: None,
            outlook: None,
            trend: None,
            extremes: None,
            rain_totals: None,
        }
    }

    /// Express temperatures in `unit`.
    ///
    /// Derived values are computed from Celsius before conversion, and only a
    /// Celsius envelope is converted.
    pub fn in_unit(mut self, unit: TemperatureUnit) -> Self {
        if self.temperature_unit != TemperatureUnit::Celsius || unit == TemperatureUnit::Celsius {
            return self;
        }
        let t = move |v: f64| unit.convert(v);
        let stats = move |s: TemperatureStats| TemperatureStats {
            mean: t(s.mean),
            min: t(s.min),
            max: t(s.max),
        };
        let day_value = move |d: DayValue| DayValue {
            value: t(d.value),
            ..d
        };

        if let Some(current) = self.current.as_mut() {
            current.conditions.temperature = current.conditions.temperature.map(t);
            current.conditions.apparent_temperature =
                current.conditions.apparent_temperature.map(t);
            current.dew_point = current.dew_point.map(t);
            current.heat_index = current.heat_index.map(t);
        }
        for block in &mut self.daily {
            block.day.temperature_max = block.day.temperature_max.map(t);
            block.day.temperature_min = block.day.temperature_min.map(t);
            block.day.apparent_temperature_max = block.day.apparent_temperature_max.map(t);
        }
        for period in self.periods.iter_mut().flat_map(|p| p.values_mut()) {
            if let Some(agg) = period.temperature.as_mut() {
                agg.avg = t(agg.avg);
                agg.min = t(agg.min);
                agg.max = t(agg.max);
            }
        }
        if let Some(day_night) = self.day_night.as_mut() {
            day_night.day = day_night.day.map(stats);
            day_night.night = day_night.night.map(stats);
            day_night.amplitude = day_night.amplitude.map(|d| unit.convert_delta(d));
        }
        if let Some(outlook) = self.outlook.as_mut() {
            outlook.temperature_avg = outlook.temperature_avg.map(t);
        }
        if let Some(extremes) = self.extremes.as_mut() {
            extremes.hottest = extremes.hottest.map(day_value);
            extremes.coldest = extremes.coldest.map(day_value);
        }

        self.temperature_unit = unit;
        self
    }

    /// Plain JSON mapping of the envelope
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Assemble the envelope for `token`; `today` is the caller's local date
pub fn select_window(forecast: &Forecast, token: WindowToken, today: NaiveDate) -> ForecastEnvelope {
    let mut envelope = ForecastEnvelope::new(token, forecast);

    match token {
        WindowToken::Today => {
            envelope.current = forecast.current.as_ref().map(CurrentBlock::from_conditions);
            envelope.daily = forecast.daily.first().map(DayBlock::from_row).into_iter().collect();
            attach_hourly(&mut envelope, &forecast.hourly, today);

            let day_rows = rows_on(&forecast.hourly, today);
            let from = forecast
                .current
                .as_ref()
                .map(|c| c.time)
                .unwrap_or_else(|| today.and_time(chrono::NaiveTime::MIN));
            envelope.next_rain = next_rain(&forecast.hourly, from, RAIN_PROBABILITY_THRESHOLD)
                .and_then(|row| {
                    row.precipitation_probability.map(|probability| RainHint {
                        time: row.time,
                        probability,
                    })
                });
            envelope.uv_window = uv_exposure_window(&day_rows, HIGH_UV_THRESHOLD);
            envelope.outlook = hourly_outlook(&forecast.hourly, from);
        }
        WindowToken::Tomorrow => {
            // Day offset comes from series order, not date arithmetic
            if let Some(day) = forecast.daily.get(1) {
                envelope.daily.push(DayBlock::from_row(day));
                attach_hourly(&mut envelope, &forecast.hourly, day.date);
            } else {
                tracing::debug!("No daily row for tomorrow");
            }
        }
        WindowToken::Week | WindowToken::Days(_) => {
            let requested = token.day_count();
            let included = &forecast.daily[..requested.min(forecast.daily.len())];
            if included.len() < requested {
                tracing::debug!(
                    "Requested {} days, only {} available",
                    requested,
                    included.len()
                );
            }

            envelope.current = forecast.current.as_ref().map(CurrentBlock::from_conditions);
            envelope.daily = included.iter().map(DayBlock::from_row).collect();

            let maxima: Vec<f64> = included.iter().filter_map(|d| d.temperature_max).collect();
            envelope.trend = Some(trend_from_daily_series(&maxima));
            envelope.extremes = Some(daily_extremes(included));
            envelope.rain_totals = Some(rain_totals(included));
        }
    }

    envelope
}

/// Periods and day/night contrast for `date`, when the hourly series covers it
fn attach_hourly(envelope: &mut ForecastEnvelope, hourly: &[HourlyRow], date: NaiveDate) {
    let day_rows = rows_on(hourly, date);
    if day_rows.is_empty() {
        tracing::debug!("No hourly rows for {}", date);
        return;
    }
    envelope.periods = Some(aggregate_periods(hourly, date));
    envelope.day_night = Some(DayNightBlock::from_rows(&day_rows));
}

fn rows_on(hourly: &[HourlyRow], date: NaiveDate) -> Vec<HourlyRow> {
    hourly.iter().filter(|row| row.date() == date).cloned().collect()
}

fn describe(code: Option<i32>) -> Metric<&'static str> {
    Metric::from(code).map(|c| WeatherCondition::from_wmo_code(c).description())
}

fn both(
    a: Option<f64>,
    b: Option<f64>,
    f: impl FnOnce(f64, f64) -> Metric<f64>,
) -> Metric<f64> {
    match (a, b) {
        (Some(a), Some(b)) => f(a, b),
        _ => Metric::Unavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::periods::Period;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 14).unwrap()
    }

    fn forecast(days: usize) -> Forecast {
        let midnight = today().and_hms_opt(0, 0, 0).unwrap();
        let hourly = (0..48)
            .map(|h| {
                let mut row = HourlyRow::empty(midnight + Duration::hours(h));
                row.temperature = Some(10.0 + (h % 24) as f64 / 2.0);
                row.precipitation_probability = Some(if h == 15 { 70.0 } else { 10.0 });
                row.uv_index = Some(if (11..=14).contains(&h) { 7.0 } else { 1.0 });
                row
            })
            .collect();
        let daily = (0..days)
            .map(|d| {
                let mut row = DailyRow::empty(today() + Duration::days(d as i64));
                row.temperature_max = Some(20.0 + d as f64);
                row.temperature_min = Some(10.0);
                row.uv_index_max = Some(5.0);
                row.daylight_duration = Some(54_000.0);
                row.weather_code = Some(3);
                row
            })
            .collect();

        Forecast {
            location: Location {
                latitude: 48.85,
                longitude: 2.35,
                elevation: Some(35.0),
                timezone: Some("Europe/Paris".to_string()),
                timezone_abbreviation: Some("CEST".to_string()),
                utc_offset_seconds: 7200,
            },
            current: Some(CurrentConditions {
                time: today().and_hms_opt(9, 0, 0).unwrap(),
                temperature: Some(21.0),
                apparent_temperature: Some(20.0),
                relative_humidity: Some(60.0),
                wind_speed: Some(12.0),
                wind_direction: Some(225.0),
                wind_gusts: None,
                precipitation: Some(0.0),
                rain: None,
                showers: None,
                snowfall: None,
                cloud_cover: Some(80.0),
                pressure_msl: Some(1015.0),
                surface_pressure: None,
                weather_code: Some(3),
                is_day: Some(true),
            }),
            hourly,
            daily,
        }
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!(WindowToken::parse("today"), WindowToken::Today);
        assert_eq!(WindowToken::parse("  Tomorrow "), WindowToken::Tomorrow);
        assert_eq!(WindowToken::parse("WEEK"), WindowToken::Week);
        assert_eq!(WindowToken::parse("demain"), WindowToken::Tomorrow);
        assert_eq!(WindowToken::parse("aujourd'hui"), WindowToken::Today);
        assert_eq!(WindowToken::parse("3"), WindowToken::Days(3));
        assert_eq!(WindowToken::parse("10"), WindowToken::Days(7));
        assert_eq!(WindowToken::parse("0"), WindowToken::Days(1));
        assert_eq!(WindowToken::parse("-4"), WindowToken::Days(1));
        assert_eq!(WindowToken::parse("+2"), WindowToken::Days(2));
        assert_eq!(WindowToken::parse("99999999999999999999"), WindowToken::Days(7));
        assert_eq!(WindowToken::parse("-99999999999999999999"), WindowToken::Days(1));
        assert_eq!(WindowToken::parse("2.5"), WindowToken::Today);
        assert_eq!(WindowToken::parse("-"), WindowToken::Today);
        assert_eq!(WindowToken::parse("next month"), WindowToken::Today);
        assert_eq!(WindowToken::parse(""), WindowToken::Today);
    }

    #[test]
    fn test_today_window() {
        let envelope = select_window(&forecast(7), WindowToken::Today, today());

        assert_eq!(envelope.daily.len(), 1);
        assert_eq!(envelope.daily[0].day.date, today());
        assert!(envelope.current.is_some());

        let periods = envelope.periods.as_ref().unwrap();
        assert_eq!(periods.len(), 4);
        assert_eq!(periods[&Period::Night].hours, 6);

        let rain = envelope.next_rain.unwrap();
        assert_eq!(rain.time, today().and_hms_opt(15, 0, 0).unwrap());
        assert_eq!(rain.probability, 70.0);

        let uv = envelope.uv_window.unwrap();
        assert_eq!(uv.start, today().and_hms_opt(11, 0, 0).unwrap());
        assert_eq!(uv.end, today().and_hms_opt(14, 0, 0).unwrap());

        assert!(envelope.trend.is_none());
        assert!(envelope.day_night.unwrap().amplitude.is_value());
    }

    #[test]
    fn test_tomorrow_excludes_current() {
        let envelope = select_window(&forecast(7), WindowToken::Tomorrow, today());

        assert!(envelope.current.is_none());
        assert_eq!(envelope.daily.len(), 1);
        assert_eq!(envelope.daily[0].day.date, today() + Duration::days(1));
        assert!(envelope.periods.is_some());
        assert!(envelope.next_rain.is_none());
    }

    #[test]
    fn test_tomorrow_without_second_day_is_empty() {
        let envelope = select_window(&forecast(1), WindowToken::Tomorrow, today());
        assert!(envelope.daily.is_empty());
        assert!(envelope.periods.is_none());
        assert!(envelope.current.is_none());
    }

    #[test]
    fn test_week_never_exceeds_available_rows() {
        let short = select_window(&forecast(3), WindowToken::Week, today());
        assert_eq!(short.daily.len(), 3);
        assert!(short.current.is_some());
        assert!(short.periods.is_none());

        let long = select_window(&forecast(16), WindowToken::Week, today());
        assert_eq!(long.daily.len(), 7);
        assert_eq!(long.trend, Some(Trend::Rise));
    }

    #[test]
    fn test_day_count_clamps_to_seven() {
        let token = WindowToken::parse("10");
        let envelope = select_window(&forecast(16), token, today());
        assert_eq!(envelope.daily.len(), 7);

        let envelope = select_window(&forecast(16), WindowToken::parse("2"), today());
        assert_eq!(envelope.daily.len(), 2);
        assert_eq!(envelope.trend, Some(Trend::Stable));
        let hottest = envelope.extremes.unwrap().hottest.unwrap();
        assert_eq!(hottest.date, today() + Duration::days(1));
    }

    #[test]
    fn test_unrecognized_token_behaves_as_today() {
        let fallback = select_window(&forecast(7), WindowToken::parse("bogus"), today());
        let today_env = select_window(&forecast(7), WindowToken::Today, today());
        assert_eq!(fallback, today_env);
    }

    #[test]
    fn test_current_block_derived_values() {
        let envelope = select_window(&forecast(7), WindowToken::Today, today());
        let current = envelope.current.unwrap();

        assert_eq!(current.wind_compass, Metric::Value(CompassPoint::SW));
        assert_eq!(current.dew_point, Metric::Value(13.0));
        assert_eq!(current.heat_index, Metric::NotApplicable);
        assert_eq!(current.heat_stress, Metric::NotApplicable);
        assert_eq!(current.comfort, Metric::Value(ComfortLevel::Comfortable));
        assert_eq!(current.condition, Metric::Value("Cloudy"));
    }

    #[test]
    fn test_today_outlook_and_current_labels() {
        let envelope = select_window(&forecast(7), WindowToken::Today, today());

        let outlook = envelope.outlook.unwrap();
        assert_eq!(outlook.hours, 24);
        let span = outlook.rain_span.unwrap();
        assert_eq!(span.start, today().and_hms_opt(15, 0, 0).unwrap());
        assert_eq!(span.end, span.start);
        assert_eq!(outlook.uv_max, Metric::Value(7.0));
        assert_eq!(outlook.wind_max, Metric::Unavailable);

        let current = envelope.current.unwrap();
        assert_eq!(current.wind_feel, Metric::Value(WindFeel::Breezy));
        assert_eq!(current.pressure_tendency, Metric::Value(PressureTendency::Normal));
        assert!(envelope.rain_totals.is_none());
    }

    #[test]
    fn test_multi_day_rain_totals_and_windiest() {
        let mut data = forecast(5);
        for (i, day) in data.daily.iter_mut().enumerate() {
            day.precipitation_sum = Some(i as f64);
            day.wind_speed_max = Some(if i == 3 { 48.0 } else { 20.0 });
        }

        let envelope = select_window(&data, WindowToken::Days(4), today());
        let totals = envelope.rain_totals.unwrap();
        assert_eq!(totals.next_24h, Metric::Value(0.0));
        assert_eq!(totals.next_48h, Metric::Value(1.0));
        assert_eq!(totals.total, Metric::Value(6.0));

        let windiest = envelope.extremes.unwrap().windiest.unwrap();
        assert_eq!(windiest.date, today() + Duration::days(3));
        assert!(envelope.outlook.is_none());
    }

    #[test]
    fn test_fahrenheit_converts_after_celsius_metrics() {
        let mut data = forecast(7);
        if let Some(current) = data.current.as_mut() {
            current.temperature = Some(30.0);
            current.relative_humidity = Some(50.0);
        }

        let celsius = select_window(&data, WindowToken::Today, today());
        let fahrenheit = celsius.clone().in_unit(TemperatureUnit::Fahrenheit);
        let current = fahrenheit.current.as_ref().unwrap();

        assert_eq!(fahrenheit.temperature_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(current.conditions.temperature, Some(86.0));
        assert_eq!(current.dew_point, Metric::Value(68.0));
        assert_eq!(current.comfort, Metric::Value(ComfortLevel::Warm));
        let heat_index_c = celsius.current.as_ref().unwrap().heat_index.value().unwrap();
        assert_eq!(
            current.heat_index,
            Metric::Value(TemperatureUnit::Fahrenheit.convert(heat_index_c))
        );
        assert_eq!(
            current.heat_stress,
            celsius.current.as_ref().unwrap().heat_stress
        );

        let morning = &fahrenheit.periods.as_ref().unwrap()[&Period::Morning];
        assert_eq!(morning.temperature.unwrap().min, 55.4);
        assert_eq!(
            fahrenheit.day_night.unwrap().sleep_comfort,
            celsius.day_night.unwrap().sleep_comfort
        );
        assert_eq!(fahrenheit.daily[0].day.temperature_max, Some(68.0));

        let json = fahrenheit.to_json().unwrap();
        assert_eq!(json["temperature_unit"], "fahrenheit");

        // Converting again is a no-op
        assert_eq!(fahrenheit.clone().in_unit(TemperatureUnit::Fahrenheit), fahrenheit);
        assert_eq!(celsius.clone().in_unit(TemperatureUnit::Celsius), celsius);
    }

    #[test]
    fn test_envelope_json_shape() {
        let envelope = select_window(&forecast(7), WindowToken::Today, today());
        let json = envelope.to_json().unwrap();

        assert_eq!(json["window"], "today");
        assert_eq!(json["current"]["heat_index"], "n/a");
        assert_eq!(json["current"]["wind_gusts"], serde_json::Value::Null);
        assert_eq!(json["current"]["temperature"], 21.0);
        assert_eq!(json["daily"][0]["uv_risk"], "moderate");
        assert_eq!(json["daily"][0]["daylight"], "15h00");
        assert_eq!(json["daily"][0]["sunshine"], serde_json::Value::Null);
        assert!(json.get("trend").is_none());
        assert!(json["periods"].get("morning").is_some());
    }

    #[test]
    fn test_window_serializes_day_count() {
        let envelope = select_window(&forecast(7), WindowToken::Days(3), today());
        assert_eq!(envelope.to_json().unwrap()["window"], "3-days");
    }
}
