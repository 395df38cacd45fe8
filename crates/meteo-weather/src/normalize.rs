//! Provider payload → typed current/hourly/daily tables.

use chrono::{DateTime, NaiveDateTime};

use crate::payload::{ForecastResponse, SnapshotBlock, VariableTable};
use crate::types::{CurrentConditions, DailyRow, Forecast, HourlyRow, Location, WeatherError};

const HOUR_SECS: i64 = 3600;
const DAY_SECS: i64 = 86_400;

// Accepted provider names per field, most specific first.
const TEMPERATURE: &[&str] = &["temperature_2m", "temperature"];
const APPARENT_TEMPERATURE: &[&str] = &["apparent_temperature"];
const RELATIVE_HUMIDITY: &[&str] = &[
    "relative_humidity_2m",
    "relativehumidity_2m",
    "relative_humidity",
];
const WIND_SPEED: &[&str] = &["wind_speed_10m", "windspeed_10m", "wind_speed"];
const WIND_DIRECTION: &[&str] = &["wind_direction_10m", "winddirection_10m", "wind_direction"];
const WIND_GUSTS: &[&str] = &["wind_gusts_10m", "windgusts_10m", "wind_gusts"];
const PRECIPITATION: &[&str] = &["precipitation"];
const PRECIPITATION_PROBABILITY: &[&str] = &["precipitation_probability"];
const RAIN: &[&str] = &["rain"];
const SHOWERS: &[&str] = &["showers"];
const SNOWFALL: &[&str] = &["snowfall"];
const CLOUD_COVER: &[&str] = &["cloud_cover", "cloudcover"];
const PRESSURE_MSL: &[&str] = &["pressure_msl"];
const SURFACE_PRESSURE: &[&str] = &["surface_pressure"];
const VISIBILITY: &[&str] = &["visibility"];
const UV_INDEX: &[&str] = &["uv_index"];
const UV_INDEX_CLEAR_SKY: &[&str] = &["uv_index_clear_sky"];
const WEATHER_CODE: &[&str] = &["weather_code", "weathercode"];
const IS_DAY: &[&str] = &["is_day"];

const TEMPERATURE_MAX: &[&str] = &["temperature_2m_max", "temperature_max"];
const TEMPERATURE_MIN: &[&str] = &["temperature_2m_min", "temperature_min"];
const APPARENT_TEMPERATURE_MAX: &[&str] = &["apparent_temperature_max"];
const PRECIPITATION_SUM: &[&str] = &["precipitation_sum"];
const PRECIPITATION_PROBABILITY_MAX: &[&str] = &["precipitation_probability_max"];
const WIND_SPEED_MAX: &[&str] = &["wind_speed_10m_max", "windspeed_10m_max"];
const UV_INDEX_MAX: &[&str] = &["uv_index_max"];
const SUNRISE: &[&str] = &["sunrise"];
const SUNSET: &[&str] = &["sunset"];
const DAYLIGHT_DURATION: &[&str] = &["daylight_duration"];
const SUNSHINE_DURATION: &[&str] = &["sunshine_duration"];

/// Normalize the first location of a provider response.
///
/// Fails with [`WeatherError::NoDataAvailable`] when there is no location, or
/// when the first location carries neither a current snapshot nor any rows.
pub fn normalize(responses: &[ForecastResponse]) -> Result<Forecast, WeatherError> {
    let response = responses.first().ok_or(WeatherError::NoDataAvailable)?;
    normalize_response(response)
}

/// Normalize a single location's response
pub fn normalize_response(response: &ForecastResponse) -> Result<Forecast, WeatherError> {
    let offset = response.utc_offset_seconds;

    let location = Location {
        latitude: response.latitude,
        longitude: response.longitude,
        elevation: response.elevation.filter(|e| e.is_finite()),
        timezone: response.timezone.clone(),
        timezone_abbreviation: response.timezone_abbreviation.clone(),
        utc_offset_seconds: offset,
    };

    let current = response
        .current
        .as_ref()
        .and_then(|block| current_conditions(block, offset));
    let hourly = response
        .hourly
        .as_ref()
        .map(|table| hourly_rows(table, offset))
        .unwrap_or_default();
    let daily = response
        .daily
        .as_ref()
        .map(|table| daily_rows(table, offset))
        .unwrap_or_default();

    if current.is_none() && hourly.is_empty() && daily.is_empty() {
        tracing::warn!(
            "Forecast for ({}, {}) has no usable records",
            location.latitude,
            location.longitude
        );
        return Err(WeatherError::NoDataAvailable);
    }

    tracing::debug!(
        "Normalized forecast: current={}, hourly={}, daily={}",
        current.is_some(),
        hourly.len(),
        daily.len()
    );

    Ok(Forecast {
        location,
        current,
        hourly,
        daily,
    })
}

/// Epoch seconds → local wall-clock time using the response's UTC offset
pub fn local_time(epoch: i64, utc_offset_seconds: i32) -> Option<NaiveDateTime> {
    let local = epoch.checked_add(i64::from(utc_offset_seconds))?;
    DateTime::from_timestamp(local, 0).map(|dt| dt.naive_utc())
}

fn weather_code(value: Option<f64>) -> Option<i32> {
    value.map(|v| v.round() as i32)
}

fn is_day(value: Option<f64>) -> Option<bool> {
    value.map(|v| v != 0.0)
}

fn current_conditions(block: &SnapshotBlock, offset: i32) -> Option<CurrentConditions> {
    let Some(time) = local_time(block.time, offset) else {
        tracing::warn!("Current snapshot has an out-of-range timestamp: {}", block.time);
        return None;
    };

    Some(CurrentConditions {
        time,
        temperature: block.value(TEMPERATURE),
        apparent_temperature: block.value(APPARENT_TEMPERATURE),
        relative_humidity: block.value(RELATIVE_HUMIDITY),
        wind_speed: block.value(WIND_SPEED),
        wind_direction: block.value(WIND_DIRECTION),
        wind_gusts: block.value(WIND_GUSTS),
        precipitation: block.value(PRECIPITATION),
        rain: block.value(RAIN),
        showers: block.value(SHOWERS),
        snowfall: block.value(SNOWFALL),
        cloud_cover: block.value(CLOUD_COVER),
        pressure_msl: block.value(PRESSURE_MSL),
        surface_pressure: block.value(SURFACE_PRESSURE),
        weather_code: weather_code(block.value(WEATHER_CODE)),
        is_day: is_day(block.value(IS_DAY)),
    })
}

/// Build the hourly series of a table
pub fn hourly_rows(table: &dyn VariableTable, offset: i32) -> Vec<HourlyRow> {
    let Some(axis) = table.axis(HOUR_SECS) else {
        return Vec::new();
    };

    let temperature = table.resolve(TEMPERATURE, &axis);
    let apparent_temperature = table.resolve(APPARENT_TEMPERATURE, &axis);
    let precipitation_probability = table.resolve(PRECIPITATION_PROBABILITY, &axis);
    let precipitation = table.resolve(PRECIPITATION, &axis);
    let rain = table.resolve(RAIN, &axis);
    let showers = table.resolve(SHOWERS, &axis);
    let snowfall = table.resolve(SNOWFALL, &axis);
    let relative_humidity = table.resolve(RELATIVE_HUMIDITY, &axis);
    let wind_speed = table.resolve(WIND_SPEED, &axis);
    let wind_direction = table.resolve(WIND_DIRECTION, &axis);
    let wind_gusts = table.resolve(WIND_GUSTS, &axis);
    let cloud_cover = table.resolve(CLOUD_COVER, &axis);
    let visibility = table.resolve(VISIBILITY, &axis);
    let uv_index = table.resolve(UV_INDEX, &axis);
    let uv_index_clear_sky = table.resolve(UV_INDEX_CLEAR_SKY, &axis);
    let codes = table.resolve(WEATHER_CODE, &axis);
    let day_flags = table.resolve(IS_DAY, &axis);

    axis.timestamps()
        .enumerate()
        .filter_map(|(i, epoch)| {
            let time = local_time(epoch, offset)?;
            Some(HourlyRow {
                time,
                temperature: temperature.get(i),
                apparent_temperature: apparent_temperature.get(i),
                precipitation_probability: precipitation_probability.get(i),
                precipitation: precipitation.get(i),
                rain: rain.get(i),
                showers: showers.get(i),
                snowfall: snowfall.get(i),
                relative_humidity: relative_humidity.get(i),
                wind_speed: wind_speed.get(i),
                wind_direction: wind_direction.get(i),
                wind_gusts: wind_gusts.get(i),
                cloud_cover: cloud_cover.get(i),
                visibility: visibility.get(i),
                uv_index: uv_index.get(i),
                uv_index_clear_sky: uv_index_clear_sky.get(i),
                weather_code: weather_code(codes.get(i)),
                is_day: is_day(day_flags.get(i)),
            })
        })
        .collect()
}

/// Build the daily series of a table
pub fn daily_rows(table: &dyn VariableTable, offset: i32) -> Vec<DailyRow> {
    let Some(axis) = table.axis(DAY_SECS) else {
        return Vec::new();
    };

    let temperature_max = table.resolve(TEMPERATURE_MAX, &axis);
    let temperature_min = table.resolve(TEMPERATURE_MIN, &axis);
    let apparent_temperature_max = table.resolve(APPARENT_TEMPERATURE_MAX, &axis);
    let precipitation_sum = table.resolve(PRECIPITATION_SUM, &axis);
    let precipitation_probability_max = table.resolve(PRECIPITATION_PROBABILITY_MAX, &axis);
    let wind_speed_max = table.resolve(WIND_SPEED_MAX, &axis);
    let uv_index_max = table.resolve(UV_INDEX_MAX, &axis);
    let sunrise = table.resolve(SUNRISE, &axis);
    let sunset = table.resolve(SUNSET, &axis);
    let daylight_duration = table.resolve(DAYLIGHT_DURATION, &axis);
    let sunshine_duration = table.resolve(SUNSHINE_DURATION, &axis);
    let codes = table.resolve(WEATHER_CODE, &axis);

    let instant = |value: Option<f64>| value.and_then(|v| local_time(v as i64, offset));

    axis.timestamps()
        .enumerate()
        .filter_map(|(i, epoch)| {
            let date = local_time(epoch, offset)?.date();
            Some(DailyRow {
                date,
                temperature_max: temperature_max.get(i),
                temperature_min: temperature_min.get(i),
                apparent_temperature_max: apparent_temperature_max.get(i),
                precipitation_sum: precipitation_sum.get(i),
                precipitation_probability_max: precipitation_probability_max.get(i),
                wind_speed_max: wind_speed_max.get(i),
                uv_index_max: uv_index_max.get(i),
                sunrise: instant(sunrise.get(i)),
                sunset: instant(sunset.get(i)),
                daylight_duration: daylight_duration.get(i),
                sunshine_duration: sunshine_duration.get(i),
                weather_code: weather_code(codes.get(i)),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};
    use serde_json::json;

    // 2024-06-01T00:00:00Z
    const MIDNIGHT_UTC: i64 = 1_717_200_000;

    fn response(value: serde_json::Value) -> ForecastResponse {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> ForecastResponse {
        let hours: Vec<i64> = (0..48).map(|h| MIDNIGHT_UTC + h * 3600).collect();
        let temps: Vec<serde_json::Value> = (0..48).map(|h| json!(10.0 + h as f64 / 2.0)).collect();
        response(json!({
            "latitude": 48.85,
            "longitude": 2.35,
            "elevation": 43.0,
            "timezone": "UTC",
            "timezone_abbreviation": "UTC",
            "utc_offset_seconds": 0,
            "current": {
                "time": MIDNIGHT_UTC + 9 * 3600,
                "interval": 900,
                "temperature_2m": 14.2,
                "winddirection_10m": 225,
                "is_day": 1,
                "weather_code": 3.0
            },
            "hourly": {
                "time": hours,
                "temperature_2m": temps,
                "precipitation_probability": vec![json!(null); 48],
                "is_day": vec![json!(0); 48]
            },
            "daily": {
                "time": [MIDNIGHT_UTC, MIDNIGHT_UTC + 86_400],
                "temperature_2m_max": [21.5, "NaN"],
                "sunrise": [MIDNIGHT_UTC + 4 * 3600, MIDNIGHT_UTC + 86_400 + 4 * 3600],
                "daylight_duration": [57_600.0, null]
            }
        }))
    }

    #[test]
    fn test_normalize_builds_three_tables() {
        let forecast = normalize(&[sample()]).unwrap();

        assert_eq!(forecast.hourly.len(), 48);
        assert_eq!(forecast.daily.len(), 2);
        assert_eq!(forecast.location.elevation, Some(43.0));

        let current = forecast.current.unwrap();
        assert_eq!(current.temperature, Some(14.2));
        assert_eq!(current.wind_direction, Some(225.0));
        assert_eq!(current.weather_code, Some(3));
        assert_eq!(current.is_day, Some(true));
        assert_eq!(current.pressure_msl, None);
    }

    #[test]
    fn test_hourly_rows_are_ascending_and_typed() {
        let forecast = normalize(&[sample()]).unwrap();
        let first = &forecast.hourly[0];
        let last = &forecast.hourly[47];

        assert_eq!(first.time.hour(), 0);
        assert_eq!(first.temperature, Some(10.0));
        assert_eq!(first.precipitation_probability, None);
        assert_eq!(first.is_day, Some(false));
        assert_eq!(first.uv_index, None);
        assert!(forecast.hourly.windows(2).all(|w| w[0].time < w[1].time));
        assert_eq!(last.date(), NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
    }

    #[test]
    fn test_daily_non_finite_becomes_absent() {
        let forecast = normalize(&[sample()]).unwrap();
        let today = &forecast.daily[0];
        let tomorrow = &forecast.daily[1];

        assert_eq!(today.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(today.temperature_max, Some(21.5));
        assert_eq!(today.sunrise.map(|t| t.hour()), Some(4));
        assert_eq!(today.daylight_duration, Some(57_600.0));
        assert_eq!(tomorrow.temperature_max, None);
        assert_eq!(tomorrow.daylight_duration, None);
    }

    #[test]
    fn test_utc_offset_localizes_rows() {
        let forecast = normalize(&[response(json!({
            "latitude": 40.7,
            "longitude": -74.0,
            "utc_offset_seconds": -4 * 3600,
            "hourly": {
                "time": [MIDNIGHT_UTC, MIDNIGHT_UTC + 3600],
                "temperature_2m": [18.0, 17.5]
            }
        }))])
        .unwrap();

        // 00:00Z is 20:00 the previous evening at UTC-4
        assert_eq!(forecast.hourly[0].time.hour(), 20);
        assert_eq!(
            forecast.hourly[0].date(),
            NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()
        );
    }

    #[test]
    fn test_empty_responses_is_no_data() {
        assert!(matches!(normalize(&[]), Err(WeatherError::NoDataAvailable)));
    }

    #[test]
    fn test_response_without_records_is_no_data() {
        let empty = response(json!({
            "latitude": 0.0,
            "longitude": 0.0,
            "hourly": { "time": [] }
        }));
        assert!(matches!(
            normalize(&[empty]),
            Err(WeatherError::NoDataAvailable)
        ));
    }

    #[test]
    fn test_local_time_out_of_range() {
        assert_eq!(local_time(i64::MAX, 3600), None);
        assert_eq!(local_time(i64::MIN, -3600), None);
        assert!(local_time(MIDNIGHT_UTC, 7200).is_some());
    }

    #[test]
    fn test_corrupt_time_array_is_no_data() {
        let corrupt = response(json!({
            "latitude": 0.0,
            "longitude": 0.0,
            "hourly": {
                "time": [i64::MAX - 10],
                "temperature_2m": [1.0]
            }
        }));
        assert!(matches!(
            normalize(&[corrupt]),
            Err(WeatherError::NoDataAvailable)
        ));
    }

    #[test]
    fn test_corrupt_hourly_keeps_daily() {
        let forecast = normalize(&[response(json!({
            "latitude": 0.0,
            "longitude": 0.0,
            "hourly": {
                "time": [MIDNIGHT_UTC, MIDNIGHT_UTC + 1, MIDNIGHT_UTC + 365 * 86_400],
                "temperature_2m": [1.0, 2.0, 3.0]
            },
            "daily": {
                "time": [MIDNIGHT_UTC],
                "temperature_2m_max": [21.0]
            }
        }))])
        .unwrap();

        assert!(forecast.hourly.is_empty());
        assert_eq!(forecast.daily.len(), 1);
    }

    #[test]
    fn test_short_column_pads_with_absent() {
        let forecast = normalize(&[response(json!({
            "latitude": 0.0,
            "longitude": 0.0,
            "hourly": {
                "time": [MIDNIGHT_UTC, MIDNIGHT_UTC + 3600, MIDNIGHT_UTC + 7200],
                "temperature_2m": [1.0]
            }
        }))])
        .unwrap();

        assert_eq!(forecast.hourly.len(), 3);
        assert_eq!(forecast.hourly[0].temperature, Some(1.0));
        assert_eq!(forecast.hourly[2].temperature, None);
    }
}
