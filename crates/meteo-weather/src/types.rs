use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::fmt;

/// Display unit for temperatures.
///
/// Forecasts are always fetched and computed in Celsius; Fahrenheit is applied
/// when an envelope is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert a Celsius temperature, rounded to one decimal
    pub fn convert(&self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => ((celsius * 1.8 + 32.0) * 10.0).round() / 10.0,
        }
    }

    /// Convert a Celsius temperature difference
    pub fn convert_delta(&self, delta: f64) -> f64 {
        match self {
            Self::Celsius => delta,
            Self::Fahrenheit => (delta * 18.0).round() / 10.0,
        }
    }
}

/// Weather condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Showers,
    Snow,
    Sleet,
    Thunderstorm,
    #[default]
    Unknown,
}

impl WeatherCondition {
    /// Convert WMO weather code to WeatherCondition
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1..=2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::Sleet, // Freezing drizzle
            61 | 63 => Self::Rain,
            65 => Self::HeavyRain,
            66 | 67 => Self::Sleet, // Freezing rain
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            80..=82 => Self::Showers,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Unknown,
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Showers => "Showers",
            Self::Snow => "Snow",
            Self::Sleet => "Sleet",
            Self::Thunderstorm => "Thunderstorm",
            Self::Unknown => "Unknown",
        }
    }

    /// Get icon name for renderers
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Clear => "sun",
            Self::PartlyCloudy => "cloud_sun",
            Self::Cloudy => "cloud",
            Self::Fog => "cloud_fog",
            Self::Drizzle | Self::Rain | Self::HeavyRain => "cloud_rain",
            Self::Showers => "cloud_sun_rain",
            Self::Snow | Self::Sleet => "cloud_snow",
            Self::Thunderstorm => "cloud_lightning",
            Self::Unknown => "question",
        }
    }
}

/// Outcome of a derived computation.
///
/// `Unavailable` means an input was missing or not a finite number;
/// `NotApplicable` means the inputs were fine but outside the metric's domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric<T> {
    Value(T),
    Unavailable,
    NotApplicable,
}

impl<T> Metric<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Metric::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Metric::Value(_))
    }

    pub fn as_ref(&self) -> Metric<&T> {
        match self {
            Metric::Value(v) => Metric::Value(v),
            Metric::Unavailable => Metric::Unavailable,
            Metric::NotApplicable => Metric::NotApplicable,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Metric<U> {
        match self {
            Metric::Value(v) => Metric::Value(f(v)),
            Metric::Unavailable => Metric::Unavailable,
            Metric::NotApplicable => Metric::NotApplicable,
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Metric<U>) -> Metric<U> {
        match self {
            Metric::Value(v) => f(v),
            Metric::Unavailable => Metric::Unavailable,
            Metric::NotApplicable => Metric::NotApplicable,
        }
    }
}

impl<T> From<Option<T>> for Metric<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Metric::Unavailable, Metric::Value)
    }
}

impl<T: fmt::Display> fmt::Display for Metric<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Value(v) => fmt::Display::fmt(v, f),
            Metric::Unavailable => f.write_str("unknown"),
            Metric::NotApplicable => f.write_str("n/a"),
        }
    }
}

impl<T: Serialize> Serialize for Metric<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Metric::Value(v) => v.serialize(serializer),
            Metric::Unavailable => serializer.serialize_none(),
            Metric::NotApplicable => serializer.serialize_str("n/a"),
        }
    }
}

/// Geographic location of a normalized forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub timezone: Option<String>,
    pub timezone_abbreviation: Option<String>,
    pub utc_offset_seconds: i32,
}

/// Current conditions snapshot, in local time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub time: NaiveDateTime,
    pub temperature: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wind_gusts: Option<f64>,
    pub precipitation: Option<f64>,
    pub rain: Option<f64>,
    pub showers: Option<f64>,
    pub snowfall: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub pressure_msl: Option<f64>,
    pub surface_pressure: Option<f64>,
    pub weather_code: Option<i32>,
    pub is_day: Option<bool>,
}

/// One hour of forecast, in local time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyRow {
    pub time: NaiveDateTime,
    pub temperature: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub precipitation: Option<f64>,
    pub rain: Option<f64>,
    pub showers: Option<f64>,
    pub snowfall: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wind_gusts: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub visibility: Option<f64>,
    pub uv_index: Option<f64>,
    pub uv_index_clear_sky: Option<f64>,
    pub weather_code: Option<i32>,
    pub is_day: Option<bool>,
}

impl HourlyRow {
    /// A row with only its timestamp set
    pub fn empty(time: NaiveDateTime) -> Self {
        Self {
            time,
            temperature: None,
            apparent_temperature: None,
            precipitation_probability: None,
            precipitation: None,
            rain: None,
            showers: None,
            snowfall: None,
            relative_humidity: None,
            wind_speed: None,
            wind_direction: None,
            wind_gusts: None,
            cloud_cover: None,
            visibility: None,
            uv_index: None,
            uv_index_clear_sky: None,
            weather_code: None,
            is_day: None,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.time.date()
    }
}

/// One day of forecast as aggregated by the provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub temperature_max: Option<f64>,
    pub temperature_min: Option<f64>,
    pub apparent_temperature_max: Option<f64>,
    pub precipitation_sum: Option<f64>,
    pub precipitation_probability_max: Option<f64>,
    pub wind_speed_max: Option<f64>,
    pub uv_index_max: Option<f64>,
    pub sunrise: Option<NaiveDateTime>,
    pub sunset: Option<NaiveDateTime>,
    pub daylight_duration: Option<f64>,
    pub sunshine_duration: Option<f64>,
    pub weather_code: Option<i32>,
}

impl DailyRow {
    /// A row with only its date set
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            temperature_max: None,
            temperature_min: None,
            apparent_temperature_max: None,
            precipitation_sum: None,
            precipitation_probability_max: None,
            wind_speed_max: None,
            uv_index_max: None,
            sunrise: None,
            sunset: None,
            daylight_duration: None,
            sunshine_duration: None,
            weather_code: None,
        }
    }
}

/// Normalized forecast: current snapshot plus hourly and daily series.
///
/// `daily[0]` is today, `daily[1]` tomorrow, and so on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub location: Location,
    pub current: Option<CurrentConditions>,
    pub hourly: Vec<HourlyRow>,
    pub daily: Vec<DailyRow>,
}

/// Weather provider and pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("No forecast data available")]
    NoDataAvailable,
    #[error("Location not found: {0}")]
    LocationNotFound(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Weather API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoDataAvailable => "No forecast data is available for this location.",
            Self::LocationNotFound(_) => "Location not found. Check the spelling and try again.",
            Self::Network(_) => "Unable to reach the weather service. Check your connection.",
            Self::Api { status, .. } if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            Self::Api { .. } => "The weather service rejected the request.",
            Self::Parse(_) => "Received an unexpected response from the weather service.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wmo_code_clear_and_clouds() {
        assert_eq!(WeatherCondition::from_wmo_code(0), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_wmo_code(2), WeatherCondition::PartlyCloudy);
        assert_eq!(WeatherCondition::from_wmo_code(3), WeatherCondition::Cloudy);
        assert_eq!(WeatherCondition::from_wmo_code(48), WeatherCondition::Fog);
    }

    #[test]
    fn test_wmo_code_precipitation() {
        assert_eq!(WeatherCondition::from_wmo_code(53), WeatherCondition::Drizzle);
        assert_eq!(WeatherCondition::from_wmo_code(61), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::from_wmo_code(65), WeatherCondition::HeavyRain);
        assert_eq!(WeatherCondition::from_wmo_code(81), WeatherCondition::Showers);
        assert_eq!(WeatherCondition::from_wmo_code(67), WeatherCondition::Sleet);
        assert_eq!(WeatherCondition::from_wmo_code(75), WeatherCondition::Snow);
        assert_eq!(WeatherCondition::from_wmo_code(99), WeatherCondition::Thunderstorm);
    }

    #[test]
    fn test_wmo_code_unknown() {
        assert_eq!(WeatherCondition::from_wmo_code(999), WeatherCondition::Unknown);
        assert_eq!(WeatherCondition::from_wmo_code(-1), WeatherCondition::Unknown);
        assert_eq!(WeatherCondition::Unknown.description(), "Unknown");
    }

    #[test]
    fn test_condition_icon_name() {
        assert_eq!(WeatherCondition::Clear.icon_name(), "sun");
        assert_eq!(WeatherCondition::Rain.icon_name(), "cloud_rain");
    }

    #[test]
    fn test_metric_display_tags() {
        assert_eq!(Metric::Value(3).to_string(), "3");
        assert_eq!(Metric::<i32>::Unavailable.to_string(), "unknown");
        assert_eq!(Metric::<i32>::NotApplicable.to_string(), "n/a");
    }

    #[test]
    fn test_metric_serializes_tags_distinctly() {
        let json = serde_json::to_value(vec![
            Metric::Value(1.5),
            Metric::Unavailable,
            Metric::NotApplicable,
        ])
        .unwrap();
        assert_eq!(json, serde_json::json!([1.5, null, "n/a"]));
    }

    #[test]
    fn test_metric_from_option_and_combinators() {
        let absent: Metric<f64> = None.into();
        assert_eq!(absent, Metric::Unavailable);

        let doubled = Metric::from(Some(2.0)).map(|v| v * 2.0);
        assert_eq!(doubled.value(), Some(4.0));

        let na: Metric<f64> = Metric::Value(1.0).and_then(|_| Metric::NotApplicable);
        assert_eq!(na, Metric::NotApplicable);
        assert!(!na.is_value());
    }

    #[test]
    fn test_temperature_unit_conversion() {
        assert_eq!(TemperatureUnit::Celsius.convert(21.37), 21.37);
        assert_eq!(TemperatureUnit::Fahrenheit.convert(30.0), 86.0);
        assert_eq!(TemperatureUnit::Fahrenheit.convert(0.0), 32.0);
        assert_eq!(TemperatureUnit::Fahrenheit.convert(-40.0), -40.0);
        assert_eq!(TemperatureUnit::Fahrenheit.convert_delta(10.0), 18.0);
        assert_eq!(TemperatureUnit::Celsius.convert_delta(-2.5), -2.5);
    }

    #[test]
    fn test_error_user_messages() {
        assert!(WeatherError::NoDataAvailable.user_message().contains("No forecast"));
        let upstream = WeatherError::Api {
            status: 502,
            message: "bad gateway".into(),
        };
        assert!(upstream.user_message().contains("try again later"));
    }
}
