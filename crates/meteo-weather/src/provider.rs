//! Open-Meteo forecast client.

use crate::normalize::normalize;
use crate::payload::ForecastResponse;
use crate::types::{Forecast, WeatherError};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const CURRENT_VARIABLES: &[&str] = &[
    "temperature_2m",
    "apparent_temperature",
    "relative_humidity_2m",
    "wind_speed_10m",
    "wind_direction_10m",
    "wind_gusts_10m",
    "precipitation",
    "rain",
    "showers",
    "snowfall",
    "cloud_cover",
    "pressure_msl",
    "surface_pressure",
    "weather_code",
    "is_day",
];

const HOURLY_VARIABLES: &[&str] = &[
    "temperature_2m",
    "apparent_temperature",
    "precipitation_probability",
    "precipitation",
    "rain",
    "showers",
    "snowfall",
    "relative_humidity_2m",
    "wind_speed_10m",
    "wind_direction_10m",
    "wind_gusts_10m",
    "cloud_cover",
    "visibility",
    "uv_index",
    "uv_index_clear_sky",
    "weather_code",
    "is_day",
];

const DAILY_VARIABLES: &[&str] = &[
    "temperature_2m_max",
    "temperature_2m_min",
    "apparent_temperature_max",
    "precipitation_sum",
    "precipitation_probability_max",
    "wind_speed_10m_max",
    "uv_index_max",
    "sunrise",
    "sunset",
    "daylight_duration",
    "sunshine_duration",
    "weather_code",
];

/// Open-Meteo reports request errors as `{"error": true, "reason": "..."}`
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    reason: String,
}

/// The endpoint answers with one object per location, or an array for several
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResponseBody {
    Many(Vec<ForecastResponse>),
    One(Box<ForecastResponse>),
}

/// Forecast provider backed by the Open-Meteo API
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    forecast_url: Url,
    forecast_days: u8,
}

impl WeatherProvider {
    pub fn new(forecast_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let forecast_url = Url::parse(forecast_url)
            .map_err(|e| WeatherError::Parse(format!("Invalid forecast URL: {}", e)))?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            forecast_url,
            forecast_days: 7,
        })
    }

    pub fn with_forecast_days(mut self, days: u8) -> Self {
        self.forecast_days = days;
        self
    }

    /// Fetch the raw forecast payloads for a coordinate pair
    pub async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<ForecastResponse>, WeatherError> {
        tracing::debug!("Fetching forecast for {:.4}, {:.4}", latitude, longitude);

        let query = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("current", CURRENT_VARIABLES.join(",")),
            ("hourly", HOURLY_VARIABLES.join(",")),
            ("daily", DAILY_VARIABLES.join(",")),
            ("timezone", "auto".to_string()),
            ("timeformat", "unixtime".to_string()),
            ("forecast_days", self.forecast_days.to_string()),
            // Derived metrics assume Celsius; display conversion happens later
            ("temperature_unit", "celsius".to_string()),
        ];

        let response = self
            .client
            .get(self.forecast_url.clone())
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.reason)
                .unwrap_or(body);
            tracing::warn!("Forecast request failed ({}): {}", status, message);
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let responses = match serde_json::from_str::<ResponseBody>(&body)
            .map_err(|e| WeatherError::Parse(e.to_string()))?
        {
            ResponseBody::Many(many) => many,
            ResponseBody::One(one) => vec![*one],
        };

        tracing::info!("Received {} forecast response(s)", responses.len());
        Ok(responses)
    }

    /// Fetch and normalize the forecast for a coordinate pair
    pub async fn forecast(&self, latitude: f64, longitude: f64) -> Result<Forecast, WeatherError> {
        let responses = self.fetch(latitude, longitude).await?;
        normalize(&responses)
    }
}
