//! Forward geocoding: convert a city name to coordinates.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use crate::types::WeatherError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_USER_AGENT: &str = "Meteo/0.1.0";

/// Nominatim returns coordinates as strings
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

/// A geocoded place
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    search_url: String,
}

impl Geocoder {
    /// Geocoder against `search_url`; Nominatim requires an identifying user agent
    pub fn new(search_url: &str, user_agent: &str) -> Result<Self, WeatherError> {
        let user_agent = if user_agent.trim().is_empty() {
            DEFAULT_USER_AGENT
        } else {
            user_agent
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            search_url: search_url.to_string(),
        })
    }

    /// Look up the best match for `city`.
    /// Returns `None` on no match, failure or timeout.
    pub async fn search(&self, city: &str) -> Option<Place> {
        let city = city.trim();
        if city.is_empty() {
            return None;
        }

        let response = match self
            .client
            .get(&self.search_url)
            .query(&[("q", city), ("format", "json"), ("limit", "1")])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Geocode returned status {}", response.status());
            return None;
        }

        let places: Vec<NominatimPlace> = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!("Geocode parse error: {}", e);
                return None;
            }
        };

        let first = places.into_iter().next()?;
        let (Ok(latitude), Ok(longitude)) = (first.lat.parse(), first.lon.parse()) else {
            tracing::debug!("Geocode returned unparsable coordinates");
            return None;
        };

        let place = Place {
            name: first.display_name.unwrap_or_else(|| city.to_string()),
            latitude,
            longitude,
        };
        tracing::info!("Geocoded {:?} to {:.4}, {:.4}", city, latitude, longitude);
        Some(place)
    }
}
