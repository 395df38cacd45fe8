use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Forecast provider settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// City search settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Forecast cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Location used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultLocation>,
}

/// Temperature unit preference for printed forecasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Open-Meteo forecast endpoint
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,

    /// Number of forecast days to request (1-16)
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,

    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Temperature unit preference
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_forecast_days() -> u8 {
    7
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_url: default_forecast_url(),
            forecast_days: default_forecast_days(),
            timeout_secs: default_timeout_secs(),
            temperature_unit: TemperatureUnit::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Nominatim search endpoint
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// User agent sent to Nominatim (required by its usage policy)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_search_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_user_agent() -> String {
    "Meteo/0.1.0".to_string()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a fetched forecast stays fresh, in minutes
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: u32,
}

fn default_ttl_minutes() -> u32 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_ttl_minutes(),
        }
    }
}

/// Fallback location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultLocation {
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Config {
    /// Load configuration from the user config directory, creating a default file if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, creating a default file if missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            tracing::info!("No config at {}, writing defaults", config_path.display());
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.forecast_url, "weather.forecast_url", &mut result);
        self.validate_url(&self.geocoding.search_url, "geocoding.search_url", &mut result);

        // Open-Meteo accepts 1..=16 forecast days
        if self.weather.forecast_days == 0 || self.weather.forecast_days > 16 {
            result.add_error(
                "weather.forecast_days",
                "Forecast days must be between 1 and 16",
            );
        } else if self.weather.forecast_days < 7 {
            result.add_warning(
                "weather.forecast_days",
                "Fewer than 7 forecast days; week windows will be truncated",
            );
        }

        if self.weather.timeout_secs == 0 {
            result.add_error("weather.timeout_secs", "Timeout must be greater than 0");
        }

        if self.geocoding.user_agent.trim().is_empty() {
            result.add_error("geocoding.user_agent", "User agent must not be empty");
        }

        if self.cache.ttl_minutes == 0 {
            result.add_warning("cache.ttl_minutes", "Forecast cache disabled (0 minutes)");
        } else if self.cache.ttl_minutes > 1440 {
            result.add_warning(
                "cache.ttl_minutes",
                "Forecast cache lifetime is more than 24 hours",
            );
        }

        if let Some(defaults) = &self.defaults {
            match (defaults.latitude, defaults.longitude) {
                (Some(lat), Some(lon)) => {
                    if !(-90.0..=90.0).contains(&lat) {
                        result.add_error("defaults.latitude", "Latitude must be within -90..=90");
                    }
                    if !(-180.0..=180.0).contains(&lon) {
                        result.add_error(
                            "defaults.longitude",
                            "Longitude must be within -180..=180",
                        );
                    }
                }
                (None, None) => {
                    if defaults.city.is_none() {
                        result.add_warning("defaults", "Default location is empty");
                    }
                }
                _ => result.add_error(
                    "defaults",
                    "Latitude and longitude must be given together",
                ),
            }
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the user config directory
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound("user config directory".into()))?
            .join("meteo");

        Ok(config_dir.join("config.toml"))
    }
}
