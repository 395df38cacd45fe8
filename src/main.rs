mod cli;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use clap::Parser;
use meteo_core::{AppError, Config, ConfigError, ReqwestErrorExt};
use meteo_weather::{
    select_window, CacheKey, Forecast, ForecastCache, Geocoder, TemperatureUnit, WeatherError,
    WeatherProvider, WindowToken,
};

/// Map pipeline errors onto the application hierarchy
fn into_app_error(err: WeatherError) -> AppError {
    match err {
        WeatherError::Network(e) => AppError::Network(e.into_network_error()),
        other => AppError::Service(other.user_message().to_string()),
    }
}

/// Collaborators for one invocation
struct Session {
    config: Config,
    provider: WeatherProvider,
    cache: ForecastCache,
}

impl Session {
    fn new(config: Config) -> Result<Self> {
        let provider = WeatherProvider::new(
            &config.weather.forecast_url,
            Duration::from_secs(config.weather.timeout_secs),
        )
        .map_err(into_app_error)
        .context("Failed to create weather provider")?
        .with_forecast_days(config.weather.forecast_days);

        let cache = ForecastCache::with_ttl_minutes(config.cache.ttl_minutes);

        Ok(Self {
            config,
            provider,
            cache,
        })
    }

    /// Coordinates from the command line, a geocoded city, or config defaults
    async fn resolve_location(&self, args: &cli::Args) -> Result<(f64, f64)> {
        if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
            return Ok((lat, lon));
        }

        let defaults = self.config.defaults.clone().unwrap_or_default();
        let city = match (&args.city, defaults.latitude, defaults.longitude) {
            (Some(city), _, _) => city.clone(),
            (None, Some(lat), Some(lon)) => return Ok((lat, lon)),
            (None, _, _) => defaults.city.ok_or_else(|| {
                AppError::Config(ConfigError::MissingSetting(
                    "--city, --lat/--lon or [defaults] in the config file".into(),
                ))
            })?,
        };

        let geocoder = Geocoder::new(
            &self.config.geocoding.search_url,
            &self.config.geocoding.user_agent,
        )
        .map_err(into_app_error)?;

        let place = geocoder
            .search(&city)
            .await
            .ok_or_else(|| into_app_error(WeatherError::LocationNotFound(city.clone())))
            .with_context(|| format!("Failed to geocode {:?}", city))?;

        tracing::info!("Using {} ({:.4}, {:.4})", place.name, place.latitude, place.longitude);
        Ok((place.latitude, place.longitude))
    }

    /// Forecast for the location, reused while fresh
    async fn forecast(&mut self, latitude: f64, longitude: f64, date: NaiveDate) -> Result<Forecast> {
        let key = CacheKey::new(latitude, longitude, date);
        let now = Utc::now().naive_utc();

        if let Some(forecast) = self.cache.get(&key, now) {
            tracing::debug!("Using cached forecast");
            return Ok(forecast.clone());
        }

        let forecast = self
            .provider
            .forecast(latitude, longitude)
            .await
            .map_err(into_app_error)
            .context("Failed to fetch forecast")?;

        self.remember(key, forecast.clone(), now);
        Ok(forecast)
    }

    fn remember(&mut self, key: CacheKey, forecast: Forecast, now: NaiveDateTime) {
        self.cache.purge_expired(now);
        self.cache.insert(key, forecast, now);
    }
}

/// Map the configured unit onto the pipeline's display unit
fn display_unit(unit: meteo_core::TemperatureUnit) -> TemperatureUnit {
    match unit {
        meteo_core::TemperatureUnit::Celsius => TemperatureUnit::Celsius,
        meteo_core::TemperatureUnit::Fahrenheit => TemperatureUnit::Fahrenheit,
    }
}

/// Today's date at the forecast location
fn local_today(forecast: &Forecast) -> NaiveDate {
    forecast
        .current
        .as_ref()
        .map(|c| c.time.date())
        .unwrap_or_else(|| {
            let offset = chrono::Duration::seconds(i64::from(forecast.location.utc_offset_seconds));
            (Utc::now().naive_utc() + offset).date()
        })
}

async fn run(args: cli::Args) -> Result<()> {
    let (config, _) = Config::load_validated().context("Failed to load configuration")?;
    let mut session = Session::new(config)?;

    let (latitude, longitude) = session.resolve_location(&args).await?;
    let cache_date = args.date.unwrap_or_else(|| Utc::now().date_naive());
    let unit = display_unit(session.config.weather.temperature_unit);

    let mut envelopes = Vec::with_capacity(args.window.len());
    for window in &args.window {
        let forecast = session.forecast(latitude, longitude, cache_date).await?;
        let today = args.date.unwrap_or_else(|| local_today(&forecast));
        let token = WindowToken::parse(window);
        envelopes.push(select_window(&forecast, token, today).in_unit(unit).to_json()?);
    }

    let output = match envelopes.len() {
        1 => envelopes.remove(0),
        _ => serde_json::Value::Array(envelopes),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::Args::parse();

    if let Err(e) = meteo_core::init() {
        eprintln!("{:#}", e);
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            let message = match err.chain().find_map(|cause| cause.downcast_ref::<AppError>()) {
                // Pipeline failures already carry a display message
                Some(AppError::Service(detail)) => detail.as_str(),
                Some(app_err) => app_err.user_message(),
                None => "An unexpected error occurred. Please try again.",
            };
            eprintln!("Error: {}", message);
            ExitCode::FAILURE
        }
    }
}
