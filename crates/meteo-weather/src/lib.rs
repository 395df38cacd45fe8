//! Weather pipeline for Meteo
//!
//! Turns Open-Meteo forecast payloads into normalized hourly/daily series,
//! per-period summaries and derived metrics, and assembles compact
//! forecast windows. Network collaborators (forecast provider, geocoder)
//! and the caller-owned cache live alongside the pure pipeline.

pub mod types;
pub mod payload;
pub mod normalize;
pub mod periods;
pub mod metrics;
pub mod window;
pub mod cache;
pub mod geocode;
pub mod provider;

pub use types::*;
pub use cache::{CacheKey, ForecastCache};
pub use geocode::{Geocoder, Place};
pub use normalize::normalize;
pub use payload::ForecastResponse;
pub use periods::{aggregate_periods, partition_by_period, Period, PeriodStats, PeriodSummary};
pub use provider::WeatherProvider;
pub use window::{select_window, ForecastEnvelope, WindowToken};
