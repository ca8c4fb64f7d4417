//! Data models for the `CityWeather` application
//!
//! This module contains the domain models organized by concern:
//! - Weather: provider payloads for current conditions and forecast samples
//! - Forecast: daily high/low summaries derived from the samples
//! - Location: IP geolocation payload and caller address source

pub mod forecast;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::{DailyForecast, DailySummary, MAX_FORECAST_DAYS};
pub use location::{ClientAddressSource, GeoLookup};
pub use weather::{
    Condition, CurrentWeather, ForecastResponse, ForecastSample, ProviderEnvelope, ProviderStatus,
};
