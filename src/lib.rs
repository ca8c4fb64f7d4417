//! `CityWeather` - current weather and a five-day forecast for a city
//!
//! This library provides the weather and geolocation clients, the daily
//! forecast aggregation and the web front end that ties them together.

pub mod api;
pub mod config;
pub mod error;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod views;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::{AppState, router};
pub use config::AppConfig;
pub use error::{AppError, FetchError};
pub use location_resolver::{GeolocationClient, LocationResolver, ResolvedLocation};
pub use models::{CurrentWeather, DailyForecast, DailySummary, ForecastSample};
pub use weather::{CityWeather, WeatherClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
