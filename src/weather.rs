//! Weather provider client (OpenWeatherMap-compatible API)
//!
//! Two read-only lookups per city: current conditions (`/weather`) and the
//! 5-day / 3-hour forecast (`/forecast`). Either both succeed or the caller
//! gets a single [`FetchError`]; partial data is never returned.

use crate::config::WeatherConfig;
use crate::error::{AppError, FetchError};
use crate::models::{CurrentWeather, ForecastResponse, ForecastSample, ProviderEnvelope};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

const UPSTREAM: &str = "weather-provider";
/// Both endpoints are always queried in metric units
const UNITS: &str = "metric";

/// Raw provider data for one city
#[derive(Debug, Clone)]
pub struct CityWeather {
    pub current: CurrentWeather,
    pub samples: Vec<ForecastSample>,
}

/// HTTP client for the weather provider
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl WeatherClient {
    /// Create a new client with the configured transport timeout
    pub fn new(config: &WeatherConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("CityWeather/", env!("CARGO_PKG_VERSION")))
            .build()?;

        if config.api_key.as_deref().is_none_or(str::is_empty) {
            warn!("No weather API key configured; every lookup will be rejected by the provider");
        }

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Fetch current conditions and forecast samples for a city.
    ///
    /// Failures are logged here and returned as a tagged [`FetchError`].
    #[instrument(skip(self))]
    pub async fn get_weather_data(&self, city: &str) -> Result<CityWeather, FetchError> {
        let start_time = Instant::now();

        let result = tokio::try_join!(
            self.get_endpoint::<CurrentWeather>("weather", city),
            self.get_endpoint::<ForecastResponse>("forecast", city),
        );

        match result {
            Ok((current, forecast)) => {
                info!(
                    "Retrieved weather for '{}' ({} forecast samples) in {:.3}s",
                    city,
                    forecast.list.len(),
                    start_time.elapsed().as_secs_f64()
                );
                Ok(CityWeather {
                    current,
                    samples: forecast.list,
                })
            }
            Err(err) => {
                err.log(UPSTREAM);
                Err(err)
            }
        }
    }

    async fn get_endpoint<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        city: &str,
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("Weather provider request: {} (q={})", url, city);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_deref().unwrap_or_default()),
                ("units", UNITS),
            ])
            .send()
            .await?;

        // Error bodies come with 4xx statuses, so the body is read regardless
        let http_status = response.status();
        let body = response.bytes().await?;

        let value: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
            FetchError::unexpected(format!(
                "/{endpoint} returned a non-JSON body (HTTP {http_status}): {e}"
            ))
        })?;

        let envelope: ProviderEnvelope = serde_json::from_value(value.clone())?;
        match envelope.cod {
            Some(ref status) if status.is_success() => {}
            Some(ref status) => {
                return Err(FetchError::semantic(format!(
                    "/{endpoint} returned cod {status}: {}",
                    envelope.message_text()
                )));
            }
            None => {
                return Err(FetchError::unexpected(format!(
                    "/{endpoint} response has no status code (HTTP {http_status})"
                )));
            }
        }

        Ok(serde_json::from_value(value)?)
    }
}
