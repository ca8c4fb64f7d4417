//! Configuration management for `CityWeather`
//!
//! Settings come from built-in defaults, an optional TOML file, environment
//! variables prefixed with `CITYWEATHER_` and finally command line flags.
//! The result is built once at startup and handed to every component.

use crate::AppError;
use crate::models::ClientAddressSource;
use anyhow::{Context, Result};
use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the provider key in older deployments
pub const LEGACY_API_KEY_VAR: &str = "OPENWEATHERMAP_API_KEY";

const ENV_PREFIX: &str = "CITYWEATHER";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub weather: WeatherConfig,
    pub geolocation: GeolocationConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for handling one request, upstream calls included
    pub request_timeout_seconds: u32,
    /// Directory served under `/static`
    pub static_dir: String,
}

/// Weather provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Provider credential. Missing keys surface as per-request failures.
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_seconds: u32,
}

/// IP geolocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    pub base_url: String,
    pub timeout_seconds: u32,
    /// Where the caller address is read from
    pub address_source: ClientAddressSource,
    /// Fixed address used instead of the caller's, handy on localhost
    pub override_address: Option<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// Values given on the command line, applied last
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_geolocation_base_url() -> String {
    "http://ip-api.com".to_string()
}

fn default_timeout() -> u32 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            request_timeout_seconds: 30,
            static_dir: "static".to_string(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            base_url: default_geolocation_base_url(),
            timeout_seconds: default_timeout(),
            address_source: ClientAddressSource::Peer,
            override_address: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl WeatherConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl GeolocationConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    /// Parsed override address, if one is configured
    pub fn override_ip(&self) -> Result<Option<IpAddr>> {
        self.override_address
            .as_deref()
            .filter(|addr| !addr.trim().is_empty())
            .map(|addr| {
                addr.trim().parse::<IpAddr>().map_err(|_| {
                    anyhow::Error::from(AppError::config(format!(
                        "Invalid geolocation override address '{addr}'"
                    )))
                })
            })
            .transpose()
    }
}

impl ServerConfig {
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.into())
    }
}

impl AppConfig {
    /// Load configuration from file, environment and command line
    pub fn load(config_path: Option<PathBuf>, overrides: CliOverrides) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(|| PathBuf::from("config.toml"));

        let mut builder = Config::builder();
        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(FileFormat::Toml),
            );
        }

        // CITYWEATHER_WEATHER__API_KEY -> weather.api_key
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut config = Self::from_builder(builder)
            .with_context(|| format!("Failed to load configuration ({})", config_file.display()))?;

        config.apply_legacy_api_key(std::env::var(LEGACY_API_KEY_VAR).ok());
        config.apply_overrides(overrides);
        config.validate()?;

        Ok(config)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")
    }

    /// Fall back to the legacy key variable when no key was configured
    pub fn apply_legacy_api_key(&mut self, legacy_key: Option<String>) {
        let has_key = self
            .weather
            .api_key
            .as_deref()
            .is_some_and(|key| !key.is_empty());
        if !has_key {
            if let Some(key) = legacy_key.filter(|key| !key.is_empty()) {
                self.weather.api_key = Some(key);
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.geolocation.override_ip()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::config("Server port cannot be 0").into());
        }

        let timeouts = [
            ("Server request", self.server.request_timeout_seconds),
            ("Weather API", self.weather.timeout_seconds),
            ("Geolocation API", self.geolocation.timeout_seconds),
        ];
        for (name, seconds) in timeouts {
            if !(1..=300).contains(&seconds) {
                return Err(AppError::config(format!(
                    "{name} timeout must be between 1 and 300 seconds"
                ))
                .into());
            }
        }

        // `/location` waits on geolocation, then on the weather requests
        let upstream_budget =
            self.geolocation.timeout_seconds + self.weather.timeout_seconds;
        if self.server.request_timeout_seconds <= upstream_budget {
            return Err(AppError::config(format!(
                "Server request timeout ({}s) must exceed the geolocation and weather timeouts combined ({}s)",
                self.server.request_timeout_seconds, upstream_budget
            ))
            .into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AppError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AppError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Weather API", &self.weather.base_url),
            ("Geolocation API", &self.geolocation.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AppError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
