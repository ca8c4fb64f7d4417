//! Weather provider payloads: current conditions and 3-hour forecast samples

use serde::{Deserialize, Serialize};
use std::fmt;

/// The provider's `cod` field.
///
/// The current conditions endpoint sends a number (`200`), the forecast
/// endpoint a numeric string (`"200"`). Both shapes are accepted everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderStatus {
    Code(i64),
    Text(String),
}

impl ProviderStatus {
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            ProviderStatus::Code(code) => *code == 200,
            ProviderStatus::Text(text) => text.trim() == "200",
        }
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderStatus::Code(code) => write!(f, "{code}"),
            ProviderStatus::Text(text) => write!(f, "{text}"),
        }
    }
}

/// Fields common to every provider response, read before the full body is trusted
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEnvelope {
    pub cod: Option<ProviderStatus>,
    /// A string on errors, a number on some successes
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl ProviderEnvelope {
    #[must_use]
    pub fn message_text(&self) -> String {
        match &self.message {
            Some(serde_json::Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

/// One weather condition entry (`weather[i]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub main: Option<String>,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub temp_min: Option<f64>,
    #[serde(default)]
    pub temp_max: Option<f64>,
    #[serde(default)]
    pub humidity: Option<u8>,
    #[serde(default)]
    pub pressure: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    #[serde(default)]
    pub deg: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountryInfo {
    #[serde(default)]
    pub country: Option<String>,
}

/// "Right now" conditions for a city
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    #[serde(default)]
    pub name: String,
    pub main: MainReadings,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub wind: Option<Wind>,
    #[serde(default)]
    pub sys: Option<CountryInfo>,
    pub cod: ProviderStatus,
}

impl CurrentWeather {
    #[must_use]
    pub fn temperature(&self) -> f64 {
        self.main.temp
    }

    #[must_use]
    pub fn condition(&self) -> Option<&Condition> {
        self.weather.first()
    }

    #[must_use]
    pub fn country(&self) -> Option<&str> {
        self.sys.as_ref().and_then(|sys| sys.country.as_deref())
    }

    /// Convert wind direction from degrees to cardinal direction
    #[must_use]
    pub fn wind_direction_to_cardinal(degrees: u16) -> &'static str {
        match degrees {
            0..=11 | 349..=360 => "N",
            12..=33 => "NNE",
            34..=56 => "NE",
            57..=78 => "ENE",
            79..=101 => "E",
            102..=123 => "ESE",
            124..=146 => "SE",
            147..=168 => "SSE",
            169..=191 => "S",
            192..=213 => "SSW",
            214..=236 => "SW",
            237..=258 => "WSW",
            259..=281 => "W",
            282..=303 => "WNW",
            304..=326 => "NW",
            327..=348 => "NNW",
            _ => "Unknown",
        }
    }

    /// Format wind information, e.g. `3.6 m/s SW`
    #[must_use]
    pub fn format_wind(&self, speed_unit: &str) -> Option<String> {
        self.wind.as_ref().map(|wind| match wind.deg {
            Some(deg) => format!(
                "{:.1} {} {}",
                wind.speed,
                speed_unit,
                Self::wind_direction_to_cardinal(deg)
            ),
            None => format!("{:.1} {}", wind.speed, speed_unit),
        })
    }
}

/// Wire shape of one forecast list entry
#[derive(Debug, Deserialize)]
struct RawSample {
    dt_txt: String,
    main: MainReadings,
    #[serde(default)]
    weather: Vec<Condition>,
}

/// One 3-hour forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSample")]
pub struct ForecastSample {
    /// `YYYY-MM-DD HH:MM:SS` as sent by the provider
    pub timestamp: String,
    pub temperature: f64,
    pub description: String,
    pub icon: String,
}

impl TryFrom<RawSample> for ForecastSample {
    type Error = String;

    fn try_from(raw: RawSample) -> Result<Self, Self::Error> {
        let condition = raw
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| format!("forecast sample {} has no weather entry", raw.dt_txt))?;

        Ok(Self {
            timestamp: raw.dt_txt,
            temperature: raw.main.temp,
            description: condition.description,
            icon: condition.icon,
        })
    }
}

impl ForecastSample {
    #[must_use]
    pub fn new(timestamp: &str, temperature: f64, description: &str, icon: &str) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            temperature,
            description: description.to_string(),
            icon: icon.to_string(),
        }
    }

    /// Calendar date part of the timestamp (text before the first space)
    #[must_use]
    pub fn date_key(&self) -> &str {
        self.timestamp
            .split_once(' ')
            .map_or(self.timestamp.as_str(), |(date, _)| date)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastCity {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// 5-day / 3-hour forecast response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub cod: ProviderStatus,
    #[serde(default)]
    pub list: Vec<ForecastSample>,
    #[serde(default)]
    pub city: Option<ForecastCity>,
}
