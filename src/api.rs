//! Request handlers
//!
//! Three pages: the manual city form (`/`), auto-location (`/location`) and
//! the static info page (`/info`). Every upstream failure is turned into a
//! rendered page with a short, action-oriented message; details only go to
//! the logs.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Form, Router,
    extract::{ConnectInfo, State},
    http::HeaderMap,
    response::Html,
    routing::get,
};
use serde::Deserialize;
use tracing::info;

use crate::config::AppConfig;
use crate::error::{AppError, FetchError};
use crate::location_resolver::LocationResolver;
use crate::models::DailyForecast;
use crate::views::{self, WeatherView};
use crate::weather::{CityWeather, WeatherClient};

/// Shown when a typed city cannot be looked up, whatever the cause
pub const MANUAL_LOOKUP_FAILED: &str = "Unable to retrieve weather data. Please try again.";
pub const LOCATION_WEATHER_FAILED: &str =
    "Unable to retrieve weather data for your location. Please enter a city manually.";
pub const GEOLOCATION_SERVICE_ERROR: &str =
    "There was an error with the geolocation service. Please enter a city manually.";
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again.";

/// Process-wide, read-only state shared by all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub weather: WeatherClient,
    pub locator: LocationResolver,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Ok(Self {
            weather: WeatherClient::new(&config.weather)?,
            locator: LocationResolver::new(&config.geolocation)?,
        })
    }
}

pub type SharedState = Arc<AppState>;

/// Submitted city form. A missing field counts as an empty city name.
#[derive(Debug, Deserialize)]
pub struct CityForm {
    #[serde(default)]
    pub city: String,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index).post(manual_lookup))
        .route("/location", get(location_lookup))
        .route("/info", get(info_page))
        .with_state(state)
}

async fn index() -> Html<String> {
    Html(views::index_page(None))
}

async fn info_page() -> Html<String> {
    Html(views::info_page())
}

async fn manual_lookup(
    State(state): State<SharedState>,
    Form(form): Form<CityForm>,
) -> Html<String> {
    let city = form.city;
    match state.weather.get_weather_data(&city).await {
        Ok(data) => render_weather(&city, &data),
        // Not-found and network trouble get the same message here
        Err(_) => Html(views::index_page(Some(MANUAL_LOOKUP_FAILED))),
    }
}

async fn location_lookup(
    State(state): State<SharedState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Html<String> {
    let location = match state.locator.resolve_location(&headers, peer).await {
        Ok(location) => location,
        Err(err) => return Html(views::index_page(Some(&geolocation_failure_message(&err)))),
    };

    info!("Detected City: {}", location.city);
    match state.weather.get_weather_data(&location.city).await {
        Ok(data) => render_weather(&location.city, &data),
        Err(_) => Html(views::index_page(Some(LOCATION_WEATHER_FAILED))),
    }
}

fn render_weather(city: &str, data: &CityWeather) -> Html<String> {
    let forecast = DailyForecast::from_samples(&data.samples);
    Html(views::weather_page(&WeatherView {
        city,
        current: &data.current,
        forecast: &forecast,
    }))
}

/// User-facing text for a failed geolocation
#[must_use]
pub fn geolocation_failure_message(err: &FetchError) -> String {
    match err {
        FetchError::Transport { .. } => GEOLOCATION_SERVICE_ERROR.to_string(),
        FetchError::Semantic { message } => message.clone(),
        FetchError::Unexpected { .. } => UNEXPECTED_ERROR.to_string(),
    }
}
