//! Location Resolution Module
//!
//! Maps the caller's network address to a place name through an
//! IP-geolocation provider (ip-api.com compatible), falling back from city
//! to region to country.

use crate::config::GeolocationConfig;
use crate::error::{AppError, FetchError};
use crate::models::{ClientAddressSource, GeoLookup};
use axum::http::HeaderMap;
use reqwest::Client;
use std::net::{IpAddr, SocketAddr};
use tracing::{debug, info, instrument, warn};

/// Provider reported that it could not locate the address
pub const LOCATION_FAILED: &str = "Failed to determine location";
/// Provider answered but gave no city, region or country
pub const CITY_NOT_FOUND: &str = "City not found in geo data";

const UPSTREAM: &str = "geolocation";
const LOOKUP_FIELDS: &str = "status,message,country,regionName,city,query";

/// Place resolved for a caller
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    /// Address that was looked up
    pub address: String,
    /// Best available place name
    pub city: String,
}

/// HTTP client for the IP-geolocation provider
#[derive(Debug, Clone)]
pub struct GeolocationClient {
    client: Client,
    base_url: String,
}

impl GeolocationClient {
    pub fn new(config: &GeolocationConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("CityWeather/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up a place name for a network address.
    ///
    /// Every failure is logged here, once.
    #[instrument(skip(self))]
    pub async fn locate(&self, address: &str) -> Result<String, FetchError> {
        let geo = self
            .lookup(address)
            .await
            .inspect_err(|err| err.log(UPSTREAM))?;

        if geo.is_failure() {
            let err = FetchError::semantic(LOCATION_FAILED);
            warn!(
                upstream = UPSTREAM,
                kind = err.kind(),
                reason = geo.message.as_deref().unwrap_or("no reason given"),
                "{}",
                err.message()
            );
            return Err(err);
        }

        let city = geo
            .best_place_name()
            .ok_or_else(|| FetchError::semantic(CITY_NOT_FOUND))
            .inspect_err(|err| err.log(UPSTREAM))?;

        info!("Detected city '{}' for {}", city, address);
        Ok(city.to_string())
    }

    async fn lookup(&self, address: &str) -> Result<GeoLookup, FetchError> {
        let url = format!("{}/json/{}", self.base_url, urlencoding::encode(address));

        let response = self
            .client
            .get(&url)
            .query(&[("fields", LOOKUP_FIELDS)])
            .send()
            .await?;
        let body = response.bytes().await?;
        let geo: GeoLookup = serde_json::from_slice(&body)?;
        debug!("Geo data: {:?}", geo);
        Ok(geo)
    }
}

/// Service for resolving the caller's place from an incoming request
#[derive(Debug, Clone)]
pub struct LocationResolver {
    client: GeolocationClient,
    source: ClientAddressSource,
    override_address: Option<IpAddr>,
}

impl LocationResolver {
    pub fn new(config: &GeolocationConfig) -> Result<Self, AppError> {
        let override_address = config
            .override_ip()
            .map_err(|e| AppError::config(e.to_string()))?;

        Ok(Self {
            client: GeolocationClient::new(config)?,
            source: config.address_source,
            override_address,
        })
    }

    /// Resolve the caller's city from request headers and peer address
    pub async fn resolve_location(
        &self,
        headers: &HeaderMap,
        peer: SocketAddr,
    ) -> Result<ResolvedLocation, FetchError> {
        let address = self.client_address(headers, peer);
        info!("User IP: {}", address);

        let city = self.client.locate(&address).await?;
        Ok(ResolvedLocation { address, city })
    }

    /// Address to geolocate, according to the configured source.
    ///
    /// A configured override always wins. Header sources fall back to the
    /// peer address when the header is missing or blank.
    #[must_use]
    pub fn client_address(&self, headers: &HeaderMap, peer: SocketAddr) -> String {
        if let Some(address) = self.override_address {
            return address.to_string();
        }

        self.source
            .header_name()
            .and_then(|name| headers.get(name))
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map_or_else(|| peer.ip().to_string(), str::to_string)
    }
}
