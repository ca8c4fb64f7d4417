//! IP geolocation payload and caller address source

use serde::{Deserialize, Serialize};

/// Response of the IP-to-location provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoLookup {
    /// `"success"` or `"fail"`
    #[serde(default)]
    pub status: Option<String>,
    /// Failure reason, e.g. `"reserved range"`
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, rename = "regionName")]
    pub region_name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl GeoLookup {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status.as_deref() == Some("fail")
    }

    /// Best place name: city, else region, else country. Blank values are skipped.
    #[must_use]
    pub fn best_place_name(&self) -> Option<&str> {
        [&self.city, &self.region_name, &self.country]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .map(str::trim)
            .find(|name| !name.is_empty())
    }
}

/// Where the caller's network address is taken from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientAddressSource {
    /// Remote peer of the TCP connection
    #[default]
    Peer,
    /// First entry of `X-Forwarded-For`, for deployments behind a proxy
    XForwardedFor,
    /// `X-Real-IP`, as set by nginx
    XRealIp,
}

impl ClientAddressSource {
    #[must_use]
    pub fn header_name(self) -> Option<&'static str> {
        match self {
            ClientAddressSource::Peer => None,
            ClientAddressSource::XForwardedFor => Some("x-forwarded-for"),
            ClientAddressSource::XRealIp => Some("x-real-ip"),
        }
    }
}
