//! Visitor country lookup for new leads.
//!
//! ERROR HANDLING
//! ==============
//! Lookup never fails the caller. Every failure is logged and collapses to a
//! human-readable label stored in place of the country name.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use axum::http::HeaderMap;

const DEFAULT_LOOKUP_URL: &str = "https://freeipapi.com/api/json/{ip}";
const LOOKUP_TIMEOUT_SECS: u64 = 5;

pub const INVALID_IP: &str = "Invalid IP";
pub const LOOKUP_ERROR: &str = "Lookup Error";
pub const DECODE_ERROR: &str = "Response Decode Error";
pub const UNKNOWN_COUNTRY: &str = "Unknown Country";

#[derive(Clone)]
pub struct GeoLocator {
    /// `None` disables network lookups.
    http: Option<reqwest::Client>,
    url_template: String,
}

impl GeoLocator {
    /// `GEO_LOOKUP_ENABLED` (default true) and `GEO_LOOKUP_URL` (with an
    /// `{ip}` placeholder).
    #[must_use]
    pub fn from_env() -> Self {
        let enabled = crate::env_bool("GEO_LOOKUP_ENABLED").unwrap_or(true);
        let url_template = std::env::var("GEO_LOOKUP_URL").unwrap_or_else(|_| DEFAULT_LOOKUP_URL.to_string());
        if !enabled {
            return Self::disabled();
        }

        match reqwest::Client::builder()
            .timeout(Duration::from_secs(LOOKUP_TIMEOUT_SECS))
            .build()
        {
            Ok(http) => Self { http: Some(http), url_template },
            Err(e) => {
                tracing::warn!(error = %e, "geo lookup client build failed; lookups disabled");
                Self::disabled()
            }
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self { http: None, url_template: DEFAULT_LOOKUP_URL.to_string() }
    }

    /// Resolve the visitor's country label from request headers and peer address.
    pub async fn country_for(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        let Some(ip) = client_ip(headers, peer) else {
            return INVALID_IP.to_string();
        };
        self.lookup(ip).await
    }

    pub async fn lookup(&self, ip: IpAddr) -> String {
        let Some(http) = &self.http else {
            return UNKNOWN_COUNTRY.to_string();
        };

        let url = self.url_template.replace("{ip}", &ip.to_string());
        let response = match http.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(%ip, error = %e, "geo lookup request failed");
                return LOOKUP_ERROR.to_string();
            }
        };

        let status = response.status().as_u16();
        if status != 200 {
            tracing::warn!(%ip, status, "geo lookup returned non-200");
            return format!("API Error ({status})");
        }

        match response.text().await {
            Ok(body) => parse_country(&body),
            Err(e) => {
                tracing::warn!(%ip, error = %e, "geo lookup body read failed");
                LOOKUP_ERROR.to_string()
            }
        }
    }
}

/// Pick the first non-empty of `X-Client-IP`, the first `X-Forwarded-For`
/// hop, then the socket peer. `None` if the chosen value is not an IP.
#[must_use]
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    if let Some(raw) = header_value(headers, "x-client-ip") {
        return raw.parse().ok();
    }
    if let Some(raw) = header_value(headers, "x-forwarded-for") {
        return raw.split(',').next().map(str::trim).and_then(|first| first.parse().ok());
    }
    peer.map(|addr| addr.ip())
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn parse_country(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct LookupBody {
        #[serde(rename = "countryName")]
        country_name: Option<String>,
    }

    match serde_json::from_str::<LookupBody>(body) {
        Ok(LookupBody { country_name: Some(name) }) if !name.trim().is_empty() => name.trim().to_string(),
        Ok(_) => UNKNOWN_COUNTRY.to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "geo lookup response decode failed");
            DECODE_ERROR.to_string()
        }
    }
}

#[cfg(test)]
#[path = "geo_test.rs"]
mod tests;
