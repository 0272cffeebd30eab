//! Where "my location" comes from.
//!
//! A terminal has no platform position API, so the current position is
//! either configured up front or approximated from the public IP address.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{debug, instrument, warn};

use crate::{error::FetchError, model::Coordinates};

pub const DEFAULT_GEOLOCATION_URL: &str = "http://ip-api.com/json";

#[async_trait]
pub trait PositionSource: Send + Sync + Debug {
    /// Resolve the current position, or `FetchError::LocationDenied`.
    async fn current_position(&self) -> Result<Coordinates, FetchError>;
}

/// A position known ahead of time (CLI flags or the `[home]` config table).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPosition(Option<Coordinates>);

impl FixedPosition {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self(position)
    }
}

#[async_trait]
impl PositionSource for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates, FetchError> {
        self.0
            .ok_or_else(|| FetchError::location_denied("no position configured"))
    }
}

/// Approximate position from an ip-api.com compatible endpoint.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    url: String,
    http: Client,
}

impl IpGeolocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: Client::new(),
        }
    }

    async fn lookup(&self) -> Result<IpApiResponse, String> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = res.status();
        if !status.is_success() {
            return Err(format!("request failed with status {status}"));
        }

        res.json::<IpApiResponse>()
            .await
            .map_err(|e| format!("failed to parse response: {e}"))
    }
}

impl Default for IpGeolocator {
    fn default() -> Self {
        Self::new(DEFAULT_GEOLOCATION_URL)
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpApiResponse {
    fn into_coordinates(self) -> Result<Coordinates, String> {
        if self.status != "success" {
            return Err(self
                .message
                .unwrap_or_else(|| format!("status '{}'", self.status)));
        }

        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                Coordinates::new(lat, lon).map_err(|_| format!("position {lat}, {lon} is invalid"))
            }
            _ => Err("response carried no position".to_string()),
        }
    }
}

#[async_trait]
impl PositionSource for IpGeolocator {
    #[instrument(skip_all, fields(url = %self.url))]
    async fn current_position(&self) -> Result<Coordinates, FetchError> {
        let position = self
            .lookup()
            .await
            .and_then(IpApiResponse::into_coordinates)
            .map_err(|reason| {
                warn!(%reason, "IP geolocation failed");
                FetchError::location_denied(reason)
            })?;

        debug!(%position, "resolved position from IP address");
        Ok(position)
    }
}

/// Tries each source in order and returns the first position found.
#[derive(Debug, Default)]
pub struct FirstAvailable {
    sources: Vec<Box<dyn PositionSource>>,
}

impl FirstAvailable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl PositionSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }
}

#[async_trait]
impl PositionSource for FirstAvailable {
    async fn current_position(&self) -> Result<Coordinates, FetchError> {
        let mut last = FetchError::location_denied("no position source available");
        for source in &self.sources {
            match source.current_position().await {
                Ok(position) => return Ok(position),
                Err(err) => last = err,
            }
        }
        Err(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: serde_json::Value) -> IpApiResponse {
        serde_json::from_value(json).unwrap()
    }

    #[tokio::test]
    async fn fixed_position_without_value_is_denied() {
        let err = FixedPosition::default().current_position().await.unwrap_err();
        assert!(matches!(err, FetchError::LocationDenied { .. }));
    }

    #[tokio::test]
    async fn fixed_position_returns_value() {
        let home = Coordinates::new(1.5, 2.5).unwrap();
        let got = FixedPosition::new(Some(home)).current_position().await.unwrap();
        assert_eq!(got, home);
    }

    #[tokio::test]
    async fn first_available_falls_through_to_next_source() {
        let home = Coordinates::new(10.0, 20.0).unwrap();
        let sources = FirstAvailable::new()
            .with(FixedPosition::default())
            .with(FixedPosition::new(Some(home)));

        assert_eq!(sources.current_position().await.unwrap(), home);
    }

    #[tokio::test]
    async fn first_available_with_no_sources_is_denied() {
        let err = FirstAvailable::new().current_position().await.unwrap_err();
        assert_eq!(err.to_string(), "Location access denied.");
    }

    #[test]
    fn success_response_yields_coordinates() {
        let got = response(serde_json::json!({
            "status": "success", "lat": 48.1374, "lon": 11.5755, "city": "Munich"
        }))
        .into_coordinates()
        .unwrap();
        assert_eq!(got, Coordinates { lat: 48.1374, lon: 11.5755 });
    }

    #[test]
    fn fail_response_keeps_provider_message() {
        let err = response(serde_json::json!({ "status": "fail", "message": "reserved range" }))
            .into_coordinates()
            .unwrap_err();
        assert_eq!(err, "reserved range");
    }

    #[test]
    fn success_without_position_is_rejected() {
        let err = response(serde_json::json!({ "status": "success" }))
            .into_coordinates()
            .unwrap_err();
        assert!(err.contains("no position"));
    }
}
