//! Device location sources.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use skycast_core::LocationConfig;

use crate::types::{GeoCoordinate, LocationError};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Something that can tell us where the user is.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn locate(&self) -> Result<GeoCoordinate, LocationError>;
}

/// A coordinate fixed in configuration.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub GeoCoordinate);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn locate(&self) -> Result<GeoCoordinate, LocationError> {
        Ok(self.0)
    }
}

/// Used when no geolocation method is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableLocation;

#[async_trait]
impl LocationSource for UnavailableLocation {
    async fn locate(&self) -> Result<GeoCoordinate, LocationError> {
        Err(LocationError::ServiceUnavailable)
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Approximate location from the public IP address (ip-api.com format).
#[derive(Debug, Clone)]
pub struct IpLocationSource {
    client: Arc<Client>,
    url: String,
}

impl IpLocationSource {
    pub fn new(url: impl Into<String>) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LocationError::Other(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            url: url.into(),
        })
    }
}

#[async_trait]
impl LocationSource for IpLocationSource {
    async fn locate(&self) -> Result<GeoCoordinate, LocationError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                LocationError::Timeout
            } else {
                LocationError::Other(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::debug!("IP lookup refused with status {}", status);
            return Err(LocationError::PermissionDenied);
        }
        if !status.is_success() {
            tracing::debug!("IP lookup returned status {}", status);
            return Err(LocationError::ServiceUnavailable);
        }

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Other(e.to_string()))?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => {
                let coordinate = GeoCoordinate::new(lat, lon);
                tracing::info!("Located via IP: {}", coordinate);
                Ok(coordinate)
            }
            _ => Err(LocationError::ServiceUnavailable),
        }
    }
}

/// Pick a location source from configuration: a fixed coordinate wins, then
/// IP lookup when enabled.
pub fn source_from_config(config: &LocationConfig) -> Box<dyn LocationSource> {
    if let Some((lat, lon)) = config.fixed_coordinate() {
        return Box::new(FixedLocation(GeoCoordinate::new(lat, lon)));
    }

    if config.ip_lookup {
        match IpLocationSource::new(config.ip_lookup_url.clone()) {
            Ok(source) => return Box::new(source),
            Err(e) => tracing::warn!("IP location lookup disabled: {}", e),
        }
    }

    Box::new(UnavailableLocation)
}
