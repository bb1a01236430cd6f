//! OpenWeatherMap client.
//!
//! Every call returns a [`QueryOutcome`] instead of an error so the caller can
//! tell a soft miss (404) apart from a systemic failure.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use skycast_core::{NetworkError, ReqwestErrorExt, TemperatureUnit, WeatherConfig};
use tracing::instrument;

use crate::api::{ApiCurrentResponse, ApiErrorBody, ApiForecastResponse};
use crate::types::{ForecastSequence, GeoCoordinate, WeatherSnapshot};

/// Tagged result of a single provider query
#[derive(Debug)]
pub enum QueryOutcome<T> {
    /// The provider returned data
    Found(T),
    /// The provider has no data for this query (HTTP 404)
    NotFound,
    /// Anything else
    Failed(QueryFailure),
}

impl<T> QueryOutcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryOutcome<U> {
        match self {
            Self::Found(value) => QueryOutcome::Found(f(value)),
            Self::NotFound => QueryOutcome::NotFound,
            Self::Failed(failure) => QueryOutcome::Failed(failure),
        }
    }
}

/// Why a query failed
#[derive(Debug)]
pub enum QueryFailure {
    /// Non-404 error status (auth, quota, server fault)
    Status { status: u16, message: String },
    /// The request never produced a response
    Transport(NetworkError),
    /// 2xx response whose body did not decode
    InvalidBody(String),
}

impl std::fmt::Display for QueryFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { status, message } => write!(f, "status {}: {}", status, message),
            Self::Transport(e) => write!(f, "transport: {}", e),
            Self::InvalidBody(e) => write!(f, "invalid body: {}", e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    unit: TemperatureUnit,
}

impl WeatherProvider {
    pub fn new(config: &WeatherConfig) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ReqwestErrorExt::into_network_error)?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            unit: config.units,
        })
    }

    /// Current conditions for a free-text location ("Pune,IN").
    #[instrument(skip(self), level = "info")]
    pub async fn current_by_name(&self, query: &str) -> QueryOutcome<WeatherSnapshot> {
        let url = format!(
            "{}/weather?q={}&{}",
            self.base_url,
            urlencoding::encode(query),
            self.common_params()
        );

        self.get::<ApiCurrentResponse>(&url)
            .await
            .map(WeatherSnapshot::from)
    }

    /// Current conditions for a coordinate.
    #[instrument(skip(self), level = "info")]
    pub async fn current_by_coordinate(
        &self,
        coordinate: GeoCoordinate,
    ) -> QueryOutcome<WeatherSnapshot> {
        let url = format!(
            "{}/weather?lat={}&lon={}&{}",
            self.base_url,
            coordinate.latitude,
            coordinate.longitude,
            self.common_params()
        );

        self.get::<ApiCurrentResponse>(&url)
            .await
            .map(WeatherSnapshot::from)
    }

    /// 3-hourly forecast for a coordinate.
    #[instrument(skip(self), level = "info")]
    pub async fn forecast(&self, coordinate: GeoCoordinate) -> QueryOutcome<ForecastSequence> {
        let url = format!(
            "{}/forecast?lat={}&lon={}&{}",
            self.base_url,
            coordinate.latitude,
            coordinate.longitude,
            self.common_params()
        );

        self.get::<ApiForecastResponse>(&url)
            .await
            .map(ForecastSequence::from)
    }

    fn common_params(&self) -> String {
        format!(
            "appid={}&units={}",
            urlencoding::encode(&self.api_key),
            self.unit.as_query()
        )
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> QueryOutcome<T> {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                let error = e.into_network_error();
                tracing::debug!("Request failed before a response: {}", error);
                return QueryOutcome::Failed(QueryFailure::Transport(error));
            }
        };

        let status = response.status();
        tracing::debug!("Provider responded with {}", status);

        if status.is_success() {
            return match response.json::<T>().await {
                Ok(body) => QueryOutcome::Found(body),
                Err(e) if e.is_decode() => {
                    QueryOutcome::Failed(QueryFailure::InvalidBody(e.to_string()))
                }
                Err(e) => QueryOutcome::Failed(QueryFailure::Transport(e.into_network_error())),
            };
        }

        if status == StatusCode::NOT_FOUND {
            return QueryOutcome::NotFound;
        }

        let text = response.text().await.unwrap_or_default();
        QueryOutcome::Failed(QueryFailure::Status {
            status: status.as_u16(),
            message: error_message(status, &text),
        })
    }
}

/// Prefer the provider's own message over the bare status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        })
}
