//! City and coordinate resolution.
//!
//! A city search walks an ordered fallback chain of candidate names. A 404 or a
//! transport failure moves on to the next candidate; any other provider error
//! ends the search. The forecast is fetched once a snapshot exists and its
//! failure never invalidates that snapshot.

use skycast_core::{Config, NetworkError, SearchConfig};
use tracing::instrument;

use crate::aliases::search_candidates;
use crate::location::LocationSource;
use crate::provider::{QueryFailure, QueryOutcome, WeatherProvider};
use crate::types::{
    ForecastSequence, GeoCoordinate, InputProblem, ResolutionError, WeatherReport,
    WeatherSnapshot,
};

/// What the fallback loop does with one candidate's outcome
#[derive(Debug)]
pub(crate) enum CandidateStep {
    Accept(WeatherSnapshot),
    Continue,
    Abort(ResolutionError),
}

/// Decide the next step of the fallback chain from a query outcome.
pub(crate) fn candidate_step(outcome: QueryOutcome<WeatherSnapshot>) -> CandidateStep {
    match outcome {
        QueryOutcome::Found(snapshot) => CandidateStep::Accept(snapshot),
        QueryOutcome::NotFound => CandidateStep::Continue,
        QueryOutcome::Failed(QueryFailure::Transport(_)) => CandidateStep::Continue,
        QueryOutcome::Failed(QueryFailure::Status { status, message }) => {
            CandidateStep::Abort(ResolutionError::Provider { status, message })
        }
        QueryOutcome::Failed(QueryFailure::InvalidBody(reason)) => {
            CandidateStep::Abort(ResolutionError::InvalidResponse(reason))
        }
    }
}

/// Map a single-shot query outcome to a result. `not_found` supplies the error
/// for a 404.
fn single_outcome(
    outcome: QueryOutcome<WeatherSnapshot>,
    not_found: impl FnOnce() -> ResolutionError,
) -> Result<WeatherSnapshot, ResolutionError> {
    match outcome {
        QueryOutcome::Found(snapshot) => Ok(snapshot),
        QueryOutcome::NotFound => Err(not_found()),
        QueryOutcome::Failed(QueryFailure::Transport(e)) => Err(ResolutionError::Network(e)),
        QueryOutcome::Failed(QueryFailure::Status { status, message }) => {
            Err(ResolutionError::Provider { status, message })
        }
        QueryOutcome::Failed(QueryFailure::InvalidBody(reason)) => {
            Err(ResolutionError::InvalidResponse(reason))
        }
    }
}

/// Search behaviour that is not part of the static alias table
#[derive(Debug, Clone)]
pub struct SearchPolicy {
    pub fallback_suffixes: Vec<String>,
    pub suggestions: Vec<String>,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for SearchPolicy {
    fn from(config: &SearchConfig) -> Self {
        Self {
            fallback_suffixes: config.fallback_suffixes.clone(),
            suggestions: config.suggestions.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherResolver {
    provider: WeatherProvider,
    policy: SearchPolicy,
}

impl WeatherResolver {
    pub fn new(provider: WeatherProvider, policy: SearchPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn from_config(config: &Config) -> Result<Self, NetworkError> {
        let provider = WeatherProvider::new(&config.weather)?;
        Ok(Self::new(provider, SearchPolicy::from(&config.search)))
    }

    /// The fallback chain that a search for `raw_name` would walk.
    pub fn candidates(&self, raw_name: &str) -> Vec<String> {
        search_candidates(raw_name, &self.policy.fallback_suffixes)
    }

    /// Resolve a user-typed city name, trying each candidate in order until
    /// one is found.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for blank input, `Provider` or `InvalidResponse` as soon
    /// as a candidate fails for a reason other than 404 or transport, and
    /// `CityNotFound` once every candidate has been tried.
    #[instrument(skip(self), level = "info")]
    pub async fn resolve_by_city(&self, raw_name: &str) -> Result<WeatherReport, ResolutionError> {
        let name = raw_name.trim();
        if name.is_empty() {
            return Err(ResolutionError::InvalidInput(InputProblem::BlankCity));
        }

        let candidates = self.candidates(name);
        tracing::info!("Searching {} candidates for {:?}", candidates.len(), name);

        for (attempt, candidate) in candidates.iter().enumerate() {
            tracing::debug!("Attempt {}: {}", attempt + 1, candidate);

            let outcome = self.provider.current_by_name(candidate).await;
            if let QueryOutcome::Failed(QueryFailure::Transport(e)) = &outcome {
                tracing::warn!("Network error for {}: {}", candidate, e);
            }

            match candidate_step(outcome) {
                CandidateStep::Accept(snapshot) => {
                    tracing::info!(
                        "Found {}, {} via {:?}",
                        snapshot.location_name,
                        snapshot.country,
                        candidate
                    );
                    let coordinate = snapshot.coordinate;
                    return Ok(self.with_forecast(snapshot, coordinate).await);
                }
                CandidateStep::Continue => {
                    tracing::debug!("No data for {}, trying next candidate", candidate);
                }
                CandidateStep::Abort(error) => {
                    tracing::error!("Search for {:?} aborted on {}: {}", name, candidate, error);
                    return Err(error);
                }
            }
        }

        tracing::warn!("No candidate matched {:?}", name);
        Err(ResolutionError::CityNotFound {
            query: name.to_string(),
            suggestions: self.policy.suggestions.clone(),
        })
    }

    /// Resolve a coordinate. There is no alternative phrasing to fall back
    /// on, so every failure of the current-conditions query is terminal.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an out-of-range coordinate, otherwise `Network`,
    /// `Provider` or `InvalidResponse`.
    #[instrument(skip(self), level = "info")]
    pub async fn resolve_by_coordinate(
        &self,
        coordinate: GeoCoordinate,
    ) -> Result<WeatherReport, ResolutionError> {
        if !coordinate.is_valid() {
            return Err(ResolutionError::InvalidInput(
                InputProblem::CoordinateOutOfRange(coordinate),
            ));
        }

        let outcome = self.provider.current_by_coordinate(coordinate).await;
        let snapshot = single_outcome(outcome, || ResolutionError::Provider {
            status: 404,
            message: format!("no weather data for {}", coordinate),
        })?;

        tracing::info!("Location weather: {}", snapshot.location_name);
        Ok(self.with_forecast(snapshot, coordinate).await)
    }

    /// Query one literal location string with no fallback chain.
    ///
    /// # Errors
    ///
    /// `CityNotFound` on 404; `Network`, `Provider` or `InvalidResponse`
    /// otherwise.
    #[instrument(skip(self), level = "info")]
    pub async fn resolve_exact(&self, query: &str) -> Result<WeatherReport, ResolutionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResolutionError::InvalidInput(InputProblem::BlankCity));
        }

        let outcome = self.provider.current_by_name(query).await;
        let snapshot = single_outcome(outcome, || ResolutionError::CityNotFound {
            query: query.to_string(),
            suggestions: self.policy.suggestions.clone(),
        })?;

        let coordinate = snapshot.coordinate;
        Ok(self.with_forecast(snapshot, coordinate).await)
    }

    /// Ask `source` where the user is, then resolve that coordinate.
    ///
    /// # Errors
    ///
    /// `LocationUnavailable` when the source fails, otherwise as
    /// [`resolve_by_coordinate`](Self::resolve_by_coordinate).
    pub async fn resolve_by_location(
        &self,
        source: &dyn LocationSource,
    ) -> Result<WeatherReport, ResolutionError> {
        let coordinate = source.locate().await.map_err(|e| {
            tracing::warn!("Unable to access location: {}", e);
            ResolutionError::LocationUnavailable(e)
        })?;

        self.resolve_by_coordinate(coordinate).await
    }

    async fn with_forecast(
        &self,
        snapshot: WeatherSnapshot,
        coordinate: GeoCoordinate,
    ) -> WeatherReport {
        let forecast = self.load_forecast(coordinate).await;
        WeatherReport { snapshot, forecast }
    }

    async fn load_forecast(
        &self,
        coordinate: GeoCoordinate,
    ) -> Result<ForecastSequence, ResolutionError> {
        match self.provider.forecast(coordinate).await {
            QueryOutcome::Found(sequence) => {
                tracing::info!("Forecast loaded ({} entries)", sequence.len());
                Ok(sequence)
            }
            QueryOutcome::NotFound => {
                tracing::warn!("Forecast error: no forecast for {}", coordinate);
                Err(ResolutionError::ForecastUnavailable(
                    "no forecast for this location".to_string(),
                ))
            }
            QueryOutcome::Failed(failure) => {
                tracing::warn!("Forecast error: {}", failure);
                Err(ResolutionError::ForecastUnavailable(failure.to_string()))
            }
        }
    }
}
