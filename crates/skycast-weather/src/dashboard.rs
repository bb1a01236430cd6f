//! Search state machine and renderer hand-off.
//!
//! Every search takes a ticket from a monotonically increasing counter. When a
//! search finishes, its result is delivered only if no newer search has been
//! started in the meantime (last request wins).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::location::LocationSource;
use crate::resolver::WeatherResolver;
use crate::types::{
    ForecastSequence, GeoCoordinate, ResolutionError, WeatherReport, WeatherSnapshot,
};

/// Consumer of search results.
pub trait Renderer: Send + Sync {
    /// A search started; the previous panel should be hidden.
    fn on_searching(&self) {}

    fn on_snapshot(&self, snapshot: &WeatherSnapshot);

    fn on_forecast(&self, forecast: &ForecastSequence);

    fn on_error(&self, error: &ResolutionError);
}

/// Dashboard search state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Searching,
    Success,
    Error,
}

impl SearchState {
    /// State after a new search starts. Searches can start from any state.
    pub fn on_search_started(self) -> Self {
        SearchState::Searching
    }

    /// State after the latest search completes.
    pub fn on_search_done(self, succeeded: bool) -> Self {
        if succeeded {
            SearchState::Success
        } else {
            SearchState::Error
        }
    }
}

pub struct Dashboard {
    resolver: Arc<WeatherResolver>,
    renderer: Arc<dyn Renderer>,
    latest: AtomicU64,
    state: Mutex<SearchState>,
    delivery: Mutex<()>,
}

impl Dashboard {
    pub fn new(resolver: Arc<WeatherResolver>, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            resolver,
            renderer,
            latest: AtomicU64::new(0),
            state: Mutex::new(SearchState::Idle),
            delivery: Mutex::new(()),
        }
    }

    pub fn state(&self) -> SearchState {
        *self.state.lock()
    }

    /// Search by city name. Returns true if the result reached the renderer.
    pub async fn search_city(&self, raw_name: &str) -> bool {
        let ticket = self.begin();
        let result = self.resolver.resolve_by_city(raw_name).await;
        self.finish(ticket, result)
    }

    /// Load one literal location string without the fallback chain.
    pub async fn search_exact(&self, query: &str) -> bool {
        let ticket = self.begin();
        let result = self.resolver.resolve_exact(query).await;
        self.finish(ticket, result)
    }

    pub async fn search_coordinate(&self, coordinate: GeoCoordinate) -> bool {
        let ticket = self.begin();
        let result = self.resolver.resolve_by_coordinate(coordinate).await;
        self.finish(ticket, result)
    }

    pub async fn search_location(&self, source: &dyn LocationSource) -> bool {
        let ticket = self.begin();
        let result = self.resolver.resolve_by_location(source).await;
        self.finish(ticket, result)
    }

    fn begin(&self) -> u64 {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.lock();
            *state = state.on_search_started();
        }
        tracing::debug!("Search {} started", ticket);
        self.renderer.on_searching();
        ticket
    }

    fn finish(&self, ticket: u64, result: Result<WeatherReport, ResolutionError>) -> bool {
        // Held through delivery so an older result cannot be rendered after a newer one.
        let _delivery = self.delivery.lock();

        {
            let mut state = self.state.lock();
            let latest = self.latest.load(Ordering::SeqCst);
            if ticket != latest {
                tracing::debug!("Discarding stale search {} (latest is {})", ticket, latest);
                return false;
            }
            *state = state.on_search_done(result.is_ok());
        }

        // The state lock is released here; renderers may read `state()`.
        match result {
            Ok(report) => {
                self.renderer.on_snapshot(&report.snapshot);
                match &report.forecast {
                    Ok(forecast) => self.renderer.on_forecast(forecast),
                    Err(e) => tracing::warn!("Showing snapshot without forecast: {}", e),
                }
            }
            Err(error) => self.renderer.on_error(&error),
        }

        true
    }
}
