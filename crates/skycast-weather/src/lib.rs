//! Weather resolution for SkyCast
//!
//! Resolves city names and coordinates to current conditions and a 3-hourly
//! forecast via the OpenWeatherMap API, and hands results to a renderer.

mod api;

pub mod aliases;
pub mod dashboard;
pub mod forecast;
pub mod location;
pub mod provider;
pub mod resolver;
pub mod types;

pub use types::*;
pub use dashboard::{Dashboard, Renderer, SearchState};
pub use forecast::{daily_forecast, hourly_forecast};
pub use location::{FixedLocation, IpLocationSource, LocationSource, UnavailableLocation};
pub use provider::{QueryFailure, QueryOutcome, WeatherProvider};
pub use resolver::{SearchPolicy, WeatherResolver};
