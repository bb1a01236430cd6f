use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skycast_core::NetworkError;

use crate::forecast;

/// Icon shown for a provider condition category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IconKey {
    #[default]
    Sun,
    Cloud,
    CloudRain,
    CloudDrizzle,
    Bolt,
    Snowflake,
    Smog,
}

impl IconKey {
    /// Map a provider condition category (`weather[0].main`) to an icon.
    /// Unknown categories fall back to the clear-sky icon.
    pub fn from_condition(condition_main: &str) -> Self {
        match condition_main {
            "Clear" => Self::Sun,
            "Clouds" => Self::Cloud,
            "Rain" => Self::CloudRain,
            "Drizzle" => Self::CloudDrizzle,
            "Thunderstorm" => Self::Bolt,
            "Snow" => Self::Snowflake,
            "Mist" | "Fog" | "Haze" => Self::Smog,
            _ => Self::Sun,
        }
    }

    /// Icon font class for the dashboard
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Sun => "fas fa-sun",
            Self::Cloud => "fas fa-cloud",
            Self::CloudRain => "fas fa-cloud-rain",
            Self::CloudDrizzle => "fas fa-cloud-drizzle",
            Self::Bolt => "fas fa-bolt",
            Self::Snowflake => "fas fa-snowflake",
            Self::Smog => "fas fa-smog",
        }
    }

    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Sun => "sun",
            Self::Cloud => "cloud",
            Self::CloudRain => "cloud_rain",
            Self::CloudDrizzle => "cloud_drizzle",
            Self::Bolt => "bolt",
            Self::Snowflake => "snowflake",
            Self::Smog => "smog",
        }
    }
}

/// Map a provider condition category to an icon key.
pub fn icon_category(condition_main: &str) -> IconKey {
    IconKey::from_condition(condition_main)
}

/// Geographic coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both halves are finite and within the valid ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Normalized current conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub country: String,
    pub coordinate: GeoCoordinate,
    pub observed_at: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    /// hPa
    pub pressure: u32,
    /// m/s for metric/standard units, mph for imperial
    pub wind_speed: f64,
    /// Metres; the provider omits it for some stations
    pub visibility: Option<u32>,
    pub cloudiness: u8,
    /// Provider condition category, e.g. "Clouds"
    pub condition: String,
    pub description: String,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
}

impl WeatherSnapshot {
    pub fn icon(&self) -> IconKey {
        icon_category(&self.condition)
    }

    /// "Hyderabad, IN"
    pub fn display_name(&self) -> String {
        if self.country.is_empty() {
            self.location_name.clone()
        } else {
            format!("{}, {}", self.location_name, self.country)
        }
    }
}

/// One 3-hourly forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub condition: String,
    pub description: String,
}

impl ForecastPoint {
    pub fn icon(&self) -> IconKey {
        icon_category(&self.condition)
    }
}

/// Ordered forecast entries at the provider's 3-hour granularity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSequence {
    points: Vec<ForecastPoint>,
}

impl ForecastSequence {
    pub fn new(points: Vec<ForecastPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// One entry per day, at most five
    pub fn daily(&self) -> Vec<ForecastPoint> {
        forecast::daily_forecast(&self.points)
    }

    /// The next eight entries (~24 hours)
    pub fn hourly(&self) -> Vec<ForecastPoint> {
        forecast::hourly_forecast(&self.points)
    }
}

/// Result of one successful search
#[derive(Debug)]
pub struct WeatherReport {
    pub snapshot: WeatherSnapshot,
    /// Always `ResolutionError::ForecastUnavailable` on the error side
    pub forecast: Result<ForecastSequence, ResolutionError>,
}

impl WeatherReport {
    pub fn has_forecast(&self) -> bool {
        self.forecast.is_ok()
    }
}

/// Location service errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// What was wrong with the search input
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputProblem {
    #[error("city name is empty")]
    BlankCity,
    #[error("coordinate out of range: {0}")]
    CoordinateOutOfRange(GeoCoordinate),
}

/// Why a search did not produce a snapshot
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("Invalid input: {0}")]
    InvalidInput(InputProblem),

    #[error("City \"{query}\" not found")]
    CityNotFound {
        query: String,
        suggestions: Vec<String>,
    },

    #[error("Provider error {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Location unavailable: {0}")]
    LocationUnavailable(#[from] LocationError),

    #[error("Forecast unavailable: {0}")]
    ForecastUnavailable(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ResolutionError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(InputProblem::BlankCity) => "Please enter a city name".to_string(),
            Self::InvalidInput(InputProblem::CoordinateOutOfRange(_)) => {
                "Invalid coordinates. Latitude must be between -90 and 90, longitude between -180 and 180"
                    .to_string()
            }
            Self::CityNotFound { query, suggestions } => {
                if suggestions.is_empty() {
                    format!("City \"{}\" not found.", query)
                } else {
                    format!(
                        "City \"{}\" not found. Try: {}",
                        query,
                        join_suggestions(suggestions)
                    )
                }
            }
            Self::Provider { status, .. } => format!("API Error: {}", status),
            Self::Network(_) => "Network error. Please check your connection.".to_string(),
            Self::LocationUnavailable(LocationError::ServiceUnavailable) => {
                "Geolocation not supported".to_string()
            }
            Self::LocationUnavailable(_) => "Unable to access your location".to_string(),
            Self::ForecastUnavailable(_) => "Forecast is not available right now".to_string(),
            Self::InvalidResponse(_) => {
                "Received an unexpected response from the weather service".to_string()
            }
        }
    }
}

/// "Mumbai, Delhi, or Pune"
fn join_suggestions(suggestions: &[String]) -> String {
    match suggestions {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{} or {}", first, second),
        [init @ .., last] => format!("{}, or {}", init.join(", "), last),
    }
}
