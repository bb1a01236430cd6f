//! Wire types for the OpenWeatherMap `data/2.5` API.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::{ForecastPoint, ForecastSequence, GeoCoordinate, WeatherSnapshot};

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCoord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiCondition {
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiMain {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub temp_min: Option<f64>,
    #[serde(default)]
    pub temp_max: Option<f64>,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default)]
    pub humidity: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiWind {
    #[serde(default)]
    pub speed: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiClouds {
    #[serde(default)]
    pub all: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiSys {
    #[serde(default)]
    pub country: String,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

/// `GET /weather`
#[derive(Debug, Deserialize)]
pub(crate) struct ApiCurrentResponse {
    #[serde(default)]
    pub name: String,
    pub coord: ApiCoord,
    #[serde(default)]
    pub weather: Vec<ApiCondition>,
    pub main: ApiMain,
    #[serde(default)]
    pub wind: ApiWind,
    pub visibility: Option<f64>,
    #[serde(default)]
    pub clouds: ApiClouds,
    pub dt: i64,
    #[serde(default)]
    pub sys: ApiSys,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiForecastEntry {
    pub dt: i64,
    pub main: ApiMain,
    #[serde(default)]
    pub weather: Vec<ApiCondition>,
}

/// `GET /forecast`
#[derive(Debug, Deserialize)]
pub(crate) struct ApiForecastResponse {
    #[serde(default)]
    pub list: Vec<ApiForecastEntry>,
}

/// Error body, e.g. `{"cod": "404", "message": "city not found"}`
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: Option<String>,
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
}

fn primary_condition(weather: Vec<ApiCondition>) -> ApiCondition {
    weather.into_iter().next().unwrap_or_default()
}

impl From<ApiCurrentResponse> for WeatherSnapshot {
    fn from(api: ApiCurrentResponse) -> Self {
        let condition = primary_condition(api.weather);

        Self {
            location_name: api.name,
            country: api.sys.country,
            coordinate: GeoCoordinate::new(api.coord.lat, api.coord.lon),
            observed_at: timestamp(api.dt).unwrap_or_else(Utc::now),
            temperature: api.main.temp,
            feels_like: api.main.feels_like.unwrap_or(api.main.temp),
            humidity: api.main.humidity.round() as u8,
            pressure: api.main.pressure.round() as u32,
            wind_speed: api.wind.speed,
            visibility: api.visibility.map(|v| v.round() as u32),
            cloudiness: api.clouds.all.round() as u8,
            condition: condition.main,
            description: condition.description,
            sunrise: api.sys.sunrise.and_then(timestamp),
            sunset: api.sys.sunset.and_then(timestamp),
        }
    }
}

impl ApiForecastEntry {
    /// Entries with an unrepresentable timestamp are dropped.
    fn into_point(self) -> Option<ForecastPoint> {
        let time = timestamp(self.dt)?;
        let condition = primary_condition(self.weather);

        Some(ForecastPoint {
            time,
            temperature: self.main.temp,
            temp_min: self.main.temp_min.unwrap_or(self.main.temp),
            temp_max: self.main.temp_max.unwrap_or(self.main.temp),
            condition: condition.main,
            description: condition.description,
        })
    }
}

impl From<ApiForecastResponse> for ForecastSequence {
    fn from(api: ApiForecastResponse) -> Self {
        ForecastSequence::new(
            api.list
                .into_iter()
                .filter_map(ApiForecastEntry::into_point)
                .collect(),
        )
    }
}
