mod render;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use skycast_core::{AppError, Config};
use skycast_weather::location::source_from_config;
use skycast_weather::{Dashboard, GeoCoordinate, SearchState, WeatherResolver};

use crate::render::TerminalRenderer;

#[derive(Parser, Debug)]
#[command(name = "skycast", version)]
#[command(about = "Current weather and forecast in the terminal")]
struct Cli {
    /// City to look up, e.g. "New Delhi". Defaults to search.default_city.
    #[arg(conflicts_with_all = ["coords", "here"])]
    city: Vec<String>,

    /// Weather at a coordinate. Example: --coords 17.385 78.4867
    #[arg(
        long,
        num_args = 2,
        value_names = ["LAT", "LON"],
        allow_negative_numbers = true,
        conflicts_with = "here"
    )]
    coords: Option<Vec<f64>>,

    /// Weather at your current location
    #[arg(long)]
    here: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Target {
    City(String),
    Coordinates(GeoCoordinate),
    Here,
    DefaultCity,
}

impl Cli {
    fn target(&self) -> Target {
        if self.here {
            return Target::Here;
        }
        if let Some([latitude, longitude]) = self.coords.as_deref() {
            return Target::Coordinates(GeoCoordinate::new(*latitude, *longitude));
        }
        if self.city.is_empty() {
            Target::DefaultCity
        } else {
            Target::City(self.city.join(" "))
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Usage errors exit with status 2 before anything else starts.
    let target = Cli::parse().target();

    skycast_core::init()?;

    let config = match Config::load_validated() {
        Ok((config, _)) => config,
        Err(e) => {
            let err = AppError::from(e);
            tracing::error!("{}", err);
            eprintln!("{}", err.user_message());
            return Ok(ExitCode::FAILURE);
        }
    };

    let resolver = Arc::new(WeatherResolver::from_config(&config).map_err(AppError::from)?);
    let renderer = Arc::new(TerminalRenderer::new(
        std::io::stdout(),
        config.weather.units,
    ));
    let dashboard = Dashboard::new(resolver, renderer);

    tracing::info!("SkyCast started: {:?}", target);

    match target {
        Target::City(name) => dashboard.search_city(&name).await,
        Target::Coordinates(coordinate) => dashboard.search_coordinate(coordinate).await,
        Target::Here => {
            let source = source_from_config(&config.location);
            dashboard.search_location(source.as_ref()).await
        }
        Target::DefaultCity => dashboard.search_exact(&config.search.default_city).await,
    };

    Ok(match dashboard.state() {
        SearchState::Success => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}
