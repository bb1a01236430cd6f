//! Plain-text dashboard renderer.

use std::fmt::{Display, Write as _};
use std::io::Write;

use chrono::{DateTime, Local, TimeZone};
use parking_lot::Mutex;
use skycast_core::TemperatureUnit;
use skycast_weather::{ForecastSequence, Renderer, ResolutionError, WeatherSnapshot};

pub struct TerminalRenderer<W> {
    out: Mutex<W>,
    unit: TemperatureUnit,
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W, unit: TemperatureUnit) -> Self {
        Self {
            out: Mutex::new(out),
            unit,
        }
    }

    fn emit(&self, text: &str) {
        let mut out = self.out.lock();
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            tracing::warn!("Failed to write dashboard output: {}", e);
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn on_snapshot(&self, snapshot: &WeatherSnapshot) {
        self.emit(&snapshot_panel(
            snapshot,
            &snapshot.observed_at.with_timezone(&Local),
            self.unit,
        ));
    }

    fn on_forecast(&self, forecast: &ForecastSequence) {
        self.emit(&forecast_panel(forecast, &Local));
    }

    fn on_error(&self, error: &ResolutionError) {
        tracing::error!("{}", error);
        self.emit(&format!("{}\n", error.user_message()));
    }
}

/// Rounded temperature with a degree sign: "29°"
pub(crate) fn format_temp(value: f64) -> String {
    format!("{}°", value.round() as i64)
}

/// "Saturday, October 18, 2025"
pub(crate) fn format_long_date<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    time.format("%A, %B %-d, %Y").to_string()
}

/// "Sat, Oct 18"
pub(crate) fn format_day_label<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    time.format("%a, %b %-d").to_string()
}

/// "3 PM"
pub(crate) fn format_hour_label<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    time.format("%-I %p").to_string()
}

/// "6:31 AM"
pub(crate) fn format_clock<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    time.format("%-I:%M %p").to_string()
}

pub(crate) fn format_visibility(metres: Option<u32>) -> String {
    match metres {
        Some(m) => format!("{} km", (f64::from(m) / 1000.0).round() as i64),
        None => "N/A".to_string(),
    }
}

/// Provider wind speed is m/s except for imperial units, which use mph.
pub(crate) fn format_wind(speed: f64, unit: TemperatureUnit) -> String {
    match unit {
        TemperatureUnit::Imperial => format!("{} mph", speed.round() as i64),
        TemperatureUnit::Metric | TemperatureUnit::Standard => {
            format!("{} km/h", (speed * 3.6).round() as i64)
        }
    }
}

pub(crate) fn snapshot_panel<Tz: TimeZone>(
    snapshot: &WeatherSnapshot,
    local_time: &DateTime<Tz>,
    unit: TemperatureUnit,
) -> String
where
    Tz::Offset: Display,
{
    let mut panel = String::new();
    let _ = writeln!(panel, "{}", snapshot.display_name());
    let _ = writeln!(panel, "{}", format_long_date(local_time));
    let _ = writeln!(
        panel,
        "  {}  feels like {}  {}  [{}]",
        format_temp(snapshot.temperature),
        format_temp(snapshot.feels_like),
        snapshot.description,
        snapshot.icon().css_class()
    );
    let _ = writeln!(
        panel,
        "  Visibility {}   Humidity {}%   Wind {}",
        format_visibility(snapshot.visibility),
        snapshot.humidity,
        format_wind(snapshot.wind_speed, unit)
    );
    let _ = writeln!(
        panel,
        "  Pressure {} hPa   UV index N/A   Cloudiness {}%",
        snapshot.pressure, snapshot.cloudiness
    );
    if let (Some(sunrise), Some(sunset)) = (snapshot.sunrise, snapshot.sunset) {
        let tz = local_time.timezone();
        let _ = writeln!(
            panel,
            "  Sunrise {}   Sunset {}",
            format_clock(&sunrise.with_timezone(&tz)),
            format_clock(&sunset.with_timezone(&tz))
        );
    }
    panel
}

pub(crate) fn forecast_panel<Tz: TimeZone>(forecast: &ForecastSequence, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    let mut panel = String::new();

    let _ = writeln!(panel, "\n5-day forecast");
    for point in forecast.daily() {
        let _ = writeln!(
            panel,
            "  {:<12} {:>4} / {:<4} {}",
            format_day_label(&point.time.with_timezone(tz)),
            format_temp(point.temp_max),
            format_temp(point.temp_min),
            point.description
        );
    }

    let _ = writeln!(panel, "\nNext 24 hours");
    for point in forecast.hourly() {
        let _ = writeln!(
            panel,
            "  {:<6} {:>4}  [{}]",
            format_hour_label(&point.time.with_timezone(tz)),
            format_temp(point.temperature),
            point.icon().icon_name()
        );
    }

    panel
}
