//! Pure projections over a 3-hourly forecast.

use crate::types::ForecastPoint;

/// Entries per day at 3-hour spacing.
pub const POINTS_PER_DAY: usize = 8;

/// Days shown in the daily forecast.
pub const DAILY_LIMIT: usize = 5;

/// Entries shown in the hourly strip.
pub const HOURLY_LIMIT: usize = 8;

/// One point per day: every 8th entry (same time of day), at most five.
pub fn daily_forecast(points: &[ForecastPoint]) -> Vec<ForecastPoint> {
    points
        .iter()
        .step_by(POINTS_PER_DAY)
        .take(DAILY_LIMIT)
        .cloned()
        .collect()
}

/// The first eight entries, roughly the next 24 hours.
pub fn hourly_forecast(points: &[ForecastPoint]) -> Vec<ForecastPoint> {
    points.iter().take(HOURLY_LIMIT).cloned().collect()
}
