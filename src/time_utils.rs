use crate::domain::market_data::Period;
use chrono::{DateTime, Utc};

/// Format an axis or tooltip time label for the selected period (UTC).
///
/// - intraday periods (`1D`, `5D`) -> `HH:MM`
/// - up to one year -> `Mon DD`
/// - longer periods -> `Mon YYYY`
pub fn format_time_label(timestamp_ms: i64, period: Period) -> String {
    let Some(time) = DateTime::<Utc>::from_timestamp_millis(timestamp_ms) else {
        return String::new();
    };
    match period {
        Period::OneDay | Period::FiveDays => time.format("%H:%M").to_string(),
        Period::FiveYears | Period::Max => time.format("%b %Y").to_string(),
        _ => time.format("%b %d").to_string(),
    }
}

/// Full date and time for the tooltip header.
pub fn format_tooltip_time(timestamp_ms: i64, period: Period) -> String {
    let Some(time) = DateTime::<Utc>::from_timestamp_millis(timestamp_ms) else {
        return String::new();
    };
    if period.is_intraday() {
        time.format("%b %d, %H:%M").to_string()
    } else {
        time.format("%b %d, %Y").to_string()
    }
}
