use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Unit system sent to the weather API, derived from the temperature unit preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitSystem {
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value of the `units` query parameter.
    pub fn as_query_param(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_query_param())
    }
}

/// One successful current-weather lookup. Never persisted; rebuilt on every
/// refresh cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub country: String,
    /// Temperature in the unit system the lookup was issued with.
    pub temperature: f64,
    pub description: String,
    /// Provider icon id, e.g. "04d".
    pub icon: String,
    pub observed_at: DateTime<Utc>,
    pub timezone_offset_secs: i32,
}

/// Presentation-ready weather for one tracked city.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherViewModel {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub unit: UnitSystem,
    pub description: String,
    pub icon_url: String,
    /// Weekday and 12-hour wall-clock time at the observed location.
    pub local_time: String,
    /// Calendar date of the observation. Keeps the UTC calendar day; only the
    /// time of day is localized.
    pub local_date: String,
}

impl WeatherViewModel {
    pub fn from_snapshot(snapshot: &WeatherSnapshot, unit: UnitSystem) -> Self {
        Self {
            city: snapshot.city.clone(),
            country: snapshot.country.clone(),
            temperature: snapshot.temperature,
            unit,
            description: snapshot.description.clone(),
            icon_url: format!("http://openweathermap.org/img/wn/{}.png", snapshot.icon),
            local_time: local_time_string(snapshot.observed_at, snapshot.timezone_offset_secs),
            local_date: snapshot.observed_at.format("%B %-d, %Y").to_string(),
        }
    }
}

/// Applies the location's UTC offset to the observation instant and formats the
/// result as weekday + 12-hour time. An out-of-range offset falls back to UTC.
fn local_time_string(observed_at: DateTime<Utc>, offset_secs: i32) -> String {
    match FixedOffset::east_opt(offset_secs) {
        Some(tz) => observed_at.with_timezone(&tz).format("%A, %I:%M %p").to_string(),
        None => observed_at.format("%A, %I:%M %p").to_string(),
    }
}
