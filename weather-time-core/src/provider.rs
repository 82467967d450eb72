use crate::model::{UnitSystem, WeatherSnapshot};
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

pub mod openweather;

/// Why a lookup produced no snapshot. Unknown-name failures and transport
/// problems are kept apart so callers can tell "no such city" from "the
/// service was unreachable".
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("city not found")]
    NotFound,

    #[error("weather service returned status {code}")]
    Status { code: u16 },

    #[error("failed to reach the weather service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not decode the weather service response: {0}")]
    Parse(#[from] serde_json::Error),
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current weather for `city` in the requested unit system.
    async fn current(&self, city: &str, unit: UnitSystem) -> Result<WeatherSnapshot, LookupError>;
}
