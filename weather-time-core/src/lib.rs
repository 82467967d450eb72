//! Core library for the Weather Time app.
//!
//! This crate defines:
//! - The persisted preference store and the typed settings on top of it
//! - The tracked-city registry and its persistence sync
//! - City search against a static catalog, with a live-lookup fallback
//! - The refresh coordinator that turns the city list into weather view models
//!
//! It is used by `weather-time-cli`, but can also back other front ends.

pub mod catalog;
pub mod model;
pub mod provider;
pub mod refresh;
pub mod registry;
pub mod resolver;
pub mod settings;
pub mod store;

pub use model::{UnitSystem, WeatherSnapshot, WeatherViewModel};
pub use provider::{LookupError, WeatherProvider, openweather::OpenWeatherClient};
pub use refresh::RefreshCoordinator;
pub use registry::{CityRegistry, RegistryError};
pub use resolver::{CityResolver, ResolveError};
pub use settings::{Settings, TemperatureUnit, TextSize};
pub use store::{MemoryStore, PreferenceStore, StoreError, TomlStore};
