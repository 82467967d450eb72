//! Two-tier resolution of free-text input into a tracked city.
//!
//! The static catalog is consulted first so common cities resolve without
//! network cost; names the catalog does not know are validated against the
//! live weather lookup before being accepted.

use crate::catalog;
use crate::model::UnitSystem;
use crate::provider::{LookupError, WeatherProvider};
use crate::registry::{CityRegistry, RegistryError};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("please enter a city name")]
    EmptyQuery,

    #[error("no city matches '{0}'")]
    NotFound(String),

    #[error("'{0}' is already in the city list")]
    AlreadyAdded(String),

    #[error("weather lookup failed: {0}")]
    Lookup(#[source] LookupError),

    #[error(transparent)]
    Registry(RegistryError),
}

#[derive(Debug)]
pub struct CityResolver {
    provider: Arc<dyn WeatherProvider>,
}

impl CityResolver {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Resolves `query` to a city identifier and adds it to the registry,
    /// returning the identifier that was added.
    ///
    /// Catalog matches resolve to `"<city>, <country>"`. Names missing from
    /// the catalog are accepted verbatim when a live lookup succeeds for them;
    /// a lookup that says the city does not exist yields
    /// [`ResolveError::NotFound`], while transport and decoding problems keep
    /// their own error kind.
    pub async fn resolve_and_add(
        &self,
        registry: &mut CityRegistry,
        query: &str,
    ) -> Result<String, ResolveError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResolveError::EmptyQuery);
        }

        let resolved = match catalog::find_city(query) {
            Some(entry) => entry,
            None => {
                match self.provider.current(query, UnitSystem::Metric).await {
                    Ok(_) => query.to_string(),
                    Err(err @ (LookupError::Transport(_) | LookupError::Parse(_))) => {
                        return Err(ResolveError::Lookup(err));
                    }
                    Err(_) => return Err(ResolveError::NotFound(query.to_string())),
                }
            }
        };

        match registry.add(&resolved) {
            Ok(()) => Ok(resolved),
            Err(RegistryError::DuplicateCity(city)) => Err(ResolveError::AlreadyAdded(city)),
            Err(other) => Err(ResolveError::Registry(other)),
        }
    }
}
