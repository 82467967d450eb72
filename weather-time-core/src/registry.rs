//! Ordered list of tracked cities, kept in sync with the preference store.
//!
//! Every mutation builds the next list as a fresh value, persists it as a full
//! overwrite of the `cities` entry, and only then swaps it in. A failed write
//! therefore leaves both the store and the in-memory state on the previous
//! committed list.

use crate::store::{PreferenceStore, StoreError};
use std::sync::Arc;
use thiserror::Error;

const CITIES_KEY: &str = "cities";

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("'{0}' is already in the city list")]
    DuplicateCity(String),

    #[error("index {index} is out of range for a list of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("failed to encode city list: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct CityRegistry {
    store: Arc<dyn PreferenceStore>,
    cities: Vec<String>,
}

impl CityRegistry {
    /// Loads the saved city list. An absent entry, an unreadable store, or a
    /// corrupt payload all start the session with an empty list.
    pub fn load(store: Arc<dyn PreferenceStore>) -> Self {
        let cities = match store.get(CITIES_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "saved city list is corrupt, starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "could not read saved city list, starting empty");
                Vec::new()
            }
        };

        Self { store, cities }
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Appends a city, rejecting exact (case-sensitive) duplicates. The updated
    /// list is persisted before the call returns.
    pub fn add(&mut self, city: &str) -> Result<(), RegistryError> {
        if self.cities.iter().any(|c| c == city) {
            return Err(RegistryError::DuplicateCity(city.to_string()));
        }

        let mut next = self.cities.clone();
        next.push(city.to_string());
        self.persist(&next)?;
        self.cities = next;

        Ok(())
    }

    /// Removes the city at `index`, returning it. The updated list is persisted
    /// before the call returns.
    pub fn remove(&mut self, index: usize) -> Result<String, RegistryError> {
        if index >= self.cities.len() {
            return Err(RegistryError::IndexOutOfRange { index, len: self.cities.len() });
        }

        let mut next = self.cities.clone();
        let removed = next.remove(index);
        self.persist(&next)?;
        self.cities = next;

        Ok(removed)
    }

    fn persist(&self, cities: &[String]) -> Result<(), RegistryError> {
        let payload = serde_json::to_string(cities)?;
        self.store.set(CITIES_KEY, &payload)?;
        Ok(())
    }
}
