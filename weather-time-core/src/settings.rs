//! Typed display preferences on top of the raw preference store.
//!
//! Reads are forgiving: a missing or unparseable stored value falls back to the
//! default so a damaged preference file never blocks startup.

use crate::model::UnitSystem;
use crate::store::{PreferenceStore, StoreError};
use std::sync::Arc;

const TEMPERATURE_UNIT_KEY: &str = "temperatureUnit";
const TEXT_SIZE_KEY: &str = "textSize";
const SOUND_EFFECTS_KEY: &str = "soundEffects";
const BRIGHTNESS_KEY: &str = "brightness";
const API_KEY_KEY: &str = "apiKey";

const DEFAULT_BRIGHTNESS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "Celsius",
            TemperatureUnit::Fahrenheit => "Fahrenheit",
        }
    }

    /// Fixed mapping onto the API unit system.
    pub fn unit_system(&self) -> UnitSystem {
        match self {
            TemperatureUnit::Celsius => UnitSystem::Metric,
            TemperatureUnit::Fahrenheit => UnitSystem::Imperial,
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TemperatureUnit {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "celsius" => Ok(TemperatureUnit::Celsius),
            "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown temperature unit '{value}'. Supported units: celsius, fahrenheit."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextSize {
    #[default]
    Normal,
    Large,
    ExtraLarge,
}

impl TextSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextSize::Normal => "Normal",
            TextSize::Large => "Large",
            TextSize::ExtraLarge => "Extra Large",
        }
    }

    /// Font size in points for the presentation layer.
    pub fn point_size(&self) -> u32 {
        match self {
            TextSize::Normal => 16,
            TextSize::Large => 18,
            TextSize::ExtraLarge => 20,
        }
    }
}

impl std::fmt::Display for TextSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TextSize {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "normal" => Ok(TextSize::Normal),
            "large" => Ok(TextSize::Large),
            "extra large" | "extra-large" => Ok(TextSize::ExtraLarge),
            _ => Err(anyhow::anyhow!(
                "Unknown text size '{value}'. Supported sizes: normal, large, extra large."
            )),
        }
    }
}

/// Typed accessors for all user preferences.
pub struct Settings {
    store: Arc<dyn PreferenceStore>,
}

impl Settings {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    pub fn temperature_unit(&self) -> TemperatureUnit {
        match self.store.get(TEMPERATURE_UNIT_KEY) {
            Ok(Some(raw)) => TemperatureUnit::try_from(raw.as_str()).unwrap_or_default(),
            _ => TemperatureUnit::default(),
        }
    }

    pub fn set_temperature_unit(&self, unit: TemperatureUnit) -> Result<(), StoreError> {
        self.store.set(TEMPERATURE_UNIT_KEY, unit.as_str())
    }

    pub fn text_size(&self) -> TextSize {
        match self.store.get(TEXT_SIZE_KEY) {
            Ok(Some(raw)) => TextSize::try_from(raw.as_str()).unwrap_or_default(),
            _ => TextSize::default(),
        }
    }

    pub fn set_text_size(&self, size: TextSize) -> Result<(), StoreError> {
        self.store.set(TEXT_SIZE_KEY, size.as_str())
    }

    pub fn sound_effects(&self) -> bool {
        match self.store.get(SOUND_EFFECTS_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or(true),
            _ => true,
        }
    }

    pub fn set_sound_effects(&self, on: bool) -> Result<(), StoreError> {
        self.store.set(SOUND_EFFECTS_KEY, if on { "true" } else { "false" })
    }

    /// Screen brightness in `0.0..=1.0`.
    pub fn brightness(&self) -> f64 {
        match self.store.get(BRIGHTNESS_KEY) {
            Ok(Some(raw)) => {
                raw.parse().map(|v: f64| v.clamp(0.0, 1.0)).unwrap_or(DEFAULT_BRIGHTNESS)
            }
            _ => DEFAULT_BRIGHTNESS,
        }
    }

    /// Stores the brightness, clamped into `0.0..=1.0`.
    pub fn set_brightness(&self, value: f64) -> Result<f64, StoreError> {
        let clamped = value.clamp(0.0, 1.0);
        self.store.set(BRIGHTNESS_KEY, &clamped.to_string())?;
        Ok(clamped)
    }

    pub fn api_key(&self) -> Option<String> {
        self.store.get(API_KEY_KEY).ok().flatten()
    }

    pub fn set_api_key(&self, key: &str) -> Result<(), StoreError> {
        self.store.set(API_KEY_KEY, key)
    }

    /// Restores the default temperature unit and text size. Sound and brightness
    /// are left untouched.
    pub fn reset(&self) -> Result<(), StoreError> {
        self.set_temperature_unit(TemperatureUnit::default())?;
        self.set_text_size(TextSize::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn settings() -> Settings {
        Settings::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn defaults_when_nothing_is_stored() {
        let settings = settings();

        assert_eq!(settings.temperature_unit(), TemperatureUnit::Celsius);
        assert_eq!(settings.text_size(), TextSize::Normal);
        assert!(settings.sound_effects());
        assert_eq!(settings.brightness(), DEFAULT_BRIGHTNESS);
        assert!(settings.api_key().is_none());
    }

    #[test]
    fn unit_maps_onto_the_api_unit_system() {
        assert_eq!(TemperatureUnit::Celsius.unit_system(), UnitSystem::Metric);
        assert_eq!(TemperatureUnit::Fahrenheit.unit_system(), UnitSystem::Imperial);
    }

    #[test]
    fn set_then_get_roundtrips() {
        let settings = settings();

        settings.set_temperature_unit(TemperatureUnit::Fahrenheit).expect("set unit");
        settings.set_text_size(TextSize::ExtraLarge).expect("set size");
        settings.set_sound_effects(false).expect("set sound");
        settings.set_api_key("KEY").expect("set key");

        assert_eq!(settings.temperature_unit(), TemperatureUnit::Fahrenheit);
        assert_eq!(settings.text_size(), TextSize::ExtraLarge);
        assert!(!settings.sound_effects());
        assert_eq!(settings.api_key().as_deref(), Some("KEY"));
    }

    #[test]
    fn unparseable_stored_values_fall_back_to_defaults() {
        let store = Arc::new(MemoryStore::new());
        store.set("temperatureUnit", "Kelvin").expect("set");
        store.set("textSize", "Gigantic").expect("set");
        store.set("soundEffects", "maybe").expect("set");
        store.set("brightness", "bright").expect("set");

        let settings = Settings::new(store);

        assert_eq!(settings.temperature_unit(), TemperatureUnit::Celsius);
        assert_eq!(settings.text_size(), TextSize::Normal);
        assert!(settings.sound_effects());
        assert_eq!(settings.brightness(), DEFAULT_BRIGHTNESS);
    }

    #[test]
    fn brightness_is_clamped_on_write_and_read() {
        let settings = settings();

        assert_eq!(settings.set_brightness(1.7).expect("set"), 1.0);
        assert_eq!(settings.brightness(), 1.0);

        assert_eq!(settings.set_brightness(-0.3).expect("set"), 0.0);
        assert_eq!(settings.brightness(), 0.0);
    }

    #[test]
    fn reset_restores_unit_and_text_size_only() {
        let settings = settings();

        settings.set_temperature_unit(TemperatureUnit::Fahrenheit).expect("set unit");
        settings.set_text_size(TextSize::Large).expect("set size");
        settings.set_sound_effects(false).expect("set sound");

        settings.reset().expect("reset");

        assert_eq!(settings.temperature_unit(), TemperatureUnit::Celsius);
        assert_eq!(settings.text_size(), TextSize::Normal);
        assert!(!settings.sound_effects());
    }

    #[test]
    fn text_size_point_sizes() {
        assert_eq!(TextSize::Normal.point_size(), 16);
        assert_eq!(TextSize::Large.point_size(), 18);
        assert_eq!(TextSize::ExtraLarge.point_size(), 20);
    }
}
