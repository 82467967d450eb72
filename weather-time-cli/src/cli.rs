use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use weather_time_core::{
    CityRegistry, CityResolver, OpenWeatherClient, PreferenceStore, RefreshCoordinator, Settings,
    TemperatureUnit, TextSize, TomlStore, WeatherViewModel, catalog,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-time", version, about = "Weather Time: city weather and local time")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show weather and local time for every tracked city.
    List,

    /// Search the city catalog.
    Search {
        /// City or country fragment; empty shows the full catalog.
        #[arg(default_value = "")]
        query: String,
    },

    /// Add a city to the tracked list.
    Add {
        /// City name or fragment; omit to search interactively.
        query: Option<String>,
    },

    /// Remove a city by its position in `list` output (1-based).
    Remove { position: usize },

    /// Show or change settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Print the current settings.
    Show,

    /// Set the temperature unit: celsius or fahrenheit.
    Unit { value: String },

    /// Set the text size: normal, large or extra-large.
    TextSize { value: String },

    /// Turn sound effects on or off.
    Sound { value: String },

    /// Set screen brightness (0.0 to 1.0).
    Brightness { value: f64 },

    /// Store the OpenWeather API key.
    ApiKey { value: String },

    /// Restore the default temperature unit and text size.
    Reset,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let store: Arc<dyn PreferenceStore> = Arc::new(TomlStore::open_default()?);
        let settings = Settings::new(Arc::clone(&store));

        match self.command {
            Command::List => list(&store, &settings).await,
            Command::Search { query } => {
                for entry in catalog::filter(&query) {
                    println!("{entry}");
                }
                Ok(())
            }
            Command::Add { query } => add(&store, &settings, query).await,
            Command::Remove { position } => remove(&store, position),
            Command::Settings { action } => apply_settings(&settings, action),
        }
    }
}

async fn list(store: &Arc<dyn PreferenceStore>, settings: &Settings) -> Result<()> {
    let registry = CityRegistry::load(Arc::clone(store));
    if registry.is_empty() {
        println!("No cities yet. Add one with `weather-time add <city>`.");
        return Ok(());
    }

    let coordinator = RefreshCoordinator::new(Arc::new(provider(settings)?));
    let unit = settings.temperature_unit().unit_system();

    let views = coordinator.refresh(registry.cities(), unit).await.unwrap_or_default();

    if views.is_empty() {
        println!("No weather data available right now.");
        return Ok(());
    }
    for (position, view) in views.iter().enumerate() {
        print_card(position + 1, view);
    }
    if views.len() < registry.len() {
        println!("({} of {} cities answered)", views.len(), registry.len());
    }

    Ok(())
}

async fn add(
    store: &Arc<dyn PreferenceStore>,
    settings: &Settings,
    query: Option<String>,
) -> Result<()> {
    let query = match query {
        Some(q) => q,
        None => inquire::Text::new("Search city or country:").prompt()?,
    };
    let Some(query) = normalized_query(&query) else {
        bail!("Please enter a city name.");
    };

    let mut registry = CityRegistry::load(Arc::clone(store));

    let mut matches = catalog::filter(query);
    let added = if matches.is_empty() {
        // Not in the catalog: validate against the live lookup.
        let resolver = CityResolver::new(Arc::new(provider(settings)?));
        resolver.resolve_and_add(&mut registry, query).await?
    } else if matches.len() == 1 {
        let city = matches.remove(0);
        registry.add(&city)?;
        city
    } else {
        let pick = inquire::Select::new("Which city?", matches).prompt()?;
        registry.add(&pick)?;
        pick
    };

    println!("Added {added}.");
    Ok(())
}

fn remove(store: &Arc<dyn PreferenceStore>, position: usize) -> Result<()> {
    if position == 0 {
        bail!("Positions start at 1; run `weather-time list` to see them.");
    }

    let mut registry = CityRegistry::load(Arc::clone(store));
    let removed = registry.remove(position - 1)?;

    println!("Removed {removed}.");
    Ok(())
}

fn apply_settings(settings: &Settings, action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show => {
            println!("Temperature unit: {}", settings.temperature_unit());
            println!("Text size:        {}", settings.text_size());
            println!("Sound effects:    {}", if settings.sound_effects() { "on" } else { "off" });
            println!("Brightness:       {:.2}", settings.brightness());
            println!(
                "API key:          {}",
                if settings.api_key().is_some() { "configured" } else { "not configured" }
            );
        }
        SettingsAction::Unit { value } => {
            let unit = TemperatureUnit::try_from(value.as_str())?;
            settings.set_temperature_unit(unit)?;
            println!("Temperature unit set to {unit}.");
        }
        SettingsAction::TextSize { value } => {
            let size = TextSize::try_from(value.as_str())?;
            settings.set_text_size(size)?;
            println!("Text size set to {size}.");
        }
        SettingsAction::Sound { value } => {
            let on = match value.to_lowercase().as_str() {
                "on" | "true" => true,
                "off" | "false" => false,
                _ => bail!("Expected 'on' or 'off', got '{value}'."),
            };
            settings.set_sound_effects(on)?;
            println!("Sound effects {}.", if on { "on" } else { "off" });
        }
        SettingsAction::Brightness { value } => {
            let effective = settings.set_brightness(value)?;
            println!("Brightness set to {effective:.2}.");
        }
        SettingsAction::ApiKey { value } => {
            settings.set_api_key(&value)?;
            println!("API key stored.");
        }
        SettingsAction::Reset => {
            settings.reset()?;
            println!("Settings reset to defaults.");
        }
    }

    Ok(())
}

fn provider(settings: &Settings) -> Result<OpenWeatherClient> {
    let key = settings.api_key().context(
        "No API key configured.\n\
         Hint: run `weather-time settings api-key <key>` with an OpenWeather key first.",
    )?;

    Ok(OpenWeatherClient::new(key))
}

fn print_card(position: usize, view: &WeatherViewModel) {
    println!("{position}. {}, {}", view.city, view.country);
    println!("   {}", view.local_time);
    println!("   {:.0}{}  {}", view.temperature, view.unit.symbol(), view.description);
    println!("   {}", view.local_date);
    println!();
}

/// Trimmed query, or `None` when the input is blank.
fn normalized_query(query: &str) -> Option<&str> {
    let trimmed = query.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
