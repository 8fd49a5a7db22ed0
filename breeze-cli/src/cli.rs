use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use breeze_core::{
    Config, Dashboard, GeocodeClient, GeolocationError, IpGeolocator, Location, LocationState,
    OpenWeatherClient,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "breeze", version, about = "Weather & air-quality dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key. Without one, demo data is shown.
    Configure,

    /// Search for places matching a query.
    Search {
        /// Place name or free-text query.
        query: String,
    },

    /// Render the dashboard once for a place.
    Show {
        /// Place name; omit together with --here to be prompted.
        query: Option<String>,

        /// Use the machine's own position instead of a search.
        #[arg(long)]
        here: bool,
    },

    /// Keep the dashboard on screen, refreshing every 10 minutes.
    Watch {
        /// Place name; omit together with --here to be prompted.
        query: Option<String>,

        /// Use the machine's own position instead of a search.
        #[arg(long)]
        here: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Search { query } => search(&query).await,
            Command::Show { query, here } => show(query.as_deref(), here, false).await,
            Command::Watch { query, here } => show(query.as_deref(), here, true).await,
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read the API key")?;

    config.upsert_api_key(api_key);
    config.save()?;

    println!("Saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn search(query: &str) -> Result<()> {
    let candidates = GeocodeClient::new().search(query).await;

    if candidates.is_empty() {
        println!("No places found for '{query}'.");
        return Ok(());
    }

    for candidate in &candidates {
        println!("{} ({}, {})", candidate.label, candidate.lat, candidate.lon);
    }
    Ok(())
}

async fn show(query: Option<&str>, here: bool, watch: bool) -> Result<()> {
    let config = Config::load()?;
    let location_state = LocationState::new();

    let location = resolve_location(&location_state, &config, query, here).await?;
    let Some(coords) = location.coords() else {
        bail!("Geocoder returned unparsable coordinates for '{}'.", location.label);
    };

    let demo = !config.is_configured();
    let feed = Arc::new(OpenWeatherClient::new(config.api_key()));
    let dashboard = Dashboard::new(feed);

    dashboard.refresh(coords.lat, coords.lon).await;
    println!("{}", render::dashboard(&location, &dashboard.state(), demo));

    if watch {
        let mut updates = dashboard.subscribe();
        dashboard.set_location(Some(&location));
        println!("Refreshing every 10 minutes. Press Ctrl-C to quit.");

        loop {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = updates.borrow_and_update().clone();
                    if !state.is_loading {
                        println!("{}", render::dashboard(&location, &state, demo));
                    }
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        dashboard.set_location(None);
    }

    Ok(())
}

/// Turn the command-line arguments into a selected location: `--here` asks
/// the geolocator, a query goes through the geocoder with an interactive
/// pick when several places match.
async fn resolve_location(
    state: &LocationState,
    config: &Config,
    query: Option<&str>,
    here: bool,
) -> Result<Location> {
    if here {
        let locator = IpGeolocator::new(&config.geolocation);

        return state.locate(&locator).await.map_err(|err| match err {
            GeolocationError::Unavailable => anyhow!(
                "Geolocation is disabled in the config.\n\
                 Hint: enable it under [geolocation], or search for a place instead."
            ),
            other => anyhow!("{other}.\nHint: search for a place instead."),
        });
    }

    let Some(query) = query else {
        bail!("Pass a place to look up, or --here for the machine's own position.");
    };

    let mut candidates = GeocodeClient::new().search(query).await;
    let candidate = if candidates.is_empty() {
        bail!("No places found for '{query}'.");
    } else if candidates.len() == 1 {
        candidates.remove(0)
    } else {
        let labels: Vec<String> = candidates.iter().map(|c| c.label.clone()).collect();
        let chosen = inquire::Select::new("Which place?", labels)
            .prompt()
            .context("Place selection cancelled")?;

        // Labels are deduplicated, so this lookup is unambiguous.
        candidates
            .into_iter()
            .find(|c| c.label == chosen)
            .context("Selected place disappeared from the candidate list")?
    };

    Ok(state.select(&candidate))
}
