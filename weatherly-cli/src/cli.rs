use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, InquireError, Password, PasswordDisplayMode, Text};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::debug;

use weatherly_core::{
    Config, Coordinates, FirstAvailable, FixedPosition, IpGeolocator, LocationQuery,
    LookupSession, OpenWeatherProvider, PositionSource, WeatherProvider,
    provider::provider_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherly", version, about = "Current weather and a 3-day outlook as cards")]
pub struct Cli {
    /// Print cards as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG wins when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and an optional home position.
    Configure,

    /// Show weather cards for one or more cities.
    Show {
        /// City names, e.g. "London" or "Paris,FR".
        #[arg(required = true)]
        cities: Vec<String>,
    },

    /// Show weather for the current location.
    Here {
        /// Latitude in decimal degrees.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude in decimal degrees.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// Prompt for cities in a loop, keeping a list of cards.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { cities } => {
                let config = Config::load()?;
                let provider = provider_from_config(&config)?;
                show(provider, cities, self.json).await
            }
            Command::Here { lat, lon } => {
                let config = Config::load()?;
                let provider = provider_from_config(&config)?;
                here(&provider, &config, lat.zip(lon), self.json).await
            }
            Command::Interactive => {
                let config = Config::load()?;
                let provider = provider_from_config(&config)?;
                interactive(&provider, &config, self.json).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Get one at https://openweathermap.org/api")
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    config.set_api_key(api_key);

    let wants_home = Confirm::new("Set a fixed home position for `weatherly here`?")
        .with_default(config.home.is_some())
        .with_help_message("Without one, the position is looked up from your IP address")
        .prompt()
        .context("Failed to read answer")?;

    let home = if wants_home {
        let lat = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please type a number, e.g. 52.52")
            .prompt()
            .context("Failed to read latitude")?;
        let lon = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please type a number, e.g. 13.41")
            .prompt()
            .context("Failed to read longitude")?;
        Some(Coordinates::new(lat, lon)?)
    } else {
        None
    };
    config.set_home(home);

    config.save()?;
    println!(
        "Configuration saved to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}

/// Look up all cities at once; cards are added in the order lookups finish.
async fn show(provider: OpenWeatherProvider, cities: Vec<String>, json: bool) -> anyhow::Result<()> {
    let provider = Arc::new(provider);
    let mut session = LookupSession::new();
    let mut lookups = JoinSet::new();
    let mut failures = 0usize;

    for input in cities {
        match LocationQuery::city(&input) {
            Ok(query) => {
                let provider = Arc::clone(&provider);
                lookups.spawn(async move {
                    let outcome = provider.fetch(&query).await;
                    (query, outcome)
                });
            }
            Err(err) => {
                failures += 1;
                eprintln!("'{input}': {err}");
            }
        }
    }

    if !lookups.is_empty() {
        session.begin();
        eprintln!("Loading...");
    }

    while let Some(joined) = lookups.join_next().await {
        let (query, outcome) = joined.context("Lookup task panicked")?;
        if let Err(err) = &outcome {
            failures += 1;
            eprintln!("{query}: {err}");
        }
        session.apply(outcome);
    }

    print_cards(&session, json)?;

    if session.cards().is_empty() && failures > 0 {
        bail!("No weather could be fetched");
    }
    Ok(())
}

async fn here(
    provider: &dyn WeatherProvider,
    config: &Config,
    explicit: Option<(f64, f64)>,
    json: bool,
) -> anyhow::Result<()> {
    let positions = position_source(config, explicit)?;
    let mut session = LookupSession::new();

    eprintln!("Loading...");
    let found = session.locate(provider, positions.as_ref()).await;

    print_cards(&session, json)?;
    if !found {
        bail!(session.error().unwrap_or("Lookup failed").to_string());
    }
    Ok(())
}

/// Explicit coordinates win; otherwise the configured home, then IP geolocation.
fn position_source(
    config: &Config,
    explicit: Option<(f64, f64)>,
) -> anyhow::Result<Box<dyn PositionSource>> {
    if let Some((lat, lon)) = explicit {
        let position = Coordinates::new(lat, lon)?;
        return Ok(Box::new(FixedPosition::new(Some(position))));
    }

    Ok(Box::new(
        FirstAvailable::new()
            .with(FixedPosition::new(config.home_position()?))
            .with(IpGeolocator::new(config.geolocation_url())),
    ))
}

/// What the user typed at the interactive prompt.
#[derive(Debug, PartialEq)]
enum Input {
    Search(String),
    Here,
    Dismiss(u64),
    Quit,
    Help,
    Invalid(String),
}

impl Input {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.split_once(char::is_whitespace) {
            Some((":rm", id)) => match id.trim().parse() {
                Ok(id) => Input::Dismiss(id),
                Err(_) => Input::Invalid(format!("'{}' is not a card id", id.trim())),
            },
            _ => match line {
                ":here" => Input::Here,
                ":q" | ":quit" => Input::Quit,
                ":help" | ":h" | "?" => Input::Help,
                ":rm" => Input::Invalid("Usage: :rm <id>".to_string()),
                cmd if cmd.starts_with(':') => Input::Invalid(format!("Unknown command '{cmd}'")),
                city => Input::Search(city.to_string()),
            },
        }
    }
}

const HELP: &str = "Type a city name to add a card. Commands: :here, :rm <id>, :q";

async fn interactive(
    provider: &dyn WeatherProvider,
    config: &Config,
    json: bool,
) -> anyhow::Result<()> {
    let positions = position_source(config, None)?;
    let mut session = LookupSession::new();
    let mut pending_input = String::new();

    println!("{HELP}");

    loop {
        let line = match Text::new("City:")
            .with_initial_value(&pending_input)
            .with_help_message(HELP)
            .prompt()
        {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read input"),
        };

        let input = Input::parse(&line);
        debug!(?input, "interactive input");
        pending_input.clear();

        match input {
            Input::Quit => break,
            Input::Help => {
                println!("{HELP}");
                continue;
            }
            Input::Invalid(msg) => {
                println!("{msg}");
                continue;
            }
            Input::Search(city) => {
                println!("Loading...");
                if !session.search(provider, &city).await {
                    // Keep the text so it can be corrected.
                    pending_input = city;
                }
            }
            Input::Here => {
                println!("Loading...");
                session.locate(provider, positions.as_ref()).await;
            }
            Input::Dismiss(id) => {
                if !session.cards().contains(id) {
                    println!("No card with id {id}");
                }
                session.dismiss(id);
            }
        }

        print_cards(&session, json)?;
        if let Some(status) = render::status(&session) {
            println!("{status}");
        }
    }

    Ok(())
}

fn print_cards(session: &LookupSession, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", render::cards_json(session.cards())?);
    } else {
        print!("{}", render::cards(session.cards()));
    }
    Ok(())
}
