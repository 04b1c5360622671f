use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{
    Confirm, CustomType, CustomUserError, Password, PasswordDisplayMode, Text,
    validator::Validation,
};
use weather_map_core::{
    Config, Coordinate, FixedPosition, Geolocator, LocationConfig, LookupError, MapCanvas,
    Orchestrator, geolocation::geolocator_from_config, provider::client_from_config,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-map", version, about = "Current weather on a map, by city or location")]
pub struct Cli {
    /// OpenWeather API key; overrides the configured one.
    #[arg(long, global = true, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and the location to share.
    Configure,

    /// Show weather for a city.
    Show {
        /// City name; multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },

    /// Show weather for the current location.
    Here {
        /// Latitude of the position fix; overrides the configured location.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude of the position fix.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// Try the current location, then search cities until Esc or Ctrl-C.
    /// This is the default.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;
        tracing::debug!(has_key = config.api_key.is_some(), "Loaded config");
        let api_key = self.api_key.as_deref();

        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => configure(config),
            Command::Show { city } => {
                let mut orch = build(&config, api_key, default_geolocator(&config))?;
                let city = city.join(" ");
                report(orch.search_city(&city).await, orch.map())
            }
            Command::Here { lat, lon } => {
                let geolocator = match (lat, lon) {
                    (Some(lat), Some(lon)) => {
                        Box::new(FixedPosition::granted(Coordinate::new(lat, lon)))
                            as Box<dyn Geolocator>
                    }
                    _ => default_geolocator(&config),
                };
                let mut orch = build(&config, api_key, geolocator)?;
                report(orch.use_current_location().await, orch.map())
            }
            Command::Interactive => {
                let orch = build(&config, api_key, default_geolocator(&config))?;
                interactive(orch).await
            }
        }
    }
}

fn default_geolocator(config: &Config) -> Box<dyn Geolocator> {
    geolocator_from_config(config.location.as_ref())
}

fn build(
    config: &Config,
    api_key: Option<&str>,
    geolocator: Box<dyn Geolocator>,
) -> Result<Orchestrator<MapCanvas>> {
    let client = client_from_config(config, api_key)?;
    Ok(Orchestrator::with_openweather(client, geolocator, MapCanvas::default()))
}

/// Print the map on success; on failure show the message and fail the command.
fn report<T>(outcome: Result<T, LookupError>, map: &MapCanvas) -> Result<()> {
    match outcome {
        Ok(_) => {
            println!("{map}");
            Ok(())
        }
        Err(err) => {
            if err.is_location_error() {
                println!("{map}");
            }
            Err(err.into())
        }
    }
}

async fn interactive(mut orch: Orchestrator<MapCanvas>) -> Result<()> {
    println!("Locating you...");
    match orch.use_current_location().await {
        Ok(_) => println!("{}", orch.map()),
        Err(err) => {
            eprintln!("{err}");
            println!("{}", orch.map());
        }
    }

    loop {
        let prompt = Text::new("City:").with_help_message("Enter to search, Esc to quit");

        let input = match prompt.prompt_skippable() {
            Ok(Some(input)) => input,
            Ok(None) => break,
            Err(inquire::InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read city name"),
        };

        match orch.search_city(&input).await {
            Ok(marker) => {
                tracing::debug!("Search '{}' placed marker at {}", input.trim(), marker.position);
                println!("{}", orch.map());
            }
            Err(err) => {
                tracing::debug!("Search '{}' failed: {err:?}", input.trim());
                eprintln!("{err}");
            }
        }
    }

    Ok(())
}

fn configure(mut config: Config) -> Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let share = Confirm::new("Share a fixed location for `weather-map here`?")
        .with_default(config.location.as_ref().is_some_and(|l| l.share))
        .prompt()
        .context("Failed to read location choice")?;

    if share {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a number")
            .with_validator(validate_latitude)
            .prompt()
            .context("Failed to read latitude")?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a number")
            .with_validator(validate_longitude)
            .prompt()
            .context("Failed to read longitude")?;

        config.set_location(LocationConfig { share, latitude, longitude });
    } else if let Some(location) = config.location.as_mut() {
        location.share = false;
    }

    let path = config.save()?;
    tracing::debug!(share, "Wrote config to {}", path.display());
    println!("Saved configuration to {}", path.display());

    Ok(())
}

fn validate_latitude(value: &f64) -> Result<Validation, CustomUserError> {
    Ok(within(*value, 90.0, "Latitude"))
}

fn validate_longitude(value: &f64) -> Result<Validation, CustomUserError> {
    Ok(within(*value, 180.0, "Longitude"))
}

fn within(value: f64, limit: f64, what: &str) -> Validation {
    if (-limit..=limit).contains(&value) {
        Validation::Valid
    } else {
        Validation::Invalid(format!("{what} must be between -{limit} and {limit}").into())
    }
}
