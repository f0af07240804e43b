use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cropguard_core::{
    Config, Coordinate, DisplayState, FixedPosition, NoPosition, PositionProvider, WeatherResolver,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cropguard", version, about = "Crop disease weather advisory")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key.
    Configure,

    /// Resolve location and show current weather with advisories.
    Show {
        /// Latitude to use instead of host geolocation.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude to use instead of host geolocation.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Refresh the advisory on a fixed interval until interrupted.
    Watch {
        /// Seconds between refreshes; defaults to the configured interval.
        #[arg(long)]
        interval_secs: Option<u64>,

        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        init_tracing(self.verbose);

        match self.command {
            Command::Configure => configure(),
            Command::Show { lat, lon } => {
                let config = Config::load()?;
                let resolver = WeatherResolver::from_config(&config, provider_for(lat, lon)?)?;
                print_state(&resolver.refresh().await);
                Ok(())
            }
            Command::Watch {
                interval_secs,
                lat,
                lon,
            } => {
                let config = Config::load()?;
                let period = interval_secs
                    .map(std::time::Duration::from_secs)
                    .unwrap_or_else(|| config.app.auto_refresh_interval());
                let resolver = WeatherResolver::from_config(&config, provider_for(lat, lon)?)?;

                let mut ticker = tokio::time::interval(period);
                loop {
                    // First tick fires immediately; every tick is a fresh cycle.
                    ticker.tick().await;
                    let state = resolver.refresh().await;
                    println!("[{}]", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
                    print_state(&state);
                    println!();
                }
            }
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Explicit coordinates take priority; otherwise the host capability
/// decides (and on hosts without one, the fallback chain runs).
fn provider_for(lat: Option<f64>, lon: Option<f64>) -> anyhow::Result<Box<dyn PositionProvider>> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => {
            let coord = Coordinate::new(lat, lon)?;
            Ok(Box::new(FixedPosition::new(coord)))
        }
        _ => Ok(Box::new(NoPosition)),
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key);
    config.save()?;

    println!("Saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn print_state(state: &DisplayState) {
    println!("{}", state.place);
    println!("  {}  {}", state.temperature_text(), state.condition_text());
    println!("  {}", state.humidity_text());
    println!("  {}", state.wind_text());
    if let Some(weather) = &state.weather {
        println!("  Icon: {}", weather.icon.class_name());
    }
    if let Some(alert) = &state.alert {
        println!("\n  ! {}", alert.message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn explicit_coordinates_use_fixed_provider() {
        let provider = provider_for(Some(-1.2921), Some(36.8219)).expect("valid coords");
        assert!(format!("{provider:?}").contains("FixedPosition"));
    }

    #[test]
    fn missing_coordinates_use_no_position() {
        let provider = provider_for(None, None).expect("always succeeds");
        assert!(format!("{provider:?}").contains("NoPosition"));
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        assert!(provider_for(Some(120.0), Some(0.0)).is_err());
    }
}
