use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use skydash_core::{
    Config, Dashboard, IpLocator, LocationQuery, Report, Update, WeatherSource, source_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "skydash",
    version,
    about = "Current weather and a 6-day forecast in your terminal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default city.
    Configure,

    /// Show current conditions and the daily forecast.
    Show {
        #[command(flatten)]
        location: LocationArgs,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Search repeatedly; a failed search keeps the last report on screen.
    Interactive,
}

#[derive(Debug, Args)]
pub struct LocationArgs {
    /// City name; defaults to the configured city.
    #[arg(conflicts_with_all = ["lat", "here"])]
    pub city: Option<String>,

    /// Latitude in degrees (requires --lon).
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in degrees (requires --lat).
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Use the approximate location of this machine.
    #[arg(long, conflicts_with = "lat")]
    pub here: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location, json } => {
                let config = Config::load()?;
                let source = source_from_config(&config)?;
                let query = resolve_query(&config, location).await?;
                show(source.as_ref(), query, json).await
            }
            Command::Interactive => {
                let config = Config::load()?;
                let source = source_from_config(&config)?;
                interactive(&config, source.as_ref()).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let default_city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()
        .context("Failed to read default city")?;

    config.api_key = Some(api_key.trim().to_string());
    config.default_city = default_city.trim().to_string();

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

async fn resolve_query(config: &Config, args: LocationArgs) -> anyhow::Result<LocationQuery> {
    if args.here {
        return locate_here(config).await;
    }

    let query = match (args.lat, args.lon, args.city) {
        (Some(lat), Some(lon), _) => LocationQuery::coordinates(lat, lon)?,
        (_, _, Some(city)) => LocationQuery::city(city)?,
        _ => LocationQuery::city(config.default_city.as_str())?,
    };

    Ok(query)
}

async fn locate_here(config: &Config) -> anyhow::Result<LocationQuery> {
    let locator = IpLocator::new(&config.locate_url, config.timeout_secs)?;
    let located = locator.locate().await.map_err(|e| anyhow!("{}: {e}", e.notice()))?;

    tracing::info!(city = %located.city, country = %located.country, "using approximate location");
    Ok(LocationQuery::Coordinates(located.coordinates))
}

async fn show(source: &dyn WeatherSource, query: LocationQuery, json: bool) -> anyhow::Result<()> {
    let mut dashboard = Dashboard::new();

    match dashboard.search(source, query).await {
        Update::Shown => {
            if let Some(report) = dashboard.report() {
                print_report(report, json)?;
            }
            Ok(())
        }
        Update::Failed { notice, error } => Err(anyhow::Error::new(error).context(notice)),
        Update::Stale => Ok(()),
    }
}

fn print_report(report: &Report, json: bool) -> anyhow::Result<()> {
    if json {
        let out = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        println!("{out}");
    } else {
        println!("{}", render::report(report, chrono::Utc::now()));
    }
    Ok(())
}

/// What the user typed at the interactive prompt.
#[derive(Debug, PartialEq)]
enum Input {
    Quit,
    Here,
    City(String),
}

fn parse_input(line: &str) -> Input {
    match line.trim() {
        "" | ":q" | ":quit" => Input::Quit,
        ":here" => Input::Here,
        city => Input::City(city.to_string()),
    }
}

async fn interactive(config: &Config, source: &dyn WeatherSource) -> anyhow::Result<()> {
    let mut dashboard = Dashboard::new();

    loop {
        let line = match Text::new("City (:here for your location, empty to quit):").prompt() {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read search input"),
        };

        let query = match parse_input(&line) {
            Input::Quit => break,
            Input::Here => match locate_here(config).await {
                Ok(query) => query,
                Err(e) => {
                    eprintln!("{e}");
                    continue;
                }
            },
            Input::City(city) => match LocationQuery::city(city) {
                Ok(query) => query,
                Err(e) => {
                    eprintln!("{e}");
                    continue;
                }
            },
        };

        match dashboard.search(source, query).await {
            Update::Shown | Update::Stale => {}
            Update::Failed { notice, error } => {
                tracing::debug!(%error, "search failed");
                eprintln!("{notice}");
            }
        }

        if let Some(report) = dashboard.report() {
            println!("{}", render::report(report, chrono::Utc::now()));
        }
    }

    Ok(())
}
