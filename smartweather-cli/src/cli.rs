use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::Password;
use smartweather_core::Config;

use crate::{app::App, repl};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "smartweather",
    version,
    about = "Weather, 5-day forecast, alerts and CSV export from OpenWeather"
)]
pub struct Cli {
    /// Without a subcommand the interactive prompt starts.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show current weather, the 5-day summary and any triggered alerts.
    Show {
        /// City name, e.g. "Tirupati" or "New York".
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },

    /// Export a cached city's 5-day forecast to `<city>_forecast.csv`.
    Export {
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },

    /// Manage alert rules.
    Alert {
        #[command(subcommand)]
        action: AlertAction,
    },

    /// Show the built-in offline sample.
    Sample,

    /// Start the interactive prompt.
    Repl,
}

#[derive(Debug, Subcommand)]
pub enum AlertAction {
    /// Add a rule: `temp<20`, `temp>30` or `rain`.
    Add { rule: String },

    /// List saved rules.
    List,

    /// Remove a rule by its number in `alert list`.
    Remove { index: usize },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        let output = match self.command {
            Some(Command::Configure) => return configure(config),
            Some(Command::Repl) | None => return repl::run(App::open(&config)).await,
            Some(Command::Show { city }) => App::open(&config).show(&city.join(" ")).await?,
            Some(Command::Export { city }) => App::open(&config).export(&city.join(" ")),
            Some(Command::Alert { action }) => {
                let mut app = App::open(&config);
                match action {
                    AlertAction::Add { rule } => app.add_alert(&rule),
                    AlertAction::List => app.list_alerts(),
                    AlertAction::Remove { index } => app.remove_alert(index),
                }
            }
            Some(Command::Sample) => App::open(&config).sample(),
        };

        println!("{output}");
        Ok(())
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    config.set_api_key(api_key.trim().to_string());
    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}
