use anyhow::Context;
use chrono::{Local, NaiveTime, TimeZone};
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use skycast_core::{
    Clock, Config, DayNightScheduler, PeriodicTask, RenderOutcome, SystemClock, Units,
    WeatherOrchestrator, display, provider::source_from_config,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::terminal::TerminalSurface;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather dashboard with a day/night sky")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key, units and default city.
    Configure,

    /// Print current conditions and forecast for a city once.
    Show {
        /// City name.
        city: String,
    },

    /// Run the live dashboard. Type a city name and press enter to load it.
    Dashboard {
        /// City to load on start; defaults to the configured city.
        #[arg(long)]
        city: Option<String>,
    },

    /// Draw the sky for a time of day, e.g. `--at 21:30`. Defaults to now.
    Sky {
        #[arg(long)]
        at: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city } => show(&city).await,
            Command::Dashboard { city } => dashboard(city).await,
            Command::Sky { at } => sky(at.as_deref()),
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Text::new("OpenWeather API key:")
        .with_default(config.api_key.as_deref().unwrap_or_default())
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    let starting = Units::all().iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(starting)
        .prompt()
        .context("Failed to read units")?;

    let city = Text::new("Default city (optional):")
        .with_default(config.default_city.as_deref().unwrap_or_default())
        .prompt()
        .context("Failed to read default city")?;
    config.default_city = Some(city.trim().to_string()).filter(|c| !c.is_empty());

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn show(city: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let source = Arc::new(source_from_config(&config)?);
    let surface = Arc::new(TerminalSurface::new());
    let orchestrator =
        WeatherOrchestrator::new(source, surface.clone(), surface.clone(), config.units);

    let outcome = orchestrator
        .fetch_and_render(city)
        .await
        .map_err(|err| anyhow::anyhow!(err.user_message()))?;

    match outcome {
        RenderOutcome::Rendered(report) => {
            let name = match report.current.name.as_str() {
                "" => city,
                name => name,
            };
            println!("{name}: {}", surface.temperature().unwrap_or_default());
            print!("{}", surface.forecast());
        }
        RenderOutcome::Superseded => {}
    }

    Ok(())
}

async fn dashboard(city: Option<String>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let source = Arc::new(source_from_config(&config)?);
    let surface = Arc::new(TerminalSurface::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let orchestrator =
        WeatherOrchestrator::new(source, surface.clone(), surface.clone(), config.units);

    display::setup_days_of_week(&clock.now(), surface.as_ref());

    let mut clock_task = PeriodicTask::spawn("clock", config.tick_interval(), {
        let (surface, clock) = (surface.clone(), clock.clone());
        move || display::update_time_and_date(&clock.now(), surface.as_ref())
    });

    let mut sky_task = PeriodicTask::spawn("sky", config.tick_interval(), {
        let (surface, clock) = (surface.clone(), clock.clone());
        let scheduler = DayNightScheduler::new();
        move || {
            scheduler.tick(&clock.now(), surface.as_ref());
            if let Err(err) = surface.redraw() {
                tracing::warn!("failed to redraw dashboard: {err}");
            }
        }
    });

    if let Some(city) = city.or(config.default_city) {
        load_city(&orchestrator, &surface, &city).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line.context("Failed to read city from stdin")? {
                Some(input) => load_city(&orchestrator, &surface, &input).await?,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracing::info!("shutting down dashboard");
    sky_task.cancel();
    clock_task.cancel();
    println!();
    Ok(())
}

/// One "get weather" action; a failure notice stays on screen until the
/// next one.
async fn load_city(
    orchestrator: &WeatherOrchestrator,
    surface: &TerminalSurface,
    input: &str,
) -> anyhow::Result<()> {
    surface.clear_notice();
    orchestrator.handle_trigger(input).await;
    surface.redraw().context("Failed to draw the dashboard")
}

fn sky(at: Option<&str>) -> anyhow::Result<()> {
    let now = match at {
        None => SystemClock.now(),
        Some(at) => {
            let time = NaiveTime::parse_from_str(at, "%H:%M")
                .with_context(|| format!("Invalid time '{at}', expected HH:MM"))?;
            let today = Local::now().date_naive().and_time(time);
            Local
                .from_local_datetime(&today)
                .earliest()
                .ok_or_else(|| anyhow::anyhow!("{at} does not exist today in the local time zone"))?
        }
    };

    let surface = TerminalSurface::new();
    display::update_time_and_date(&now, &surface);
    display::setup_days_of_week(&now, &surface);
    if let Some(frame) = DayNightScheduler::new().tick(&now, &surface) {
        tracing::debug!(?frame, "sky frame");
    }

    print!("{}", surface.frame());
    Ok(())
}
