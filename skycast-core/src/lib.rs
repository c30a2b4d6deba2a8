//! Core library for the `skycast` weather dashboard.
//!
//! This crate defines:
//! - Sun/moon placement on the sky container and the day/night switch
//! - Forecast reduction into hourly and per-day views
//! - The weather fetch/render flow over an abstract data source and surface
//! - Configuration & credentials handling
//!
//! It is used by `skycast-cli`, but any front-end that implements
//! [`RenderSurface`] and [`Notifier`] can drive it.

pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod forecast;
pub mod geometry;
pub mod model;
pub mod orchestrator;
pub mod periodic;
pub mod provider;
pub mod render;
pub mod scheduler;

pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use error::DashboardError;
pub use geometry::{ContainerDimensions, Position, TimeOfDay};
pub use model::{CurrentConditions, ForecastPayload, ForecastSample, Units, WeatherReport};
pub use orchestrator::{RenderOutcome, WeatherOrchestrator};
pub use periodic::PeriodicTask;
pub use provider::WeatherSource;
pub use render::{Notifier, RenderSurface};
pub use scheduler::{Body, DayNightScheduler, SkyFrame};
