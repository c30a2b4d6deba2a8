use thiserror::Error;

use crate::orchestrator::FETCH_FAILED_PREFIX;

/// Failures the dashboard reports to its caller.
///
/// None of these are fatal: a failed fetch leaves the sky and clock
/// displays running, and a missing render target only skips that update.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// The city input was empty after trimming.
    #[error("Please enter a city name.")]
    Validation,

    /// One of the upstream requests failed.
    #[error("{message}")]
    DataSource { message: String },

    /// A render target is not present on the surface.
    #[error("render target '{target}' is missing")]
    RenderTargetMissing { target: &'static str },
}

impl DashboardError {
    pub fn data_source(message: impl Into<String>) -> Self {
        Self::DataSource { message: message.into() }
    }

    /// Text shown to the user; fetch failures carry [`FETCH_FAILED_PREFIX`].
    pub fn user_message(&self) -> String {
        match self {
            Self::DataSource { .. } => format!("{FETCH_FAILED_PREFIX}{self}"),
            other => other.to_string(),
        }
    }
}
