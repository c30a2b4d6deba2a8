use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{convert::TryFrom, fmt};

/// Unit system requested from the weather API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
            Units::Standard => "standard",
        }
    }

    /// Suffix appended to a rounded temperature.
    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Imperial => "°F",
            Units::Metric => "°C",
            Units::Standard => "K",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Imperial, Units::Metric, Units::Standard]
    }

    /// Render a temperature the way the dashboard shows it, e.g. `72°F`.
    pub fn format_temperature(&self, value: f64) -> String {
        format!("{}{}", value.round() as i64, self.temperature_suffix())
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "imperial" => Ok(Units::Imperial),
            "metric" => Ok(Units::Metric),
            "standard" => Ok(Units::Standard),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: imperial, metric, standard."
            )),
        }
    }
}

/// The `main` block shared by current and forecast payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Current conditions for a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(default)]
    pub name: String,
    pub main: MainReadings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CurrentConditions {
    pub fn temperature(&self) -> f64 {
        self.main.temp
    }
}

/// One entry of the forecast time series.
///
/// Fields this crate does not interpret are kept in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Unix seconds.
    #[serde(rename = "dt")]
    pub timestamp: i64,
    pub main: MainReadings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ForecastSample {
    pub fn new(timestamp: i64, temperature: f64) -> Self {
        Self {
            timestamp,
            main: MainReadings { temp: temperature, extra: Map::new() },
            extra: Map::new(),
        }
    }

    pub fn temperature(&self) -> f64 {
        self.main.temp
    }
}

/// Forecast payload: samples in the order the source supplied them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    pub list: Vec<ForecastSample>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Both payloads of a successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub forecast: ForecastPayload,
}
