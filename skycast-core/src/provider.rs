use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    model::{CurrentConditions, ForecastPayload, Units},
    provider::openweather::OpenWeatherSource,
};

pub mod openweather;

/// Remote weather data keyed by city name.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current(&self, city: &str, units: Units) -> anyhow::Result<CurrentConditions>;
    async fn forecast(&self, city: &str, units: Units) -> anyhow::Result<ForecastPayload>;
}

/// Construct the OpenWeather source from config.
pub fn source_from_config(config: &Config) -> anyhow::Result<OpenWeatherSource> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured.\n\
             Hint: run `skycast configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    Ok(OpenWeatherSource::new(api_key, config.base_url.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        if cfg.api_key().is_some() {
            // key provided through the environment
            return;
        }
        let err = source_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
    }

    #[test]
    fn source_from_config_uses_stored_key_and_base_url() {
        let cfg = Config {
            api_key: Some("KEY".to_string()),
            base_url: "http://localhost:9999/data/2.5".to_string(),
            ..Config::default()
        };

        let source = source_from_config(&cfg).expect("key is configured");
        assert_eq!(source.base_url(), "http://localhost:9999/data/2.5");
    }
}
