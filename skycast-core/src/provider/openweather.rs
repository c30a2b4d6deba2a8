use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::model::{CurrentConditions, ForecastPayload, Units};

use super::WeatherSource;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// OpenWeather's free `weather` and `forecast` endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherSource {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        label: &str,
        city: &str,
        units: Units,
    ) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", units.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({label})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {label} response body"))?;

        tracing::debug!(%status, endpoint, city, "OpenWeather responded");
        parse_response(status, &body, label)
    }
}

/// Check the status and decode the body of an OpenWeather response.
pub(crate) fn parse_response<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
    label: &str,
) -> Result<T> {
    if !status.is_success() {
        return Err(anyhow!(
            "OpenWeather {} request failed with status {}: {}",
            label,
            status,
            truncate_body(body),
        ));
    }

    serde_json::from_str(body).with_context(|| format!("Failed to parse OpenWeather {label} JSON"))
}

#[async_trait]
impl WeatherSource for OpenWeatherSource {
    async fn current(&self, city: &str, units: Units) -> Result<CurrentConditions> {
        self.fetch("weather", "current", city, units).await
    }

    async fn forecast(&self, city: &str, units: Units) -> Result<ForecastPayload> {
        self.fetch("forecast", "forecast", city, units).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
