//! Fetches weather for a city and routes it to the dashboard targets.

use chrono::{DateTime, Local, TimeZone};
use std::{
    fmt::Display,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::{
    error::DashboardError,
    forecast::{hourly_slice, weekly_slice_in},
    model::{ForecastSample, Units, WeatherReport},
    provider::WeatherSource,
    render::{Notifier, RenderSurface, render_html, render_text, skip_missing, targets},
};

pub const CITY_NOT_FOUND: &str = "City not found";
pub const FORECAST_UNAVAILABLE: &str = "Forecast data unavailable";
pub const FETCH_FAILED_PREFIX: &str = "Cannot fetch weather data: ";

/// What happened to a successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// The report was drawn.
    Rendered(WeatherReport),
    /// A newer fetch started while this one was in flight; nothing was drawn.
    Superseded,
}

#[derive(Debug)]
pub struct WeatherOrchestrator<Tz: TimeZone = Local> {
    source: Arc<dyn WeatherSource>,
    surface: Arc<dyn RenderSurface>,
    notifier: Arc<dyn Notifier>,
    units: Units,
    tz: Tz,
    generation: AtomicU64,
}

impl WeatherOrchestrator<Local> {
    pub fn new(
        source: Arc<dyn WeatherSource>,
        surface: Arc<dyn RenderSurface>,
        notifier: Arc<dyn Notifier>,
        units: Units,
    ) -> Self {
        Self::with_timezone(source, surface, notifier, units, Local)
    }
}

impl<Tz> WeatherOrchestrator<Tz>
where
    Tz: TimeZone + Send + Sync,
    Tz::Offset: Display,
{
    /// Like [`WeatherOrchestrator::new`] with forecast times shown in `tz`.
    pub fn with_timezone(
        source: Arc<dyn WeatherSource>,
        surface: Arc<dyn RenderSurface>,
        notifier: Arc<dyn Notifier>,
        units: Units,
        tz: Tz,
    ) -> Self {
        Self { source, surface, notifier, units, tz, generation: AtomicU64::new(0) }
    }

    /// Handle a "get weather" action: fetch, render, and tell the user on
    /// failure. Never returns an error.
    pub async fn handle_trigger(&self, input: &str) {
        match self.fetch_and_render(input).await {
            Ok(_) => {}
            Err(DashboardError::Validation) => {
                tracing::info!("city input is empty");
                self.notifier.notify(&DashboardError::Validation.user_message());
            }
            Err(err) => {
                tracing::error!("Error fetching weather data: {err}");
                self.notifier.notify(&err.user_message());
            }
        }
    }

    /// Fetch current conditions and forecast for `city` and draw them.
    ///
    /// Both requests run concurrently and must both succeed; nothing is
    /// drawn otherwise. If another call starts before this one finishes,
    /// this result is dropped in favour of the newer one, failures included.
    pub async fn fetch_and_render(&self, city: &str) -> Result<RenderOutcome, DashboardError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(DashboardError::Validation);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(city, generation, units = %self.units, "fetching weather");

        let fetched = self.fetch(city).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            match &fetched {
                Ok(_) => tracing::debug!(city, generation, "discarding superseded response"),
                Err(err) => tracing::debug!(city, generation, "discarding superseded error: {err}"),
            }
            return Ok(RenderOutcome::Superseded);
        }

        let report = fetched?;

        self.render(&report);
        tracing::info!(city, samples = report.forecast.list.len(), "weather rendered");
        Ok(RenderOutcome::Rendered(report))
    }

    async fn fetch(&self, city: &str) -> Result<WeatherReport, DashboardError> {
        let current = async {
            self.source.current(city, self.units).await.map_err(|err| {
                tracing::warn!("current conditions request failed: {err:#}");
                DashboardError::data_source(CITY_NOT_FOUND)
            })
        };
        let forecast = async {
            self.source.forecast(city, self.units).await.map_err(|err| {
                tracing::warn!("forecast request failed: {err:#}");
                DashboardError::data_source(FORECAST_UNAVAILABLE)
            })
        };

        // current is checked first so a bad city always reads "City not found"
        let (current, forecast) = tokio::join!(current, forecast);
        Ok(WeatherReport { current: current?, forecast: forecast? })
    }

    fn render(&self, report: &WeatherReport) {
        let surface = self.surface.as_ref();
        let samples = &report.forecast.list;

        skip_missing(render_text(
            surface,
            targets::TEMPERATURE,
            &self.units.format_temperature(report.current.temperature()),
        ));
        skip_missing(render_html(surface, targets::HOURLY_FORECAST, &self.hourly_html(samples)));
        skip_missing(render_html(surface, targets::WEEKLY_FORECAST, &self.weekly_html(samples)));
    }

    /// `<div>14:00: 72°F</div>` per sample.
    pub fn hourly_html(&self, samples: &[ForecastSample]) -> String {
        hourly_slice(samples)
            .iter()
            .map(|sample| self.sample_html(sample, "%H:%M"))
            .collect()
    }

    /// `<div>Mon Dec 25: 72°F</div>` per day.
    pub fn weekly_html(&self, samples: &[ForecastSample]) -> String {
        weekly_slice_in(samples, &self.tz)
            .into_iter()
            .map(|sample| self.sample_html(sample, "%a %b %-d"))
            .collect()
    }

    fn sample_html(&self, sample: &ForecastSample, format: &str) -> String {
        let label = self
            .local_time(sample.timestamp)
            .map(|t| t.format(format).to_string())
            .unwrap_or_default();
        let temp = self.units.format_temperature(sample.temperature());
        format!("<div>{label}: {temp}</div>")
    }

    fn local_time(&self, timestamp: i64) -> Option<DateTime<Tz>> {
        DateTime::from_timestamp(timestamp, 0).map(|utc| utc.with_timezone(&self.tz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::ContainerDimensions,
        model::{CurrentConditions, ForecastPayload, MainReadings},
        render::{MemorySurface, RecordingNotifier},
    };
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::Map;
    use std::{sync::Mutex, time::Duration};

    // 2024-03-10 00:00:00 UTC, a Sunday
    const DAY_START: i64 = 1_710_028_800;
    const HOUR: i64 = 3600;

    #[derive(Debug, Default)]
    struct FakeSource {
        fail_current: bool,
        fail_forecast: bool,
        failing_city: Option<&'static str>,
        current_delay: Option<Duration>,
        delay_for: Option<(&'static str, Duration)>,
        calls: Mutex<Vec<(String, Units)>>,
    }

    impl FakeSource {
        fn calls(&self) -> Vec<(String, Units)> {
            self.calls.lock().unwrap().clone()
        }

        async fn maybe_wait(&self, city: &str) {
            if let Some((slow_city, delay)) = self.delay_for {
                if slow_city == city {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        fn fails_for(&self, city: &str) -> bool {
            self.failing_city == Some(city)
        }
    }

    #[async_trait]
    impl WeatherSource for FakeSource {
        async fn current(&self, city: &str, units: Units) -> anyhow::Result<CurrentConditions> {
            self.calls.lock().unwrap().push((city.to_string(), units));
            self.maybe_wait(city).await;
            if let Some(delay) = self.current_delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_current || self.fails_for(city) {
                return Err(anyhow!("OpenWeather current request failed with status 404"));
            }
            Ok(CurrentConditions {
                name: city.to_string(),
                main: MainReadings { temp: 71.6, extra: Map::new() },
                extra: Map::new(),
            })
        }

        async fn forecast(&self, city: &str, units: Units) -> anyhow::Result<ForecastPayload> {
            self.calls.lock().unwrap().push((city.to_string(), units));
            self.maybe_wait(city).await;
            if self.fail_forecast || self.fails_for(city) {
                return Err(anyhow!("OpenWeather forecast request failed with status 500"));
            }
            let list = (0..16)
                .map(|i| ForecastSample::new(DAY_START + i * 3 * HOUR, 40.0 + i as f64))
                .collect();
            Ok(ForecastPayload { list, extra: Map::new() })
        }
    }

    struct Harness {
        source: Arc<FakeSource>,
        surface: Arc<MemorySurface>,
        notifier: Arc<RecordingNotifier>,
        orchestrator: WeatherOrchestrator<Utc>,
    }

    fn harness(source: FakeSource, units: Units) -> Harness {
        let source = Arc::new(source);
        let surface = Arc::new(MemorySurface::with_dashboard_targets(ContainerDimensions::new(
            300.0, 150.0,
        )));
        let notifier = Arc::new(RecordingNotifier::new());
        let orchestrator = WeatherOrchestrator::with_timezone(
            source.clone(),
            surface.clone(),
            notifier.clone(),
            units,
            Utc,
        );
        Harness { source, surface, notifier, orchestrator }
    }

    #[tokio::test]
    async fn empty_city_is_rejected_without_calling_the_source() {
        let h = harness(FakeSource::default(), Units::Imperial);

        for input in ["", "   ", "\t\n"] {
            let err = h.orchestrator.fetch_and_render(input).await.unwrap_err();
            assert_eq!(err, DashboardError::Validation);
        }
        assert!(h.source.calls().is_empty());
        assert_eq!(h.surface.write_count(), 0);
    }

    #[tokio::test]
    async fn success_renders_temperature_and_both_strips() {
        let h = harness(FakeSource::default(), Units::Imperial);

        let outcome = h.orchestrator.fetch_and_render("  London ").await.unwrap();

        assert!(matches!(outcome, RenderOutcome::Rendered(_)));
        assert_eq!(h.surface.text(targets::TEMPERATURE).as_deref(), Some("72°F"));

        let hourly = h.surface.html(targets::HOURLY_FORECAST).unwrap();
        assert_eq!(hourly.matches("<div>").count(), 6);
        assert!(hourly.starts_with("<div>00:00: 40°F</div><div>03:00: 41°F</div>"));

        let weekly = h.surface.html(targets::WEEKLY_FORECAST).unwrap();
        assert_eq!(
            weekly,
            "<div>Sun Mar 10: 40°F</div><div>Mon Mar 11: 48°F</div>"
        );
    }

    #[tokio::test]
    async fn both_requests_use_trimmed_city_and_configured_units() {
        let h = harness(FakeSource::default(), Units::Metric);

        h.orchestrator.fetch_and_render(" Oslo ").await.unwrap();

        let calls = h.source.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|(city, units)| city == "Oslo" && *units == Units::Metric));
        assert_eq!(h.surface.text(targets::TEMPERATURE).as_deref(), Some("72°C"));
    }

    #[tokio::test]
    async fn current_failure_is_city_not_found_and_renders_nothing() {
        let source = FakeSource { fail_current: true, ..FakeSource::default() };
        let h = harness(source, Units::Imperial);

        let err = h.orchestrator.fetch_and_render("Atlantis").await.unwrap_err();

        assert_eq!(err, DashboardError::data_source(CITY_NOT_FOUND));
        assert_eq!(err.to_string(), "City not found");
        assert_eq!(h.surface.write_count(), 0);
    }

    #[tokio::test]
    async fn forecast_failure_is_forecast_unavailable() {
        let source = FakeSource { fail_forecast: true, ..FakeSource::default() };
        let h = harness(source, Units::Imperial);

        let err = h.orchestrator.fetch_and_render("Paris").await.unwrap_err();

        assert_eq!(err, DashboardError::data_source(FORECAST_UNAVAILABLE));
        assert_eq!(h.surface.write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn both_failing_reports_city_not_found_even_when_current_is_slower() {
        let source = FakeSource {
            fail_current: true,
            fail_forecast: true,
            current_delay: Some(Duration::from_millis(50)),
            ..FakeSource::default()
        };
        let h = harness(source, Units::Imperial);

        let err = h.orchestrator.fetch_and_render("Nowhereville").await.unwrap_err();

        assert_eq!(err.to_string(), CITY_NOT_FOUND);
        assert_eq!(h.source.calls().len(), 2);
        assert_eq!(h.surface.write_count(), 0);
    }

    #[tokio::test]
    async fn trigger_with_empty_input_asks_for_a_city() {
        let h = harness(FakeSource::default(), Units::Imperial);

        h.orchestrator.handle_trigger("  ").await;

        assert_eq!(h.notifier.messages(), vec!["Please enter a city name.".to_string()]);
    }

    #[tokio::test]
    async fn trigger_failure_notifies_with_prefix() {
        let source = FakeSource { fail_current: true, ..FakeSource::default() };
        let h = harness(source, Units::Imperial);

        h.orchestrator.handle_trigger("Atlantis").await;

        assert_eq!(
            h.notifier.messages(),
            vec!["Cannot fetch weather data: City not found".to_string()]
        );
    }

    #[tokio::test]
    async fn trigger_success_is_silent() {
        let h = harness(FakeSource::default(), Units::Imperial);
        h.orchestrator.handle_trigger("Rome").await;
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn missing_targets_do_not_fail_the_fetch() {
        let h = harness(FakeSource::default(), Units::Imperial);
        h.surface.remove_target(targets::WEEKLY_FORECAST);

        let outcome = h.orchestrator.fetch_and_render("Rome").await;

        assert!(matches!(outcome, Ok(RenderOutcome::Rendered(_))));
        assert!(h.surface.text(targets::TEMPERATURE).is_some());
        assert!(h.surface.html(targets::HOURLY_FORECAST).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn slower_older_fetch_is_superseded() {
        let source = FakeSource {
            delay_for: Some(("Slowtown", Duration::from_secs(5))),
            ..FakeSource::default()
        };
        let h = harness(source, Units::Imperial);

        let (old, new) = tokio::join!(
            h.orchestrator.fetch_and_render("Slowtown"),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                h.orchestrator.fetch_and_render("Quickville").await
            }
        );

        assert_eq!(old.unwrap(), RenderOutcome::Superseded);
        match new.unwrap() {
            RenderOutcome::Rendered(report) => assert_eq!(report.current.name, "Quickville"),
            other => panic!("expected a render, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_failure_is_not_reported() {
        let source = FakeSource {
            failing_city: Some("Lndon"),
            delay_for: Some(("Lndon", Duration::from_secs(5))),
            ..FakeSource::default()
        };
        let h = harness(source, Units::Imperial);

        let (typo, ()) = tokio::join!(h.orchestrator.fetch_and_render("Lndon"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            h.orchestrator.handle_trigger("London").await;
        });

        assert_eq!(typo.unwrap(), RenderOutcome::Superseded);
        assert!(h.notifier.messages().is_empty());
        assert_eq!(h.surface.text(targets::TEMPERATURE).as_deref(), Some("72°F"));
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_failure_through_trigger_stays_silent() {
        let source = FakeSource {
            failing_city: Some("Lndon"),
            delay_for: Some(("Lndon", Duration::from_secs(5))),
            ..FakeSource::default()
        };
        let h = harness(source, Units::Imperial);

        tokio::join!(h.orchestrator.handle_trigger("Lndon"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            h.orchestrator.handle_trigger("London").await;
        });

        assert!(h.notifier.messages().is_empty());
    }

    #[test]
    fn weekly_html_follows_the_display_timezone() {
        let h = harness(FakeSource::default(), Units::Imperial);
        let samples = vec![
            ForecastSample::new(DAY_START + 21 * HOUR, 50.0),
            ForecastSample::new(DAY_START + 22 * HOUR, 51.0),
        ];
        assert_eq!(h.orchestrator.weekly_html(&samples).matches("<div>").count(), 1);

        let plus_two = chrono::FixedOffset::east_opt(2 * 3600).unwrap();
        let shifted = WeatherOrchestrator::with_timezone(
            h.source.clone(),
            h.surface.clone(),
            h.notifier.clone(),
            Units::Imperial,
            plus_two,
        );
        assert_eq!(
            shifted.weekly_html(&samples),
            "<div>Sun Mar 10: 50°F</div><div>Mon Mar 11: 51°F</div>"
        );
    }
}
