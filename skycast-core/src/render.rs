use std::{
    collections::BTreeMap,
    fmt::Debug,
    sync::{Mutex, MutexGuard},
};

use crate::{error::DashboardError, geometry::ContainerDimensions};

/// Ids of the targets the dashboard writes to.
pub mod targets {
    pub const TIME: &str = "time";
    pub const DATE: &str = "date";
    pub const DAY: &str = "day";
    pub const TEMPERATURE: &str = "temperature";
    pub const HOURLY_FORECAST: &str = "hourlyForecast";
    pub const WEEKLY_FORECAST: &str = "weeklyForecast";
    pub const SKY: &str = "sky";
    pub const SUN: &str = "sun";
    pub const MOON: &str = "moon";
}

/// Where the dashboard draws.
///
/// Writes to a target that does not exist are expected to be ignored by
/// the implementation; callers check [`RenderSurface::exists`] first when
/// they need to know.
pub trait RenderSurface: Send + Sync + Debug {
    fn exists(&self, target: &str) -> bool;
    fn set_text(&self, target: &str, text: &str);
    fn set_html(&self, target: &str, html: &str);
    fn set_style(&self, target: &str, property: &str, value: &str);
    /// `None` while the target cannot be measured yet.
    fn measure(&self, target: &str) -> Option<ContainerDimensions>;
}

/// Blocking, user-facing messages.
pub trait Notifier: Send + Sync + Debug {
    fn notify(&self, message: &str);
}

/// Set text on `target`, or report it missing.
pub fn render_text(
    surface: &dyn RenderSurface,
    target: &'static str,
    text: &str,
) -> Result<(), DashboardError> {
    ensure_target(surface, target)?;
    surface.set_text(target, text);
    Ok(())
}

/// Set markup on `target`, or report it missing.
pub fn render_html(
    surface: &dyn RenderSurface,
    target: &'static str,
    html: &str,
) -> Result<(), DashboardError> {
    ensure_target(surface, target)?;
    surface.set_html(target, html);
    Ok(())
}

fn ensure_target(surface: &dyn RenderSurface, target: &'static str) -> Result<(), DashboardError> {
    if surface.exists(target) {
        Ok(())
    } else {
        Err(DashboardError::RenderTargetMissing { target })
    }
}

/// Log and drop a render failure. A partially built page is normal.
pub fn skip_missing(result: Result<(), DashboardError>) {
    if let Err(err) = result {
        tracing::debug!("skipping render update: {err}");
    }
}

/// Content last written to one target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetState {
    pub text: Option<String>,
    pub html: Option<String>,
    pub styles: BTreeMap<String, String>,
    pub size: Option<ContainerDimensions>,
}

impl TargetState {
    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }
}

/// A surface that keeps every write in memory.
///
/// Used as the test double throughout the crate and as the backing store
/// of the terminal front-end.
#[derive(Debug, Default)]
pub struct MemorySurface {
    targets: Mutex<BTreeMap<String, TargetState>>,
    writes: Mutex<usize>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface with every dashboard target and a measurable sky.
    pub fn with_dashboard_targets(sky: ContainerDimensions) -> Self {
        let surface = Self::new();
        for target in [
            targets::TIME,
            targets::DATE,
            targets::DAY,
            targets::TEMPERATURE,
            targets::HOURLY_FORECAST,
            targets::WEEKLY_FORECAST,
            targets::SUN,
            targets::MOON,
        ] {
            surface.add_target(target);
        }
        surface.add_sized_target(targets::SKY, sky);
        surface
    }

    pub fn add_target(&self, target: &str) {
        self.lock().entry(target.to_owned()).or_default();
    }

    pub fn add_sized_target(&self, target: &str, size: ContainerDimensions) {
        self.lock().entry(target.to_owned()).or_default().size = Some(size);
    }

    pub fn remove_target(&self, target: &str) {
        self.lock().remove(target);
    }

    pub fn target(&self, target: &str) -> Option<TargetState> {
        self.lock().get(target).cloned()
    }

    pub fn text(&self, target: &str) -> Option<String> {
        self.lock().get(target).and_then(|t| t.text.clone())
    }

    pub fn html(&self, target: &str) -> Option<String> {
        self.lock().get(target).and_then(|t| t.html.clone())
    }

    pub fn style(&self, target: &str, property: &str) -> Option<String> {
        self.lock().get(target).and_then(|t| t.style(property).map(str::to_owned))
    }

    /// Number of content or style writes that hit an existing target.
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, TargetState>> {
        self.targets.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn update(&self, target: &str, apply: impl FnOnce(&mut TargetState)) {
        let mut targets = self.lock();
        if let Some(state) = targets.get_mut(target) {
            apply(state);
            *self.writes.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        }
    }
}

impl RenderSurface for MemorySurface {
    fn exists(&self, target: &str) -> bool {
        self.lock().contains_key(target)
    }

    fn set_text(&self, target: &str, text: &str) {
        self.update(target, |t| t.text = Some(text.to_owned()));
    }

    fn set_html(&self, target: &str, html: &str) {
        self.update(target, |t| t.html = Some(html.to_owned()));
    }

    fn set_style(&self, target: &str, property: &str, value: &str) {
        self.update(target, |t| {
            t.styles.insert(property.to_owned(), value.to_owned());
        });
    }

    fn measure(&self, target: &str) -> Option<ContainerDimensions> {
        self.lock().get(target).and_then(|t| t.size)
    }
}

/// Collects notifications instead of showing them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).push(message.to_owned());
    }
}
