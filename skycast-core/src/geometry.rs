//! Sun and moon placement on the sky container.
//!
//! Both bodies travel the same half-circle dome, left horizon to right
//! horizon. The sun covers 06:00..18:00 and the moon covers 18:00..06:00,
//! with hours before dawn shifted past midnight so its track is continuous.

use chrono::Timelike;
use std::f64::consts::PI;

/// Distance kept between a marker and the container edge.
pub const EDGE_MARGIN: f64 = 15.0;

/// Gap between the arc baseline and the bottom of the container.
pub const BASELINE_OFFSET: f64 = 10.0;

pub const DAY_START_HOUR: f64 = 6.0;
pub const NIGHT_START_HOUR: f64 = 18.0;
const WINDOW_HOURS: f64 = 12.0;

/// Hour of day with fractional minutes, in `[0, 24)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimeOfDay(f64);

impl TimeOfDay {
    pub fn new(hour: f64) -> Self {
        Self(hour)
    }

    /// Hours plus minutes / 60; seconds do not move the markers.
    pub fn from_time<T: Timelike>(time: &T) -> Self {
        Self(f64::from(time.hour()) + f64::from(time.minute()) / 60.0)
    }

    pub fn hour(&self) -> f64 {
        self.0
    }

    pub fn is_daytime(&self) -> bool {
        is_daytime(self.0)
    }
}

/// Measured size of the sky container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerDimensions {
    pub width: f64,
    pub height: f64,
}

impl ContainerDimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn radius(&self) -> f64 {
        self.width.min(self.height) / 3.0
    }

    pub fn center_x(&self) -> f64 {
        self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.height - BASELINE_OFFSET
    }
}

/// Marker position in pixels, relative to the container's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

pub fn is_daytime(hour: f64) -> bool {
    (DAY_START_HOUR..NIGHT_START_HOUR).contains(&hour)
}

/// Progress through the day window: 0 at 06:00, 1 at 18:00.
pub fn day_progress(hour: f64) -> f64 {
    (hour - DAY_START_HOUR) / WINDOW_HOURS
}

/// Progress through the night window: 0 at 18:00, 1 at 06:00 next day.
pub fn night_progress(hour: f64) -> f64 {
    let night_hour = if hour < DAY_START_HOUR { hour + 24.0 } else { hour };
    (night_hour - NIGHT_START_HOUR) / WINDOW_HOURS
}

pub fn sun_position(hour: f64, dims: &ContainerDimensions) -> Position {
    arc_position(day_progress(hour), dims)
}

pub fn moon_position(hour: f64, dims: &ContainerDimensions) -> Position {
    arc_position(night_progress(hour), dims)
}

fn arc_position(progress: f64, dims: &ContainerDimensions) -> Position {
    let angle = PI - progress * PI;
    let radius = dims.radius();

    let x = dims.center_x() + radius * angle.cos();
    // abs keeps the track on the dome even if progress leaves [0, 1]
    let y = dims.center_y() - (radius * angle.sin()).abs();

    Position {
        x: clamp(x, EDGE_MARGIN, dims.width - EDGE_MARGIN),
        y: clamp(y, EDGE_MARGIN, dims.height - EDGE_MARGIN),
    }
}

/// `max(min, min(value, max))`; the lower bound wins on an empty range.
fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}
