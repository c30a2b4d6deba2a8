use chrono::{DateTime, TimeZone};

use crate::{
    geometry::{ContainerDimensions, Position, TimeOfDay, moon_position, sun_position},
    render::{RenderSurface, targets},
};

/// The body currently drawn in the sky.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    Sun,
    Moon,
}

impl Body {
    pub fn target(&self) -> &'static str {
        match self {
            Body::Sun => targets::SUN,
            Body::Moon => targets::MOON,
        }
    }

    pub fn other(&self) -> Body {
        match self {
            Body::Sun => Body::Moon,
            Body::Moon => Body::Sun,
        }
    }

    /// Sun from 06:00 up to (not including) 18:00, moon otherwise.
    pub fn for_time(time: TimeOfDay) -> Body {
        if time.is_daytime() { Body::Sun } else { Body::Moon }
    }
}

/// Result of one sky update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyFrame {
    pub visible: Body,
    pub position: Position,
    pub dims: ContainerDimensions,
}

/// Computes the frame for a time and container without touching a surface.
pub fn sky_frame(time: TimeOfDay, dims: ContainerDimensions) -> SkyFrame {
    let visible = Body::for_time(time);
    let position = match visible {
        Body::Sun => sun_position(time.hour(), &dims),
        Body::Moon => moon_position(time.hour(), &dims),
    };

    SkyFrame { visible, position, dims }
}

/// Keeps the sun and moon markers in step with the clock.
///
/// Holds no state between ticks: every call recomputes from `now` and the
/// container's current size, so repeating a tick is harmless.
#[derive(Debug, Clone, Copy, Default)]
pub struct DayNightScheduler;

impl DayNightScheduler {
    pub fn new() -> Self {
        Self
    }

    /// Redraw the sky for `now`.
    ///
    /// Returns `None` without writing anything while the sky elements are
    /// absent or the container cannot be measured yet.
    pub fn tick<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        surface: &dyn RenderSurface,
    ) -> Option<SkyFrame> {
        let time = TimeOfDay::from_time(now);

        if ![targets::SKY, targets::SUN, targets::MOON]
            .iter()
            .all(|target| surface.exists(target))
        {
            tracing::debug!("sky elements not found, waiting for the page to load");
            return None;
        }

        let Some(dims) = surface.measure(targets::SKY) else {
            tracing::debug!("sky container not measurable yet");
            return None;
        };

        let frame = sky_frame(time, dims);
        let active = frame.visible.target();
        let hidden = frame.visible.other().target();

        surface.set_style(active, "display", "block");
        surface.set_style(hidden, "display", "none");
        surface.set_style(active, "left", &format!("{}px", frame.position.x));
        surface.set_style(active, "top", &format!("{}px", frame.position.y));

        tracing::trace!(
            hour = time.hour(),
            body = ?frame.visible,
            x = frame.position.x,
            y = frame.position.y,
            "sky updated"
        );

        Some(frame)
    }
}
