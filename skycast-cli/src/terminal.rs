use std::{
    fmt::Write as _,
    io::{self, Write as _},
    sync::Mutex,
};

use crossterm::{
    cursor, queue,
    terminal::{Clear, ClearType},
};
use skycast_core::{
    ContainerDimensions, Notifier, RenderSurface,
    render::{MemorySurface, targets},
};

/// Virtual pixel size of the sky container.
pub const SKY_SIZE: ContainerDimensions = ContainerDimensions { width: 300.0, height: 150.0 };

const SKY_COLS: usize = 40;
const SKY_ROWS: usize = 8;

/// Dashboard targets kept in memory and drawn as plain text.
///
/// Also the dashboard's notifier: the last notice stays on screen under the
/// forecast until [`TerminalSurface::clear_notice`] is called.
#[derive(Debug)]
pub struct TerminalSurface {
    inner: MemorySurface,
    notice: Mutex<Option<String>>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            inner: MemorySurface::with_dashboard_targets(SKY_SIZE),
            notice: Mutex::new(None),
        }
    }

    pub fn notice(&self) -> Option<String> {
        self.notice.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn clear_notice(&self) {
        self.notice.lock().unwrap_or_else(|e| e.into_inner()).take();
    }

    /// Text rendering of every target.
    pub fn frame(&self) -> String {
        let mut out = String::new();
        let text = |target: &str| self.inner.text(target).unwrap_or_default();
        let html = |target: &str| self.markup_text(target);

        let _ = writeln!(out, "{}   {}", text(targets::TIME), text(targets::DATE));
        let _ = writeln!(out, "{}", html(targets::DAY));
        out.push('\n');
        out.push_str(&self.sky());
        out.push('\n');
        let _ = writeln!(out, "Now: {}", text(targets::TEMPERATURE));
        out.push_str(&self.forecast());
        if let Some(notice) = self.notice() {
            let _ = writeln!(out, "! {notice}");
        }
        out
    }

    /// Temperature plus both forecast strips, without clock or sky.
    pub fn forecast(&self) -> String {
        let mut out = String::new();
        let html = |target: &str| self.markup_text(target);

        let _ = writeln!(out, "\nNext hours:\n{}", html(targets::HOURLY_FORECAST));
        let _ = writeln!(out, "Next days:\n{}", html(targets::WEEKLY_FORECAST));
        out
    }

    fn markup_text(&self, target: &str) -> String {
        self.inner.html(target).map(|h| strip_markup(&h)).unwrap_or_default()
    }

    pub fn temperature(&self) -> Option<String> {
        self.inner.text(targets::TEMPERATURE)
    }

    /// Redraw the whole terminal.
    pub fn redraw(&self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        queue!(stdout, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
        write!(stdout, "{}\ncity> ", self.frame())?;
        stdout.flush()
    }

    fn sky(&self) -> String {
        let mut grid = vec![vec![' '; SKY_COLS]; SKY_ROWS];
        grid[SKY_ROWS - 1] = vec!['_'; SKY_COLS];

        for (target, glyph) in [(targets::SUN, '☀'), (targets::MOON, '☾')] {
            if let Some((col, row)) = self.marker_cell(target) {
                grid[row][col] = glyph;
            }
        }

        grid.into_iter().map(|row| row.into_iter().collect::<String>() + "\n").collect()
    }

    fn marker_cell(&self, target: &str) -> Option<(usize, usize)> {
        let state = self.inner.target(target)?;
        if state.style("display") != Some("block") {
            return None;
        }
        let x = parse_px(state.style("left")?)?;
        let y = parse_px(state.style("top")?)?;

        let col = (x / SKY_SIZE.width * SKY_COLS as f64) as usize;
        let row = (y / SKY_SIZE.height * SKY_ROWS as f64) as usize;
        Some((col.min(SKY_COLS - 1), row.min(SKY_ROWS - 1)))
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for TerminalSurface {
    fn exists(&self, target: &str) -> bool {
        self.inner.exists(target)
    }

    fn set_text(&self, target: &str, text: &str) {
        self.inner.set_text(target, text);
    }

    fn set_html(&self, target: &str, html: &str) {
        self.inner.set_html(target, html);
    }

    fn set_style(&self, target: &str, property: &str, value: &str) {
        self.inner.set_style(target, property, value);
    }

    fn measure(&self, target: &str) -> Option<ContainerDimensions> {
        self.inner.measure(target)
    }
}

impl Notifier for TerminalSurface {
    fn notify(&self, message: &str) {
        *self.notice.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.to_string());
    }
}

fn parse_px(value: &str) -> Option<f64> {
    value.strip_suffix("px")?.parse().ok()
}

/// Flatten dashboard markup: `<div>` entries become lines and today's
/// weekday span is bracketed.
pub fn strip_markup(html: &str) -> String {
    let mut out = String::new();
    let mut rest = html;
    let mut close_bracket = false;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('>') else {
            rest = &rest[start..];
            break;
        };
        let tag = &rest[start + 1..start + end];

        match tag {
            "/div" => out.push('\n'),
            "/span" if close_bracket => {
                out.push(']');
                close_bracket = false;
            }
            t if t.starts_with("span") && t.contains("circle-today") => {
                out.push('[');
                close_bracket = true;
            }
            _ => {}
        }
        rest = &rest[start + end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use skycast_core::{DayNightScheduler, display};

    #[test]
    fn strip_markup_turns_divs_into_lines() {
        let html = "<div>09:00: 60°F</div><div>12:00: 64°F</div>";
        assert_eq!(strip_markup(html), "09:00: 60°F\n12:00: 64°F\n");
    }

    #[test]
    fn strip_markup_brackets_today() {
        let html = r#"<span>Sun</span> <span class="circle-today">Mon</span> <span>Tue</span>"#;
        assert_eq!(strip_markup(html), "Sun [Mon] Tue");
    }

    #[test]
    fn frame_draws_the_sun_at_noon() {
        let surface = TerminalSurface::new();
        let noon = Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).single().unwrap();

        DayNightScheduler::new().tick(&noon, &surface).unwrap();
        display::update_time_and_date(&noon, &surface);
        display::setup_days_of_week(&noon, &surface);

        let frame = surface.frame();
        assert!(frame.contains('☀'));
        assert!(!frame.contains('☾'));
        assert!(frame.contains("12:00:00 PM"));
        assert!(frame.contains("[Mon]"));
    }

    #[test]
    fn notice_stays_in_the_frame_until_cleared() {
        let surface = TerminalSurface::new();

        surface.notify("Cannot fetch weather data: City not found");
        assert!(surface.frame().contains("! Cannot fetch weather data: City not found"));

        surface.clear_notice();
        assert!(!surface.frame().contains('!'));
    }

    #[test]
    fn marker_cell_maps_pixels_to_grid() {
        let surface = TerminalSurface::new();
        surface.set_style(targets::MOON, "display", "block");
        surface.set_style(targets::MOON, "left", "150px");
        surface.set_style(targets::MOON, "top", "90px");

        assert_eq!(surface.marker_cell(targets::MOON), Some((20, 4)));
        assert_eq!(surface.marker_cell(targets::SUN), None);
    }
}
