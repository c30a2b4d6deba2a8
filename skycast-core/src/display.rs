use chrono::{DateTime, Datelike, TimeZone};
use std::fmt::Display;

use crate::render::{RenderSurface, render_html, render_text, skip_missing, targets};

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// `2:05:09 PM`
pub fn time_text<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    now.format("%-I:%M:%S %p").to_string()
}

/// `Monday, December 25`
pub fn date_text<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    now.format("%A, %B %-d").to_string()
}

/// Week strip Sun..Sat with today's entry highlighted.
pub fn day_strip<Tz: TimeZone>(today: &DateTime<Tz>) -> String {
    let today_index = today.weekday().num_days_from_sunday() as usize;

    WEEKDAYS
        .iter()
        .enumerate()
        .map(|(index, name)| {
            if index == today_index {
                format!(r#"<span class="circle-today">{name}</span>"#)
            } else {
                format!("<span>{name}</span>")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn update_time_and_date<Tz: TimeZone>(now: &DateTime<Tz>, surface: &dyn RenderSurface)
where
    Tz::Offset: Display,
{
    skip_missing(render_text(surface, targets::TIME, &time_text(now)));
    skip_missing(render_text(surface, targets::DATE, &date_text(now)));
}

pub fn setup_days_of_week<Tz: TimeZone>(now: &DateTime<Tz>, surface: &dyn RenderSurface) {
    skip_missing(render_html(surface, targets::DAY, &day_strip(now)));
}
