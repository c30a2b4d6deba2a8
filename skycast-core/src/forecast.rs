use chrono::{DateTime, Local, NaiveDate, TimeZone};

use crate::model::ForecastSample;

/// Samples shown in the short-term strip.
pub const HOURLY_LIMIT: usize = 6;

/// Distinct calendar days shown in the weekly strip.
pub const WEEKLY_DAY_LIMIT: usize = 5;

/// The first [`HOURLY_LIMIT`] samples, in source order.
pub fn hourly_slice(samples: &[ForecastSample]) -> &[ForecastSample] {
    &samples[..samples.len().min(HOURLY_LIMIT)]
}

/// One sample per local calendar day, at most [`WEEKLY_DAY_LIMIT`] days.
pub fn weekly_slice(samples: &[ForecastSample]) -> Vec<&ForecastSample> {
    weekly_slice_in(samples, &Local)
}

/// [`weekly_slice`] with the calendar date taken in `tz`.
///
/// A sample is kept when its date differs from the last kept date. The
/// source list is chronological, so this yields the first sample of each
/// day.
pub fn weekly_slice_in<'a, Tz: TimeZone>(
    samples: &'a [ForecastSample],
    tz: &Tz,
) -> Vec<&'a ForecastSample> {
    let mut last_date: Option<NaiveDate> = None;
    let mut kept = Vec::with_capacity(WEEKLY_DAY_LIMIT);

    for sample in samples {
        if kept.len() >= WEEKLY_DAY_LIMIT {
            break;
        }

        let Some(date) = calendar_date(sample.timestamp, tz) else {
            tracing::debug!(
                timestamp = sample.timestamp,
                "dropping sample with unrepresentable timestamp"
            );
            continue;
        };

        if last_date != Some(date) {
            last_date = Some(date);
            kept.push(sample);
        }
    }

    kept
}

/// Calendar date of a Unix timestamp as seen in `tz`.
pub fn calendar_date<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp, 0).map(|utc| utc.with_timezone(tz).date_naive())
}
