//! Folding the 3-hour forecast timeline into daily summaries.

use chrono::{Local, NaiveDate, TimeZone};
use std::collections::BTreeMap;

use crate::model::{ConditionDescriptor, DailyForecastEntry, RawForecastSample, round_half_up};

/// Number of days kept from a forecast timeline.
pub const MAX_FORECAST_DAYS: usize = 6;

#[derive(Debug)]
struct Bucket<'a> {
    min: f64,
    max: f64,
    conditions: Vec<&'a ConditionDescriptor>,
}

impl<'a> Bucket<'a> {
    fn new(sample: &'a RawForecastSample) -> Self {
        Self { min: sample.temp_min, max: sample.temp_max, conditions: Vec::new() }
    }

    fn push(&mut self, sample: &'a RawForecastSample) {
        self.min = self.min.min(sample.temp_min);
        self.max = self.max.max(sample.temp_max);
        self.conditions.push(&sample.condition);
    }

    /// The middle condition by arrival order (index `len / 2`).
    fn representative(&self) -> Option<&'a ConditionDescriptor> {
        self.conditions.get(self.conditions.len() / 2).copied()
    }
}

/// Group samples by calendar day in the viewer's local time zone.
///
/// Day boundaries follow the machine running the dashboard, not the queried
/// location.
pub fn aggregate_daily(samples: &[RawForecastSample]) -> Vec<DailyForecastEntry> {
    aggregate_daily_in(samples, &Local)
}

/// Group samples by calendar day in `tz` and summarise at most
/// [`MAX_FORECAST_DAYS`] days, earliest first.
pub fn aggregate_daily_in<Tz: TimeZone>(
    samples: &[RawForecastSample],
    tz: &Tz,
) -> Vec<DailyForecastEntry> {
    let mut buckets: BTreeMap<NaiveDate, Bucket<'_>> = BTreeMap::new();

    for sample in samples {
        let date = sample.timestamp.with_timezone(tz).date_naive();
        buckets.entry(date).or_insert_with(|| Bucket::new(sample)).push(sample);
    }

    buckets
        .into_iter()
        .take(MAX_FORECAST_DAYS)
        .filter_map(|(date, bucket)| {
            let condition = bucket.representative()?;
            Some(DailyForecastEntry {
                date,
                min_temp: round_half_up(bucket.min),
                max_temp: round_half_up(bucket.max),
                condition_label: condition.label.clone(),
                description: condition.description.clone(),
                icon_code: condition.icon_code.clone(),
                category: condition.category(),
            })
        })
        .collect()
}
