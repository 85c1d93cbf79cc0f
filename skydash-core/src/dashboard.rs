//! Dashboard state: one displayed report, updated through sequenced searches.
//!
//! Every search takes a [`Ticket`] before its requests go out. When the
//! outcome comes back it is applied against that ticket; outcomes for any
//! ticket other than the most recently issued one are dropped, so a slow
//! response can never overwrite a newer one.

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    error::LookupFailure,
    model::{CurrentConditions, ForecastSet, LocationQuery},
    provider::WeatherSource,
};

/// Current conditions and forecast for the same query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub current: CurrentConditions,
    pub forecast: ForecastSet,
}

/// Fetch current conditions and forecast concurrently; both must succeed.
pub async fn fetch_report(
    source: &dyn WeatherSource,
    query: &LocationQuery,
) -> Result<Report, LookupFailure> {
    let (current, forecast) = tokio::try_join!(source.current(query), source.forecast(query))?;
    Ok(Report { current, forecast })
}

/// Handle for one in-flight search.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    seq: u64,
    query: LocationQuery,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &LocationQuery {
        &self.query
    }
}

/// Result of applying a search outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// The report replaced whatever was displayed.
    Shown,
    /// The search failed; the previous report is still displayed.
    Failed { notice: &'static str, error: LookupFailure },
    /// A newer search was issued after this one; nothing changed.
    Stale,
}

#[derive(Debug, Default)]
pub struct Dashboard {
    issued: u64,
    report: Option<Report>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The report currently on display, if any search has succeeded yet.
    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// Register a new search; any earlier ticket becomes stale.
    pub fn begin(&mut self, query: LocationQuery) -> Ticket {
        self.issued += 1;
        Ticket { seq: self.issued, query }
    }

    pub fn apply(&mut self, ticket: Ticket, outcome: Result<Report, LookupFailure>) -> Update {
        if ticket.seq != self.issued {
            debug!(
                seq = ticket.seq,
                latest = self.issued,
                query = %ticket.query,
                "dropping stale result"
            );
            return Update::Stale;
        }

        match outcome {
            Ok(report) => {
                info!(
                    location = %report.current.location_name,
                    days = report.forecast.days.len(),
                    "weather updated"
                );
                self.report = Some(report);
                Update::Shown
            }
            Err(error) => Update::Failed { notice: failure_notice(&ticket.query), error },
        }
    }

    /// Run one search end to end against `source`.
    pub async fn search(&mut self, source: &dyn WeatherSource, query: LocationQuery) -> Update {
        let ticket = self.begin(query);
        let outcome = fetch_report(source, ticket.query()).await;
        self.apply(ticket, outcome)
    }
}

/// Generic user-facing message for a failed search.
pub fn failure_notice(query: &LocationQuery) -> &'static str {
    match query {
        LocationQuery::City(_) => "City not found. Please try again.",
        LocationQuery::Coordinates(_) => "Unable to fetch weather for your location",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{WeatherCategory, model::DailyForecastEntry};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct FakeSource {
        fail_current: bool,
        fail_forecast: bool,
        calls: AtomicUsize,
    }

    fn current_for(name: &str) -> CurrentConditions {
        CurrentConditions {
            temperature: 20,
            feels_like: 19,
            humidity: 40,
            wind_speed: 7,
            condition_label: "Clear".into(),
            description: "clear sky".into(),
            icon_code: "01d".into(),
            category: WeatherCategory::Sunny,
            location_name: name.into(),
            country_code: "XX".into(),
            utc_offset_seconds: 0,
        }
    }

    fn forecast_for(name: &str) -> ForecastSet {
        ForecastSet {
            location_name: name.into(),
            country_code: "XX".into(),
            days: vec![DailyForecastEntry {
                date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                min_temp: 12,
                max_temp: 24,
                condition_label: "Clear".into(),
                description: "clear sky".into(),
                icon_code: "01d".into(),
                category: WeatherCategory::Sunny,
            }],
        }
    }

    fn report_for(name: &str) -> Report {
        Report { current: current_for(name), forecast: forecast_for(name) }
    }

    #[async_trait]
    impl WeatherSource for FakeSource {
        async fn current(&self, query: &LocationQuery) -> Result<CurrentConditions, LookupFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_current {
                return Err(LookupFailure::new(query.to_string(), "HTTP 404"));
            }
            Ok(current_for(&query.to_string()))
        }

        async fn forecast(&self, query: &LocationQuery) -> Result<ForecastSet, LookupFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_forecast {
                return Err(LookupFailure::new(query.to_string(), "malformed body"));
            }
            Ok(forecast_for(&query.to_string()))
        }
    }

    fn city(name: &str) -> LocationQuery {
        LocationQuery::city(name).unwrap()
    }

    #[tokio::test]
    async fn successful_search_is_shown() {
        let source = FakeSource::default();
        let mut dash = Dashboard::new();

        let update = dash.search(&source, city("Oslo")).await;

        assert_eq!(update, Update::Shown);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(dash.report().unwrap().current.location_name, "Oslo");
        assert_eq!(dash.report().unwrap().forecast.location_name, "Oslo");
    }

    #[tokio::test]
    async fn either_half_failing_fails_the_search() {
        for source in [
            FakeSource { fail_current: true, ..Default::default() },
            FakeSource { fail_forecast: true, ..Default::default() },
        ] {
            let err = fetch_report(&source, &city("Nowhere")).await.unwrap_err();
            assert_eq!(err.query(), "Nowhere");
        }
    }

    #[tokio::test]
    async fn failure_keeps_previous_report() {
        let mut dash = Dashboard::new();
        dash.search(&FakeSource::default(), city("Oslo")).await;

        let failing = FakeSource { fail_forecast: true, ..Default::default() };
        let update = dash.search(&failing, city("Nowhere")).await;

        match update {
            Update::Failed { notice, error } => {
                assert_eq!(notice, "City not found. Please try again.");
                assert_eq!(error.query(), "Nowhere");
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(dash.report().unwrap().current.location_name, "Oslo");
    }

    #[test]
    fn out_of_order_results_are_dropped() {
        let mut dash = Dashboard::new();

        let first = dash.begin(city("Rome"));
        let second = dash.begin(city("Milan"));
        assert!(second.seq() > first.seq());

        assert_eq!(dash.apply(second, Ok(report_for("Milan"))), Update::Shown);
        assert_eq!(dash.apply(first, Ok(report_for("Rome"))), Update::Stale);

        assert_eq!(dash.report().unwrap().current.location_name, "Milan");
    }

    #[test]
    fn stale_failure_is_silent() {
        let mut dash = Dashboard::new();

        let first = dash.begin(city("Rome"));
        let _second = dash.begin(city("Milan"));

        let update = dash.apply(first, Err(LookupFailure::new("Rome", "timeout")));
        assert_eq!(update, Update::Stale);
        assert!(dash.report().is_none());
    }

    #[test]
    fn coordinate_failures_use_location_notice() {
        let q = LocationQuery::coordinates(10.0, 10.0).unwrap();
        assert_eq!(failure_notice(&q), "Unable to fetch weather for your location");
    }
}
