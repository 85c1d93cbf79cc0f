//! Core library for the `skydash` weather dashboard.
//!
//! This crate defines:
//! - The OpenWeather query client (current conditions and forecast)
//! - Daily aggregation of the 3-hour forecast timeline
//! - The shared weather category classifier
//! - Dashboard state with sequenced searches
//! - Configuration & credentials handling
//!
//! It is used by `skydash-cli`, but can also be reused by other frontends.

pub mod aggregate;
pub mod category;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;

pub use aggregate::{MAX_FORECAST_DAYS, aggregate_daily, aggregate_daily_in};
pub use category::{WeatherCategory, classify};
pub use config::Config;
pub use dashboard::{Dashboard, Report, Ticket, Update, fetch_report};
pub use error::{LocationError, LookupFailure};
pub use location::{IpLocator, Located};
pub use model::{
    ConditionDescriptor, Coordinates, CurrentConditions, DailyForecastEntry, ForecastSet,
    LocationQuery, RawForecastSample,
};
pub use provider::{OpenWeatherClient, WeatherSource, source_from_config};
