use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{WeatherCategory, category::classify, error::LookupFailure};

/// A validated latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LookupFailure> {
        let coords = Self { latitude, longitude };

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(LookupFailure::new(
                coords.to_string(),
                "latitude must be within -90..90 and longitude within -180..180",
            ));
        }

        Ok(coords)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// What the user asked the weather for: a place name or a position.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates(Coordinates),
}

impl LocationQuery {
    /// Build a city query, rejecting blank names.
    pub fn city(name: impl Into<String>) -> Result<Self, LookupFailure> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(LookupFailure::new(name, "place name must not be empty"));
        }

        Ok(Self::City(trimmed.to_string()))
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Result<Self, LookupFailure> {
        Coordinates::new(latitude, longitude).map(Self::Coordinates)
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::City(name) => f.write_str(name),
            LocationQuery::Coordinates(coords) => write!(f, "{coords}"),
        }
    }
}

/// One upstream condition descriptor (label, free text, icon).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionDescriptor {
    pub label: String,
    pub description: String,
    pub icon_code: String,
}

impl ConditionDescriptor {
    pub fn category(&self) -> WeatherCategory {
        classify(&self.label, &self.icon_code)
    }
}

/// One 3-hour sample of the upstream forecast timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecastSample {
    pub timestamp: DateTime<Utc>,
    pub temp_min: f64,
    pub temp_max: f64,
    pub condition: ConditionDescriptor,
}

/// Current conditions at the queried location, metric units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: i32,
    pub feels_like: i32,
    pub humidity: u8,
    /// km/h
    pub wind_speed: i32,
    pub condition_label: String,
    pub description: String,
    pub icon_code: String,
    pub category: WeatherCategory,
    pub location_name: String,
    pub country_code: String,
    /// Seconds east of UTC at the queried location.
    pub utc_offset_seconds: i32,
}

/// Summary of one calendar day of the forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastEntry {
    pub date: NaiveDate,
    pub min_temp: i32,
    pub max_temp: i32,
    pub condition_label: String,
    pub description: String,
    pub icon_code: String,
    pub category: WeatherCategory,
}

/// Up to six daily summaries, earliest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSet {
    pub location_name: String,
    pub country_code: String,
    pub days: Vec<DailyForecastEntry>,
}

/// Round to the nearest integer, ties toward positive infinity.
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Convert m/s to whole km/h.
pub fn ms_to_kmh(speed_ms: f64) -> i32 {
    round_half_up(speed_ms * 3.6)
}
