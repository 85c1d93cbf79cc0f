use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{
    aggregate::aggregate_daily,
    error::LookupFailure,
    model::{
        ConditionDescriptor, Coordinates, CurrentConditions, ForecastSet, LocationQuery,
        RawForecastSample, ms_to_kmh, round_half_up,
    },
};

use super::WeatherSource;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Timeline samples requested from the forecast endpoint (5 days at 3 hours).
pub const FORECAST_SAMPLE_CAP: u32 = 40;

/// Client for the OpenWeather current-weather and 5-day forecast endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

#[derive(Debug)]
pub struct OpenWeatherClientBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenWeatherClientBuilder {
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn build(self) -> reqwest::Result<OpenWeatherClient> {
        let http = Client::builder().timeout(self.timeout).build()?;

        Ok(OpenWeatherClient { api_key: self.api_key, base_url: self.base_url, http })
    }
}

impl OpenWeatherClient {
    pub fn builder(api_key: impl Into<String>) -> OpenWeatherClientBuilder {
        OpenWeatherClientBuilder {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub async fn fetch_current_by_name(
        &self,
        name: &str,
    ) -> Result<CurrentConditions, LookupFailure> {
        self.fetch_current(&LocationQuery::city(name)?).await
    }

    pub async fn fetch_current_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentConditions, LookupFailure> {
        self.fetch_current(&LocationQuery::coordinates(latitude, longitude)?).await
    }

    pub async fn fetch_forecast_by_name(&self, name: &str) -> Result<ForecastSet, LookupFailure> {
        self.fetch_forecast(&LocationQuery::city(name)?).await
    }

    pub async fn fetch_forecast_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ForecastSet, LookupFailure> {
        self.fetch_forecast(&LocationQuery::coordinates(latitude, longitude)?).await
    }

    #[instrument(skip(self), fields(query = %query))]
    pub async fn fetch_current(
        &self,
        query: &LocationQuery,
    ) -> Result<CurrentConditions, LookupFailure> {
        let parsed: OwCurrentResponse = self.get_json("weather", query, &[]).await?;
        let current = parsed
            .into_current()
            .map_err(|reason| LookupFailure::new(query.to_string(), reason))?;

        debug!(
            location = %current.location_name,
            category = %current.category,
            "current conditions"
        );
        Ok(current)
    }

    #[instrument(skip(self), fields(query = %query))]
    pub async fn fetch_forecast(
        &self,
        query: &LocationQuery,
    ) -> Result<ForecastSet, LookupFailure> {
        let cnt = FORECAST_SAMPLE_CAP.to_string();
        let parsed: OwForecastResponse =
            self.get_json("forecast", query, &[("cnt", cnt.as_str())]).await?;

        let samples = parsed
            .list
            .into_iter()
            .map(OwForecastEntry::into_sample)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|reason| LookupFailure::new(query.to_string(), reason))?;

        let days = aggregate_daily(&samples);
        debug!(samples = samples.len(), days = days.len(), "forecast aggregated");

        Ok(ForecastSet {
            location_name: parsed.city.name,
            country_code: parsed.city.country,
            days,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &LocationQuery,
        extra: &[(&'static str, &str)],
    ) -> Result<T, LookupFailure> {
        let url = format!("{}/{endpoint}", self.base_url);
        let fail = |reason: String| {
            warn!(%url, %reason, "weather lookup failed");
            LookupFailure::new(query.to_string(), reason)
        };

        let mut params = location_params(query);
        params.push(("appid", self.api_key.clone()));
        params.push(("units", "metric".to_string()));
        params.extend(extra.iter().map(|(k, v)| (*k, v.to_string())));

        debug!(%url, "sending request");

        let res = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| fail(format!("request to OpenWeather {endpoint} failed: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| fail(format!("failed to read OpenWeather {endpoint} body: {e}")))?;

        if !status.is_success() {
            return Err(fail(format!(
                "OpenWeather {endpoint} request failed with status {status}: {}",
                truncate_body(&body)
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| fail(format!("unexpected OpenWeather {endpoint} response shape: {e}")))
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current(&self, query: &LocationQuery) -> Result<CurrentConditions, LookupFailure> {
        self.fetch_current(query).await
    }

    async fn forecast(&self, query: &LocationQuery) -> Result<ForecastSet, LookupFailure> {
        self.fetch_forecast(query).await
    }
}

fn location_params(query: &LocationQuery) -> Vec<(&'static str, String)> {
    match query {
        LocationQuery::City(name) => vec![("q", name.clone())],
        LocationQuery::Coordinates(Coordinates { latitude, longitude }) => {
            vec![("lat", latitude.to_string()), ("lon", longitude.to_string())]
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Clone, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

impl From<OwWeather> for ConditionDescriptor {
    fn from(w: OwWeather) -> Self {
        ConditionDescriptor { label: w.main, description: w.description, icon_code: w.icon }
    }
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
    timezone: i32,
}

impl OwCurrentResponse {
    fn into_current(self) -> Result<CurrentConditions, String> {
        if self.main.humidity > 100 {
            return Err(format!("humidity out of range: {}", self.main.humidity));
        }

        let condition: ConditionDescriptor = first_condition(self.weather)?;
        let category = condition.category();

        Ok(CurrentConditions {
            temperature: round_half_up(self.main.temp),
            feels_like: round_half_up(self.main.feels_like),
            humidity: self.main.humidity,
            wind_speed: ms_to_kmh(self.wind.speed),
            condition_label: condition.label,
            description: condition.description,
            icon_code: condition.icon_code,
            category,
            location_name: self.name,
            country_code: self.sys.country,
            utc_offset_seconds: self.timezone,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwTempRange {
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwTempRange,
    weather: Vec<OwWeather>,
}

impl OwForecastEntry {
    fn into_sample(self) -> Result<RawForecastSample, String> {
        let timestamp = DateTime::<Utc>::from_timestamp(self.dt, 0)
            .ok_or_else(|| format!("forecast timestamp out of range: {}", self.dt))?;

        Ok(RawForecastSample {
            timestamp,
            temp_min: self.main.temp_min,
            temp_max: self.main.temp_max,
            condition: first_condition(self.weather)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

fn first_condition(weather: Vec<OwWeather>) -> Result<ConditionDescriptor, String> {
    weather
        .into_iter()
        .next()
        .map(ConditionDescriptor::from)
        .ok_or_else(|| "response has no weather condition".to_string())
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
