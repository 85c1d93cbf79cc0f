use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::LookupFailure,
    model::{CurrentConditions, ForecastSet, LocationQuery},
};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Anything that can answer current-conditions and forecast queries.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current(&self, query: &LocationQuery) -> Result<CurrentConditions, LookupFailure>;

    async fn forecast(&self, query: &LocationQuery) -> Result<ForecastSet, LookupFailure>;
}

/// Construct the OpenWeather client from config.
pub fn source_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherSource>> {
    let api_key = config.require_api_key()?;
    let client = OpenWeatherClient::builder(api_key)
        .base_url(&config.base_url)
        .timeout_secs(config.timeout_secs)
        .build()?;

    Ok(Box::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = source_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
    }

    #[test]
    fn source_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.api_key = Some("KEY".to_string());

        assert!(source_from_config(&cfg).is_ok());
    }
}
