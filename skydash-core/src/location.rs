//! Approximate device location from the public IP address.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{error::LocationError, model::Coordinates};

pub const DEFAULT_LOCATE_URL: &str = "http://ip-api.com/json/";

/// A resolved position plus whatever place names the service returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    pub coordinates: Coordinates,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone)]
pub struct IpLocator {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    city: String,
    #[serde(default)]
    country: String,
}

impl IpLocator {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, LocationError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        Ok(Self { url: url.to_string(), http })
    }

    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn locate(&self) -> Result<Located, LocationError> {
        let res = self
            .http
            .get(&self.url)
            .query(&[("fields", "status,message,country,city,lat,lon")])
            .send()
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(LocationError::Unavailable(format!("HTTP {status}")));
        }

        let body: IpApiResponse =
            res.json().await.map_err(|e| LocationError::Unavailable(e.to_string()))?;

        if body.status != "success" {
            let reason = body.message.unwrap_or_else(|| body.status.clone());
            return Err(LocationError::Rejected(reason));
        }

        let (Some(lat), Some(lon)) = (body.lat, body.lon) else {
            return Err(LocationError::Rejected("response carried no coordinates".into()));
        };

        let coordinates = Coordinates::new(lat, lon)
            .map_err(|e| LocationError::Rejected(e.reason().to_string()))?;

        debug!(%coordinates, city = %body.city, "located");
        Ok(Located { coordinates, city: body.city, country: body.country })
    }
}
