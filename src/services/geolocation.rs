use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::config::GeoConfig;
use crate::constants::MAPS_LINK_BASE;

/// Approximate location of the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn maps_link(&self) -> String {
        format!("{MAPS_LINK_BASE}{},{}", self.lat, self.lon)
    }
}

pub trait GeoLocator {
    fn locate(&self) -> impl Future<Output = Result<Location, GeoError>>;
}

#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("failed to build geolocation http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("geolocation request timed out")]
    Timeout,
    #[error("geolocation network error: {0}")]
    Network(String),
    #[error("geolocation response malformed: {0}")]
    Malformed(String),
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for GeoError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Malformed(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// ip-api style lookup: `{"status": "success", "lat": .., "lon": ..}`.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

impl IpGeolocator {
    pub fn new(config: &GeoConfig) -> Result<Self, GeoError> {
        Ok(Self {
            url: config.url.clone(),
            client: super::http_client(config.timeout_secs).map_err(GeoError::Client)?,
        })
    }
}

impl GeoLocator for IpGeolocator {
    async fn locate(&self) -> Result<Location, GeoError> {
        let body: IpApiResponse = self
            .client
            .get(&self.url)
            .send()
            .await?
            .json()
            .await?;

        if body.status != "success" {
            return Err(GeoError::Unavailable(
                body.message.unwrap_or_else(|| format!("status={}", body.status)),
            ));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => {
                tracing::info!(lat, lon, "Location resolved");
                Ok(Location { lat, lon })
            }
            _ => Err(GeoError::Malformed("missing lat/lon".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_link_format() {
        let location = Location {
            lat: 17.385,
            lon: 78.4867,
        };
        assert_eq!(
            location.maps_link(),
            "https://www.google.com/maps?q=17.385,78.4867"
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        let geo = IpGeolocator::new(&GeoConfig {
            url: "http://127.0.0.1:1/json/".to_string(),
            timeout_secs: 1,
        })
        .unwrap();
        let err = geo.locate().await.unwrap_err();
        assert!(matches!(err, GeoError::Network(_) | GeoError::Timeout));
    }
}
