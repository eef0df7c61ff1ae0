//! One-shot position lookup with fallback to the default location

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::models::Location;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeolocationError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("position unavailable: {0}")]
    PositionUnavailable(String),

    #[error("timed out")]
    Timeout,
}

impl GeolocationError {
    /// Message shown to the user next to the map
    #[must_use]
    pub fn notice(&self) -> &'static str {
        match self {
            GeolocationError::PermissionDenied => {
                "Location access was denied. Showing the default location."
            }
            GeolocationError::PositionUnavailable(_) => {
                "Your location is unavailable. Showing the default location."
            }
            GeolocationError::Timeout => {
                "Locating you took too long. Showing the default location."
            }
        }
    }
}

#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Location, GeolocationError>;
}

/// Coordinates supplied by the user
pub struct FixedPosition(pub Location);

#[async_trait]
impl GeolocationProvider for FixedPosition {
    async fn current_position(&self) -> Result<Location, GeolocationError> {
        Ok(self.0.clone())
    }
}

/// Geolocation switched off
pub struct DeniedPosition;

#[async_trait]
impl GeolocationProvider for DeniedPosition {
    async fn current_position(&self) -> Result<Location, GeolocationError> {
        Err(GeolocationError::PermissionDenied)
    }
}

/// Looks the position up from the caller's public IP (ip-api.com format)
pub struct IpGeolocation {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
}

impl IpGeolocation {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl GeolocationProvider for IpGeolocation {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn current_position(&self) -> Result<Location, GeolocationError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                GeolocationError::Timeout
            } else {
                GeolocationError::PositionUnavailable(e.to_string())
            }
        })?;

        let body: IpLookupResponse = response
            .error_for_status()
            .map_err(|e| GeolocationError::PositionUnavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| GeolocationError::PositionUnavailable(e.to_string()))?;

        if body.status != "success" {
            return Err(GeolocationError::PositionUnavailable(
                body.message.unwrap_or(body.status),
            ));
        }

        let (Some(lat), Some(lon)) = (body.lat, body.lon) else {
            return Err(GeolocationError::PositionUnavailable(
                "lookup returned no coordinates".to_string(),
            ));
        };

        let location = Location::checked(lat, lon)
            .map_err(|e| GeolocationError::PositionUnavailable(e.to_string()))?;
        debug!(lat, lon, "IP geolocation succeeded");
        Ok(match body.city {
            Some(city) => location.with_name(city),
            None => location,
        })
    }
}

/// Result of a location acquisition; never an error
#[derive(Debug, Clone, Serialize)]
pub struct LocationFix {
    pub location: Location,
    /// Set when the default was used
    pub notice: Option<&'static str>,
}

impl LocationFix {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.notice.is_some()
    }
}

/// Query the provider once. Any error or a timeout yields the default
/// location together with a user-facing notice.
pub async fn acquire_location(
    provider: &dyn GeolocationProvider,
    default: &Location,
    timeout: Duration,
) -> LocationFix {
    let outcome = tokio::time::timeout(timeout, provider.current_position())
        .await
        .unwrap_or(Err(GeolocationError::Timeout));

    match outcome {
        Ok(location) => {
            info!("Located at {}", location.format_coordinates());
            LocationFix {
                location,
                notice: None,
            }
        }
        Err(e) => {
            warn!("Geolocation failed ({e}), using default location");
            LocationFix {
                location: default.clone(),
                notice: Some(e.notice()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unavailable;

    #[async_trait]
    impl GeolocationProvider for Unavailable {
        async fn current_position(&self) -> Result<Location, GeolocationError> {
            Err(GeolocationError::PositionUnavailable("no fix".to_string()))
        }
    }

    struct Hanging;

    #[async_trait]
    impl GeolocationProvider for Hanging {
        async fn current_position(&self) -> Result<Location, GeolocationError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_fixed_position_is_used() {
        let wanted = Location::new(51.5, -0.12).with_accuracy(20.0);
        let fix = acquire_location(
            &FixedPosition(wanted.clone()),
            &Location::default(),
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(fix.location, wanted);
        assert!(!fix.is_fallback());
    }

    #[tokio::test]
    async fn test_denied_falls_back_to_default() {
        let fix = acquire_location(&DeniedPosition, &Location::default(), Duration::from_secs(1)).await;
        assert_eq!(fix.location.latitude, 24.7136);
        assert_eq!(fix.location.longitude, 46.6753);
        assert!(fix.notice.unwrap().contains("denied"));
    }

    #[tokio::test]
    async fn test_unavailable_falls_back_to_default() {
        let fix = acquire_location(&Unavailable, &Location::default(), Duration::from_secs(1)).await;
        assert_eq!(fix.location, Location::default());
        assert!(fix.notice.unwrap().contains("unavailable"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back_to_default() {
        let fix = acquire_location(&Hanging, &Location::default(), Duration::from_secs(5)).await;
        assert_eq!(fix.location, Location::default());
        assert!(fix.notice.unwrap().contains("too long"));
    }

    #[tokio::test]
    async fn test_unreachable_ip_lookup_is_unavailable() {
        let provider =
            IpGeolocation::new("http://127.0.0.1:9/json", Duration::from_secs(2)).unwrap();
        let err = provider.current_position().await.unwrap_err();
        assert!(matches!(
            err,
            GeolocationError::PositionUnavailable(_) | GeolocationError::Timeout
        ));
    }
}
