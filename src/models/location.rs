//! Location model for geographic coordinates and metadata

use serde::{Deserialize, Serialize};

use crate::AeroSenseError;

/// Latitude of the fallback location used when no position can be acquired
pub const DEFAULT_LATITUDE: f64 = 24.7136;
/// Longitude of the fallback location used when no position can be acquired
pub const DEFAULT_LONGITUDE: f64 = 46.6753;

/// Location coordinates
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Reported accuracy radius in metres, when the source provides one
    pub accuracy_m: Option<f64>,
    /// Display name (city, district, etc.)
    pub name: Option<String>,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m: None,
            name: None,
        }
    }

    /// Create a location after checking the coordinates are on the globe
    pub fn checked(latitude: f64, longitude: f64) -> Result<Self, AeroSenseError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(AeroSenseError::validation(format!(
                "latitude {latitude} outside -90..=90"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(AeroSenseError::validation(format!(
                "longitude {longitude} outside -180..=180"
            )));
        }
        Ok(Self::new(latitude, longitude))
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Name if known, coordinates otherwise
    #[must_use]
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.format_coordinates())
    }

    /// Great-circle distance in kilometres
    #[must_use]
    pub fn distance_km(&self, other: &Location) -> f64 {
        let from = haversine::Location {
            latitude: self.latitude,
            longitude: self.longitude,
        };
        let to = haversine::Location {
            latitude: other.latitude,
            longitude: other.longitude,
        };
        haversine::distance(from, to, haversine::Units::Kilometers)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE).with_name("Riyadh")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_location() {
        let location = Location::default();
        assert_eq!(location.latitude, 24.7136);
        assert_eq!(location.longitude, 46.6753);
        assert_eq!(location.label(), "Riyadh");
    }

    #[test]
    fn test_checked_rejects_off_globe() {
        assert!(Location::checked(91.0, 0.0).is_err());
        assert!(Location::checked(0.0, -180.5).is_err());
        assert!(Location::checked(-90.0, 180.0).is_ok());
    }

    #[test]
    fn test_label_falls_back_to_coordinates() {
        let location = Location::new(24.71364, 46.67531);
        assert_eq!(location.label(), "24.7136, 46.6753");
    }

    #[test]
    fn test_distance_between_nearby_points() {
        let a = Location::new(24.7136, 46.6753);
        let b = Location::new(24.7236, 46.6853);
        let d = a.distance_km(&b);
        assert!(d > 1.0 && d < 2.0, "unexpected distance {d}");
        assert_eq!(a.distance_km(&a), 0.0);
    }
}
