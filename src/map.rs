//! Map view, tile sources, markers and the fixed sensor stations

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, Utc};
use serde::Serialize;

use crate::classifier::ClassificationPolicy;
use crate::config::MapConfig;
use crate::AeroSenseError;
use crate::models::{ColorToken, Location, RiskAssessment};
use crate::render;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TileLayer {
    Street,
    Satellite,
}

impl TileLayer {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            TileLayer::Street => TileLayer::Satellite,
            TileLayer::Satellite => TileLayer::Street,
        }
    }
}

/// URL templates for both layers
#[derive(Debug, Clone)]
pub struct TileSources {
    street: String,
    satellite: String,
    satellite_date: NaiveDate,
}

impl TileSources {
    pub fn from_config(config: &MapConfig) -> Result<Self> {
        let satellite_date = match &config.satellite_date {
            Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .with_context(|| format!("Invalid satellite date '{date}'"))?,
            // today's imagery is usually not processed yet
            None => Utc::now()
                .date_naive()
                .checked_sub_days(Days::new(1))
                .unwrap_or_else(|| Utc::now().date_naive()),
        };
        Ok(Self {
            street: config.street_tile_url.clone(),
            satellite: config.satellite_tile_url.clone(),
            satellite_date,
        })
    }

    /// Tile URL template for the layer, with the date token filled in
    #[must_use]
    pub fn url_for(&self, layer: TileLayer) -> String {
        match layer {
            TileLayer::Street => self.street.clone(),
            TileLayer::Satellite => self
                .satellite
                .replace("{date}", &self.satellite_date.format("%Y-%m-%d").to_string()),
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MapView {
    pub center: Location,
    pub zoom: u8,
    pub layer: TileLayer,
}

impl MapView {
    #[must_use]
    pub fn new(center: Location, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            layer: TileLayer::Street,
        }
    }

    pub fn recenter(&mut self, center: Location) {
        self.center = center;
    }

    /// Switch between street and satellite tiles, returning the new layer
    pub fn toggle_layer(&mut self) -> TileLayer {
        self.layer = self.layer.toggled();
        self.layer
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Marker {
    pub location: Location,
    pub label: String,
    pub color: ColorToken,
    /// Fill colour as hex, for the map widget
    pub color_hex: &'static str,
    pub radius: u32,
    pub popup_html: String,
}

impl Marker {
    #[must_use]
    pub fn new(location: Location, label: impl Into<String>, color: ColorToken, popup_html: String) -> Self {
        Self {
            location,
            label: label.into(),
            color,
            color_hex: color.hex(),
            radius: 15,
            popup_html,
        }
    }

    /// The "you are here" marker, coloured by the latest assessment or gray
    /// before the first one
    pub fn user(
        location: Location,
        assessment: Option<&RiskAssessment>,
    ) -> Result<Self, AeroSenseError> {
        let color = assessment.map_or(ColorToken::Gray, |a| a.color);
        let popup = render::user_popup(&location)?;
        let mut marker = Self::new(location, "You are here", color, popup);
        marker.radius = 10;
        Ok(marker)
    }
}

/// A fixed monitoring point with known pollen and PM2.5 readings
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SensorStation {
    pub name: &'static str,
    pub location: Location,
    pub pollen_index: f64,
    pub pm25: f64,
}

impl SensorStation {
    #[must_use]
    pub fn assess(&self, policy: ClassificationPolicy) -> RiskAssessment {
        policy.classify_values(self.pollen_index, self.pm25, None)
    }

    pub fn marker(&self, policy: ClassificationPolicy) -> Result<Marker, AeroSenseError> {
        let assessment = self.assess(policy);
        let popup = render::marker_popup(self.name, self.pollen_index, self.pm25, &assessment)?;
        Ok(Marker::new(
            self.location.clone(),
            self.name,
            assessment.color,
            popup,
        ))
    }
}

/// The three stations around the default centre
#[must_use]
pub fn sensor_stations() -> Vec<SensorStation> {
    let station = |name: &'static str, lat: f64, lon: f64, pollen_index: f64, pm25: f64| SensorStation {
        name,
        location: Location::new(lat, lon).with_name(name),
        pollen_index,
        pm25,
    };
    vec![
        station("Central District", 24.7136, 46.6753, 45.0, 32.0),
        station("North Area", 24.7236, 46.6853, 75.0, 48.0),
        station("South Park", 24.7036, 46.6653, 25.0, 18.0),
    ]
}

/// Stations within `radius_km` of `center`, closest first
#[must_use]
pub fn stations_near(
    center: &Location,
    radius_km: f64,
    stations: &[SensorStation],
) -> Vec<(SensorStation, f64)> {
    let mut results: Vec<(SensorStation, f64)> = stations
        .iter()
        .map(|s| (s.clone(), center.distance_km(&s.location)))
        .filter(|(_, d)| *d <= radius_km)
        .collect();
    results.sort_by(|a, b| a.1.total_cmp(&b.1));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskLevel;

    #[test]
    fn test_toggle_layer_round_trips() {
        let mut view = MapView::new(Location::default(), 10);
        assert_eq!(view.layer, TileLayer::Street);
        assert_eq!(view.toggle_layer(), TileLayer::Satellite);
        assert_eq!(view.toggle_layer(), TileLayer::Street);
    }

    #[test]
    fn test_satellite_url_fills_date() {
        let config = MapConfig {
            satellite_date: Some("2024-10-05".to_string()),
            ..MapConfig::default()
        };
        let tiles = TileSources::from_config(&config).unwrap();
        let url = tiles.url_for(TileLayer::Satellite);
        assert!(url.contains("/2024-10-05/"));
        assert!(!url.contains("{date}"));
        assert!(tiles.url_for(TileLayer::Street).contains("openstreetmap"));
    }

    #[test]
    fn test_default_satellite_date_is_yesterday() {
        let tiles = TileSources::from_config(&MapConfig::default()).unwrap();
        let today = Utc::now().date_naive();
        // today may have rolled over since the tiles were built
        assert!(tiles.satellite_date <= today - Days::new(1));
        assert!(tiles.satellite_date >= today - Days::new(2));
    }

    #[test]
    fn test_station_markers_follow_weighted_policy() {
        let markers: Vec<Marker> = sensor_stations()
            .iter()
            .map(|s| s.marker(ClassificationPolicy::Weighted).unwrap())
            .collect();
        let colors: Vec<ColorToken> = markers.iter().map(|m| m.color).collect();
        assert_eq!(colors, vec![ColorToken::Green, ColorToken::Orange, ColorToken::Green]);
        assert!(markers[1].popup_html.contains("Moderate"));
        assert_eq!(markers[1].color_hex, "#FF9800");
    }

    #[test]
    fn test_station_under_union_policy() {
        let north = &sensor_stations()[1];
        // pollen 75 > 70 trips High under the union policy
        assert_eq!(north.assess(ClassificationPolicy::Union).level, RiskLevel::High);
    }

    #[test]
    fn test_stations_near_sorted_by_distance() {
        let center = Location::new(24.7036, 46.6653);
        let near = stations_near(&center, 5.0, &sensor_stations());
        let names: Vec<&str> = near.iter().map(|(s, _)| s.name).collect();
        assert_eq!(names, vec!["South Park", "Central District", "North Area"]);

        let far = Location::new(48.0, 11.0);
        assert!(stations_near(&far, 50.0, &sensor_stations()).is_empty());
    }

    #[test]
    fn test_user_marker_gray_before_assessment() {
        let marker = Marker::user(Location::default(), None).unwrap();
        assert_eq!(marker.color, ColorToken::Gray);
        assert!(marker.popup_html.contains("Riyadh"));
    }
}
