//! Service facade tying the pipeline, classifier, geolocation and map together

use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::classifier::ClassificationPolicy;
use crate::config::{AeroSenseConfig, GeolocationMode};
use crate::generator::SampleGenerator;
use crate::geolocation::{
    DeniedPosition, GeolocationProvider, IpGeolocation, LocationFix, acquire_location,
};
use crate::map::{MapView, Marker, TileLayer, TileSources, sensor_stations};
use crate::models::Location;
use crate::pipeline::SamplePipeline;
use crate::remote::{AtmosphericSource, PowerClient};
use crate::state::{AppState, AssessmentReport};

/// What the page needs to draw the map
#[derive(Debug, Serialize, Clone)]
pub struct MapSnapshot {
    pub view: MapView,
    pub tile_url: String,
    pub markers: Vec<Marker>,
}

pub struct AeroSense {
    pipeline: SamplePipeline,
    policy: ClassificationPolicy,
    geolocation: Box<dyn GeolocationProvider>,
    geolocation_timeout: Duration,
    default_location: Location,
    tiles: TileSources,
    state: RwLock<AppState>,
}

impl AeroSense {
    /// Assemble the service from configuration
    pub fn from_config(config: &AeroSenseConfig) -> Result<Self> {
        let remote: Option<Box<dyn AtmosphericSource>> = if config.remote.enabled {
            Some(Box::new(PowerClient::new(&config.remote)?))
        } else {
            None
        };
        let pipeline = SamplePipeline::new(
            remote,
            SampleGenerator::new(config.generator.include_trace_gases),
        );

        let geolocation_timeout = Duration::from_secs(config.location.timeout_seconds.into());
        let geolocation: Box<dyn GeolocationProvider> = match config.location.geolocation {
            GeolocationMode::Ip => Box::new(IpGeolocation::new(
                config.location.lookup_url.clone(),
                geolocation_timeout,
            )?),
            GeolocationMode::Disabled => Box::new(DeniedPosition),
        };

        let default_location = Location::checked(
            config.location.default_latitude,
            config.location.default_longitude,
        )?
        .with_name(config.location.default_name.clone());

        Ok(Self {
            pipeline,
            policy: config.classifier.policy,
            geolocation,
            geolocation_timeout,
            state: RwLock::new(AppState::new(default_location.clone(), config.map.zoom)),
            default_location,
            tiles: TileSources::from_config(&config.map)?,
        })
    }

    #[must_use]
    pub fn with_pipeline(mut self, pipeline: SamplePipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    #[must_use]
    pub fn with_geolocation(mut self, provider: Box<dyn GeolocationProvider>) -> Self {
        self.geolocation = provider;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ClassificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> ClassificationPolicy {
        self.policy
    }

    /// Acquire the position once and make it current
    #[instrument(skip(self))]
    pub async fn locate(&self) -> LocationFix {
        let fix = acquire_location(
            self.geolocation.as_ref(),
            &self.default_location,
            self.geolocation_timeout,
        )
        .await;
        self.state.write().await.apply_fix(&fix);
        fix
    }

    /// Sample the current location and classify it
    #[instrument(skip(self))]
    pub async fn assess(&self) -> AssessmentReport {
        // no lock is held across the fetch
        let location = self.state.read().await.location.clone();
        let sample = self.pipeline.sample(&location).await;
        let assessment = self.policy.classify(&sample);
        info!(
            level = %assessment.level,
            score = assessment.score,
            provenance = sample.provenance().as_str(),
            "Assessment complete"
        );

        let report = AssessmentReport { sample, assessment };
        self.state.write().await.record(report.clone());
        report
    }

    pub fn sensor_markers(&self) -> crate::Result<Vec<Marker>> {
        sensor_stations()
            .iter()
            .map(|s| s.marker(self.policy))
            .collect()
    }

    pub async fn toggle_layer(&self) -> TileLayer {
        self.state.write().await.map.toggle_layer()
    }

    pub async fn map_snapshot(&self) -> crate::Result<MapSnapshot> {
        let state = self.state.read().await;
        let mut markers = self.sensor_markers()?;
        markers.extend(state.user_marker()?);
        Ok(MapSnapshot {
            view: state.map.clone(),
            tile_url: self.tiles.url_for(state.map.layer),
            markers,
        })
    }

    pub async fn state(&self) -> AppState {
        self.state.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geolocation::FixedPosition;
    use crate::models::{ColorToken, Provenance};

    fn offline_config() -> AeroSenseConfig {
        let mut config = AeroSenseConfig::default();
        config.remote.enabled = false;
        config.location.geolocation = GeolocationMode::Disabled;
        config
    }

    #[tokio::test]
    async fn test_offline_assessment_is_simulated() {
        let app = AeroSense::from_config(&offline_config()).unwrap();
        let report = app.assess().await;
        assert_eq!(report.sample.provenance(), Provenance::Simulated);
        assert_eq!(report.sample.location(), &Location::default());
        assert_eq!(app.state().await.last_report, Some(report));
    }

    #[tokio::test]
    async fn test_locate_then_assess_uses_new_location() {
        let here = Location::new(35.68, 139.69).with_name("Tokyo");
        let app = AeroSense::from_config(&offline_config())
            .unwrap()
            .with_geolocation(Box::new(FixedPosition(here.clone())));

        let fix = app.locate().await;
        assert!(!fix.is_fallback());

        let report = app.assess().await;
        assert_eq!(report.sample.location(), &here);

        let snapshot = app.map_snapshot().await.unwrap();
        assert_eq!(snapshot.view.center, here);
        // three stations plus the user marker
        assert_eq!(snapshot.markers.len(), 4);
        assert_ne!(snapshot.markers[3].color, ColorToken::Gray);
    }

    #[tokio::test]
    async fn test_disabled_geolocation_keeps_default() {
        let app = AeroSense::from_config(&offline_config()).unwrap();
        let fix = app.locate().await;
        assert!(fix.is_fallback());
        assert_eq!(fix.location.latitude, 24.7136);
        assert_eq!(fix.location.longitude, 46.6753);
        assert_eq!(app.map_snapshot().await.unwrap().markers.len(), 3);
    }

    #[tokio::test]
    async fn test_toggle_layer_changes_tile_url() {
        let app = AeroSense::from_config(&offline_config()).unwrap();
        assert!(app.map_snapshot().await.unwrap().tile_url.contains("openstreetmap"));
        assert_eq!(app.toggle_layer().await, TileLayer::Satellite);
        assert!(app.map_snapshot().await.unwrap().tile_url.contains("gibs.earthdata.nasa.gov"));
    }

    #[test]
    fn test_policy_from_config() {
        let mut config = offline_config();
        config.classifier.policy = ClassificationPolicy::Union;
        let app = AeroSense::from_config(&config).unwrap();
        assert_eq!(app.policy(), ClassificationPolicy::Union);
        // North Area is High under the union policy
        assert_eq!(app.sensor_markers().unwrap()[1].color, ColorToken::Red);
    }
}
