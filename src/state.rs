//! Application state shared by the front-ends

use serde::Serialize;

use crate::geolocation::LocationFix;
use crate::map::{MapView, Marker};
use crate::Result;
use crate::models::{EnvironmentalSample, Location, RiskAssessment};
use crate::render;

/// One sample together with its classification
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AssessmentReport {
    pub sample: EnvironmentalSample,
    pub assessment: RiskAssessment,
}

impl AssessmentReport {
    pub fn to_html(&self) -> Result<String> {
        render::assessment_panel(&self.sample, &self.assessment)
    }
}

/// Everything that changes while the application runs. Updates replace
/// whole fields; concurrent updates are not merged and the last one wins.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AppState {
    pub location: Location,
    pub map: MapView,
    /// Where the user marker goes; `None` until a real fix arrives
    pub user_position: Option<Location>,
    pub last_report: Option<AssessmentReport>,
}

impl AppState {
    #[must_use]
    pub fn new(location: Location, zoom: u8) -> Self {
        Self {
            map: MapView::new(location.clone(), zoom),
            location,
            user_position: None,
            last_report: None,
        }
    }

    /// Adopt a freshly acquired location. A fallback fix recentres the map
    /// but places no user marker.
    pub fn apply_fix(&mut self, fix: &LocationFix) {
        self.location = fix.location.clone();
        self.map.recenter(fix.location.clone());
        self.user_position = (!fix.is_fallback()).then(|| fix.location.clone());
    }

    pub fn record(&mut self, report: AssessmentReport) {
        self.last_report = Some(report);
    }

    /// The user marker, coloured by the latest assessment
    pub fn user_marker(&self) -> Result<Option<Marker>> {
        self.user_position
            .as_ref()
            .map(|position| {
                Marker::user(
                    position.clone(),
                    self.last_report.as_ref().map(|r| &r.assessment),
                )
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::models::sample::readings;
    use crate::models::{ColorToken, Provenance};

    fn report(pollen: f64, pm25: f64) -> AssessmentReport {
        let sample =
            EnvironmentalSample::new(readings(pollen, pm25), Provenance::Simulated, Location::default())
                .unwrap();
        let assessment = classify(&sample);
        AssessmentReport { sample, assessment }
    }

    #[test]
    fn test_fix_recentres_and_places_marker() {
        let mut state = AppState::new(Location::default(), 10);
        let here = Location::new(40.4, -3.7);
        state.apply_fix(&LocationFix {
            location: here.clone(),
            notice: None,
        });
        assert_eq!(state.location, here);
        assert_eq!(state.map.center, here);
        assert_eq!(state.user_marker().unwrap().unwrap().color, ColorToken::Gray);
    }

    #[test]
    fn test_fallback_fix_has_no_user_marker() {
        let mut state = AppState::new(Location::new(1.0, 1.0), 10);
        state.apply_fix(&LocationFix {
            location: Location::default(),
            notice: Some("denied"),
        });
        assert_eq!(state.location, Location::default());
        assert!(state.user_position.is_none());
        assert!(state.user_marker().unwrap().is_none());
    }

    #[test]
    fn test_record_recolours_user_marker_and_last_write_wins() {
        let mut state = AppState::new(Location::default(), 10);
        state.apply_fix(&LocationFix {
            location: Location::new(40.4, -3.7),
            notice: None,
        });

        state.record(report(100.0, 150.0));
        assert_eq!(state.user_marker().unwrap().unwrap().color, ColorToken::Red);

        state.record(report(10.0, 10.0));
        assert_eq!(state.user_marker().unwrap().unwrap().color, ColorToken::Green);
        assert_eq!(state.last_report.as_ref().unwrap().sample.pollen_index(), 10.0);
    }
}
