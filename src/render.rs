//! HTML fragments for the page containers
//!
//! Fragments are askama templates under `templates/`; interpolated values are
//! HTML-escaped by the template engine.

use askama::Template;

use crate::Result;
use crate::models::{EnvironmentalSample, Location, Provenance, RiskAssessment, RiskLevel};

#[derive(Template)]
#[template(path = "welcome.html")]
struct WelcomeFragment;

#[derive(Template)]
#[template(path = "loading.html")]
struct LoadingFragment;

#[derive(Template)]
#[template(path = "location_notice.html")]
struct LocationNotice<'a> {
    location: &'a Location,
    notice: Option<&'a str>,
}

#[derive(Template)]
#[template(
    source = "<b>{{ name }}</b><br>Pollen Level: {{ \"{:.0}\"|format(pollen_index) }}%<br>PM2.5: {{ \"{:.0}\"|format(pm25) }} µg/m³<br>Risk: <strong>{{ level }}</strong>",
    ext = "html"
)]
struct MarkerPopup<'a> {
    name: &'a str,
    pollen_index: f64,
    pm25: f64,
    level: RiskLevel,
}

#[derive(Template)]
#[template(source = "<b>You are here</b><br>{{ label }}", ext = "html")]
struct UserPopup {
    label: String,
}

#[derive(Template)]
#[template(path = "assessment.html")]
struct AssessmentPanel<'a> {
    sample: &'a EnvironmentalSample,
    assessment: &'a RiskAssessment,
    source: &'static str,
}

pub fn welcome() -> Result<String> {
    Ok(WelcomeFragment.render()?)
}

pub fn loading() -> Result<String> {
    Ok(LoadingFragment.render()?)
}

/// Notice shown after a location lookup
pub fn location_notice(location: &Location, notice: Option<&str>) -> Result<String> {
    Ok(LocationNotice { location, notice }.render()?)
}

/// Popup for a map marker with its two driving readings
pub fn marker_popup(
    name: &str,
    pollen_index: f64,
    pm25: f64,
    assessment: &RiskAssessment,
) -> Result<String> {
    let popup = MarkerPopup {
        name,
        pollen_index,
        pm25,
        level: assessment.level,
    };
    Ok(popup.render()?)
}

pub fn user_popup(location: &Location) -> Result<String> {
    Ok(UserPopup {
        label: location.label(),
    }
    .render()?)
}

/// The risk assessment panel
pub fn assessment_panel(sample: &EnvironmentalSample, assessment: &RiskAssessment) -> Result<String> {
    let source = match sample.provenance() {
        Provenance::Real => "NASA POWER daily point data",
        Provenance::Simulated => "Simulated readings (atmospheric data service unavailable)",
    };
    let panel = AssessmentPanel {
        sample,
        assessment,
        source,
    };
    Ok(panel.render()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::models::sample::readings;

    #[test]
    fn test_static_fragments() {
        assert!(welcome().unwrap().contains("Welcome to Aero-Sense"));
        assert!(loading().unwrap().contains("Fetching atmospheric data"));
    }

    #[test]
    fn test_panel_for_real_sample() {
        let sample = EnvironmentalSample::new(
            readings(45.0, 32.0),
            Provenance::Real,
            Location::default(),
        )
        .unwrap();
        let html = assessment_panel(&sample, &classify(&sample)).unwrap();
        assert!(html.contains(r#"data-provenance="real""#));
        assert!(html.contains("Riyadh"));
        assert!(html.contains("Low risk."));
        assert!(html.contains("#4CAF50"));
        assert!(html.contains("39.8"));
        assert!(!html.contains("Using simulation"));
        assert!(!html.contains("NO₂"));
    }

    #[test]
    fn test_panel_labels_simulation() {
        let mut raw = readings(90.0, 140.0);
        raw.no2 = Some(12.0);
        let sample = EnvironmentalSample::new(
            raw,
            Provenance::Simulated,
            Location::new(1.0, 2.0).with_name("<Main St>"),
        )
        .unwrap();
        let assessment = classify(&sample);
        assert_eq!(assessment.level, RiskLevel::High);

        let html = assessment_panel(&sample, &assessment).unwrap();
        assert!(html.contains("Using simulation"));
        assert!(html.contains("NO₂: <strong>12 ppb</strong>"));
        assert!(html.contains("&lt;Main St&gt;"));
        assert!(!html.contains("<Main St>"));
    }

    #[test]
    fn test_location_notice_variants() {
        let fallback =
            location_notice(&Location::default(), Some("Location access was denied.")).unwrap();
        assert!(fallback.contains("fallback"));
        assert!(fallback.contains("Riyadh"));

        let located =
            location_notice(&Location::new(48.1, 11.6).with_accuracy(35.0), None).unwrap();
        assert!(located.contains("48.1000, 11.6000 ±35 m"));
        assert!(!located.contains("fallback"));
    }

    #[test]
    fn test_marker_popup() {
        let assessment = classify(
            &EnvironmentalSample::new(readings(75.0, 48.0), Provenance::Real, Location::default())
                .unwrap(),
        );
        let html = marker_popup("North Area", 75.0, 48.0, &assessment).unwrap();
        assert_eq!(
            html,
            "<b>North Area</b><br>Pollen Level: 75%<br>PM2.5: 48 µg/m³<br>Risk: <strong>Moderate</strong>"
        );
    }

    #[test]
    fn test_popups_escape_names() {
        let assessment = classify(
            &EnvironmentalSample::new(readings(10.0, 10.0), Provenance::Real, Location::default())
                .unwrap(),
        );
        let html = marker_popup("<i>Depot</i>", 10.0, 10.0, &assessment).unwrap();
        assert!(html.starts_with("<b>&lt;i&gt;Depot"));
        assert!(!html.contains("<i>"));

        let user = user_popup(&Location::new(1.0, 2.0).with_name("A & B")).unwrap();
        assert_eq!(user, "<b>You are here</b><br>A &amp; B");
    }
}
