//! Risk classification
//!
//! Two policies exist. [`ClassificationPolicy::Weighted`] is the
//! canonical one; [`ClassificationPolicy::Union`] is kept as an
//! opt-in alternative and never blended with it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{EnvironmentalSample, RiskAssessment, RiskLevel};

pub const POLLEN_WEIGHT: f64 = 0.6;
pub const PM25_WEIGHT: f64 = 0.4;
pub const HIGH_SCORE: f64 = 70.0;
pub const MODERATE_SCORE: f64 = 40.0;

/// Scores are snapped to this grid so float noise cannot cross a threshold
const SCORE_RESOLUTION: f64 = 1e9;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationPolicy {
    /// `0.6 * pollen + 0.4 * pm25`, High above 70, Moderate above 40
    #[default]
    #[serde(alias = "weighted_score")]
    Weighted,
    /// Any single reading past its own threshold raises the level
    #[serde(alias = "threshold_union")]
    Union,
}

impl ClassificationPolicy {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationPolicy::Weighted => "weighted",
            ClassificationPolicy::Union => "union",
        }
    }

    /// Classify a sample. Total: every valid sample maps to exactly one level.
    #[must_use]
    pub fn classify(&self, sample: &EnvironmentalSample) -> RiskAssessment {
        self.classify_values(sample.pollen_index(), sample.pm25(), sample.no2())
    }

    /// Classify bare readings, e.g. a fixed sensor station that only reports
    /// pollen and PM2.5
    #[must_use]
    pub fn classify_values(&self, pollen_index: f64, pm25: f64, no2: Option<f64>) -> RiskAssessment {
        let score = weighted_score(pollen_index, pm25);
        let level = match self {
            ClassificationPolicy::Weighted => level_for_score(score),
            ClassificationPolicy::Union => union_level(pollen_index, pm25, no2),
        };
        RiskAssessment::new(level, score, self.as_str())
    }
}

impl fmt::Display for ClassificationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassificationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weighted" | "weighted_score" => Ok(ClassificationPolicy::Weighted),
            "union" | "threshold_union" => Ok(ClassificationPolicy::Union),
            other => Err(format!(
                "unknown classification policy '{other}' (expected weighted or union)"
            )),
        }
    }
}

/// Classify with the canonical weighted policy
#[must_use]
pub fn classify(sample: &EnvironmentalSample) -> RiskAssessment {
    ClassificationPolicy::Weighted.classify(sample)
}

/// `0.6 * pollen + 0.4 * pm25`, e.g. (2, 97) is exactly 40 rather than
/// 40.00000000000001
#[must_use]
pub fn weighted_score(pollen_index: f64, pm25: f64) -> f64 {
    let raw = POLLEN_WEIGHT * pollen_index + PM25_WEIGHT * pm25;
    (raw * SCORE_RESOLUTION).round() / SCORE_RESOLUTION
}

/// Thresholds are strict: exactly 70 is Moderate, exactly 40 is Low.
#[must_use]
pub fn level_for_score(score: f64) -> RiskLevel {
    if score > HIGH_SCORE {
        RiskLevel::High
    } else if score > MODERATE_SCORE {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

fn union_level(pollen_index: f64, pm25: f64, no2: Option<f64>) -> RiskLevel {
    let no2_high = no2.is_some_and(|v| v > 50.0);
    if pollen_index > 70.0 || pm25 > 100.0 || no2_high {
        RiskLevel::High
    } else if pollen_index > 40.0 || pm25 > 50.0 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}
