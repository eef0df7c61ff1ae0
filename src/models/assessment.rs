//! Risk assessment model: levels, colour tokens and recommendations

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Discrete risk category
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    /// Label carried for display; no classification policy produces it
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl RiskLevel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very High",
        }
    }

    #[must_use]
    pub fn color(&self) -> ColorToken {
        match self {
            RiskLevel::Low => ColorToken::Green,
            RiskLevel::Moderate => ColorToken::Orange,
            RiskLevel::High | RiskLevel::VeryHigh => ColorToken::Red,
        }
    }

    #[must_use]
    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskLevel::Low => {
                "Air quality is generally good. Perfect for outdoor activities!"
            }
            RiskLevel::Moderate => {
                "Sensitive groups should limit prolonged outdoor exertion and keep allergy medication at hand."
            }
            RiskLevel::High => {
                "Limit time outdoors, keep windows closed and wear a mask if you must go out."
            }
            RiskLevel::VeryHigh => {
                "Avoid outdoor activities. People with asthma or allergies should stay indoors."
            }
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "moderate" => Ok(RiskLevel::Moderate),
            "high" => Ok(RiskLevel::High),
            "very high" | "very_high" | "veryhigh" => Ok(RiskLevel::VeryHigh),
            other => Err(format!("unknown risk level '{other}'")),
        }
    }
}

/// Colour used for markers and the recommendation banner
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    Green,
    Orange,
    Red,
    Gray,
}

impl ColorToken {
    /// Colour for a free-form level label; unknown labels map to gray
    #[must_use]
    pub fn for_label(label: &str) -> Self {
        label.parse::<RiskLevel>().map_or(ColorToken::Gray, |level| level.color())
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ColorToken::Green => "green",
            ColorToken::Orange => "orange",
            ColorToken::Red => "red",
            ColorToken::Gray => "gray",
        }
    }

    #[must_use]
    pub fn hex(&self) -> &'static str {
        match self {
            ColorToken::Green => "#4CAF50",
            ColorToken::Orange => "#FF9800",
            ColorToken::Red => "#F44336",
            ColorToken::Gray => "#757575",
        }
    }
}

/// Classifier output for one sample
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub color: ColorToken,
    pub recommendation: &'static str,
    /// Weighted pollen/PM2.5 score, reported under every policy
    pub score: f64,
    /// Name of the policy that decided the level
    pub policy: &'static str,
}

impl RiskAssessment {
    #[must_use]
    pub fn new(level: RiskLevel, score: f64, policy: &'static str) -> Self {
        Self {
            level,
            color: level.color(),
            recommendation: level.recommendation(),
            score,
            policy,
        }
    }
}
