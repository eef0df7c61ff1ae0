//! Data models for the Aero-Sense application
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates and metadata
//! - Sample: Environmental readings and their documented ranges
//! - Assessment: Risk levels, colour tokens and recommendations

pub mod assessment;
pub mod location;
pub mod sample;

// Re-export all public types for convenient access
pub use assessment::{ColorToken, RiskAssessment, RiskLevel};
pub use location::Location;
pub use sample::{EnvironmentalSample, Provenance, Readings};
