//! Aero-Sense - environmental risk assessment
//!
//! This library provides sample generation (simulated or NASA POWER backed),
//! risk classification, and the map and HTML presentation pieces used by
//! the CLI and the web server.

pub mod api;
pub mod app;
pub mod classifier;
pub mod config;
pub mod error;
pub mod generator;
pub mod geolocation;
pub mod logging;
pub mod map;
pub mod models;
pub mod pipeline;
pub mod remote;
pub mod render;
pub mod state;
pub mod web;

// Re-export core types for public API
pub use app::{AeroSense, MapSnapshot};
pub use classifier::{ClassificationPolicy, classify};
pub use config::AeroSenseConfig;
pub use error::AeroSenseError;
pub use generator::SampleGenerator;
pub use geolocation::{GeolocationError, GeolocationProvider, LocationFix, acquire_location};
pub use models::{
    ColorToken, EnvironmentalSample, Location, Provenance, Readings, RiskAssessment, RiskLevel,
};
pub use pipeline::SamplePipeline;
pub use remote::{AtmosphericSource, PowerClient};
pub use state::{AppState, AssessmentReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AeroSenseError>;
