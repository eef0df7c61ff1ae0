//! Configuration management for the Aero-Sense application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::AeroSenseError;
use crate::classifier::ClassificationPolicy;
use crate::models::location::{DEFAULT_LATITUDE, DEFAULT_LONGITUDE};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Date format used by the POWER API for `start`/`end`
pub const POWER_DATE_FORMAT: &str = "%Y%m%d";

/// Root configuration structure for the Aero-Sense application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AeroSenseConfig {
    /// Remote atmospheric data source
    pub remote: RemoteConfig,
    /// Local sample generator
    pub generator: GeneratorConfig,
    /// Risk classification
    pub classifier: ClassifierConfig,
    /// Default location and geolocation lookup
    pub location: LocationConfig,
    /// Map view and tile sources
    pub map: MapConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Web server
    pub web: WebConfig,
}

/// Remote atmospheric data settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Try the remote source before falling back to simulation
    pub enabled: bool,
    /// Base URL of a NASA POWER compatible API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// POWER community code
    pub community: String,
    /// First day of the queried range (YYYYMMDD)
    pub start_date: String,
    /// Last day of the queried range (YYYYMMDD)
    pub end_date: String,
    /// Remote parameter name for each sample field
    pub parameters: ParameterNames,
}

/// Names of the remote parameters backing each sample field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterNames {
    pub temperature: String,
    pub humidity: String,
    pub pollen_index: String,
    pub pm25: String,
    pub uv_index: String,
    pub wind_speed: String,
    pub air_pressure: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Also simulate CO2, NO2 and ozone
    pub include_trace_gases: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClassifierConfig {
    pub policy: ClassificationPolicy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GeolocationMode {
    /// Look the position up from the public IP address
    #[default]
    Ip,
    /// Never look up; behaves like a denied permission
    Disabled,
}

/// Location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub default_latitude: f64,
    pub default_longitude: f64,
    pub default_name: String,
    pub geolocation: GeolocationMode,
    /// IP geolocation endpoint
    pub lookup_url: String,
    /// Geolocation timeout in seconds
    pub timeout_seconds: u32,
}

/// Map view settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub zoom: u8,
    pub street_tile_url: String,
    /// Satellite tile template; `{date}` is replaced with `satellite_date`
    pub satellite_tile_url: String,
    /// Imagery date (YYYY-MM-DD); yesterday when unset
    pub satellite_date: Option<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// Web server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind: String,
    pub port: u16,
    /// Page shell override; the embedded page is used when unset
    pub page_path: Option<PathBuf>,
}

// Default value functions
fn default_remote_base_url() -> String {
    "https://power.larc.nasa.gov/api".to_string()
}

fn default_remote_timeout() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_zoom() -> u8 {
    10
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_remote_base_url(),
            timeout_seconds: default_remote_timeout(),
            community: "RE".to_string(),
            start_date: "20240101".to_string(),
            end_date: "20240107".to_string(),
            parameters: ParameterNames::default(),
        }
    }
}

impl Default for ParameterNames {
    fn default() -> Self {
        Self {
            temperature: "T2M".to_string(),
            humidity: "RH2M".to_string(),
            pollen_index: "POLLEN".to_string(),
            pm25: "PM25".to_string(),
            uv_index: "ALLSKY_SFC_UV_INDEX".to_string(),
            wind_speed: "WS2M".to_string(),
            air_pressure: "PS".to_string(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            default_latitude: DEFAULT_LATITUDE,
            default_longitude: DEFAULT_LONGITUDE,
            default_name: "Riyadh".to_string(),
            geolocation: GeolocationMode::Ip,
            lookup_url: "http://ip-api.com/json".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
            street_tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            satellite_tile_url: "https://gibs.earthdata.nasa.gov/wmts/epsg3857/best/MODIS_Terra_CorrectedReflectance_TrueColor/default/{date}/GoogleMapsCompatible_Level9/{z}/{y}/{x}.jpg".to_string(),
            satellite_date: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            page_path: None,
        }
    }
}

impl AeroSenseConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // An explicit path must exist; the default location is optional
        match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(AeroSenseError::config(format!(
                        "Config file not found: {}",
                        path.display()
                    ))
                    .into());
                }
                builder = builder.add_source(File::from(path).format(config::FileFormat::Toml));
            }
            None => {
                if let Some(path) = Self::get_config_path().filter(|p| p.exists()) {
                    builder = builder.add_source(
                        File::from(path)
                            .required(false)
                            .format(config::FileFormat::Toml),
                    );
                }
            }
        }

        // Environment overrides, e.g. AEROSENSE_REMOTE__ENABLED=false
        builder = builder.add_source(
            Environment::with_prefix("AEROSENSE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AeroSenseConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("aerosense").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.remote.base_url.is_empty() {
            self.remote.base_url = default_remote_base_url();
        }
        if self.remote.timeout_seconds == 0 {
            self.remote.timeout_seconds = default_remote_timeout();
        }
        if self.location.timeout_seconds == 0 {
            self.location.timeout_seconds = 10;
        }
        if self.map.zoom == 0 {
            self.map.zoom = default_zoom();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_dates()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.remote.timeout_seconds > 300 {
            return Err(AeroSenseError::config("Remote API timeout cannot exceed 300 seconds").into());
        }

        if self.location.timeout_seconds > 60 {
            return Err(AeroSenseError::config("Geolocation timeout cannot exceed 60 seconds").into());
        }

        if self.map.zoom > 19 {
            return Err(AeroSenseError::config("Map zoom must be between 1 and 19").into());
        }

        if !(-90.0..=90.0).contains(&self.location.default_latitude)
            || !(-180.0..=180.0).contains(&self.location.default_longitude)
        {
            return Err(AeroSenseError::config("Default location is not a valid coordinate").into());
        }

        if self.web.port == 0 {
            return Err(AeroSenseError::config("Web port cannot be 0").into());
        }

        Ok(())
    }

    fn validate_dates(&self) -> Result<()> {
        let start = NaiveDate::parse_from_str(&self.remote.start_date, POWER_DATE_FORMAT)
            .map_err(|_| {
                AeroSenseError::config(format!(
                    "Invalid remote start_date '{}', expected YYYYMMDD",
                    self.remote.start_date
                ))
            })?;
        let end = NaiveDate::parse_from_str(&self.remote.end_date, POWER_DATE_FORMAT).map_err(
            |_| {
                AeroSenseError::config(format!(
                    "Invalid remote end_date '{}', expected YYYYMMDD",
                    self.remote.end_date
                ))
            },
        )?;
        if end < start {
            return Err(AeroSenseError::config("Remote end_date is before start_date").into());
        }

        if let Some(date) = &self.map.satellite_date {
            NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                AeroSenseError::config(format!(
                    "Invalid satellite_date '{date}', expected YYYY-MM-DD"
                ))
            })?;
        }
        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AeroSenseError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AeroSenseError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Remote API base URL", &self.remote.base_url),
            ("Geolocation lookup URL", &self.location.lookup_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AeroSenseError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if !self.map.satellite_tile_url.contains("{date}") {
            return Err(
                AeroSenseError::config("Satellite tile URL must contain a {date} token").into(),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AeroSenseConfig::default();
        assert_eq!(config.remote.base_url, "https://power.larc.nasa.gov/api");
        assert_eq!(config.remote.timeout_seconds, 10);
        assert!(config.remote.enabled);
        assert_eq!(config.location.default_latitude, 24.7136);
        assert_eq!(config.location.default_longitude, 46.6753);
        assert_eq!(config.map.zoom, 10);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.classifier.policy, ClassificationPolicy::Weighted);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = AeroSenseConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = AeroSenseConfig::default();
        config.remote.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_date_order() {
        let mut config = AeroSenseConfig::default();
        config.remote.start_date = "20240110".to_string();
        config.remote.end_date = "20240101".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("before"));

        config.remote.end_date = "2024-01-12".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("YYYYMMDD"));
    }

    #[test]
    fn test_satellite_template_needs_date_token() {
        let mut config = AeroSenseConfig::default();
        config.map.satellite_tile_url = "https://example.com/{z}/{x}/{y}.jpg".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_defaults_fills_empty_values() {
        let mut config = AeroSenseConfig::default();
        config.remote.base_url.clear();
        config.logging.format.clear();
        config.map.zoom = 0;
        config.apply_defaults();
        assert_eq!(config.remote.base_url, "https://power.larc.nasa.gov/api");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.map.zoom, 10);
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("aerosense-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            "[classifier]\npolicy = \"union\"\n\n[remote]\nenabled = false\n\n[web]\nport = 9090\n",
        )
        .unwrap();

        let config = AeroSenseConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.classifier.policy, ClassificationPolicy::Union);
        assert!(!config.remote.enabled);
        assert_eq!(config.web.port, 9090);
        // untouched sections keep their defaults
        assert_eq!(config.remote.parameters.temperature, "T2M");

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let result = AeroSenseConfig::load_from_path(Some(PathBuf::from("/nonexistent/aerosense.toml")));
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = AeroSenseConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("aerosense"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
