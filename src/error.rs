//! Error types and handling for the Aero-Sense application

use thiserror::Error;

/// Main error type for the Aero-Sense application
#[derive(Error, Debug)]
pub enum AeroSenseError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Remote atmospheric data errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// The page shell lacks a container the logic writes into
    #[error("Presentation error: {message}")]
    Presentation { message: String },

    /// Fragment rendering errors
    #[error("Template error: {source}")]
    Template {
        #[from]
        source: askama::Error,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl AeroSenseError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn presentation<S: Into<String>>(message: S) -> Self {
        Self::Presentation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AeroSenseError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            AeroSenseError::Api { .. } => {
                "Atmospheric data service unavailable. Using simulated readings.".to_string()
            }
            AeroSenseError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            AeroSenseError::Presentation { message } => {
                format!("Page is missing a required element: {message}")
            }
            AeroSenseError::Template { .. } => {
                "Failed to render the page. Please report this issue.".to_string()
            }
            AeroSenseError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = AeroSenseError::config("bad port");
        assert!(matches!(config_err, AeroSenseError::Config { .. }));

        let api_err = AeroSenseError::api("status 503");
        assert!(matches!(api_err, AeroSenseError::Api { .. }));

        let validation_err = AeroSenseError::validation("pm25 out of range");
        assert!(matches!(validation_err, AeroSenseError::Validation { .. }));
    }

    #[test]
    fn test_user_messages() {
        let api_err = AeroSenseError::api("test");
        assert!(api_err.user_message().contains("simulated"));

        let validation_err = AeroSenseError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));

        let page_err = AeroSenseError::presentation("#result");
        assert!(page_err.user_message().contains("#result"));

        let config_err = AeroSenseError::config("bad port");
        assert!(config_err.user_message().contains("config file"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AeroSenseError = io_err.into();
        assert!(matches!(err, AeroSenseError::Io { .. }));
    }
}
