//! Error types and handling for the meetpoint engine

use thiserror::Error;

/// Main error type for the meetpoint engine
#[derive(Error, Debug)]
pub enum MeetpointError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Routing provider communication errors
    #[error("Routing provider error: {message}")]
    Provider { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// No usable candidate meeting points
    #[error("No suitable meeting point: {message}")]
    NoCandidates { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    Internal { message: String },
}

impl MeetpointError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new routing provider error
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new no-candidates error
    pub fn no_candidates<S: Into<String>>(message: S) -> Self {
        Self::NoCandidates {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            MeetpointError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            MeetpointError::Provider { .. } => {
                "Unable to reach the routing service. Please check your internet connection."
                    .to_string()
            }
            MeetpointError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            MeetpointError::NoCandidates { message } => {
                format!("No suitable meeting point: {message}")
            }
            MeetpointError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            MeetpointError::Internal { .. } => {
                "Calculation failed. Please try again later.".to_string()
            }
        }
    }
}
