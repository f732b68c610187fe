//! Error types for the outfit_colors library

use thiserror::Error;

/// Result type alias for outfit_colors operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Error types for the color extraction and matching pipeline
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Image bytes could not be opened or decoded
    #[error("Failed to load image: {message}")]
    ImageLoad {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The background-isolated image contains no foreground pixels
    #[error("No foreground pixels left after background isolation")]
    EmptyForeground,

    /// Requested cluster count cannot be satisfied by the pixel population
    #[error("Invalid cluster count {requested} (available: {available})")]
    InvalidClusterCount { requested: usize, available: usize },

    /// The background isolation collaborator failed or returned malformed data
    #[error("Background isolation failed: {message}")]
    UpstreamIsolation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Match request is structurally unusable
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Configuration file could not be read, parsed or written
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Run aborted through its cancellation token
    #[error("Pipeline run cancelled")]
    Cancelled,

    /// Run exceeded its caller-supplied deadline
    #[error("Deadline exceeded: {operation} after {elapsed_ms}ms (limit: {limit_ms}ms)")]
    DeadlineExceeded {
        operation: String,
        elapsed_ms: u64,
        limit_ms: u64,
    },
}

impl AnalysisError {
    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoad {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an isolation error with context
    pub fn isolation<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::UpstreamIsolation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an isolation error without an underlying cause
    pub fn isolation_msg(message: impl Into<String>) -> Self {
        Self::UpstreamIsolation {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Check if retrying the same input could succeed
    ///
    /// Clustering and classification are deterministic, so only failures of
    /// the upstream isolation collaborator are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AnalysisError::UpstreamIsolation { .. })
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::ImageLoad { .. } => {
                "Could not read the image. Please check the file format and try again.".to_string()
            }
            AnalysisError::EmptyForeground => {
                "Unable to process image: no clothing could be found in the picture.".to_string()
            }
            AnalysisError::UpstreamIsolation { .. } => {
                "Could not separate the clothing from the background. Please retake the photo and try again.".to_string()
            }
            AnalysisError::Cancelled | AnalysisError::DeadlineExceeded { .. } => {
                "The analysis was stopped before it finished.".to_string()
            }
            _ => "Color analysis failed. Please try with a different image.".to_string(),
        }
    }
}
