use std::io;
use thiserror::Error;

/// Custom error type for taskpulse
#[derive(Error, Debug)]
pub enum TaskpulseError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV log error: {0}")]
    Csv(#[from] csv::Error),

    /// A metric name that is not in the catalog, or not rankable as given.
    #[error("Invalid metric '{name}': {reason}")]
    InvalidMetric { name: String, reason: String },

    /// The whole metrics subsystem could not be queried for this tick.
    #[error("Metrics provider unreachable: {0}")]
    ProviderUnreachable(String),

    #[error("TUI error: {0}")]
    Tui(String),
}

/// Result type alias for taskpulse
pub type Result<T> = std::result::Result<T, TaskpulseError>;

impl TaskpulseError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        TaskpulseError::Config(msg.into())
    }

    /// Create an invalid metric error
    pub fn invalid_metric<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        TaskpulseError::InvalidMetric {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn provider_unreachable<S: Into<String>>(msg: S) -> Self {
        TaskpulseError::ProviderUnreachable(msg.into())
    }

    pub fn tui<S: Into<String>>(msg: S) -> Self {
        TaskpulseError::Tui(msg.into())
    }

    /// Whether this error abandons a tick without stopping the loop.
    pub fn is_tick_fatal(&self) -> bool {
        matches!(self, TaskpulseError::ProviderUnreachable(_))
    }
}
