// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    /// The mass of an event has no active duty positions. Non-recoverable
    /// until positions are configured.
    #[error(
        "Not found: no duty positions configured for mass {mass_id} of church {church_id} (event {event_id})"
    )]
    NoPositionsConfigured {
        event_id: String,
        church_id: String,
        mass_id: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Empty position catalog: the caller should report that the service has
    /// no duty positions configured yet
    pub fn is_configuration_fatal(&self) -> bool {
        matches!(self, AppError::NoPositionsConfigured { .. })
    }

    /// Read/write against the repositories failed (or timed out); the queue
    /// item stays queued
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::Timeout(_))
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// by converting to AppError::Database(String)
