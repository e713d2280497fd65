//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Clinica
///
/// The variants follow the portal's error taxonomy: validation failures are
/// caught before any I/O, authorization failures map to 401/403 responses,
/// conflicts cover duplicate join requests and consumed invitation tokens,
/// and upstream failures cover the external email and model-gateway
/// integrations.
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ClinicaError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Expired: {0}")]
    Expired(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Clinica operations
pub type Result<T> = std::result::Result<T, ClinicaError>;
