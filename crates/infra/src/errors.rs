//! Infrastructure error type and conversions into the domain error

use clinica_domain::ClinicaError;
use thiserror::Error;

/// Errors raised by infrastructure adapters before they cross into the
/// domain
#[derive(Debug, Error)]
pub enum InfraError {
    /// A UNIQUE index rejected the write; callers map this to the
    /// domain-specific conflict it represents.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("connection pool error: {0}")]
    Pool(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("http transport error: {0}")]
    Http(String),
}

impl InfraError {
    /// Whether this error is the unique-violation case.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }
}

impl From<rusqlite::Error> for InfraError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, ref message) = err {
            let unique = code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY;
            if unique {
                return Self::UniqueViolation(
                    message.clone().unwrap_or_else(|| "unique constraint".into()),
                );
            }
        }
        Self::Database(err.to_string())
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(err: r2d2::Error) -> Self {
        Self::Pool(err.to_string())
    }
}

impl From<reqwest::Error> for InfraError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<InfraError> for ClinicaError {
    fn from(err: InfraError) -> Self {
        match err {
            InfraError::UniqueViolation(message) => Self::Conflict(message),
            InfraError::Database(message) | InfraError::Pool(message) => Self::Database(message),
            InfraError::Timeout(message) | InfraError::Http(message) => Self::Network(message),
        }
    }
}
