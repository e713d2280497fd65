//! Error-to-response mapping
//!
//! Every handler converts domain errors into a JSON body and an HTTP
//! status; nothing panics and nothing is retried.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clinica_domain::ClinicaError;
use serde::Serialize;

/// A domain error crossing the HTTP boundary
#[derive(Debug)]
pub struct ApiError(pub ClinicaError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// The status this error maps to.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ClinicaError::Validation(_) => StatusCode::BAD_REQUEST,
            ClinicaError::Auth(_) => StatusCode::UNAUTHORIZED,
            ClinicaError::Forbidden(_) => StatusCode::FORBIDDEN,
            ClinicaError::NotFound(_) => StatusCode::NOT_FOUND,
            ClinicaError::Conflict(_) => StatusCode::CONFLICT,
            ClinicaError::Expired(_) => StatusCode::GONE,
            ClinicaError::Upstream(_)
            | ClinicaError::Database(_)
            | ClinicaError::Config(_)
            | ClinicaError::Network(_)
            | ClinicaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ClinicaError> for ApiError {
    fn from(err: ClinicaError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody { error: self.0.to_string() };
        (status, Json(body)).into_response()
    }
}
