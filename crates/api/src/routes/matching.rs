//! Physician matching proxy route

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clinica_domain::{ClinicaError, MatchQuery, PhysicianCandidate};
use serde::Serialize;
use tracing::warn;

use crate::auth::Session;
use crate::context::AppContext;
use crate::error::ApiError;

/// Degraded body returned when the upstream model fails: the caller
/// renders "no matches" instead of crashing.
#[derive(Debug, Serialize)]
pub struct DegradedMatches {
    pub error: String,
    pub physicians: Vec<PhysicianCandidate>,
}

/// `POST /api/match`
///
/// Order of failure modes matches the contract: missing session is 401
/// before validation, malformed or oversized input is 400 before any
/// upstream call, and an upstream failure is 500 with an empty candidate
/// list.
pub async fn find(
    State(ctx): State<Arc<AppContext>>,
    Session(user): Session,
    body: Result<Json<MatchQuery>, JsonRejection>,
) -> Response {
    let Json(query) = match body {
        Ok(json) => json,
        Err(rejection) => {
            return ApiError(ClinicaError::Validation(format!(
                "malformed matching query: {rejection}"
            )))
            .into_response();
        }
    };

    match ctx.matching.find_matches(&user, &query).await {
        Ok(matches) => Json(matches).into_response(),
        Err(err @ ClinicaError::Validation(_)) => ApiError(err).into_response(),
        Err(err) => {
            warn!(error = %err, "matching degraded to an empty candidate list");
            let body = DegradedMatches { error: err.to_string(), physicians: Vec::new() };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
