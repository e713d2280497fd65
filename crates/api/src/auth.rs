//! Session extraction
//!
//! Pulls the bearer token off the request and resolves it against the
//! external identity provider before any handler logic runs.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use clinica_domain::{ClinicaError, CurrentUser};

use crate::context::AppContext;
use crate::error::ApiError;

/// The authenticated caller, extracted per request
pub struct Session(pub CurrentUser);

impl FromRequestParts<Arc<AppContext>> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppContext>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError(ClinicaError::Auth("missing bearer token".into())))?;
        let token = header
            .strip_prefix("Bearer ")
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError(ClinicaError::Auth("malformed authorization header".into())))?;

        let user = state.sessions.verify(token).await.map_err(ApiError)?;
        Ok(Self(user))
    }
}
