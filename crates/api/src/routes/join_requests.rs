//! Join-request routes

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use clinica_domain::{JoinRequest, NewJoinRequest, StaffRecord};
use serde_json::{json, Value};

use crate::auth::Session;
use crate::context::AppContext;
use crate::error::ApiError;

/// `POST /api/practices/{id}/join-requests` - a duplicate pending request
/// comes back 409 with the duplicate-request message.
pub async fn submit(
    State(ctx): State<Arc<AppContext>>,
    Session(user): Session,
    Path(practice_id): Path<String>,
    Json(body): Json<NewJoinRequest>,
) -> Result<Json<JoinRequest>, ApiError> {
    let request =
        ctx.join_requests.submit(&user, &practice_id, body).await.map_err(ApiError)?;
    Ok(Json(request))
}

/// `GET /api/practices/{id}/join-requests` - admin-only.
pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    Session(user): Session,
    Path(practice_id): Path<String>,
) -> Result<Json<Vec<JoinRequest>>, ApiError> {
    let requests = ctx.join_requests.list(&user, &practice_id).await.map_err(ApiError)?;
    Ok(Json(requests))
}

/// `POST /api/join-requests/{id}/approve` - admin-only; provisions the
/// requester's staff record.
pub async fn approve(
    State(ctx): State<Arc<AppContext>>,
    Session(user): Session,
    Path(id): Path<String>,
) -> Result<Json<StaffRecord>, ApiError> {
    let record = ctx.join_requests.approve(&user, &id).await.map_err(ApiError)?;
    Ok(Json(record))
}

/// `POST /api/join-requests/{id}/reject` - admin-only.
pub async fn reject(
    State(ctx): State<Arc<AppContext>>,
    Session(user): Session,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    ctx.join_requests.reject(&user, &id).await.map_err(ApiError)?;
    Ok(Json(json!({ "rejected": true })))
}
