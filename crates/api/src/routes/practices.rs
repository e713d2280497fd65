//! Practice routes

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use clinica_domain::{NewPractice, Practice, PracticeUpdate, StaffRecord};

use crate::auth::Session;
use crate::context::AppContext;
use crate::error::ApiError;

/// `POST /api/practices` - onboard a practice with the caller as owner.
pub async fn create(
    State(ctx): State<Arc<AppContext>>,
    Session(user): Session,
    Json(body): Json<NewPractice>,
) -> Result<Json<Practice>, ApiError> {
    let practice = ctx.practices.create_practice(&user, body).await.map_err(ApiError)?;
    Ok(Json(practice))
}

/// `GET /api/practices/{id}`
pub async fn get(
    State(ctx): State<Arc<AppContext>>,
    Session(_user): Session,
    Path(id): Path<String>,
) -> Result<Json<Practice>, ApiError> {
    let practice = ctx.practices.get_practice(&id).await.map_err(ApiError)?;
    Ok(Json(practice))
}

/// `PATCH /api/practices/{id}` - admin-only partial update.
pub async fn update(
    State(ctx): State<Arc<AppContext>>,
    Session(user): Session,
    Path(id): Path<String>,
    Json(body): Json<PracticeUpdate>,
) -> Result<Json<Practice>, ApiError> {
    let practice = ctx.practices.update_practice(&user, &id, body).await.map_err(ApiError)?;
    Ok(Json(practice))
}

/// `GET /api/practices/{id}/staff` - roster, members only.
pub async fn staff(
    State(ctx): State<Arc<AppContext>>,
    Session(user): Session,
    Path(id): Path<String>,
) -> Result<Json<Vec<StaffRecord>>, ApiError> {
    let roster = ctx.practices.roster(&user, &id).await.map_err(ApiError)?;
    Ok(Json(roster))
}
