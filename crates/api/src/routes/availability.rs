//! Doctor availability routes, including the live mirror

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use axum::Json;
use clinica_domain::{AvailabilityStatus, DoctorProfile, NewDoctorProfile, Topic};
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::auth::Session;
use crate::context::AppContext;
use crate::error::ApiError;
use crate::routes::sse_response;

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityBody {
    pub status: AvailabilityStatus,
}

/// `PUT /api/me/doctor-profile` - create or update the caller's profile.
pub async fn save_profile(
    State(ctx): State<Arc<AppContext>>,
    Session(user): Session,
    Json(body): Json<NewDoctorProfile>,
) -> Result<Json<DoctorProfile>, ApiError> {
    let profile = ctx.presence.save_profile(&user, body).await.map_err(ApiError)?;
    Ok(Json(profile))
}

/// `GET /api/doctors/{user_id}/availability` - the one-shot fetch a
/// viewer does on mount.
pub async fn get(
    State(ctx): State<Arc<AppContext>>,
    Session(_user): Session,
    Path(user_id): Path<String>,
) -> Result<Json<AvailabilityBody>, ApiError> {
    let status = ctx.presence.availability(&user_id).await.map_err(ApiError)?;
    Ok(Json(AvailabilityBody { status }))
}

/// `PUT /api/me/availability` - explicit write, confirmed before it is
/// returned or published.
pub async fn set(
    State(ctx): State<Arc<AppContext>>,
    Session(user): Session,
    Json(body): Json<AvailabilityBody>,
) -> Result<Json<AvailabilityBody>, ApiError> {
    let status = ctx.presence.set_availability(&user, body.status).await.map_err(ApiError)?;
    Ok(Json(AvailabilityBody { status }))
}

/// `POST /api/me/availability/toggle`
pub async fn toggle(
    State(ctx): State<Arc<AppContext>>,
    Session(user): Session,
) -> Result<Json<AvailabilityBody>, ApiError> {
    let status = ctx.presence.toggle_availability(&user).await.map_err(ApiError)?;
    Ok(Json(AvailabilityBody { status }))
}

/// `GET /api/doctors/{user_id}/availability/stream` - SSE mirror of one
/// doctor's availability; the subscription is released when the client
/// goes away.
pub async fn stream(
    State(ctx): State<Arc<AppContext>>,
    Session(_user): Session,
    Path(user_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = ctx.feed.subscribe(&Topic::Availability { doctor_user_id: user_id });
    sse_response(subscription)
}
