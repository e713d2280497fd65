//! Notification feed routes

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use axum::Json;
use clinica_domain::{NotificationFeed, Topic};
use futures::Stream;

use crate::auth::Session;
use crate::context::AppContext;
use crate::error::ApiError;
use crate::routes::sse_response;

/// `GET /api/notifications` - the 10 newest rows plus the unread count.
pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    Session(user): Session,
) -> Result<Json<NotificationFeed>, ApiError> {
    let feed = ctx.notifications.feed(&user).await.map_err(ApiError)?;
    Ok(Json(feed))
}

/// `POST /api/notifications/{id}/read` - recipient-only; returns the
/// fresh feed so the caller renders confirmed state.
pub async fn mark_read(
    State(ctx): State<Arc<AppContext>>,
    Session(user): Session,
    Path(id): Path<String>,
) -> Result<Json<NotificationFeed>, ApiError> {
    let feed = ctx.notifications.mark_as_read(&user, &id).await.map_err(ApiError)?;
    Ok(Json(feed))
}

/// `GET /api/notifications/stream` - live inserts for the caller.
pub async fn stream(
    State(ctx): State<Arc<AppContext>>,
    Session(user): Session,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = ctx.feed.subscribe(&Topic::Notifications { user_id: user.id });
    sse_response(subscription)
}
