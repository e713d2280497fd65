//! Route table and shared streaming plumbing

pub mod availability;
pub mod health;
pub mod invitations;
pub mod join_requests;
pub mod matching;
pub mod notifications;
pub mod practices;

use std::convert::Infallible;
use std::sync::Arc;

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post, put};
use axum::Router;
use clinica_core::realtime::ports::ChangeStream;
use futures::Stream;

use crate::context::AppContext;

/// Build the full route table.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/practices", post(practices::create))
        .route("/api/practices/{id}", get(practices::get).patch(practices::update))
        .route("/api/practices/{id}/staff", get(practices::staff))
        .route(
            "/api/practices/{id}/invitations",
            post(invitations::create).get(invitations::list),
        )
        .route("/api/invitations/accept", post(invitations::accept))
        .route("/api/invitations/{id}/revoke", post(invitations::revoke))
        .route(
            "/api/practices/{id}/join-requests",
            post(join_requests::submit).get(join_requests::list),
        )
        .route("/api/join-requests/{id}/approve", post(join_requests::approve))
        .route("/api/join-requests/{id}/reject", post(join_requests::reject))
        .route("/api/me/doctor-profile", put(availability::save_profile))
        .route("/api/me/availability", put(availability::set))
        .route("/api/me/availability/toggle", post(availability::toggle))
        .route("/api/doctors/{user_id}/availability", get(availability::get))
        .route("/api/doctors/{user_id}/availability/stream", get(availability::stream))
        .route("/api/notifications", get(notifications::list))
        .route("/api/notifications/{id}/read", post(notifications::mark_read))
        .route("/api/notifications/stream", get(notifications::stream))
        .route("/api/match", post(matching::find))
        .with_state(ctx)
}

/// Adapt a change stream into an SSE response.
///
/// The subscription is owned by the response stream, so the topic's
/// registration is released when the client disconnects.
pub(crate) fn sse_response(
    subscription: ChangeStream,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = futures::stream::unfold(subscription, |mut subscription| async move {
        loop {
            match subscription.recv().await {
                Some(event) => match Event::default().json_data(&event) {
                    Ok(sse_event) => return Some((Ok(sse_event), subscription)),
                    // An unserializable event is dropped rather than
                    // terminating the stream.
                    Err(_) => continue,
                },
                None => return None,
            }
        }
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
