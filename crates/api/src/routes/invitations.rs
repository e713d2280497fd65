//! Invitation routes

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use clinica_domain::{AcceptedInvitation, Invitation, InvitationReceipt, NewInvitation};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Session;
use crate::context::AppContext;
use crate::error::ApiError;

/// `POST /api/practices/{id}/invitations` - admin-only.
///
/// Returns the persisted invitation plus whether the acceptance email
/// went out; a mailer failure degrades the response, it does not fail it.
pub async fn create(
    State(ctx): State<Arc<AppContext>>,
    Session(user): Session,
    Path(practice_id): Path<String>,
    Json(body): Json<NewInvitation>,
) -> Result<Json<InvitationReceipt>, ApiError> {
    let receipt =
        ctx.invitations.create_invitation(&user, &practice_id, body).await.map_err(ApiError)?;
    Ok(Json(receipt))
}

/// `GET /api/practices/{id}/invitations` - admin-only.
pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    Session(user): Session,
    Path(practice_id): Path<String>,
) -> Result<Json<Vec<Invitation>>, ApiError> {
    let invitations =
        ctx.invitations.list_invitations(&user, &practice_id).await.map_err(ApiError)?;
    Ok(Json(invitations))
}

#[derive(Debug, Deserialize)]
pub struct AcceptBody {
    pub token: String,
}

/// `POST /api/invitations/accept` - consume a token for the caller.
pub async fn accept(
    State(ctx): State<Arc<AppContext>>,
    Session(user): Session,
    Json(body): Json<AcceptBody>,
) -> Result<Json<AcceptedInvitation>, ApiError> {
    let accepted =
        ctx.invitations.accept_invitation(&user, &body.token).await.map_err(ApiError)?;
    Ok(Json(accepted))
}

/// `POST /api/invitations/{id}/revoke` - admin-only.
pub async fn revoke(
    State(ctx): State<Arc<AppContext>>,
    Session(user): Session,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    ctx.invitations.revoke_invitation(&user, &id).await.map_err(ApiError)?;
    Ok(Json(json!({ "revoked": true })))
}
