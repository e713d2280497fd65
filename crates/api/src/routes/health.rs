//! Liveness endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::error::ApiError;

/// Report service and database health.
pub async fn health(State(ctx): State<Arc<AppContext>>) -> Result<Json<Value>, ApiError> {
    ctx.db.health_check().map_err(ApiError)?;
    Ok(Json(json!({ "status": "ok" })))
}
