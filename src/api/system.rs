//! Environment and liveness endpoints.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::SignedCookieJar;
use serde_json::{json, Value};

use crate::session;
use crate::AppState;

/// GET /api/env
///
/// Only the public keys the browser needs to talk to Supabase directly. The
/// service-role key must never appear here.
pub async fn env_keys(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "SUPABASE_URL": state.config.supabase.url,
        "SUPABASE_ANON_KEY": state.config.supabase.anon_key,
    }))
}

/// GET /status
pub async fn status(State(_state): State<AppState>, jar: SignedCookieJar) -> Json<Value> {
    let principal = session::principal_from_jar(&jar);
    Json(json!({
        "status": "ok",
        "env": "axum",
        "user_logged_in": principal.is_some(),
        "user_id": principal.map(|p| p.id).unwrap_or_else(|| "n/a".to_string()),
    }))
}
