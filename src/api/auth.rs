//! Session bridge: exchanges a Supabase-issued JWT for a first-party
//! signed-cookie session.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::error::ApiError;
use crate::session::{self, Principal};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub token: Option<String>,
    /// Email hint from the client, only used when the identity service does
    /// not return one. Never trusted for authorization.
    #[serde(default)]
    pub email: Option<String>,
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(SignedCookieJar, Json<Value>), ApiError> {
    let token = request.token.as_deref().unwrap_or("").trim();
    let email_hint = request.email.as_deref().unwrap_or("unknown");

    if token.is_empty() {
        tracing::error!("login attempt without a token");
        return Err(ApiError::MissingToken);
    }

    let user = state.identity.resolve_user(token).await.map_err(|e| {
        tracing::error!(email = %email_hint, "token validation failed");
        ApiError::from(e)
    })?;

    let principal = Principal {
        id: user.id,
        email: user.email.unwrap_or_else(|| email_hint.to_string()),
    };

    let jar = session::store_principal(jar, &principal)
        .map_err(|e| ApiError::internal(format!("Falha ao gravar sessão: {e}")))?;

    tracing::info!(email = %principal.email, "session created");
    Ok((jar, Json(json!({ "success": true }))))
}

/// POST /api/logout
pub async fn logout(jar: SignedCookieJar) -> (SignedCookieJar, Json<Value>) {
    tracing::info!("session cleared via /api/logout");
    (session::clear_principal(jar), Json(json!({ "success": true })))
}
