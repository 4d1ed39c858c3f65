//! Signed-cookie sessions.
//!
//! The authenticated principal is serialized into a single signed cookie, so
//! there is no server-side session table and the process stays stateless
//! across restarts and replicas. A cookie that fails signature verification
//! simply reads as "no session".

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

use crate::AppState;

pub const SESSION_COOKIE: &str = "orcaflow_session";

/// The authenticated identity carried by the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
}

impl Principal {
    pub fn is_authenticated(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Derives the cookie signing key from the configured secret. Without a
/// secret a random per-process key is used, which invalidates sessions on
/// restart.
pub fn signing_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) if !secret.is_empty() => {
            // Key::from wants at least 64 bytes of key material; a Sha512
            // digest stretches the secret to exactly that.
            let digest = Sha512::digest(secret.as_bytes());
            Key::from(digest.as_slice())
        }
        _ => {
            tracing::warn!(
                "no session secret configured, generating a per-process signing key"
            );
            Key::generate()
        }
    }
}

/// Reads the principal out of the jar, treating missing, tampered and
/// empty-id cookies alike as "not logged in".
pub fn principal_from_jar(jar: &SignedCookieJar) -> Option<Principal> {
    let cookie = jar.get(SESSION_COOKIE)?;
    let principal: Principal = serde_json::from_str(cookie.value()).ok()?;
    principal.is_authenticated().then_some(principal)
}

pub fn store_principal(
    jar: SignedCookieJar,
    principal: &Principal,
) -> Result<SignedCookieJar, serde_json::Error> {
    let value = serde_json::to_string(principal)?;
    let cookie = Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    Ok(jar.add(cookie))
}

pub fn clear_principal(jar: SignedCookieJar) -> SignedCookieJar {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    jar.remove(cookie)
}

/// Route guard: handlers that take a `Principal` argument only run with an
/// authenticated session; everything else is redirected to the login page,
/// which is also how the API routes fail (matching the original behavior of
/// the `login_required` wrapper).
#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| Redirect::to("/"))?;
        principal_from_jar(&jar).ok_or_else(|| Redirect::to("/"))
    }
}
