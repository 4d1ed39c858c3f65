pub mod api;
pub mod backend;
pub mod config;
pub mod session;
pub mod ui;

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::backend::{IdentityService, TemplateStore};
use crate::config::Config;

/// Shared application state. Cheap to clone: the backends are behind `Arc`
/// and `Key` clones its key material.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub identity: Arc<dyn IdentityService>,
    pub store: Arc<dyn TemplateStore>,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(
        config: Config,
        identity: Arc<dyn IdentityService>,
        store: Arc<dyn TemplateStore>,
    ) -> Self {
        let cookie_key = session::signing_key(config.session.secret.as_deref());
        Self {
            config,
            identity,
            store,
            cookie_key,
        }
    }
}

/// Lets the signed cookie jar extractor find the signing key in the app state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.cookie_key.clone()
    }
}
