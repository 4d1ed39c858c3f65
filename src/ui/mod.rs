//! HTML pages: login, dashboard, template config and the public quote page.
//! Guarding is redirect-based; an unauthenticated request for a protected
//! page lands back on the login page, never on an error body.

mod templates;

use askama::Template;
use axum::{
    extract::Path,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::SignedCookieJar;

use crate::session::{self, Principal};
use crate::AppState;

pub use templates::*;

// Helper to render templates and handle errors
fn render_template<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Template error: {}", e),
        )
            .into_response(),
    }
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(login_page))
        .route("/index.html", get(login_page))
        .route("/dashboard.html", get(dashboard_page))
        .route("/config.html", get(config_page))
        .route("/orcamento/:template_id", get(quote_page))
        .route("/logout", get(logout_page))
}

async fn login_page(jar: SignedCookieJar) -> Response {
    // Already logged in? Straight to the dashboard.
    if session::principal_from_jar(&jar).is_some() {
        return Redirect::to("/dashboard.html").into_response();
    }
    render_template(LoginTemplate {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn dashboard_page(principal: Principal) -> Response {
    render_template(DashboardTemplate {
        email: principal.email,
    })
}

async fn config_page(principal: Principal) -> Response {
    render_template(ConfigTemplate {
        email: principal.email,
    })
}

async fn quote_page(Path(template_id): Path<String>) -> Response {
    render_template(QuoteTemplate { template_id })
}

async fn logout_page(jar: SignedCookieJar) -> (SignedCookieJar, Redirect) {
    tracing::info!("session cleared via /logout");
    (session::clear_principal(jar), Redirect::to("/"))
}
