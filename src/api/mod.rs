pub mod auth;
pub mod error;
mod system;
mod templates;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{ui, AppState};

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route(
            "/templates",
            get(templates::list_templates)
                .post(templates::create_template)
                .delete(templates::delete_template),
        )
        .route("/env", get(system::env_keys));

    Router::new()
        .route("/status", get(system::status))
        .nest("/api", api_routes)
        .merge(ui::create_router())
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{MemoryStore, StaticIdentity};
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{header, Request, Response, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.supabase.url = "https://proj.supabase.co".to_string();
        config.supabase.anon_key = "anon-key".to_string();
        config.supabase.service_role_key = "service-role-secret".to_string();
        config.session.secret = Some("uma-chave-bem-longa-para-testes".to_string());
        config
    }

    fn two_user_identity() -> StaticIdentity {
        StaticIdentity::default()
            .with_user("token-a", "user-a", Some("ana@example.com"))
            .with_user("token-b", "user-b", None)
    }

    fn app_with(identity: StaticIdentity, store: Arc<MemoryStore>) -> Router {
        let state = AppState::new(test_config(), Arc::new(identity), store);
        create_router(state)
    }

    fn app() -> Router {
        app_with(two_user_identity(), Arc::new(MemoryStore::default()))
    }

    async fn body_json(response: Response<Body>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// Logs in and returns the session cookie value for follow-up requests.
    async fn login(app: &Router, token: &str) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/login",
                &format!(r#"{{"token":"{token}"}}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("login must set the session cookie")
            .to_str()
            .unwrap();
        cookie.split(';').next().unwrap().to_string()
    }

    fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
        request
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        request
    }

    // ---- login -----------------------------------------------------------

    #[tokio::test]
    async fn test_login_with_valid_token_creates_session() {
        let app = app();
        let cookie = login(&app, "token-a").await;
        assert!(cookie.starts_with("orcaflow_session="));

        let response = app
            .oneshot(with_cookie(
                Request::builder().uri("/status").body(Body::empty()).unwrap(),
                &cookie,
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["user_logged_in"], true);
        assert_eq!(body["user_id"], "user-a");
    }

    #[tokio::test]
    async fn test_login_without_token_is_rejected() {
        for body in [r#"{}"#, r#"{"token":""}"#, r#"{"token":"   "}"#] {
            let response = app()
                .oneshot(json_request("POST", "/api/login", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert!(response.headers().get(header::SET_COOKIE).is_none());
            let body = body_json(response).await;
            assert_eq!(body["error"], "Token não fornecido");
        }
    }

    #[tokio::test]
    async fn test_login_with_invalid_token_is_401() {
        let response = app()
            .oneshot(json_request("POST", "/api/login", r#"{"token":"bad"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Sessão inválida. Faça o login novamente.");
    }

    #[tokio::test]
    async fn test_login_identity_outage_is_500() {
        let app = app_with(StaticIdentity::failing(), Arc::new(MemoryStore::default()));
        let response = app
            .oneshot(json_request("POST", "/api/login", r#"{"token":"token-a"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Erro interno do servidor.");
    }

    #[tokio::test]
    async fn test_login_uses_email_hint_when_identity_has_none() {
        let app = app();
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/login",
                r#"{"token":"token-b","email":"bia@example.com"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        // The hint ends up as the principal's email, visible on the dashboard.
        let response = app
            .oneshot(with_cookie(
                Request::builder()
                    .uri("/dashboard.html")
                    .body(Body::empty())
                    .unwrap(),
                &cookie,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("bia@example.com"));
    }

    #[tokio::test]
    async fn test_api_logout_clears_session() {
        let app = app();
        let cookie = login(&app, "token-a").await;

        let response = app
            .clone()
            .oneshot(with_cookie(
                json_request("POST", "/api/logout", ""),
                &cookie,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["success"], true);
    }

    // ---- guard -----------------------------------------------------------

    #[tokio::test]
    async fn test_guarded_routes_redirect_without_session() {
        for uri in ["/api/templates", "/dashboard.html", "/config.html"] {
            let response = app()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(response.headers()[header::LOCATION], "/");
        }
    }

    #[tokio::test]
    async fn test_tampered_cookie_is_not_a_session() {
        let forged = format!(
            "orcaflow_session={}",
            r#"{"id":"user-a","email":"ana@example.com"}"#
        );
        let response = app()
            .oneshot(with_cookie(
                Request::builder()
                    .uri("/api/templates")
                    .body(Body::empty())
                    .unwrap(),
                &forged,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    // ---- templates -------------------------------------------------------

    #[tokio::test]
    async fn test_create_template_forces_owner_and_defaults() {
        let app = app();
        let cookie = login(&app, "token-a").await;

        let response = app
            .oneshot(with_cookie(
                json_request(
                    "POST",
                    "/api/templates",
                    r#"{"nome_template":"Casamento","user_id":"someone-else"}"#,
                ),
                &cookie,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["user_id"], "user-a");
        assert_eq!(body["data"]["nome_template"], "Casamento");
        assert_eq!(body["data"]["produtos"], serde_json::json!([]));
        assert_eq!(body["data"]["cupons"], serde_json::json!([]));
        assert!(body["data"]["id"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_list_is_isolated_per_owner() {
        let app = app();
        let cookie_a = login(&app, "token-a").await;
        let cookie_b = login(&app, "token-b").await;

        let response = app
            .clone()
            .oneshot(with_cookie(
                json_request("POST", "/api/templates", r#"{"nome_template":"Da Ana"}"#),
                &cookie_a,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(with_cookie(
                Request::builder()
                    .uri("/api/templates")
                    .body(Body::empty())
                    .unwrap(),
                &cookie_b,
            ))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["data"], serde_json::json!([]));

        let response = app
            .oneshot(with_cookie(
                Request::builder()
                    .uri("/api/templates")
                    .body(Body::empty())
                    .unwrap(),
                &cookie_a,
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["nome_template"], "Da Ana");
        assert_eq!(body["data"][0]["user_id"], "user-a");
    }

    #[tokio::test]
    async fn test_delete_requires_id() {
        let app = app();
        let cookie = login(&app, "token-a").await;

        for uri in ["/api/templates", "/api/templates?id="] {
            let response = app
                .clone()
                .oneshot(with_cookie(
                    Request::builder()
                        .method("DELETE")
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                    &cookie,
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body_json(response).await["error"], "Parâmetro 'id' obrigatório");
        }
    }

    #[tokio::test]
    async fn test_delete_of_foreign_template_is_a_counted_noop() {
        let store = Arc::new(MemoryStore::default());
        let app = app_with(two_user_identity(), store.clone());
        let cookie_a = login(&app, "token-a").await;
        let cookie_b = login(&app, "token-b").await;

        let response = app
            .clone()
            .oneshot(with_cookie(
                json_request("POST", "/api/templates", r#"{"nome_template":"Da Ana"}"#),
                &cookie_a,
            ))
            .await
            .unwrap();
        let id = body_json(response).await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        // Someone else's id: still 200, zero rows gone.
        let response = app
            .clone()
            .oneshot(with_cookie(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/templates?id={id}"))
                    .body(Body::empty())
                    .unwrap(),
                &cookie_b,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["deleted_count"], 0);
        assert_eq!(store.row_count(), 1);

        // The owner can delete it.
        let response = app
            .oneshot(with_cookie(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/templates?id={id}"))
                    .body(Body::empty())
                    .unwrap(),
                &cookie_a,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["deleted_count"], 1);
        assert_eq!(store.row_count(), 0);
    }

    #[tokio::test]
    async fn test_insert_without_returned_row_is_500() {
        let mut store = MemoryStore::default();
        store.insert_returns_no_row = true;
        let app = app_with(two_user_identity(), Arc::new(store));
        let cookie = login(&app, "token-a").await;

        let response = app
            .oneshot(with_cookie(
                json_request("POST", "/api/templates", r#"{"nome_template":"X"}"#),
                &cookie,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["error"],
            "Nenhum dado retornado após a inserção."
        );
    }

    #[tokio::test]
    async fn test_store_outage_is_500() {
        let mut store = MemoryStore::default();
        store.fail_with_service_error = true;
        let app = app_with(two_user_identity(), Arc::new(store));
        let cookie = login(&app, "token-a").await;

        let response = app
            .oneshot(with_cookie(
                Request::builder()
                    .uri("/api/templates")
                    .body(Body::empty())
                    .unwrap(),
                &cookie,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    // ---- env & status ----------------------------------------------------

    #[tokio::test]
    async fn test_env_exposes_only_public_keys() {
        let response = app()
            .oneshot(Request::builder().uri("/api/env").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let raw = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!raw.contains("service-role-secret"));

        let body: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(body["SUPABASE_URL"], "https://proj.supabase.co");
        assert_eq!(body["SUPABASE_ANON_KEY"], "anon-key");
        assert_eq!(body.as_object().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_status_without_session() {
        let response = app()
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["env"], "axum");
        assert_eq!(body["user_logged_in"], false);
        assert_eq!(body["user_id"], "n/a");
    }

    // ---- pages -----------------------------------------------------------

    #[tokio::test]
    async fn test_login_page_redirects_when_authenticated() {
        let app = app();

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = login(&app, "token-a").await;
        let response = app
            .oneshot(with_cookie(
                Request::builder().uri("/").body(Body::empty()).unwrap(),
                &cookie,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/dashboard.html");
    }

    #[tokio::test]
    async fn test_quote_page_is_public() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/orcamento/some-template-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("some-template-id"));
    }

    #[tokio::test]
    async fn test_logout_page_clears_and_redirects() {
        let app = app();
        let cookie = login(&app, "token-a").await;

        let response = app
            .oneshot(with_cookie(
                Request::builder().uri("/logout").body(Body::empty()).unwrap(),
                &cookie,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
        let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cleared.starts_with("orcaflow_session="));
    }
}
