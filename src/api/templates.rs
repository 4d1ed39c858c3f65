//! Template CRUD, always scoped to the session principal.
//!
//! `user_id` comes exclusively from the session: inserts force it onto the
//! row, reads and deletes carry it as an equality filter. The double filter
//! on delete is the only thing standing between users and each other's rows.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::error::ApiError;
use crate::backend::NewTemplate;
use crate::session::Principal;
use crate::AppState;

/// Client-supplied template fields. Everything is optional; missing lists
/// become empty and a missing name gets the stock placeholder.
#[derive(Debug, Default, Deserialize)]
pub struct TemplateRequest {
    #[serde(default)]
    pub nome_template: Option<String>,
    #[serde(default)]
    pub produtos: Vec<Value>,
    #[serde(default)]
    pub formas_pagamento: Vec<Value>,
    #[serde(default)]
    pub campos: Vec<Value>,
    #[serde(default)]
    pub cupons: Vec<Value>,
    #[serde(default)]
    pub acrescimos_sazonais: Vec<Value>,
    #[serde(default)]
    pub acrescimos_localidade: Vec<Value>,
}

impl TemplateRequest {
    fn into_new_template(self, user_id: &str) -> NewTemplate {
        NewTemplate {
            user_id: user_id.to_string(),
            nome_template: self
                .nome_template
                .unwrap_or_else(|| "Novo Template".to_string()),
            produtos: self.produtos,
            formas_pagamento: self.formas_pagamento,
            campos: self.campos,
            cupons: self.cupons,
            acrescimos_sazonais: self.acrescimos_sazonais,
            acrescimos_localidade: self.acrescimos_localidade,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub id: Option<String>,
}

/// GET /api/templates
pub async fn list_templates(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Value>, ApiError> {
    let rows = state.store.list(&principal.id).await?;
    Ok(Json(json!({ "data": rows })))
}

/// POST /api/templates
pub async fn create_template(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<TemplateRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let row = state
        .store
        .insert(request.into_new_template(&principal.id))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": row })),
    ))
}

/// DELETE /api/templates?id=
pub async fn delete_template(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = query.id.as_deref().unwrap_or("").trim();
    if id.is_empty() {
        return Err(ApiError::MissingParameter("id"));
    }

    // Zero deletions (unknown id, or a row owned by someone else) is still a
    // 200; the caller only learns the count.
    let deleted = state.store.delete(id, &principal.id).await?;
    Ok(Json(json!({ "success": true, "deleted_count": deleted })))
}
