use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity resolved from a bearer token by the identity service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedUser {
    pub id: String,
    pub email: Option<String>,
}

/// A stored quote template. List-valued fields are kept as raw JSON so the
/// server stays schema-agnostic about what the frontend puts in them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub user_id: String,
    pub nome_template: String,
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
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for a template. `user_id` is always set by the server from
/// the session principal, never taken from the request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTemplate {
    pub user_id: String,
    pub nome_template: String,
    pub produtos: Vec<Value>,
    pub formas_pagamento: Vec<Value>,
    pub campos: Vec<Value>,
    pub cupons: Vec<Value>,
    pub acrescimos_sazonais: Vec<Value>,
    pub acrescimos_localidade: Vec<Value>,
}

/// Projection returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: String,
    pub user_id: String,
    pub nome_template: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Template> for TemplateSummary {
    fn from(template: &Template) -> Self {
        Self {
            id: template.id.clone(),
            user_id: template.user_id.clone(),
            nome_template: template.nome_template.clone(),
            created_at: template.created_at,
        }
    }
}
