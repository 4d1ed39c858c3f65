//! Supabase client implementations.
//!
//! GoTrue (`/auth/v1`) handles token validation, PostgREST (`/rest/v1`) holds
//! the `templates` table. Both are plain HTTP; no SDK involved.

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{
    IdentityError, IdentityService, NewTemplate, ResolvedUser, StoreError, Template,
    TemplateStore, TemplateSummary,
};
use crate::config::SupabaseConfig;

const TEMPLATES_TABLE: &str = "templates";

/// Shape of the GoTrue user object, reduced to what the bridge needs.
#[derive(Debug, Deserialize)]
struct GoTrueUser {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// Token validation against GoTrue using the service-role key. The elevated
/// key stays on this side of the wire; the caller's token only rides along as
/// the bearer credential being checked.
pub struct SupabaseIdentity {
    http: reqwest::Client,
    base_url: String,
    service_role_key: String,
}

impl SupabaseIdentity {
    pub fn new(config: &SupabaseConfig) -> anyhow::Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base_url: config.url.trim_end_matches('/').to_string(),
            service_role_key: config.service_role_key.clone(),
        })
    }

    fn user_url(&self) -> String {
        format!("{}/auth/v1/user", self.base_url)
    }
}

#[async_trait]
impl IdentityService for SupabaseIdentity {
    async fn resolve_user(&self, token: &str) -> Result<ResolvedUser, IdentityError> {
        let response = self
            .http
            .get(self.user_url())
            .header("apikey", &self.service_role_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| IdentityError::Service(e.into()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(IdentityError::Unauthorized),
            status if status.is_success() => {
                let user: GoTrueUser = response
                    .json()
                    .await
                    .map_err(|e| IdentityError::Service(e.into()))?;
                match user.id {
                    Some(id) if !id.is_empty() => Ok(ResolvedUser {
                        id,
                        email: user.email,
                    }),
                    // A 200 without a subject still means the token resolved
                    // to nobody.
                    _ => Err(IdentityError::Unauthorized),
                }
            }
            status => Err(IdentityError::Service(anyhow!(
                "identity service returned {status}"
            ))),
        }
    }
}

/// Template persistence through PostgREST with the anon key; ownership is
/// enforced by the `user_id` equality filters sent on every request.
pub struct SupabaseStore {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseStore {
    pub fn new(config: &SupabaseConfig) -> anyhow::Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TEMPLATES_TABLE)
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }
}

#[async_trait]
impl TemplateStore for SupabaseStore {
    async fn insert(&self, template: NewTemplate) -> Result<Template, StoreError> {
        let response = self
            .request(reqwest::Method::POST, self.table_url())
            .header("Prefer", "return=representation")
            .json(&template)
            .send()
            .await
            .map_err(|e| StoreError::Service(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Service(anyhow!(
                "data store insert returned {status}"
            )));
        }

        let rows: Vec<Template> = response
            .json()
            .await
            .map_err(|e| StoreError::Service(e.into()))?;
        rows.into_iter().next().ok_or(StoreError::EmptyInsert)
    }

    async fn delete(&self, id: &str, user_id: &str) -> Result<u64, StoreError> {
        let response = self
            .request(reqwest::Method::DELETE, self.table_url())
            .query(&[
                ("id", format!("eq.{id}")),
                ("user_id", format!("eq.{user_id}")),
            ])
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(|e| StoreError::Service(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Service(anyhow!(
                "data store delete returned {status}"
            )));
        }

        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| StoreError::Service(e.into()))?;
        Ok(rows.len() as u64)
    }

    async fn list(&self, user_id: &str) -> Result<Vec<TemplateSummary>, StoreError> {
        let response = self
            .request(reqwest::Method::GET, self.table_url())
            .query(&[
                ("select", "id,user_id,nome_template,created_at".to_string()),
                ("user_id", format!("eq.{user_id}")),
            ])
            .send()
            .await
            .map_err(|e| StoreError::Service(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Service(anyhow!(
                "data store select returned {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Service(e.into()))
    }
}
