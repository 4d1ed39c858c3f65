//! Seams to the external Supabase services.
//!
//! Handlers talk to trait objects so the HTTP layer can be exercised against
//! in-memory doubles. The real implementations live in [`supabase`] and are
//! plain reqwest calls against GoTrue and PostgREST.

mod models;
pub mod supabase;

use async_trait::async_trait;
use thiserror::Error;

pub use models::{NewTemplate, ResolvedUser, Template, TemplateSummary};
pub use supabase::{SupabaseIdentity, SupabaseStore};

/// Failures from the identity service. `Unauthorized` is the structured
/// replacement for sniffing "401"/"JWT expired" out of error strings: the
/// client decides from the HTTP status, callers only match on the variant.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("token rejected by the identity service")]
    Unauthorized,
    #[error("identity service request failed: {0}")]
    Service(anyhow::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("insert acknowledged without a returned row")]
    EmptyInsert,
    #[error("data store request failed: {0}")]
    Service(anyhow::Error),
}

/// Resolves a bearer token to the user it was issued for.
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn resolve_user(&self, token: &str) -> Result<ResolvedUser, IdentityError>;
}

/// Filtered access to the `templates` table. Every operation that touches
/// existing rows takes the owning `user_id`; implementations must apply it as
/// an equality filter, there is no row-level security behind this interface.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn insert(&self, template: NewTemplate) -> Result<Template, StoreError>;

    /// Deletes the template only when both `id` and `user_id` match.
    /// Returns the number of rows removed (zero when nothing matched).
    async fn delete(&self, id: &str, user_id: &str) -> Result<u64, StoreError>;

    async fn list(&self, user_id: &str) -> Result<Vec<TemplateSummary>, StoreError>;
}
