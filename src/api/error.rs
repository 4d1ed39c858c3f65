//! API error taxonomy.
//!
//! Every handler failure maps to one of these variants; the response body is
//! always `{"error": message}` with the messages the frontend already knows.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::backend::{IdentityError, StoreError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Token não fornecido")]
    MissingToken,

    #[error("Sessão inválida. Faça o login novamente.")]
    InvalidOrExpiredToken,

    #[error("Parâmetro '{0}' obrigatório")]
    MissingParameter(&'static str),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingToken | ApiError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidOrExpiredToken => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Unauthorized => ApiError::InvalidOrExpiredToken,
            IdentityError::Service(e) => {
                tracing::error!(error = %e, "identity service failure");
                ApiError::internal("Erro interno do servidor.")
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "template store failure");
        match err {
            StoreError::EmptyInsert => {
                ApiError::internal("Nenhum dado retornado após a inserção.")
            }
            StoreError::Service(_) => {
                ApiError::internal("Erro interno do servidor ao acessar templates.")
            }
        }
    }
}
