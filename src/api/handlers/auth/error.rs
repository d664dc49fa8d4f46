//! Error taxonomy for the auth surface.
//!
//! Every credential or token failure is mapped to one of these variants
//! at the handler boundary; raw database errors and token internals never
//! reach the client. Wrong-password and unknown-email both map to
//! `InvalidCredentials`, so their response bodies are identical.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use super::validate::FieldErrors;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation failed")]
    Validation(FieldErrors),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Account temporarily locked due to multiple failed attempts")]
    AccountLocked,
    #[error("Account is deactivated")]
    AccountDeactivated,
    #[error("Email already in use")]
    EmailTaken,
    #[error("Refresh token not provided")]
    RefreshTokenMissing,
    #[error("Invalid token type")]
    InvalidTokenType,
    #[error("Invalid refresh token")]
    RefreshTokenInvalid,
    #[error("User not found or inactive")]
    AccountInactiveOrMissing,
    #[error("Unauthorized: No token provided")]
    NoToken,
    #[error("Session expired. Please log in again.")]
    SessionExpired,
    #[error("Unauthorized: Invalid token")]
    TokenInvalid,
    #[error("Missing permissions data")]
    MissingPermissions,
    #[error("Forbidden: Requires {0} permission")]
    Forbidden(String),
    #[error("Already logged in")]
    AlreadyLoggedIn,
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl AuthError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials
            | Self::AccountDeactivated
            | Self::RefreshTokenMissing
            | Self::InvalidTokenType
            | Self::RefreshTokenInvalid
            | Self::AccountInactiveOrMissing
            | Self::NoToken
            | Self::SessionExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::AccountLocked => StatusCode::LOCKED,
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::MissingPermissions | Self::Forbidden(_) | Self::AlreadyLoggedIn => {
                StatusCode::FORBIDDEN
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            Self::Validation(errors) => json!({
                "message": self.to_string(),
                "errors": errors,
            }),
            Self::EmailTaken => json!({
                "message": self.to_string(),
                "errors": { "email": "An account with this email already exists" },
            }),
            Self::Internal(source) => {
                // Log the cause server-side, return nothing sensitive.
                error!("internal error: {source:?}");
                json!({ "message": self.to_string() })
            }
            // Middleware rejections key on "error"; the orchestrator
            // endpoints key on "message".
            Self::NoToken
            | Self::SessionExpired
            | Self::TokenInvalid
            | Self::MissingPermissions
            | Self::Forbidden(_)
            | Self::AlreadyLoggedIn => json!({ "error": self.to_string() }),
            _ => json!({ "message": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
