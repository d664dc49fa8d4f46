//! Exchange a valid refresh cookie for a fresh access token.
//!
//! The refresh token itself is not rotated: it keeps its original
//! seven-day horizon and only a new access token is minted.

use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::error::AuthError;
use super::session::extract_refresh_token;
use super::state::AuthState;
use super::storage::find_account_by_id;
use super::token::{TokenError, TokenKind};
use super::types::TokenResponse;

#[utoipa::path(
    post,
    path = "/api/auth/refresh-token",
    responses(
        (status = 200, description = "New access token issued", body = TokenResponse),
        (status = 401, description = "Missing, invalid or expired refresh token, or inactive account"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn refresh_token(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Response {
    match try_refresh(&pool, &state, &headers).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn try_refresh(
    pool: &PgPool,
    state: &AuthState,
    headers: &HeaderMap,
) -> Result<Response, AuthError> {
    let token = extract_refresh_token(headers).ok_or(AuthError::RefreshTokenMissing)?;

    let claims = state
        .tokens()
        .verify(&token, TokenKind::Refresh)
        .map_err(|err| match err {
            TokenError::TypeMismatch => AuthError::InvalidTokenType,
            TokenError::Expired | TokenError::Invalid => AuthError::RefreshTokenInvalid,
        })?;

    let account_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::RefreshTokenInvalid)?;

    // The account must still exist and be active; a lock does not block
    // refresh, only new password logins.
    let account = find_account_by_id(pool, account_id)
        .await?
        .filter(|account| account.is_active)
        .ok_or(AuthError::AccountInactiveOrMissing)?;

    let token = state
        .tokens()
        .issue_access(account.id, account.role.as_str(), None)?;

    debug!(account = %account.id, "access token refreshed");

    Ok(Json(TokenResponse { token }).into_response())
}
