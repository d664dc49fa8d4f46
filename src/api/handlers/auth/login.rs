//! Login: the one flow where every branch matters.
//!
//! Unknown email and wrong password are indistinguishable from the
//! outside (same status, same body), but differ internally: a real
//! mismatch also advances the lockout state. Every rejection that does
//! not already reveal account state is padded with a random 500-1500 ms
//! delay; locked and deactivated responses skip it since they only occur
//! for accounts the caller has already proven to exist.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use rand::Rng;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::error::AuthError;
use super::password::verify_password;
use super::session::refresh_cookie;
use super::state::AuthState;
use super::storage::{find_account_by_email, record_successful_login, update_failure_state};
use super::types::{LoginRequest, LoginResponse, UserResponse};
use super::validate::{normalize_email, sanitize, validate_login};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Invalid credentials or deactivated account"),
        (status = 423, description = "Account temporarily locked"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Response {
    match try_login(&pool, &state, payload).await {
        Ok(response) => response,
        Err(err) => {
            if delay_applies(&err) {
                security_delay().await;
            }
            err.into_response()
        }
    }
}

/// Locked/deactivated responses already disclose account state, so the
/// anti-enumeration delay would only slow down legitimate callers.
const fn delay_applies(err: &AuthError) -> bool {
    matches!(
        err,
        AuthError::Validation(_) | AuthError::InvalidCredentials
    )
}

async fn security_delay() {
    let millis = rand::thread_rng().gen_range(500..=1500);
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

async fn try_login(
    pool: &PgPool,
    state: &AuthState,
    payload: Option<Json<LoginRequest>>,
) -> Result<Response, AuthError> {
    let request = match payload {
        Some(Json(request)) => request,
        None => {
            return Err(AuthError::Validation(
                validate_login(None, None).expect_err("empty login input cannot validate"),
            ))
        }
    };

    validate_login(request.email.as_deref(), request.password.as_deref())
        .map_err(AuthError::Validation)?;

    let email = sanitize(&normalize_email(request.email.as_deref().unwrap_or_default()));
    let password = request.password.unwrap_or_default();

    let account = find_account_by_email(pool, &email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let now = Utc::now();

    if account.failure_state().is_locked(now) {
        debug!(account = %account.id, "login rejected: account locked");
        return Err(AuthError::AccountLocked);
    }

    if !account.is_active {
        debug!(account = %account.id, "login rejected: account deactivated");
        return Err(AuthError::AccountDeactivated);
    }

    if !verify_password(password, account.password_hash.clone()).await? {
        let next = state.lockout().on_failure(account.failure_state(), now);
        update_failure_state(pool, account.id, next).await?;

        if next.is_locked(now) {
            warn!(
                account = %account.id,
                failed_attempts = next.failed_attempts,
                "account locked after repeated failures"
            );
        }

        return Err(AuthError::InvalidCredentials);
    }

    record_successful_login(pool, account.id).await?;

    let token = state
        .tokens()
        .issue_access(account.id, account.role.as_str(), None)?;
    let refresh = state.tokens().issue_refresh(account.id)?;

    let mut headers = HeaderMap::new();
    let cookie = refresh_cookie(&refresh, state.config().secure_cookies())
        .map_err(|err| AuthError::Internal(anyhow::anyhow!("invalid refresh cookie: {err}")))?;
    headers.insert(SET_COOKIE, cookie);

    debug!(account = %account.id, "login successful");

    let body = LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: UserResponse {
            id: account.id.to_string(),
            name: account.name,
            email: account.email,
            role: account.role,
        },
    };

    Ok((StatusCode::OK, headers, Json(body)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn delay_covers_enumeration_paths_only() {
        assert!(delay_applies(&AuthError::InvalidCredentials));
        assert!(delay_applies(&AuthError::Validation(
            super::super::validate::FieldErrors::new()
        )));

        assert!(!delay_applies(&AuthError::AccountLocked));
        assert!(!delay_applies(&AuthError::AccountDeactivated));
        assert!(!delay_applies(&AuthError::Internal(anyhow::anyhow!("db"))));
    }

    #[tokio::test(start_paused = true)]
    async fn security_delay_is_bounded() {
        let start = Instant::now();
        security_delay().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(500));
        assert!(elapsed <= Duration::from_millis(1500));
    }
}
