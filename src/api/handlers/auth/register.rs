//! Registration: validate, hash, insert account + audit entry atomically.

use axum::{
    extract::Extension,
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};

use super::error::AuthError;
use super::password::hash_password;
use super::state::AuthState;
use super::storage::{email_exists, insert_account_with_audit, RegisterOutcome};
use super::types::{RegisterRequest, RegisterResponse, Role, UserResponse};
use super::validate::{normalize_email, sanitize, validate_registration, FieldErrors};

const DEFAULT_ROLE: Role = Role::User;

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already in use"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn register(
    Extension(pool): Extension<PgPool>,
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    payload: Option<Json<RegisterRequest>>,
) -> Response {
    match try_register(&pool, &state, &headers, payload).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn try_register(
    pool: &PgPool,
    state: &AuthState,
    headers: &HeaderMap,
    payload: Option<Json<RegisterRequest>>,
) -> Result<Response, AuthError> {
    let request = match payload {
        Some(Json(request)) => request,
        None => {
            return Err(AuthError::Validation(
                validate_registration(None, None, None, DEFAULT_ROLE.as_str())
                    .expect_err("empty registration input cannot validate"),
            ))
        }
    };

    let role_input = request.role.as_deref().unwrap_or(DEFAULT_ROLE.as_str());

    validate_registration(
        request.name.as_deref(),
        request.email.as_deref(),
        request.password.as_deref(),
        role_input,
    )
    .map_err(AuthError::Validation)?;

    // The role was whitelisted above; this cannot fail.
    let role = Role::from_str(role_input).map_err(|()| {
        let mut errors = FieldErrors::new();
        errors.insert("role", "Invalid role specified".to_string());
        AuthError::Validation(errors)
    })?;

    let name = sanitize(request.name.as_deref().unwrap_or_default());
    let email = sanitize(&normalize_email(request.email.as_deref().unwrap_or_default()));

    if email_exists(pool, &email).await? {
        return Err(AuthError::EmailTaken);
    }

    let password_hash = hash_password(
        request.password.unwrap_or_default(),
        state.config().bcrypt_cost(),
    )
    .await?;

    let ip_address = extract_client_ip(headers);
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let outcome = insert_account_with_audit(
        pool,
        &name,
        &email,
        &password_hash,
        role,
        ip_address.as_deref(),
        user_agent.as_deref(),
    )
    .await?;

    let account_id = match outcome {
        RegisterOutcome::Created(id) => id,
        // Lost a race with a concurrent registration for the same email.
        RegisterOutcome::Conflict => return Err(AuthError::EmailTaken),
    };

    info!(account = %account_id, "account registered");

    let body = RegisterResponse {
        message: "User registered successfully".to_string(),
        user: UserResponse {
            id: account_id.to_string(),
            name,
            email,
            role,
        },
    };

    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// Client IP for the audit trail, from the usual proxy headers.
pub(super) fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if forwarded.is_some() {
        return forwarded.map(str::to_string);
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_wins_over_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(extract_client_ip(&headers), Some("203.0.113.7".to_string()));
    }

    #[test]
    fn real_ip_is_the_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(extract_client_ip(&headers), Some("198.51.100.2".to_string()));

        assert_eq!(extract_client_ip(&HeaderMap::new()), None);
    }
}
