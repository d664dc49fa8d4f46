//! Refresh-cookie handling, logout and the authenticated-principal
//! endpoint.
//!
//! The refresh token travels only in an `HttpOnly`, `SameSite=Strict`
//! cookie. Logout is stateless: it clears the cookie and nothing else,
//! since an already-issued access token cannot be revoked in this design.

use axum::{
    extract::Extension,
    http::{
        header::{InvalidHeaderValue, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::error;

use super::state::AuthState;
use super::token::{Claims, REFRESH_TTL_SECONDS};
use super::types::{MessageResponse, PrincipalResponse};

pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Build the `Set-Cookie` value carrying a freshly issued refresh token.
///
/// # Errors
///
/// Returns an error if the token contains characters invalid in a header.
pub(super) fn refresh_cookie(token: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{REFRESH_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Strict; \
         Max-Age={REFRESH_TTL_SECONDS}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(super) fn clear_refresh_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{REFRESH_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Pull the refresh token out of the `Cookie` header, if present.
pub(super) fn extract_refresh_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let Some((key, val)) = pair.trim().split_once('=') else {
            continue;
        };
        if key.trim() == REFRESH_COOKIE_NAME && !val.trim().is_empty() {
            return Some(val.trim().to_string());
        }
    }
    None
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Refresh cookie cleared", body = MessageResponse),
    ),
    tag = "auth"
)]
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    match clear_refresh_cookie(auth_state.config().secure_cookies()) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            // The clearing cookie is a constant; this should not happen.
            error!("failed to build clearing cookie: {err}");
        }
    }

    (
        StatusCode::OK,
        headers,
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Authenticated principal", body = PrincipalResponse),
        (status = 401, description = "Missing, expired or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn me(Extension(claims): Extension<Claims>) -> impl IntoResponse {
    Json(PrincipalResponse {
        id: claims.sub,
        role: claims.role,
        permissions: claims.permissions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_cookie_attributes() {
        let cookie = refresh_cookie("abc.def.ghi", false).expect("cookie");
        let value = cookie.to_str().expect("ascii");
        assert!(value.starts_with("refreshToken=abc.def.ghi;"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Strict"));
        assert!(value.contains("Max-Age=604800"));
        assert!(!value.contains("Secure"));

        let cookie = refresh_cookie("abc.def.ghi", true).expect("cookie");
        assert!(cookie.to_str().expect("ascii").ends_with("; Secure"));
    }

    #[test]
    fn clearing_cookie_expires_immediately() {
        let cookie = clear_refresh_cookie(true).expect("cookie");
        let value = cookie.to_str().expect("ascii");
        assert!(value.starts_with("refreshToken=;"));
        assert!(value.contains("Max-Age=0"));
        assert!(value.contains("Secure"));
    }

    #[test]
    fn extracts_refresh_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; refreshToken=tok-123; lang=en"),
        );
        assert_eq!(
            extract_refresh_token(&headers),
            Some("tok-123".to_string())
        );
    }

    #[test]
    fn missing_or_empty_cookie_yields_none() {
        let headers = HeaderMap::new();
        assert_eq!(extract_refresh_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("refreshToken="));
        assert_eq!(extract_refresh_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session=other"));
        assert_eq!(extract_refresh_token(&headers), None);
    }
}
