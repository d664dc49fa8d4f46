//! Token-verification gate and permission matching for protected routes.
//!
//! `require_auth` goes in front of every protected club resource and
//! attaches the decoded [`Claims`] to the request. Routes with a
//! required-permission set additionally wrap [`authorize`]:
//!
//! ```ignore
//! Router::new()
//!     .route("/players", get(list_players))
//!     .route_layer(middleware::from_fn(|req: Request, next: Next| {
//!         authorize(&["players:read", "players:write"], req, next)
//!     }))
//!     .route_layer(middleware::from_fn(require_auth))
//! ```

use axum::{
    extract::{Extension, Request},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::error::AuthError;
use super::state::AuthState;
use super::token::{Claims, TokenError, TokenKind};

pub(super) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Reject requests without a valid access token; on success the decoded
/// claims are attached to the request extensions.
pub async fn require_auth(
    Extension(state): Extension<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer_token(request.headers()) else {
        return AuthError::NoToken.into_response();
    };

    match state.tokens().verify(&token, TokenKind::Access) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(TokenError::Expired) => AuthError::SessionExpired.into_response(),
        Err(_) => AuthError::TokenInvalid.into_response(),
    }
}

/// Block login/register for callers that already hold a valid session.
/// An invalid or expired token counts as "no session" and passes through.
pub async fn prevent_login_access(
    Extension(state): Extension<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_bearer_token(request.headers()) {
        if state.tokens().verify(&token, TokenKind::Access).is_ok() {
            return AuthError::AlreadyLoggedIn.into_response();
        }
    }

    next.run(request).await
}

/// OR-semantics permission match: any overlap between the principal's set
/// and the required set grants access.
#[must_use]
pub fn permission_granted(permissions: Option<&[String]>, required: &[&str]) -> bool {
    permissions.is_some_and(|granted| {
        required
            .iter()
            .any(|needed| granted.iter().any(|held| held == needed))
    })
}

/// Gate a route on the principal holding at least one of `required`.
/// Must run after [`require_auth`], which provides the claims.
pub async fn authorize(
    required: &'static [&'static str],
    request: Request,
    next: Next,
) -> Response {
    let permissions = request
        .extensions()
        .get::<Claims>()
        .and_then(|claims| claims.permissions.as_deref());

    let Some(permissions) = permissions else {
        return AuthError::MissingPermissions.into_response();
    };

    if !permission_granted(Some(permissions), required) {
        return AuthError::Forbidden(required.join(",")).into_response();
    }

    next.run(request).await
}
