//! OpenAPI document for the auth surface.
//!
//! New endpoints must be added to `paths(...)` here and to the router in
//! `api::new` so the served routes and the document stay in sync.

use utoipa::OpenApi;

use crate::api::handlers::auth::types::{
    LoginRequest, LoginResponse, MessageResponse, PrincipalResponse, RegisterRequest,
    RegisterResponse, Role, TokenResponse, UserResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health,
        crate::api::handlers::auth::login::login,
        crate::api::handlers::auth::register::register,
        crate::api::handlers::auth::refresh::refresh_token,
        crate::api::handlers::auth::session::logout,
        crate::api::handlers::auth::session::me,
    ),
    components(schemas(
        LoginRequest,
        LoginResponse,
        RegisterRequest,
        RegisterResponse,
        TokenResponse,
        MessageResponse,
        PrincipalResponse,
        UserResponse,
        Role,
    )),
    tags(
        (name = "auth", description = "Authentication and account security"),
        (name = "health", description = "Service metadata"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_the_auth_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/health",
            "/api/auth/login",
            "/api/auth/register",
            "/api/auth/refresh-token",
            "/api/auth/logout",
            "/api/auth/me",
        ] {
            assert!(
                paths.iter().any(|path| path.as_str() == expected),
                "missing path {expected}, got {paths:?}"
            );
        }
    }
}
