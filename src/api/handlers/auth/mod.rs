//! Authentication and account-security core.
//!
//! Everything with real state transitions lives here: credential
//! verification, the progressive lockout policy, JWT issuance and
//! verification, and the authorization middleware used by the protected
//! club resources. The CRUD handlers for club entities consume this
//! module through [`middleware::require_auth`] and
//! [`middleware::authorize`].

pub mod error;
pub mod lockout;
pub mod login;
pub mod middleware;
pub mod password;
pub mod refresh;
pub mod register;
pub mod session;
pub mod state;
pub mod storage;
pub mod token;
pub mod types;
pub mod validate;

#[cfg(test)]
mod tests;

pub use self::state::{AuthConfig, AuthState};
