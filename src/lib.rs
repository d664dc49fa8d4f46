//! # Clubhouse (Sports-Club Management Backend)
//!
//! `clubhouse` is the account-security core of a sports-club management
//! system. The club entities themselves (players, teams, contracts,
//! payroll, ...) are plain CRUD surfaces; this crate owns the part with
//! real state transitions:
//!
//! - **Credentials**: bcrypt-hashed passwords with a configurable cost.
//! - **Progressive lockout**: five consecutive failures lock an account
//!   for thirty minutes; a successful login resets the counter.
//! - **Tokens**: short-lived JWT access tokens plus a seven-day refresh
//!   token delivered through an `HttpOnly`, `SameSite=Strict` cookie.
//! - **Authorization**: bearer-token verification and permission-set
//!   matching for protected routes.
//!
//! Wrong-password and unknown-email logins return identical responses,
//! and every rejected login is delayed by a random 500-1500 ms to make
//! account enumeration by timing impractical.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
