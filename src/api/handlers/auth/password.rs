//! Password hashing behind a narrow seam.
//!
//! bcrypt with a configurable cost factor. Hashing and verification run
//! on the blocking pool; the adaptive cost is the point, and it must not
//! stall the async runtime. Neither plaintext nor digest is ever logged.

use anyhow::{Context, Result};
use tokio::task;

/// Hash a plaintext password.
///
/// # Errors
///
/// Returns an error if the cost factor is out of bcrypt's range or the
/// blocking task is cancelled.
pub async fn hash_password(plaintext: String, cost: u32) -> Result<String> {
    task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
        .await
        .context("password hashing task failed")?
        .context("failed to hash password")
}

/// Verify a plaintext password against a stored digest.
///
/// # Errors
///
/// Returns an error if the digest is malformed or the blocking task is
/// cancelled. A wrong password is `Ok(false)`, not an error.
pub async fn verify_password(plaintext: String, digest: String) -> Result<bool> {
    task::spawn_blocking(move || bcrypt::verify(plaintext, &digest))
        .await
        .context("password verification task failed")?
        .context("failed to verify password")
}
