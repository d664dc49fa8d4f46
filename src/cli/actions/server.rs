use crate::api::{self, handlers::auth::AuthConfig};
use anyhow::{Context, Result};
use secrecy::SecretString;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub jwt_refresh_secret: Option<SecretString>,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub token_ttl_seconds: i64,
    pub bcrypt_cost: u32,
    pub lockout_threshold: u32,
    pub lockout_minutes: i64,
    pub secure_cookies: bool,
}

/// Execute the server action.
///
/// # Errors
///
/// Returns an error if the DSN is malformed or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    // Fail early on a malformed DSN instead of at pool creation.
    Url::parse(&args.dsn).context("Invalid database DSN")?;

    let config = AuthConfig::new(args.jwt_secret)
        .with_refresh_secret(args.jwt_refresh_secret)
        .with_issuer(args.jwt_issuer)
        .with_audience(args.jwt_audience)
        .with_access_ttl_seconds(args.token_ttl_seconds)
        .with_bcrypt_cost(args.bcrypt_cost)
        .with_lockout_threshold(args.lockout_threshold)
        .with_lockout_minutes(args.lockout_minutes)
        .with_secure_cookies(args.secure_cookies);

    api::new(args.port, args.dsn, config).await
}
