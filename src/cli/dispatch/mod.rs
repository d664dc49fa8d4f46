use crate::cli::{
    actions::{server, Action},
    commands::auth,
};
use anyhow::{anyhow, Result};
use secrecy::SecretString;

/// Build the action from the parsed command line.
///
/// # Errors
///
/// Returns an error when a required argument is missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let get_string = |name: &str| -> Result<String> {
        matches
            .get_one::<String>(name)
            .map(String::to_string)
            .ok_or_else(|| anyhow!("missing required argument: --{name}"))
    };

    let args = server::Args {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn: get_string("dsn")?,
        jwt_secret: SecretString::from(get_string(auth::ARG_JWT_SECRET)?),
        jwt_refresh_secret: matches
            .get_one::<String>(auth::ARG_JWT_REFRESH_SECRET)
            .map(|secret| SecretString::from(secret.to_string())),
        jwt_issuer: get_string(auth::ARG_JWT_ISSUER)?,
        jwt_audience: get_string(auth::ARG_JWT_AUDIENCE)?,
        token_ttl_seconds: matches
            .get_one::<i64>(auth::ARG_TOKEN_TTL_SECONDS)
            .copied()
            .unwrap_or(86_400),
        bcrypt_cost: matches
            .get_one::<u32>(auth::ARG_BCRYPT_COST)
            .copied()
            .unwrap_or(12),
        lockout_threshold: matches
            .get_one::<u32>(auth::ARG_LOCKOUT_THRESHOLD)
            .copied()
            .unwrap_or(5),
        lockout_minutes: matches
            .get_one::<i64>(auth::ARG_LOCKOUT_MINUTES)
            .copied()
            .unwrap_or(30),
        secure_cookies: matches.get_flag(auth::ARG_SECURE_COOKIES),
    };

    Ok(Action::Server(Box::new(args)))
}
