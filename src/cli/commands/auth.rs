use clap::{Arg, ArgAction, Command};

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_JWT_REFRESH_SECRET: &str = "jwt-refresh-secret";
pub const ARG_JWT_ISSUER: &str = "jwt-issuer";
pub const ARG_JWT_AUDIENCE: &str = "jwt-audience";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_BCRYPT_COST: &str = "bcrypt-cost";
pub const ARG_LOCKOUT_THRESHOLD: &str = "lockout-threshold";
pub const ARG_LOCKOUT_MINUTES: &str = "lockout-minutes";
pub const ARG_SECURE_COOKIES: &str = "secure-cookies";

#[must_use]
pub fn with_args(command: Command) -> Command {
    let command = with_token_args(command);
    with_account_security_args(command)
}

fn with_token_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Secret used to sign access tokens")
                .env("CLUBHOUSE_JWT_SECRET")
                .required(true),
        )
        .arg(
            Arg::new(ARG_JWT_REFRESH_SECRET)
                .long(ARG_JWT_REFRESH_SECRET)
                .help("Secret used to sign refresh tokens (defaults to the access secret)")
                .env("CLUBHOUSE_JWT_REFRESH_SECRET"),
        )
        .arg(
            Arg::new(ARG_JWT_ISSUER)
                .long(ARG_JWT_ISSUER)
                .help("Issuer claim for access tokens")
                .env("CLUBHOUSE_JWT_ISSUER")
                .default_value("clubhouse"),
        )
        .arg(
            Arg::new(ARG_JWT_AUDIENCE)
                .long(ARG_JWT_AUDIENCE)
                .help("Audience claim for access tokens")
                .env("CLUBHOUSE_JWT_AUDIENCE")
                .default_value("clubhouse-users"),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Access token TTL in seconds")
                .env("CLUBHOUSE_TOKEN_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(i64)),
        )
}

fn with_account_security_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_BCRYPT_COST)
                .long(ARG_BCRYPT_COST)
                .help("bcrypt cost factor for password hashing")
                .env("CLUBHOUSE_BCRYPT_COST")
                .default_value("12")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_LOCKOUT_THRESHOLD)
                .long(ARG_LOCKOUT_THRESHOLD)
                .help("Failed login attempts before an account is locked")
                .env("CLUBHOUSE_LOCKOUT_THRESHOLD")
                .default_value("5")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_LOCKOUT_MINUTES)
                .long(ARG_LOCKOUT_MINUTES)
                .help("Lock duration in minutes once the threshold is crossed")
                .env("CLUBHOUSE_LOCKOUT_MINUTES")
                .default_value("30")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_SECURE_COOKIES)
                .long(ARG_SECURE_COOKIES)
                .help("Mark the refresh cookie as Secure (HTTPS deployments)")
                .env("CLUBHOUSE_SECURE_COOKIES")
                .action(ArgAction::SetTrue),
        )
}
