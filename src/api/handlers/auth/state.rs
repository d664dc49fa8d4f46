//! Shared auth configuration and state.
//!
//! Signing material is carried in an explicit configuration object built
//! once at startup; business logic never reads process-wide state.

use secrecy::SecretString;

use super::lockout::LockoutPolicy;
use super::token::TokenService;

const DEFAULT_ACCESS_TTL_SECONDS: i64 = 24 * 60 * 60;
const DEFAULT_BCRYPT_COST: u32 = 12;
const DEFAULT_LOCKOUT_THRESHOLD: u32 = 5;
const DEFAULT_LOCKOUT_MINUTES: i64 = 30;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    access_secret: SecretString,
    refresh_secret: Option<SecretString>,
    issuer: String,
    audience: String,
    access_ttl_seconds: i64,
    bcrypt_cost: u32,
    lockout_threshold: u32,
    lockout_minutes: i64,
    secure_cookies: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new(access_secret: SecretString) -> Self {
        Self {
            access_secret,
            refresh_secret: None,
            issuer: "clubhouse".to_string(),
            audience: "clubhouse-users".to_string(),
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            lockout_threshold: DEFAULT_LOCKOUT_THRESHOLD,
            lockout_minutes: DEFAULT_LOCKOUT_MINUTES,
            secure_cookies: false,
        }
    }

    #[must_use]
    pub fn with_refresh_secret(mut self, secret: Option<SecretString>) -> Self {
        self.refresh_secret = secret;
        self
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: String) -> Self {
        self.issuer = issuer;
        self
    }

    #[must_use]
    pub fn with_audience(mut self, audience: String) -> Self {
        self.audience = audience;
        self
    }

    #[must_use]
    pub fn with_access_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    #[must_use]
    pub fn with_lockout_threshold(mut self, threshold: u32) -> Self {
        self.lockout_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_lockout_minutes(mut self, minutes: i64) -> Self {
        self.lockout_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    pub(super) fn access_secret(&self) -> &SecretString {
        &self.access_secret
    }

    /// Refresh tokens fall back to the access secret when no dedicated
    /// secret is configured.
    pub(super) fn refresh_secret(&self) -> &SecretString {
        self.refresh_secret.as_ref().unwrap_or(&self.access_secret)
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    #[must_use]
    pub const fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    #[must_use]
    pub const fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }

    #[must_use]
    pub const fn lockout_threshold(&self) -> u32 {
        self.lockout_threshold
    }

    #[must_use]
    pub const fn lockout_minutes(&self) -> i64 {
        self.lockout_minutes
    }

    #[must_use]
    pub const fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }
}

/// Per-process auth state shared with handlers via `Extension<Arc<_>>`.
#[derive(Debug)]
pub struct AuthState {
    config: AuthConfig,
    tokens: TokenService,
    lockout: LockoutPolicy,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let tokens = TokenService::new(&config);
        let lockout = LockoutPolicy::new(config.lockout_threshold(), config.lockout_minutes());
        Self {
            config,
            tokens,
            lockout,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    #[must_use]
    pub const fn lockout(&self) -> &LockoutPolicy {
        &self.lockout
    }
}
