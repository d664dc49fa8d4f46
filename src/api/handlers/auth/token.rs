//! Signed, self-contained access and refresh tokens.
//!
//! Both kinds are stateless JWTs; there is no server-side session table
//! and no revocation list, so expiry is the only kill switch. Refresh
//! tokens carry a `type` marker so the two kinds can never stand in for
//! each other, and are signed with a dedicated secret when one is
//! configured.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use super::state::AuthConfig;

/// Refresh tokens live for a fixed seven days.
pub const REFRESH_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

const REFRESH_TYPE: &str = "refresh";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("unexpected token type")]
    TypeMismatch,
    #[error("invalid token")]
    Invalid,
}

/// Decoded token payload. Access tokens carry role (and optionally an
/// explicit permission set); refresh tokens carry only the `type` marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(
        default,
        rename = "type",
        skip_serializing_if = "Option::is_none"
    )]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    issuer: String,
    audience: String,
    access_ttl_seconds: i64,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let access = config.access_secret().expose_secret().as_bytes();
        let refresh = config.refresh_secret().expose_secret().as_bytes();

        Self {
            access_encoding: EncodingKey::from_secret(access),
            access_decoding: DecodingKey::from_secret(access),
            refresh_encoding: EncodingKey::from_secret(refresh),
            refresh_decoding: DecodingKey::from_secret(refresh),
            issuer: config.issuer().to_string(),
            audience: config.audience().to_string(),
            access_ttl_seconds: config.access_ttl_seconds(),
        }
    }

    /// Issue a short-lived access token for an authenticated account.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn issue_access(
        &self,
        account_id: Uuid,
        role: &str,
        permissions: Option<&[String]>,
    ) -> anyhow::Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: account_id.to_string(),
            role: Some(role.to_string()),
            token_type: None,
            permissions: permissions.map(<[String]>::to_vec),
            iat: now,
            exp: now + self.access_ttl_seconds,
            iss: Some(self.issuer.clone()),
            aud: Some(self.audience.clone()),
        };

        encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(|err| anyhow::anyhow!("failed to sign access token: {err}"))
    }

    /// Issue a refresh token, distinguishable by its `type` claim.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn issue_refresh(&self, account_id: Uuid) -> anyhow::Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: account_id.to_string(),
            role: None,
            token_type: Some(REFRESH_TYPE.to_string()),
            permissions: None,
            iat: now,
            exp: now + REFRESH_TTL_SECONDS,
            iss: None,
            aud: None,
        };

        encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(|err| anyhow::anyhow!("failed to sign refresh token: {err}"))
    }

    /// Verify signature and expiry, then pin the token to the expected
    /// kind via the `type` claim.
    ///
    /// # Errors
    ///
    /// `Expired` past expiry (no leeway), `TypeMismatch` when the `type`
    /// claim disagrees with `kind`, `Invalid` for everything else.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        let decoding = match kind {
            TokenKind::Access => &self.access_decoding,
            TokenKind::Refresh => &self.refresh_decoding,
        };

        // Issuer/audience are checked by hand below so a wrong-kind token
        // surfaces as TypeMismatch rather than a claim error.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;

        let claims = decode::<Claims>(token, decoding, &validation)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?
            .claims;

        let is_refresh = claims.token_type.as_deref() == Some(REFRESH_TYPE);
        match kind {
            TokenKind::Access => {
                if is_refresh {
                    return Err(TokenError::TypeMismatch);
                }
                if claims.iss.as_deref() != Some(self.issuer.as_str())
                    || claims.aud.as_deref() != Some(self.audience.as_str())
                {
                    return Err(TokenError::Invalid);
                }
            }
            TokenKind::Refresh => {
                if !is_refresh {
                    return Err(TokenError::TypeMismatch);
                }
            }
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use secrecy::SecretString;

    fn service() -> TokenService {
        TokenService::new(&AuthConfig::new(SecretString::from("test-secret".to_string())))
    }

    #[test]
    fn access_token_round_trip() -> Result<()> {
        let service = service();
        let account_id = Uuid::new_v4();

        let token = service.issue_access(account_id, "moderator", None)?;
        let claims = service
            .verify(&token, TokenKind::Access)
            .expect("fresh token verifies");

        assert_eq!(claims.sub, account_id.to_string());
        assert_eq!(claims.role.as_deref(), Some("moderator"));
        assert_eq!(claims.iss.as_deref(), Some("clubhouse"));
        assert_eq!(claims.aud.as_deref(), Some("clubhouse-users"));
        assert_eq!(claims.exp - claims.iat, 86_400);
        assert!(claims.token_type.is_none());
        Ok(())
    }

    #[test]
    fn permissions_claim_survives_round_trip() -> Result<()> {
        let service = service();
        let permissions = vec!["players:read".to_string(), "players:write".to_string()];

        let token = service.issue_access(Uuid::new_v4(), "admin", Some(&permissions))?;
        let claims = service
            .verify(&token, TokenKind::Access)
            .expect("fresh token verifies");

        assert_eq!(claims.permissions, Some(permissions));
        Ok(())
    }

    #[test]
    fn refresh_token_carries_type_marker() -> Result<()> {
        let service = service();
        let account_id = Uuid::new_v4();

        let token = service.issue_refresh(account_id)?;
        let claims = service
            .verify(&token, TokenKind::Refresh)
            .expect("fresh refresh token verifies");

        assert_eq!(claims.sub, account_id.to_string());
        assert_eq!(claims.token_type.as_deref(), Some("refresh"));
        assert_eq!(claims.exp - claims.iat, REFRESH_TTL_SECONDS);
        Ok(())
    }

    #[test]
    fn kinds_are_not_interchangeable() -> Result<()> {
        let service = service();
        let account_id = Uuid::new_v4();

        // Same secret for both kinds here, so the type marker is the gate.
        let refresh = service.issue_refresh(account_id)?;
        assert_eq!(
            service.verify(&refresh, TokenKind::Access),
            Err(TokenError::TypeMismatch)
        );

        let access = service.issue_access(account_id, "user", None)?;
        assert_eq!(
            service.verify(&access, TokenKind::Refresh),
            Err(TokenError::TypeMismatch)
        );
        Ok(())
    }

    #[test]
    fn distinct_refresh_secret_rejects_access_signature() -> Result<()> {
        let config = AuthConfig::new(SecretString::from("access-secret".to_string()))
            .with_refresh_secret(Some(SecretString::from("refresh-secret".to_string())));
        let service = TokenService::new(&config);

        let access = service.issue_access(Uuid::new_v4(), "user", None)?;
        assert_eq!(
            service.verify(&access, TokenKind::Refresh),
            Err(TokenError::Invalid)
        );
        Ok(())
    }

    #[test]
    fn expired_token_is_rejected() -> Result<()> {
        let config = AuthConfig::new(SecretString::from("test-secret".to_string()))
            .with_access_ttl_seconds(1);
        let service = TokenService::new(&config);

        let token = service.issue_access(Uuid::new_v4(), "user", None)?;
        std::thread::sleep(std::time::Duration::from_secs(2));

        assert_eq!(
            service.verify(&token, TokenKind::Access),
            Err(TokenError::Expired)
        );
        Ok(())
    }

    #[test]
    fn tampered_token_is_invalid() -> Result<()> {
        let service = service();
        let mut token = service.issue_access(Uuid::new_v4(), "user", None)?;
        token.pop();
        token.push('x');

        assert_eq!(
            service.verify(&token, TokenKind::Access),
            Err(TokenError::Invalid)
        );
        Ok(())
    }

    #[test]
    fn foreign_issuer_is_invalid() -> Result<()> {
        let foreign = TokenService::new(
            &AuthConfig::new(SecretString::from("test-secret".to_string()))
                .with_issuer("someone-else".to_string()),
        );
        let token = foreign.issue_access(Uuid::new_v4(), "user", None)?;

        assert_eq!(
            service().verify(&token, TokenKind::Access),
            Err(TokenError::Invalid)
        );
        Ok(())
    }

    #[test]
    fn garbage_is_invalid() {
        assert_eq!(
            service().verify("not.a.jwt", TokenKind::Access),
            Err(TokenError::Invalid)
        );
    }
}
