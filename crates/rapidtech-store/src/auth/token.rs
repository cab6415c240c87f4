//! JWT issuance and verification.
//!
//! HS256 tokens carrying the user id and role. Verification here covers
//! signature and expiry only; the session record is checked separately by
//! the storefront.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rapidtech_core::{CoreError, CoreResult, Principal, Role};

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Role at issue time
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID, unique per token so two logins never share a session key
    pub jti: String,
}

impl Claims {
    pub fn principal(&self) -> Principal {
        Principal::new(self.sub.clone(), self.role)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// A signed token and the claims inside it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// JWT token manager.
#[derive(Clone)]
pub struct TokenManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        TokenManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Issues a token for `user_id` with `role`, expiring after the
    /// configured lifetime.
    pub fn issue(&self, user_id: &str, role: Role) -> CoreResult<IssuedToken> {
        let now = Utc::now();
        let exp = Duration::try_seconds(self.lifetime_secs)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                CoreError::TokenFailure(format!(
                    "lifetime of {}s is out of range",
                    self.lifetime_secs
                ))
            })?;

        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| CoreError::TokenFailure(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Validates signature and expiry and returns the claims.
    pub fn verify(&self, token: &str) -> CoreResult<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let token_data: TokenData<Claims> = decode(token, &self.decoding, &validation)
            .map_err(|e| CoreError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_roundtrip() {
        let manager = TokenManager::new("test-secret", 3600);

        let issued = manager.issue("user-001", Role::Admin).unwrap();
        let claims = manager.verify(&issued.token).unwrap();

        assert_eq!(claims, issued.claims);
        assert_eq!(claims.principal(), Principal::new("user-001", Role::Admin));
        assert!(claims.expires_at() > Utc::now());
    }

    #[test]
    fn test_unique_per_issue() {
        let manager = TokenManager::new("test-secret", 3600);
        let a = manager.issue("u", Role::Customer).unwrap();
        let b = manager.issue("u", Role::Customer).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenManager::new("secret-a", 3600);
        let verifier = TokenManager::new("secret-b", 3600);

        let issued = issuer.issue("u", Role::Customer).unwrap();
        assert!(matches!(
            verifier.verify(&issued.token),
            Err(CoreError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_rejected() {
        let manager = TokenManager::new("test-secret", -60);
        let issued = manager.issue("u", Role::Customer).unwrap();

        assert!(manager.verify(&issued.token).is_err());
    }

    #[test]
    fn test_out_of_range_lifetime_fails_to_issue() {
        for lifetime in [i64::MAX, i64::MIN, i64::MAX / 1000] {
            let manager = TokenManager::new("test-secret", lifetime);
            assert!(matches!(
                manager.issue("u", Role::Customer),
                Err(CoreError::TokenFailure(_))
            ));
        }
    }

    #[test]
    fn test_garbage_rejected() {
        let manager = TokenManager::new("test-secret", 3600);
        assert!(manager.verify("not.a.jwt").is_err());
    }
}
