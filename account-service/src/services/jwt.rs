use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::JwtConfig;
use crate::models::Role;

/// Token service for identity token issuance and validation
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_hours: i64,
}

/// Claims carried by an issued token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject (user ID)
    pub sub: i64,
    /// Display name
    pub name: String,
    /// Account role
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Why a presented token was rejected. Every kind means "unauthenticated";
/// the distinction is for server-side diagnostics only and must not be
/// surfaced to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("token signature mismatch")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token malformed")]
    Malformed,
}

impl TokenService {
    /// Create a new token service from the process-wide signing secret.
    ///
    /// The secret is injected once at construction; rotating it invalidates
    /// every previously issued token. No revocation list exists; expiry is
    /// the only eviction mechanism.
    pub fn new(config: &JwtConfig) -> Result<Self, anyhow::Error> {
        if config.secret.is_empty() {
            return Err(anyhow::anyhow!("JWT signing secret must not be empty"));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl_hours: config.ttl_hours,
        })
    }

    /// Issue a signed token for an already-authenticated user.
    ///
    /// Deterministic given identical inputs and `now`.
    pub fn issue(
        &self,
        subject_id: i64,
        display_name: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, anyhow::Error> {
        let exp = now + Duration::hours(self.ttl_hours);

        let claims = IdentityClaims {
            sub: subject_id,
            name: display_name.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode token: {}", e))?;

        Ok(token)
    }

    /// Validate and decode a token, evaluated fresh per request.
    ///
    /// The signature is checked before anything else; expiry is checked
    /// against the injected `now` rather than the wall clock so callers (and
    /// tests) control time.
    pub fn parse(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is validated below against the caller's clock.
        validation.validate_exp = false;

        let token_data =
            decode::<IdentityClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                    _ => AuthError::Malformed,
                }
            })?;

        if now.timestamp() > token_data.claims.exp {
            return Err(AuthError::Expired);
        }

        Ok(token_data.claims)
    }

    /// Token lifetime in seconds (for client info)
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_service(secret: &str) -> TokenService {
        TokenService::new(&JwtConfig {
            secret: secret.to_string(),
            ttl_hours: 24,
        })
        .expect("Failed to create token service")
    }

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = TokenService::new(&JwtConfig {
            secret: String::new(),
            ttl_hours: 24,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_issue_and_parse_roundtrip() {
        let service = test_service("test-secret");
        let t0 = issued_at();

        let token = service
            .issue(42, "Jane Admin", Role::Admin, t0)
            .expect("Failed to issue token");
        assert!(!token.is_empty());

        let claims = service
            .parse(&token, t0 + Duration::hours(1))
            .expect("Token should parse within TTL");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.name, "Jane Admin");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iat, t0.timestamp());
        assert_eq!(claims.exp, (t0 + Duration::hours(24)).timestamp());
    }

    #[test]
    fn test_issue_is_deterministic_given_now() {
        let service = test_service("test-secret");
        let t0 = issued_at();

        let a = service.issue(7, "Sam", Role::User, t0).unwrap();
        let b = service.issue(7, "Sam", Role::User, t0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_accepts_boundary_of_ttl() {
        let service = test_service("test-secret");
        let t0 = issued_at();
        let token = service.issue(7, "Sam", Role::User, t0).unwrap();

        // Exactly at expiry is still valid; one second past is not.
        assert!(service.parse(&token, t0 + Duration::hours(24)).is_ok());
        assert_eq!(
            service.parse(&token, t0 + Duration::hours(24) + Duration::seconds(1)),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn test_parse_expired_token() {
        let service = test_service("test-secret");
        let t0 = issued_at();
        let token = service.issue(7, "Sam", Role::User, t0).unwrap();

        let result = service.parse(&token, t0 + Duration::hours(25));
        assert_eq!(result, Err(AuthError::Expired));
    }

    #[test]
    fn test_parse_rejects_wrong_secret() {
        let issuer = test_service("secret-one");
        let verifier = test_service("secret-two");
        let t0 = issued_at();

        let token = issuer.issue(7, "Sam", Role::User, t0).unwrap();
        let result = verifier.parse(&token, t0);
        assert_eq!(result, Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_parse_rejects_tampered_payload() {
        let service = test_service("test-secret");
        let t0 = issued_at();
        let token = service.issue(7, "Sam", Role::User, t0).unwrap();

        // Flip one character inside the payload segment.
        let mut parts: Vec<String> = token.split('.').map(|s| s.to_string()).collect();
        assert_eq!(parts.len(), 3);
        let payload = &mut parts[1];
        let mid = payload.len() / 2;
        let original = payload.as_bytes()[mid];
        let replacement = if original == b'A' { b'B' } else { b'A' };
        payload.replace_range(mid..mid + 1, std::str::from_utf8(&[replacement]).unwrap());
        let tampered = parts.join(".");

        let result = service.parse(&tampered, t0);
        assert_eq!(result, Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let service = test_service("test-secret");
        let now = issued_at();

        assert_eq!(
            service.parse("not-a-token", now),
            Err(AuthError::Malformed)
        );
        assert_eq!(service.parse("", now), Err(AuthError::Malformed));
        assert_eq!(
            service.parse("a.b.c.d", now),
            Err(AuthError::Malformed)
        );
    }

    #[test]
    fn test_expired_and_tampered_reports_signature_first() {
        let service = test_service("test-secret");
        let t0 = issued_at();
        let token = service.issue(7, "Sam", Role::User, t0).unwrap();

        let mut parts: Vec<String> = token.split('.').map(|s| s.to_string()).collect();
        parts[2] = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_string();
        let tampered = parts.join(".");

        // Signature mismatch wins even when the token is also past expiry.
        let result = service.parse(&tampered, t0 + Duration::hours(48));
        assert_eq!(result, Err(AuthError::InvalidSignature));
    }
}
