//! JWT (JSON Web Token) handling for console sessions

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `token_type` claim carried by browser/API sessions
pub const SESSION_TOKEN_TYPE: &str = "session";

/// Issuer stamped on every session token
pub const SESSION_ISSUER: &str = "routerdesk";

/// Audience stamped on every session token
pub const SESSION_AUDIENCE: &str = "routerdesk-console";

/// JWT claims for console sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JwtClaims {
    /// Subject (user id)
    pub sub: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Custom: user UUID the session belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Custom: user role (admin, user)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
    /// Custom: token kind; only "session" tokens are accepted by the API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl JwtClaims {
    pub fn new(subject: String, issuer: String, audience: String, validity: Duration) -> Self {
        let now = Utc::now();
        let exp = now + validity;

        Self {
            sub: subject,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: issuer,
            aud: audience,
            user_id: None,
            user_role: None,
            token_type: None,
        }
    }

    /// Claims for a signed-in operator
    pub fn session(user_id: String, role: String, validity: Duration) -> Self {
        Self::new(
            user_id.clone(),
            SESSION_ISSUER.to_string(),
            SESSION_AUDIENCE.to_string(),
            validity,
        )
        .with_user_id(user_id)
        .with_user_role(role)
        .with_token_type(SESSION_TOKEN_TYPE.to_string())
    }

    pub fn with_user_id(mut self, user_id: String) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_user_role(mut self, role: String) -> Self {
        self.user_role = Some(role);
        self
    }

    pub fn with_token_type(mut self, token_type: String) -> Self {
        self.token_type = Some(token_type);
        self
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    pub fn expires_at(&self) -> chrono::DateTime<Utc> {
        chrono::DateTime::<Utc>::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// JWT errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,
}

/// JWT validator
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    /// Create a new JWT validator using HMAC-SHA256 (symmetric secret)
    ///
    /// Validates signature and expiration only; issuer and audience checks
    /// are opt-in through [`with_issuer`](Self::with_issuer) and
    /// [`with_audience`](Self::with_audience).
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.validate_nbf = false;
        // No leeway: an expired session is expired
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn with_audience(mut self, audience: String) -> Self {
        self.validation.set_audience(&[audience]);
        self
    }

    pub fn with_issuer(mut self, issuer: String) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    pub fn validate(&self, token: &str) -> Result<JwtClaims, JwtError> {
        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)?;

        if token_data.claims.is_expired() {
            return Err(JwtError::TokenExpired);
        }

        Ok(token_data.claims)
    }

    /// Encode JWT using HMAC-SHA256 (symmetric secret)
    pub fn encode(secret: &[u8], claims: &JwtClaims) -> Result<String, JwtError> {
        let header = Header::new(Algorithm::HS256);
        let encoding_key = EncodingKey::from_secret(secret);

        Ok(encode(&header, claims, &encoding_key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &[u8] = b"test_secret_key_1234567890";

    #[test]
    fn test_jwt_encode_decode() {
        let claims = JwtClaims::new(
            "user-123".to_string(),
            "test-issuer".to_string(),
            "test-audience".to_string(),
            Duration::hours(1),
        );

        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();

        let validator = JwtValidator::new(TEST_SECRET)
            .with_issuer("test-issuer".to_string())
            .with_audience("test-audience".to_string());

        let decoded_claims = validator.validate(&token).unwrap();

        assert_eq!(decoded_claims.sub, claims.sub);
        assert_eq!(decoded_claims.iss, claims.iss);
        assert_eq!(decoded_claims.aud, claims.aud);
    }

    #[test]
    fn test_session_claims_round_trip() {
        let claims = JwtClaims::session(
            "9b2f4f5e-0000-4000-8000-000000000001".to_string(),
            "admin".to_string(),
            Duration::hours(12),
        );

        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();
        let decoded = JwtValidator::new(TEST_SECRET)
            .with_issuer(SESSION_ISSUER.to_string())
            .with_audience(SESSION_AUDIENCE.to_string())
            .validate(&token)
            .unwrap();

        assert_eq!(
            decoded.user_id.as_deref(),
            Some("9b2f4f5e-0000-4000-8000-000000000001")
        );
        assert_eq!(decoded.user_role.as_deref(), Some("admin"));
        assert_eq!(decoded.token_type.as_deref(), Some(SESSION_TOKEN_TYPE));
    }

    #[test]
    fn test_expired_token() {
        let claims = JwtClaims::new(
            "user-789".to_string(),
            "issuer".to_string(),
            "audience".to_string(),
            Duration::seconds(-10), // Already expired
        );

        assert!(claims.is_expired());

        let token = JwtValidator::encode(TEST_SECRET, &claims).unwrap();

        let validator = JwtValidator::new(TEST_SECRET);
        let result = validator.validate(&token);

        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = JwtClaims::session("u".to_string(), "user".to_string(), Duration::hours(1));
        let token = JwtValidator::encode(b"one-secret", &claims).unwrap();

        assert!(JwtValidator::new(b"another-secret").validate(&token).is_err());
    }

    #[test]
    fn test_optional_claims_skipped_when_none() {
        let claims = JwtClaims::new(
            "user-1".to_string(),
            "issuer".to_string(),
            "audience".to_string(),
            Duration::hours(1),
        );

        let json = serde_json::to_string(&claims).unwrap();

        assert!(!json.contains("user_id"));
        assert!(!json.contains("user_role"));
        assert!(!json.contains("token_type"));
    }

    #[test]
    fn test_expires_at_matches_exp() {
        let claims = JwtClaims::session("u".to_string(), "user".to_string(), Duration::hours(2));
        assert_eq!(claims.expires_at().timestamp(), claims.exp);
    }
}
