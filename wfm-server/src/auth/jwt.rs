//! JWT token service
//!
//! Issues and validates access/refresh token pairs. Both tokens carry the
//! user id as subject; the refresh token additionally carries a `jti` so
//! that rotation can revoke its predecessor.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::models::Role;

/// JWT configuration. Deliberately not serializable: the signing secret
/// must never leave the process through a serializer.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Signing secret (at least 32 bytes)
    pub secret: String,
    /// Access token lifetime in minutes
    pub access_minutes: i64,
    /// Refresh token lifetime in days
    pub refresh_days: i64,
    pub issuer: String,
    pub audience: String,
}

impl JwtConfig {
    /// Load from environment. Without `JWT_SECRET` a random development
    /// secret is generated; sessions then die with the process.
    pub fn from_env() -> Self {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(s) if s.len() >= 32 => s,
            Ok(_) => {
                tracing::warn!("JWT_SECRET shorter than 32 bytes, generating a temporary secret");
                generate_dev_secret()
            }
            Err(_) => {
                tracing::warn!("JWT_SECRET not set, generating a temporary development secret");
                generate_dev_secret()
            }
        };

        Self {
            secret,
            access_minutes: std::env::var("ACCESS_TOKEN_LIFETIME")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(15),
            refresh_days: std::env::var("REFRESH_TOKEN_LIFETIME")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(7),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "wfm-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "wfm-clients".to_string()),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn generate_dev_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Claims stored in both token kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id ("user:abc")
    pub sub: String,
    /// "access" | "refresh"
    pub token_type: String,
    /// Token id, used for refresh revocation
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

/// Signed access/refresh pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Wrong token type: expected {expected}")]
    WrongTokenType { expected: &'static str },

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

/// JWT token service
#[derive(Debug, Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new() -> Self {
        Self::with_config(JwtConfig::from_env())
    }

    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a fresh access/refresh pair for a user
    pub fn issue_pair(&self, user_id: &str) -> Result<TokenPair, JwtError> {
        let access = self.generate(
            user_id,
            "access",
            Duration::minutes(self.config.access_minutes),
        )?;
        let refresh = self.generate(user_id, "refresh", Duration::days(self.config.refresh_days))?;
        Ok(TokenPair { access, refresh })
    }

    fn generate(
        &self,
        user_id: &str,
        token_type: &str,
        lifetime: Duration,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            token_type: token_type.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate an access token and return its claims
    pub fn validate_access(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate(token, "access")
    }

    /// Validate a refresh token and return its claims
    pub fn validate_refresh(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate(token, "refresh")
    }

    fn validate(&self, token: &str, expected_type: &'static str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        if token_data.claims.token_type != expected_type {
            return Err(JwtError::WrongTokenType {
                expected: expected_type,
            });
        }

        Ok(token_data.claims)
    }

    /// Extract the token from an Authorization header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolved caller identity, injected by the auth middleware after the
/// bearer token has been mapped to a live user document
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// User id ("user:abc")
    pub id: String,
    pub email: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "test-secret-that-is-long-enough-0123456789".to_string(),
            access_minutes: 15,
            refresh_days: 7,
            issuer: "wfm-server".to_string(),
            audience: "wfm-clients".to_string(),
        })
    }

    #[test]
    fn test_issue_and_validate_pair() {
        let service = test_service();
        let pair = service.issue_pair("user:abc").expect("issue pair");

        let access = service.validate_access(&pair.access).expect("access valid");
        assert_eq!(access.sub, "user:abc");
        assert_eq!(access.token_type, "access");

        let refresh = service
            .validate_refresh(&pair.refresh)
            .expect("refresh valid");
        assert_eq!(refresh.sub, "user:abc");
        assert!(!refresh.jti.is_empty());
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn test_token_type_confusion_rejected() {
        let service = test_service();
        let pair = service.issue_pair("user:abc").expect("issue pair");

        // A refresh token must not pass as an access token, and vice versa
        assert!(matches!(
            service.validate_access(&pair.refresh),
            Err(JwtError::WrongTokenType { expected: "access" })
        ));
        assert!(matches!(
            service.validate_refresh(&pair.access),
            Err(JwtError::WrongTokenType {
                expected: "refresh"
            })
        ));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = test_service();
        let pair = service.issue_pair("user:abc").expect("issue pair");

        let mut tampered = pair.access.clone();
        tampered.push('x');
        assert!(service.validate_access(&tampered).is_err());
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(
            JwtService::extract_from_header("Bearer abc.def.ghi"),
            Some("abc.def.ghi")
        );
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }
}
