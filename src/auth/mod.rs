pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::types::Role;

pub use password::PasswordHasher;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Id of the student or admin the token was issued to
    pub sub: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing auth token")]
    MissingToken,

    #[error("{0}")]
    MalformedToken(String),

    #[error("signature is invalid")]
    InvalidSignature,

    #[error("token is expired")]
    Expired,

    #[error("JWT generation error: {0}")]
    Signing(String),
}

/// Issues and checks HS256 bearer tokens with a server-held secret
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl TokenService {
    const SEGMENTS: usize = 3;

    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        let hours = security.jwt_expiry_hours.min(SecurityConfig::MAX_JWT_EXPIRY_HOURS);
        Self::new(&security.jwt_secret, Duration::hours(i64::try_from(hours).unwrap_or_default()))
    }

    pub fn issue(&self, subject: &str, role: Role) -> Result<String, AuthError> {
        self.issue_with_ttl(subject, role, self.ttl)
    }

    pub fn issue_with_ttl(&self, subject: &str, role: Role, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            role,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        if token.split('.').count() != Self::SEGMENTS {
            return Err(AuthError::MalformedToken(
                "token contains an invalid number of segments".to_string(),
            ));
        }

        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::MalformedToken(e.to_string()),
            })
    }

    pub fn extract_subject(&self, token: &str) -> Result<String, AuthError> {
        self.validate(token).map(|claims| claims.sub)
    }

    pub fn is_admin(&self, token: &str) -> Result<bool, AuthError> {
        self.validate(token).map(|claims| claims.role.is_admin())
    }
}
