use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::types::Role;

/// The actor behind one request. Built by the identity middleware, carried in
/// the request scope, dropped with the request.
#[derive(async_graphql::SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    /// `None` when the request named no role, or one that is not recognized
    pub role: Option<Role>,
}

impl Principal {
    pub fn new(id: impl Into<String>, role: Option<Role>) -> Self {
        Self { id: id.into(), role }
    }

    pub fn anonymous(id: impl Into<String>) -> Self {
        Self::new(id, None)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: impl Into<String>, role: Role, expiry_hours: u64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(JwtError::ExpiryOutOfRange(expiry_hours))?;

        Ok(Self {
            sub: sub.into(),
            role: role.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        // An unknown role claim still identifies the caller; the gate rejects it
        let role = claims.role.parse().ok();
        Principal::new(claims.sub, role)
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("Token lifetime of {0} hours is out of range")]
    ExpiryOutOfRange(u64),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry, returning the claims
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trips_to_principal() {
        let token = generate_jwt(&Claims::new("42", Role::Manager, 1).unwrap(), SECRET).unwrap();
        let principal = Principal::from(validate_jwt(&token, SECRET).unwrap());
        assert_eq!(principal, Principal::new("42", Some(Role::Manager)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_jwt(&Claims::new("42", Role::Admin, 1).unwrap(), SECRET).unwrap();
        assert!(matches!(validate_jwt(&token, "other"), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            sub: "42".to_string(),
            role: "ADMIN".to_string(),
            exp: Utc::now().timestamp() - 3600,
            iat: Utc::now().timestamp() - 7200,
        };
        let token = generate_jwt(&claims, SECRET).unwrap();
        assert!(validate_jwt(&token, SECRET).is_err());
    }

    #[test]
    fn oversized_lifetime_is_an_error() {
        assert!(matches!(
            Claims::new("1", Role::Admin, u64::MAX),
            Err(JwtError::ExpiryOutOfRange(u64::MAX))
        ));
        assert!(matches!(
            Claims::new("1", Role::Admin, i64::MAX as u64),
            Err(JwtError::ExpiryOutOfRange(_))
        ));
    }

    #[test]
    fn lifetime_sets_expiry_after_issue() {
        let claims = Claims::new("1", Role::Employee, 24).unwrap();
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        assert!(matches!(
            generate_jwt(&Claims::new("1", Role::Admin, 1).unwrap(), ""),
            Err(JwtError::InvalidSecret)
        ));
    }

    #[test]
    fn unknown_role_claim_becomes_roleless_principal() {
        let claims = Claims {
            sub: "7".to_string(),
            role: "superuser".to_string(),
            exp: 0,
            iat: 0,
        };
        assert_eq!(Principal::from(claims).role, None);
    }
}
