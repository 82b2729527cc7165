//! HS256 issuance and validation for user and seat tokens. The two live in
//! separate namespaces: a seat token never decodes as user claims and vice
//! versa, so `Either` validation (see [`crate::principal`]) is simply
//! "try both, expect exactly one to succeed".

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::{validate_window, SeatClaims, TokenValidationError, UserClaims};

fn claims_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    // Window checks are performed deterministically against a caller-supplied
    // `now` instead of the system clock baked into the jsonwebtoken crate.
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation
}

/// Issues and validates user (operator) JWTs against a single HS256 secret.
#[derive(Clone)]
pub struct UserJwt {
    secret: Vec<u8>,
}

impl UserJwt {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self { secret: secret.into() }
    }

    pub fn issue(&self, claims: &UserClaims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(&self.secret))
    }

    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<UserClaims, TokenValidationError> {
        if token.trim().is_empty() {
            return Err(TokenValidationError::MissingToken);
        }
        let decoded = decode::<UserClaims>(token, &DecodingKey::from_secret(&self.secret), &claims_validation())
            .map_err(|e| TokenValidationError::InvalidToken(e.to_string()))?;
        validate_window(decoded.claims.issued_at, decoded.claims.expires_at, now)?;
        Ok(decoded.claims)
    }
}

/// Issues and validates seat (judge) JWTs. Uses a distinct secret from
/// [`UserJwt`] so neither token kind can be replayed as the other even if
/// the claim shapes happened to overlap.
#[derive(Clone)]
pub struct SeatJwt {
    secret: Vec<u8>,
}

impl SeatJwt {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self { secret: secret.into() }
    }

    pub fn issue(&self, claims: &SeatClaims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(&self.secret))
    }

    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SeatClaims, TokenValidationError> {
        if token.trim().is_empty() {
            return Err(TokenValidationError::MissingToken);
        }
        let decoded = decode::<SeatClaims>(token, &DecodingKey::from_secret(&self.secret), &claims_validation())
            .map_err(|e| TokenValidationError::InvalidToken(e.to_string()))?;
        validate_window(decoded.claims.issued_at, decoded.claims.expires_at, now)?;
        Ok(decoded.claims)
    }
}
