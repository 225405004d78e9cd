//! Session Authentication
//!
//! Signed session tokens carried in an HttpOnly cookie. The rest of the
//! server only ever sees the verified [`Identity`]; it is used for the
//! owner check on `/jobs/{email}`.

pub mod cookies;

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use solosphere_core::dto::session::TokenRequest;

/// A verified caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no session token")]
    MissingToken,

    #[error("invalid session token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),

    #[error("failed to sign session token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Issues and verifies session tokens
pub trait Authenticator: Send + Sync {
    /// Mint a token for the given identity claims
    fn issue(&self, claims: &TokenRequest) -> Result<String, AuthError>;

    /// Verify a token and return the identity it was minted for
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    email: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
    iat: i64,
    exp: i64,
}

/// HS256 JWT authenticator
pub struct JwtAuthenticator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtAuthenticator {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }
}

impl Authenticator for JwtAuthenticator {
    fn issue(&self, claims: &TokenRequest) -> Result<String, AuthError> {
        let now = Utc::now();

        let mut extra = claims.extra.clone();
        // registered claims are ours to set
        for reserved in ["iat", "exp", "email"] {
            extra.remove(reserved);
        }

        let claims = Claims {
            email: claims.email.clone(),
            extra,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(AuthError::Signing)
    }

    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(AuthError::InvalidToken)?;

        Ok(Identity {
            email: data.claims.email,
        })
    }
}
