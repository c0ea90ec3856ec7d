use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;
use uuid::Uuid;

use super::claims::Claims;

/// Shortest secret accepted for HS256 signing.
pub const MIN_SECRET_LEN: usize = 32;

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token creation failed: {0}")]
    Creation(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Secret key must be at least {min} bytes, got {len}")]
    SecretTooShort { min: usize, len: usize },
}

/// Signing secret, checked for length once at construction.
#[derive(Clone)]
pub struct TokenSecret(Vec<u8>);

impl TokenSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let bytes = secret.into();
        if bytes.len() < MIN_SECRET_LEN {
            return Err(TokenError::SecretTooShort {
                min: MIN_SECRET_LEN,
                len: bytes.len(),
            });
        }
        Ok(Self(bytes))
    }
}

impl std::fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenSecret([hidden])")
    }
}

/// Issues and verifies HS256 access tokens.
///
/// Holds only immutable key material, so a single instance is cloned into every
/// request that needs it.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &ALGORITHM)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: TokenSecret) -> Self {
        // Expiry is checked by verify_at so that `exp` itself already counts as expired.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(&secret.0),
            decoding_key: DecodingKey::from_secret(&secret.0),
            validation,
        }
    }

    /// Issue a token for a user, valid for `duration` from now.
    pub fn issue(
        &self,
        user_id: Uuid,
        username: &str,
        email: &str,
        duration: Duration,
    ) -> Result<(String, Claims), TokenError> {
        self.issue_at(user_id, username, email, duration, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: Uuid,
        username: &str,
        email: &str,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> Result<(String, Claims), TokenError> {
        let lifetime = duration.num_seconds();
        if lifetime <= 0 {
            return Err(TokenError::Creation(format!(
                "token lifetime must be positive, got {}s",
                lifetime
            )));
        }

        let iat = now.timestamp();
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            email: email.to_string(),
            jti: token_id()?,
            iat,
            exp: iat + lifetime,
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Creation(e.to_string()))?;

        Ok((token, claims))
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        // Every decode failure is treated as a forgery: bad signature, wrong
        // algorithm, mangled segments and undecodable payloads alike.
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::InvalidSignature)?;

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

fn token_id() -> Result<Uuid, TokenError> {
    let mut bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| TokenError::Creation(format!("secure random source failed: {}", e)))?;
    Ok(uuid::Builder::from_random_bytes(bytes).into_uuid())
}
