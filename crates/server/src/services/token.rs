//! Signed bearer tokens.
//!
//! RS256-signed JWTs carrying the username and role, issued on login and
//! registration and transported in an HTTP-only cookie. Verification fails
//! closed: any decode, signature or expiry problem rejects the token.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use evergreen_core::UserRole;

/// Errors from issuing or verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Key material could not be read from disk.
    #[error("failed to read key file {path}: {source}")]
    KeyFile {
        path: String,
        source: std::io::Error,
    },

    /// Key material is not valid PEM.
    #[error("invalid key material: {0}")]
    InvalidKey(jsonwebtoken::errors::Error),

    /// The token failed to encode or decode.
    #[error("invalid token")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// JWT claims payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to.
    pub sub: String,
    /// Role at issuance time.
    pub role: UserRole,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// Token signer/verifier over an RS256 keypair.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    /// Build a codec from PEM-encoded RSA keys.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidKey` if either PEM is malformed.
    pub fn from_pem(
        private_pem: &[u8],
        public_pem: &[u8],
        ttl_minutes: i64,
    ) -> Result<Self, TokenError> {
        Ok(Self {
            encoding: EncodingKey::from_rsa_pem(private_pem).map_err(TokenError::InvalidKey)?,
            decoding: DecodingKey::from_rsa_pem(public_pem).map_err(TokenError::InvalidKey)?,
            ttl: Duration::minutes(ttl_minutes),
        })
    }

    /// Build a codec from key files on disk.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::KeyFile` if a file cannot be read,
    /// `TokenError::InvalidKey` if its content is not a valid PEM key.
    pub fn from_key_files(
        private_key_path: &str,
        public_key_path: &str,
        ttl_minutes: i64,
    ) -> Result<Self, TokenError> {
        let private_pem = std::fs::read(private_key_path).map_err(|source| TokenError::KeyFile {
            path: private_key_path.to_owned(),
            source,
        })?;
        let public_pem = std::fs::read(public_key_path).map_err(|source| TokenError::KeyFile {
            path: public_key_path.to_owned(),
            source,
        })?;
        Self::from_pem(&private_pem, &public_pem, ttl_minutes)
    }

    /// Issue a token for a username/role pair.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if signing fails.
    pub fn issue(&self, username: &str, role: UserRole) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_owned(),
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` on a bad signature, malformed token or
    /// expired claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::RS256))?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE_PEM: &[u8] = include_bytes!("../../testdata/jwt_private.pem");
    const PUBLIC_PEM: &[u8] = include_bytes!("../../testdata/jwt_public.pem");

    fn codec(ttl_minutes: i64) -> TokenCodec {
        TokenCodec::from_pem(PRIVATE_PEM, PUBLIC_PEM, ttl_minutes).expect("build codec")
    }

    #[test]
    fn issue_then_verify_round_trips() {
        let codec = codec(15);
        let token = codec.issue("alice", UserRole::Customer).expect("issue");
        let claims = codec.verify(&token).expect("verify");
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, UserRole::Customer);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected() {
        // Negative TTL puts exp in the past.
        let codec = codec(-10);
        let token = codec.issue("alice", UserRole::Admin).expect("issue");
        assert!(codec.verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let codec = codec(15);
        assert!(codec.verify("not-a-token").is_err());
        assert!(codec.verify("").is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let codec = codec(15);
        let token = codec.issue("alice", UserRole::Customer).expect("issue");
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push('A');
        assert!(codec.verify(&tampered).is_err());
    }

    #[test]
    fn bad_pem_is_rejected() {
        assert!(TokenCodec::from_pem(b"nope", PUBLIC_PEM, 15).is_err());
    }
}
