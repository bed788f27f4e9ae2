// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with one process-wide shared secret.
//! Expiry is checked against the caller-supplied `now` (Unix seconds) with
//! no leeway: a token issued at `T` is valid for `now` in `[T, T + ttl)`.

use std::fmt;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{AuthError, TokenClaims};
use crate::storage::CustomerId;

/// Default token lifetime (5 minutes).
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 5 * 60;

/// Issues and verifies session tokens.
///
/// Built once at startup from the configured secret and shared read-only.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against the caller's clock in `verify`
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a token for `customer_id`, expiring `ttl` seconds after `now`.
    pub fn issue(&self, customer_id: CustomerId, now: i64) -> Result<String, AuthError> {
        let claims = TokenClaims {
            user_id: customer_id,
            exp: now.saturating_add(self.ttl_secs),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("token generation error: {e}")))
    }

    /// Verify a token and return the customer it was issued to.
    ///
    /// # Errors
    /// - `AuthError::MalformedToken` if the token does not parse or its
    ///   signature does not match the shared secret
    /// - `AuthError::TokenExpired` if `now >= exp`
    pub fn verify(&self, token: &str, now: i64) -> Result<CustomerId, AuthError> {
        self.verify_claims(token, now).map(|claims| claims.user_id)
    }

    /// Like [`verify`](Self::verify) but returns the full claims.
    pub fn verify_claims(&self, token: &str, now: i64) -> Result<TokenClaims, AuthError> {
        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                AuthError::MalformedToken
            })?;

        let claims = token_data.claims;
        if now >= claims.exp {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}
