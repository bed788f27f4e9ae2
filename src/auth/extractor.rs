// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated customers.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(customer): Auth) -> impl IntoResponse {
//!     // customer is AuthenticatedCustomer
//! }
//! ```
//!
//! The token travels in the `x-authentication-token` header as the bare
//! token string (no `Bearer ` prefix).

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderName, HeaderValue},
};

use super::{AuthError, AuthenticatedCustomer, TokenService};
use crate::state::AppState;

/// Header carrying the session token.
pub const AUTH_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-authentication-token");

/// Authentication gate: verify the presented token at time `now`.
///
/// Pure function of the header value, the clock and the token service's
/// secret; it keeps no state of its own.
pub fn authenticate(
    header: Option<&HeaderValue>,
    tokens: &TokenService,
    now: i64,
) -> Result<AuthenticatedCustomer, AuthError> {
    let token = header
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidHeader)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    let claims = tokens.verify_claims(token, now)?;
    Ok(claims.into())
}

/// Extractor for authenticated customers.
///
/// Rejects the request with `401` before the handler runs when the token is
/// missing, malformed, forged or expired.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_accounts(
///     Auth(customer): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<AccountListResponse>, ApiError> {
///     // customer.customer_id is the token's userId
/// }
/// ```
pub struct Auth(pub AuthenticatedCustomer);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let now = chrono::Utc::now().timestamp();
        let customer = authenticate(parts.headers.get(AUTH_TOKEN_HEADER), &state.tokens, now)?;
        Ok(Auth(customer))
    }
}
