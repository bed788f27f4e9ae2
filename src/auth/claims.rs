// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token claims and authenticated customer representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::CustomerId;

/// Payload of a session token.
///
/// Wire format: `{"userId": <int>, "exp": <unix seconds>}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Customer the token was issued to
    #[serde(rename = "userId")]
    pub user_id: CustomerId,

    /// Expiration timestamp (Unix seconds)
    pub exp: i64,
}

/// Authenticated customer extracted from a verified token.
///
/// This is the type handlers receive from the `Auth` extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedCustomer {
    /// Customer identifier carried by the token
    pub customer_id: CustomerId,

    /// Token expiration (Unix timestamp)
    #[serde(skip)]
    pub expires_at: i64,
}

impl From<TokenClaims> for AuthenticatedCustomer {
    fn from(claims: TokenClaims) -> Self {
        Self {
            customer_id: claims.user_id,
            expires_at: claims.exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_use_wire_field_names() {
        let claims = TokenClaims {
            user_id: 7,
            exp: 1_700_000_300,
        };
        let json = serde_json::to_value(claims).unwrap();
        assert_eq!(json, serde_json::json!({"userId": 7, "exp": 1_700_000_300}));
    }

    #[test]
    fn authenticated_customer_from_claims() {
        let customer = AuthenticatedCustomer::from(TokenClaims {
            user_id: 3,
            exp: 99,
        });
        assert_eq!(customer.customer_id, 3);
        assert_eq!(customer.expires_at, 99);
    }
}
