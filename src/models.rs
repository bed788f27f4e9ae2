// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::{Account, AccountId, Customer, CustomerId, NewCustomer};

/// Credentials posted to `/login`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "test@x.co")]
    pub email: String,
    #[schema(example = "1234")]
    pub password: String,
}

/// Session token returned by `/login`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Value to send in the `x-authentication-token` header
    pub token: String,
}

/// Ids of the accounts owned by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountListResponse {
    pub accounts: Vec<AccountId>,
}

/// A single owned account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub account: Account,
}

/// Balance change posted to `/account/{id}`.
///
/// `type` is validated after parsing so that an unknown operation is
/// reported as a validation failure rather than a malformed body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AccountUpdateRequest {
    /// `withdraw` or `deposit`
    #[serde(rename = "type")]
    #[schema(example = "withdraw")]
    pub operation: String,
    /// Non-negative amount
    #[schema(example = 5)]
    pub amount: i64,
}

/// New customer posted to `/signup`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl From<SignupRequest> for NewCustomer {
    fn from(request: SignupRequest) -> Self {
        Self {
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
        }
    }
}

/// Customer profile (never includes the password).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub id: CustomerId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<Customer> for CustomerProfile {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            email: customer.email,
            first_name: customer.first_name,
            last_name: customer.last_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub customer: CustomerProfile,
}
