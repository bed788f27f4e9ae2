// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session-token authentication for the account API.
//!
//! ## Auth Flow
//!
//! 1. Customer posts email/password to `/login`
//! 2. Server checks the credentials and issues an HS256 token
//!    `{userId, exp}` valid for five minutes
//! 3. Customer sends the token in the `x-authentication-token` header
//! 4. The `Auth` extractor verifies signature and expiry and hands the
//!    customer id to the handler
//!
//! ## Security
//!
//! - One shared signing secret, fixed at startup
//! - No revocation and no refresh; a token dies at `exp`
//! - No clock skew leeway

pub mod claims;
pub mod error;
pub mod extractor;
pub mod token;

pub use claims::{AuthenticatedCustomer, TokenClaims};
pub use error::AuthError;
pub use extractor::{authenticate, Auth, AUTH_TOKEN_HEADER};
pub use token::{TokenService, DEFAULT_TOKEN_TTL_SECS};
