// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// Missing, unreadable and forged tokens all answer `"token error"`;
/// a correctly signed token past its expiry answers `"invalid token"`.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No token header present
    #[error("x-authentication-token header is required")]
    MissingToken,
    /// Token header is not valid visible ASCII
    #[error("x-authentication-token header is not a valid string")]
    InvalidHeader,
    /// Token cannot be parsed or its signature does not verify
    #[error("token is malformed or its signature is invalid")]
    MalformedToken,
    /// Token has expired
    #[error("token has expired")]
    TokenExpired,
    /// Token could not be produced
    #[error("internal authentication error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: &'static str,
    error_code: &'static str,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidHeader => "invalid_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Message exposed to the caller. Deliberately coarse.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::MissingToken | AuthError::InvalidHeader | AuthError::MalformedToken => {
                "token error"
            }
            AuthError::TokenExpired => "invalid token",
            AuthError::Internal(_) => "internal error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidHeader
            | AuthError::MalformedToken
            | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::Internal(msg) => tracing::error!(error = %msg, "Authentication failure"),
            _ => tracing::debug!(reason = %self, "Request rejected by authentication"),
        }

        let body = Json(AuthErrorBody {
            error: self.public_message(),
            error_code: self.error_code(),
        });
        (self.status_code(), body).into_response()
    }
}
