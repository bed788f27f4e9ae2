// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login and signup endpoints.

use axum::{extract::State, http::StatusCode, Json};

use super::ApiJson;
use crate::{
    auth::AuthError,
    error::ApiError,
    models::{CustomerProfile, LoginRequest, ProfileResponse, SignupRequest, TokenResponse},
    state::AppState,
    storage::{CustomerError, CustomerRepository, NewCustomer},
};

/// Exchange email/password for a session token.
///
/// The token expires five minutes after issuance.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Session",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Malformed request body"),
        (status = 401, description = "User does not exist or invalid password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let LoginRequest { email, password } = request;
    let customer_id = state
        .blocking(move |store| CustomerRepository::new(store).authenticate(&email, &password))
        .await?
        .inspect_err(|e| {
            if matches!(e, CustomerError::InvalidCredentials) {
                tracing::info!("Login rejected: invalid credentials");
            }
        })?;

    let now = chrono::Utc::now().timestamp();
    let token = state.tokens.issue(customer_id, now).map_err(|e| match e {
        AuthError::Internal(msg) => {
            tracing::error!(error = %msg, customer_id, "Token issuance failed");
            ApiError::internal()
        }
        other => ApiError::new(other.status_code(), other.public_message()),
    })?;

    tracing::info!(customer_id, "Login succeeded");
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

/// Register a new customer.
#[utoipa::path(
    post,
    path = "/signup",
    tag = "Session",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Customer created", body = ProfileResponse),
        (status = 400, description = "Invalid signup data"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), ApiError> {
    let new_customer = NewCustomer::from(request);
    let customer = state
        .blocking(move |store| CustomerRepository::new(store).create(new_customer))
        .await??;

    Ok((
        StatusCode::CREATED,
        Json(ProfileResponse {
            customer: CustomerProfile::from(customer),
        }),
    ))
}
