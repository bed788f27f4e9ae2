// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account API endpoints.
//!
//! Every route requires a session token and only ever exposes accounts the
//! caller owns. An account owned by someone else is reported exactly like a
//! missing one.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::ApiJson;
use crate::{
    auth::Auth,
    error::ApiError,
    models::{AccountListResponse, AccountResponse, AccountUpdateRequest},
    state::AppState,
    storage::{AccountId, AccountRepository, BalanceDelta},
};

fn parse_account_id(raw: &str) -> Result<AccountId, ApiError> {
    raw.parse::<AccountId>()
        .map_err(|_| ApiError::bad_request("invalid account id"))
}

/// List the ids of the caller's accounts.
#[utoipa::path(
    get,
    path = "/account",
    tag = "Accounts",
    security(("token" = [])),
    responses(
        (status = 200, description = "Owned account ids", body = AccountListResponse),
        (status = 401, description = "Missing, invalid or expired token")
    )
)]
pub async fn list_accounts(
    Auth(customer): Auth,
    State(state): State<AppState>,
) -> Result<Json<AccountListResponse>, ApiError> {
    let customer_id = customer.customer_id;
    let accounts = state
        .blocking(move |store| AccountRepository::new(store).list_owned(customer_id))
        .await??;

    Ok(Json(AccountListResponse { accounts }))
}

/// Open a new zero-balance account for the caller.
#[utoipa::path(
    post,
    path = "/account",
    tag = "Accounts",
    security(("token" = [])),
    responses(
        (status = 201, description = "Account opened", body = AccountResponse),
        (status = 401, description = "Missing, invalid or expired token")
    )
)]
pub async fn open_account(
    Auth(customer): Auth,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let customer_id = customer.customer_id;
    let account = state
        .blocking(move |store| AccountRepository::new(store).open(customer_id))
        .await??;

    Ok((StatusCode::CREATED, Json(AccountResponse { account })))
}

/// Fetch one of the caller's accounts.
#[utoipa::path(
    get,
    path = "/account/{id}",
    tag = "Accounts",
    security(("token" = [])),
    params(
        ("id" = u64, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Account", body = AccountResponse),
        (status = 400, description = "Account id is not a number"),
        (status = 401, description = "Missing, invalid or expired token"),
        (status = 404, description = "Account not found or not owned by the caller")
    )
)]
pub async fn get_account(
    Auth(customer): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account_id = parse_account_id(&id)?;
    let customer_id = customer.customer_id;
    let account = state
        .blocking(move |store| AccountRepository::new(store).get_owned(customer_id, account_id))
        .await??;

    Ok(Json(AccountResponse { account }))
}

/// Withdraw from or deposit into one of the caller's accounts.
///
/// The ownership check and the balance change commit together or not at all.
#[utoipa::path(
    post,
    path = "/account/{id}",
    tag = "Accounts",
    security(("token" = [])),
    params(
        ("id" = u64, Path, description = "Account id")
    ),
    request_body = AccountUpdateRequest,
    responses(
        (status = 204, description = "Balance updated"),
        (status = 400, description = "Invalid account id, operation or amount"),
        (status = 401, description = "Missing, invalid or expired token"),
        (status = 404, description = "Account not found or not owned by the caller"),
        (status = 422, description = "Not enough funds for withdraw")
    )
)]
pub async fn update_account(
    Auth(customer): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<AccountUpdateRequest>,
) -> Result<StatusCode, ApiError> {
    let account_id = parse_account_id(&id)?;
    let delta = BalanceDelta::new(&request.operation, request.amount)?;
    let customer_id = customer.customer_id;

    state
        .blocking(move |store| {
            AccountRepository::new(store).apply_delta(customer_id, account_id, delta)
        })
        .await??;

    Ok(StatusCode::NO_CONTENT)
}
