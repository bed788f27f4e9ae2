// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{CustomerProfile, ProfileResponse},
    state::AppState,
    storage::CustomerRepository,
};

/// Profile of the authenticated customer.
#[utoipa::path(
    get,
    path = "/profile",
    tag = "Session",
    security(("token" = [])),
    responses(
        (status = 200, description = "Customer profile", body = ProfileResponse),
        (status = 401, description = "Missing, invalid or expired token"),
        (status = 404, description = "Customer no longer exists")
    )
)]
pub async fn get_profile(
    Auth(customer): Auth,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let customer_id = customer.customer_id;
    let customer = state
        .blocking(move |store| CustomerRepository::new(store).get(customer_id))
        .await??;

    Ok(Json(ProfileResponse {
        customer: CustomerProfile::from(customer),
    }))
}
