// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::{auth::TokenService, error::ApiError, storage::CredentialStore};

/// Shared, read-only application state.
///
/// Holds no mutable in-process data: the store serializes its own writes
/// and the token service is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CredentialStore>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(store: CredentialStore, tokens: TokenService) -> Self {
        Self {
            store: Arc::new(store),
            tokens: Arc::new(tokens),
        }
    }

    /// Run blocking store work on the blocking thread pool.
    ///
    /// redb calls block (the write lock in particular), so handlers never
    /// touch the store from an async worker directly.
    pub async fn blocking<F, T>(&self, work: F) -> Result<T, ApiError>
    where
        F: FnOnce(&CredentialStore) -> T + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || work(&store))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Store task failed");
                ApiError::internal()
            })
    }
}
