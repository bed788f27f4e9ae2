// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use axum_server::{tls_rustls::RustlsConfig, Handle};
use relational_account_service::{
    api::router,
    auth::TokenService,
    config::Config,
    logging::init_logging,
    shutdown::{shutdown_signal, SHUTDOWN_GRACE_PERIOD},
    state::AppState,
    storage::{CredentialStore, SeedData, SeedError, StoreError},
};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("failed to open credential store: {0}")]
    Store(#[from] StoreError),

    #[error("failed to apply seed data: {0}")]
    Seed(#[from] SeedError),

    #[error("failed to install rustls crypto provider")]
    CryptoProvider,

    #[error("failed to load TLS certificate/key: {0}")]
    Tls(std::io::Error),

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server terminated");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), StartupError> {
    tracing::info!(?config, "Starting account service");

    let store = CredentialStore::open(&config.database_path)?;
    tracing::info!(path = %config.database_path.display(), "Credential store opened");

    if let Some(seed_file) = &config.seed_file {
        let summary = SeedData::from_file(seed_file)?.apply(&store)?;
        tracing::info!(
            path = %seed_file.display(),
            customers = summary.customers_created,
            accounts = summary.accounts_created,
            "Seed data applied"
        );
    }

    let tokens = TokenService::new(config.token_secret.as_bytes(), config.token_ttl_secs);
    let app = router(AppState::new(store, tokens));

    let handle = Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE_PERIOD));
    });

    let addr = config.bind_addr;
    match &config.tls {
        Some(tls) => {
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| StartupError::CryptoProvider)?;
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .map_err(StartupError::Tls)?;

            tracing::info!(%addr, "Listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .map_err(StartupError::Serve)?;
        }
        None => {
            tracing::info!(%addr, "Listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .map_err(StartupError::Serve)?;
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}
