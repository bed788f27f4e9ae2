// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! `Config` they are loaded into. Configuration is read once at startup and
//! is immutable afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATABASE_PATH` | redb credential store file | `./data/accounts.redb` |
//! | `TOKEN_SECRET` | HMAC secret for session tokens | Required (built-in with `dev` feature) |
//! | `TOKEN_TTL_SECS` | Session token lifetime in seconds | `300` |
//! | `SEED_FILE` | JSON file of customers/accounts to seed at startup | Optional |
//! | `TLS_CERT_PATH` | PEM certificate chain; enables HTTPS | Optional |
//! | `TLS_KEY_PATH` | PEM private key; required with `TLS_CERT_PATH` | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{net::SocketAddr, path::PathBuf};

use crate::auth::DEFAULT_TOKEN_TTL_SECS;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the credential store path.
///
/// The parent directory is created on startup if missing.
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";

/// Environment variable name for the token signing secret.
///
/// Shared by every token issued by this process. Changing it invalidates
/// all outstanding tokens.
pub const TOKEN_SECRET_ENV: &str = "TOKEN_SECRET";
pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_SECS";
pub const SEED_FILE_ENV: &str = "SEED_FILE";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE_PATH: &str = "./data/accounts.redb";

/// Default `RUST_LOG` filter when the variable is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[cfg(feature = "dev")]
const DEV_TOKEN_SECRET: &str = "dev-only-token-secret";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("TOKEN_SECRET must be set to a non-empty value")]
    MissingTokenSecret,

    #[error("invalid {name}: `{value}`")]
    Invalid { name: &'static str, value: String },

    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    IncompleteTls,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable text (development)
    #[default]
    Pretty,
    /// One JSON object per event (log aggregation)
    Json,
}

/// PEM certificate chain and private key for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Process configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub token_secret: String,
    pub token_ttl_secs: i64,
    pub seed_file: Option<PathBuf>,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("database_path", &self.database_path)
            .field("token_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("seed_file", &self.seed_file)
            .field("tls", &self.tls)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var(PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV,
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|_| ConfigError::Invalid {
                    name: HOST_ENV,
                    value: host.clone(),
                })?;

        let token_secret = match var(TOKEN_SECRET_ENV) {
            Some(secret) => secret,
            None => Self::fallback_secret()?,
        };

        let token_ttl_secs = match var(TOKEN_TTL_ENV) {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(ttl) if ttl > 0 => ttl,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: TOKEN_TTL_ENV,
                        value: raw,
                    })
                }
            },
            None => DEFAULT_TOKEN_TTL_SECS,
        };

        let tls = match (var(TLS_CERT_PATH_ENV), var(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        let log_format = match var(LOG_FORMAT_ENV).map(|v| v.trim().to_lowercase()) {
            None => LogFormat::default(),
            Some(v) if v == "pretty" || v == "text" => LogFormat::Pretty,
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    value: v,
                })
            }
        };

        Ok(Self {
            bind_addr,
            database_path: var(DATABASE_PATH_ENV)
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string())
                .into(),
            token_secret,
            token_ttl_secs,
            seed_file: var(SEED_FILE_ENV).map(PathBuf::from),
            tls,
            log_format,
        })
    }

    #[cfg(feature = "dev")]
    fn fallback_secret() -> Result<String, ConfigError> {
        tracing::warn!("{TOKEN_SECRET_ENV} not set, using the built-in development secret");
        Ok(DEV_TOKEN_SECRET.to_string())
    }

    #[cfg(not(feature = "dev"))]
    fn fallback_secret() -> Result<String, ConfigError> {
        Err(ConfigError::MissingTokenSecret)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply_with_only_secret() {
        let config = load(&[(TOKEN_SECRET_ENV, "s3cret")]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(config.token_secret, "s3cret");
        assert_eq!(config.token_ttl_secs, 300);
        assert!(config.seed_file.is_none());
        assert!(config.tls.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn overrides_are_read() {
        let config = load(&[
            (TOKEN_SECRET_ENV, "s3cret"),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9000"),
            (DATABASE_PATH_ENV, "/tmp/x.redb"),
            (TOKEN_TTL_ENV, "60"),
            (SEED_FILE_ENV, "seed.json"),
            (TLS_CERT_PATH_ENV, "cert.pem"),
            (TLS_KEY_PATH_ENV, "key.pem"),
            (LOG_FORMAT_ENV, "JSON"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.database_path, PathBuf::from("/tmp/x.redb"));
        assert_eq!(config.token_ttl_secs, 60);
        assert_eq!(config.seed_file, Some(PathBuf::from("seed.json")));
        assert_eq!(
            config.tls,
            Some(TlsPaths {
                cert: "cert.pem".into(),
                key: "key.pem".into()
            })
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[cfg(not(feature = "dev"))]
    #[test]
    fn secret_is_required() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::MissingTokenSecret);
        assert_eq!(
            load(&[(TOKEN_SECRET_ENV, "  ")]).unwrap_err(),
            ConfigError::MissingTokenSecret
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = load(&[(TOKEN_SECRET_ENV, "s"), (PORT_ENV, "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: PORT_ENV, .. }));

        let err = load(&[(TOKEN_SECRET_ENV, "s"), (TOKEN_TTL_ENV, "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: TOKEN_TTL_ENV, .. }));

        let err = load(&[(TOKEN_SECRET_ENV, "s"), (HOST_ENV, "not a host")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: HOST_ENV, .. }));

        let err = load(&[(TOKEN_SECRET_ENV, "s"), (LOG_FORMAT_ENV, "xml")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: LOG_FORMAT_ENV, .. }));
    }

    #[test]
    fn tls_paths_must_come_in_pairs() {
        let err = load(&[(TOKEN_SECRET_ENV, "s"), (TLS_CERT_PATH_ENV, "cert.pem")]).unwrap_err();
        assert_eq!(err, ConfigError::IncompleteTls);
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = load(&[(TOKEN_SECRET_ENV, "super-secret-value")]).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret-value"));
        assert!(printed.contains("<redacted>"));
    }
}
