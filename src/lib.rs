// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Account Service - token-authenticated account balances
//!
//! Customers log in with email/password, receive a short-lived HMAC token
//! and use it to list, inspect and move money in and out of the accounts
//! they own.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Session tokens and the `Auth` extractor
//! - `config` - Environment configuration
//! - `storage` - Credential store (redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod shutdown;
pub mod state;
pub mod storage;
