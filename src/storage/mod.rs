// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Credential Store Module
//!
//! Persistent storage for customers, accounts and the ownership relation
//! between them, on an embedded redb database.
//!
//! ## Relations
//!
//! ```text
//! customer          id → { email, password, first_name, last_name }
//! customer_email    email → id
//! account           id → balance
//! customer_account  (customer_id, account_id) → ()
//! ```
//!
//! ## Important Notes
//!
//! - No balance is read or written without an ownership check in the same
//!   transaction (see `ownership`)
//! - redb operations are blocking; async callers go through
//!   `AppState::blocking`

pub mod database;
pub mod ownership;
pub mod repository;
pub mod seed;

pub use database::{CredentialStore, StoreError, StoreResult};
pub use ownership::Ownership;
pub use repository::{
    Account, AccountError, AccountId, AccountRepository, AccountResult, BalanceDelta,
    BalanceOperation, Customer, CustomerError, CustomerId, CustomerRepository, CustomerResult,
    NewCustomer,
};
pub use seed::{SeedData, SeedError, SeedSummary};
