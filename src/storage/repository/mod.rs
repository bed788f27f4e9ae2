// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the credential store.
//!
//! Each repository borrows the `CredentialStore` and exposes the operations
//! for one relation, running each operation in its own transaction.

pub mod accounts;
pub mod customers;

pub use accounts::{
    Account, AccountError, AccountId, AccountRepository, AccountResult, BalanceDelta,
    BalanceOperation,
};
pub use customers::{
    Customer, CustomerError, CustomerId, CustomerRepository, CustomerResult, NewCustomer,
};
