// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Startup seeding of customers and accounts from a JSON file.
//!
//! ```json
//! {
//!   "customers": [
//!     {
//!       "id": 1,
//!       "email": "test@x.co",
//!       "password": "1234",
//!       "firstName": "Test",
//!       "lastName": "Customer",
//!       "accounts": [{ "id": 1, "balance": 100 }, { "id": 2, "balance": 0 }]
//!     }
//!   ]
//! }
//! ```
//!
//! Seeding is idempotent: customers whose email is already registered and
//! accounts whose id already exists are left untouched, so restarting with
//! the same file never resets a balance.

use std::path::Path;

use redb::ReadableTable;
use serde::Deserialize;

use super::database::{
    advance_sequence, in_write_txn, next_id, CredentialStore, StoreError, StoreResult, ACCOUNTS,
    ACCOUNT_SEQUENCE, CUSTOMERS, CUSTOMER_EMAILS, CUSTOMER_SEQUENCE,
};
use super::ownership::Ownership;
use super::repository::customers::insert_customer;
use super::repository::{AccountId, Customer, CustomerId};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid seed file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("customer id {0} is already taken by another email")]
    CustomerIdConflict(CustomerId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub customers: Vec<SeedCustomer>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedCustomer {
    /// Explicit id; allocated from the sequence when omitted.
    #[serde(default)]
    pub id: Option<CustomerId>,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub accounts: Vec<SeedAccount>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SeedAccount {
    pub id: AccountId,
    #[serde(default)]
    pub balance: i64,
}

/// What a seeding run actually wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub customers_created: usize,
    pub accounts_created: usize,
}

impl SeedData {
    /// Load seed data from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Apply the seed in a single write transaction.
    pub fn apply(&self, store: &CredentialStore) -> Result<SeedSummary, SeedError> {
        let summary = in_write_txn(store, |txn| {
            let mut summary = SeedSummary::default();

            for seed in &self.customers {
                let customer_id = match existing_customer_id(txn, &seed.email)? {
                    Some(id) => id,
                    None => {
                        let id = match seed.id {
                            Some(id) => {
                                if customer_id_taken(txn, id)? {
                                    return Err(SeedError::CustomerIdConflict(id));
                                }
                                id
                            }
                            None => next_id(txn, CUSTOMER_SEQUENCE)?,
                        };
                        insert_customer(
                            txn,
                            &Customer {
                                id,
                                email: seed.email.clone(),
                                password: seed.password.clone(),
                                first_name: seed.first_name.clone(),
                                last_name: seed.last_name.clone(),
                            },
                        )?;
                        summary.customers_created += 1;
                        id
                    }
                };

                for account in &seed.accounts {
                    if seed_account(txn, customer_id, account)? {
                        summary.accounts_created += 1;
                    }
                }
            }

            Ok(summary)
        })?;

        tracing::info!(
            customers = summary.customers_created,
            accounts = summary.accounts_created,
            "Seed applied"
        );
        Ok(summary)
    }
}

fn existing_customer_id(
    txn: &redb::WriteTransaction,
    email: &str,
) -> StoreResult<Option<CustomerId>> {
    let emails = txn.open_table(CUSTOMER_EMAILS)?;
    let id = emails.get(email)?.map(|v| v.value());
    Ok(id)
}

fn customer_id_taken(txn: &redb::WriteTransaction, id: CustomerId) -> StoreResult<bool> {
    let customers = txn.open_table(CUSTOMERS)?;
    let taken = customers.get(id)?.is_some();
    Ok(taken)
}

/// Create the account and its ownership row unless the account id exists.
fn seed_account(
    txn: &redb::WriteTransaction,
    customer_id: CustomerId,
    account: &SeedAccount,
) -> StoreResult<bool> {
    {
        let mut accounts = txn.open_table(ACCOUNTS)?;
        if accounts.get(account.id)?.is_some() {
            return Ok(false);
        }
        accounts.insert(account.id, account.balance)?;
    }
    Ownership::new(customer_id, account.id).grant(txn)?;
    advance_sequence(txn, ACCOUNT_SEQUENCE, account.id)?;
    Ok(true)
}
