// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account repository: ownership-gated balance reads and updates.
//!
//! ## Balance updates
//!
//! `apply_delta` runs the ownership check, the balance read and the balance
//! write inside one redb write transaction. redb admits a single writer at a
//! time, so two withdrawals racing on the same account are applied one after
//! the other and the second one sees the balance left by the first.

use std::fmt;

use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{
    in_write_txn, next_id, CredentialStore, StoreError, ACCOUNTS, ACCOUNT_SEQUENCE,
    CUSTOMER_ACCOUNTS,
};
use super::super::ownership::{owned_account_ids, Ownership};
use super::CustomerId;

pub type AccountId = u64;

/// Errors raised by account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// The customer does not own the account (or it does not exist).
    #[error("account not found")]
    NotFound,

    /// Withdrawal would drive the balance below zero.
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: i64, requested: i64 },

    /// The request payload failed validation.
    #[error("{0}")]
    Validation(String),

    /// Deposit would overflow the balance.
    #[error("balance overflow")]
    BalanceOverflow,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type AccountResult<T> = Result<T, AccountError>;

/// An account as seen by its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Account {
    /// Account identifier
    pub id: AccountId,
    /// Current balance
    pub balance: i64,
}

/// Kind of balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BalanceOperation {
    Withdraw,
    Deposit,
}

impl BalanceOperation {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "withdraw" => Some(Self::Withdraw),
            "deposit" => Some(Self::Deposit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Withdraw => "withdraw",
            Self::Deposit => "deposit",
        }
    }
}

impl fmt::Display for BalanceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated balance change. Only constructible through [`BalanceDelta::new`],
/// so an invalid operation or a negative amount never reaches a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceDelta {
    operation: BalanceOperation,
    amount: i64,
}

impl BalanceDelta {
    /// Validate a raw `(type, amount)` payload.
    pub fn new(operation: &str, amount: i64) -> AccountResult<Self> {
        let operation = BalanceOperation::parse(operation).ok_or_else(|| {
            AccountError::Validation(format!(
                "invalid operation type `{operation}` (expected `withdraw` or `deposit`)"
            ))
        })?;
        if amount < 0 {
            return Err(AccountError::Validation(
                "amount must be non-negative".to_string(),
            ));
        }
        Ok(Self { operation, amount })
    }

    pub fn withdraw(amount: i64) -> AccountResult<Self> {
        Self::new(BalanceOperation::Withdraw.as_str(), amount)
    }

    pub fn deposit(amount: i64) -> AccountResult<Self> {
        Self::new(BalanceOperation::Deposit.as_str(), amount)
    }

    pub fn operation(&self) -> BalanceOperation {
        self.operation
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Compute the balance after applying this delta to `balance`.
    pub fn apply_to(&self, balance: i64) -> AccountResult<i64> {
        match self.operation {
            BalanceOperation::Withdraw => match balance.checked_sub(self.amount) {
                Some(remaining) if remaining >= 0 => Ok(remaining),
                _ => Err(AccountError::InsufficientFunds {
                    balance,
                    requested: self.amount,
                }),
            },
            BalanceOperation::Deposit => balance
                .checked_add(self.amount)
                .ok_or(AccountError::BalanceOverflow),
        }
    }
}

/// Repository for account operations on the credential store.
pub struct AccountRepository<'a> {
    store: &'a CredentialStore,
}

impl<'a> AccountRepository<'a> {
    /// Create a new AccountRepository.
    pub fn new(store: &'a CredentialStore) -> Self {
        Self { store }
    }

    /// List the ids of every account owned by the customer. Empty if none.
    pub fn list_owned(&self, customer_id: CustomerId) -> AccountResult<Vec<AccountId>> {
        let read_txn = self.store.begin_read()?;
        let relation = read_txn
            .open_table(CUSTOMER_ACCOUNTS)
            .map_err(StoreError::from)?;
        Ok(owned_account_ids(&relation, customer_id)?)
    }

    /// Fetch an account the customer owns.
    pub fn get_owned(
        &self,
        customer_id: CustomerId,
        account_id: AccountId,
    ) -> AccountResult<Account> {
        let read_txn = self.store.begin_read()?;
        let relation = read_txn
            .open_table(CUSTOMER_ACCOUNTS)
            .map_err(StoreError::from)?;
        Ownership::new(customer_id, account_id).verify(&relation)?;

        let accounts = read_txn.open_table(ACCOUNTS).map_err(StoreError::from)?;
        let balance = accounts
            .get(account_id)
            .map_err(StoreError::from)?
            .map(|v| v.value())
            .ok_or(AccountError::NotFound)?;

        Ok(Account {
            id: account_id,
            balance,
        })
    }

    /// Apply a validated delta to an owned account and return its new state.
    ///
    /// Ownership check, balance read and balance write happen in one write
    /// transaction. On any error the transaction is aborted and the stored
    /// balance is untouched.
    pub fn apply_delta(
        &self,
        customer_id: CustomerId,
        account_id: AccountId,
        delta: BalanceDelta,
    ) -> AccountResult<Account> {
        let account = in_write_txn(self.store, |txn| {
            let relation = txn
                .open_table(CUSTOMER_ACCOUNTS)
                .map_err(StoreError::from)?;
            Ownership::new(customer_id, account_id).verify(&relation)?;

            let mut accounts = txn.open_table(ACCOUNTS).map_err(StoreError::from)?;
            let balance = accounts
                .get(account_id)
                .map_err(StoreError::from)?
                .map(|v| v.value())
                .ok_or(AccountError::NotFound)?;

            let new_balance = delta.apply_to(balance)?;
            accounts
                .insert(account_id, new_balance)
                .map_err(StoreError::from)?;

            Ok::<_, AccountError>(Account {
                id: account_id,
                balance: new_balance,
            })
        });

        match &account {
            Ok(account) => tracing::info!(
                customer_id,
                account_id,
                operation = %delta.operation(),
                amount = delta.amount(),
                balance = account.balance,
                "Balance updated"
            ),
            Err(AccountError::Store(e)) => tracing::error!(
                customer_id,
                account_id,
                error = %e,
                "Balance update failed"
            ),
            Err(e) => tracing::info!(
                customer_id,
                account_id,
                operation = %delta.operation(),
                amount = delta.amount(),
                reason = %e,
                "Balance update rejected"
            ),
        }

        account
    }

    /// Open a new zero-balance account owned by the customer.
    pub fn open(&self, customer_id: CustomerId) -> AccountResult<Account> {
        let account = in_write_txn(self.store, |txn| {
            let account_id = next_id(txn, ACCOUNT_SEQUENCE)?;
            {
                let mut accounts = txn.open_table(ACCOUNTS)?;
                accounts.insert(account_id, 0)?;
            }
            Ownership::new(customer_id, account_id).grant(txn)?;
            Ok::<_, StoreError>(Account {
                id: account_id,
                balance: 0,
            })
        })?;

        tracing::info!(customer_id, account_id = account.id, "Account opened");
        Ok(account)
    }
}
