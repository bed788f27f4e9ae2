// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for account access.
//!
//! Every balance read or write must first confirm, through the
//! `customer_account` relation, that the acting customer owns the account.
//! The check runs inside the same transaction as the read or write it
//! guards, so ownership and balance are observed from one snapshot.

use redb::{ReadableTable, WriteTransaction};

use super::database::{StoreResult, CUSTOMER_ACCOUNTS};
use super::repository::{AccountError, AccountId, AccountResult, CustomerId};

/// A `(customer, account)` pair to be checked against the ownership relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    pub customer_id: CustomerId,
    pub account_id: AccountId,
}

impl Ownership {
    pub fn new(customer_id: CustomerId, account_id: AccountId) -> Self {
        Self {
            customer_id,
            account_id,
        }
    }

    fn key(&self) -> (u64, u64) {
        (self.customer_id, self.account_id)
    }

    /// Whether the relation contains this pair.
    pub fn exists<T>(&self, relation: &T) -> StoreResult<bool>
    where
        T: ReadableTable<(u64, u64), ()>,
    {
        Ok(relation.get(self.key())?.is_some())
    }

    /// Verify the pair is present.
    ///
    /// # Errors
    /// Returns `AccountError::NotFound` when the customer does not own the
    /// account, whether or not the account exists for someone else.
    pub fn verify<T>(&self, relation: &T) -> AccountResult<()>
    where
        T: ReadableTable<(u64, u64), ()>,
    {
        if self.exists(relation)? {
            Ok(())
        } else {
            tracing::debug!(
                customer_id = self.customer_id,
                account_id = self.account_id,
                "Ownership check failed"
            );
            Err(AccountError::NotFound)
        }
    }

    /// Record the pair inside the caller's write transaction.
    pub fn grant(&self, txn: &WriteTransaction) -> StoreResult<()> {
        let mut relation = txn.open_table(CUSTOMER_ACCOUNTS)?;
        relation.insert(self.key(), ())?;
        Ok(())
    }
}

/// All account ids owned by `customer_id`, ascending.
pub fn owned_account_ids<T>(relation: &T, customer_id: CustomerId) -> StoreResult<Vec<AccountId>>
where
    T: ReadableTable<(u64, u64), ()>,
{
    let mut ids = Vec::new();
    for entry in relation.range((customer_id, 0)..=(customer_id, u64::MAX))? {
        let (key, _) = entry?;
        let (_, account_id) = key.value();
        ids.push(account_id);
    }
    Ok(ids)
}
