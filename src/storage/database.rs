// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `customer`: customer_id → serialized customer record (JSON bytes)
//! - `customer_email`: email → customer_id (uniqueness index)
//! - `account`: account_id → balance
//! - `customer_account`: (customer_id, account_id) → () ownership relation
//! - `sequence`: relation name → last allocated id
//!
//! redb runs at most one write transaction at a time. Every balance update
//! reads and writes inside a single write transaction, so concurrent updates
//! to the same account are serialized by the store itself.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};

// =============================================================================
// Table Definitions
// =============================================================================

/// Customer records: customer_id → JSON-encoded `Customer`.
pub(crate) const CUSTOMERS: TableDefinition<u64, &[u8]> = TableDefinition::new("customer");

/// Email index: email → customer_id.
pub(crate) const CUSTOMER_EMAILS: TableDefinition<&str, u64> =
    TableDefinition::new("customer_email");

/// Account balances: account_id → balance.
pub(crate) const ACCOUNTS: TableDefinition<u64, i64> = TableDefinition::new("account");

/// Ownership relation: (customer_id, account_id) → ().
pub(crate) const CUSTOMER_ACCOUNTS: TableDefinition<(u64, u64), ()> =
    TableDefinition::new("customer_account");

/// Id sequences: relation name → last allocated id.
const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequence");

pub(crate) const CUSTOMER_SEQUENCE: &str = "customer";
pub(crate) const ACCOUNT_SEQUENCE: &str = "account";

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("failed to create data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("id sequence `{0}` exhausted")]
    SequenceExhausted(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// CredentialStore
// =============================================================================

/// Embedded ACID store for customers, accounts and ownership.
pub struct CredentialStore {
    db: Database,
}

impl CredentialStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CUSTOMERS)?;
            let _ = write_txn.open_table(CUSTOMER_EMAILS)?;
            let _ = write_txn.open_table(ACCOUNTS)?;
            let _ = write_txn.open_table(CUSTOMER_ACCOUNTS)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        tracing::debug!(path = %path.display(), "Credential store opened");
        Ok(Self { db })
    }

    /// Begin a snapshot read transaction.
    pub(crate) fn begin_read(&self) -> StoreResult<redb::ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    /// Begin the (exclusive) write transaction.
    pub(crate) fn begin_write(&self) -> StoreResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Cheap liveness probe: opens a read transaction against the customer table.
    pub fn ping(&self) -> StoreResult<()> {
        let read_txn = self.begin_read()?;
        let _ = read_txn.open_table(CUSTOMERS)?;
        Ok(())
    }
}

/// Run `work` inside a write transaction; commit on `Ok`, abort on `Err`.
///
/// Nothing `work` wrote is visible to other transactions unless it returns `Ok`
/// and the commit succeeds.
pub(crate) fn in_write_txn<T, E, F>(store: &CredentialStore, work: F) -> Result<T, E>
where
    F: FnOnce(&WriteTransaction) -> Result<T, E>,
    E: From<StoreError>,
{
    let txn = store.begin_write().map_err(E::from)?;
    match work(&txn) {
        Ok(value) => {
            txn.commit().map_err(|e| E::from(StoreError::from(e)))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(abort_err) = txn.abort() {
                tracing::error!(error = %abort_err, "Failed to abort write transaction");
            }
            Err(err)
        }
    }
}

/// Allocate the next id of a sequence inside the caller's transaction.
pub(crate) fn next_id(txn: &WriteTransaction, sequence: &'static str) -> StoreResult<u64> {
    let mut table = txn.open_table(SEQUENCES)?;
    let last = table.get(sequence)?.map(|v| v.value()).unwrap_or(0);
    let next = last
        .checked_add(1)
        .ok_or(StoreError::SequenceExhausted(sequence))?;
    table.insert(sequence, next)?;
    Ok(next)
}

/// Make sure future allocations from `sequence` land strictly after `id`.
pub(crate) fn advance_sequence(
    txn: &WriteTransaction,
    sequence: &'static str,
    id: u64,
) -> StoreResult<()> {
    let mut table = txn.open_table(SEQUENCES)?;
    let last = table.get(sequence)?.map(|v| v.value()).unwrap_or(0);
    if id > last {
        table.insert(sequence, id)?;
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
