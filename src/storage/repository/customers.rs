// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Customer repository: signup, credential check and profile lookup.
//!
//! ## Security
//!
//! Passwords are stored and compared as plaintext. This keeps login
//! behaviour identical to the existing customer table and is NOT safe for
//! a production deployment.

use redb::{ReadableTable, WriteTransaction};
use serde::{Deserialize, Serialize};

use super::super::database::{
    advance_sequence, in_write_txn, next_id, CredentialStore, StoreError, StoreResult,
    CUSTOMERS, CUSTOMER_EMAILS, CUSTOMER_SEQUENCE,
};

pub type CustomerId = u64;

/// Errors raised by customer operations.
#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    /// No customer matches the email/password pair.
    #[error("user does not exist or invalid password")]
    InvalidCredentials,

    #[error("email already registered")]
    EmailTaken,

    #[error("customer not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type CustomerResult<T> = Result<T, CustomerError>;

/// Stored customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Fields supplied at signup.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl NewCustomer {
    fn validate(&self) -> CustomerResult<()> {
        if self.email.trim().is_empty() {
            return Err(CustomerError::Validation("email is required".to_string()));
        }
        if !self.email.contains('@') {
            return Err(CustomerError::Validation(
                "email must contain `@`".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(CustomerError::Validation(
                "password is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Insert a customer with a known id inside the caller's transaction.
///
/// Returns `Ok(false)` without writing if the email is already registered.
pub(crate) fn insert_customer(txn: &WriteTransaction, customer: &Customer) -> StoreResult<bool> {
    let mut emails = txn.open_table(CUSTOMER_EMAILS)?;
    if emails.get(customer.email.as_str())?.is_some() {
        return Ok(false);
    }
    emails.insert(customer.email.as_str(), customer.id)?;

    let json = serde_json::to_vec(customer)?;
    let mut customers = txn.open_table(CUSTOMERS)?;
    customers.insert(customer.id, json.as_slice())?;
    advance_sequence(txn, CUSTOMER_SEQUENCE, customer.id)?;
    Ok(true)
}

/// Repository for customer operations on the credential store.
pub struct CustomerRepository<'a> {
    store: &'a CredentialStore,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new CustomerRepository.
    pub fn new(store: &'a CredentialStore) -> Self {
        Self { store }
    }

    /// Register a new customer.
    pub fn create(&self, new: NewCustomer) -> CustomerResult<Customer> {
        new.validate()?;

        let customer = in_write_txn(self.store, |txn| {
            let id = next_id(txn, CUSTOMER_SEQUENCE)?;
            let customer = Customer {
                id,
                email: new.email.trim().to_string(),
                password: new.password,
                first_name: new.first_name,
                last_name: new.last_name,
            };
            if insert_customer(txn, &customer)? {
                Ok(customer)
            } else {
                Err(CustomerError::EmailTaken)
            }
        })?;

        tracing::info!(customer_id = customer.id, "Customer registered");
        Ok(customer)
    }

    /// Resolve an email/password pair to a customer id.
    pub fn authenticate(&self, email: &str, password: &str) -> CustomerResult<CustomerId> {
        let read_txn = self.store.begin_read()?;
        let emails = read_txn
            .open_table(CUSTOMER_EMAILS)
            .map_err(StoreError::from)?;
        let Some(id) = emails
            .get(email.trim())
            .map_err(StoreError::from)?
            .map(|v| v.value())
        else {
            return Err(CustomerError::InvalidCredentials);
        };

        let customer = self.load(&read_txn, id)?;
        if customer.password == password {
            Ok(customer.id)
        } else {
            Err(CustomerError::InvalidCredentials)
        }
    }

    /// Fetch a customer by id.
    pub fn get(&self, customer_id: CustomerId) -> CustomerResult<Customer> {
        let read_txn = self.store.begin_read()?;
        self.load(&read_txn, customer_id)
    }

    fn load(
        &self,
        read_txn: &redb::ReadTransaction,
        customer_id: CustomerId,
    ) -> CustomerResult<Customer> {
        let customers = read_txn.open_table(CUSTOMERS).map_err(StoreError::from)?;
        let bytes = customers
            .get(customer_id)
            .map_err(StoreError::from)?
            .map(|v| v.value().to_vec())
            .ok_or(CustomerError::NotFound)?;
        Ok(serde_json::from_slice(&bytes).map_err(StoreError::from)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::tests::temp_store;

    fn new_customer(email: &str) -> NewCustomer {
        NewCustomer {
            email: email.to_string(),
            password: "1234".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }

    #[test]
    fn create_and_authenticate() {
        let (store, _dir) = temp_store();
        let repo = CustomerRepository::new(&store);

        let customer = repo.create(new_customer("ada@x.co")).unwrap();
        assert_eq!(customer.id, 1);
        assert_eq!(repo.authenticate("ada@x.co", "1234").unwrap(), 1);
        assert_eq!(repo.get(1).unwrap(), customer);
    }

    #[test]
    fn authenticate_rejects_wrong_password_and_unknown_email() {
        let (store, _dir) = temp_store();
        let repo = CustomerRepository::new(&store);
        repo.create(new_customer("ada@x.co")).unwrap();

        assert!(matches!(
            repo.authenticate("ada@x.co", "12345"),
            Err(CustomerError::InvalidCredentials)
        ));
        assert!(matches!(
            repo.authenticate("nobody@x.co", "1234"),
            Err(CustomerError::InvalidCredentials)
        ));
        assert!(matches!(
            repo.authenticate("", ""),
            Err(CustomerError::InvalidCredentials)
        ));
    }

    #[test]
    fn duplicate_email_is_rejected_without_consuming_state() {
        let (store, _dir) = temp_store();
        let repo = CustomerRepository::new(&store);
        repo.create(new_customer("ada@x.co")).unwrap();

        assert!(matches!(
            repo.create(new_customer("ada@x.co")),
            Err(CustomerError::EmailTaken)
        ));
        // The aborted attempt did not burn an id
        assert_eq!(repo.create(new_customer("bob@x.co")).unwrap().id, 2);
    }

    #[test]
    fn signup_validation() {
        let (store, _dir) = temp_store();
        let repo = CustomerRepository::new(&store);

        assert!(matches!(
            repo.create(new_customer("  ")),
            Err(CustomerError::Validation(_))
        ));
        assert!(matches!(
            repo.create(new_customer("no-at-sign")),
            Err(CustomerError::Validation(_))
        ));

        let mut no_password = new_customer("ada@x.co");
        no_password.password.clear();
        assert!(matches!(
            repo.create(no_password),
            Err(CustomerError::Validation(_))
        ));
    }

    #[test]
    fn get_unknown_customer() {
        let (store, _dir) = temp_store();
        let repo = CustomerRepository::new(&store);
        assert!(matches!(repo.get(5), Err(CustomerError::NotFound)));
    }
}
