//! Saying Store Abstraction
//!
//! This module provides an abstraction over the relational store holding
//! sayings, so the quote service can run against SQLite or an in-memory
//! backend without knowing which one it has.

pub mod sqlite_store;
pub mod mock_store;

#[cfg(test)]
mod comprehensive_test;

use actix_web::Error;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Saying identifier type, assigned by the store
pub type SayingId = i64;

/// Normalization applied to saying text before uniqueness comparison
pub type KeyFn = fn(&str) -> String;

/// A single stored quote record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Saying {
    /// Store-assigned identifier
    pub id: SayingId,
    /// Insertion time, `YYYY-MM-DD HH:MM:SS`
    pub date: String,
    /// The quote text
    pub saying: String,
}

/// Trait defining the saying storage interface
///
/// Every call acquires its own connection and releases it before returning.
pub trait SayingStorage: Send + Sync {
    /// All saying ids, in storage order
    fn ids(&self) -> Result<Vec<SayingId>, Error>;

    /// Retrieve one saying. A missing id is a not-found error.
    fn get_saying(&self, id: SayingId) -> Result<Saying, Error>;

    /// All sayings, in storage order
    fn list_sayings(&self) -> Result<Vec<Saying>, Error>;

    /// Insert a saying and return the id the store assigned to it
    fn insert_saying(&self, date: &str, text: &str) -> Result<SayingId, Error>;

    /// Insert a saying unless a stored one has the same `key`.
    ///
    /// The scan and the insert happen under one write lock, so two concurrent
    /// submissions of the same text cannot both get in. Returns `None` when a
    /// collision was found and nothing was inserted.
    fn insert_if_absent(&self, date: &str, text: &str, key: KeyFn) -> Result<Option<SayingId>, Error>;
}

/// Not-found error for a saying id
pub fn saying_not_found(id: SayingId) -> Error {
    actix_web::error::ErrorNotFound(format!("No saying found for id: {}", id))
}

/// Whether an error coming out of the store means the row was missing
pub fn is_not_found(err: &Error) -> bool {
    err.as_response_error().status_code() == StatusCode::NOT_FOUND
}
