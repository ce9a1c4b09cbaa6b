//! Relational Store Module
//!
//! Access to the `test_table` relation. The Postgres implementation opens one
//! connection per call; the in-memory implementation backs tests.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgStore;

// == Public Constants ==
/// Maximum number of rows returned by a listing
pub const LIST_LIMIT: i64 = 100;

/// Maximum `name` length in characters
pub const NAME_MAX_CHARS: usize = 255;

// == Test Record ==
/// One row of `test_table`.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct TestRecord {
    pub id: i32,
    pub name: String,
    pub value: Option<String>,
    pub created_at: NaiveDateTime,
}

// == Store Error ==
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Record Store Trait ==
/// Operations the handlers need from the relational store.
///
/// Every call is its own unit of work; nothing is held between calls.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Acquires and releases one connection.
    async fn ping(&self) -> StoreResult<()>;

    /// Returns at most `limit` records.
    async fn list_records(&self, limit: i64) -> StoreResult<Vec<TestRecord>>;

    /// Inserts a record and returns it with its assigned id and timestamp.
    async fn insert_record(&self, name: &str, value: &str) -> StoreResult<TestRecord>;

    async fn count_records(&self) -> StoreResult<i64>;
}
