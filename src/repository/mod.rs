//! Repository layer for database operations
//!
//! Services talk to the store only through [`BookStore`] and the
//! [`BookTransaction`] it hands out. Every read and write happens inside a
//! transaction; dropping a transaction without committing rolls it back.

pub mod books;
pub mod memory;
pub mod query;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::book::{Book, BookFilter, CreateBook},
};

pub use books::PgBookStore;
pub use memory::MemoryBookStore;

/// Entry point to a transactional book store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Open a transaction. Fails with `StoreUnavailable` when no connection
    /// can be obtained.
    async fn begin(&self) -> AppResult<Box<dyn BookTransaction>>;

    /// Cheap connectivity check
    async fn ping(&self) -> AppResult<()>;
}

/// An open transaction against the books table
#[async_trait]
pub trait BookTransaction: Send {
    /// Books matching `filter`, ordered by id
    async fn search(&mut self, filter: &BookFilter) -> AppResult<Vec<Book>>;

    /// Read one book and lock its row until the transaction ends
    async fn lock_book(&mut self, id: i32) -> AppResult<Option<Book>>;

    async fn write_quantity(&mut self, id: i32, quantity: i32) -> AppResult<()>;

    async fn insert_book(&mut self, book: &CreateBook) -> AppResult<Book>;

    /// Commit. On failure the transaction is rolled back and
    /// `TransactionFailed` is returned.
    async fn commit(self: Box<Self>) -> AppResult<()>;

    async fn rollback(self: Box<Self>) -> AppResult<()>;
}
