//! PostgreSQL book store

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};

use super::{
    query::{build_search, SqlArg, BOOK_COLUMNS},
    BookStore, BookTransaction,
};
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, CreateBook},
};

#[derive(Clone)]
pub struct PgBookStore {
    pool: Pool<Postgres>,
}

impl PgBookStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn begin(&self) -> AppResult<Box<dyn BookTransaction>> {
        // Pool exhaustion surfaces here as PoolTimedOut after acquire_timeout
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;

        Ok(Box::new(PgBookTransaction { tx }))
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }
}

/// Wraps a sqlx transaction; dropping it without commit rolls back.
pub struct PgBookTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl BookTransaction for PgBookTransaction {
    async fn search(&mut self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let statement = build_search(filter);

        let mut query = sqlx::query_as::<_, Book>(&statement.sql);
        for arg in &statement.args {
            query = match arg {
                SqlArg::Int(value) => query.bind(*value),
                SqlArg::Text(value) => query.bind(value),
            };
        }

        let books = query.fetch_all(&mut *self.tx).await?;
        Ok(books)
    }

    async fn lock_book(&mut self, id: i32) -> AppResult<Option<Book>> {
        // Row lock held until commit/rollback: concurrent adjustments of the
        // same book wait here and then read the committed quantity.
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1 FOR UPDATE");
        let book = sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(book)
    }

    async fn write_quantity(&mut self, id: i32, quantity: i32) -> AppResult<()> {
        let result = sqlx::query("UPDATE books SET quantity = $1 WHERE id = $2")
            .bind(quantity)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    async fn insert_book(&mut self, book: &CreateBook) -> AppResult<Book> {
        let sql = format!(
            "INSERT INTO books (title, author, quantity) VALUES ($1, $2, $3) RETURNING {BOOK_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Book>(&sql)
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.quantity)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(created)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let PgBookTransaction { tx } = *self;
        // A failed commit leaves the sqlx transaction open; it is dropped
        // here, which issues the rollback on the connection.
        tx.commit()
            .await
            .map_err(|e| AppError::TransactionFailed(e.to_string()))
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        let PgBookTransaction { tx } = *self;
        tx.rollback().await?;
        Ok(())
    }
}
