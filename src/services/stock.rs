//! Checkout / return of book copies
//!
//! Each adjustment is one read-check-write-commit cycle inside a single
//! transaction. The read locks the row, so two adjustments of the same book
//! serialize and neither can act on a quantity the other is about to change.

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, StockDirection},
    repository::BookStore,
};

use super::abort;

#[derive(Clone)]
pub struct StockService {
    store: Arc<dyn BookStore>,
}

impl StockService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// Take one copy off the shelf
    pub async fn checkout(&self, id: &str) -> AppResult<Book> {
        self.adjust_stock(id, StockDirection::Checkout).await
    }

    /// Put one copy back on the shelf
    pub async fn return_copy(&self, id: &str) -> AppResult<Book> {
        self.adjust_stock(id, StockDirection::Return).await
    }

    /// Apply one stock adjustment and return the book as committed.
    ///
    /// The returned quantity is the value written in this transaction, not a
    /// re-read.
    pub async fn adjust_stock(&self, id: &str, direction: StockDirection) -> AppResult<Book> {
        let id = parse_book_id(id)?;

        let mut tx = self.store.begin().await?;

        let book = match tx.lock_book(id).await {
            Ok(Some(book)) => book,
            Ok(None) => {
                return abort(tx, AppError::NotFound(format!("Book with id {} not found", id))).await
            }
            Err(e) => return abort(tx, e).await,
        };

        let quantity = match next_quantity(&book, direction) {
            Ok(quantity) => quantity,
            Err(e) => return abort(tx, e).await,
        };

        if let Err(e) = tx.write_quantity(id, quantity).await {
            return abort(tx, e).await;
        }

        tx.commit().await?;

        tracing::info!(
            book_id = id,
            %direction,
            quantity,
            "Stock adjusted"
        );

        Ok(Book { quantity, ..book })
    }
}

/// Parse a caller-supplied book identifier
pub fn parse_book_id(id: &str) -> AppResult<i32> {
    id.trim()
        .parse::<i32>()
        .map_err(|_| AppError::InvalidIdentifier(format!("'{}' is not a valid book id", id)))
}

/// Quantity after applying `direction` to `book`.
///
/// Returns are not capped: a copy can always be returned.
fn next_quantity(book: &Book, direction: StockDirection) -> AppResult<i32> {
    match direction {
        StockDirection::Checkout if book.quantity <= 0 => Err(AppError::OutOfStock(format!(
            "Book {} has no copies available",
            book.id
        ))),
        StockDirection::Checkout => Ok(book.quantity - 1),
        StockDirection::Return => book.quantity.checked_add(1).ok_or_else(|| {
            AppError::Validation(format!("Book {} cannot hold more copies", book.id))
        }),
    }
}
