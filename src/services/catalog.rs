//! Catalog search and creation service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, BookSearch, CreateBook},
    repository::BookStore,
};

use super::{abort, stock::parse_book_id};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn BookStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// Search books; every parameter is optional
    pub async fn search(&self, search: &BookSearch) -> AppResult<Vec<Book>> {
        let filter = to_filter(search)?;

        let mut tx = self.store.begin().await?;
        let books = match tx.search(&filter).await {
            Ok(books) => books,
            Err(e) => return abort(tx, e).await,
        };
        tx.commit().await?;

        tracing::debug!("Book search {:?} matched {} record(s)", filter, books.len());
        Ok(books)
    }

    /// Every book in the catalog
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.search(&BookSearch::default()).await
    }

    /// Create a new book record
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let mut tx = self.store.begin().await?;
        let created = match tx.insert_book(&book).await {
            Ok(created) => created,
            Err(e) => return abort(tx, e).await,
        };
        tx.commit().await?;

        tracing::info!("Created book id={} \"{}\"", created.id, created.title);
        Ok(created)
    }

    /// Store connectivity check for readiness probes
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}

/// Convert raw query parameters to a typed filter.
///
/// An empty or negative id means "no id filter"; anything else that is not
/// an integer is rejected.
fn to_filter(search: &BookSearch) -> AppResult<BookFilter> {
    let id = match search.id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(parse_book_id(raw)?).filter(|id| *id >= 0),
    };

    Ok(BookFilter {
        id,
        title: search.title.clone().filter(|s| !s.is_empty()),
        author: search.author.clone().filter(|s| !s.is_empty()),
    })
}
