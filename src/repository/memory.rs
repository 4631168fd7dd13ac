//! In-process book store.
//!
//! Mirrors the transactional behavior the services rely on from PostgreSQL:
//! `lock_book` takes a per-row lock held until the transaction ends, writes
//! are buffered and only become visible on commit, and dropping a
//! transaction discards its writes. Ids come from a sequence that, like
//! SERIAL, is not rolled back.
//!
//! Row lock entries only outlive a transaction for ids that exist; a lookup
//! of a missing id leaves the lock table as it found it.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{BookStore, BookTransaction};
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, CreateBook},
};

#[derive(Default)]
struct Shared {
    books: Mutex<BTreeMap<i32, Book>>,
    row_locks: Mutex<HashMap<i32, Arc<Mutex<()>>>>,
    last_id: AtomicI32,
}

#[derive(Clone, Default)]
pub struct MemoryBookStore {
    shared: Arc<Shared>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed state, ordered by id
    pub async fn snapshot(&self) -> Vec<Book> {
        self.shared.books.lock().await.values().cloned().collect()
    }

    #[cfg(test)]
    pub(crate) async fn row_lock_count(&self) -> usize {
        self.shared.row_locks.lock().await.len()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn begin(&self) -> AppResult<Box<dyn BookTransaction>> {
        Ok(Box::new(MemoryTransaction {
            shared: Arc::clone(&self.shared),
            held: HashMap::new(),
            writes: BTreeMap::new(),
        }))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct MemoryTransaction {
    shared: Arc<Shared>,
    held: HashMap<i32, OwnedMutexGuard<()>>,
    writes: BTreeMap<i32, Book>,
}

impl MemoryTransaction {
    /// Lock row `id` until the transaction ends.
    ///
    /// Returns `false`, holding nothing, when the row does not exist.
    async fn acquire(&mut self, id: i32) -> bool {
        if self.held.contains_key(&id) {
            return true;
        }
        let lock = {
            let mut locks = self.shared.row_locks.lock().await;
            Arc::clone(locks.entry(id).or_default())
        };
        let guard = Arc::clone(&lock).lock_owned().await;

        if self.read(id).await.is_some() {
            self.held.insert(id, guard);
            return true;
        }

        drop(guard);
        let mut locks = self.shared.row_locks.lock().await;
        // Clones are only taken under the table lock, so 2 is the entry and ours
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&id);
        }
        false
    }

    async fn read(&self, id: i32) -> Option<Book> {
        match self.writes.get(&id) {
            Some(book) => Some(book.clone()),
            None => self.shared.books.lock().await.get(&id).cloned(),
        }
    }
}

#[async_trait]
impl BookTransaction for MemoryTransaction {
    async fn search(&mut self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let mut visible = self.shared.books.lock().await.clone();
        visible.extend(self.writes.iter().map(|(id, book)| (*id, book.clone())));

        Ok(visible
            .into_values()
            .filter(|book| filter.matches(book))
            .collect())
    }

    async fn lock_book(&mut self, id: i32) -> AppResult<Option<Book>> {
        if !self.acquire(id).await {
            return Ok(None);
        }
        Ok(self.read(id).await)
    }

    async fn write_quantity(&mut self, id: i32, quantity: i32) -> AppResult<()> {
        if quantity < 0 {
            return Err(AppError::Internal(format!(
                "quantity of book {} would become {}",
                id, quantity
            )));
        }

        let not_found = || AppError::NotFound(format!("Book with id {} not found", id));
        if !self.acquire(id).await {
            return Err(not_found());
        }
        let mut book = self.read(id).await.ok_or_else(not_found)?;
        book.quantity = quantity;
        self.writes.insert(id, book);
        Ok(())
    }

    async fn insert_book(&mut self, book: &CreateBook) -> AppResult<Book> {
        let id = self.shared.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = Book {
            id,
            title: book.title.clone(),
            author: book.author.clone(),
            quantity: book.quantity,
        };
        self.writes.insert(id, created.clone());
        Ok(created)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTransaction { shared, held, writes } = *self;
        shared.books.lock().await.extend(writes);
        // Row locks are released only once the writes are visible
        drop(held);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}
