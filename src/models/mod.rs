//! Data models for Bookstock

pub mod book;

// Re-export commonly used types
pub use book::{Book, BookFilter, BookSearch, CreateBook, StockDirection};
