//! Integration tests
//!
//! `api_tests` run the full router in-process on the in-memory store.
//! `postgres_tests` need a PostgreSQL server:
//! DATABASE_URL=postgres://... cargo test -- --ignored

mod api_tests;
