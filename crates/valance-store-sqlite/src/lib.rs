//! SQLite backend for the Valance submission store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. [`SqliteDatabase`] opens a fresh
//! connection for every [`Database::connect`](valance_core::store::Database)
//! call; connections are never pooled.

mod database;
mod encode;
mod schema;
mod store;

pub mod error;

pub use database::{CheckReport, SqliteDatabase};
pub use error::{Error, Result};
pub use store::SqliteStore;
