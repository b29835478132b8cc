//! SQLite backend for the Amoura matchmaking store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every uniqueness rule of the domain is
//! a SQLite index or key; see [`schema`](crate::schema) for the DDL.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
