//! Core types and trait definitions for the Amoura matchmaking backend.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the swipe-to-match engine: the [`detector`] and the [`service`] that
//! orchestrates it over any backend implementing the [`store`] traits.

// Store traits use native `async fn`; their futures are bounded by `Send`.
#![allow(async_fn_in_trait)]

pub mod detector;
pub mod error;
pub mod matching;
pub mod message;
pub mod service;
pub mod store;
pub mod swipe;
pub mod user;

pub use error::{Error, Result};

#[cfg(test)]
mod test_store;
