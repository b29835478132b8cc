//! JSON REST API for Amoura.
//!
//! Exposes an axum [`Router`] backed by any [`AmouraStore`]. Requests other
//! than registration authenticate with HTTP Basic (e-mail + password); the
//! resolved user is the actor every swipe and message is attributed to.
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", amoura_api::api_router(store.clone()))
//! ```

pub mod auth;
pub mod error;
pub mod matches;
pub mod messages;
pub mod swipes;
pub mod users;

use std::sync::Arc;

use amoura_core::store::AmouraStore;
use axum::{
  Router,
  routing::{get, post},
};

pub use auth::Actor;
pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: AmouraStore,
{
  Router::new()
    // Users
    .route("/users", post(users::register::<S>))
    .route("/users/me", get(users::me::<S>))
    // Swipes
    .route("/swipes", post(swipes::create::<S>))
    // Matches
    .route("/matches", get(matches::feed::<S>))
    .route("/matches/{id}/deactivate", post(matches::deactivate::<S>))
    // Messages
    .route("/messages/{match_id}", get(messages::list::<S>).post(messages::send::<S>))
    .with_state(store)
}
