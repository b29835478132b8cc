//! Handlers for `/matches` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/matches` | The actor's feed, most recently active first |
//! | `POST` | `/matches/{id}/deactivate` | Member-only soft deactivation |

use std::sync::Arc;

use amoura_core::{
  matching::{FeedEntry, Match},
  store::{AmouraStore, FeedStore, MatchStore},
};
use axum::{
  Json,
  extract::{Path, State, rejection::PathRejection},
};
use uuid::Uuid;

use crate::{auth::Actor, error::ApiError};

// ─── Feed ─────────────────────────────────────────────────────────────────────

/// `GET /matches`
pub async fn feed<S>(
  State(store): State<Arc<S>>,
  Actor(actor): Actor,
) -> Result<Json<Vec<FeedEntry>>, ApiError>
where
  S: AmouraStore,
{
  let feed = store
    .match_feed(actor)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(feed))
}

// ─── Deactivate ───────────────────────────────────────────────────────────────

/// `POST /matches/{id}/deactivate`
///
/// Non-members get the same 404 as for an unknown id.
pub async fn deactivate<S>(
  State(store): State<Arc<S>>,
  Actor(actor): Actor,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Match>, ApiError>
where
  S: AmouraStore,
{
  let Path(id) = path?;
  let not_found = || ApiError::NotFound(format!("match {id} not found"));

  let record = store
    .get_match(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(not_found)?;
  if !record.members.contains(actor) {
    return Err(not_found());
  }

  let record = store
    .deactivate_match(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(not_found)?;

  tracing::info!(match_id = %id, %actor, "match deactivated");
  Ok(Json(record))
}
