//! Handlers for `/messages/{match_id}`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/messages/{match_id}` | Oldest first; optional `?since=<RFC 3339>` |
//! | `POST` | `/messages/{match_id}` | Body: `{"text":"..."}`; returns 201 + [`Message`] |

use std::sync::Arc;

use amoura_core::{
  message::Message,
  store::{AmouraStore, MessageStore},
};
use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::Actor, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  /// Only return messages created after this instant.
  pub since: Option<DateTime<Utc>>,
}

/// `GET /messages/{match_id}[?since=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Actor(actor): Actor,
  path: Result<Path<Uuid>, PathRejection>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Message>>, ApiError>
where
  S: AmouraStore,
{
  let Path(match_id) = path?;
  let Query(params) = params?;
  let messages = store
    .list_messages(match_id, actor, params.since)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(messages))
}

// ─── Send ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SendBody {
  pub text: String,
}

/// `POST /messages/{match_id}`
pub async fn send<S>(
  State(store): State<Arc<S>>,
  Actor(actor): Actor,
  path: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<SendBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AmouraStore,
{
  let Path(match_id) = path?;
  let Json(body) = body?;
  let message = store
    .send_message(match_id, actor, body.text)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(message)))
}
