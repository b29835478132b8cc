//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Body: [`RegisterBody`]; no auth; returns 201 + [`User`] |
//! | `GET`  | `/users/me` | The authenticated user |

use std::sync::Arc;

use amoura_core::{
  store::{AmouraStore, UserDirectory},
  user::{NewUser, User},
};
use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;

use crate::{
  auth::{Actor, hash_password},
  error::ApiError,
};

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
  pub email:        String,
  pub display_name: String,
  pub password:     String,
}

/// `POST /users`
pub async fn register<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<RegisterBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AmouraStore,
{
  let Json(body) = body?;
  if body.password.is_empty() {
    return Err(ApiError::BadRequest("password is required".into()));
  }

  let input = NewUser::new(&body.email, &body.display_name, hash_password(&body.password)?)?;
  let user = store
    .register_user(input)
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(user_id = %user.user_id, "user registered");
  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Me ───────────────────────────────────────────────────────────────────────

/// `GET /users/me`
pub async fn me<S>(
  State(store): State<Arc<S>>,
  Actor(user_id): Actor,
) -> Result<Json<User>, ApiError>
where
  S: AmouraStore,
{
  let user = store
    .get_user(user_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or(ApiError::Unauthorized)?;
  Ok(Json(user))
}
