//! `POST /swipes`: record a decision and report whether it matched.

use std::sync::Arc;

use amoura_core::{
  service::{SwipeOutcome, SwipeService},
  store::AmouraStore,
  swipe::Direction,
};
use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::Actor, error::ApiError};

/// Body of `POST /swipes`. `direction` stays a string so an unknown value is
/// reported as a domain rejection rather than a JSON shape error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeBody {
  pub to_user:   Uuid,
  pub direction: String,
}

/// `POST /swipes`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Actor(actor): Actor,
  body: Result<Json<SwipeBody>, JsonRejection>,
) -> Result<Json<SwipeOutcome>, ApiError>
where
  S: AmouraStore,
{
  let Json(body) = body?;
  let direction: Direction = body.direction.parse()?;

  let outcome = SwipeService::new(store)
    .swipe(actor, body.to_user, direction)
    .await?;
  Ok(Json(outcome))
}
