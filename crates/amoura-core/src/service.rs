//! [`SwipeService`], the public entry point of the swipe-to-match engine.
//!
//! A call records the decision, waits for it to be durable, and only then asks
//! the [`detector`](crate::detector) whether it completes a match. The service
//! holds no state of its own; every guarantee comes from the store, so any
//! number of workers may run it concurrently.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
  detector::detect_and_create_match,
  matching::{Match, MatchOutcome},
  store::{MatchStore, SwipeStore},
  swipe::{Direction, Swipe, ensure_distinct},
};

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// Result of a successful [`SwipeService::swipe`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeOutcome {
  pub swipe:   Swipe,
  pub matched: bool,
  #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
  pub record:  Option<Match>,
}

impl SwipeOutcome {
  fn new(swipe: Swipe, outcome: MatchOutcome) -> Self {
    let record = outcome.into_match();
    Self { swipe, matched: record.is_some(), record }
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SwipeError {
  /// Nothing was written; the caller may fix the input or retry.
  #[error("swipe not recorded: {0}")]
  Record(#[source] crate::Error),

  /// The swipe is durable but whether it produced a match is unknown.
  /// Retrying the same call is safe.
  #[error("swipe recorded but match status is unknown: {source}")]
  MatchIndeterminate {
    swipe:  Box<Swipe>,
    #[source]
    source: crate::Error,
  },
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct SwipeService<S> {
  store: Arc<S>,
}

impl<S> Clone for SwipeService<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S> SwipeService<S>
where
  S: SwipeStore + MatchStore,
{
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// Record `actor`'s decision about `target` and report whether it completed
  /// a mutual match.
  ///
  /// Idempotent: repeating a call with the same arguments leaves one swipe and
  /// at most one active match for the pair.
  pub async fn swipe(
    &self,
    actor: Uuid,
    target: Uuid,
    direction: Direction,
  ) -> Result<SwipeOutcome, SwipeError> {
    ensure_distinct(actor, target).map_err(SwipeError::Record)?;

    let swipe = self
      .store
      .record_swipe(actor, target, direction)
      .await
      .map_err(|e| SwipeError::Record(e.into()))?;

    tracing::debug!(%actor, %target, %direction, "swipe recorded");

    match detect_and_create_match(self.store.as_ref(), &swipe).await {
      Ok(outcome) => {
        if let MatchOutcome::Matched(m) = &outcome {
          tracing::info!(match_id = %m.match_id, %actor, %target, "mutual match");
        }
        Ok(SwipeOutcome::new(swipe, outcome))
      }
      Err(source) => {
        tracing::warn!(%actor, %target, error = %source, "match detection failed after swipe was recorded");
        Err(SwipeError::MatchIndeterminate { swipe: Box::new(swipe), source })
      }
    }
  }
}
