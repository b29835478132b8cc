//! The match detector: turns a freshly recorded swipe into a match outcome.
//!
//! Two users who like each other at nearly the same instant trigger two
//! concurrent detector runs. Both can see the reverse swipe and both will ask
//! the store for a match. That is fine: creation goes through
//! [`MatchStore::create_match_if_absent`], which is keyed by the canonical
//! [`PairKey`] and returns the existing record to whichever caller loses.

use crate::{
  matching::{MatchOutcome, PairKey},
  store::{MatchStore, SwipeStore},
  swipe::Swipe,
};

/// Decide whether `swipe` completes a mutual match, creating it if so.
///
/// Must only be called once `swipe` has been durably recorded. Storage errors
/// propagate unchanged; they are never reported as
/// [`MatchOutcome::NotMatched`].
pub async fn detect_and_create_match<S>(
  store: &S,
  swipe: &Swipe,
) -> Result<MatchOutcome, crate::Error>
where
  S: SwipeStore + MatchStore,
{
  if !swipe.is_positive() {
    return Ok(MatchOutcome::NotMatched);
  }

  let reverse = store
    .get_swipe(swipe.target, swipe.actor)
    .await
    .map_err(Into::into)?;

  match reverse {
    Some(r) if r.is_positive() => {}
    _ => return Ok(MatchOutcome::NotMatched),
  }

  let pair = PairKey::new(swipe.actor, swipe.target)?;
  let record = store
    .create_match_if_absent(pair)
    .await
    .map_err(Into::into)?;

  Ok(MatchOutcome::Matched(record))
}
