//! Matches: undirected records of mutual interest.
//!
//! A match is keyed by a [`PairKey`], the canonical encoding of an unordered
//! pair of users. Because the same two users always produce the same key, a
//! unique index over the key is enough for the store to refuse a second active
//! match for the pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, swipe::ensure_distinct};

// ─── PairKey ─────────────────────────────────────────────────────────────────

/// An unordered pair of two distinct users, stored lower id first.
///
/// Serialises as a two-element array. Deserialisation goes through
/// [`PairKey::new`], so a non-canonical or self-referential pair can never be
/// constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[Uuid; 2]", into = "[Uuid; 2]")]
pub struct PairKey {
  low:  Uuid,
  high: Uuid,
}

impl PairKey {
  pub fn new(a: Uuid, b: Uuid) -> Result<Self> {
    ensure_distinct(a, b)?;
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    Ok(Self { low, high })
  }

  pub fn low(&self) -> Uuid { self.low }

  pub fn high(&self) -> Uuid { self.high }

  pub fn contains(&self, user: Uuid) -> bool { self.low == user || self.high == user }

  /// The member that is not `user`, or `None` if `user` is not in the pair.
  pub fn partner_of(&self, user: Uuid) -> Option<Uuid> {
    if user == self.low {
      Some(self.high)
    } else if user == self.high {
      Some(self.low)
    } else {
      None
    }
  }
}

impl TryFrom<[Uuid; 2]> for PairKey {
  type Error = Error;

  fn try_from([a, b]: [Uuid; 2]) -> Result<Self> { Self::new(a, b) }
}

impl From<PairKey> for [Uuid; 2] {
  fn from(key: PairKey) -> Self { [key.low, key.high] }
}

// ─── Match ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
  pub match_id:         Uuid,
  pub members:          PairKey,
  pub created_at:       DateTime<Utc>,
  /// Bumped by messaging; initialised to `created_at`.
  pub last_activity_at: DateTime<Utc>,
  /// Cleared by moderation flows; history is kept.
  pub active:           bool,
}

// ─── Feed ────────────────────────────────────────────────────────────────────

/// The other member of a match, as shown in a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
  pub user_id:      Uuid,
  pub display_name: String,
}

/// One row of a user's match feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
  #[serde(rename = "match")]
  pub record:  Match,
  pub partner: Partner,
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// What the match detector concluded for one recorded swipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
  NotMatched,
  /// Either freshly created or the pair's already-existing active match.
  Matched(Match),
}

impl MatchOutcome {
  pub fn is_matched(&self) -> bool { matches!(self, Self::Matched(_)) }

  pub fn into_match(self) -> Option<Match> {
    match self {
      Self::NotMatched => None,
      Self::Matched(m) => Some(m),
    }
  }
}
