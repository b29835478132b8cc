//! Swipes: one user's directional decision about another user.
//!
//! A swipe is keyed by the ordered pair `(actor, target)`. Re-swiping the same
//! pair overwrites the stored decision instead of adding a second record, so
//! the store always holds the actor's latest word on the target.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Direction ───────────────────────────────────────────────────────────────

/// The decision an actor made about a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Like,
  Pass,
  Superlike,
}

impl Direction {
  /// `like` and `superlike` count towards a match; `pass` never does.
  pub fn is_positive(self) -> bool { matches!(self, Self::Like | Self::Superlike) }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Like => "like",
      Self::Pass => "pass",
      Self::Superlike => "superlike",
    }
  }
}

impl fmt::Display for Direction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Direction {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "like" => Ok(Self::Like),
      "pass" => Ok(Self::Pass),
      "superlike" => Ok(Self::Superlike),
      other => Err(Error::invalid(format!("unknown swipe direction: {other:?}"))),
    }
  }
}

// ─── Swipe ───────────────────────────────────────────────────────────────────

/// The stored decision for one ordered `(actor, target)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Swipe {
  pub actor:      Uuid,
  pub target:     Uuid,
  pub direction:  Direction,
  /// Creation time on the first swipe, update time on every re-swipe.
  pub decided_at: DateTime<Utc>,
}

impl Swipe {
  pub fn is_positive(&self) -> bool { self.direction.is_positive() }
}

/// Reject a self-referential pair.
pub fn ensure_distinct(actor: Uuid, target: Uuid) -> Result<()> {
  if actor == target {
    return Err(Error::invalid("cannot swipe on yourself"));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn positive_directions() {
    assert!(Direction::Like.is_positive());
    assert!(Direction::Superlike.is_positive());
    assert!(!Direction::Pass.is_positive());
  }

  #[test]
  fn parse_is_case_insensitive() {
    assert_eq!("Like".parse::<Direction>().unwrap(), Direction::Like);
    assert_eq!(" SUPERLIKE ".parse::<Direction>().unwrap(), Direction::Superlike);
    assert_eq!("pass".parse::<Direction>().unwrap(), Direction::Pass);
  }

  #[test]
  fn unknown_direction_is_invalid_argument() {
    let err = "maybe".parse::<Direction>().unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
  }

  #[test]
  fn self_pair_is_rejected() {
    let id = Uuid::new_v4();
    assert!(matches!(ensure_distinct(id, id), Err(Error::InvalidArgument(_))));
    assert!(ensure_distinct(id, Uuid::new_v4()).is_ok());
  }

  #[test]
  fn swipe_serializes_camel_case() {
    let swipe = Swipe {
      actor:      Uuid::nil(),
      target:     Uuid::new_v4(),
      direction:  Direction::Superlike,
      decided_at: Utc::now(),
    };
    let json = serde_json::to_value(&swipe).unwrap();
    assert_eq!(json["direction"], "superlike");
    assert!(json.get("decidedAt").is_some());
  }
}
