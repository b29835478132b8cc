//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond
//! precision and a `Z` suffix, so lexical order in SQL equals chronological
//! order. UUIDs are stored as hyphenated lowercase strings, whose lexical
//! order matches [`Uuid`]'s `Ord`; the `user_low < user_high` check relies on
//! that.

use amoura_core::{
  matching::{FeedEntry, Match, PairKey, Partner},
  message::Message,
  swipe::{Direction, Swipe},
  user::User,
};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Direction ───────────────────────────────────────────────────────────────

pub fn encode_direction(d: Direction) -> &'static str { d.as_str() }

pub fn decode_direction(s: &str) -> Result<Direction> {
  match s {
    "like" => Ok(Direction::Like),
    "pass" => Ok(Direction::Pass),
    "superlike" => Ok(Direction::Superlike),
    other => Err(Error::UnknownDirection(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawSwipe`]'s field order.
pub const SWIPE_COLUMNS: &str = "actor_id, target_id, direction, decided_at";

/// Raw strings read directly from a `swipes` row.
pub struct RawSwipe {
  pub actor_id:   String,
  pub target_id:  String,
  pub direction:  String,
  pub decided_at: String,
}

impl RawSwipe {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      actor_id:   row.get(0)?,
      target_id:  row.get(1)?,
      direction:  row.get(2)?,
      decided_at: row.get(3)?,
    })
  }

  pub fn into_swipe(self) -> Result<Swipe> {
    Ok(Swipe {
      actor:      decode_uuid(&self.actor_id)?,
      target:     decode_uuid(&self.target_id)?,
      direction:  decode_direction(&self.direction)?,
      decided_at: decode_dt(&self.decided_at)?,
    })
  }
}

/// Column list matching [`RawMatch`]'s field order.
pub const MATCH_COLUMNS: &str =
  "match_id, user_low, user_high, created_at, last_activity_at, active";

/// Raw values read directly from a `matches` row.
pub struct RawMatch {
  pub match_id:         String,
  pub user_low:         String,
  pub user_high:        String,
  pub created_at:       String,
  pub last_activity_at: String,
  pub active:           bool,
}

impl RawMatch {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      match_id:         row.get(0)?,
      user_low:         row.get(1)?,
      user_high:        row.get(2)?,
      created_at:       row.get(3)?,
      last_activity_at: row.get(4)?,
      active:           row.get(5)?,
    })
  }

  pub fn into_match(self) -> Result<Match> {
    let members = PairKey::new(
      decode_uuid(&self.user_low)?,
      decode_uuid(&self.user_high)?,
    )?;
    Ok(Match {
      match_id: decode_uuid(&self.match_id)?,
      members,
      created_at: decode_dt(&self.created_at)?,
      last_activity_at: decode_dt(&self.last_activity_at)?,
      active: self.active,
    })
  }
}

/// A `matches` row joined with the partner's `users` row: [`RawMatch`]'s
/// columns followed by the partner's id and display name.
pub struct RawFeedEntry {
  pub record:       RawMatch,
  pub partner_id:   String,
  pub display_name: String,
}

impl RawFeedEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record:       RawMatch::from_row(row)?,
      partner_id:   row.get(6)?,
      display_name: row.get(7)?,
    })
  }

  pub fn into_entry(self) -> Result<FeedEntry> {
    Ok(FeedEntry {
      record:  self.record.into_match()?,
      partner: Partner {
        user_id:      decode_uuid(&self.partner_id)?,
        display_name: self.display_name,
      },
    })
  }
}

/// Column list matching [`RawUser`]'s field order.
pub const USER_COLUMNS: &str = "user_id, email, display_name, created_at";

/// Raw strings read directly from a `users` row (hash excluded).
pub struct RawUser {
  pub user_id:      String,
  pub email:        String,
  pub display_name: String,
  pub created_at:   String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:      row.get(0)?,
      email:        row.get(1)?,
      display_name: row.get(2)?,
      created_at:   row.get(3)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:      decode_uuid(&self.user_id)?,
      email:        self.email,
      display_name: self.display_name,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawMessage`]'s field order.
pub const MESSAGE_COLUMNS: &str = "message_id, match_id, sender_id, body, created_at";

/// Raw strings read directly from a `messages` row.
pub struct RawMessage {
  pub message_id: String,
  pub match_id:   String,
  pub sender_id:  String,
  pub body:       String,
  pub created_at: String,
}

impl RawMessage {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      message_id: row.get(0)?,
      match_id:   row.get(1)?,
      sender_id:  row.get(2)?,
      body:       row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_message(self) -> Result<Message> {
    Ok(Message {
      message_id: decode_uuid(&self.message_id)?,
      match_id:   decode_uuid(&self.match_id)?,
      sender:     decode_uuid(&self.sender_id)?,
      text:       self.body,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

// ─── Constraint errors ───────────────────────────────────────────────────────

/// `true` if `e` is a UNIQUE or PRIMARY KEY violation, meaning a concurrent
/// writer already claimed the key.
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
  match e {
    rusqlite::Error::SqliteFailure(f, _) => matches!(
      f.extended_code,
      rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    ),
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let earlier = decode_dt("2024-03-01T10:00:00.5Z").unwrap();
    let later = decode_dt("2024-03-01T10:00:00.123456Z").unwrap() + chrono::Duration::seconds(1);
    assert!(encode_dt(earlier) < encode_dt(later));
    assert_eq!(encode_dt(earlier), "2024-03-01T10:00:00.500000Z");
  }

  #[test]
  fn uuid_text_order_matches_uuid_order() {
    for _ in 0..64 {
      let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
      assert_eq!(a < b, encode_uuid(a) < encode_uuid(b));
    }
  }

  #[test]
  fn direction_roundtrip_rejects_garbage() {
    assert_eq!(decode_direction(encode_direction(Direction::Superlike)).unwrap(), Direction::Superlike);
    assert!(matches!(decode_direction("nope"), Err(Error::UnknownDirection(_))));
  }
}
