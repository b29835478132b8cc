//! [`SqliteStore`], the SQLite implementation of the Amoura store traits.

use std::path::Path;

use amoura_core::{
  matching::{FeedEntry, Match, PairKey},
  message::{Message, normalize_text},
  store::{FeedStore, MatchStore, MessageStore, StoreBackend, SwipeStore, UserDirectory},
  swipe::{Direction, Swipe, ensure_distinct},
  user::{Credentials, NewUser, User},
};
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    MATCH_COLUMNS, MESSAGE_COLUMNS, RawFeedEntry, RawMatch, RawMessage, RawSwipe, RawUser,
    SWIPE_COLUMNS, USER_COLUMNS, decode_uuid, encode_direction, encode_dt, encode_uuid, is_unique_violation, now,
  },
  schema::SCHEMA,
};

/// How many times a match insert is retried when the conflicting active row
/// disappears (is deactivated) before it can be re-read.
const MATCH_INSERT_ATTEMPTS: usize = 3;

/// Result of one conditional match insert.
enum MatchInsert {
  Created,
  /// Another writer holds the pair's active slot.
  Existing(RawMatch),
  /// The unique index fired but no active row was visible afterwards.
  Vanished,
}

/// Result of a membership-checked write or read against a match.
enum Membership<T> {
  Allowed(T),
  NotFound,
  Inactive,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Amoura store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Several
/// `SqliteStore`s (in one process or many) may open the same file; the
/// schema's unique indexes keep them consistent.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Read a match row and decide whether `user` may act on it.
  async fn member_match(&self, match_id: Uuid, user: Uuid) -> Result<Membership<Match>> {
    let record = match self.get_match(match_id).await? {
      Some(m) if m.members.contains(user) => m,
      _ => return Ok(Membership::NotFound),
    };
    if !record.active {
      return Ok(Membership::Inactive);
    }
    Ok(Membership::Allowed(record))
  }
}

impl StoreBackend for SqliteStore {
  type Error = Error;
}

// ─── Users ───────────────────────────────────────────────────────────────────

impl UserDirectory for SqliteStore {
  async fn register_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:      Uuid::new_v4(),
      email:        input.email,
      display_name: input.display_name,
      created_at:   now(),
    };

    let id_str   = encode_uuid(user.user_id);
    let email    = user.email.clone();
    let name     = user.display_name.clone();
    let hash     = input.password_hash;
    let at_str   = encode_dt(user.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let res = conn.execute(
          "INSERT INTO users (user_id, email, display_name, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, email, name, hash, at_str],
        );
        match res {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::EmailTaken(user.email));
    }
    Ok(user)
  }

  async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>> {
    let email = email.to_owned();

    let row: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, password_hash FROM users WHERE email = ?1",
              rusqlite::params![email],
              |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    row
      .map(|(id, password_hash)| {
        Ok(Credentials { user_id: decode_uuid(&id)?, password_hash })
      })
      .transpose()
  }
}

// ─── Swipes ──────────────────────────────────────────────────────────────────

impl SwipeStore for SqliteStore {
  async fn record_swipe(
    &self,
    actor:     Uuid,
    target:    Uuid,
    direction: Direction,
  ) -> Result<Swipe> {
    ensure_distinct(actor, target)?;

    let actor_str  = encode_uuid(actor);
    let target_str = encode_uuid(target);
    let dir_str    = encode_direction(direction);
    let at_str     = encode_dt(now());

    // The existence check and the upsert share one IMMEDIATE transaction, so
    // the write lock is taken up front and no reader can slip in between.
    let outcome: Result<RawSwipe, Uuid> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        for (id, raw) in [(actor, &actor_str), (target, &target_str)] {
          let exists = tx
            .query_row(
              "SELECT 1 FROM users WHERE user_id = ?1",
              rusqlite::params![raw],
              |_| Ok(()),
            )
            .optional()?
            .is_some();
          if !exists {
            return Ok(Err(id));
          }
        }

        let raw = tx.query_row(
          &format!(
            "INSERT INTO swipes (actor_id, target_id, direction, decided_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (actor_id, target_id) DO UPDATE
               SET direction = excluded.direction,
                   decided_at = excluded.decided_at
             RETURNING {SWIPE_COLUMNS}"
          ),
          rusqlite::params![actor_str, target_str, dir_str, at_str],
          RawSwipe::from_row,
        )?;

        tx.commit()?;
        Ok(Ok(raw))
      })
      .await?;

    match outcome {
      Ok(raw) => raw.into_swipe(),
      Err(missing) => Err(Error::UserNotFound(missing)),
    }
  }

  async fn get_swipe(&self, actor: Uuid, target: Uuid) -> Result<Option<Swipe>> {
    let actor_str  = encode_uuid(actor);
    let target_str = encode_uuid(target);

    let raw: Option<RawSwipe> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SWIPE_COLUMNS} FROM swipes WHERE actor_id = ?1 AND target_id = ?2"
              ),
              rusqlite::params![actor_str, target_str],
              RawSwipe::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSwipe::into_swipe).transpose()
  }
}

// ─── Matches ─────────────────────────────────────────────────────────────────

impl MatchStore for SqliteStore {
  async fn create_match_if_absent(&self, pair: PairKey) -> Result<Match> {
    let low_str  = encode_uuid(pair.low());
    let high_str = encode_uuid(pair.high());

    for _ in 0..MATCH_INSERT_ATTEMPTS {
      let at = now();
      let candidate = Match {
        match_id:         Uuid::new_v4(),
        members:          pair,
        created_at:       at,
        last_activity_at: at,
        active:           true,
      };

      let id_str = encode_uuid(candidate.match_id);
      let low    = low_str.clone();
      let high   = high_str.clone();
      let at_str = encode_dt(at);

      // A plain INSERT against the partial unique index; a violation means a
      // concurrent writer already created the pair's active match.
      let outcome = self
        .conn
        .call(move |conn| {
          let res = conn.execute(
            "INSERT INTO matches
               (match_id, user_low, user_high, created_at, last_activity_at, active)
             VALUES (?1, ?2, ?3, ?4, ?4, 1)",
            rusqlite::params![id_str, low, high, at_str],
          );
          match res {
            Ok(_) => Ok(MatchInsert::Created),
            Err(e) if is_unique_violation(&e) => {
              let existing = conn
                .query_row(
                  &format!(
                    "SELECT {MATCH_COLUMNS} FROM matches
                     WHERE user_low = ?1 AND user_high = ?2 AND active = 1"
                  ),
                  rusqlite::params![low, high],
                  RawMatch::from_row,
                )
                .optional()?;
              Ok(existing.map_or(MatchInsert::Vanished, MatchInsert::Existing))
            }
            Err(e) => Err(e.into()),
          }
        })
        .await?;

      match outcome {
        MatchInsert::Created => return Ok(candidate),
        MatchInsert::Existing(raw) => return raw.into_match(),
        MatchInsert::Vanished => continue,
      }
    }

    Err(Error::DuplicateWriteRace(format!("{low_str}/{high_str}")))
  }

  async fn get_match(&self, match_id: Uuid) -> Result<Option<Match>> {
    let id_str = encode_uuid(match_id);

    let raw: Option<RawMatch> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {MATCH_COLUMNS} FROM matches WHERE match_id = ?1"),
              rusqlite::params![id_str],
              RawMatch::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMatch::into_match).transpose()
  }

  async fn list_matches(&self, user: Uuid) -> Result<Vec<Match>> {
    let user_str = encode_uuid(user);

    let raws: Vec<RawMatch> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MATCH_COLUMNS} FROM matches
           WHERE active = 1 AND (user_low = ?1 OR user_high = ?1)
           ORDER BY last_activity_at DESC, created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawMatch::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMatch::into_match).collect()
  }

  async fn deactivate_match(&self, match_id: Uuid) -> Result<Option<Match>> {
    let id_str = encode_uuid(match_id);

    let raw: Option<RawMatch> = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE matches SET active = 0 WHERE match_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(
          conn
            .query_row(
              &format!("SELECT {MATCH_COLUMNS} FROM matches WHERE match_id = ?1"),
              rusqlite::params![id_str],
              RawMatch::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMatch::into_match).transpose()
  }
}

// ─── Messages ────────────────────────────────────────────────────────────────

impl FeedStore for SqliteStore {
  async fn match_feed(&self, user: Uuid) -> Result<Vec<FeedEntry>> {
    let user_str = encode_uuid(user);

    let raws: Vec<RawFeedEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT m.match_id, m.user_low, m.user_high, m.created_at,
                  m.last_activity_at, m.active, u.user_id, u.display_name
           FROM matches m
           JOIN users u ON u.user_id =
             CASE WHEN m.user_low = ?1 THEN m.user_high ELSE m.user_low END
           WHERE m.active = 1 AND (m.user_low = ?1 OR m.user_high = ?1)
           ORDER BY m.last_activity_at DESC, m.created_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawFeedEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFeedEntry::into_entry).collect()
  }
}

impl MessageStore for SqliteStore {
  async fn send_message(
    &self,
    match_id: Uuid,
    sender:   Uuid,
    text:     String,
  ) -> Result<Message> {
    let message = Message {
      message_id: Uuid::new_v4(),
      match_id,
      sender,
      text:       normalize_text(&text)?,
      created_at: now(),
    };

    let msg_id_str = encode_uuid(message.message_id);
    let match_str  = encode_uuid(match_id);
    let sender_str = encode_uuid(sender);
    let body       = message.text.clone();
    let at_str     = encode_dt(message.created_at);

    // Membership check, insert and activity bump commit together.
    let outcome: Membership<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let row: Option<(String, String, bool)> = tx
          .query_row(
            "SELECT user_low, user_high, active FROM matches WHERE match_id = ?1",
            rusqlite::params![match_str],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
          )
          .optional()?;

        let Some((low, high, active)) = row else {
          return Ok(Membership::NotFound);
        };
        if low != sender_str && high != sender_str {
          return Ok(Membership::NotFound);
        }
        if !active {
          return Ok(Membership::Inactive);
        }

        tx.execute(
          "INSERT INTO messages (message_id, match_id, sender_id, body, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![msg_id_str, match_str, sender_str, body, at_str],
        )?;
        tx.execute(
          "UPDATE matches SET last_activity_at = ?2
           WHERE match_id = ?1 AND last_activity_at < ?2",
          rusqlite::params![match_str, at_str],
        )?;

        tx.commit()?;
        Ok(Membership::Allowed(()))
      })
      .await?;

    match outcome {
      Membership::Allowed(()) => Ok(message),
      Membership::NotFound => Err(Error::MatchNotFound(match_id)),
      Membership::Inactive => Err(Error::MatchInactive(match_id)),
    }
  }

  async fn list_messages(
    &self,
    match_id: Uuid,
    reader:   Uuid,
    since:    Option<DateTime<Utc>>,
  ) -> Result<Vec<Message>> {
    // Reading history stays possible after deactivation.
    match self.member_match(match_id, reader).await? {
      Membership::Allowed(_) | Membership::Inactive => {}
      Membership::NotFound => return Err(Error::MatchNotFound(match_id)),
    }

    let match_str = encode_uuid(match_id);
    let since_str = since.map(encode_dt);

    let raws: Vec<RawMessage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MESSAGE_COLUMNS} FROM messages
           WHERE match_id = ?1 AND (?2 IS NULL OR created_at > ?2)
           ORDER BY created_at ASC, rowid ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![match_str, since_str], RawMessage::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMessage::into_message).collect()
  }
}
