//! Storage traits for the matchmaking core.
//!
//! The traits are implemented by storage backends (e.g. `amoura-store-sqlite`).
//! Higher layers (`amoura-api`, the [`SwipeService`](crate::service::SwipeService))
//! depend on these abstractions, not on any concrete backend.
//!
//! Every uniqueness guarantee described here must be enforced by the backend's
//! storage layer itself. Callers run as many independent, stateless workers
//! and never hold a lock across two calls.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  matching::{FeedEntry, Match, PairKey},
  message::Message,
  swipe::{Direction, Swipe},
  user::{Credentials, NewUser, User},
};

// ─── Backend ─────────────────────────────────────────────────────────────────

/// The error type shared by every store trait of one backend.
///
/// Backend errors convert into [`crate::Error`], keeping domain rejections
/// (`InvalidArgument`, `MatchNotFound`, …) and folding everything else into
/// [`crate::Error::Storage`].
pub trait StoreBackend: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub trait UserDirectory: StoreBackend {
  /// Persist a new user. Fails with `EmailTaken` if the e-mail is in use.
  fn register_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up the password hash for an (already normalised) e-mail.
  fn find_credentials<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + 'a;
}

// ─── Swipes ──────────────────────────────────────────────────────────────────

pub trait SwipeStore: StoreBackend {
  /// Upsert the decision for the ordered pair `(actor, target)`.
  ///
  /// Fails with `InvalidArgument` if `actor == target` or either id is not a
  /// registered user. Must be a single atomic operation on the pair key:
  /// concurrent calls for the same pair never create two records, and the
  /// last write wins.
  fn record_swipe(
    &self,
    actor: Uuid,
    target: Uuid,
    direction: Direction,
  ) -> impl Future<Output = Result<Swipe, Self::Error>> + Send + '_;

  /// Retrieve the decision `actor` made about `target`, if any.
  ///
  /// Must observe every `record_swipe` that has already returned.
  fn get_swipe(
    &self,
    actor: Uuid,
    target: Uuid,
  ) -> impl Future<Output = Result<Option<Swipe>, Self::Error>> + Send + '_;
}

// ─── Matches ─────────────────────────────────────────────────────────────────

pub trait MatchStore: StoreBackend {
  /// Return the pair's active match, creating it if none exists.
  ///
  /// This is the sole enforcement point of the at-most-one-active-match
  /// invariant. It must rely on a storage-level uniqueness constraint over the
  /// pair key, never on a read-then-write. Losing an insert race is not an
  /// error: the winner's record is returned.
  fn create_match_if_absent(
    &self,
    pair: PairKey,
  ) -> impl Future<Output = Result<Match, Self::Error>> + Send + '_;

  fn get_match(
    &self,
    match_id: Uuid,
  ) -> impl Future<Output = Result<Option<Match>, Self::Error>> + Send + '_;

  /// Active matches `user` belongs to, most recently active first.
  fn list_matches(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<Vec<Match>, Self::Error>> + Send + '_;

  /// Soft-deactivate a match. Idempotent; `None` if the id is unknown.
  fn deactivate_match(
    &self,
    match_id: Uuid,
  ) -> impl Future<Output = Result<Option<Match>, Self::Error>> + Send + '_;
}

/// Read side of the match list, joined with each partner's profile.
pub trait FeedStore: StoreBackend {
  /// Active matches of `user` with the other member's display name, most
  /// recently active first. Answered in one round trip.
  fn match_feed(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<Vec<FeedEntry>, Self::Error>> + Send + '_;
}

// ─── Messages ────────────────────────────────────────────────────────────────

pub trait MessageStore: StoreBackend {
  /// Append a message to an active match and bump its `last_activity_at`.
  ///
  /// Fails with `MatchNotFound` if the match does not exist or `sender` is
  /// not a member, `MatchInactive` if it has been deactivated, and
  /// `InvalidArgument` for blank text.
  fn send_message(
    &self,
    match_id: Uuid,
    sender: Uuid,
    text: String,
  ) -> impl Future<Output = Result<Message, Self::Error>> + Send + '_;

  /// Messages of a match, oldest first. `reader` must be a member.
  fn list_messages(
    &self,
    match_id: Uuid,
    reader: Uuid,
    since: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;
}

// ─── Umbrella ────────────────────────────────────────────────────────────────

/// Every store trait at once; what an HTTP front end needs.
pub trait AmouraStore:
  UserDirectory + SwipeStore + MatchStore + FeedStore + MessageStore + 'static
{
}

impl<T> AmouraStore for T where
  T: UserDirectory + SwipeStore + MatchStore + FeedStore + MessageStore + 'static
{
}
