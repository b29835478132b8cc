//! Error type for `amoura-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] amoura_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown swipe direction stored: {0:?}")]
  UnknownDirection(String),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("email is already registered: {0}")]
  EmailTaken(String),

  #[error("match not found: {0}")]
  MatchNotFound(Uuid),

  #[error("match {0} is no longer active")]
  MatchInactive(Uuid),

  /// A concurrent writer kept winning the unique index on a match pair and
  /// its row vanished before it could be re-read.
  #[error("gave up creating match for pair {0} after repeated write races")]
  DuplicateWriteRace(String),
}

impl From<Error> for amoura_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(inner) => inner,
      Error::UserNotFound(id) => Self::invalid(format!("user {id} does not exist")),
      Error::EmailTaken(email) => Self::EmailTaken(email),
      Error::MatchNotFound(id) => Self::MatchNotFound(id),
      Error::MatchInactive(id) => Self::MatchInactive(id),
      other => Self::Storage(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
