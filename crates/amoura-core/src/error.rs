//! Error types for `amoura-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// The input was rejected before anything was written.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("match not found: {0}")]
  MatchNotFound(Uuid),

  #[error("match {0} is no longer active")]
  MatchInactive(Uuid),

  #[error("email is already registered: {0}")]
  EmailTaken(String),

  /// The backing store failed for a reason other than a domain rejection.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn invalid(msg: impl Into<String>) -> Self {
    Self::InvalidArgument(msg.into())
  }

  /// `true` when the error reflects bad caller input rather than a failure.
  pub fn is_rejection(&self) -> bool { !matches!(self, Self::Storage(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
