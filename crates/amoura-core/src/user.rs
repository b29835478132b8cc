//! Users as seen by the matchmaking core.
//!
//! The directory only carries what the core and its credential layer need.
//! Profile data lives elsewhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub user_id:      Uuid,
  pub email:        String,
  pub display_name: String,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`UserDirectory::register_user`](crate::store::UserDirectory::register_user).
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub display_name:  String,
  /// argon2 PHC string, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

impl NewUser {
  /// Normalise and validate a registration. The e-mail is trimmed and
  /// lower-cased so uniqueness is case-insensitive.
  pub fn new(
    email: &str,
    display_name: &str,
    password_hash: String,
  ) -> Result<Self> {
    let email = normalize_email(email);
    if email.is_empty() || !email.contains('@') {
      return Err(Error::invalid("a valid email is required"));
    }
    let display_name = display_name.trim();
    if display_name.is_empty() {
      return Err(Error::invalid("display name is required"));
    }
    Ok(Self {
      email,
      display_name: display_name.to_owned(),
      password_hash,
    })
  }
}

/// What the credential layer needs to authenticate a request.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub user_id:       Uuid,
  pub password_hash: String,
}

pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }
