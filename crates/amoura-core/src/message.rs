//! Messages exchanged inside a match.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
  pub message_id: Uuid,
  pub match_id:   Uuid,
  pub sender:     Uuid,
  pub text:       String,
  pub created_at: DateTime<Utc>,
}

/// Trim `text` and reject it if nothing is left.
pub fn normalize_text(text: &str) -> Result<String> {
  let text = text.trim();
  if text.is_empty() {
    return Err(Error::invalid("message text is required"));
  }
  Ok(text.to_owned())
}
