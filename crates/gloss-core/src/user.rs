//! Annotator accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// An annotator account. The password hash is an argon2 PHC string; the
/// store never sees plaintext passwords.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:       UserId,
  pub username:      String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}
