//! Reference strings used for automatic annotation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ReferenceId = i64;

/// An approved or pending citation string. Only approved references feed the
/// automatic annotator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
  pub reference_id: ReferenceId,
  pub text:         String,
  pub is_approved:  bool,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   Option<DateTime<Utc>>,
}
