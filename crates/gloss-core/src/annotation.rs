//! Annotations — one user's working copy of an entry's text.
//!
//! Annotations are never deleted; they are the audit trail of who produced
//! which text. The version counter strictly increases on every text or
//! status mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::{EntryId, derive_text};
use crate::user::UserId;

pub type AnnotationId = i64;

/// Workflow state of an annotation.
///
/// `InProgress -> Complete` on completion, `-> Conflict` when finished
/// annotators disagree. Conflict is sticky: a later completion in the same
/// entry group can flip `Complete` rows to `Conflict`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationStatus {
  InProgress,
  Complete,
  Conflict,
}

/// One user's in-progress or finished transcription of one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
  pub annotation_id:         AnnotationId,
  pub entry_id:              EntryId,
  pub user_id:               UserId,
  pub text:                  String,
  pub title_word:            String,
  pub title_word_normalized: String,
  pub text_length:           i64,
  pub status:                AnnotationStatus,
  pub version:               u32,
  pub created_at:            DateTime<Utc>,
  /// Stamped by the store on every update.
  pub updated_at:            Option<DateTime<Utc>>,
}

impl Annotation {
  /// Replace the text, recompute the derived columns and bump the version.
  pub fn set_text(&mut self, text: &str) {
    self.text = text.to_owned();
    self.refresh_metadata();
    self.version += 1;
  }

  /// Recompute the derived columns from the current text, without a
  /// version bump. Used by the metadata maintenance command.
  pub fn refresh_metadata(&mut self) {
    let (title_word, title_word_normalized, text_length) =
      derive_text(&self.text);
    self.title_word = title_word;
    self.title_word_normalized = title_word_normalized;
    self.text_length = text_length;
  }
}

/// An annotation waiting to be persisted; the store assigns the id and the
/// creation timestamp.
#[derive(Debug, Clone)]
pub struct NewAnnotation {
  pub entry_id:              EntryId,
  pub user_id:               UserId,
  pub text:                  String,
  pub title_word:            String,
  pub title_word_normalized: String,
  pub text_length:           i64,
  pub status:                AnnotationStatus,
  pub version:               u32,
}

impl NewAnnotation {
  /// A fresh in-progress annotation at version 1.
  pub fn new(user_id: UserId, entry_id: EntryId, text: impl Into<String>) -> Self {
    let text = text.into();
    let (title_word, title_word_normalized, text_length) = derive_text(&text);
    Self {
      entry_id,
      user_id,
      text,
      title_word,
      title_word_normalized,
      text_length,
      status: AnnotationStatus::InProgress,
      version: 1,
    }
  }
}
