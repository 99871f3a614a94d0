//! Volumes, pages and dictionary entries.
//!
//! An entry's three derived columns (title word, normalized title word, text
//! length) are recomputed on every text mutation through [`Entry::set_text`]
//! and are never written independently of the text.

use serde::{Deserialize, Serialize};

use crate::text::{extract_title_word, remove_diacritics};

pub type VolumeId = i64;
pub type PageId = i64;
pub type EntryId = i64;
pub type EntryPageId = i64;

// ─── Volume / Page ───────────────────────────────────────────────────────────

/// A named collection of scanned pages. Created on first import reference,
/// immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volume {
  pub volume_id: VolumeId,
  pub name:      String,
}

/// One scanned page image of a volume. (volume, page_no) is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
  pub page_id:    PageId,
  pub volume_id:  VolumeId,
  pub page_no:    u32,
  pub image_path: String,
}

// ─── Entry ───────────────────────────────────────────────────────────────────

/// A dictionary headword's canonical text, in inline markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
  pub entry_id:              EntryId,
  pub text:                  String,
  pub title_word:            String,
  pub title_word_normalized: String,
  /// Character count of `text`.
  pub text_length:           i64,
}

impl Entry {
  /// Replace the text and recompute the derived columns.
  pub fn set_text(&mut self, text: &str) {
    self.text = text.to_owned();
    self.refresh_metadata();
  }

  /// Recompute the derived columns from the current text.
  pub fn refresh_metadata(&mut self) {
    let (title_word, title_word_normalized, text_length) =
      derive_text(&self.text);
    self.title_word = title_word;
    self.title_word_normalized = title_word_normalized;
    self.text_length = text_length;
  }
}

/// An entry waiting to be persisted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewEntry {
  pub text:                  String,
  pub title_word:            String,
  pub title_word_normalized: String,
  pub text_length:           i64,
}

impl NewEntry {
  pub fn from_text(text: impl Into<String>) -> Self {
    let text = text.into();
    let (title_word, title_word_normalized, text_length) = derive_text(&text);
    Self { text, title_word, title_word_normalized, text_length }
  }
}

/// Association between an entry and one of the pages it appears on.
/// (entry, page) is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPage {
  pub entry_page_id: EntryPageId,
  pub entry_id:      EntryId,
  pub page_id:       PageId,
}

/// Compute `(title_word, title_word_normalized, text_length)` for a text.
pub(crate) fn derive_text(text: &str) -> (String, String, i64) {
  let title_word = extract_title_word(text);
  let title_word_normalized = remove_diacritics(&title_word);
  let text_length = text.chars().count() as i64;
  (title_word, title_word_normalized, text_length)
}
