//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; evaluation-interval bounds as
//! `YYYY-MM-DD`; annotation statuses as their canonical text form.

use chrono::{DateTime, NaiveDate, Utc};
use gloss_core::annotation::{Annotation, AnnotationStatus};
use gloss_core::entry::{Entry, Page};
use gloss_core::interval::EvaluationInterval;
use gloss_core::user::User;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── AnnotationStatus ────────────────────────────────────────────────────────

pub fn encode_status(s: AnnotationStatus) -> &'static str {
  match s {
    AnnotationStatus::InProgress => "InProgress",
    AnnotationStatus::Complete => "Complete",
    AnnotationStatus::Conflict => "Conflict",
  }
}

pub fn decode_status(s: &str) -> Result<AnnotationStatus> {
  match s {
    "InProgress" => Ok(AnnotationStatus::InProgress),
    "Complete" => Ok(AnnotationStatus::Complete),
    "Conflict" => Ok(AnnotationStatus::Conflict),
    other => Err(Error::UnknownStatus(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       i64,
  pub username:      String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       self.user_id,
      username:      self.username,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// A `pages` row; all columns decode without parsing.
pub fn page_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Page> {
  Ok(Page {
    page_id:    row.get(0)?,
    volume_id:  row.get(1)?,
    page_no:    row.get(2)?,
    image_path: row.get(3)?,
  })
}

/// An `entries` row; all columns decode without parsing.
pub fn entry_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entry> {
  Ok(Entry {
    entry_id:              row.get(0)?,
    text:                  row.get(1)?,
    title_word:            row.get(2)?,
    title_word_normalized: row.get(3)?,
    text_length:           row.get(4)?,
  })
}

/// Raw strings read directly from an `annotations` row.
pub struct RawAnnotation {
  pub annotation_id:         i64,
  pub entry_id:              i64,
  pub user_id:               i64,
  pub text:                  String,
  pub title_word:            String,
  pub title_word_normalized: String,
  pub text_length:           i64,
  pub status:                String,
  pub version:               u32,
  pub created_at:            String,
  pub updated_at:            Option<String>,
}

impl RawAnnotation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      annotation_id:         row.get(0)?,
      entry_id:              row.get(1)?,
      user_id:               row.get(2)?,
      text:                  row.get(3)?,
      title_word:            row.get(4)?,
      title_word_normalized: row.get(5)?,
      text_length:           row.get(6)?,
      status:                row.get(7)?,
      version:               row.get(8)?,
      created_at:            row.get(9)?,
      updated_at:            row.get(10)?,
    })
  }

  pub fn into_annotation(self) -> Result<Annotation> {
    Ok(Annotation {
      annotation_id:         self.annotation_id,
      entry_id:              self.entry_id,
      user_id:               self.user_id,
      text:                  self.text,
      title_word:            self.title_word,
      title_word_normalized: self.title_word_normalized,
      text_length:           self.text_length,
      status:                decode_status(&self.status)?,
      version:               self.version,
      created_at:            decode_dt(&self.created_at)?,
      updated_at:            self.updated_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw strings read directly from an `evaluation_intervals` row.
pub struct RawInterval {
  pub interval_id: i64,
  pub name:        String,
  pub start_date:  String,
  pub end_date:    String,
}

impl RawInterval {
  pub fn into_interval(self) -> Result<EvaluationInterval> {
    Ok(EvaluationInterval {
      interval_id: self.interval_id,
      name:        self.name,
      start_date:  decode_date(&self.start_date)?,
      end_date:    decode_date(&self.end_date)?,
    })
  }
}
