//! [`SqliteStore`] — the SQLite implementation of [`AnnotationStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;

use gloss_core::annotation::{Annotation, AnnotationId, NewAnnotation};
use gloss_core::entry::{
  Entry, EntryId, EntryPage, NewEntry, Page, PageId, Volume, VolumeId,
};
use gloss_core::interval::EvaluationInterval;
use gloss_core::reference::Reference;
use gloss_core::store::AnnotationStore;
use gloss_core::user::{User, UserId};

use crate::encode::{
  RawAnnotation, RawInterval, RawUser, encode_date, encode_dt, encode_status,
  entry_from_row, page_from_row,
};
use crate::schema::SCHEMA;
use crate::{Error, Result};

const ANNOTATION_COLS: &str = "annotation_id, entry_id, user_id, text, \
   title_word, title_word_normalized, text_length, status, version, \
   created_at, updated_at";

const ENTRY_COLS: &str =
  "entry_id, text, title_word, title_word_normalized, text_length";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Gloss annotation store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch one annotation with a caller-supplied WHERE clause. The clause
  /// must select at most one row.
  async fn annotation_where(
    &self,
    where_clause: &'static str,
    params: Vec<Box<dyn rusqlite::ToSql + Send>>,
  ) -> Result<Option<Annotation>> {
    let raw: Option<RawAnnotation> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {ANNOTATION_COLS} FROM annotations WHERE {where_clause}"
        );
        let param_refs: Vec<&dyn rusqlite::ToSql> =
          params.iter().map(|p| p.as_ref() as &dyn rusqlite::ToSql).collect();
        Ok(
          conn
            .query_row(&sql, param_refs.as_slice(), RawAnnotation::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAnnotation::into_annotation).transpose()
  }

  /// Fetch all annotations matching a caller-supplied WHERE/ORDER clause.
  async fn annotations_where(
    &self,
    clause: &'static str,
    params: Vec<Box<dyn rusqlite::ToSql + Send>>,
  ) -> Result<Vec<Annotation>> {
    let raws: Vec<RawAnnotation> = self
      .conn
      .call(move |conn| {
        let sql =
          format!("SELECT {ANNOTATION_COLS} FROM annotations WHERE {clause}");
        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> =
          params.iter().map(|p| p.as_ref() as &dyn rusqlite::ToSql).collect();
        let rows = stmt
          .query_map(param_refs.as_slice(), RawAnnotation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAnnotation::into_annotation).collect()
  }
}

// ─── AnnotationStore impl ────────────────────────────────────────────────────

impl AnnotationStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────

  async fn add_user(&self, username: &str, password_hash: &str) -> Result<User> {
    let username = username.to_owned();
    let password_hash = password_hash.to_owned();
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);

    let user_id = {
      let username = username.clone();
      let password_hash = password_hash.clone();
      self
        .conn
        .call(move |conn| {
          conn.execute(
            "INSERT INTO users (username, password_hash, created_at)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![username, password_hash, at_str],
          )?;
          Ok(conn.last_insert_rowid())
        })
        .await?
    };

    Ok(User { user_id, username, password_hash, created_at })
  }

  async fn user_by_name(&self, username: &str) -> Result<Option<User>> {
    let username = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username, password_hash, created_at
               FROM users WHERE username = ?1",
              rusqlite::params![username],
              |row| {
                Ok(RawUser {
                  user_id:       row.get(0)?,
                  username:      row.get(1)?,
                  password_hash: row.get(2)?,
                  created_at:    row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Volumes and pages ─────────────────────────────────────────────────

  async fn get_or_create_volume(&self, name: &str) -> Result<Volume> {
    let name = name.to_owned();

    let volume = self
      .conn
      .call(move |conn| {
        let existing = conn
          .query_row(
            "SELECT volume_id, name FROM volumes WHERE name = ?1",
            rusqlite::params![name],
            |row| Ok(Volume { volume_id: row.get(0)?, name: row.get(1)? }),
          )
          .optional()?;
        if let Some(v) = existing {
          return Ok(v);
        }

        conn.execute(
          "INSERT INTO volumes (name) VALUES (?1)",
          rusqlite::params![name],
        )?;
        Ok(Volume { volume_id: conn.last_insert_rowid(), name })
      })
      .await?;

    Ok(volume)
  }

  async fn get_or_create_page(
    &self,
    volume_id: VolumeId,
    page_no: u32,
    image_path: &str,
  ) -> Result<Page> {
    let image_path = image_path.to_owned();

    let page = self
      .conn
      .call(move |conn| {
        let existing = conn
          .query_row(
            "SELECT page_id, volume_id, page_no, image_path
             FROM pages WHERE volume_id = ?1 AND page_no = ?2",
            rusqlite::params![volume_id, page_no],
            page_from_row,
          )
          .optional()?;
        if let Some(p) = existing {
          return Ok(p);
        }

        conn.execute(
          "INSERT INTO pages (volume_id, page_no, image_path)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![volume_id, page_no, image_path],
        )?;
        Ok(Page {
          page_id: conn.last_insert_rowid(),
          volume_id,
          page_no,
          image_path,
        })
      })
      .await?;

    Ok(page)
  }

  async fn page_in_volume(
    &self,
    volume_id: VolumeId,
    page_no: u32,
  ) -> Result<Option<Page>> {
    let page = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT page_id, volume_id, page_no, image_path
               FROM pages WHERE volume_id = ?1 AND page_no = ?2",
              rusqlite::params![volume_id, page_no],
              page_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    Ok(page)
  }

  // ── Entries ───────────────────────────────────────────────────────────

  async fn add_entry(&self, input: NewEntry) -> Result<Entry> {
    let NewEntry { text, title_word, title_word_normalized, text_length } = input;

    let entry = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO entries (text, title_word, title_word_normalized, text_length)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![text, title_word, title_word_normalized, text_length],
        )?;
        Ok(Entry {
          entry_id: conn.last_insert_rowid(),
          text,
          title_word,
          title_word_normalized,
          text_length,
        })
      })
      .await?;

    Ok(entry)
  }

  async fn get_entry(&self, id: EntryId) -> Result<Option<Entry>> {
    let entry = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {ENTRY_COLS} FROM entries WHERE entry_id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], entry_from_row)
            .optional()?,
        )
      })
      .await?;

    Ok(entry)
  }

  async fn update_entry(&self, entry: &Entry) -> Result<()> {
    let entry = entry.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE entries
           SET text = ?2, title_word = ?3, title_word_normalized = ?4,
               text_length = ?5
           WHERE entry_id = ?1",
          rusqlite::params![
            entry.entry_id,
            entry.text,
            entry.title_word,
            entry.title_word_normalized,
            entry.text_length,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn all_entries(&self) -> Result<Vec<Entry>> {
    let entries = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {ENTRY_COLS} FROM entries ORDER BY entry_id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], entry_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(entries)
  }

  async fn link_entry_page(
    &self,
    entry_id: EntryId,
    page_id: PageId,
  ) -> Result<EntryPage> {
    let link = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO entry_pages (entry_id, page_id) VALUES (?1, ?2)",
          rusqlite::params![entry_id, page_id],
        )?;
        Ok(EntryPage {
          entry_page_id: conn.last_insert_rowid(),
          entry_id,
          page_id,
        })
      })
      .await?;

    Ok(link)
  }

  async fn pages_for_entry(&self, entry_id: EntryId) -> Result<Vec<Page>> {
    let pages = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT p.page_id, p.volume_id, p.page_no, p.image_path
           FROM pages p
           JOIN entry_pages ep ON ep.page_id = p.page_id
           WHERE ep.entry_id = ?1
           ORDER BY p.page_no",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![entry_id], page_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(pages)
  }

  // ── Assignment queries ────────────────────────────────────────────────

  async fn under_assigned_entry_ids(&self, cap: u32) -> Result<Vec<EntryId>> {
    let ids = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT entry_id FROM annotations
           GROUP BY entry_id
           HAVING COUNT(*) < ?1
           ORDER BY entry_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![cap], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(ids)
  }

  async fn entry_ids_annotated_by(&self, user_id: UserId) -> Result<Vec<EntryId>> {
    let ids = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT entry_id FROM annotations WHERE user_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(ids)
  }

  async fn first_unannotated_entry_with_pages(&self) -> Result<Option<Entry>> {
    let entry = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {ENTRY_COLS} FROM entries e
           WHERE EXISTS (
             SELECT 1 FROM entry_pages ep WHERE ep.entry_id = e.entry_id
           )
           AND NOT EXISTS (
             SELECT 1 FROM annotations a WHERE a.entry_id = e.entry_id
           )
           ORDER BY e.entry_id
           LIMIT 1"
        );
        Ok(conn.query_row(&sql, [], entry_from_row).optional()?)
      })
      .await?;

    Ok(entry)
  }

  // ── Annotations ───────────────────────────────────────────────────────

  async fn insert_annotation(&self, input: NewAnnotation) -> Result<Annotation> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let status_str = encode_status(input.status).to_owned();
    let NewAnnotation {
      entry_id,
      user_id,
      text,
      title_word,
      title_word_normalized,
      text_length,
      status,
      version,
    } = input;

    let annotation_id = {
      let text = text.clone();
      let title_word = title_word.clone();
      let title_word_normalized = title_word_normalized.clone();
      self
        .conn
        .call(move |conn| {
          conn.execute(
            "INSERT INTO annotations (
               entry_id, user_id, text, title_word, title_word_normalized,
               text_length, status, version, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
              entry_id,
              user_id,
              text,
              title_word,
              title_word_normalized,
              text_length,
              status_str,
              version,
              at_str,
            ],
          )?;
          Ok(conn.last_insert_rowid())
        })
        .await?
    };

    Ok(Annotation {
      annotation_id,
      entry_id,
      user_id,
      text,
      title_word,
      title_word_normalized,
      text_length,
      status,
      version,
      created_at,
      updated_at: None,
    })
  }

  async fn get_annotation(&self, id: AnnotationId) -> Result<Option<Annotation>> {
    self
      .annotation_where("annotation_id = ?1", vec![Box::new(id)])
      .await
  }

  async fn update_annotation(&self, annotation: &Annotation) -> Result<()> {
    let updated_at = encode_dt(Utc::now());
    let status_str = encode_status(annotation.status).to_owned();
    let annotation = annotation.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE annotations
           SET text = ?2, title_word = ?3, title_word_normalized = ?4,
               text_length = ?5, status = ?6, version = ?7, updated_at = ?8
           WHERE annotation_id = ?1",
          rusqlite::params![
            annotation.annotation_id,
            annotation.text,
            annotation.title_word,
            annotation.title_word_normalized,
            annotation.text_length,
            status_str,
            annotation.version,
            updated_at,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn in_progress_annotation(
    &self,
    user_id: UserId,
    entry_id: EntryId,
  ) -> Result<Option<Annotation>> {
    self
      .annotation_where(
        "user_id = ?1 AND entry_id = ?2 AND status = 'InProgress'",
        vec![Box::new(user_id), Box::new(entry_id)],
      )
      .await
  }

  async fn in_progress_annotation_by_id(
    &self,
    user_id: UserId,
    annotation_id: AnnotationId,
  ) -> Result<Option<Annotation>> {
    self
      .annotation_where(
        "user_id = ?1 AND annotation_id = ?2 AND status = 'InProgress'",
        vec![Box::new(user_id), Box::new(annotation_id)],
      )
      .await
  }

  async fn first_in_progress_for_user(
    &self,
    user_id: UserId,
  ) -> Result<Option<Annotation>> {
    self
      .annotation_where(
        "user_id = ?1 AND status = 'InProgress'
         ORDER BY annotation_id LIMIT 1",
        vec![Box::new(user_id)],
      )
      .await
  }

  async fn annotation_for_entry_and_user(
    &self,
    entry_id: EntryId,
    user_id: UserId,
  ) -> Result<Option<Annotation>> {
    self
      .annotation_where(
        "entry_id = ?1 AND user_id = ?2 ORDER BY annotation_id LIMIT 1",
        vec![Box::new(entry_id), Box::new(user_id)],
      )
      .await
  }

  async fn annotations_for_user(&self, user_id: UserId) -> Result<Vec<Annotation>> {
    self
      .annotations_where(
        "user_id = ?1 ORDER BY COALESCE(updated_at, created_at) DESC",
        vec![Box::new(user_id)],
      )
      .await
  }

  async fn all_annotations(&self) -> Result<Vec<Annotation>> {
    let raws: Vec<RawAnnotation> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {ANNOTATION_COLS} FROM annotations ORDER BY annotation_id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawAnnotation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAnnotation::into_annotation).collect()
  }

  async fn finished_annotations_for_entry(
    &self,
    entry_id: EntryId,
  ) -> Result<Vec<Annotation>> {
    self
      .annotations_where(
        "entry_id = ?1 AND status != 'InProgress' ORDER BY annotation_id",
        vec![Box::new(entry_id)],
      )
      .await
  }

  // ── References ────────────────────────────────────────────────────────

  async fn add_reference(&self, text: &str, is_approved: bool) -> Result<Reference> {
    let text = text.to_owned();
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);

    let reference_id = {
      let text = text.clone();
      self
        .conn
        .call(move |conn| {
          conn.execute(
            "INSERT INTO refs (text, is_approved, created_at)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![text, is_approved, at_str],
          )?;
          Ok(conn.last_insert_rowid())
        })
        .await?
    };

    Ok(Reference { reference_id, text, is_approved, created_at, updated_at: None })
  }

  async fn reference_exists(&self, text: &str) -> Result<bool> {
    let text = text.to_owned();

    let exists: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM refs WHERE text = ?1",
              rusqlite::params![text],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(exists)
  }

  async fn approved_reference_texts(&self) -> Result<Vec<String>> {
    let texts = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT text FROM refs WHERE is_approved = 1 ORDER BY reference_id",
        )?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(texts)
  }

  // ── Evaluation intervals ──────────────────────────────────────────────

  async fn add_evaluation_interval(
    &self,
    name: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
  ) -> Result<EvaluationInterval> {
    let name = name.to_owned();
    let start_str = encode_date(start_date);
    let end_str = encode_date(end_date);

    let interval_id = {
      let name = name.clone();
      self
        .conn
        .call(move |conn| {
          conn.execute(
            "INSERT INTO evaluation_intervals (name, start_date, end_date)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![name, start_str, end_str],
          )?;
          Ok(conn.last_insert_rowid())
        })
        .await?
    };

    Ok(EvaluationInterval { interval_id, name, start_date, end_date })
  }

  async fn interval_containing(
    &self,
    date: NaiveDate,
  ) -> Result<Option<EvaluationInterval>> {
    let date_str = encode_date(date);

    let raw: Option<RawInterval> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT interval_id, name, start_date, end_date
               FROM evaluation_intervals
               WHERE start_date <= ?1 AND ?1 < end_date
               LIMIT 1",
              rusqlite::params![date_str],
              |row| {
                Ok(RawInterval {
                  interval_id: row.get(0)?,
                  name:        row.get(1)?,
                  start_date:  row.get(2)?,
                  end_date:    row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawInterval::into_interval).transpose()
  }
}
