//! The `AnnotationStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `gloss-store-sqlite`).
//! Higher layers (`gloss-server`, `gloss-import`) and the engine modules
//! depend on this abstraction, not on any concrete backend.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use chrono::NaiveDate;

use crate::annotation::{Annotation, AnnotationId, NewAnnotation};
use crate::entry::{Entry, EntryId, EntryPage, NewEntry, Page, PageId, Volume, VolumeId};
use crate::interval::EvaluationInterval;
use crate::reference::Reference;
use crate::user::{User, UserId};

/// Abstraction over a Gloss storage backend.
pub trait AnnotationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create an annotator account. The password hash is an argon2 PHC
  /// string. Fails on a duplicate username.
  fn add_user(
    &self,
    username: &str,
    password_hash: &str,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send;

  /// Look up an account by username. Returns `None` if not found.
  fn user_by_name(
    &self,
    username: &str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send;

  // ── Volumes and pages ─────────────────────────────────────────────────

  /// Return the volume with the given name, creating it if missing.
  fn get_or_create_volume(
    &self,
    name: &str,
  ) -> impl Future<Output = Result<Volume, Self::Error>> + Send;

  /// Return the page at (volume, page_no), creating it with `image_path`
  /// if missing.
  fn get_or_create_page(
    &self,
    volume_id: VolumeId,
    page_no: u32,
    image_path: &str,
  ) -> impl Future<Output = Result<Page, Self::Error>> + Send;

  /// Look up a page by (volume, page_no). Returns `None` if not found.
  fn page_in_volume(
    &self,
    volume_id: VolumeId,
    page_no: u32,
  ) -> impl Future<Output = Result<Option<Page>, Self::Error>> + Send;

  // ── Entries ───────────────────────────────────────────────────────────

  /// Persist a new entry and return it with its assigned id.
  fn add_entry(
    &self,
    input: NewEntry,
  ) -> impl Future<Output = Result<Entry, Self::Error>> + Send;

  /// Retrieve an entry by id. Returns `None` if not found.
  fn get_entry(
    &self,
    id: EntryId,
  ) -> impl Future<Output = Result<Option<Entry>, Self::Error>> + Send;

  /// Rewrite an entry's text and derived columns.
  fn update_entry(
    &self,
    entry: &Entry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;

  /// List every entry. Used by maintenance commands, not request paths.
  fn all_entries(
    &self,
  ) -> impl Future<Output = Result<Vec<Entry>, Self::Error>> + Send;

  /// Associate an entry with a page. Fails on a duplicate pair.
  fn link_entry_page(
    &self,
    entry_id: EntryId,
    page_id: PageId,
  ) -> impl Future<Output = Result<EntryPage, Self::Error>> + Send;

  /// All pages an entry appears on, ordered by page number.
  fn pages_for_entry(
    &self,
    entry_id: EntryId,
  ) -> impl Future<Output = Result<Vec<Page>, Self::Error>> + Send;

  // ── Assignment queries ────────────────────────────────────────────────

  /// Ids of entries that have at least one annotation but fewer than
  /// `cap`, ascending. Entries nobody has touched are deliberately absent;
  /// they enter circulation through
  /// [`first_unannotated_entry_with_pages`](Self::first_unannotated_entry_with_pages).
  fn under_assigned_entry_ids(
    &self,
    cap: u32,
  ) -> impl Future<Output = Result<Vec<EntryId>, Self::Error>> + Send;

  /// Ids of every entry the user has an annotation for, in any status.
  fn entry_ids_annotated_by(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<EntryId>, Self::Error>> + Send;

  /// The lowest-id entry that has at least one page association and no
  /// annotations at all.
  fn first_unannotated_entry_with_pages(
    &self,
  ) -> impl Future<Output = Result<Option<Entry>, Self::Error>> + Send;

  // ── Annotations ───────────────────────────────────────────────────────

  /// Persist a new annotation; the store assigns id and creation time.
  fn insert_annotation(
    &self,
    input: NewAnnotation,
  ) -> impl Future<Output = Result<Annotation, Self::Error>> + Send;

  /// Retrieve an annotation by id. Returns `None` if not found.
  fn get_annotation(
    &self,
    id: AnnotationId,
  ) -> impl Future<Output = Result<Option<Annotation>, Self::Error>> + Send;

  /// Persist an annotation's text, derived columns, status and version.
  /// The update timestamp is stamped by the store.
  fn update_annotation(
    &self,
    annotation: &Annotation,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;

  /// The user's in-progress annotation for an entry, if any.
  fn in_progress_annotation(
    &self,
    user_id: UserId,
    entry_id: EntryId,
  ) -> impl Future<Output = Result<Option<Annotation>, Self::Error>> + Send;

  /// The annotation with the given id, but only when it belongs to the
  /// user and is still in progress.
  fn in_progress_annotation_by_id(
    &self,
    user_id: UserId,
    annotation_id: AnnotationId,
  ) -> impl Future<Output = Result<Option<Annotation>, Self::Error>> + Send;

  /// The user's oldest in-progress annotation, if any — the work they
  /// should resume.
  fn first_in_progress_for_user(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Option<Annotation>, Self::Error>> + Send;

  /// The user's annotation for an entry regardless of status, if any.
  fn annotation_for_entry_and_user(
    &self,
    entry_id: EntryId,
    user_id: UserId,
  ) -> impl Future<Output = Result<Option<Annotation>, Self::Error>> + Send;

  /// All of the user's annotations, most recently updated first.
  fn annotations_for_user(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<Annotation>, Self::Error>> + Send;

  /// List every annotation. Used by maintenance commands, not request
  /// paths.
  fn all_annotations(
    &self,
  ) -> impl Future<Output = Result<Vec<Annotation>, Self::Error>> + Send;

  /// Every non-in-progress annotation of an entry — the set the conflict
  /// check runs over.
  fn finished_annotations_for_entry(
    &self,
    entry_id: EntryId,
  ) -> impl Future<Output = Result<Vec<Annotation>, Self::Error>> + Send;

  // ── References ────────────────────────────────────────────────────────

  /// Insert a reference string. Fails on a duplicate text.
  fn add_reference(
    &self,
    text: &str,
    is_approved: bool,
  ) -> impl Future<Output = Result<Reference, Self::Error>> + Send;

  /// Whether a reference with exactly this text exists.
  fn reference_exists(
    &self,
    text: &str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

  /// The texts of all approved references.
  fn approved_reference_texts(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send;

  // ── Evaluation intervals ──────────────────────────────────────────────

  /// Create a named `[start, end)` window. Fails on a duplicate name.
  fn add_evaluation_interval(
    &self,
    name: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
  ) -> impl Future<Output = Result<EvaluationInterval, Self::Error>> + Send;

  /// The interval containing `date`, if one exists.
  fn interval_containing(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Option<EvaluationInterval>, Self::Error>> + Send;
}
