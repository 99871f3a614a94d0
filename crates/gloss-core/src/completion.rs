//! The completion engine — finishing an annotation and flagging conflicts.

use thiserror::Error;

use crate::annotation::{Annotation, AnnotationId, AnnotationStatus};
use crate::entry::EntryId;
use crate::store::AnnotationStore;
use crate::text::{extract_title_word, format_title_word};
use crate::user::UserId;

/// Why a completion request was rejected.
#[derive(Debug, Error)]
pub enum CompletionError<E> {
  /// The submitted text carries nothing beyond its own title-word marker.
  /// Holds the annotation id so the editor can be redisplayed.
  #[error("annotation {annotation_id} text is no longer than its title-word marker")]
  TextTooShort { annotation_id: AnnotationId },

  /// The caller has no in-progress annotation for this entry — a stale
  /// form submission or a race, surfaced as not-found rather than ignored.
  #[error("no in-progress annotation for entry {entry_id} and user {user_id}")]
  NoInProgress { entry_id: EntryId, user_id: UserId },

  #[error(transparent)]
  Store(E),
}

/// Mark the caller's annotation of `entry_id` complete with `text`, then
/// re-run the conflict check over the entry's finished annotations.
///
/// Status transitions: `InProgress -> Complete`, and — when `cap` finished
/// annotations exist and any two texts differ — every finished annotation
/// (Complete and Conflict alike) is flagged `Conflict` with a version bump.
/// Conflict is sticky; nothing ever transitions out of it here.
pub async fn mark_complete<S: AnnotationStore>(
  store: &S,
  entry_id: EntryId,
  text: &str,
  user_id: UserId,
  cap: u32,
) -> Result<Annotation, CompletionError<S::Error>> {
  let mut annotation = store
    .in_progress_annotation(user_id, entry_id)
    .await
    .map_err(CompletionError::Store)?
    .ok_or(CompletionError::NoInProgress { entry_id, user_id })?;

  validate_text(text, annotation.annotation_id)?;

  annotation.set_text(text);
  annotation.status = AnnotationStatus::Complete;
  store
    .update_annotation(&annotation)
    .await
    .map_err(CompletionError::Store)?;

  check_conflicts(store, entry_id, cap)
    .await
    .map_err(CompletionError::Store)?;

  Ok(annotation)
}

/// The text must hold more than its own formatted title word. A text
/// without a bold headword marker always fails — the marker has to survive
/// the annotator's edits.
fn validate_text<E>(
  text: &str,
  annotation_id: AnnotationId,
) -> Result<(), CompletionError<E>> {
  let marker = format_title_word(&extract_title_word(text));
  if text.chars().count() <= marker.chars().count() {
    return Err(CompletionError::TextTooShort { annotation_id });
  }
  Ok(())
}

/// Flag every finished annotation of the entry as conflicting when all
/// required annotators are done and their texts disagree.
async fn check_conflicts<S: AnnotationStore>(
  store: &S,
  entry_id: EntryId,
  cap: u32,
) -> Result<(), S::Error> {
  let finished = store.finished_annotations_for_entry(entry_id).await?;
  if (finished.len() as u32) < cap {
    return Ok(());
  }

  if !have_conflicts(&finished) {
    return Ok(());
  }

  for mut annotation in finished {
    annotation.version += 1;
    annotation.status = AnnotationStatus::Conflict;
    store.update_annotation(&annotation).await?;
  }
  Ok(())
}

/// Pairwise comparison of every finished text against the first one.
fn have_conflicts(annotations: &[Annotation]) -> bool {
  let mut iter = annotations.iter();
  let Some(first) = iter.next() else {
    return false;
  };
  iter.any(|a| a.text != first.text)
}
