//! Builds the initial text of a new annotation from an entry.
//!
//! The starting text depends on the application mode, and — unless text
//! preservation is configured — gets a few characters deleted at random
//! positions so that concurrent annotators start from slightly different
//! texts and cannot trivially copy each other's result.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::annotate::ReferenceAnnotator;
use crate::annotation::NewAnnotation;
use crate::entry::Entry;
use crate::text::{format_title_word, strip_marks};
use crate::user::UserId;

/// What kind of work annotators are doing in this deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationMode {
  /// Correct entries that already carry inline markup.
  CorrectAnnotatedEntries,
  /// Re-annotate raw OCR text; existing markers are stripped first.
  AnnotateOcrText,
  /// Write entries from scratch; only the headword is pre-filled.
  #[default]
  CreateEntries,
}

/// Build the initial annotation text for `entry` under `mode`.
///
/// `preserve` disables the desynchronising deletions. The reference
/// annotator only applies in [`AnnotationMode::CorrectAnnotatedEntries`].
pub fn initial_text<R: Rng>(
  entry: &Entry,
  mode: AnnotationMode,
  preserve: bool,
  annotator: Option<&ReferenceAnnotator>,
  rng: &mut R,
) -> String {
  match mode {
    AnnotationMode::CorrectAnnotatedEntries => {
      let mut text = entry.text.clone();
      if !preserve {
        text = desynchronize(text, &entry.title_word, rng);
      }
      match annotator {
        Some(a) => a.annotate(&text),
        None => text,
      }
    }
    AnnotationMode::AnnotateOcrText => {
      let mut text = strip_marks(&entry.text);
      if !preserve {
        text = desynchronize(text, &entry.title_word, rng);
      }
      text
    }
    AnnotationMode::CreateEntries => format_title_word(&entry.title_word),
  }
}

/// Build the unsaved annotation a newly assigned user starts from.
pub fn new_annotation<R: Rng>(
  user_id: UserId,
  entry: &Entry,
  mode: AnnotationMode,
  preserve: bool,
  annotator: Option<&ReferenceAnnotator>,
  rng: &mut R,
) -> NewAnnotation {
  let text = initial_text(entry, mode, preserve, annotator, rng);
  NewAnnotation::new(user_id, entry.entry_id, text)
}

/// Delete a small number of characters at random positions after the
/// formatted title-word prefix.
///
/// Texts whose body is shorter than five characters are left alone; longer
/// texts lose one character, and texts with a body of a hundred characters
/// or more lose five. Each deletion draws a fresh index against the current
/// length, so positions are not fixed up front.
fn desynchronize<R: Rng>(mut text: String, title_word: &str, rng: &mut R) -> String {
  let prefix_len = format_title_word(title_word).chars().count();
  let len = text.chars().count();
  if len.saturating_sub(prefix_len) < 5 {
    return text;
  }

  let deletions = if len - prefix_len < 100 { 1 } else { 5 };
  for _ in 0..deletions {
    let len = text.chars().count();
    if len <= prefix_len {
      break;
    }
    let char_idx = rng.random_range(prefix_len..len);
    remove_char(&mut text, char_idx);
  }
  text
}

fn remove_char(text: &mut String, char_idx: usize) {
  if let Some((byte_idx, _)) = text.char_indices().nth(char_idx) {
    text.remove(byte_idx);
  }
}

#[cfg(test)]
mod tests {
  use rand::SeedableRng as _;
  use rand::rngs::StdRng;

  use super::*;

  fn entry(text: &str) -> Entry {
    let mut e = Entry {
      entry_id:              1,
      text:                  String::new(),
      title_word:            String::new(),
      title_word_normalized: String::new(),
      text_length:           0,
    };
    e.set_text(text);
    e
  }

  fn rng() -> StdRng { StdRng::seed_from_u64(42) }

  #[test]
  fn create_entries_mode_yields_formatted_title_word() {
    let e = entry("**CAT**\nA small feline.");
    let text =
      initial_text(&e, AnnotationMode::CreateEntries, false, None, &mut rng());
    assert_eq!(text, "**CAT**");
  }

  #[test]
  fn preserve_keeps_text_unchanged() {
    let e = entry("**CAT**\nA small feline with plenty of body text here.");
    let text = initial_text(
      &e,
      AnnotationMode::CorrectAnnotatedEntries,
      true,
      None,
      &mut rng(),
    );
    assert_eq!(text, e.text);
  }

  #[test]
  fn short_body_skips_desynchronisation() {
    let e = entry("**CAT**\nfel");
    let text = initial_text(
      &e,
      AnnotationMode::CorrectAnnotatedEntries,
      false,
      None,
      &mut rng(),
    );
    assert_eq!(text, e.text);
  }

  #[test]
  fn medium_body_loses_one_character() {
    let e = entry("**CAT**\nA small feline animal of the house.");
    let text = initial_text(
      &e,
      AnnotationMode::CorrectAnnotatedEntries,
      false,
      None,
      &mut rng(),
    );
    assert_eq!(text.chars().count(), e.text.chars().count() - 1);
    assert!(text.starts_with("**CAT**"));
  }

  #[test]
  fn long_body_loses_five_characters() {
    let body: String = "abcdefghij".repeat(12);
    let e = entry(&format!("**CAT**\n{body}"));
    let text = initial_text(
      &e,
      AnnotationMode::CorrectAnnotatedEntries,
      false,
      None,
      &mut rng(),
    );
    assert_eq!(text.chars().count(), e.text.chars().count() - 5);
    assert!(text.starts_with("**CAT**"));
  }

  #[test]
  fn ocr_mode_strips_markers() {
    let e = entry("**CAT**\nsee *also* @DA@ and x^2^ somewhere in the body.");
    let text =
      initial_text(&e, AnnotationMode::AnnotateOcrText, true, None, &mut rng());
    assert!(!text.contains('*'));
    assert!(!text.contains('@'));
    assert!(!text.contains('^'));
  }

  #[test]
  fn correction_mode_runs_reference_annotator() {
    let annotator = ReferenceAnnotator::new(["DA"]);
    let e = entry("**CAT**\nsee DA for the long form of this entry text.");
    let text = initial_text(
      &e,
      AnnotationMode::CorrectAnnotatedEntries,
      true,
      Some(&annotator),
      &mut rng(),
    );
    assert!(text.contains("@DA@"), "text: {text}");
  }

  #[test]
  fn new_annotation_wraps_initial_text() {
    let e = entry("**CAT**\nA small feline.");
    let a =
      new_annotation(9, &e, AnnotationMode::CreateEntries, true, None, &mut rng());
    assert_eq!(a.user_id, 9);
    assert_eq!(a.entry_id, 1);
    assert_eq!(a.text, "**CAT**");
    assert_eq!(a.version, 1);
  }
}
