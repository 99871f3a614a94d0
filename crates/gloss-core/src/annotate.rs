//! Automatic annotation of bibliographic references in entry texts.
//!
//! A [`ReferenceAnnotator`] holds a multi-pattern automaton built once over
//! the known reference strings. Annotation finds every case-sensitive exact
//! occurrence, merges overlapping occurrences into maximal spans, and wraps
//! each span in reference markers.

use aho_corasick::AhoCorasick;

use crate::text::marks;

/// A matched span of text, as byte offsets with an exclusive end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
  start: usize,
  end:   usize,
}

/// Annotates known references in entry texts.
pub struct ReferenceAnnotator {
  automaton: Option<AhoCorasick>,
}

impl ReferenceAnnotator {
  /// Build an annotator over `references`.
  ///
  /// Patterns are trimmed of surrounding whitespace; empty patterns are
  /// dropped (a zero-width pattern would match between every character).
  pub fn new<I, P>(references: I) -> Self
  where
    I: IntoIterator<Item = P>,
    P: AsRef<str>,
  {
    let patterns: Vec<String> = references
      .into_iter()
      .map(|r| r.as_ref().trim().to_owned())
      .filter(|r| !r.is_empty())
      .collect();

    let automaton = if patterns.is_empty() {
      None
    } else {
      // Construction only fails on pattern sets exceeding internal limits;
      // annotation then degrades to a no-op, which is worth a warning.
      match AhoCorasick::new(&patterns) {
        Ok(automaton) => Some(automaton),
        Err(e) => {
          tracing::warn!(error = %e, "failed to build reference automaton");
          None
        }
      }
    };

    Self { automaton }
  }

  /// Wrap every known reference found in `text` in reference markers.
  ///
  /// Pre-existing markers are stripped first, which makes the operation
  /// idempotent over its own output.
  pub fn annotate(&self, text: &str) -> String {
    let Some(automaton) = &self.automaton else {
      return text.to_owned();
    };

    let text = text.replace(marks::REFERENCE, "");

    let mut spans: Vec<Span> = automaton
      .find_overlapping_iter(&text)
      .map(|m| Span { start: m.start(), end: m.end() })
      .collect();
    spans.sort_by_key(|s| s.start);

    let merged = merge_overlaps(&spans);
    apply_annotation(text, &merged)
  }
}

/// Merge spans that overlap (share at least one character) into maximal
/// spans. Input must be sorted by start offset.
fn merge_overlaps(spans: &[Span]) -> Vec<Span> {
  let Some((&first, rest)) = spans.split_first() else {
    return Vec::new();
  };

  let mut result = Vec::new();
  let mut current = first;
  for &span in rest {
    if span.start < current.end {
      current.end = current.end.max(span.end);
    } else {
      result.push(current);
      current = span;
    }
  }
  result.push(current);
  result
}

/// Insert a reference marker before and after every span. Spans are applied
/// in reverse so earlier insertions do not shift later offsets.
fn apply_annotation(mut text: String, spans: &[Span]) -> String {
  // Match offsets of valid UTF-8 patterns always land on char boundaries.
  for span in spans.iter().rev() {
    text.insert_str(span.end, marks::REFERENCE);
    text.insert_str(span.start, marks::REFERENCE);
  }
  text
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn no_references_leaves_text_unchanged() {
    let annotator = ReferenceAnnotator::new(Vec::<&str>::new());
    assert_eq!(annotator.annotate("some text"), "some text");
  }

  #[test]
  fn annotates_single_occurrence() {
    let annotator = ReferenceAnnotator::new(["DA"]);
    assert_eq!(annotator.annotate("see DA for details"), "see @DA@ for details");
  }

  #[test]
  fn annotates_multiple_occurrences() {
    let annotator = ReferenceAnnotator::new(["DA"]);
    assert_eq!(annotator.annotate("DA and DA"), "@DA@ and @DA@");
  }

  #[test]
  fn merges_overlapping_matches() {
    let annotator = ReferenceAnnotator::new(["CADE", "DEX"]);
    // "CADEX" holds CADE (0..4) and DEX (2..5); one merged span.
    assert_eq!(annotator.annotate("CADEX"), "@CADEX@");
  }

  #[test]
  fn adjacent_matches_stay_separate() {
    let annotator = ReferenceAnnotator::new(["AB", "CD"]);
    assert_eq!(annotator.annotate("ABCD"), "@AB@@CD@");
  }

  #[test]
  fn strips_existing_markers_first() {
    let annotator = ReferenceAnnotator::new(["DA"]);
    let once = annotator.annotate("see DA here");
    assert_eq!(annotator.annotate(&once), once);
  }

  #[test]
  fn empty_and_whitespace_patterns_are_dropped() {
    let annotator = ReferenceAnnotator::new(["", "  ", "DA"]);
    assert_eq!(annotator.annotate("DA"), "@DA@");
  }

  #[test]
  fn patterns_are_trimmed() {
    let annotator = ReferenceAnnotator::new([" DA \n"]);
    assert_eq!(annotator.annotate("see DA"), "see @DA@");
  }

  #[test]
  fn multibyte_text_around_matches() {
    let annotator = ReferenceAnnotator::new(["DA"]);
    assert_eq!(annotator.annotate("mâță DA țâră"), "mâță @DA@ țâră");
  }

  #[test]
  fn merge_is_order_independent_over_same_cover() {
    let spans_a = vec![
      Span { start: 0, end: 4 },
      Span { start: 2, end: 6 },
      Span { start: 5, end: 9 },
    ];
    let mut spans_b = vec![
      Span { start: 0, end: 4 },
      Span { start: 5, end: 9 },
      Span { start: 2, end: 6 },
    ];
    spans_b.sort_by_key(|s| s.start);
    assert_eq!(merge_overlaps(&spans_a), merge_overlaps(&spans_b));
    assert_eq!(merge_overlaps(&spans_a), vec![Span { start: 0, end: 9 }]);
  }
}
