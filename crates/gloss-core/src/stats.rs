//! Per-user annotation statistics for the dashboard.

use serde::Serialize;

use crate::annotation::{Annotation, AnnotationStatus};
use crate::interval::EvaluationInterval;

/// A count of annotations and the symbols they contain. Symbols only count
/// for finished annotations; half-typed text says nothing about output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatisticItem {
  pub num_annotations: usize,
  pub num_symbols:     i64,
}

/// Everything the dashboard shows for one user.
#[derive(Debug, Clone, Serialize)]
pub struct UserStatistics {
  pub grand_total:      StatisticItem,
  pub per_status:       Vec<(AnnotationStatus, StatisticItem)>,
  /// At most one bucket: the evaluation interval containing today.
  pub current_interval: Vec<(String, StatisticItem)>,
}

/// Compute the full statistics for a user's annotations.
///
/// `interval` is the evaluation interval containing today, if any; the
/// interval bucket counts finished annotations created inside it.
pub fn user_statistics(
  annotations: &[Annotation],
  interval: Option<&EvaluationInterval>,
) -> UserStatistics {
  UserStatistics {
    grand_total:      item(annotations.iter()),
    per_status:       per_status(annotations),
    current_interval: interval
      .map(|i| vec![(i.name.clone(), interval_item(annotations, i))])
      .unwrap_or_default(),
  }
}

fn per_status(annotations: &[Annotation]) -> Vec<(AnnotationStatus, StatisticItem)> {
  [
    AnnotationStatus::InProgress,
    AnnotationStatus::Conflict,
    AnnotationStatus::Complete,
  ]
  .into_iter()
  .map(|status| {
    (status, item(annotations.iter().filter(|a| a.status == status)))
  })
  .collect()
}

fn interval_item(
  annotations: &[Annotation],
  interval: &EvaluationInterval,
) -> StatisticItem {
  item(annotations.iter().filter(|a| {
    a.status != AnnotationStatus::InProgress
      && interval.contains(a.created_at.date_naive())
  }))
}

fn item<'a>(annotations: impl Iterator<Item = &'a Annotation>) -> StatisticItem {
  let mut num_annotations = 0;
  let mut num_symbols = 0;
  for a in annotations {
    num_annotations += 1;
    if a.status != AnnotationStatus::InProgress {
      num_symbols += a.text_length;
    }
  }
  StatisticItem { num_annotations, num_symbols }
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, TimeZone as _, Utc};

  use super::*;
  use crate::annotation::NewAnnotation;

  fn annotation(status: AnnotationStatus, text: &str, day: u32) -> Annotation {
    let new = NewAnnotation::new(1, 1, text);
    Annotation {
      annotation_id:         1,
      entry_id:              new.entry_id,
      user_id:               new.user_id,
      text:                  new.text,
      title_word:            new.title_word,
      title_word_normalized: new.title_word_normalized,
      text_length:           new.text_length,
      status,
      version:               new.version,
      created_at:            Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
      updated_at:            None,
    }
  }

  fn interval(from_day: u32, to_day: u32) -> EvaluationInterval {
    EvaluationInterval {
      interval_id: 1,
      name:        "March".to_owned(),
      start_date:  NaiveDate::from_ymd_opt(2024, 3, from_day).unwrap(),
      end_date:    NaiveDate::from_ymd_opt(2024, 3, to_day).unwrap(),
    }
  }

  #[test]
  fn symbols_only_count_finished_annotations() {
    let annotations = vec![
      annotation(AnnotationStatus::Complete, "**A**\n1234", 1),
      annotation(AnnotationStatus::InProgress, "**B**\nabcdefgh", 1),
    ];
    let stats = user_statistics(&annotations, None);
    assert_eq!(stats.grand_total.num_annotations, 2);
    assert_eq!(stats.grand_total.num_symbols, 10);
  }

  #[test]
  fn per_status_buckets() {
    let annotations = vec![
      annotation(AnnotationStatus::Complete, "**A**\nxx", 1),
      annotation(AnnotationStatus::Complete, "**B**\nyy", 1),
      annotation(AnnotationStatus::Conflict, "**C**\nzz", 1),
    ];
    let stats = user_statistics(&annotations, None);
    let complete = stats
      .per_status
      .iter()
      .find(|(s, _)| *s == AnnotationStatus::Complete)
      .unwrap();
    assert_eq!(complete.1.num_annotations, 2);
  }

  #[test]
  fn interval_bucket_filters_by_creation_date() {
    let annotations = vec![
      annotation(AnnotationStatus::Complete, "**A**\nxx", 5),
      annotation(AnnotationStatus::Complete, "**B**\nyy", 25),
      annotation(AnnotationStatus::InProgress, "**C**\nzz", 5),
    ];
    let i = interval(1, 10);
    let stats = user_statistics(&annotations, Some(&i));
    assert_eq!(stats.current_interval.len(), 1);
    assert_eq!(stats.current_interval[0].1.num_annotations, 1);
  }

  #[test]
  fn no_interval_yields_no_bucket() {
    let stats = user_statistics(&[], None);
    assert!(stats.current_interval.is_empty());
  }
}
