//! Evaluation intervals — named date windows used to bucket statistics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type IntervalId = i64;

/// A named `[start_date, end_date)` window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationInterval {
  pub interval_id: IntervalId,
  pub name:        String,
  pub start_date:  NaiveDate,
  pub end_date:    NaiveDate,
}

impl EvaluationInterval {
  /// Half-open containment: `start_date <= date < end_date`.
  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start_date <= date && date < self.end_date
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn interval() -> EvaluationInterval {
    EvaluationInterval {
      interval_id: 1,
      name:        "2024 H1".to_owned(),
      start_date:  NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
      end_date:    NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
    }
  }

  #[test]
  fn contains_is_half_open() {
    let i = interval();
    assert!(i.contains(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
    assert!(i.contains(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()));
    assert!(!i.contains(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()));
    assert!(!i.contains(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()));
  }
}
