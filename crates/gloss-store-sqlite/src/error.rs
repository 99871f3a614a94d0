//! Error type for `gloss-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown annotation status: {0:?}")]
  UnknownStatus(String),
}

impl Error {
  /// Whether this error is a uniqueness/foreign-key violation — the import
  /// commands log these per record and keep going.
  pub fn is_constraint_violation(&self) -> bool {
    let Error::Database(tokio_rusqlite::Error::Rusqlite(e)) = self else {
      return false;
    };
    matches!(
      e.sqlite_error_code(),
      Some(rusqlite::ErrorCode::ConstraintViolation)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
